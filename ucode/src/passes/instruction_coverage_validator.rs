use hdl::IrataDecl;

use crate::error::CompileError;
use crate::ir;
use crate::passes::Pass;

/// Cross-checks the instruction set against the shared catalog: every
/// catalog instruction must have at least one microcode variant.
pub struct InstructionCoverageValidator {
    catalog: Vec<common::Instruction>,
}

impl InstructionCoverageValidator {
    pub fn new() -> InstructionCoverageValidator {
        InstructionCoverageValidator { catalog: common::INSTRUCTIONS.clone() }
    }

    pub fn with_catalog(catalog: Vec<common::Instruction>) -> InstructionCoverageValidator {
        InstructionCoverageValidator { catalog }
    }
}

impl Default for InstructionCoverageValidator {
    fn default() -> Self {
        InstructionCoverageValidator::new()
    }
}

impl Pass for InstructionCoverageValidator {
    fn name(&self) -> &'static str {
        "instruction_coverage_validator"
    }

    fn run(
        &self,
        instruction_set: ir::InstructionSet,
        _irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        for entry in &self.catalog {
            let covered =
                instruction_set.instructions.iter().any(|i| i.descriptor == *entry);
            if !covered {
                return Err(CompileError::UncoveredInstruction(entry.to_string()));
            }
        }
        Ok(instruction_set)
    }
}
