use hdl::IrataDecl;

use crate::error::CompileError;
use crate::ir::{self, render_steps};
use crate::passes::Pass;

/// Every variant must open with an identical stage-0 step list: the
/// controller has not decoded an opcode yet, so fetch cannot differ per
/// instruction.
pub struct FetchStageValidator;

impl Pass for FetchStageValidator {
    fn name(&self) -> &'static str {
        "fetch_stage_validator"
    }

    fn run(
        &self,
        instruction_set: ir::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        let mut canonical: Option<Vec<ir::Step>> = None;
        for instruction in &instruction_set.instructions {
            let fetch: Vec<ir::Step> =
                instruction.steps.iter().filter(|s| s.stage == 0).cloned().collect();
            match &canonical {
                None => canonical = Some(fetch),
                Some(expected) if *expected == fetch => {}
                Some(expected) => {
                    return Err(CompileError::InconsistentFetchStage {
                        instruction: instruction.descriptor.to_string(),
                        expected: render_steps(expected, &irata.topology),
                        found: render_steps(&fetch, &irata.topology),
                    })
                }
            }
        }
        Ok(instruction_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AddressingMode;
    use hdl::IrataDecl;

    use crate::dsl::InstructionSetBuilder;

    #[test]
    fn identical_fetch_stages_pass() {
        let irata = IrataDecl::build();
        let mut builder = InstructionSetBuilder::new(&irata);
        builder.instruction("nop", AddressingMode::None).step();
        builder.instruction("hlt", AddressingMode::None).step().control(irata.halt);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        assert!(FetchStageValidator.run(set, &irata).is_ok());
    }

    #[test]
    fn diverging_fetch_stage_is_rejected() {
        let irata = IrataDecl::build();
        let mut builder = InstructionSetBuilder::new(&irata);
        builder.instruction("nop", AddressingMode::None).step();
        builder.instruction("hlt", AddressingMode::None).step();
        let mut set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        // Sabotage hlt's fetch: drop the program counter increment.
        set.instructions[1].steps[2].controls.remove(&irata.cpu.pc.increment);
        match FetchStageValidator.run(set, &irata) {
            Err(CompileError::InconsistentFetchStage { instruction, .. }) => {
                assert!(instruction.contains("hlt"));
            }
            other => panic!("expected inconsistent fetch stage, got {:?}", other),
        }
    }
}
