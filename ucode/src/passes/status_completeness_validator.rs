use std::collections::{BTreeMap, BTreeSet};

use hdl::IrataDecl;

use crate::error::CompileError;
use crate::ir::{self, permute_statuses, render_statuses};
use crate::passes::Pass;

/// For every instruction, every complete assignment of the statuses its
/// variants reference must be covered by some variant. Otherwise the
/// controller would have addresses with no microcode behind them.
pub struct StatusCompletenessValidator;

fn matches(variant: &BTreeMap<hdl::StatusId, bool>, assignment: &BTreeMap<hdl::StatusId, bool>) -> bool {
    variant.iter().all(|(status, value)| assignment.get(status) == Some(value))
}

impl Pass for StatusCompletenessValidator {
    fn name(&self) -> &'static str {
        "status_completeness_validator"
    }

    fn run(
        &self,
        instruction_set: ir::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        let mut groups: BTreeMap<common::Instruction, Vec<&ir::Instruction>> = BTreeMap::new();
        for instruction in &instruction_set.instructions {
            groups.entry(instruction.descriptor).or_default().push(instruction);
        }
        for (descriptor, variants) in &groups {
            let referenced: BTreeSet<hdl::StatusId> =
                variants.iter().flat_map(|v| v.statuses.keys().copied()).collect();
            if referenced.is_empty() {
                continue;
            }
            for assignment in permute_statuses(&referenced, &BTreeMap::new()) {
                if !variants.iter().any(|v| matches(&v.statuses, &assignment)) {
                    return Err(CompileError::IncompleteStatusCoverage {
                        instruction: descriptor.to_string(),
                        statuses: render_statuses(&assignment, &irata.topology),
                    });
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
    fn complementary_variants_pass() {
        let irata = IrataDecl::build();
        let zero = irata.cpu.status_register.zero;
        let pc_increment = irata.cpu.pc.increment;
        let mut builder = InstructionSetBuilder::new(&irata);
        builder
            .instruction("jeq", AddressingMode::Absolute)
            .with_status(zero, true)
            .read_word_at_pc(&irata.cpu.pc);
        builder
            .instruction("jeq", AddressingMode::Absolute)
            .with_status(zero, false)
            .step()
            .control(pc_increment)
            .next_stage()
            .step()
            .control(pc_increment);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        assert!(StatusCompletenessValidator.run(set, &irata).is_ok());
    }

    #[test]
    fn missing_complement_is_rejected() {
        let irata = IrataDecl::build();
        let zero = irata.cpu.status_register.zero;
        let mut builder = InstructionSetBuilder::new(&irata);
        builder
            .instruction("jeq", AddressingMode::Absolute)
            .with_status(zero, true)
            .read_word_at_pc(&irata.cpu.pc);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        match StatusCompletenessValidator.run(set, &irata) {
            Err(CompileError::IncompleteStatusCoverage { instruction, statuses }) => {
                assert!(instruction.contains("jeq"));
                assert_eq!(statuses, "/cpu/status_register/zero=false");
            }
            other => panic!("expected incomplete status coverage, got {:?}", other),
        }
    }

    #[test]
    fn unconstrained_instructions_are_trivially_complete() {
        let irata = IrataDecl::build();
        let mut builder = InstructionSetBuilder::new(&irata);
        builder.instruction("nop", AddressingMode::None).step();
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        assert!(StatusCompletenessValidator.run(set, &irata).is_ok());
    }
}
