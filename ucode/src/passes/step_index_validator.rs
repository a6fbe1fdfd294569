use hdl::IrataDecl;

use crate::error::CompileError;
use crate::ir;
use crate::passes::Pass;

/// Checks the invariant the step index transformer establishes: without it
/// the controller would stall on a repeating step or run off the end of an
/// instruction.
pub struct StepIndexValidator;

impl Pass for StepIndexValidator {
    fn name(&self) -> &'static str {
        "step_index_validator"
    }

    fn run(
        &self,
        instruction_set: ir::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        let step_counter = irata.cpu.controller.step_counter;
        for instruction in &instruction_set.instructions {
            let last = instruction.steps.len().saturating_sub(1);
            for (index, step) in instruction.steps.iter().enumerate() {
                let increments = step.controls.contains(&step_counter.increment);
                let resets = step.controls.contains(&step_counter.reset);
                let problem = if index == last {
                    if !resets {
                        Some("final step does not reset the step counter")
                    } else if increments {
                        Some("final step increments the step counter")
                    } else {
                        None
                    }
                } else if !increments {
                    Some("step does not increment the step counter")
                } else if resets {
                    Some("step resets the step counter before the final step")
                } else {
                    None
                };
                if let Some(problem) = problem {
                    return Err(CompileError::MissingStepAdvance {
                        instruction: instruction.descriptor.to_string(),
                        step_index: index,
                        problem: problem.to_string(),
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
    use crate::passes::StepIndexTransformer;

    fn nop_set(irata: &IrataDecl) -> ir::InstructionSet {
        let mut builder = InstructionSetBuilder::new(irata);
        builder.instruction("nop", AddressingMode::None).step();
        ir::InstructionSet::from_dsl(&builder.build().unwrap())
    }

    #[test]
    fn transformed_set_validates() {
        let irata = IrataDecl::build();
        let set = StepIndexTransformer.run(nop_set(&irata), &irata).unwrap();
        assert!(StepIndexValidator.run(set, &irata).is_ok());
    }

    #[test]
    fn untransformed_set_is_rejected() {
        let irata = IrataDecl::build();
        match StepIndexValidator.run(nop_set(&irata), &irata) {
            Err(CompileError::MissingStepAdvance { step_index, .. }) => {
                assert_eq!(step_index, 0);
            }
            other => panic!("expected missing step advance, got {:?}", other),
        }
    }

    #[test]
    fn stray_reset_is_rejected() {
        let irata = IrataDecl::build();
        let step_counter = irata.cpu.controller.step_counter;
        let mut set = StepIndexTransformer.run(nop_set(&irata), &irata).unwrap();
        set.instructions[0].steps[1].controls.insert(step_counter.reset);
        match StepIndexValidator.run(set, &irata) {
            Err(CompileError::MissingStepAdvance { step_index, problem, .. }) => {
                assert_eq!(step_index, 1);
                assert!(problem.contains("before the final step"));
            }
            other => panic!("expected missing step advance, got {:?}", other),
        }
    }
}
