use hdl::IrataDecl;

use crate::error::CompileError;
use crate::ir;
use crate::passes::Pass;

/// Rewrites step counter bookkeeping so every instruction sequences
/// correctly: each non-final step increments the step counter, and the final
/// step resets it so the next tick starts the next instruction's fetch.
/// Hand-written counter controls are overruled. Idempotent.
pub struct StepIndexTransformer;

impl Pass for StepIndexTransformer {
    fn name(&self) -> &'static str {
        "step_index_transformer"
    }

    fn run(
        &self,
        mut instruction_set: ir::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        let step_counter = irata.cpu.controller.step_counter;
        for instruction in &mut instruction_set.instructions {
            let last = instruction.steps.len().saturating_sub(1);
            for (index, step) in instruction.steps.iter_mut().enumerate() {
                if index == last {
                    step.controls.insert(step_counter.reset);
                    step.controls.remove(&step_counter.increment);
                } else {
                    step.controls.insert(step_counter.increment);
                    step.controls.remove(&step_counter.reset);
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

    fn transformed(irata: &IrataDecl) -> ir::InstructionSet {
        let mut builder = InstructionSetBuilder::new(irata);
        builder.instruction("nop", AddressingMode::None).step();
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        StepIndexTransformer.run(set, irata).unwrap()
    }

    #[test]
    fn non_final_steps_increment_final_step_resets() {
        let irata = IrataDecl::build();
        let step_counter = irata.cpu.controller.step_counter;
        let nop = &transformed(&irata).instructions[0];
        let (final_step, body) = nop.steps.split_last().unwrap();
        for step in body {
            assert!(step.controls.contains(&step_counter.increment));
            assert!(!step.controls.contains(&step_counter.reset));
        }
        assert!(final_step.controls.contains(&step_counter.reset));
        assert!(!final_step.controls.contains(&step_counter.increment));
    }

    #[test]
    fn transform_is_idempotent() {
        let irata = IrataDecl::build();
        let once = transformed(&irata);
        let twice = StepIndexTransformer.run(once.clone(), &irata).unwrap();
        assert_eq!(once, twice);
    }
}
