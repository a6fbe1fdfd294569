use hdl::{IrataDecl, Topology};

use crate::error::CompileError;
use crate::ir;
use crate::passes::Pass;

/// Merges adjacent steps whose phase windows do not overlap backwards: an
/// earlier step may absorb its successor only when every control in the
/// earlier step acts no later than every control in the later one, and both
/// steps belong to the same stage. Greedy and idempotent.
pub struct StepMerger;

fn can_merge(earlier: &ir::Step, later: &ir::Step, topology: &Topology) -> bool {
    earlier.stage == later.stage && earlier.max_phase(topology) <= later.min_phase(topology)
}

impl Pass for StepMerger {
    fn name(&self) -> &'static str {
        "step_merger"
    }

    fn run(
        &self,
        mut instruction_set: ir::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        let topology = &irata.topology;
        for instruction in &mut instruction_set.instructions {
            let mut merged: Vec<ir::Step> = Vec::with_capacity(instruction.steps.len());
            for step in instruction.steps.drain(..) {
                match merged.last_mut() {
                    Some(last) if can_merge(last, &step, topology) => {
                        last.controls.extend(step.controls);
                        last.write_controls.extend(step.write_controls);
                        last.read_controls.extend(step.read_controls);
                    }
                    _ => merged.push(step),
                }
            }
            instruction.steps = merged;
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
    fn fetch_read_merges_with_increment() {
        let irata = IrataDecl::build();
        let mut builder = InstructionSetBuilder::new(&irata);
        builder.instruction("nop", AddressingMode::None).step();
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        let merged = StepMerger.run(set, &irata).unwrap();
        let nop = &merged.instructions[0];
        // Three fetch steps collapse to two: the memory-to-opcode read
        // absorbs the program counter increment.
        assert_eq!(nop.steps.iter().filter(|s| s.stage == 0).count(), 2);
        assert!(nop.steps[1].controls.contains(&irata.cpu.controller.opcode.read));
        assert!(nop.steps[1].controls.contains(&irata.cpu.pc.increment));
    }

    #[test]
    fn write_after_read_never_merges() {
        let irata = IrataDecl::build();
        let mut builder = InstructionSetBuilder::new(&irata);
        // Two consecutive bus copies each need their own step: the second
        // copy's write would race the first copy's read.
        builder
            .instruction("tax", AddressingMode::None)
            .copy(&irata.cpu.a, &irata.cpu.x)
            .copy(&irata.cpu.x, &irata.cpu.y);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        let merged = StepMerger.run(set, &irata).unwrap();
        let tax = &merged.instructions[0];
        let body: Vec<_> = tax.steps.iter().filter(|s| s.stage == 1).collect();
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn different_stages_never_merge() {
        let irata = IrataDecl::build();
        let increment = irata.cpu.pc.increment;
        let mut builder = InstructionSetBuilder::new(&irata);
        builder
            .instruction("nop", AddressingMode::None)
            .step()
            .control(increment)
            .next_stage()
            .step()
            .control(increment);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        let merged = StepMerger.run(set, &irata).unwrap();
        let nop = &merged.instructions[0];
        let increments = nop
            .steps
            .iter()
            .filter(|s| s.stage >= 1 && s.controls.contains(&increment))
            .count();
        assert_eq!(increments, 2);
    }

    #[test]
    fn merging_is_idempotent() {
        let irata = IrataDecl::build();
        let mut builder = InstructionSetBuilder::new(&irata);
        builder
            .instruction("lda", AddressingMode::Absolute)
            .indirect_read_memory_at_pc(&irata.cpu.a);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        let once = StepMerger.run(set, &irata).unwrap();
        let twice = StepMerger.run(once.clone(), &irata).unwrap();
        assert_eq!(once, twice);
    }
}
