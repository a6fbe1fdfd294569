use std::collections::BTreeMap;

use hdl::{BusId, IrataDecl};

use crate::error::CompileError;
use crate::ir;
use crate::passes::Pass;

/// Per-step bus discipline: every bus a step touches must have exactly one
/// writer and at least one reader. A floating driver, a reader with nothing
/// driving, and competing drivers are all conflicts.
pub struct BusValidator;

impl Pass for BusValidator {
    fn name(&self) -> &'static str {
        "bus_validator"
    }

    fn run(
        &self,
        instruction_set: ir::InstructionSet,
        irata: &IrataDecl,
    ) -> Result<ir::InstructionSet, CompileError> {
        let topology = &irata.topology;
        for instruction in &instruction_set.instructions {
            for (step_index, step) in instruction.steps.iter().enumerate() {
                let mut writers: BTreeMap<BusId, usize> = BTreeMap::new();
                let mut readers: BTreeMap<BusId, usize> = BTreeMap::new();
                for control in &step.write_controls {
                    if let Some(bus) = topology.control(*control).bus {
                        *writers.entry(bus).or_insert(0) += 1;
                    }
                }
                for control in &step.read_controls {
                    if let Some(bus) = topology.control(*control).bus {
                        *readers.entry(bus).or_insert(0) += 1;
                    }
                }
                let buses: std::collections::BTreeSet<BusId> =
                    writers.keys().chain(readers.keys()).copied().collect();
                for bus in buses {
                    let written = writers.get(&bus).copied().unwrap_or(0);
                    let read = readers.get(&bus).copied().unwrap_or(0);
                    let problem = match (written, read) {
                        (1, r) if r >= 1 => continue,
                        (0, _) => "a reader but no writer".to_string(),
                        (1, 0) => "a writer but no reader".to_string(),
                        (w, _) => format!("{} writers", w),
                    };
                    return Err(CompileError::BusConflict {
                        instruction: instruction.descriptor.to_string(),
                        step_index,
                        bus: topology.bus_path(bus),
                        problem,
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
    fn single_writer_single_reader_passes() {
        let irata = IrataDecl::build();
        let mut builder = InstructionSetBuilder::new(&irata);
        builder.instruction("tax", AddressingMode::None).copy(&irata.cpu.a, &irata.cpu.x);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        assert!(BusValidator.run(set, &irata).is_ok());
    }

    #[test]
    fn two_writers_on_one_bus_rejected() {
        let irata = IrataDecl::build();
        let x_write = irata.cpu.x.write;
        let mut builder = InstructionSetBuilder::new(&irata);
        builder
            .instruction("tax", AddressingMode::None)
            .copy(&irata.cpu.a, &irata.cpu.y)
            .write_control(x_write);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        match BusValidator.run(set, &irata) {
            Err(CompileError::BusConflict { bus, problem, .. }) => {
                assert_eq!(bus, "/data_bus");
                assert!(problem.contains("2 writers"));
            }
            other => panic!("expected bus conflict, got {:?}", other),
        }
    }

    #[test]
    fn reader_without_writer_rejected() {
        let irata = IrataDecl::build();
        let a_read = irata.cpu.a.read;
        let mut builder = InstructionSetBuilder::new(&irata);
        builder.instruction("nop", AddressingMode::None).step().read_control(a_read);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        match BusValidator.run(set, &irata) {
            Err(CompileError::BusConflict { problem, .. }) => {
                assert!(problem.contains("no writer"));
            }
            other => panic!("expected bus conflict, got {:?}", other),
        }
    }

    #[test]
    fn writer_without_reader_is_a_floating_driver() {
        let irata = IrataDecl::build();
        let a_write = irata.cpu.a.write;
        let mut builder = InstructionSetBuilder::new(&irata);
        builder.instruction("nop", AddressingMode::None).step().write_control(a_write);
        let set = ir::InstructionSet::from_dsl(&builder.build().unwrap());
        match BusValidator.run(set, &irata) {
            Err(CompileError::BusConflict { problem, .. }) => {
                assert!(problem.contains("no reader"));
            }
            other => panic!("expected bus conflict, got {:?}", other),
        }
    }
}
