//! Builder-facing model of the microcode. Instructions are defined as chains
//! of builder calls; the result is a plain value tree that the compiler
//! converts to its own IR before running passes.

use std::collections::{BTreeMap, BTreeSet};

use common::AddressingMode;
use hdl::{BusConnection, ControlId, IrataDecl, StatusId};

use crate::error::DslError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Stage tag. Stage 0 is the shared fetch; the merger never merges steps
    /// across stage boundaries.
    pub stage: u8,
    pub controls: BTreeSet<ControlId>,
    pub write_controls: BTreeSet<ControlId>,
    pub read_controls: BTreeSet<ControlId>,
}

impl Step {
    fn empty(stage: u8) -> Step {
        Step {
            stage,
            controls: BTreeSet::new(),
            write_controls: BTreeSet::new(),
            read_controls: BTreeSet::new(),
        }
    }
}

/// One microcode variant: a catalog descriptor, the status predicate it
/// applies under, and its steps. An instruction with status-dependent
/// behavior is defined as several variants of the same descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub descriptor: common::Instruction,
    pub statuses: BTreeMap<StatusId, bool>,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionSet {
    pub instructions: Vec<Instruction>,
}

/// Chaining builder for instruction sets. Methods never fail individually;
/// the first error poisons the builder and is reported by `build`, so
/// definitions read as uninterrupted chains.
pub struct InstructionSetBuilder<'a> {
    irata: &'a IrataDecl,
    instructions: Vec<Instruction>,
    stage: u8,
    error: Option<DslError>,
}

impl<'a> InstructionSetBuilder<'a> {
    pub fn new(irata: &'a IrataDecl) -> InstructionSetBuilder<'a> {
        InstructionSetBuilder { irata, instructions: Vec::new(), stage: 0, error: None }
    }

    /// Starts a new instruction variant. The canonical fetch (program counter
    /// to the memory address register, memory to the opcode register,
    /// program counter increment) is inserted as stage 0; caller-defined
    /// steps start at stage 1.
    pub fn instruction(&mut self, name: &str, mode: AddressingMode) -> &mut Self {
        let descriptor = match common::find_instruction(name, mode) {
            Some(descriptor) => *descriptor,
            None => {
                return self.poison(DslError::InvalidArgument(format!(
                    "no catalog instruction {} {}",
                    name, mode
                )))
            }
        };
        self.instructions.push(Instruction {
            descriptor,
            statuses: BTreeMap::new(),
            steps: Vec::new(),
        });
        self.stage = 0;
        self.fetch();
        self.next_stage()
    }

    fn fetch(&mut self) {
        let pc = self.irata.cpu.pc;
        let mar = self.irata.memory.mar;
        let memory = self.irata.memory;
        let opcode = self.irata.cpu.controller.opcode;
        self.copy(&pc, &mar);
        self.copy(&memory, &opcode);
        self.step();
        self.control(pc.increment);
    }

    /// Starts a new empty step in the current instruction.
    pub fn step(&mut self) -> &mut Self {
        let stage = self.stage;
        match self.instructions.last_mut() {
            Some(instruction) => {
                instruction.steps.push(Step::empty(stage));
                self
            }
            None => self.poison(DslError::InvalidArgument(
                "step before any instruction".to_string(),
            )),
        }
    }

    /// Advances the stage counter. Steps in different stages are never
    /// merged, which pins down deliberate sequencing such as back-to-back
    /// increments of the same counter.
    pub fn next_stage(&mut self) -> &mut Self {
        self.stage += 1;
        self
    }

    /// Adds a control to the current step.
    pub fn control(&mut self, control: ControlId) -> &mut Self {
        self.add_control(control, false, false)
    }

    /// Adds a bus write control to the current step.
    pub fn write_control(&mut self, control: ControlId) -> &mut Self {
        self.add_control(control, true, false)
    }

    /// Adds a bus read control to the current step.
    pub fn read_control(&mut self, control: ControlId) -> &mut Self {
        self.add_control(control, false, true)
    }

    fn add_control(&mut self, control: ControlId, write: bool, read: bool) -> &mut Self {
        let step = self.instructions.last_mut().and_then(|i| i.steps.last_mut());
        match step {
            Some(step) => {
                step.controls.insert(control);
                if write {
                    step.write_controls.insert(control);
                }
                if read {
                    step.read_controls.insert(control);
                }
                self
            }
            None => self.poison(DslError::InvalidArgument(
                "control before any step".to_string(),
            )),
        }
    }

    /// Constrains the current variant to a status value. Re-constraining a
    /// status to the same value is a no-op; to a different value, an error.
    pub fn with_status(&mut self, status: StatusId, value: bool) -> &mut Self {
        let topology = &self.irata.topology;
        let error = match self.instructions.last_mut() {
            None => Some(DslError::InvalidArgument(
                "with_status before any instruction".to_string(),
            )),
            Some(instruction) => match instruction.statuses.insert(status, value) {
                Some(current) if current != value => Some(DslError::StatusConflict {
                    instruction: instruction.descriptor.to_string(),
                    status: topology.status_path(status),
                    current,
                    requested: value,
                }),
                _ => None,
            },
        };
        match error {
            Some(error) => self.poison(error),
            None => self,
        }
    }

    /// One step copying `from` to `to` over their shared bus.
    pub fn copy(&mut self, from: &dyn BusConnection, to: &dyn BusConnection) -> &mut Self {
        if from.write_control() == to.write_control() {
            let path = self.irata.topology.control_path(from.write_control());
            return self.poison(DslError::InvalidArgument(format!(
                "cannot copy {} to itself",
                path
            )));
        }
        if from.bus() != to.bus() {
            let topology = &self.irata.topology;
            return self.poison(DslError::InvalidArgument(format!(
                "cannot copy across buses: {} is on {} but {} is on {}",
                topology.control_path(from.write_control()),
                topology.bus_path(from.bus()),
                topology.control_path(to.read_control()),
                topology.bus_path(to.bus()),
            )));
        }
        let write = from.write_control();
        let read = to.read_control();
        self.step();
        self.write_control(write);
        self.read_control(read)
    }

    /// Reads the byte at the program counter into `dest` and advances the
    /// program counter.
    pub fn read_memory_at_pc(&mut self, dest: &dyn BusConnection) -> &mut Self {
        let pc = self.irata.cpu.pc;
        let mar = self.irata.memory.mar;
        let memory = self.irata.memory;
        self.copy(&pc, &mar);
        self.copy(&memory, dest);
        self.step();
        self.control(pc.increment)
    }

    /// Reads a big-endian word operand at the program counter into `dest`
    /// via the transfer buffer, advancing the program counter past both
    /// bytes.
    pub fn read_word_at_pc(&mut self, dest: &dyn BusConnection) -> &mut Self {
        let buffer = self.irata.cpu.buffer;
        self.read_memory_at_pc(&buffer.high);
        self.read_memory_at_pc(&buffer.low);
        self.copy(&buffer, dest)
    }

    /// Reads the byte at the address named by a word operand into `dest`.
    pub fn indirect_read_memory_at_pc(&mut self, dest: &dyn BusConnection) -> &mut Self {
        let mar = self.irata.memory.mar;
        let memory = self.irata.memory;
        self.read_word_at_pc(&mar);
        self.copy(&memory, dest)
    }

    /// Writes `source` to the address named by a word operand.
    pub fn indirect_write_memory_at_pc(&mut self, source: &dyn BusConnection) -> &mut Self {
        let mar = self.irata.memory.mar;
        let memory = self.irata.memory;
        self.read_word_at_pc(&mar);
        self.copy(source, &memory)
    }

    fn poison(&mut self, error: DslError) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    pub fn build(self) -> Result<InstructionSet, DslError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(InstructionSet { instructions: self.instructions }),
        }
    }
}
