//! The controller and the bit-level encoders behind its instruction memory.
//!
//! Address layout, most significant first: opcode, step index, status bits.
//! Each field is exactly wide enough for the largest value the compiled
//! table contains, so the image is as small as the instruction set allows.

use std::collections::{BTreeMap, BTreeSet};

use common::bits_to_represent;
use hdl::{ControlId, IrataDecl, StatusId, Topology};
use itertools::Itertools;
use ucode::ir::permute_statuses;
use ucode::Table;

use crate::bank::{Controls, Statuses};
use crate::bus::Bus;
use crate::counter::Counter;
use crate::error::{EncodeError, TickError};
use crate::register::Register;

/// Maps each status the table discriminates on to a dense bit index.
pub struct StatusEncoder<'a> {
    topology: &'a Topology,
    indices: BTreeMap<StatusId, u32>,
}

impl<'a> StatusEncoder<'a> {
    pub fn new(
        topology: &'a Topology,
        statuses: &BTreeSet<StatusId>,
    ) -> Result<StatusEncoder<'a>, EncodeError> {
        if statuses.len() > 8 {
            return Err(EncodeError::TooManyStatuses(statuses.len()));
        }
        let indices = statuses.iter().enumerate().map(|(i, s)| (*s, i as u32)).collect();
        Ok(StatusEncoder { topology, indices })
    }

    pub fn num_bits(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn statuses(&self) -> impl Iterator<Item = StatusId> + '_ {
        self.indices.keys().copied()
    }

    /// Packs a complete assignment into a bitmask. The assignment must bind
    /// every known status and nothing else.
    pub fn encode(&self, statuses: &BTreeMap<StatusId, bool>) -> Result<u8, EncodeError> {
        for status in statuses.keys() {
            if !self.indices.contains_key(status) {
                return Err(EncodeError::UnknownStatus(self.topology.status_path(*status)));
            }
        }
        let mut value = 0u8;
        for (status, index) in &self.indices {
            match statuses.get(status) {
                None => {
                    return Err(EncodeError::MissingStatus(self.topology.status_path(*status)))
                }
                Some(true) => value |= 1 << index,
                Some(false) => {}
            }
        }
        Ok(value)
    }

    /// Exact inverse of `encode` over the known statuses; unknown bits are
    /// ignored.
    pub fn decode(&self, value: u8) -> BTreeMap<StatusId, bool> {
        self.indices.iter().map(|(s, i)| (*s, value >> i & 1 != 0)).collect()
    }

    /// All complete assignments agreeing with `partial`.
    pub fn permute(
        &self,
        partial: &BTreeMap<StatusId, bool>,
    ) -> Result<Vec<BTreeMap<StatusId, bool>>, EncodeError> {
        for status in partial.keys() {
            if !self.indices.contains_key(status) {
                return Err(EncodeError::UnknownStatus(self.topology.status_path(*status)));
            }
        }
        let universe: BTreeSet<StatusId> = self.indices.keys().copied().collect();
        Ok(permute_statuses(&universe, partial))
    }
}

/// Maps each control the table asserts to a bit in the control word.
pub struct ControlEncoder<'a> {
    topology: &'a Topology,
    indices: BTreeMap<ControlId, u32>,
}

impl<'a> ControlEncoder<'a> {
    pub fn new(
        topology: &'a Topology,
        controls: &BTreeSet<ControlId>,
    ) -> Result<ControlEncoder<'a>, EncodeError> {
        if controls.len() > 32 {
            return Err(EncodeError::TooManyControls(controls.len()));
        }
        let indices = controls.iter().enumerate().map(|(i, c)| (*c, i as u32)).collect();
        Ok(ControlEncoder { topology, indices })
    }

    pub fn num_controls(&self) -> usize {
        self.indices.len()
    }

    pub fn encode(&self, controls: &BTreeSet<ControlId>) -> Result<u32, EncodeError> {
        let mut value = 0u32;
        for control in controls {
            match self.indices.get(control) {
                None => {
                    return Err(EncodeError::UnknownControl(self.topology.control_path(*control)))
                }
                Some(index) => value |= 1 << index,
            }
        }
        Ok(value)
    }

    pub fn decode(&self, value: u32) -> BTreeSet<ControlId> {
        self.indices
            .iter()
            .filter(|(_, index)| value >> **index & 1 != 0)
            .map(|(control, _)| *control)
            .collect()
    }
}

/// Packs (opcode, statuses, step index) into a flat address and back.
pub struct InstructionEncoder<'a> {
    statuses: StatusEncoder<'a>,
    num_opcode_bits: u32,
    num_step_bits: u32,
}

impl<'a> InstructionEncoder<'a> {
    pub fn new(topology: &'a Topology, table: &Table) -> Result<InstructionEncoder<'a>, EncodeError> {
        let statuses = StatusEncoder::new(topology, &table.statuses())?;
        let num_opcode_bits = bits_to_represent(table.max_opcode() as u32);
        let num_step_bits = bits_to_represent(table.max_step_index() as u32);
        let total = num_opcode_bits + num_step_bits + statuses.num_bits();
        if total > 16 {
            return Err(EncodeError::TooManyAddressBits(total));
        }
        Ok(InstructionEncoder { statuses, num_opcode_bits, num_step_bits })
    }

    pub fn status_encoder(&self) -> &StatusEncoder<'a> {
        &self.statuses
    }

    pub fn num_address_bits(&self) -> u32 {
        self.num_opcode_bits + self.num_step_bits + self.statuses.num_bits()
    }

    pub fn encode_address(
        &self,
        opcode: u8,
        statuses: &BTreeMap<StatusId, bool>,
        step_index: u8,
    ) -> Result<u16, EncodeError> {
        if bits_to_represent(opcode as u32) > self.num_opcode_bits {
            return Err(EncodeError::OpcodeOutOfRange { opcode, bits: self.num_opcode_bits });
        }
        if bits_to_represent(step_index as u32) > self.num_step_bits {
            return Err(EncodeError::StepIndexOutOfRange {
                step_index,
                bits: self.num_step_bits,
            });
        }
        let status_bits = self.statuses.num_bits();
        let statuses = self.statuses.encode(statuses)?;
        Ok((opcode as u16) << (self.num_step_bits + status_bits)
            | (step_index as u16) << status_bits
            | statuses as u16)
    }

    /// Exact inverse of `encode_address`.
    pub fn decode_address(&self, address: u16) -> (u8, BTreeMap<StatusId, bool>, u8) {
        let status_bits = self.statuses.num_bits();
        let status_mask = (1u16 << status_bits) - 1;
        let step_mask = (1u16 << self.num_step_bits) - 1;
        let statuses = self.statuses.decode((address & status_mask) as u8);
        let step_index = (address >> status_bits & step_mask) as u8;
        let opcode = (address >> (status_bits + self.num_step_bits)) as u8;
        (opcode, statuses, step_index)
    }
}

/// The flat control ROM image: every address the encoder can produce for a
/// table entry, mapped to its packed control word.
pub struct InstructionMemory<'a> {
    encoder: InstructionEncoder<'a>,
    controls: ControlEncoder<'a>,
    image: BTreeMap<u16, u32>,
}

impl<'a> InstructionMemory<'a> {
    pub fn build(topology: &'a Topology, table: &Table) -> Result<InstructionMemory<'a>, EncodeError> {
        let encoder = InstructionEncoder::new(topology, table)?;
        let controls = ControlEncoder::new(topology, &table.controls())?;
        let mut image = BTreeMap::new();
        for entry in &table.entries {
            for assignment in encoder.status_encoder().permute(&entry.statuses)? {
                let address =
                    encoder.encode_address(entry.instruction.opcode, &assignment, entry.step_index)?;
                let word = controls.encode(&entry.controls)?;
                if image.insert(address, word).is_some() {
                    return Err(EncodeError::DuplicateAddress(address));
                }
            }
        }
        log::debug!(
            "instruction memory: {} entries over {} address bits, {} controls",
            image.len(),
            encoder.num_address_bits(),
            controls.num_controls()
        );
        Ok(InstructionMemory { encoder, controls, image })
    }

    pub fn encoder(&self) -> &InstructionEncoder<'a> {
        &self.encoder
    }

    pub fn control_encoder(&self) -> &ControlEncoder<'a> {
        &self.controls
    }

    pub fn get(&self, address: u16) -> Option<u32> {
        self.image.get(&address).copied()
    }

    /// Decoded lookup: encodes the address, reads the image, and unpacks
    /// the control word.
    pub fn read(
        &self,
        opcode: u8,
        statuses: &BTreeMap<StatusId, bool>,
        step_index: u8,
    ) -> Result<BTreeSet<ControlId>, TickError> {
        let address = self.encoder.encode_address(opcode, statuses, step_index)?;
        let word = self
            .image
            .get(&address)
            .copied()
            .ok_or(TickError::UnknownAddress { opcode, step_index, address })?;
        Ok(self.controls.decode(word))
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.image.iter().map(|(a, w)| (*a, *w))
    }
}

/// The controller: samples statuses, looks up the current address in the
/// instruction memory, and asserts the resulting control lines. Owns the
/// opcode register and the step counter the address is formed from.
pub struct Controller<'a> {
    topology: &'a Topology,
    memory: InstructionMemory<'a>,
    opcode: Register,
    step_counter: Counter,
}

impl<'a> Controller<'a> {
    pub fn new(irata: &'a IrataDecl, table: &Table) -> Result<Controller<'a>, EncodeError> {
        let mut opcode = Register::new(irata.cpu.controller.opcode);
        // Every instruction opens with the same fetch, so booting from any
        // table opcode runs fetch and then dispatches on the opcode the
        // fetch loaded.
        if let Some(boot) = table.entries.iter().map(|e| e.instruction.opcode).min() {
            opcode.set_value(boot);
        }
        Ok(Controller {
            topology: &irata.topology,
            memory: InstructionMemory::build(&irata.topology, table)?,
            opcode,
            step_counter: Counter::new(irata.cpu.controller.step_counter),
        })
    }

    pub fn opcode(&self) -> u8 {
        self.opcode.value()
    }

    pub fn step_index(&self) -> u8 {
        self.step_counter.value()
    }

    pub fn memory(&self) -> &InstructionMemory<'a> {
        &self.memory
    }

    pub fn tick_control(
        &self,
        controls: &mut Controls,
        statuses: &Statuses,
    ) -> Result<(), TickError> {
        let mut assignment = BTreeMap::new();
        for status in self.memory.encoder().status_encoder().statuses() {
            let value = statuses.lookup(status).ok_or_else(|| {
                TickError::StatusNotFound(self.topology.status_path(status))
            })?;
            assignment.insert(status, value);
        }
        let opcode = self.opcode.value();
        let step_index = self.step_counter.value();
        let asserted = self.memory.read(opcode, &assignment, step_index)?;
        log::trace!(
            "opcode 0x{:02x} step {} -> {}",
            opcode,
            step_index,
            asserted.iter().map(|c| self.topology.control_path(*c)).join(", ")
        );
        for control in asserted {
            if controls.lookup(control).is_none() {
                return Err(TickError::ControlNotFound(self.topology.control_path(control)));
            }
            controls.set(control, true);
        }
        Ok(())
    }

    pub fn tick_write(
        &self,
        controls: &Controls,
        bus: &mut Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        self.opcode.tick_write(controls, bus, topology)
    }

    pub fn tick_read(
        &mut self,
        controls: &Controls,
        bus: &Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        self.opcode.tick_read(controls, bus, topology)
    }

    pub fn tick_process(&mut self, controls: &Controls) {
        self.opcode.tick_process(controls);
        self.step_counter.tick_process(controls);
    }
}
