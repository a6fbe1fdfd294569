use hdl::IrataDecl;
use ucode::Table;

use crate::bank::{Controls, Statuses};
use crate::bus::Bus;
use crate::controller::Controller;
use crate::counter::IndexCounter;
use crate::error::{EncodeError, TickError};
use crate::memory::Memory;
use crate::register::Register;
use crate::status_register::StatusRegister;
use crate::word::{WordCounter, WordRegister};

/// The whole machine: every component instantiated against one topology,
/// stepped through the five tick phases in a fixed traversal order.
pub struct Machine<'a> {
    irata: &'a IrataDecl,
    controls: Controls,
    statuses: Statuses,
    address_bus: Bus,
    data_bus: Bus,
    a: Register,
    x: IndexCounter,
    y: Register,
    pc: WordCounter,
    buffer: WordRegister,
    status_register: StatusRegister,
    controller: Controller<'a>,
    memory: Memory,
    halted: bool,
    cycles: u64,
}

impl<'a> Machine<'a> {
    pub fn new(irata: &'a IrataDecl, table: &Table) -> Result<Machine<'a>, EncodeError> {
        Ok(Machine {
            irata,
            controls: Controls::new(&irata.topology),
            statuses: Statuses::new(&irata.topology),
            address_bus: Bus::new(irata.address_bus),
            data_bus: Bus::new(irata.data_bus),
            a: Register::new(irata.cpu.a),
            x: IndexCounter::new(irata.cpu.x),
            y: Register::new(irata.cpu.y),
            pc: WordCounter::new(irata.cpu.pc),
            buffer: WordRegister::new(irata.cpu.buffer),
            status_register: StatusRegister::new(irata.cpu.status_register),
            controller: Controller::new(irata, table)?,
            memory: Memory::new(irata.memory),
            halted: false,
            cycles: 0,
        })
    }

    pub fn a(&self) -> u8 {
        self.a.value()
    }

    pub fn x(&self) -> u8 {
        self.x.value()
    }

    pub fn y(&self) -> u8 {
        self.y.value()
    }

    pub fn pc(&self) -> u16 {
        self.pc.value()
    }

    pub fn status(&self) -> u8 {
        self.status_register.value()
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn controller(&self) -> &Controller<'a> {
        &self.controller
    }

    /// Writes `bytes` into memory. Execution starts wherever the program
    /// counter points; a fresh machine starts at address zero.
    pub fn load(&mut self, origin: u16, bytes: &[u8]) {
        self.memory.load(origin, bytes);
    }

    pub fn set_pc(&mut self, address: u16) {
        self.pc.set_value(address);
    }

    /// One full tick. A halted machine ticks as a no-op.
    pub fn tick(&mut self) -> Result<(), TickError> {
        if self.halted {
            return Ok(());
        }
        let topology = &self.irata.topology;

        // Control
        self.controller.tick_control(&mut self.controls, &self.statuses)?;

        // Write
        self.a.tick_write(&self.controls, &mut self.data_bus, topology)?;
        self.x.tick_write(&self.controls, &mut self.data_bus, topology)?;
        self.y.tick_write(&self.controls, &mut self.data_bus, topology)?;
        self.pc.tick_write(&self.controls, &mut self.address_bus, topology)?;
        self.buffer.tick_write(&self.controls, &mut self.address_bus, &mut self.data_bus, topology)?;
        self.status_register.tick_write(&self.controls, &mut self.data_bus, topology)?;
        self.controller.tick_write(&self.controls, &mut self.data_bus, topology)?;
        self.memory.tick_write(&self.controls, &mut self.address_bus, &mut self.data_bus, topology)?;

        // Read
        self.a.tick_read(&self.controls, &self.data_bus, topology)?;
        self.x.tick_read(&self.controls, &self.data_bus, topology)?;
        self.y.tick_read(&self.controls, &self.data_bus, topology)?;
        self.pc.tick_read(&self.controls, &self.address_bus, topology)?;
        self.buffer.tick_read(&self.controls, &self.address_bus, &self.data_bus, topology)?;
        self.status_register.tick_read(&self.controls, &self.data_bus, topology)?;
        self.controller.tick_read(&self.controls, &self.data_bus, topology)?;
        self.memory.tick_read(&self.controls, &self.address_bus, &self.data_bus, topology)?;

        // Process
        self.a.tick_process(&self.controls);
        self.x.tick_process(&self.controls, &mut self.statuses);
        self.y.tick_process(&self.controls);
        self.pc.tick_process(&self.controls);
        self.buffer.tick_process(&self.controls);
        self.status_register.tick_process(&self.controls);
        self.controller.tick_process(&self.controls);
        self.memory.tick_process(&self.controls);
        for (id, decl) in topology.controls() {
            if let Some(clear) = decl.clear {
                if self.controls.get(clear) {
                    self.controls.set(id, false);
                }
            }
        }
        if self.controls.get(self.irata.crash) {
            return Err(TickError::Crashed);
        }
        if self.controls.get(self.irata.halt) {
            log::debug!("halt asserted after {} cycles", self.cycles);
            self.halted = true;
        }

        // Clear
        self.status_register.tick_clear(&mut self.controls, &mut self.statuses);
        for (id, decl) in topology.controls() {
            if decl.auto_clear {
                self.controls.set(id, false);
            }
        }
        self.data_bus.clear();
        self.address_bus.clear();

        self.cycles += 1;
        Ok(())
    }

    /// Ticks until the machine halts or `max_ticks` is reached. Returns the
    /// total cycle count.
    pub fn run(&mut self, max_ticks: u64) -> Result<u64, TickError> {
        for _ in 0..max_ticks {
            if self.halted {
                break;
            }
            self.tick()?;
        }
        Ok(self.cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::StatusFlags;

    fn machine<'a>(irata: &'a IrataDecl, table: &Table) -> Machine<'a> {
        Machine::new(irata, table).unwrap()
    }

    fn compiled(irata: &IrataDecl) -> Table {
        ucode::compile_irata(irata).unwrap()
    }

    #[test]
    fn halt_stops_the_machine() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        machine.load(0x0000, &[0x01]); // hlt
        let cycles = machine.run(100).unwrap();
        assert!(machine.halted());
        assert!(cycles < 100);
        // Ticking a halted machine is a no-op.
        machine.tick().unwrap();
        assert_eq!(machine.cycles(), cycles);
    }

    #[test]
    fn crash_aborts_the_run() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        machine.load(0x0000, &[0x02]); // crs
        assert!(matches!(machine.run(100), Err(TickError::Crashed)));
    }

    #[test]
    fn unknown_opcode_is_an_unknown_address() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        machine.load(0x0000, &[0x04]); // not in the catalog
        match machine.run(100) {
            Err(TickError::UnknownAddress { opcode, .. }) => assert_eq!(opcode, 0x04),
            other => panic!("expected unknown address, got {:?}", other),
        }
    }

    #[test]
    fn lda_immediate_loads_a() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        machine.load(0x0000, &[0x10, 0x2a, 0x01]); // lda #$2a; hlt
        machine.run(100).unwrap();
        assert!(machine.halted());
        assert_eq!(machine.a(), 0x2a);
        assert_eq!(machine.pc(), 0x0003);
    }

    #[test]
    fn lda_absolute_and_sta_round_trip_through_memory() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        // lda $0010; sta $0020; hlt; data at $0010
        machine.load(0x0000, &[0x11, 0x00, 0x10, 0x12, 0x00, 0x20, 0x01]);
        machine.memory_mut().set(0x0010, 0x5c);
        machine.run(200).unwrap();
        assert!(machine.halted());
        assert_eq!(machine.a(), 0x5c);
        assert_eq!(machine.memory().get(0x0020), 0x5c);
    }

    #[test]
    fn transfers_and_index_arithmetic() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        // lda #$07; tax; inx; inx; txa; hlt
        machine.load(0x0000, &[0x10, 0x07, 0x14, 0x16, 0x16, 0x15, 0x01]);
        machine.run(200).unwrap();
        assert_eq!(machine.x(), 0x09);
        assert_eq!(machine.a(), 0x09);
    }

    #[test]
    fn jmp_redirects_the_program_counter() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        // jmp $0010; crs; ... $0010: lda #$01; hlt
        machine.load(0x0000, &[0x20, 0x00, 0x10, 0x02]);
        machine.load(0x0010, &[0x10, 0x01, 0x01]);
        machine.run(200).unwrap();
        assert!(machine.halted());
        assert_eq!(machine.a(), 0x01);
    }

    #[test]
    fn dex_jne_loop_counts_down_to_zero() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        // ldx #$03; loop: dex; jne loop; hlt
        machine.load(0x0000, &[0x13, 0x03, 0x17, 0x22, 0x00, 0x02, 0x01]);
        machine.run(500).unwrap();
        assert!(machine.halted());
        assert_eq!(machine.x(), 0);
        assert_eq!(machine.status() & StatusFlags::ZERO.bits(), StatusFlags::ZERO.bits());
    }

    #[test]
    fn jeq_takes_the_branch_only_when_zero_is_latched() {
        let irata = IrataDecl::build();
        let table = compiled(&irata);
        let mut machine = machine(&irata, &table);
        // ldx #$01; dex -> zero; jeq $0010; crs; $0010: hlt
        machine.load(0x0000, &[0x13, 0x01, 0x17, 0x21, 0x00, 0x10, 0x02]);
        machine.load(0x0010, &[0x01]);
        machine.run(200).unwrap();
        assert!(machine.halted());

        // With X nonzero the branch falls through to the next instruction.
        let mut machine = Machine::new(&irata, &table).unwrap();
        machine.load(0x0000, &[0x13, 0x02, 0x17, 0x21, 0x00, 0x10, 0x01]);
        machine.load(0x0010, &[0x02]);
        machine.run(200).unwrap();
        assert!(machine.halted());
        assert_eq!(machine.x(), 1);
    }
}
