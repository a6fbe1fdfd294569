use hdl::{MemoryDecl, Topology};

use crate::bank::Controls;
use crate::bus::Bus;
use crate::error::TickError;
use crate::word::WordRegister;

const MEMORY_SIZE: usize = 0x10000;

/// 64 KiB of RAM behind a word-wide address register. The data port drives
/// or samples the data bus at whatever address the register currently
/// holds.
pub struct Memory {
    decl: MemoryDecl,
    mar: WordRegister,
    ram: Vec<u8>,
}

impl Memory {
    pub fn new(decl: MemoryDecl) -> Memory {
        Memory { decl, mar: WordRegister::new(decl.mar), ram: vec![0; MEMORY_SIZE] }
    }

    pub fn load(&mut self, origin: u16, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.ram[origin as usize + offset] = *byte;
        }
    }

    pub fn get(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    pub fn set(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    pub fn address(&self) -> u16 {
        self.mar.value()
    }

    pub fn tick_write(
        &self,
        controls: &Controls,
        address_bus: &mut Bus,
        data_bus: &mut Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if controls.get(self.decl.write) {
            let value = self.ram[self.mar.value() as usize];
            log::trace!("memory[0x{:04x}] drives 0x{:02x}", self.mar.value(), value);
            data_bus.set(value as u16, self.decl.component, topology)?;
        }
        self.mar.tick_write(controls, address_bus, data_bus, topology)
    }

    pub fn tick_read(
        &mut self,
        controls: &Controls,
        address_bus: &Bus,
        data_bus: &Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if controls.get(self.decl.read) {
            let value = data_bus.read(self.decl.component, topology)? as u8;
            log::trace!("memory[0x{:04x}] latches 0x{:02x}", self.mar.value(), value);
            self.ram[self.mar.value() as usize] = value;
        }
        self.mar.tick_read(controls, address_bus, data_bus, topology)
    }

    pub fn tick_process(&mut self, controls: &Controls) {
        self.mar.tick_process(controls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdl::IrataDecl;

    #[test]
    fn data_port_uses_the_address_register() {
        let irata = IrataDecl::build();
        let topology = &irata.topology;
        let mut controls = Controls::new(topology);
        let mut memory = Memory::new(irata.memory);
        memory.load(0x0200, &[0xaa, 0xbb]);

        // Latch an address, then drive the data port next tick.
        let mut address_bus = Bus::new(irata.address_bus);
        let mut data_bus = Bus::new(irata.data_bus);
        address_bus.set(0x0201, irata.cpu.pc.component, topology).unwrap();
        controls.set(irata.memory.mar.read, true);
        memory.tick_read(&controls, &address_bus, &data_bus, topology).unwrap();
        controls.set(irata.memory.mar.read, false);
        address_bus.clear();

        controls.set(irata.memory.write, true);
        memory.tick_write(&controls, &mut address_bus, &mut data_bus, topology).unwrap();
        assert_eq!(data_bus.get(), Some(0xbb));
    }

    #[test]
    fn data_port_read_stores_at_the_address_register() {
        let irata = IrataDecl::build();
        let topology = &irata.topology;
        let mut controls = Controls::new(topology);
        let mut memory = Memory::new(irata.memory);
        let address_bus = Bus::new(irata.address_bus);
        let mut data_bus = Bus::new(irata.data_bus);

        data_bus.set(0x42, irata.cpu.a.component, topology).unwrap();
        controls.set(irata.memory.read, true);
        memory.tick_read(&controls, &address_bus, &data_bus, topology).unwrap();
        assert_eq!(memory.get(0), 0x42);
    }
}
