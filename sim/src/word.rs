use hdl::{Topology, WordCounterDecl, WordRegisterDecl};

use crate::bank::Controls;
use crate::bus::Bus;
use crate::error::TickError;

/// Word register on the address bus, with byte halves on the data bus.
pub struct WordRegister {
    decl: WordRegisterDecl,
    value: u16,
}

impl WordRegister {
    pub fn new(decl: WordRegisterDecl) -> WordRegister {
        WordRegister { decl, value: 0 }
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn set_value(&mut self, value: u16) {
        self.value = value;
    }

    pub fn tick_write(
        &self,
        controls: &Controls,
        address_bus: &mut Bus,
        data_bus: &mut Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if controls.get(self.decl.write) {
            address_bus.set(self.value, self.decl.component, topology)?;
        }
        if controls.get(self.decl.high.write) {
            data_bus.set(self.value >> 8, self.decl.high.component, topology)?;
        }
        if controls.get(self.decl.low.write) {
            data_bus.set(self.value & 0xff, self.decl.low.component, topology)?;
        }
        Ok(())
    }

    pub fn tick_read(
        &mut self,
        controls: &Controls,
        address_bus: &Bus,
        data_bus: &Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if controls.get(self.decl.read) {
            self.value = address_bus.read(self.decl.component, topology)?;
        }
        if controls.get(self.decl.high.read) {
            let byte = data_bus.read(self.decl.high.component, topology)? as u8;
            self.value = (self.value & 0x00ff) | ((byte as u16) << 8);
        }
        if controls.get(self.decl.low.read) {
            let byte = data_bus.read(self.decl.low.component, topology)? as u8;
            self.value = (self.value & 0xff00) | byte as u16;
        }
        Ok(())
    }

    pub fn tick_process(&mut self, controls: &Controls) {
        if controls.get(self.decl.reset) {
            self.value = 0;
        }
        if controls.get(self.decl.high.reset) {
            self.value &= 0x00ff;
        }
        if controls.get(self.decl.low.reset) {
            self.value &= 0xff00;
        }
    }
}

/// The program counter: a word counter on the address bus.
pub struct WordCounter {
    decl: WordCounterDecl,
    value: u16,
}

impl WordCounter {
    pub fn new(decl: WordCounterDecl) -> WordCounter {
        WordCounter { decl, value: 0 }
    }

    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn set_value(&mut self, value: u16) {
        self.value = value;
    }

    pub fn tick_write(
        &self,
        controls: &Controls,
        bus: &mut Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if controls.get(self.decl.write) {
            bus.set(self.value, self.decl.component, topology)?;
        }
        Ok(())
    }

    pub fn tick_read(
        &mut self,
        controls: &Controls,
        bus: &Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if controls.get(self.decl.read) {
            self.value = bus.read(self.decl.component, topology)?;
        }
        Ok(())
    }

    pub fn tick_process(&mut self, controls: &Controls) {
        if controls.get(self.decl.reset) {
            self.value = 0;
        } else if controls.get(self.decl.increment) {
            self.value = self.value.wrapping_add(1);
        }
    }
}
