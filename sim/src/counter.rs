use hdl::{IndexCounterDecl, StepCounterDecl, Topology};

use crate::bank::{Controls, Statuses};
use crate::bus::Bus;
use crate::error::TickError;

/// The controller's step counter. Not bus-connected; reset wins over
/// increment if microcode ever asserts both.
pub struct Counter {
    decl: StepCounterDecl,
    value: u8,
}

impl Counter {
    pub fn new(decl: StepCounterDecl) -> Counter {
        Counter { decl, value: 0 }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn tick_process(&mut self, controls: &Controls) {
        if controls.get(self.decl.reset) {
            self.value = 0;
        } else if controls.get(self.decl.increment) {
            self.value = self.value.wrapping_add(1);
        }
    }
}

/// Index register X: a byte counter on the data bus whose zero/negative
/// detect lines track its value combinationally. The lines are refreshed
/// every Process phase, after any increment or decrement has settled.
pub struct IndexCounter {
    decl: IndexCounterDecl,
    value: u8,
}

impl IndexCounter {
    pub fn new(decl: IndexCounterDecl) -> IndexCounter {
        IndexCounter { decl, value: 0 }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    pub fn tick_write(
        &self,
        controls: &Controls,
        bus: &mut Bus,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if controls.get(self.decl.write) {
            bus.set(self.value as u16, self.decl.component, topology)?;
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
            self.value = bus.read(self.decl.component, topology)? as u8;
        }
        Ok(())
    }

    pub fn tick_process(&mut self, controls: &Controls, statuses: &mut Statuses) {
        if controls.get(self.decl.reset) {
            self.value = 0;
        } else if controls.get(self.decl.increment) {
            self.value = self.value.wrapping_add(1);
        } else if controls.get(self.decl.decrement) {
            self.value = self.value.wrapping_sub(1);
        }
        statuses.set(self.decl.zero, self.value == 0);
        statuses.set(self.decl.negative, self.value & 0x80 != 0);
    }
}
