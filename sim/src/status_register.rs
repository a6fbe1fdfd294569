use common::StatusFlags;
use hdl::{StatusRegisterDecl, Topology};

use crate::bank::{Controls, Statuses};
use crate::bus::Bus;
use crate::error::TickError;

/// Latching status register. While the latch control is asserted, the Clear
/// phase packs the incoming detect lines into the register value and
/// forwards them to the latched output lines the microcode branches on.
/// The latch is persistent, so it survives the auto-clear sweep; it clears
/// itself once it has acted.
pub struct StatusRegister {
    decl: StatusRegisterDecl,
    value: u8,
}

impl StatusRegister {
    pub fn new(decl: StatusRegisterDecl) -> StatusRegister {
        StatusRegister { decl, value: 0 }
    }

    pub fn value(&self) -> u8 {
        self.value
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

    pub fn tick_process(&mut self, controls: &Controls) {
        if controls.get(self.decl.reset) {
            self.value = 0;
        }
    }

    pub fn tick_clear(&mut self, controls: &mut Controls, statuses: &mut Statuses) {
        if !controls.get(self.decl.latch) {
            return;
        }
        let zero = statuses.get(self.decl.zero_in);
        let negative = statuses.get(self.decl.negative_in);
        let mut flags = StatusFlags::empty();
        if zero {
            flags |= StatusFlags::ZERO;
        }
        if negative {
            flags |= StatusFlags::NEGATIVE;
        }
        self.value = flags.bits();
        statuses.set(self.decl.zero, zero);
        statuses.set(self.decl.negative, negative);
        log::trace!("status register latched 0x{:02x}", self.value);
        controls.set(self.decl.latch, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdl::IrataDecl;

    #[test]
    fn latch_packs_and_forwards_detect_lines() {
        let irata = IrataDecl::build();
        let decl = irata.cpu.status_register;
        let mut controls = Controls::new(&irata.topology);
        let mut statuses = Statuses::new(&irata.topology);
        let mut register = StatusRegister::new(decl);

        statuses.set(decl.zero_in, true);
        register.tick_clear(&mut controls, &mut statuses);
        // Latch not asserted: nothing happens.
        assert_eq!(register.value(), 0);
        assert!(!statuses.get(decl.zero));

        controls.set(decl.latch, true);
        register.tick_clear(&mut controls, &mut statuses);
        assert_eq!(register.value(), StatusFlags::ZERO.bits());
        assert!(statuses.get(decl.zero));
        assert!(!statuses.get(decl.negative));
        // The latch cleared itself.
        assert!(!controls.get(decl.latch));

        // Detect lines changed, latch not asserted: outputs hold.
        statuses.set(decl.zero_in, false);
        statuses.set(decl.negative_in, true);
        register.tick_clear(&mut controls, &mut statuses);
        assert!(statuses.get(decl.zero));
        assert!(!statuses.get(decl.negative));
    }
}
