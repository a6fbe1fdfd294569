use hdl::{ByteRegisterDecl, Topology};

use crate::bank::Controls;
use crate::bus::Bus;
use crate::error::TickError;

/// Byte register on the data bus.
pub struct Register {
    decl: ByteRegisterDecl,
    value: u8,
}

impl Register {
    pub fn new(decl: ByteRegisterDecl) -> Register {
        Register { decl, value: 0 }
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
            log::trace!(
                "{} drives 0x{:02x}",
                topology.path(self.decl.component),
                self.value
            );
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
            log::trace!(
                "{} latches 0x{:02x}",
                topology.path(self.decl.component),
                self.value
            );
        }
        Ok(())
    }

    pub fn tick_process(&mut self, controls: &Controls) {
        if controls.get(self.decl.reset) {
            self.value = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdl::IrataDecl;

    use crate::bank::Controls;
    use crate::bus::Bus;

    #[test]
    fn copy_between_registers_over_the_bus() {
        let irata = IrataDecl::build();
        let topology = &irata.topology;
        let mut controls = Controls::new(topology);
        let mut bus = Bus::new(irata.data_bus);
        let mut a = Register::new(irata.cpu.a);
        let mut y = Register::new(irata.cpu.y);
        a.set_value(0x2a);
        controls.set(irata.cpu.a.write, true);
        controls.set(irata.cpu.y.read, true);
        a.tick_write(&controls, &mut bus, topology).unwrap();
        y.tick_write(&controls, &mut bus, topology).unwrap();
        a.tick_read(&controls, &bus, topology).unwrap();
        y.tick_read(&controls, &bus, topology).unwrap();
        assert_eq!(y.value(), 0x2a);
        assert_eq!(a.value(), 0x2a);
    }

    #[test]
    fn read_from_open_bus_fails() {
        let irata = IrataDecl::build();
        let topology = &irata.topology;
        let mut controls = Controls::new(topology);
        let bus = Bus::new(irata.data_bus);
        let mut a = Register::new(irata.cpu.a);
        controls.set(irata.cpu.a.read, true);
        match a.tick_read(&controls, &bus, topology) {
            Err(TickError::OpenBusRead { component, bus }) => {
                assert_eq!(component, "/cpu/a");
                assert_eq!(bus, "/data_bus");
            }
            other => panic!("expected open bus read, got {:?}", other),
        }
    }

    #[test]
    fn reset_zeroes_the_value() {
        let irata = IrataDecl::build();
        let mut controls = Controls::new(&irata.topology);
        let mut a = Register::new(irata.cpu.a);
        a.set_value(0xff);
        a.tick_process(&controls);
        assert_eq!(a.value(), 0xff);
        controls.set(irata.cpu.a.reset, true);
        a.tick_process(&controls);
        assert_eq!(a.value(), 0);
    }
}
