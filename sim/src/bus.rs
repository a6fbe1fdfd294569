use hdl::{BusId, ComponentId, Topology};

use crate::error::TickError;

/// One bus's within-tick state: the driven value and who drove it. Values
/// never persist across ticks; the Clear phase empties every bus.
pub struct Bus {
    id: BusId,
    value: Option<u16>,
    writer: Option<ComponentId>,
}

impl Bus {
    pub fn new(id: BusId) -> Bus {
        Bus { id, value: None, writer: None }
    }

    pub fn set(
        &mut self,
        value: u16,
        writer: ComponentId,
        topology: &Topology,
    ) -> Result<(), TickError> {
        if let Some(first) = self.writer {
            return Err(TickError::BusWriteConflict {
                bus: topology.bus_path(self.id),
                first: topology.path(first),
                second: topology.path(writer),
            });
        }
        self.value = Some(value);
        self.writer = Some(writer);
        Ok(())
    }

    pub fn read(&self, reader: ComponentId, topology: &Topology) -> Result<u16, TickError> {
        self.value.ok_or_else(|| TickError::OpenBusRead {
            component: topology.path(reader),
            bus: topology.bus_path(self.id),
        })
    }

    pub fn get(&self) -> Option<u16> {
        self.value
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.writer = None;
    }
}
