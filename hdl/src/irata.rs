use crate::topology::{BusConnection, BusId, BusWidth, ComponentId, ControlId, StatusId, Topology};
use crate::TickPhase;

/// Byte register connected to the data bus.
#[derive(Clone, Copy, Debug)]
pub struct ByteRegisterDecl {
    pub component: ComponentId,
    pub bus: BusId,
    pub write: ControlId,
    pub read: ControlId,
    pub reset: ControlId,
}

impl ByteRegisterDecl {
    fn build(topology: &mut Topology, name: &str, parent: ComponentId, bus: BusId) -> Self {
        let component = topology.add_component(name, parent);
        ByteRegisterDecl {
            component,
            bus,
            write: topology.add_write_control("write", component, bus),
            read: topology.add_read_control("read", component, bus),
            reset: topology.add_process_control("reset", component),
        }
    }
}

impl BusConnection for ByteRegisterDecl {
    fn bus(&self) -> BusId {
        self.bus
    }
    fn write_control(&self) -> ControlId {
        self.write
    }
    fn read_control(&self) -> ControlId {
        self.read
    }
}

/// Word register connected to the address bus, with byte halves on the data
/// bus so word values can be assembled from two memory fetches.
#[derive(Clone, Copy, Debug)]
pub struct WordRegisterDecl {
    pub component: ComponentId,
    pub bus: BusId,
    pub write: ControlId,
    pub read: ControlId,
    pub reset: ControlId,
    pub high: ByteRegisterDecl,
    pub low: ByteRegisterDecl,
}

impl WordRegisterDecl {
    fn build(
        topology: &mut Topology,
        name: &str,
        parent: ComponentId,
        address_bus: BusId,
        data_bus: BusId,
    ) -> Self {
        let component = topology.add_component(name, parent);
        WordRegisterDecl {
            component,
            bus: address_bus,
            write: topology.add_write_control("write", component, address_bus),
            read: topology.add_read_control("read", component, address_bus),
            reset: topology.add_process_control("reset", component),
            high: ByteRegisterDecl::build(topology, "high", component, data_bus),
            low: ByteRegisterDecl::build(topology, "low", component, data_bus),
        }
    }
}

impl BusConnection for WordRegisterDecl {
    fn bus(&self) -> BusId {
        self.bus
    }
    fn write_control(&self) -> ControlId {
        self.write
    }
    fn read_control(&self) -> ControlId {
        self.read
    }
}

/// The program counter: a word counter on the address bus.
#[derive(Clone, Copy, Debug)]
pub struct WordCounterDecl {
    pub component: ComponentId,
    pub bus: BusId,
    pub write: ControlId,
    pub read: ControlId,
    pub reset: ControlId,
    pub increment: ControlId,
}

impl WordCounterDecl {
    fn build(topology: &mut Topology, name: &str, parent: ComponentId, bus: BusId) -> Self {
        let component = topology.add_component(name, parent);
        WordCounterDecl {
            component,
            bus,
            write: topology.add_write_control("write", component, bus),
            read: topology.add_read_control("read", component, bus),
            reset: topology.add_process_control("reset", component),
            increment: topology.add_process_control("increment", component),
        }
    }
}

impl BusConnection for WordCounterDecl {
    fn bus(&self) -> BusId {
        self.bus
    }
    fn write_control(&self) -> ControlId {
        self.write
    }
    fn read_control(&self) -> ControlId {
        self.read
    }
}

/// Index register X: a byte counter with zero/negative detect lines feeding
/// the status register.
#[derive(Clone, Copy, Debug)]
pub struct IndexCounterDecl {
    pub component: ComponentId,
    pub bus: BusId,
    pub write: ControlId,
    pub read: ControlId,
    pub reset: ControlId,
    pub increment: ControlId,
    pub decrement: ControlId,
    pub zero: StatusId,
    pub negative: StatusId,
}

impl IndexCounterDecl {
    fn build(topology: &mut Topology, name: &str, parent: ComponentId, bus: BusId) -> Self {
        let component = topology.add_component(name, parent);
        IndexCounterDecl {
            component,
            bus,
            write: topology.add_write_control("write", component, bus),
            read: topology.add_read_control("read", component, bus),
            reset: topology.add_process_control("reset", component),
            increment: topology.add_process_control("increment", component),
            decrement: topology.add_process_control("decrement", component),
            zero: topology.add_status("zero", component),
            negative: topology.add_status("negative", component),
        }
    }
}

impl BusConnection for IndexCounterDecl {
    fn bus(&self) -> BusId {
        self.bus
    }
    fn write_control(&self) -> ControlId {
        self.write
    }
    fn read_control(&self) -> ControlId {
        self.read
    }
}

/// The controller's step counter: never bus-connected, advanced and reset by
/// the very microcode it sequences.
#[derive(Clone, Copy, Debug)]
pub struct StepCounterDecl {
    pub component: ComponentId,
    pub reset: ControlId,
    pub increment: ControlId,
}

impl StepCounterDecl {
    fn build(topology: &mut Topology, name: &str, parent: ComponentId) -> Self {
        let component = topology.add_component(name, parent);
        StepCounterDecl {
            component,
            reset: topology.add_process_control("reset", component),
            increment: topology.add_process_control("increment", component),
        }
    }
}

/// Latching status register. The `latch` control is persistent (cleared by
/// its companion or by the latch action itself in the Clear phase); when
/// asserted, input status lines are packed into the register value and
/// forwarded to the latched output lines the microcode branches on.
#[derive(Clone, Copy, Debug)]
pub struct StatusRegisterDecl {
    pub component: ComponentId,
    pub bus: BusId,
    pub write: ControlId,
    pub read: ControlId,
    pub reset: ControlId,
    pub latch: ControlId,
    pub zero_in: StatusId,
    pub negative_in: StatusId,
    pub zero: StatusId,
    pub negative: StatusId,
}

impl StatusRegisterDecl {
    fn build(
        topology: &mut Topology,
        parent: ComponentId,
        bus: BusId,
        zero_in: StatusId,
        negative_in: StatusId,
    ) -> Self {
        let component = topology.add_component("status_register", parent);
        StatusRegisterDecl {
            component,
            bus,
            write: topology.add_write_control("write", component, bus),
            read: topology.add_read_control("read", component, bus),
            reset: topology.add_process_control("reset", component),
            latch: topology.add_persistent_control("latch", component, TickPhase::Clear),
            zero_in,
            negative_in,
            zero: topology.add_status("zero", component),
            negative: topology.add_status("negative", component),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerDecl {
    pub component: ComponentId,
    pub opcode: ByteRegisterDecl,
    pub step_counter: StepCounterDecl,
}

impl ControllerDecl {
    fn build(topology: &mut Topology, parent: ComponentId, data_bus: BusId) -> Self {
        let component = topology.add_component("controller", parent);
        ControllerDecl {
            component,
            opcode: ByteRegisterDecl::build(topology, "opcode", component, data_bus),
            step_counter: StepCounterDecl::build(topology, "step_counter", component),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CpuDecl {
    pub component: ComponentId,
    pub a: ByteRegisterDecl,
    pub x: IndexCounterDecl,
    pub y: ByteRegisterDecl,
    pub pc: WordCounterDecl,
    pub buffer: WordRegisterDecl,
    pub status_register: StatusRegisterDecl,
    pub controller: ControllerDecl,
}

impl CpuDecl {
    fn build(
        topology: &mut Topology,
        parent: ComponentId,
        address_bus: BusId,
        data_bus: BusId,
    ) -> Self {
        let component = topology.add_component("cpu", parent);
        let a = ByteRegisterDecl::build(topology, "a", component, data_bus);
        let x = IndexCounterDecl::build(topology, "x", component, data_bus);
        let y = ByteRegisterDecl::build(topology, "y", component, data_bus);
        let pc = WordCounterDecl::build(topology, "pc", component, address_bus);
        let buffer = WordRegisterDecl::build(topology, "buffer", component, address_bus, data_bus);
        let status_register =
            StatusRegisterDecl::build(topology, component, data_bus, x.zero, x.negative);
        let controller = ControllerDecl::build(topology, component, data_bus);
        CpuDecl { component, a, x, y, pc, buffer, status_register, controller }
    }
}

/// Memory with a word-wide address register and a byte data port.
#[derive(Clone, Copy, Debug)]
pub struct MemoryDecl {
    pub component: ComponentId,
    pub mar: WordRegisterDecl,
    pub bus: BusId,
    pub write: ControlId,
    pub read: ControlId,
}

impl MemoryDecl {
    fn build(
        topology: &mut Topology,
        parent: ComponentId,
        address_bus: BusId,
        data_bus: BusId,
    ) -> Self {
        let component = topology.add_component("memory", parent);
        MemoryDecl {
            component,
            mar: WordRegisterDecl::build(topology, "address", component, address_bus, data_bus),
            bus: data_bus,
            write: topology.add_write_control("write", component, data_bus),
            read: topology.add_read_control("read", component, data_bus),
        }
    }
}

impl BusConnection for MemoryDecl {
    fn bus(&self) -> BusId {
        self.bus
    }
    fn write_control(&self) -> ControlId {
        self.write
    }
    fn read_control(&self) -> ControlId {
        self.read
    }
}

/// The full Irata machine topology. Built once per session and passed by
/// reference to the microcode compiler and the simulator.
pub struct IrataDecl {
    pub topology: Topology,
    pub root: ComponentId,
    pub address_bus: BusId,
    pub data_bus: BusId,
    pub cpu: CpuDecl,
    pub memory: MemoryDecl,
    pub halt: ControlId,
    pub crash: ControlId,
}

impl IrataDecl {
    pub fn build() -> IrataDecl {
        let (mut topology, root) = Topology::new("irata");
        let address_bus = topology.add_bus("address_bus", root, BusWidth::Word);
        let data_bus = topology.add_bus("data_bus", root, BusWidth::Byte);
        let cpu = CpuDecl::build(&mut topology, root, address_bus, data_bus);
        let memory = MemoryDecl::build(&mut topology, root, address_bus, data_bus);
        let halt = topology.add_process_control("halt", root);
        let crash = topology.add_process_control("crash", root);
        IrataDecl { topology, root, address_bus, data_bus, cpu, memory, halt, crash }
    }
}
