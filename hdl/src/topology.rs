use crate::TickPhase;

/// Handle to a node in the component tree. Two handles are equal only if they
/// name the same node; names are never compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u32);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a declared bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusId(u32);

impl BusId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a declared control line. Used as the map key throughout the
/// microcode compiler and the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(u32);

impl ControlId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a declared status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusId(u32);

impl StatusId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[derive(EnumCount, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BusWidth {
    Byte,
    Word,
}

struct Node {
    name: String,
    parent: Option<ComponentId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusDecl {
    pub component: ComponentId,
    pub width: BusWidth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlDecl {
    pub component: ComponentId,
    /// The phase during which the control's value is consumed. The step
    /// merger uses this as a timing constraint.
    pub phase: TickPhase,
    /// Auto-clearing controls drop back to false at the end of every tick.
    /// Persistent controls keep their value until the companion `clear`
    /// control is asserted.
    pub auto_clear: bool,
    /// Write and read controls are bound to the bus they drive or sample.
    pub bus: Option<BusId>,
    /// Companion clear control, present exactly when `auto_clear` is false.
    pub clear: Option<ControlId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusDecl {
    pub component: ComponentId,
}

/// Arena of declarative hardware identities: a tree of named components with
/// bus, control and status declarations hanging off it. Nodes are created once
/// when the topology is built and never mutated afterwards; all downstream
/// layers refer to them by handle.
pub struct Topology {
    nodes: Vec<Node>,
    buses: Vec<BusDecl>,
    controls: Vec<ControlDecl>,
    statuses: Vec<StatusDecl>,
}

impl Topology {
    pub fn new(root_name: &str) -> (Topology, ComponentId) {
        let topology = Topology {
            nodes: vec![Node { name: root_name.to_string(), parent: None }],
            buses: Vec::new(),
            controls: Vec::new(),
            statuses: Vec::new(),
        };
        (topology, ComponentId(0))
    }

    pub fn add_component(&mut self, name: &str, parent: ComponentId) -> ComponentId {
        let id = ComponentId(self.nodes.len() as u32);
        self.nodes.push(Node { name: name.to_string(), parent: Some(parent) });
        id
    }

    pub fn add_bus(&mut self, name: &str, parent: ComponentId, width: BusWidth) -> BusId {
        let component = self.add_component(name, parent);
        let id = BusId(self.buses.len() as u32);
        self.buses.push(BusDecl { component, width });
        id
    }

    /// A write control drives its parent's value onto `bus` during the Write
    /// phase. Always auto-clearing.
    pub fn add_write_control(&mut self, name: &str, parent: ComponentId, bus: BusId) -> ControlId {
        self.add_control(name, parent, TickPhase::Write, true, Some(bus))
    }

    /// A read control latches `bus` into its parent during the Read phase.
    /// Always auto-clearing.
    pub fn add_read_control(&mut self, name: &str, parent: ComponentId, bus: BusId) -> ControlId {
        self.add_control(name, parent, TickPhase::Read, true, Some(bus))
    }

    /// A process control triggers an internal update during the Process phase.
    /// Always auto-clearing.
    pub fn add_process_control(&mut self, name: &str, parent: ComponentId) -> ControlId {
        self.add_control(name, parent, TickPhase::Process, true, None)
    }

    /// A persistent control keeps its value across ticks. A companion `clear`
    /// process control is created as its child for explicit clearing.
    pub fn add_persistent_control(
        &mut self,
        name: &str,
        parent: ComponentId,
        phase: TickPhase,
    ) -> ControlId {
        let id = self.add_control(name, parent, phase, false, None);
        let component = self.controls[id.0 as usize].component;
        let clear = self.add_process_control("clear", component);
        self.controls[id.0 as usize].clear = Some(clear);
        id
    }

    fn add_control(
        &mut self,
        name: &str,
        parent: ComponentId,
        phase: TickPhase,
        auto_clear: bool,
        bus: Option<BusId>,
    ) -> ControlId {
        let component = self.add_component(name, parent);
        let id = ControlId(self.controls.len() as u32);
        self.controls.push(ControlDecl { component, phase, auto_clear, bus, clear: None });
        id
    }

    pub fn add_status(&mut self, name: &str, parent: ComponentId) -> StatusId {
        let component = self.add_component(name, parent);
        let id = StatusId(self.statuses.len() as u32);
        self.statuses.push(StatusDecl { component });
        id
    }

    pub fn bus(&self, id: BusId) -> &BusDecl {
        &self.buses[id.0 as usize]
    }

    pub fn control(&self, id: ControlId) -> &ControlDecl {
        &self.controls[id.0 as usize]
    }

    pub fn status(&self, id: StatusId) -> &StatusDecl {
        &self.statuses[id.0 as usize]
    }

    pub fn controls(&self) -> impl Iterator<Item = (ControlId, &ControlDecl)> {
        self.controls.iter().enumerate().map(|(i, c)| (ControlId(i as u32), c))
    }

    pub fn statuses(&self) -> impl Iterator<Item = (StatusId, &StatusDecl)> {
        self.statuses.iter().enumerate().map(|(i, s)| (StatusId(i as u32), s))
    }

    pub fn num_controls(&self) -> usize {
        self.controls.len()
    }

    pub fn num_statuses(&self) -> usize {
        self.statuses.len()
    }

    pub fn name(&self, id: ComponentId) -> &str {
        &self.nodes[id.0 as usize].name
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes[id.0 as usize].parent
    }

    /// Slash-separated path from the root, for diagnostics. The root renders
    /// as `/`, its children as `/name`, and so on down.
    pub fn path(&self, id: ComponentId) -> String {
        match self.parent(id) {
            None => "/".to_string(),
            Some(parent) if self.parent(parent).is_none() => format!("/{}", self.name(id)),
            Some(parent) => format!("{}/{}", self.path(parent), self.name(id)),
        }
    }

    pub fn control_path(&self, id: ControlId) -> String {
        self.path(self.control(id).component)
    }

    pub fn status_path(&self, id: StatusId) -> String {
        self.path(self.status(id).component)
    }

    pub fn bus_path(&self, id: BusId) -> String {
        self.path(self.bus(id).component)
    }
}

/// A component that exposes a value on a bus through a write/read control
/// pair. This is the shape the microcode DSL's `copy` helper works over.
pub trait BusConnection {
    fn bus(&self) -> BusId;
    fn write_control(&self) -> ControlId;
    fn read_control(&self) -> ControlId;
}
