//! Flat per-tick state banks, indexed by topology handle.

use hdl::{ControlId, StatusId, Topology};

/// Current value of every control line.
pub struct Controls {
    values: Vec<bool>,
}

impl Controls {
    pub fn new(topology: &Topology) -> Controls {
        Controls { values: vec![false; topology.num_controls()] }
    }

    pub fn get(&self, id: ControlId) -> bool {
        self.values[id.index()]
    }

    pub fn set(&mut self, id: ControlId, value: bool) {
        self.values[id.index()] = value;
    }

    /// `None` when the handle does not belong to this machine's topology.
    pub fn lookup(&self, id: ControlId) -> Option<bool> {
        self.values.get(id.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Current value of every status line.
pub struct Statuses {
    values: Vec<bool>,
}

impl Statuses {
    pub fn new(topology: &Topology) -> Statuses {
        Statuses { values: vec![false; topology.num_statuses()] }
    }

    pub fn get(&self, id: StatusId) -> bool {
        self.values[id.index()]
    }

    pub fn set(&mut self, id: StatusId, value: bool) {
        self.values[id.index()] = value;
    }

    /// `None` when the handle does not belong to this machine's topology.
    pub fn lookup(&self, id: StatusId) -> Option<bool> {
        self.values.get(id.index()).copied()
    }
}
