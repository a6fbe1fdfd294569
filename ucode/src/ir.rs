//! Value-type mirror of the DSL model. Passes consume and produce this form,
//! rewriting it freely without touching the builder API.

use std::collections::{BTreeMap, BTreeSet};

use hdl::{ControlId, StatusId, TickPhase, Topology};
use itertools::Itertools;

use crate::dsl;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub stage: u8,
    pub controls: BTreeSet<ControlId>,
    pub write_controls: BTreeSet<ControlId>,
    pub read_controls: BTreeSet<ControlId>,
}

impl Step {
    pub fn new(
        stage: u8,
        controls: BTreeSet<ControlId>,
        write_controls: BTreeSet<ControlId>,
        read_controls: BTreeSet<ControlId>,
    ) -> Step {
        debug_assert!(write_controls.is_subset(&controls));
        debug_assert!(read_controls.is_subset(&controls));
        Step { stage, controls, write_controls, read_controls }
    }

    /// Earliest phase any control in this step acts in. An empty step is
    /// compatible with anything.
    pub fn min_phase(&self, topology: &Topology) -> TickPhase {
        self.controls
            .iter()
            .map(|c| topology.control(*c).phase)
            .min()
            .unwrap_or(TickPhase::Clear)
    }

    /// Latest phase any control in this step acts in.
    pub fn max_phase(&self, topology: &Topology) -> TickPhase {
        self.controls
            .iter()
            .map(|c| topology.control(*c).phase)
            .max()
            .unwrap_or(TickPhase::Control)
    }

    pub fn render(&self, topology: &Topology) -> String {
        format!(
            "{{{}}}",
            self.controls.iter().map(|c| topology.control_path(*c)).join(", ")
        )
    }
}

impl From<&dsl::Step> for Step {
    fn from(step: &dsl::Step) -> Step {
        Step::new(
            step.stage,
            step.controls.clone(),
            step.write_controls.clone(),
            step.read_controls.clone(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub descriptor: common::Instruction,
    pub statuses: BTreeMap<StatusId, bool>,
    pub steps: Vec<Step>,
}

impl From<&dsl::Instruction> for Instruction {
    fn from(instruction: &dsl::Instruction) -> Instruction {
        Instruction {
            descriptor: instruction.descriptor,
            statuses: instruction.statuses.clone(),
            steps: instruction.steps.iter().map(Step::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionSet {
    pub instructions: Vec<Instruction>,
}

impl InstructionSet {
    pub fn from_dsl(set: &dsl::InstructionSet) -> InstructionSet {
        InstructionSet {
            instructions: set.instructions.iter().map(Instruction::from).collect(),
        }
    }
}

pub fn render_steps(steps: &[Step], topology: &Topology) -> String {
    steps.iter().map(|s| s.render(topology)).join(", ")
}

pub fn render_statuses(statuses: &BTreeMap<StatusId, bool>, topology: &Topology) -> String {
    statuses
        .iter()
        .map(|(status, value)| format!("{}={}", topology.status_path(*status), value))
        .join(", ")
}

/// All complete assignments over `universe` that agree with `partial`.
/// Deterministic: free statuses are enumerated in ascending handle order.
pub fn permute_statuses(
    universe: &BTreeSet<StatusId>,
    partial: &BTreeMap<StatusId, bool>,
) -> Vec<BTreeMap<StatusId, bool>> {
    let free: Vec<StatusId> =
        universe.iter().filter(|s| !partial.contains_key(s)).copied().collect();
    let mut assignments = Vec::with_capacity(1 << free.len());
    for bits in 0..(1u32 << free.len()) {
        let mut assignment = partial.clone();
        for (i, status) in free.iter().enumerate() {
            assignment.insert(*status, bits & (1 << i) != 0);
        }
        assignments.push(assignment);
    }
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdl::IrataDecl;

    #[test]
    fn phases_of_a_mixed_step() {
        let irata = IrataDecl::build();
        let topology = &irata.topology;
        let mut controls = BTreeSet::new();
        controls.insert(irata.memory.write);
        controls.insert(irata.cpu.a.read);
        controls.insert(irata.cpu.pc.increment);
        let step = Step::new(1, controls, BTreeSet::new(), BTreeSet::new());
        assert_eq!(step.min_phase(topology), TickPhase::Write);
        assert_eq!(step.max_phase(topology), TickPhase::Process);
    }

    #[test]
    fn empty_step_is_phase_neutral() {
        let irata = IrataDecl::build();
        let step = Step::new(0, BTreeSet::new(), BTreeSet::new(), BTreeSet::new());
        assert_eq!(step.min_phase(&irata.topology), TickPhase::Clear);
        assert_eq!(step.max_phase(&irata.topology), TickPhase::Control);
    }

    #[test]
    fn permute_fills_free_statuses() {
        let irata = IrataDecl::build();
        let zero = irata.cpu.status_register.zero;
        let negative = irata.cpu.status_register.negative;
        let universe: BTreeSet<_> = [zero, negative].into_iter().collect();
        let mut partial = BTreeMap::new();
        partial.insert(zero, true);
        let assignments = permute_statuses(&universe, &partial);
        assert_eq!(assignments.len(), 2);
        for assignment in &assignments {
            assert_eq!(assignment[&zero], true);
            assert_eq!(assignment.len(), 2);
        }
        assert_ne!(assignments[0][&negative], assignments[1][&negative]);
    }
}
