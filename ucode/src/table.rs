//! Flattening of the validated IR into a complete entry table: one entry per
//! (opcode, step index, complete status assignment), with don't-care
//! statuses permuted into every value.

use std::collections::{BTreeMap, BTreeSet};

use hdl::{ControlId, StatusId, Topology};

use crate::error::CompileError;
use crate::ir::{self, permute_statuses, render_statuses};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub instruction: common::Instruction,
    pub step_index: u8,
    pub statuses: BTreeMap<StatusId, bool>,
    pub controls: BTreeSet<ControlId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub entries: Vec<Entry>,
}

impl Table {
    pub fn compile(
        instruction_set: &ir::InstructionSet,
        topology: &Topology,
    ) -> Result<Table, CompileError> {
        let universe: BTreeSet<StatusId> = instruction_set
            .instructions
            .iter()
            .flat_map(|i| i.statuses.keys().copied())
            .collect();
        let mut seen: BTreeSet<(u8, u8, Vec<(StatusId, bool)>)> = BTreeSet::new();
        let mut entries = Vec::new();
        for instruction in &instruction_set.instructions {
            for (index, step) in instruction.steps.iter().enumerate() {
                let step_index = index as u8;
                for assignment in permute_statuses(&universe, &instruction.statuses) {
                    let key = (
                        instruction.descriptor.opcode,
                        step_index,
                        assignment.iter().map(|(s, v)| (*s, *v)).collect(),
                    );
                    if !seen.insert(key) {
                        return Err(CompileError::DuplicateEntry {
                            instruction: instruction.descriptor.to_string(),
                            step_index,
                            statuses: render_statuses(&assignment, topology),
                        });
                    }
                    entries.push(Entry {
                        instruction: instruction.descriptor,
                        step_index,
                        statuses: assignment,
                        controls: step.controls.clone(),
                    });
                }
            }
        }
        Ok(Table { entries })
    }

    /// The statuses the table's addresses discriminate on, in handle order.
    pub fn statuses(&self) -> BTreeSet<StatusId> {
        self.entries.iter().flat_map(|e| e.statuses.keys().copied()).collect()
    }

    /// Every control any entry asserts, in handle order.
    pub fn controls(&self) -> BTreeSet<ControlId> {
        self.entries.iter().flat_map(|e| e.controls.iter().copied()).collect()
    }

    pub fn max_opcode(&self) -> u8 {
        self.entries.iter().map(|e| e.instruction.opcode).max().unwrap_or(0)
    }

    pub fn max_step_index(&self) -> u8 {
        self.entries.iter().map(|e| e.step_index).max().unwrap_or(0)
    }
}
