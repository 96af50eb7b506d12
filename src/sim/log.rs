/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Output side of a simulation run: the per-tick schedule log, run
//! statistics, and the bundle returned to the caller.
//!
//! Everything here derives `Serialize` — this is the data the external
//! renderer/reporter consumes, either directly or run-length merged by the
//! `report` module.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::task::TaskId;

// ── Schedule entries ──────────────────────────────────────────────────────────

/// Whether a dispatched tick ran on time or past its job's absolute deadline.
///
/// A late job is not terminated; it keeps executing and every late tick is
/// flagged `Miss` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Ok,
    Miss,
}

/// One core × one tick of recorded execution.
///
/// `duration` is always `1` at creation; the report layer merges contiguous
/// entries into longer segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// 1-based core id.
    pub core: u32,

    /// Tick at which the unit of execution started.
    pub time: u64,

    /// Length in ticks; `1` for raw entries.
    pub duration: u64,

    /// Task id to display for this slot.  Differs from [`task`](Self::task)
    /// when a server slot executes an aperiodic job; `None` when a server
    /// burns budget with nothing to serve.
    pub label: Option<TaskId>,

    pub status: EntryStatus,

    /// Task that owned the dispatched job (the server's id for server
    /// slots, regardless of what ran inside them).
    pub task: TaskId,
}

impl ScheduleEntry {
    /// Display id for this slot: the label if present, otherwise the owning
    /// task.
    pub fn display_id(&self) -> TaskId {
        self.label.unwrap_or(self.task)
    }
}

// ── Sporadic-server replenishment ─────────────────────────────────────────────

/// A pending sporadic-server budget replenishment: `amount` units become
/// available at tick `due`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplenishmentEvent {
    pub due: u64,
    pub amount: u64,
}

// ── Run statistics ────────────────────────────────────────────────────────────

/// Aggregate counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Job releases over the horizon, server releases included (whether or
    /// not the release was admitted to the ready queue).
    pub total_jobs: u64,

    /// Late dispatch ticks.  Counted once per dispatch of a late job, so a
    /// job running three ticks past its deadline contributes three.
    pub missed_deadlines: u64,

    /// Aperiodic jobs that ran to completion.
    pub aperiodic_completed: u64,
}

// ── Simulation output ─────────────────────────────────────────────────────────

/// Everything a run produces.
///
/// The engine never mutates its input task set; mutable per-run state ends up
/// here instead — final server budgets and any replenishments still pending
/// at the end of the horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutput {
    /// Ordered per-tick schedule log (dispatch order within each tick).
    pub schedule: Vec<ScheduleEntry>,

    /// Number of ticks simulated.
    pub horizon: u64,

    pub stats: RunStats,

    /// Final budget of each server task, keyed by task id.
    pub server_budgets: BTreeMap<TaskId, u64>,

    /// Sporadic-server replenishments scheduled but not yet processed when
    /// the horizon ended.
    pub pending_replenishments: Vec<ReplenishmentEvent>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_id_prefers_the_label() {
        let entry = ScheduleEntry {
            core: 1,
            time: 0,
            duration: 1,
            label: Some(TaskId(3)),
            status: EntryStatus::Ok,
            task: TaskId(1),
        };
        assert_eq!(entry.display_id(), TaskId(3));
    }

    #[test]
    fn display_id_falls_back_to_the_owning_task() {
        let entry = ScheduleEntry {
            core: 1,
            time: 0,
            duration: 1,
            label: None,
            status: EntryStatus::Miss,
            task: TaskId(2),
        };
        assert_eq!(entry.display_id(), TaskId(2));
    }

    #[test]
    fn status_serialises_uppercase() {
        assert_eq!(serde_yaml::to_string(&EntryStatus::Ok).unwrap().trim(), "OK");
        assert_eq!(
            serde_yaml::to_string(&EntryStatus::Miss).unwrap().trim(),
            "MISS"
        );
    }
}
