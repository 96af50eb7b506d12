/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the metronome simulator.
//!
//! Two distinct layers model the two sides of the simulation pipeline:
//!
//! ```text
//! taskset  ──(line grammar)──►  Task / TaskSet  ──(sim)──►  ScheduleEntry log
//!                                ↑ immutable input              ↑ output
//!                                timing parameters only          per-tick record
//! ```
//!
//! # Ownership model
//! A [`TaskSet`] is built once (by the parser, the generator, or a test) and
//! then only ever **borrowed** by the simulator.  Everything that changes
//! during a run — remaining execution, server budget, queues — is simulation
//! state owned by the engine, never written back into the tasks.  The same
//! `TaskSet` can therefore be simulated any number of times, under any
//! policy, and always produces the same result.

use std::fmt;

use serde::Serialize;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Absolute-deadline sentinel for aperiodic jobs.
///
/// Far beyond the horizon cap, so the deadline-miss check can never trigger
/// for an aperiodic job; the value still serialises cleanly for the renderer.
pub const APERIODIC_DEADLINE: u64 = 99_999;

// ── TaskId ────────────────────────────────────────────────────────────────────

/// Stable handle for a task: its 1-based position in the [`TaskSet`].
///
/// Jobs reference their owning task through this handle rather than by value
/// equality, so "is this the server's job?" is a plain integer comparison
/// inside both the ready queue and the aperiodic queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TaskKind ──────────────────────────────────────────────────────────────────

/// Task variant, matching the four line codes of the task-set grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskKind {
    /// `P` – periodic, exec-first argument order.
    Periodic,
    /// `D` – periodic, deadline-first argument order.  After construction it
    /// behaves exactly like [`TaskKind::Periodic`]; the variant only changes
    /// how positional arguments are read.
    PeriodicDeadline,
    /// `S` – server task: `burst` is the per-period capacity.
    Server,
    /// `A` – aperiodic job: one arrival, no period, unreachable deadline.
    Aperiodic,
}

impl TaskKind {
    /// Periodic in the scheduling sense: released every period boundary.
    pub fn is_periodic(self) -> bool {
        matches!(self, TaskKind::Periodic | TaskKind::PeriodicDeadline)
    }

    pub fn is_server(self) -> bool {
        matches!(self, TaskKind::Server)
    }

    pub fn is_aperiodic(self) -> bool {
        matches!(self, TaskKind::Aperiodic)
    }

    /// Human-readable name used in the task table of the text report.
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Periodic | TaskKind::PeriodicDeadline => "Periodic",
            TaskKind::Server => "Server",
            TaskKind::Aperiodic => "Aperiodic",
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// Static description of one task's timing parameters.
///
/// Immutable after construction.  Note what is *not* here: the server's
/// current budget.  Budget is simulation state — it lives in the engine and
/// is returned as part of the simulation output, so consecutive runs never
/// contaminate each other.
///
/// All times are integer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Stable identity; assigned by [`TaskSet::new`].
    pub id: TaskId,

    pub kind: TaskKind,

    /// First release tick (periodic/server) or the single arrival tick
    /// (aperiodic).
    pub arrival: u64,

    /// Execution requirement per job.  For a server this doubles as the
    /// capacity.
    pub burst: u64,

    /// Release period.  `0` for aperiodic tasks (and for malformed periodic
    /// lines — such tasks never release).
    pub period: u64,

    /// Relative deadline; the absolute deadline of a job released at `t` is
    /// `t + deadline`.
    pub deadline: u64,

    /// Server capacity (initial budget).  `0` for non-server tasks.
    pub capacity: u64,
}

impl Task {
    /// Build a task from the positional integer arguments of one grammar
    /// line.
    ///
    /// Accepted forms:
    ///
    /// | Kind | Args | Meaning |
    /// |---|---|---|
    /// | `Periodic` | `(e, p)` | arrival 0, deadline = period |
    /// | `Periodic` | `(r, e, p)` | deadline = period |
    /// | `Periodic` | `(r, e, p, d)` | full form |
    /// | `PeriodicDeadline` | `(e, p, d)` | arrival 0 |
    /// | `PeriodicDeadline` | `(r, e, p, d)` | full form |
    /// | `Server` | `(capacity, period)` | deadline = period |
    /// | `Aperiodic` | `(arrival, execution)` | period 0, deadline sentinel |
    ///
    /// Any other argument count leaves the dependent fields at their zero
    /// defaults — the defined fallback for malformed lines, not an error.
    /// A zero-period periodic task simply never releases.
    pub fn from_args(kind: TaskKind, args: &[u64]) -> Self {
        let mut task = Task {
            id: TaskId(0),
            kind,
            arrival: 0,
            burst: 0,
            period: 0,
            deadline: 0,
            capacity: 0,
        };

        match kind {
            TaskKind::Periodic => match *args {
                [e, p] => {
                    task.burst = e;
                    task.period = p;
                    task.deadline = p;
                }
                [r, e, p] => {
                    task.arrival = r;
                    task.burst = e;
                    task.period = p;
                    task.deadline = p;
                }
                [r, e, p, d] => {
                    task.arrival = r;
                    task.burst = e;
                    task.period = p;
                    task.deadline = d;
                }
                _ => {}
            },
            TaskKind::PeriodicDeadline => match *args {
                [e, p, d] => {
                    task.burst = e;
                    task.period = p;
                    task.deadline = d;
                }
                [r, e, p, d] => {
                    task.arrival = r;
                    task.burst = e;
                    task.period = p;
                    task.deadline = d;
                }
                _ => {}
            },
            TaskKind::Server => {
                if let [capacity, period, ..] = *args {
                    task.burst = capacity;
                    task.capacity = capacity;
                    task.period = period;
                    task.deadline = period;
                }
            }
            TaskKind::Aperiodic => {
                if let [arrival, execution, ..] = *args {
                    task.arrival = arrival;
                    task.burst = execution;
                    task.deadline = APERIODIC_DEADLINE;
                }
            }
        }

        task
    }

    /// Full-form periodic task.
    pub fn periodic(arrival: u64, burst: u64, period: u64, deadline: u64) -> Self {
        Task::from_args(TaskKind::Periodic, &[arrival, burst, period, deadline])
    }

    /// Server task with the given capacity and replenishment period.
    pub fn server(capacity: u64, period: u64) -> Self {
        Task::from_args(TaskKind::Server, &[capacity, period])
    }

    /// Aperiodic job arriving at `arrival` with `execution` ticks of work.
    pub fn aperiodic(arrival: u64, execution: u64) -> Self {
        Task::from_args(TaskKind::Aperiodic, &[arrival, execution])
    }

    /// CPU utilisation fraction: `burst / period`.
    ///
    /// Returns `0.0` when `period` is zero to avoid division by zero.
    pub fn utilization(&self) -> f64 {
        if self.period == 0 {
            0.0
        } else {
            self.burst as f64 / self.period as f64
        }
    }
}

// ── TaskSet ───────────────────────────────────────────────────────────────────

/// An ordered, immutable collection of tasks with stable 1-based ids.
///
/// Construction assigns each task its [`TaskId`]; afterwards the set is only
/// ever borrowed.  Task order is the input order — it matters, because the
/// engine breaks priority ties by ascending id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    /// Take ownership of `tasks` and assign sequential ids `T1..Tn`.
    pub fn new(mut tasks: Vec<Task>) -> Self {
        for (index, task) in tasks.iter_mut().enumerate() {
            task.id = TaskId(index as u32 + 1);
        }
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by its id.  Ids are positional, so this is O(1).
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get((id.0 as usize).checked_sub(1)?)
    }

    /// Index of the server task, if any.
    ///
    /// The simulator binds "the server" to the **first** `S` task; any
    /// further server tasks are inert (they are neither periodic nor
    /// aperiodic).
    pub fn server_index(&self) -> Option<usize> {
        self.tasks.iter().position(|t| t.kind.is_server())
    }

    /// Total utilisation `Σ burst/period` over periodic and server tasks.
    ///
    /// Policy-independent; the caller flags overload when this exceeds the
    /// core count.
    pub fn utilization(&self) -> f64 {
        self.tasks
            .iter()
            .filter(|t| t.kind.is_periodic() || t.kind.is_server())
            .map(Task::utilization)
            .sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Task::from_args forms ─────────────────────────────────────────────────

    #[test]
    fn periodic_two_args_defaults_arrival_and_deadline() {
        let t = Task::from_args(TaskKind::Periodic, &[3, 10]);
        assert_eq!(t.arrival, 0);
        assert_eq!(t.burst, 3);
        assert_eq!(t.period, 10);
        assert_eq!(t.deadline, 10, "deadline defaults to the period");
    }

    #[test]
    fn periodic_three_args_defaults_deadline() {
        let t = Task::from_args(TaskKind::Periodic, &[2, 3, 10]);
        assert_eq!(t.arrival, 2);
        assert_eq!(t.burst, 3);
        assert_eq!(t.period, 10);
        assert_eq!(t.deadline, 10);
    }

    #[test]
    fn periodic_four_args_is_the_full_form() {
        let t = Task::from_args(TaskKind::Periodic, &[2, 3, 10, 8]);
        assert_eq!((t.arrival, t.burst, t.period, t.deadline), (2, 3, 10, 8));
    }

    #[test]
    fn deadline_first_three_args_defaults_arrival() {
        let t = Task::from_args(TaskKind::PeriodicDeadline, &[3, 10, 8]);
        assert_eq!((t.arrival, t.burst, t.period, t.deadline), (0, 3, 10, 8));
    }

    #[test]
    fn deadline_first_four_args_is_the_full_form() {
        let t = Task::from_args(TaskKind::PeriodicDeadline, &[1, 3, 10, 8]);
        assert_eq!((t.arrival, t.burst, t.period, t.deadline), (1, 3, 10, 8));
    }

    #[test]
    fn server_capacity_doubles_as_burst_and_deadline_is_period() {
        let t = Task::server(2, 10);
        assert_eq!(t.arrival, 0);
        assert_eq!(t.burst, 2);
        assert_eq!(t.capacity, 2);
        assert_eq!(t.period, 10);
        assert_eq!(t.deadline, 10);
    }

    #[test]
    fn aperiodic_has_no_period_and_a_sentinel_deadline() {
        let t = Task::aperiodic(3, 5);
        assert_eq!(t.arrival, 3);
        assert_eq!(t.burst, 5);
        assert_eq!(t.period, 0);
        assert_eq!(t.deadline, APERIODIC_DEADLINE);
    }

    // ── Malformed argument lists ──────────────────────────────────────────────

    #[test]
    fn short_argument_list_leaves_zero_defaults() {
        let t = Task::from_args(TaskKind::Periodic, &[5]);
        assert_eq!((t.arrival, t.burst, t.period, t.deadline), (0, 0, 0, 0));
    }

    #[test]
    fn overlong_periodic_argument_list_leaves_zero_defaults() {
        // Five or more positional args match no periodic form.
        let t = Task::from_args(TaskKind::Periodic, &[1, 2, 3, 4, 5]);
        assert_eq!(t.period, 0);
        assert_eq!(t.burst, 0);
    }

    #[test]
    fn server_with_one_arg_leaves_zero_defaults() {
        let t = Task::from_args(TaskKind::Server, &[4]);
        assert_eq!(t.capacity, 0);
        assert_eq!(t.period, 0);
    }

    #[test]
    fn server_extra_args_are_ignored() {
        let t = Task::from_args(TaskKind::Server, &[2, 10, 99]);
        assert_eq!(t.capacity, 2);
        assert_eq!(t.period, 10);
    }

    // ── Utilization ───────────────────────────────────────────────────────────

    #[test]
    fn task_utilization_is_burst_over_period() {
        let t = Task::periodic(0, 4, 10, 10);
        assert!((t.utilization() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn zero_period_task_has_zero_utilization() {
        assert_eq!(Task::aperiodic(3, 5).utilization(), 0.0);
    }

    #[test]
    fn taskset_utilization_sums_periodic_and_server_only() {
        let set = TaskSet::new(vec![
            Task::periodic(0, 4, 10, 10), // 0.4
            Task::server(2, 10),          // 0.2
            Task::aperiodic(3, 5),        // excluded
        ]);
        assert!((set.utilization() - 0.6).abs() < 1e-9);
    }

    // ── TaskSet identity ──────────────────────────────────────────────────────

    #[test]
    fn taskset_assigns_sequential_one_based_ids() {
        let set = TaskSet::new(vec![Task::periodic(0, 1, 4, 4), Task::server(1, 8)]);
        assert_eq!(set.tasks()[0].id, TaskId(1));
        assert_eq!(set.tasks()[1].id, TaskId(2));
        assert_eq!(set.get(TaskId(2)).unwrap().kind, TaskKind::Server);
        assert!(set.get(TaskId(3)).is_none());
        assert!(set.get(TaskId(0)).is_none());
    }

    #[test]
    fn server_index_returns_first_server_only() {
        let set = TaskSet::new(vec![
            Task::periodic(0, 1, 4, 4),
            Task::server(1, 8),
            Task::server(3, 20),
        ]);
        assert_eq!(set.server_index(), Some(1));
    }

    #[test]
    fn server_index_none_without_server() {
        let set = TaskSet::new(vec![Task::periodic(0, 1, 4, 4)]);
        assert_eq!(set.server_index(), None);
    }

    #[test]
    fn task_id_displays_with_t_prefix() {
        assert_eq!(TaskId(7).to_string(), "T7");
    }
}
