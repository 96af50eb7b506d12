//! Tick-by-tick scheduling engine.
//!
//! [`Simulator`] runs one task set under one [`Policy`] on `1..C` cores for a
//! bounded horizon and records every unit of execution as a
//! [`ScheduleEntry`].  The sequence of steps per tick:
//!
//! 1. release periodic/server jobs due at this tick,
//! 2. process pending sporadic-server replenishments,
//! 3. admit aperiodic arrivals into the FIFO,
//! 4. apply the polling check (an empty queue forfeits the poll),
//! 5. purge finished jobs and sort the ready queue by the policy's key,
//! 6. dispatch across cores in priority order,
//! 7. run the background fallback pass on cores still idle.
//!
//! # Design notes
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `run()` — queues, budget and counters are per-run locals |
//! | Purity | The input [`TaskSet`] is only borrowed; final server budgets come back in the output |
//! | Policy dispatch | One [`Policy`] variant chosen before the loop; no per-tick name matching |
//! | Job identity | Jobs carry the owning task's index — recognising the server job is an integer compare |
//! | Late jobs | Never terminated: each late dispatch tick is flagged `Miss` and counted again |
//! | Determinism | Stable sorts, id tie-breaks, FIFO aperiodic order — identical inputs give identical logs |

pub mod error;
pub mod feasibility;
pub mod log;
pub mod policy;

pub use error::ConfigurationError;
pub use log::{EntryStatus, ReplenishmentEvent, RunStats, ScheduleEntry, SimulationOutput};
pub use policy::Policy;

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info};

use crate::horizon::simulation_horizon;
use crate::task::{Task, TaskSet};

// ── Internal state types ──────────────────────────────────────────────────────

/// A release instance of a task.
///
/// `task` is the owning task's index in the set — a stable handle, so queue
/// membership tests (in particular "is this the server's job?") are plain
/// integer comparisons.
#[derive(Debug, Clone)]
struct Job {
    task: usize,
    remaining: u64,
    abs_deadline: u64,
}

/// All mutable state of one run.  Created inside [`Simulator::run`] and
/// dropped (partially into the output) at the end of the call.
#[derive(Debug, Default)]
struct SimState {
    /// Re-sorted every tick; holds periodic and server jobs only.
    ready: Vec<Job>,

    /// Pending aperiodic jobs in arrival order; serviced strictly in order.
    aperiodic: VecDeque<Job>,

    /// Sporadic-server replenishments, in scheduling order (trigger ticks
    /// are appended non-decreasing, so the front is always the earliest).
    replenishments: VecDeque<ReplenishmentEvent>,

    /// Current budget of the server task.  Simulation state, not task
    /// identity — it never leaks back into the input set.
    budget: u64,

    /// Cursor into the arrival-sorted aperiodic task list.
    next_arrival: usize,

    stats: RunStats,
    schedule: Vec<ScheduleEntry>,
}

// ── Simulator ─────────────────────────────────────────────────────────────────

/// One simulation configuration: a policy and a core count.
///
/// All per-run state lives inside [`run`](Self::run), so a `Simulator` can be
/// reused across task sets and runs freely.
pub struct Simulator {
    policy: Policy,
    cores: u32,
}

/// Convenience wrapper: `Simulator::new(policy, cores).run(tasks)`.
pub fn simulate(
    tasks: &TaskSet,
    policy: Policy,
    cores: u32,
) -> Result<SimulationOutput, ConfigurationError> {
    Simulator::new(policy, cores).run(tasks)
}

impl Simulator {
    pub fn new(policy: Policy, cores: u32) -> Self {
        Self { policy, cores }
    }

    // ── Public entry point ────────────────────────────────────────────────────

    /// Simulate `set` over its horizon and return the schedule log,
    /// statistics and final server state.
    ///
    /// # Errors
    /// [`ConfigurationError::ServerRequired`] when the policy needs a server
    /// task and the set has none.  An empty task set is *not* an error: the
    /// run covers the default horizon and produces an empty log.
    pub fn run(&self, set: &TaskSet) -> Result<SimulationOutput, ConfigurationError> {
        debug_assert!(self.cores > 0, "Simulator::run called with zero cores");

        let tasks = set.tasks();
        let server = set.server_index();

        if self.policy.requires_server() && server.is_none() {
            return Err(ConfigurationError::ServerRequired {
                policy: self.policy,
            });
        }

        // Release participants: periodic tasks in input order, then the
        // server (kept out entirely under Background).
        let mut active: Vec<usize> = (0..tasks.len())
            .filter(|&i| tasks[i].kind.is_periodic())
            .collect();
        if let Some(s) = server {
            if self.policy.releases_server() {
                active.push(s);
            }
        }

        // Aperiodic arrivals ordered by arrival tick; the sort is stable so
        // simultaneous arrivals keep input order.
        let mut arrivals: Vec<usize> = (0..tasks.len())
            .filter(|&i| tasks[i].kind.is_aperiodic())
            .collect();
        arrivals.sort_by_key(|&i| tasks[i].arrival);

        let periods: Vec<u64> = active.iter().map(|&i| tasks[i].period).collect();
        let horizon = simulation_horizon(&periods);

        info!(
            policy = %self.policy,
            cores = self.cores,
            tasks = tasks.len(),
            horizon,
            utilization = set.utilization(),
            "simulation start"
        );

        let mut state = SimState {
            budget: server.map(|s| tasks[s].capacity).unwrap_or(0),
            ..SimState::default()
        };

        for now in 0..horizon {
            self.release_jobs(tasks, &active, server, &mut state, now);
            self.process_replenishments(tasks, server, &mut state, now);
            self.admit_aperiodics(tasks, &arrivals, &mut state, now);
            self.apply_polling_check(server, &mut state);
            self.sort_ready(tasks, &mut state, now);
            self.dispatch(tasks, server, &mut state, now);
        }

        let mut server_budgets = BTreeMap::new();
        for (index, task) in tasks.iter().enumerate() {
            if task.kind.is_server() {
                // Only the bound server spends budget; surplus `S` tasks are
                // inert and stay at capacity.
                let budget = if Some(index) == server {
                    state.budget
                } else {
                    task.capacity
                };
                server_budgets.insert(task.id, budget);
            }
        }

        info!(
            total_jobs = state.stats.total_jobs,
            missed_deadlines = state.stats.missed_deadlines,
            aperiodic_completed = state.stats.aperiodic_completed,
            entries = state.schedule.len(),
            "simulation complete"
        );

        Ok(SimulationOutput {
            schedule: state.schedule,
            horizon,
            stats: state.stats,
            server_budgets,
            pending_replenishments: state.replenishments.into_iter().collect(),
        })
    }

    // ── Step 1: periodic / server releases ────────────────────────────────────

    /// Release a job for every active task whose period boundary falls on
    /// `now`.  Counts every release — server releases included, admitted or
    /// not.
    fn release_jobs(
        &self,
        tasks: &[Task],
        active: &[usize],
        server: Option<usize>,
        state: &mut SimState,
        now: u64,
    ) {
        for &index in active {
            let task = &tasks[index];
            // A zero period never releases (the documented fallback for
            // malformed lines).
            if task.period == 0 || now < task.arrival {
                continue;
            }
            if (now - task.arrival) % task.period != 0 {
                continue;
            }

            state.stats.total_jobs += 1;
            let mut job = Job {
                task: index,
                remaining: task.burst,
                abs_deadline: now + task.deadline,
            };

            if Some(index) != server {
                // An unfinished predecessor stays queued: it keeps executing
                // (late) alongside the new job.
                state.ready.push(job);
                continue;
            }

            match self.policy {
                Policy::DeferrableServer => {
                    // Boundary reset: full capacity, outstanding server job
                    // discarded and replaced.
                    state.budget = task.capacity;
                    state.ready.retain(|j| j.task != index);
                    job.remaining = state.budget;
                    state.ready.push(job);
                }
                Policy::SporadicServer => {
                    // Admitted only while budget remains; replenishments may
                    // revive the server later in the period.
                    if state.budget > 0 {
                        job.remaining = state.budget;
                        state.ready.retain(|j| j.task != index);
                        state.ready.push(job);
                    }
                }
                _ => state.ready.push(job),
            }
        }
    }

    // ── Step 2: sporadic-server replenishments ────────────────────────────────

    /// Apply every replenishment whose trigger tick has been reached: top up
    /// the budget (capped at capacity) and refresh — or re-synthesise — the
    /// server's ready entry.
    fn process_replenishments(
        &self,
        tasks: &[Task],
        server: Option<usize>,
        state: &mut SimState,
        now: u64,
    ) {
        if self.policy != Policy::SporadicServer {
            return;
        }
        let Some(s) = server else { return };
        let server_task = &tasks[s];

        while let Some(event) = state.replenishments.front().copied() {
            if event.due > now {
                break;
            }
            state.replenishments.pop_front();
            state.budget = (state.budget + event.amount).min(server_task.capacity);
            debug!(tick = now, budget = state.budget, "sporadic replenishment");

            if let Some(job) = state.ready.iter_mut().find(|j| j.task == s) {
                job.remaining = state.budget;
            } else if state.budget > 0 {
                // The server had left the queue on budget exhaustion; give it
                // a fresh entry with a deadline one period out.
                state.ready.push(Job {
                    task: s,
                    remaining: state.budget,
                    abs_deadline: now + server_task.period,
                });
            }
        }
    }

    // ── Step 3: aperiodic arrivals ────────────────────────────────────────────

    /// Move every aperiodic task arriving at `now` into the FIFO.
    fn admit_aperiodics(
        &self,
        tasks: &[Task],
        arrivals: &[usize],
        state: &mut SimState,
        now: u64,
    ) {
        while let Some(&index) = arrivals.get(state.next_arrival) {
            if tasks[index].arrival != now {
                break;
            }
            state.next_arrival += 1;
            if tasks[index].burst == 0 {
                // Malformed line fallback: a zero-work job would block the
                // FIFO forever, so it is never enqueued.
                debug!(task = %tasks[index].id, "skipping zero-burst aperiodic job");
                continue;
            }
            state.aperiodic.push_back(Job {
                task: index,
                remaining: tasks[index].burst,
                abs_deadline: tasks[index].deadline,
            });
        }
    }

    // ── Step 4: polling check ─────────────────────────────────────────────────

    /// Under [`Policy::Polling`]: if the aperiodic queue is empty when the
    /// server would poll, the opportunity for this tick is lost, not banked —
    /// the server job's remaining execution is zeroed and the purge removes
    /// it.
    fn apply_polling_check(&self, server: Option<usize>, state: &mut SimState) {
        if self.policy != Policy::Polling {
            return;
        }
        let Some(s) = server else { return };
        if !state.aperiodic.is_empty() {
            return;
        }
        if let Some(job) = state.ready.iter_mut().find(|j| j.task == s) {
            job.remaining = 0;
        }
    }

    // ── Step 5: purge + priority ordering ─────────────────────────────────────

    /// Drop finished jobs and sort by the policy's key; ties always break by
    /// ascending task id (the sort is stable, so equal keys of the same task
    /// keep release order).
    fn sort_ready(&self, tasks: &[Task], state: &mut SimState, now: u64) {
        state.ready.retain(|j| j.remaining > 0);
        let policy = self.policy;
        state.ready.sort_by_key(|j| {
            let task = &tasks[j.task];
            (
                policy.order_key(task, j.remaining, j.abs_deadline, now),
                task.id,
            )
        });
    }

    // ── Steps 6 + 7: dispatch ─────────────────────────────────────────────────

    /// Walk the sorted ready queue assigning cores `1..=C` in priority
    /// order, then hand any still-idle cores to the aperiodic FIFO under
    /// [`Policy::Background`].
    fn dispatch(&self, tasks: &[Task], server: Option<usize>, state: &mut SimState, now: u64) {
        let mut cores_available = self.cores;
        let mut index = 0;

        while cores_available > 0 && index < state.ready.len() {
            let is_server = Some(state.ready[index].task) == server;

            // A deferrable/sporadic server with nothing to serve is passed
            // over without consuming a core slot.
            if is_server && state.aperiodic.is_empty() && self.policy.skips_idle_server() {
                index += 1;
                continue;
            }

            let core = self.cores - cores_available + 1;
            let owner = tasks[state.ready[index].task].id;
            let mut label = Some(owner);

            if is_server && self.policy.server_services_aperiodics() {
                if let Some(front) = state.aperiodic.front_mut() {
                    // The server's slot executes the front aperiodic job.
                    label = Some(tasks[front.task].id);
                    front.remaining -= 1;
                    if front.remaining == 0 {
                        state.aperiodic.pop_front();
                        state.stats.aperiodic_completed += 1;
                    }
                } else {
                    // Budget burns with nothing to serve (plain RM/DM/EDF/LLF
                    // keep the server job runnable even when idle).
                    label = None;
                }
            }

            let status = if now >= state.ready[index].abs_deadline {
                state.stats.missed_deadlines += 1;
                EntryStatus::Miss
            } else {
                EntryStatus::Ok
            };

            state.schedule.push(ScheduleEntry {
                core,
                time: now,
                duration: 1,
                label,
                status,
                task: owner,
            });

            state.ready[index].remaining -= 1;

            if is_server {
                match self.policy {
                    Policy::SporadicServer => {
                        state.budget = state.budget.saturating_sub(1);
                        state.replenishments.push_back(ReplenishmentEvent {
                            due: now + tasks[state.ready[index].task].period,
                            amount: 1,
                        });
                    }
                    Policy::DeferrableServer => {
                        state.budget = state.budget.saturating_sub(1);
                    }
                    _ => {}
                }
            }

            if state.ready[index].remaining == 0 {
                state.ready.remove(index);
            } else {
                index += 1;
            }
            cores_available -= 1;
        }

        if self.policy != Policy::Background {
            return;
        }

        // Background fallback: idle cores take the aperiodic FIFO head.
        while cores_available > 0 {
            let Some(front) = state.aperiodic.front_mut() else {
                break;
            };
            let core = self.cores - cores_available + 1;
            let id = tasks[front.task].id;
            state.schedule.push(ScheduleEntry {
                core,
                time: now,
                duration: 1,
                label: Some(id),
                status: EntryStatus::Ok,
                task: id,
            });
            front.remaining -= 1;
            if front.remaining == 0 {
                state.aperiodic.pop_front();
                state.stats.aperiodic_completed += 1;
            }
            cores_available -= 1;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
