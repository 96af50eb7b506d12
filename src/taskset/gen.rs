/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Random task-set generation.
//!
//! The engine itself is deterministic and randomness-free; generation is the
//! external collaborator that feeds it.  The generator takes the RNG as a
//! parameter, so a seeded `StdRng` reproduces a set exactly — useful both for
//! tests and for sharing interesting workloads by seed.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::task::{Task, TaskSet};

/// Periods the generator draws from for periodic tasks.
const PERIOD_POOL: [u64; 7] = [20, 40, 50, 60, 80, 100, 200];

/// Periods the generator draws from for the server task.
const SERVER_PERIOD_POOL: [u64; 3] = [20, 40, 50];

// ── Generator knobs ───────────────────────────────────────────────────────────

/// Shape of one generated task set.
#[derive(Debug, Clone)]
pub struct GeneratorSpec {
    /// Total number of tasks, server included.
    pub total_tasks: usize,

    /// How many of them are aperiodic jobs.
    pub aperiodic_tasks: usize,

    /// Utilisation budget split across the periodic tasks (and the server's
    /// share, when present).
    pub target_utilization: f64,

    /// Reserve part of the budget for a server task (at most 20%).
    pub include_server: bool,
}

impl Default for GeneratorSpec {
    fn default() -> Self {
        Self {
            total_tasks: 5,
            aperiodic_tasks: 1,
            target_utilization: 0.8,
            include_server: false,
        }
    }
}

// ── Generation ────────────────────────────────────────────────────────────────

/// Generate a task set per `spec`.
///
/// The utilisation budget is carved into per-task shares by sorting uniform
/// split points, so the shares sum to the budget; each burst is rounded to at
/// least one tick and clamped below its period.  The server (when requested)
/// is placed first so it wins priority ties against equal-period tasks.
pub fn generate<R: Rng>(rng: &mut R, spec: &GeneratorSpec) -> TaskSet {
    let mut tasks = Vec::new();
    let mut budget = spec.target_utilization;

    let server = spec.include_server.then(|| {
        let share = (budget * 0.25).min(0.2);
        budget -= share;
        let period = SERVER_PERIOD_POOL.choose(rng).copied().unwrap_or(20);
        let capacity = ((period as f64 * share) as u64).max(1);
        Task::server(capacity, period)
    });

    let mut periodic = spec.total_tasks.saturating_sub(spec.aperiodic_tasks);
    if spec.include_server {
        periodic = periodic.saturating_sub(1);
    }

    if periodic > 0 && budget > 0.0 {
        let mut points: Vec<f64> = (1..periodic).map(|_| rng.gen_range(0.0..budget)).collect();
        points.push(0.0);
        points.push(budget);
        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for pair in points.windows(2) {
            let share = pair[1] - pair[0];
            let period = PERIOD_POOL.choose(rng).copied().unwrap_or(20);
            let mut burst = ((period as f64 * share) as u64).max(1);
            if burst >= period {
                burst = period - 1;
            }
            tasks.push(Task::periodic(0, burst, period, period));
        }
    }

    if let Some(server) = server {
        tasks.insert(0, server);
    }

    for _ in 0..spec.aperiodic_tasks {
        let arrival = rng.gen_range(0..=100u64);
        let execution = rng.gen_range(1..=5u64);
        tasks.push(Task::aperiodic(arrival, execution));
    }

    TaskSet::new(tasks)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
