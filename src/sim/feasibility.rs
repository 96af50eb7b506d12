/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedulability analysis for the loaded task set.
//!
//! Two checks, both advisory — the simulator runs the task set either way and
//! the schedule log is what actually demonstrates the misses:
//!
//! * **Overload**: total utilisation above the core count means the task set
//!   cannot possibly be schedulable on any discipline.
//! * **Liu & Layland (1973)**: under Rate Monotonic scheduling, `n`
//!   independent periodic tasks are guaranteed schedulable on one core if
//!
//!   $$U = \sum_{i=1}^{n} \frac{C_i}{T_i} \leq n \left(2^{1/n} - 1\right)$$
//!
//!   The bound tightens as `n` grows, converging to `ln(2) ≈ 0.693`.  A set
//!   between the bound and 1.0 may or may not be schedulable — only the
//!   simulation itself tells.

use crate::task::TaskSet;

// ── Public API ────────────────────────────────────────────────────────────────

/// Compute the Liu & Layland utilisation upper bound for `n` tasks.
///
/// `U_bound(n) = n × (2^(1/n) − 1)`
///
/// Returns `1.0` for `n = 1` (a single task always fits if `U ≤ 1`),
/// and `0.0` for `n = 0`.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// Check the task set against the Liu & Layland bound.
///
/// Only periodic and server tasks with a positive period participate.
/// Returns `None` when the set is provably RM-schedulable on one core
/// (total utilisation ≤ bound), `Some(total_utilisation)` when the bound is
/// exceeded and the caller should warn.
pub fn check_liu_layland(set: &TaskSet) -> Option<f64> {
    let n = set
        .tasks()
        .iter()
        .filter(|t| (t.kind.is_periodic() || t.kind.is_server()) && t.period > 0)
        .count();

    if n == 0 {
        return None;
    }

    let total_u = set.utilization();
    if total_u > liu_layland_bound(n) {
        Some(total_u)
    } else {
        None
    }
}

/// Overload flag: `true` when total utilisation exceeds the core count, i.e.
/// no discipline can schedule the set without misses.
pub fn is_overloaded(set: &TaskSet, cores: u32) -> bool {
    set.utilization() > cores as f64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
