/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scheduling policy selection.
//!
//! [`Policy`] is a closed set chosen **once** before the tick loop starts.
//! Each variant carries its own ready-queue ordering key and its
//! aperiodic-service behaviour as methods, so the engine never does string
//! comparisons inside the loop.

use std::fmt;
use std::str::FromStr;

use crate::sim::error::ConfigurationError;
use crate::task::Task;

/// Ordering-key stand-in for a zero period under rate-monotonic sorting.
///
/// Larger than any period the horizon cap admits, so a period-less job always
/// sorts last.
pub const PERIOD_SENTINEL: u64 = 9_999;

// ── Policy ────────────────────────────────────────────────────────────────────

/// The scheduling discipline for one simulation run.
///
/// The first four are pure priority orderings; the rest govern how aperiodic
/// jobs obtain service (they all order the ready queue rate-monotonically).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Shorter period → higher priority.
    #[default]
    RateMonotonic,
    /// Shorter relative deadline → higher priority.
    DeadlineMonotonic,
    /// Earlier absolute deadline → higher priority.
    EarliestDeadlineFirst,
    /// Less slack (`abs_deadline − now − remaining`) → higher priority;
    /// recomputed every tick.
    LeastLaxityFirst,
    /// Aperiodic jobs run only on cores left idle by periodic work; the
    /// server task (if any) is never released.
    Background,
    /// Polling server: the poll opportunity is lost for any tick on which
    /// the aperiodic queue is empty.
    Polling,
    /// Deferrable server: budget resets to full capacity at every period
    /// boundary; unused budget is preserved within the period.
    DeferrableServer,
    /// Sporadic server: budget is replenished one unit at a time, one period
    /// after each tick of actual consumption.
    SporadicServer,
    /// The server task runs as an ordinary periodic task and never services
    /// the aperiodic queue.  Reference behaviour for comparing the server
    /// techniques against plain rate-monotonic scheduling.
    RmBaseline,
}

impl Policy {
    /// Policies that cannot run without a server (`S`) task in the set.
    pub fn requires_server(self) -> bool {
        matches!(
            self,
            Policy::Polling | Policy::DeferrableServer | Policy::SporadicServer
        )
    }

    /// Whether the server task participates in periodic releases.
    ///
    /// Under [`Policy::Background`] the server stays out of the ready queue
    /// entirely — aperiodic work is served on idle cores instead.
    pub fn releases_server(self) -> bool {
        !matches!(self, Policy::Background)
    }

    /// Whether a server job with an empty aperiodic queue is passed over at
    /// dispatch without consuming a core slot.
    pub fn skips_idle_server(self) -> bool {
        matches!(self, Policy::DeferrableServer | Policy::SporadicServer)
    }

    /// Whether a dispatched server job executes the front of the aperiodic
    /// queue in its slot.
    pub fn server_services_aperiodics(self) -> bool {
        !matches!(self, Policy::RmBaseline)
    }

    /// Priority key for one ready job; lower sorts first.  Ties are broken
    /// by ascending task id in the engine's sort.
    ///
    /// Signed, because least-laxity keys go negative once a job is running
    /// late.
    pub fn order_key(self, task: &Task, remaining: u64, abs_deadline: u64, now: u64) -> i64 {
        match self {
            Policy::EarliestDeadlineFirst => abs_deadline as i64,
            Policy::DeadlineMonotonic => task.deadline as i64,
            Policy::LeastLaxityFirst => {
                abs_deadline as i64 - now as i64 - remaining as i64
            }
            // Rate-monotonic order for everything else, server policies
            // included.
            _ => {
                if task.period > 0 {
                    task.period as i64
                } else {
                    PERIOD_SENTINEL as i64
                }
            }
        }
    }
}

// ── String boundary ───────────────────────────────────────────────────────────

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Policy::RateMonotonic => "rate-monotonic",
            Policy::DeadlineMonotonic => "deadline-monotonic",
            Policy::EarliestDeadlineFirst => "earliest-deadline-first",
            Policy::LeastLaxityFirst => "least-laxity-first",
            Policy::Background => "background",
            Policy::Polling => "polling",
            Policy::DeferrableServer => "deferrable-server",
            Policy::SporadicServer => "sporadic-server",
            Policy::RmBaseline => "rm-baseline",
        };
        f.write_str(name)
    }
}

impl FromStr for Policy {
    type Err = ConfigurationError;

    /// Parse a policy name.  Accepts the canonical kebab-case names and the
    /// usual abbreviations (`rm`, `dm`, `edf`, `llf`, `ds`, `ss`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rm" | "rate-monotonic" => Ok(Policy::RateMonotonic),
            "dm" | "deadline-monotonic" => Ok(Policy::DeadlineMonotonic),
            "edf" | "earliest-deadline-first" => Ok(Policy::EarliestDeadlineFirst),
            "llf" | "least-laxity-first" => Ok(Policy::LeastLaxityFirst),
            "bg" | "background" => Ok(Policy::Background),
            "poll" | "polling" | "polling-server" => Ok(Policy::Polling),
            "ds" | "deferrable" | "deferrable-server" => Ok(Policy::DeferrableServer),
            "ss" | "sporadic" | "sporadic-server" => Ok(Policy::SporadicServer),
            "rm-baseline" | "baseline" => Ok(Policy::RmBaseline),
            other => Err(ConfigurationError::UnknownPolicy(other.to_string())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
