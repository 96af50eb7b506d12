/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for the simulation engine.
//!
//! [`ConfigurationError`] is the **only** fault the engine raises, and it is
//! returned as a value, never used for control flow elsewhere.  Everything
//! else — exhausted budgets, empty queues, empty task sets, jobs running past
//! their deadlines — is a normal steady state of the simulation.
//!
//! | Variant | Raised by |
//! |---|---|
//! | `ServerRequired` | `Simulator::run` when a server-dependent policy finds no `S` task |
//! | `UnknownPolicy` | `Policy::from_str` at the CLI boundary |

use thiserror::Error;

use crate::sim::policy::Policy;

/// A task set / policy combination the engine cannot simulate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The selected policy dispatches aperiodic work through a server task,
    /// but the task set contains none.
    #[error("policy '{policy}' requires a server (S) task in the task set")]
    ServerRequired { policy: Policy },

    /// The policy name could not be parsed.
    #[error(
        "unknown scheduling policy: '{0}' (valid: rm, dm, edf, llf, background, \
         polling, deferrable-server, sporadic-server, rm-baseline)"
    )]
    UnknownPolicy(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_required_names_the_policy() {
        let err = ConfigurationError::ServerRequired {
            policy: Policy::DeferrableServer,
        };
        assert!(err.to_string().contains("deferrable-server"));
        assert!(err.to_string().contains("server (S) task"));
    }

    #[test]
    fn unknown_policy_lists_the_valid_names() {
        let err = ConfigurationError::UnknownPolicy("fifo".into());
        assert!(err.to_string().contains("'fifo'"));
        assert!(err.to_string().contains("sporadic-server"));
    }
}
