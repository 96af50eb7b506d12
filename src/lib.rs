/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! metronome – discrete-time real-time scheduling simulator
//!
//! ```text
//! lib.rs
//! ├── task/        – task model: TaskId, TaskKind, Task, TaskSet
//! ├── taskset/     – text-format parsing + random generation
//! ├── horizon/     – LCM-based simulation horizon (capped)
//! ├── sim/         – the tick engine: policies, dispatch, schedule log
//! └── report/      – run-length merged segments, text / YAML reports
//! ```
//!
//! The engine entry point is [`sim::simulate`]; everything it needs is a
//! [`task::TaskSet`], a [`sim::Policy`] and a core count, and everything it
//! produces comes back in a [`sim::SimulationOutput`].

pub mod horizon;
pub mod report;
pub mod sim;
pub mod task;
pub mod taskset;
