/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use metronome::report::{render_text, SimulationReport};
use metronome::sim::{feasibility, simulate, Policy};
use metronome::task::TaskSet;
use metronome::taskset;
use metronome::taskset::gen::{generate, GeneratorSpec};

// ── CLI argument definition ───────────────────────────────────────────────────

/// metronome – discrete-time real-time scheduling simulator.
///
/// Example:
///   metronome --taskset demo.txt --policy edf --cores 2 --yaml result.yaml
///   metronome --random 6 --with-server --policy sporadic-server --seed 42
#[derive(Debug, Parser)]
#[command(
    name = "metronome",
    about = "Discrete-time real-time scheduling simulator",
    long_about = None,
)]
struct Cli {
    /// Path to the task-set file (P/D/S/A line grammar).
    #[arg(short = 't', long = "taskset")]
    taskset: Option<PathBuf>,

    /// Scheduling policy: rm, dm, edf, llf, background, polling,
    /// deferrable-server, sporadic-server, rm-baseline.
    #[arg(short = 'p', long = "policy", default_value = "rm")]
    policy: Policy,

    /// Number of processor cores.
    #[arg(short = 'c', long = "cores", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    cores: u32,

    /// Write the machine-readable YAML report to this path.
    #[arg(short = 'o', long = "yaml")]
    yaml: Option<PathBuf>,

    /// Generate a random task set of this many tasks instead of loading one.
    #[arg(long = "random", conflicts_with = "taskset")]
    random: Option<usize>,

    /// Aperiodic tasks in the generated set.
    #[arg(long = "aperiodic", default_value_t = 1)]
    aperiodic: usize,

    /// Target utilisation for the generated set.
    #[arg(long = "target-util", default_value_t = 0.8)]
    target_util: f64,

    /// Reserve part of the generated utilisation for a server task.
    #[arg(long = "with-server", default_value_t = false)]
    with_server: bool,

    /// Generator seed; omit for a fresh set every run.
    #[arg(long = "seed")]
    seed: Option<u64>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        policy = %cli.policy,
        cores = cli.cores,
        taskset = ?cli.taskset,
        "metronome starting up"
    );

    // ── Build the task set ────────────────────────────────────────────────────
    let set = match build_task_set(&cli) {
        Ok(set) => set,
        Err(e) => {
            error!("failed to build task set: {:#}", e);
            process::exit(1);
        }
    };
    if set.is_empty() {
        warn!("task set is empty — simulating the default horizon with an empty log");
    }

    // ── Advisory feasibility checks ───────────────────────────────────────────
    let utilization = set.utilization();
    if feasibility::is_overloaded(&set, cli.cores) {
        warn!(
            utilization,
            cores = cli.cores,
            "task set overloads the platform (U > cores) — misses are certain"
        );
    } else if let Some(total_u) = feasibility::check_liu_layland(&set) {
        let n = set
            .tasks()
            .iter()
            .filter(|t| (t.kind.is_periodic() || t.kind.is_server()) && t.period > 0)
            .count();
        warn!(
            utilization = total_u,
            bound = feasibility::liu_layland_bound(n),
            task_count = n,
            "task set may not be RM-schedulable (utilisation exceeds the \
             Liu & Layland bound) — the schedule log will tell"
        );
    }

    // ── Run ───────────────────────────────────────────────────────────────────
    let output = match simulate(&set, cli.policy, cli.cores) {
        Ok(output) => output,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    // ── Report ────────────────────────────────────────────────────────────────
    let report = SimulationReport::new(&set, cli.policy, cli.cores, &output);
    print!("{}", render_text(&set, &report));

    if let Some(path) = &cli.yaml {
        if let Err(e) = write_yaml(path, &report) {
            error!("failed to write YAML report: {:#}", e);
            process::exit(1);
        }
        info!(path = %path.display(), "YAML report written");
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Load the task set from a file, or generate one when `--random` is given.
fn build_task_set(cli: &Cli) -> anyhow::Result<TaskSet> {
    if let Some(path) = &cli.taskset {
        return taskset::load_from_file(path);
    }

    if let Some(total_tasks) = cli.random {
        let spec = GeneratorSpec {
            total_tasks,
            aperiodic_tasks: cli.aperiodic,
            target_utilization: cli.target_util,
            include_server: cli.with_server,
        };
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let set = generate(&mut rng, &spec);
        info!(
            tasks = set.len(),
            utilization = set.utilization(),
            seed = ?cli.seed,
            "generated random task set"
        );
        return Ok(set);
    }

    anyhow::bail!("no task set: pass --taskset FILE or --random N")
}

fn write_yaml(path: &Path, report: &SimulationReport) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(report).context("serialising report")?;
    std::fs::write(path, yaml).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
