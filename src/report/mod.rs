//! Renderer-facing views of a simulation run.
//!
//! The engine emits one [`ScheduleEntry`] per core per tick.  External
//! consumers (chart renderers, report writers) want contiguous bars instead,
//! so this module run-length merges the raw log into [`ScheduleSegment`]s and
//! bundles everything a reporter needs into one serialisable
//! [`SimulationReport`].  A plain-text rendering is included for terminal
//! use; anything fancier is the consumer's business.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::sim::{EntryStatus, Policy, RunStats, ScheduleEntry, SimulationOutput};
use crate::task::{TaskId, TaskSet};

// ── Segments ──────────────────────────────────────────────────────────────────

/// A maximal run of contiguous schedule entries on one core that agree in
/// task, status and label.  Covers `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSegment {
    pub core: u32,
    pub start: u64,
    pub end: u64,
    pub label: Option<TaskId>,
    pub status: EntryStatus,
    pub task: TaskId,
}

impl ScheduleSegment {
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }

    /// Display id: the label if present, otherwise the owning task.
    pub fn display_id(&self) -> TaskId {
        self.label.unwrap_or(self.task)
    }
}

/// Run-length merge the raw per-tick log into segments.
///
/// Entries are ordered by `(core, time)` first, then merged while core, task,
/// status and label all match and the times are contiguous.  A status flip
/// (OK → MISS) always starts a new segment, so late stretches stay visible.
pub fn merge_schedule(entries: &[ScheduleEntry]) -> Vec<ScheduleSegment> {
    let mut sorted: Vec<&ScheduleEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.core, e.time));

    let mut segments: Vec<ScheduleSegment> = Vec::new();
    for entry in sorted {
        if let Some(last) = segments.last_mut() {
            if last.core == entry.core
                && last.task == entry.task
                && last.status == entry.status
                && last.label == entry.label
                && last.end == entry.time
            {
                last.end += entry.duration;
                continue;
            }
        }
        segments.push(ScheduleSegment {
            core: entry.core,
            start: entry.time,
            end: entry.time + entry.duration,
            label: entry.label,
            status: entry.status,
            task: entry.task,
        });
    }
    segments
}

// ── Report bundle ─────────────────────────────────────────────────────────────

/// Everything a reporter needs from one run, ready to serialise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub policy: String,
    pub cores: u32,
    pub horizon: u64,
    pub utilization: f64,
    /// `true` when utilisation exceeds the core count.
    pub overloaded: bool,
    pub stats: RunStats,
    pub server_budgets: BTreeMap<TaskId, u64>,
    pub segments: Vec<ScheduleSegment>,
}

impl SimulationReport {
    pub fn new(set: &TaskSet, policy: Policy, cores: u32, output: &SimulationOutput) -> Self {
        let utilization = set.utilization();
        Self {
            policy: policy.to_string(),
            cores,
            horizon: output.horizon,
            utilization,
            overloaded: utilization > cores as f64,
            stats: output.stats,
            server_budgets: output.server_budgets.clone(),
            segments: merge_schedule(&output.schedule),
        }
    }
}

// ── Text rendering ────────────────────────────────────────────────────────────

/// Render the report as plain text: header, task table, statistics and the
/// merged execution log.
pub fn render_text(set: &TaskSet, report: &SimulationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "===================================================");
    let _ = writeln!(out, "       REAL-TIME SCHEDULING SIMULATION REPORT      ");
    let _ = writeln!(out, "===================================================");
    let _ = writeln!(out, "Policy         : {}", report.policy);
    let _ = writeln!(out, "Configuration  : {} core(s)", report.cores);
    let _ = writeln!(out, "System load (U): {:.1}%", report.utilization * 100.0);
    let _ = writeln!(out, "===================================================");
    let _ = writeln!(out);

    let _ = writeln!(out, "-------------------- TASK SET ---------------------");
    let _ = writeln!(
        out,
        "{:<6} {:<10} {:<10} {:<10} {:<10}",
        "ID", "Type", "Exec(C)", "Period(P)", "Deadline(D)"
    );
    let _ = writeln!(out, "{}", "-".repeat(50));
    for task in set.tasks() {
        let _ = writeln!(
            out,
            "{:<6} {:<10} {:<10} {:<10} {:<10}",
            task.id.to_string(),
            task.kind.name(),
            task.burst,
            task.period,
            task.deadline
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(out);

    let _ = writeln!(out, "------------------- STATISTICS --------------------");
    let _ = writeln!(out, "Simulated horizon          : {} ticks", report.horizon);
    let _ = writeln!(out, "Total job instances        : {}", report.stats.total_jobs);
    let _ = writeln!(
        out,
        "Aperiodic jobs completed   : {}",
        report.stats.aperiodic_completed
    );
    let _ = writeln!(
        out,
        "Deadline misses            : {}",
        report.stats.missed_deadlines
    );
    let status = if report.stats.missed_deadlines > 0 {
        "FAILURE (system overloaded)"
    } else {
        "SUCCESS"
    };
    let _ = writeln!(out, "STATUS                     : {status}");
    let _ = writeln!(out);

    let _ = writeln!(out, "----------------- EXECUTION LOG -------------------");
    let _ = writeln!(
        out,
        "{:<6} | {:<8} | {:<8} | {:<8} | Status",
        "Core", "Start", "End", "Task"
    );
    let _ = writeln!(out, "{}", "-".repeat(55));
    for segment in &report.segments {
        let status = match segment.status {
            EntryStatus::Ok => "OK",
            EntryStatus::Miss => "MISS",
        };
        let _ = writeln!(
            out,
            "{:<6} | {:<8} | {:<8} | {:<8} | {}",
            segment.core,
            segment.start,
            segment.end,
            segment.display_id().to_string(),
            status
        );
    }

    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{simulate, Policy};
    use crate::task::{Task, TaskSet};

    fn entry(core: u32, time: u64, task: u32, status: EntryStatus) -> ScheduleEntry {
        ScheduleEntry {
            core,
            time,
            duration: 1,
            label: Some(TaskId(task)),
            status,
            task: TaskId(task),
        }
    }

    // ── merge_schedule ────────────────────────────────────────────────────────

    #[test]
    fn contiguous_entries_merge_into_one_segment() {
        let entries = vec![
            entry(1, 0, 1, EntryStatus::Ok),
            entry(1, 1, 1, EntryStatus::Ok),
            entry(1, 2, 1, EntryStatus::Ok),
        ];
        let segments = merge_schedule(&entries);
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start, segments[0].end), (0, 3));
        assert_eq!(segments[0].duration(), 3);
    }

    #[test]
    fn a_gap_splits_segments() {
        let entries = vec![entry(1, 0, 1, EntryStatus::Ok), entry(1, 2, 1, EntryStatus::Ok)];
        let segments = merge_schedule(&entries);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn a_task_change_splits_segments() {
        let entries = vec![entry(1, 0, 1, EntryStatus::Ok), entry(1, 1, 2, EntryStatus::Ok)];
        assert_eq!(merge_schedule(&entries).len(), 2);
    }

    #[test]
    fn a_status_flip_splits_segments() {
        let entries = vec![
            entry(1, 0, 1, EntryStatus::Ok),
            entry(1, 1, 1, EntryStatus::Miss),
            entry(1, 2, 1, EntryStatus::Miss),
        ];
        let segments = merge_schedule(&entries);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].status, EntryStatus::Miss);
        assert_eq!((segments[1].start, segments[1].end), (1, 3));
    }

    #[test]
    fn cores_never_merge_across() {
        let entries = vec![entry(1, 0, 1, EntryStatus::Ok), entry(2, 1, 1, EntryStatus::Ok)];
        assert_eq!(merge_schedule(&entries).len(), 2);
    }

    #[test]
    fn entries_are_ordered_by_core_then_time_before_merging() {
        // Dispatch order interleaves cores; the merge still finds the runs.
        let entries = vec![
            entry(1, 0, 1, EntryStatus::Ok),
            entry(2, 0, 2, EntryStatus::Ok),
            entry(1, 1, 1, EntryStatus::Ok),
            entry(2, 1, 2, EntryStatus::Ok),
        ];
        let segments = merge_schedule(&entries);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].core, 1);
        assert_eq!(segments[0].duration(), 2);
        assert_eq!(segments[1].core, 2);
    }

    #[test]
    fn a_label_change_splits_segments_even_for_one_task() {
        // A server slot switching from one aperiodic job to another shows as
        // two bars even though the owning task is the same.
        let mut a = entry(1, 0, 1, EntryStatus::Ok);
        a.label = Some(TaskId(3));
        let mut b = entry(1, 1, 1, EntryStatus::Ok);
        b.label = Some(TaskId(4));
        assert_eq!(merge_schedule(&[a, b]).len(), 2);
    }

    // ── SimulationReport / render_text ────────────────────────────────────────

    fn demo_run() -> (TaskSet, SimulationReport) {
        let set = TaskSet::new(vec![
            Task::periodic(0, 4, 10, 10),
            Task::periodic(0, 3, 15, 15),
        ]);
        let output = simulate(&set, Policy::EarliestDeadlineFirst, 1).unwrap();
        let report = SimulationReport::new(&set, Policy::EarliestDeadlineFirst, 1, &output);
        (set, report)
    }

    #[test]
    fn report_carries_policy_name_and_overload_flag() {
        let (_, report) = demo_run();
        assert_eq!(report.policy, "earliest-deadline-first");
        assert!(!report.overloaded, "U = 0.6 on one core");
        assert_eq!(report.horizon, 30);
    }

    #[test]
    fn report_serialises_to_yaml() {
        let (_, report) = demo_run();
        let yaml = serde_yaml::to_string(&report).unwrap();
        assert!(yaml.contains("policy: earliest-deadline-first"));
        assert!(yaml.contains("segments:"));
    }

    #[test]
    fn text_report_contains_all_sections() {
        let (set, report) = demo_run();
        let text = render_text(&set, &report);
        assert!(text.contains("SIMULATION REPORT"));
        assert!(text.contains("TASK SET"));
        assert!(text.contains("STATISTICS"));
        assert!(text.contains("EXECUTION LOG"));
        assert!(text.contains("STATUS                     : SUCCESS"));
        assert!(text.contains("T1"));
        assert!(text.contains("Periodic"));
    }

    #[test]
    fn text_report_flags_failure_on_misses() {
        let set = TaskSet::new(vec![
            Task::periodic(0, 3, 4, 4),
            Task::periodic(0, 3, 6, 6),
        ]);
        let output = simulate(&set, Policy::RateMonotonic, 1).unwrap();
        let report = SimulationReport::new(&set, Policy::RateMonotonic, 1, &output);
        assert!(report.overloaded);
        let text = render_text(&set, &report);
        assert!(text.contains("FAILURE"));
        assert!(text.contains("MISS"));
    }
}
