//! Task-set text format.
//!
//! One task per line; `#` comments and blank lines are ignored:
//!
//! ```text
//! # code  arguments                      defaults
//! P [r] e p [d]     periodic             r = 0, d = p
//! D [r] e p d       periodic, deadline-first argument order
//! S e p             server: capacity e, replenishment period p
//! A r e             aperiodic: arrival r, execution e
//! ```
//!
//! Parsing is deliberately lenient — this is a classroom-style format and a
//! stray annotation must not kill the run:
//!
//! * a token starting with a literal `(` truncates integer parsing for the
//!   rest of the line (inline annotations like `P 0 4 10 (WCET)`),
//! * non-integer tokens are skipped individually,
//! * a line yielding zero valid integers is dropped (non-fatal),
//! * unknown code letters are dropped with a warning,
//! * code letters are case-insensitive.

pub mod gen;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::task::{Task, TaskKind, TaskSet};

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse task-set text into a [`TaskSet`].
///
/// Never fails: malformed lines are dropped (see the module docs for the
/// exact rules) and short argument lists fall back to zero defaults per
/// [`Task::from_args`].
pub fn parse_str(content: &str) -> TaskSet {
    let mut tasks = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(code) = parts.next() else { continue };

        let mut args = Vec::new();
        for token in parts {
            if token.starts_with('(') {
                break;
            }
            if let Ok(value) = token.parse::<u64>() {
                args.push(value);
            }
        }
        if args.is_empty() {
            debug!(line = index + 1, "skipping line with no integer arguments");
            continue;
        }

        let kind = match code.to_ascii_uppercase().as_str() {
            "P" => TaskKind::Periodic,
            "D" => TaskKind::PeriodicDeadline,
            "S" => TaskKind::Server,
            "A" => TaskKind::Aperiodic,
            other => {
                warn!(line = index + 1, code = other, "skipping unknown task code");
                continue;
            }
        };

        tasks.push(Task::from_args(kind, &args));
    }

    TaskSet::new(tasks)
}

/// Read and parse a task-set file.
///
/// # Errors
/// Only I/O can fail; the parse itself is lenient.
pub fn load_from_file(path: &Path) -> Result<TaskSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot open task-set file: {}", path.display()))?;

    let set = parse_str(&content);
    info!(
        path = %path.display(),
        tasks = set.len(),
        utilization = set.utilization(),
        "loaded task set"
    );
    Ok(set)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskId, TaskKind, APERIODIC_DEADLINE};
    use std::io::Write;
    use tempfile::NamedTempFile;

    // ── Grammar forms ─────────────────────────────────────────────────────────

    #[test]
    fn parses_every_line_form() {
        let set = parse_str(
            "# full zoo\n\
             P 4 10\n\
             P 2 4 10\n\
             P 2 4 10 8\n\
             D 4 10 8\n\
             D 2 4 10 8\n\
             S 2 10\n\
             A 3 5\n",
        );
        assert_eq!(set.len(), 7);

        let t = set.tasks();
        assert_eq!((t[0].arrival, t[0].burst, t[0].period, t[0].deadline), (0, 4, 10, 10));
        assert_eq!((t[1].arrival, t[1].burst, t[1].period, t[1].deadline), (2, 4, 10, 10));
        assert_eq!((t[2].arrival, t[2].burst, t[2].period, t[2].deadline), (2, 4, 10, 8));
        assert_eq!((t[3].arrival, t[3].burst, t[3].period, t[3].deadline), (0, 4, 10, 8));
        assert_eq!((t[4].arrival, t[4].burst, t[4].period, t[4].deadline), (2, 4, 10, 8));
        assert_eq!(t[5].kind, TaskKind::Server);
        assert_eq!((t[5].capacity, t[5].period), (2, 10));
        assert_eq!(t[6].kind, TaskKind::Aperiodic);
        assert_eq!((t[6].arrival, t[6].burst, t[6].deadline), (3, 5, APERIODIC_DEADLINE));
    }

    #[test]
    fn ids_follow_input_order() {
        let set = parse_str("P 4 10\nS 2 10\nA 3 5\n");
        assert_eq!(set.tasks()[0].id, TaskId(1));
        assert_eq!(set.tasks()[2].id, TaskId(3));
    }

    // ── Leniency rules ────────────────────────────────────────────────────────

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let set = parse_str("# header\n\n   \nP 4 10\n  # trailing comment line\n");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn parenthesis_truncates_the_rest_of_the_line() {
        let set = parse_str("P 0 4 10 (deadline 99 would apply here)\n");
        assert_eq!(set.len(), 1);
        // Only (0, 4, 10) parsed → three-arg form, deadline defaults to the
        // period.
        assert_eq!(set.tasks()[0].deadline, 10);
    }

    #[test]
    fn non_integer_tokens_are_skipped_individually() {
        let set = parse_str("P exec= 4 period= 10\n");
        assert_eq!(set.len(), 1);
        assert_eq!((set.tasks()[0].burst, set.tasks()[0].period), (4, 10));
    }

    #[test]
    fn line_with_no_integers_is_dropped() {
        let set = parse_str("P\nP abc def\nS 2 10\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.tasks()[0].kind, TaskKind::Server);
    }

    #[test]
    fn unknown_code_letters_are_dropped() {
        let set = parse_str("X 1 2 3\nQ 4 5\nP 4 10\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.tasks()[0].kind, TaskKind::Periodic);
    }

    #[test]
    fn code_letters_are_case_insensitive() {
        let set = parse_str("p 4 10\ns 2 10\na 3 5\nd 4 10 8\n");
        assert_eq!(set.len(), 4);
        assert_eq!(set.tasks()[1].kind, TaskKind::Server);
        assert_eq!(set.tasks()[3].kind, TaskKind::PeriodicDeadline);
    }

    #[test]
    fn short_argument_lists_keep_zero_defaults() {
        // One integer is enough to keep the line, but too few for any
        // periodic form — the task exists and never releases.
        let set = parse_str("P 5\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.tasks()[0].period, 0);
    }

    // ── File loading ──────────────────────────────────────────────────────────

    #[test]
    fn load_from_file_reads_and_parses() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"# demo\nP 0 4 10 10\nS 2 10\nA 3 5\n").unwrap();

        let set = load_from_file(f.path()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.server_index(), Some(1));
    }

    #[test]
    fn load_from_missing_file_returns_error() {
        let result = load_from_file(Path::new("/nonexistent/tasks.txt"));
        assert!(result.is_err());
    }
}
