//! Human and machine rendering of run reports.

use std::fmt::Write as _;

use crate::error::RemoldError;
use crate::runner::{Outcome, RunResult};

/// One-line-per-file summary, followed by totals.
pub fn render_summary(result: &RunResult) -> String {
    let mut out = String::new();
    for task in &result.tasks {
        let tag = match task.outcome {
            Outcome::Unchanged => "unchanged",
            Outcome::Modified => {
                if result.dry_run {
                    "would modify"
                } else {
                    "modified"
                }
            }
            Outcome::Failed => "failed",
        };
        let _ = writeln!(out, "{tag:>12}  {}", task.path);
    }

    let _ = writeln!(
        out,
        "\n{} file(s) modified, {} unchanged",
        result.modified_count(),
        result.unchanged_count()
    );
    if let Some(failure) = &result.failure {
        let _ = writeln!(out, "stopped at {}: {}", failure.path, failure.message);
    }
    out
}

/// Dry-run detail: for each modified file, the original and the would-be
/// output, delimited so they are easy to eyeball.
pub fn render_dry_run(result: &RunResult) -> String {
    let mut out = String::new();
    for task in &result.tasks {
        let (Some(before), Some(after)) = (&task.before, &task.after) else {
            continue;
        };
        let _ = writeln!(out, "--- {} (before)", task.path);
        out.push_str(before);
        if !before.ends_with('\n') {
            out.push('\n');
        }
        let _ = writeln!(out, "+++ {} (after)", task.path);
        out.push_str(after);
        if !after.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(&render_summary(result));
    out
}

/// The full report as pretty-printed JSON.
pub fn to_json(result: &RunResult) -> Result<String, RemoldError> {
    serde_json::to_string_pretty(result)
        .map_err(|e| RemoldError::io("<json output>", std::io::Error::other(e)))
}

// ============================================================================
// Tests
// ============================================================================
