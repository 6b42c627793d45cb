//! The batch runner: resolve files, transform each one, stop on failure.
//!
//! Files are processed in lexicographic path order, one at a time. The
//! first failure aborts the batch immediately; files already written stay
//! written, files after the failing one are never touched, and the failing
//! file itself is never written. There is no partial-write state per file:
//! the output is written only after the transform and the printer have both
//! succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use remold_cst::{parse, print, ParserOptions};

use crate::error::RemoldError;
use crate::executor;
use crate::registry::TransformRegistry;

/// Files considered when no pattern is given on the command line.
pub const DEFAULT_PATTERN: &str = "**/*.{js,jsx,mjs,cjs,ts,tsx}";

// ============================================================================
// Run Options and Results
// ============================================================================

/// Knobs for a batch run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Report what would change without writing any file.
    pub dry_run: bool,
    /// Syntax extensions accepted by the parser.
    pub parser: ParserOptions,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The transform ran but changed nothing; the file was not rewritten.
    Unchanged,
    /// The file was rewritten (or would be, under dry-run).
    Modified,
    /// Processing this file aborted the batch.
    Failed,
}

/// Per-file record in a run report.
#[derive(Debug, Clone, Serialize)]
pub struct FileTask {
    /// Path relative to the run root, with forward slashes.
    pub path: String,
    pub outcome: Outcome,
    /// Original content, kept only for modified files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Printed content, kept only for modified files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// The failure that aborted a run.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub message: String,
    pub code: u8,
}

/// Full report of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub transform: String,
    pub pattern: String,
    pub dry_run: bool,
    pub tasks: Vec<FileTask>,
    /// Set when the run stopped early; tasks after the failing file were
    /// never attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FileFailure>,
}

impl RunResult {
    /// Whether every resolved file was processed without error.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of files rewritten (or that would be, under dry-run).
    pub fn modified_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.outcome == Outcome::Modified)
            .count()
    }

    /// Number of files the transform left untouched.
    pub fn unchanged_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.outcome == Outcome::Unchanged)
            .count()
    }
}

// ============================================================================
// File Resolution
// ============================================================================

/// Expand `pattern` against the tree rooted at `root`.
///
/// Matching is against root-relative paths with forward slashes, so patterns
/// behave the same on every platform. The result is sorted lexicographically;
/// this ordering is part of the runner's contract, since it decides which
/// file a fail-fast run stops at.
pub fn resolve(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, RemoldError> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| RemoldError::pattern(pattern, e.to_string()))?
        .compile_matcher();

    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel_str = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if glob.is_match(&rel_str) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Batch Execution
// ============================================================================

/// Run `transform_name` over every file under `root` matching `pattern`.
///
/// Returns `Err` only for setup problems (unknown transform, bad pattern);
/// per-file failures are recorded in the result and stop the batch.
pub fn run(
    registry: &TransformRegistry,
    transform_name: &str,
    root: &Path,
    pattern: &str,
    options: &RunOptions,
) -> Result<RunResult, RemoldError> {
    // Validate the name before touching any file.
    let transform = registry.lookup(transform_name)?;
    let files = resolve(root, pattern)?;

    info!(
        transform = transform_name,
        pattern,
        files = files.len(),
        dry_run = options.dry_run,
        "starting batch run"
    );

    let mut result = RunResult {
        transform: transform_name.to_string(),
        pattern: pattern.to_string(),
        dry_run: options.dry_run,
        tasks: Vec::new(),
        failure: None,
    };

    for path in &files {
        let rel = relative_display(root, path);
        match process_file(path, &rel, transform_name, transform, options) {
            Ok(task) => {
                debug!(file = %rel, outcome = ?task.outcome, "file processed");
                result.tasks.push(task);
            }
            Err(err) => {
                warn!(file = %rel, error = %err, "batch aborted");
                result.tasks.push(FileTask {
                    path: rel.clone(),
                    outcome: Outcome::Failed,
                    before: None,
                    after: None,
                });
                result.failure = Some(FileFailure {
                    path: rel,
                    message: err.to_string(),
                    code: err.error_code().code(),
                });
                break;
            }
        }
    }

    Ok(result)
}

/// Process one file end to end.
///
/// The write happens last, after the transform and the printer have both
/// succeeded, so a failing file is never half-written.
fn process_file(
    path: &Path,
    rel: &str,
    transform_name: &str,
    transform: &crate::registry::Transform,
    options: &RunOptions,
) -> Result<FileTask, RemoldError> {
    let source = fs::read_to_string(path).map_err(|e| RemoldError::io(rel, e))?;

    let mut tree = parse(&source, rel, &options.parser)?;
    executor::apply(&mut tree, transform_name, transform, path, &source)?;

    let output = print(&tree);
    if output == source {
        return Ok(FileTask {
            path: rel.to_string(),
            outcome: Outcome::Unchanged,
            before: None,
            after: None,
        });
    }

    if !options.dry_run {
        fs::write(path, &output).map_err(|e| RemoldError::io(rel, e))?;
    }

    Ok(FileTask {
        path: rel.to_string(),
        outcome: Outcome::Modified,
        before: Some(source),
        after: Some(output),
    })
}

// ============================================================================
// Tests
// ============================================================================
