//! # Batch Validation
//!
//! Validates many files against one compiled schema. Files are independent:
//! a failure in one (unreadable, malformed, or nonconforming) is recorded
//! and the batch moves on. Results are keyed by path, so output order is
//! stable regardless of input order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use evalstore_core::{check_consistency, EvalFilePath};

use crate::report::{BatchReport, FileReport, LayoutFinding};
use crate::validate::SchemaValidator;

impl SchemaValidator {
    /// Validate every path in `paths`. Duplicates are checked once.
    pub fn validate_paths<P: AsRef<Path>>(&self, paths: &[P]) -> BatchReport {
        self.validate_batch(paths, None)
    }

    /// Validate every path in `paths`, additionally linting each against
    /// the `{leaderboard}/{developer}/{model}/{uuid}.json` convention under
    /// `layout_root` when given.
    ///
    /// Paths are compared to `layout_root` as given; callers mixing
    /// relative and absolute paths should normalize first.
    pub fn validate_batch<P: AsRef<Path>>(
        &self,
        paths: &[P],
        layout_root: Option<&Path>,
    ) -> BatchReport {
        let mut files: BTreeMap<PathBuf, FileReport> = BTreeMap::new();

        for path in paths {
            let path = path.as_ref();
            if files.contains_key(path) {
                tracing::debug!(path = %path.display(), "skipping duplicate path");
                continue;
            }

            let (outcome, document) = self.check_file(path);
            let mut report = FileReport::new(outcome);

            if let Some(root) = layout_root {
                report.layout = lint_layout(path, root, document.as_ref());
            }

            if report.passed() {
                tracing::debug!(path = %path.display(), "file passed");
            } else {
                tracing::info!(
                    path = %path.display(),
                    violations = report.outcome.violations().len(),
                    layout_findings = report.layout.len(),
                    "file failed"
                );
            }

            files.insert(path.to_path_buf(), report);
        }

        let report = BatchReport::from_files(files);
        tracing::info!(
            total = report.total(),
            passed = report.passed(),
            failed = report.failed(),
            "batch validated"
        );
        report
    }
}

fn lint_layout(path: &Path, root: &Path, document: Option<&serde_json::Value>) -> Vec<LayoutFinding> {
    match EvalFilePath::from_data_path(path, root) {
        Err(e) => vec![LayoutFinding::Path {
            message: e.to_string(),
        }],
        Ok(location) => document
            .map(|doc| {
                check_consistency(&location, doc)
                    .into_iter()
                    .map(LayoutFinding::Mismatch)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Recursively collect `*.json` files under `dir`, sorted.
///
/// Hidden files and directories (names starting with `.`) are skipped,
/// as are symlinks to directories. Unreadable directories are logged and
/// skipped. A `dir` that does not
/// exist yields an empty list.
pub fn discover_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    walk_for_json(dir, &mut results);
    results.sort();
    results
}

fn walk_for_json(dir: &Path, acc: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "failed to read directory during file walk"
            );
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read file type");
                continue;
            }
        };
        // Symlinked directories are not followed.
        if file_type.is_dir() {
            walk_for_json(&path, acc);
        } else if !(file_type.is_symlink() && path.is_dir())
            && path.extension().is_some_and(|ext| ext == "json")
        {
            acc.push(path);
        }
    }
}
