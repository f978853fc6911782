//! # Validation Reports
//!
//! Per-file outcomes and the batch report that maps each path to its
//! outcome. Reports serialize to JSON for `--format json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use evalstore_core::LayoutIssue;
use serde::Serialize;

use crate::validate::Violation;

/// The result of checking one file against the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The document conforms to the schema.
    Valid,
    /// The document parsed but violates the schema. Never empty.
    SchemaViolation {
        /// Every violation found, in engine order.
        violations: Vec<Violation>,
    },
    /// The content is not parseable JSON.
    MalformedJson {
        /// 1-based line of the parse error.
        line: usize,
        /// 1-based column of the parse error.
        column: usize,
        /// Parser message.
        reason: String,
    },
    /// The file could not be read.
    Unreadable {
        /// I/O error message.
        reason: String,
    },
}

impl FileOutcome {
    /// True only for [`FileOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The schema violations, empty unless this is a `SchemaViolation`.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaViolation { violations } => violations,
            _ => &[],
        }
    }
}

/// A disagreement between a file's location and the storage convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutFinding {
    /// The path itself does not follow the convention.
    Path {
        /// Why the path was rejected.
        message: String,
    },
    /// A document field disagrees with the directory it is stored in.
    Mismatch(LayoutIssue),
}

impl std::fmt::Display for LayoutFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path { message } => f.write_str(message),
            Self::Mismatch(issue) => write!(f, "{issue}"),
        }
    }
}

/// Everything reported about one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Schema outcome.
    #[serde(flatten)]
    pub outcome: FileOutcome,
    /// Layout findings; always empty when the layout lint is off.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layout: Vec<LayoutFinding>,
}

impl FileReport {
    /// A report with no layout findings.
    pub fn new(outcome: FileOutcome) -> Self {
        Self {
            outcome,
            layout: Vec::new(),
        }
    }

    /// The file is schema-valid and has no layout findings.
    pub fn passed(&self) -> bool {
        self.outcome.is_valid() && self.layout.is_empty()
    }
}

/// Results for a batch of files, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    total: usize,
    passed: usize,
    failed: usize,
    files: BTreeMap<PathBuf, FileReport>,
}

impl BatchReport {
    pub(crate) fn from_files(files: BTreeMap<PathBuf, FileReport>) -> Self {
        let total = files.len();
        let passed = files.values().filter(|r| r.passed()).count();
        Self {
            total,
            passed,
            failed: total - passed,
            files,
        }
    }

    /// Number of distinct files checked.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of files that passed.
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Number of files that failed for any reason.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// True when every file passed. An empty batch is a success.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// The report for `path`, if it was part of the batch.
    pub fn get(&self, path: &Path) -> Option<&FileReport> {
        self.files.get(path)
    }

    /// All reports in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &FileReport)> {
        self.files.iter().map(|(p, r)| (p.as_path(), r))
    }

    /// Only the failing reports, in path order.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &FileReport)> {
        self.iter().filter(|(_, r)| !r.passed())
    }
}
