//! # evalstore-cli: the `evalstore` command
//!
//! Contributor and CI tooling for the evaluation data store.
//!
//! ## Subcommands
//!
//! - `evalstore validate` checks records against the published schema and,
//!   optionally, against the `data/{leaderboard}/{developer}/{model}/{uuid}.json`
//!   directory convention.
//! - `evalstore path` prints a fresh storage path for a new record.
//!
//! ```bash
//! evalstore validate data/helm_lite/openai/gpt-4o-2024-05-13/*.json
//! evalstore validate --all --check-layout
//! evalstore path --leaderboard helm_lite --model openai/gpt-4o-2024-05-13
//! ```
//!
//! Handlers return `Result<u8>`: the `u8` is the process exit code (0 all
//! good, 1 something failed), and `Err` is an operational error (exit 2).

pub mod config;
pub mod path;
pub mod validate;

use std::path::{Path, PathBuf};

use evalstore_core::normalize_path;

/// Resolve a path that may be relative to `base`.
///
/// Absolute paths are kept, relative paths are joined onto `base`; either
/// way `.` and `..` components are folded lexically.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// `path` relative to `root` when it lies under it, for display.
pub fn display_path<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
