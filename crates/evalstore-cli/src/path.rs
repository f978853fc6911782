//! # Path Subcommand
//!
//! Prints where a new record belongs:
//! `data/{leaderboard}/{developer}/{model}/{uuid}.json`, with a fresh
//! version-4 UUID so concurrent submissions never collide.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use evalstore_core::{EvalFilePath, LayoutError, ModelId};

use crate::config::Config;
use crate::{display_path, resolve_path};

/// Arguments for the `evalstore path` subcommand.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Leaderboard or evaluation name, e.g. `helm_lite`.
    #[arg(long)]
    pub leaderboard: String,

    /// Model identifier as `developer/model`.
    #[arg(long, value_name = "DEV/MODEL")]
    pub model: String,

    /// Root of the record tree.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Create the parent directories of the printed path.
    #[arg(long)]
    pub create_dirs: bool,
}

/// Execute the path subcommand, printing to stdout.
///
/// Returns exit code: 0 with the path printed, 1 when the leaderboard or
/// model identifier cannot be used as a directory name.
pub fn run_path(args: &PathArgs, config: &Config, repo_root: &Path) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_path_to(args, config, repo_root, &mut out)
}

/// Execute the path subcommand, printing to `out`.
pub fn run_path_to(args: &PathArgs, config: &Config, repo_root: &Path, out: &mut dyn Write) -> Result<u8> {
    let data_dir = match &args.data_dir {
        Some(path) => resolve_path(path, repo_root),
        None => config.data_dir(repo_root),
    };

    let location = match ModelId::parse(&args.model)
        .map_err(LayoutError::from)
        .and_then(|model| EvalFilePath::generate(args.leaderboard.as_str(), model))
    {
        Ok(location) => location,
        Err(e) => {
            writeln!(out, "ERROR: {e}")?;
            return Ok(1);
        }
    };

    let path = location.to_path(&data_dir);
    tracing::debug!(path = %path.display(), uuid = %location.uuid(), "generated record path");

    if args.create_dirs {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }

    writeln!(out, "{}", display_path(&path, repo_root).display())?;
    Ok(0)
}
