//! # Validate Subcommand
//!
//! Checks evaluation records against the published schema. Run by the
//! pre-commit hook on staged files and by CI with `--all`.
//!
//! Every file is reported, never just the first failure. A schema that
//! cannot be loaded stops the run before any file is read.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Map};

use evalstore_schema::{
    discover_json_files, BatchReport, FileOutcome, SchemaOptions, SchemaValidator,
};

use crate::config::Config;
use crate::{display_path, resolve_path};

/// Arguments for the `evalstore validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Record files or directories to validate. Directories are searched
    /// recursively for `*.json`.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Validate every record under the data directory.
    #[arg(long)]
    pub all: bool,

    /// Schema document to validate against.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Root of the record tree.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Also check each file against the
    /// `{leaderboard}/{developer}/{model}/{uuid}.json` convention.
    #[arg(long)]
    pub check_layout: bool,

    /// Treat `format` keywords as annotations only.
    #[arg(long)]
    pub no_format_check: bool,

    /// Only print failing files and the summary.
    #[arg(short, long)]
    pub quiet: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// How the batch report is printed.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per file plus indented details.
    #[default]
    Text,
    /// The whole report as one JSON document.
    Json,
}

/// Execute the validate subcommand, printing to stdout.
///
/// Returns exit code: 0 when every file passed, 1 on any failure or when
/// there is nothing to validate.
pub fn run_validate(args: &ValidateArgs, config: &Config, repo_root: &Path) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_validate_to(args, config, repo_root, &mut out)
}

/// Execute the validate subcommand, printing to `out`.
pub fn run_validate_to(
    args: &ValidateArgs,
    config: &Config,
    repo_root: &Path,
    out: &mut dyn Write,
) -> Result<u8> {
    if !args.all && args.paths.is_empty() {
        writeln!(
            out,
            "Usage: evalstore validate [--all] [--check-layout] [--schema FILE] [PATH...]"
        )?;
        return Ok(1);
    }

    let schema_path = match &args.schema {
        Some(path) => resolve_path(path, repo_root),
        None => config.schema_path(repo_root),
    };
    let data_dir = match &args.data_dir {
        Some(path) => resolve_path(path, repo_root),
        None => config.data_dir(repo_root),
    };
    let options = SchemaOptions {
        validate_formats: config.validate_formats && !args.no_format_check,
    };

    let validator = SchemaValidator::from_file_with(&schema_path, &options)
        .context("failed to load evaluation schema")?;
    tracing::info!(
        schema = validator.source(),
        id = validator.schema_id().unwrap_or("-"),
        "loaded schema"
    );

    let targets = collect_targets(args, &data_dir)?;
    let layout_root = (args.check_layout || config.check_layout).then_some(data_dir.as_path());
    let report = validator.validate_batch(&targets, layout_root);

    match args.format {
        OutputFormat::Text => print_text(&report, repo_root, args.quiet, out)?,
        OutputFormat::Json => print_json(&report, validator.source(), repo_root, out)?,
    }

    Ok(if report.is_success() { 0 } else { 1 })
}

/// Expand the requested inputs into an absolute file list.
///
/// Command-line paths are relative to the working directory, the way the
/// pre-commit hook passes them.
fn collect_targets(args: &ValidateArgs, data_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut targets = Vec::new();

    if args.all {
        if !data_dir.is_dir() {
            tracing::warn!(data_dir = %data_dir.display(), "data directory not found");
        }
        targets.extend(discover_json_files(data_dir));
    }

    if !args.paths.is_empty() {
        let cwd = std::env::current_dir().context("failed to read the working directory")?;
        for path in &args.paths {
            let path = resolve_path(path, &cwd);
            if path.is_dir() {
                targets.extend(discover_json_files(&path));
            } else {
                targets.push(path);
            }
        }
    }

    tracing::debug!(files = targets.len(), "collected files to validate");
    Ok(targets)
}

fn print_text(report: &BatchReport, repo_root: &Path, quiet: bool, out: &mut dyn Write) -> Result<()> {
    for (path, file) in report.iter() {
        let shown = display_path(path, repo_root).display();
        if file.passed() {
            if !quiet {
                writeln!(out, "OK: {shown}")?;
            }
            continue;
        }

        match &file.outcome {
            FileOutcome::Valid => {}
            FileOutcome::SchemaViolation { violations } => {
                writeln!(out, "FAIL: {shown}")?;
                for violation in violations {
                    writeln!(out, "  {violation}")?;
                }
            }
            FileOutcome::MalformedJson {
                line,
                column,
                reason,
            } => {
                writeln!(out, "MALFORMED: {shown} (line {line}, column {column}): {reason}")?;
            }
            FileOutcome::Unreadable { reason } => {
                writeln!(out, "UNREADABLE: {shown}: {reason}")?;
            }
        }
        for finding in &file.layout {
            writeln!(out, "LAYOUT: {shown}: {finding}")?;
        }
    }

    writeln!(out, "Files: {}/{} passed", report.passed(), report.total())?;
    if report.failed() > 0 {
        writeln!(
            out,
            "\n{} file(s) failed validation out of {} total.",
            report.failed(),
            report.total()
        )?;
    }
    Ok(())
}

/// The JSON report, keyed by repository-relative path.
fn print_json(report: &BatchReport, schema: &str, repo_root: &Path, out: &mut dyn Write) -> Result<()> {
    let mut files = Map::new();
    for (path, file) in report.iter() {
        let key = display_path(path, repo_root).display().to_string();
        let value = serde_json::to_value(file).context("failed to serialize file report")?;
        files.insert(key, value);
    }
    let document = json!({
        "schema": schema,
        "total": report.total(),
        "passed": report.passed(),
        "failed": report.failed(),
        "files": files,
    });
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}
