//! # evalstore CLI entry point
//!
//! Parses command-line arguments, loads the repository configuration and
//! dispatches to subcommand handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evalstore_cli::config::{Config, CONFIG_FILE_NAME};
use evalstore_cli::path::{run_path, PathArgs};
use evalstore_cli::validate::{run_validate, ValidateArgs};

/// Tooling for the evaluation data store.
///
/// Validates evaluation records against the published JSON Schema and
/// generates storage paths for new records.
#[derive(Parser, Debug)]
#[command(name = "evalstore", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file. Defaults to evalstore.yaml in the
    /// repository root.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate evaluation records against the schema.
    Validate(ValidateArgs),

    /// Print a fresh storage path for a new record.
    Path(PathArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "evalstore starting");

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let repo_root = resolve_repo_root(&cwd).unwrap_or_else(|| {
        tracing::warn!("Could not locate repository root; using current directory");
        cwd.clone()
    });

    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    match run(cli, &repo_root) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli, repo_root: &Path) -> Result<u8> {
    let config = Config::discover(cli.config.as_deref(), repo_root)?;
    match cli.command {
        Commands::Validate(args) => run_validate(&args, &config, repo_root),
        Commands::Path(args) => run_path(&args, &config, repo_root),
    }
}

/// Walk up from `start` to find the repository root.
///
/// The repo root is the first directory holding either a `schema/`
/// directory or an `evalstore.yaml` file.
fn resolve_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("schema").is_dir() || dir.join(CONFIG_FILE_NAME).is_file() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalstore_cli::validate::OutputFormat;

    #[test]
    fn cli_parse_validate_paths() {
        let cli = Cli::try_parse_from(["evalstore", "validate", "a.json", "data/b.json"]).unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.paths, [PathBuf::from("a.json"), PathBuf::from("data/b.json")]);
        assert!(!args.all);
        assert!(!args.check_layout);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn cli_parse_validate_all_options() {
        let cli = Cli::try_parse_from([
            "evalstore",
            "validate",
            "--all",
            "--check-layout",
            "--no-format-check",
            "--schema",
            "alt.schema.json",
            "--data-dir",
            "records",
            "--format",
            "json",
            "-q",
        ])
        .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert!(args.all);
        assert!(args.check_layout);
        assert!(args.no_format_check);
        assert!(args.quiet);
        assert_eq!(args.schema, Some(PathBuf::from("alt.schema.json")));
        assert_eq!(args.data_dir, Some(PathBuf::from("records")));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["evalstore", "validate", "--all", "-vv", "--config", "c.yaml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("c.yaml")));
    }

    #[test]
    fn cli_parse_path() {
        let cli = Cli::try_parse_from([
            "evalstore",
            "path",
            "--leaderboard",
            "helm_lite",
            "--model",
            "openai/gpt-4o",
        ])
        .unwrap();
        let Commands::Path(args) = cli.command else {
            panic!("expected path");
        };
        assert_eq!(args.leaderboard, "helm_lite");
        assert_eq!(args.model, "openai/gpt-4o");
        assert!(!args.create_dirs);
    }

    #[test]
    fn cli_parse_path_requires_model() {
        assert!(Cli::try_parse_from(["evalstore", "path", "--leaderboard", "x"]).is_err());
    }

    #[test]
    fn cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["evalstore", "validate", "--format", "xml"]).is_err());
    }

    #[test]
    fn repo_root_found_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("schema")).unwrap();
        let nested = dir.path().join("data/lb/dev");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(resolve_repo_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn repo_root_found_by_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(resolve_repo_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn unknown_config_key_is_operational_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("bad.yaml");
        std::fs::write(&config, "colour: blue\n").unwrap();
        let cli = Cli::try_parse_from([
            "evalstore",
            "--config",
            config.to_str().unwrap(),
            "validate",
            "--all",
        ])
        .unwrap();
        assert!(run(cli, dir.path()).is_err());
    }
}
