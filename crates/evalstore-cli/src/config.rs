//! # Repository Configuration
//!
//! Optional `evalstore.yaml` at the repository root (or the file named by
//! `--config`). Every key is optional; command-line flags take precedence.
//!
//! ```yaml
//! schema: schema/eval.schema.json
//! data_dir: data
//! check_layout: true
//! validate_formats: true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::resolve_path;

/// File name looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "evalstore.yaml";

/// Settings read from `evalstore.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Schema document, relative to the repository root unless absolute.
    pub schema: PathBuf,
    /// Root of the record tree, relative to the repository root unless absolute.
    pub data_dir: PathBuf,
    /// Lint every validated file against the directory convention.
    pub check_layout: bool,
    /// Enforce `format` keywords in the schema.
    pub validate_formats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("schema/eval.schema.json"),
            data_dir: PathBuf::from("data"),
            check_layout: false,
            validate_formats: true,
        }
    }
}

impl Config {
    /// Parse a config file. An empty file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Locate and load the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `evalstore.yaml` in the
    /// repository root is used when present, and the defaults when not.
    pub fn discover(explicit: Option<&Path>, repo_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            return Self::load(path);
        }

        let candidate = repo_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading repository config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// The schema path, resolved against `repo_root`.
    pub fn schema_path(&self, repo_root: &Path) -> PathBuf {
        resolve_path(&self.schema, repo_root)
    }

    /// The data directory, resolved against `repo_root`.
    pub fn data_dir(&self, repo_root: &Path) -> PathBuf {
        resolve_path(&self.data_dir, repo_root)
    }
}
