//! # Schema Validation
//!
//! Validates evaluation records against the published JSON Schema. The
//! schema is loaded and compiled once; every document is then checked with
//! [`SchemaValidator::validate_value`], which collects **all** violations
//! rather than stopping at the first one, so a contributor sees every
//! problem in a single run.
//!
//! ## Drafts
//!
//! A schema without a `$schema` keyword is compiled as draft-07. A schema
//! that declares `$schema` is compiled with the draft it names.
//!
//! ## `$ref` resolution
//!
//! References to other documents resolve only to sibling files of the
//! schema on disk: the last segment of the reference URI is looked up in
//! the schema's directory. The validator never performs network requests;
//! an unresolvable reference fails schema compilation.

use std::path::{Path, PathBuf};

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Retrieve, Uri, ValidationError, Validator};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::report::FileOutcome;

/// Longest rendering of an offending value kept in a [`Violation`].
const FOUND_MAX_CHARS: usize = 80;

/// The schema document itself could not be used. Fatal for a run.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The schema file could not be read.
    #[error("cannot read schema {path}: {source}")]
    Io {
        /// Path of the schema file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The schema file is not valid JSON.
    #[error("schema {path} is not valid JSON: {source}")]
    InvalidJson {
        /// Path of the schema file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The schema is valid JSON but not a usable JSON Schema.
    #[error("schema {path} does not compile: {reason}")]
    Compile {
        /// Path of the schema file, or `<inline>`.
        path: String,
        /// Compiler message.
        reason: String,
    },
}

/// Compilation settings for a [`SchemaValidator`].
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Enforce the `format` keyword (`uri`, `date-time`, ...). When false,
    /// `format` is treated as an annotation only.
    pub validate_formats: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            validate_formats: true,
        }
    }
}

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer to the failing location in the document. Empty for the root.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// The constraint that failed (`required`, `type`, `enum`, ...).
    pub keyword: String,
    /// The property the violation is about, when the failing location is
    /// its parent object (`required`, `additionalProperties`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Short rendering of the value or type actually found.
    pub found: String,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    fn from_error(error: &ValidationError<'_>) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = if matches!(error.kind, ValidationErrorKind::Required { .. })
            && is_dependencies_path(&schema_path)
        {
            "dependencies".to_string()
        } else {
            schema_path
                .rsplit('/')
                .find(|s| !s.is_empty() && !s.bytes().all(|b| b.is_ascii_digit()))
                .unwrap_or("schema")
                .to_string()
        };

        let field = match &error.kind {
            ValidationErrorKind::Required { property } => match property {
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            },
            ValidationErrorKind::AdditionalProperties { unexpected } => Some(unexpected.join(", ")),
            _ => None,
        };

        Self {
            instance_path: error.instance_path.to_string(),
            schema_path,
            keyword,
            field,
            found: describe_value(&error.instance),
            message: error.to_string(),
        }
    }

    /// JSON Pointer of the offending field: the instance path, extended by
    /// the missing property for `required` and `dependencies` violations.
    pub fn location(&self) -> String {
        match (&self.field, self.keyword.as_str()) {
            (Some(field), "required" | "dependencies") => {
                format!("{}/{}", self.instance_path, escape_pointer(field))
            }
            _ => self.instance_path.clone(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let location = self.location();
        let location = if location.is_empty() { "(root)" } else { location.as_str() };
        write!(
            f,
            "{location}: {} [{}; found {}]",
            self.message, self.keyword, self.found
        )
    }
}

/// A draft-07 property dependency reports a missing property from
/// `.../dependencies`, `.../dependencies/{trigger}` or either followed by
/// `/required`, depending on how the keyword was compiled.
fn is_dependencies_path(schema_path: &str) -> bool {
    let mut segments: Vec<&str> = schema_path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.last() == Some(&"required") {
        segments.pop();
    }
    let is_keyword = |i: usize| {
        segments[i] == "dependencies"
            && (i == 0 || !matches!(segments[i - 1], "properties" | "definitions"))
    };
    let n = segments.len();
    (n >= 1 && is_keyword(n - 1)) || (n >= 2 && is_keyword(n - 2))
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Render a JSON value for an error line: containers by type and size,
/// scalars as JSON, truncated.
fn describe_value(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("object with {} field(s)", map.len()),
        Value::Array(items) => format!("array of {} item(s)", items.len()),
        scalar => {
            let rendered = scalar.to_string();
            if rendered.chars().count() > FOUND_MAX_CHARS {
                let truncated: String = rendered.chars().take(FOUND_MAX_CHARS).collect();
                format!("{truncated}...")
            } else {
                rendered
            }
        }
    }
}

/// Resolves `$ref` documents to sibling files of the schema.
///
/// Keeps the `jsonschema` crate from fetching anything over the network.
struct SiblingRetriever {
    base_dir: Option<PathBuf>,
}

impl Retrieve for SiblingRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let Some(base_dir) = &self.base_dir else {
            return Err(format!("cannot resolve {uri_str}: schema has no directory").into());
        };

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        let path = base_dir.join(filename);
        if filename.is_empty() || !path.is_file() {
            return Err(format!(
                "cannot resolve {uri_str}: no sibling schema {filename:?} in {}",
                base_dir.display()
            )
            .into());
        }

        tracing::debug!(uri = uri_str, path = %path.display(), "resolved schema reference");
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A compiled evaluation-record schema.
///
/// Immutable after construction and `Send + Sync`, so a single instance can
/// check any number of documents.
pub struct SchemaValidator {
    /// Where the schema came from, for messages.
    source: String,
    /// The schema's `$id`, if it declares one.
    schema_id: Option<String>,
    validator: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("source", &self.source)
            .field("schema_id", &self.schema_id)
            .finish()
    }
}

impl SchemaValidator {
    /// Load and compile the schema at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaLoadError`] if the file cannot be read, is not JSON,
    /// or does not compile (including unresolvable `$ref`s).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        Self::from_file_with(path, &SchemaOptions::default())
    }

    /// Load and compile the schema at `path`.
    pub fn from_file_with(
        path: impl AsRef<Path>,
        options: &SchemaOptions,
    ) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|e| SchemaLoadError::Io {
            path: source.clone(),
            source: e,
        })?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| {
            SchemaLoadError::InvalidJson {
                path: source.clone(),
                source: e,
            }
        })?;

        let base_dir = path.parent().map(Path::to_path_buf);
        Self::compile(source, &schema, base_dir, options)
    }

    /// Compile an in-memory schema with default options. Sibling `$ref`s
    /// resolve against `base_dir` when given.
    pub fn from_value(schema: &Value, base_dir: Option<&Path>) -> Result<Self, SchemaLoadError> {
        Self::from_value_with(schema, base_dir, &SchemaOptions::default())
    }

    /// Compile an in-memory schema.
    pub fn from_value_with(
        schema: &Value,
        base_dir: Option<&Path>,
        options: &SchemaOptions,
    ) -> Result<Self, SchemaLoadError> {
        Self::compile(
            "<inline>".to_string(),
            schema,
            base_dir.map(Path::to_path_buf),
            options,
        )
    }

    fn compile(
        source: String,
        schema: &Value,
        base_dir: Option<PathBuf>,
        options: &SchemaOptions,
    ) -> Result<Self, SchemaLoadError> {
        let mut opts = jsonschema::options();
        if schema.get("$schema").is_none() {
            opts.with_draft(Draft::Draft7);
        }
        opts.should_validate_formats(options.validate_formats);
        opts.with_retriever(SiblingRetriever { base_dir });

        let validator = opts.build(schema).map_err(|e| SchemaLoadError::Compile {
            path: source.clone(),
            reason: e.to_string(),
        })?;

        let schema_id = schema
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string);

        tracing::debug!(
            source = %source,
            schema_id = schema_id.as_deref().unwrap_or("-"),
            validate_formats = options.validate_formats,
            "compiled schema"
        );

        Ok(Self {
            source,
            schema_id,
            validator,
        })
    }

    /// Where the schema was loaded from (a path, or `<inline>`).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The schema's `$id`, if declared.
    pub fn schema_id(&self) -> Option<&str> {
        self.schema_id.as_deref()
    }

    /// Every violation of the schema by `instance`, in engine order.
    /// An empty vector means the document conforms.
    pub fn validate_value(&self, instance: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(instance)
            .map(|e| Violation::from_error(&e))
            .collect()
    }

    /// Parse `content` as JSON and validate it.
    ///
    /// Content that does not parse yields [`FileOutcome::MalformedJson`],
    /// never a schema violation.
    pub fn validate_str(&self, content: &str) -> FileOutcome {
        self.check_content(content.as_bytes()).0
    }

    /// Read, parse, and validate the file at `path`.
    pub fn validate_file(&self, path: &Path) -> FileOutcome {
        self.check_file(path).0
    }

    /// Like [`validate_file`](Self::validate_file), also returning the
    /// parsed document when parsing succeeded.
    pub(crate) fn check_file(&self, path: &Path) -> (FileOutcome, Option<Value>) {
        match std::fs::read(path) {
            Ok(content) => self.check_content(&content),
            Err(e) => (
                FileOutcome::Unreadable {
                    reason: e.to_string(),
                },
                None,
            ),
        }
    }

    /// Bytes that are not UTF-8 are malformed JSON, not an I/O failure.
    fn check_content(&self, content: &[u8]) -> (FileOutcome, Option<Value>) {
        let value: Value = match serde_json::from_slice(content) {
            Ok(v) => v,
            Err(e) => {
                return (
                    FileOutcome::MalformedJson {
                        line: e.line(),
                        column: e.column(),
                        reason: e.to_string(),
                    },
                    None,
                );
            }
        };

        let violations = self.validate_value(&value);
        let outcome = if violations.is_empty() {
            FileOutcome::Valid
        } else {
            FileOutcome::SchemaViolation { violations }
        };
        (outcome, Some(value))
    }
}
