//! # evalstore-schema: Evaluation Record Validation
//!
//! Checks evaluation result files against the published JSON Schema before
//! they are merged.
//!
//! ## Runtime Validation (`validate`)
//!
//! [`SchemaValidator`] loads and compiles one schema document. A schema that
//! cannot be loaded is a [`SchemaLoadError`], fatal for the run. Documents
//! are validated with a collect-all policy: every violation is reported,
//! each carrying the instance path, the failing keyword, and the value
//! found.
//!
//! ## Batches (`batch`)
//!
//! [`SchemaValidator::validate_paths`] checks many files independently and
//! returns a [`BatchReport`] ordered by path. Unreadable or malformed files
//! are recorded as such and never abort the batch. With a data root,
//! [`SchemaValidator::validate_batch`] also lints each file's location
//! against the storage convention.
//!
//! ## Crate Policy
//!
//! - Depends only on `evalstore-core` internally.
//! - Validation is a pure function of (schema, file content): no state is
//!   kept between calls.
//! - No network access: `$ref`s resolve to sibling schema files only.

pub mod batch;
pub mod report;
pub mod validate;

pub use batch::discover_json_files;
pub use report::{BatchReport, FileOutcome, FileReport, LayoutFinding};
pub use validate::{SchemaLoadError, SchemaOptions, SchemaValidator, Violation};
