//! # evalstore-core: Foundational Types for the Evaluation Data Store
//!
//! Evaluation results are stored as one JSON document per run, at
//! `data/{leaderboard}/{developer}/{model}/{uuid}.json`. This crate holds
//! the types that describe that convention. It has no knowledge of the
//! JSON Schema itself; shape validation lives in `evalstore-schema`.
//!
//! ## Key Types
//!
//! - [`ModelId`]: a `developer/model` identifier with validated segments.
//! - [`EvalFilePath`]: a parsed (or freshly generated) data file path whose
//!   file stem is a version-4 UUID.
//! - [`check_consistency`]: compares identifying fields inside a document
//!   against the directory names it is stored under.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `evalstore-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod layout;

// Re-export primary types for ergonomic imports.
pub use error::{IdentityError, LayoutError};
pub use identity::ModelId;
pub use layout::{
    check_consistency, normalize_path, EvalFilePath, LayoutIssue, DATA_FILE_EXTENSION,
};
