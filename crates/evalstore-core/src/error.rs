//! # Error Types
//!
//! Errors raised when an identifier or a data file path does not follow
//! the storage convention. All errors use `thiserror` and name the
//! offending component so that the CLI can print them verbatim.

use thiserror::Error;

/// A model identifier could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The identifier is not of the form `developer/model`.
    #[error("model identifier {value:?} must have the form developer/model")]
    Shape {
        /// The rejected identifier.
        value: String,
    },

    /// One segment of the identifier is not usable as a directory name.
    #[error("{segment} segment {value:?} of model identifier is invalid: {reason}")]
    Segment {
        /// Which segment failed (`developer` or `model`).
        segment: &'static str,
        /// The rejected segment.
        value: String,
        /// Why the segment was rejected.
        reason: &'static str,
    },
}

/// A data file path does not follow
/// `{leaderboard}/{developer}/{model}/{uuid}.json`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The path lies outside the data directory.
    #[error("{path} is not inside the data directory {data_root}")]
    OutsideDataRoot {
        /// The offending path.
        path: String,
        /// The data directory it was expected under.
        data_root: String,
    },

    /// Wrong number of path components below the data directory.
    #[error("expected {{leaderboard}}/{{developer}}/{{model}}/{{uuid}}.json, found {found} path component(s)")]
    Depth {
        /// Number of components actually present.
        found: usize,
    },

    /// A directory component is not a plain, usable name.
    #[error("{component} {value:?} is invalid: {reason}")]
    Segment {
        /// Which component failed (`leaderboard`, `developer`, `model`).
        component: &'static str,
        /// The rejected component.
        value: String,
        /// Why the component was rejected.
        reason: &'static str,
    },

    /// The file does not carry the `.json` extension.
    #[error("file name {file_name:?} must end in .json")]
    Extension {
        /// The rejected file name.
        file_name: String,
    },

    /// The file stem is not a UUID at all.
    #[error("file stem {stem:?} is not a UUID: {reason}")]
    InvalidUuid {
        /// The rejected stem.
        stem: String,
        /// Parser message.
        reason: String,
    },

    /// The file stem is a UUID but not in lowercase hyphenated form.
    #[error("file stem {stem:?} must be a lowercase hyphenated UUID ({canonical})")]
    NonCanonicalUuid {
        /// The rejected stem.
        stem: String,
        /// The canonical rendering of the same UUID.
        canonical: String,
    },

    /// The file stem is a UUID of the wrong version.
    #[error("file stem {uuid} is a version {version} UUID, expected version 4")]
    NotVersion4 {
        /// The parsed UUID.
        uuid: String,
        /// The version number it carries.
        version: usize,
    },

    /// The model identifier used to build a path is invalid.
    #[error(transparent)]
    Model(#[from] IdentityError),
}
