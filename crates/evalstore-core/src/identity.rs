//! # Model Identifiers
//!
//! A model is identified HuggingFace-style as `developer/model`
//! (e.g. `openai/gpt-4o-2024-11-20`, `meta-llama/Llama-3.1-8B-Instruct`).
//! Both segments become directory names in the data layout, so each must
//! be a plain path segment.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::layout::check_segment;

/// A validated `developer/model` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelId {
    developer: String,
    model: String,
}

impl ModelId {
    /// Build an identifier from its two segments.
    pub fn new(developer: impl Into<String>, model: impl Into<String>) -> Result<Self, IdentityError> {
        let developer = developer.into();
        let model = model.into();
        check_segment(&developer).map_err(|reason| IdentityError::Segment {
            segment: "developer",
            value: developer.clone(),
            reason,
        })?;
        check_segment(&model).map_err(|reason| IdentityError::Segment {
            segment: "model",
            value: model.clone(),
            reason,
        })?;
        Ok(Self { developer, model })
    }

    /// Parse `developer/model`. Exactly one `/` is allowed.
    pub fn parse(s: &str) -> Result<Self, IdentityError> {
        let Some((developer, model)) = s.split_once('/') else {
            return Err(IdentityError::Shape { value: s.to_string() });
        };
        if developer.is_empty() || model.is_empty() || model.contains('/') {
            return Err(IdentityError::Shape { value: s.to_string() });
        }
        Self::new(developer, model)
    }

    /// The developer (organization) segment.
    pub fn developer(&self) -> &str {
        &self.developer
    }

    /// The model-name segment.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.developer, self.model)
    }
}

impl std::str::FromStr for ModelId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModelId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.to_string()
    }
}
