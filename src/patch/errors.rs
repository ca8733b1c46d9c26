//! PATCH failure taxonomy (RFC 7644 §3.5.2).

use crate::error::ScimErrorType;
use crate::filter::ParseError;

/// Why a PATCH request was rejected. Any of these aborts the whole request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// The path is malformed or names no attribute of the resource type
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The value filter inside the path does not parse
    #[error("Invalid filter in path '{path}': {source}")]
    InvalidFilter { path: String, source: ParseError },

    /// The operation has nothing to act on
    #[error("No target: {message}")]
    NoTarget { message: String },

    #[error("Attribute '{attribute}' is not modifiable")]
    AttributeNotModifiable { attribute: String },

    #[error("Invalid value for '{attribute}': {reason}")]
    InvalidValue { attribute: String, reason: String },
}

impl PatchError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn no_target(message: impl Into<String>) -> Self {
        Self::NoTarget {
            message: message.into(),
        }
    }

    pub fn not_modifiable(attribute: impl Into<String>) -> Self {
        Self::AttributeNotModifiable {
            attribute: attribute.into(),
        }
    }

    pub fn invalid_value(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Classify a path parse failure: errors inside `[...]` are filter errors.
    pub fn from_parse(path: &str, error: ParseError) -> Self {
        let inside_filter = path
            .get(..error.position.min(path.len()))
            .is_some_and(|prefix| prefix.contains('['));
        if inside_filter {
            Self::InvalidFilter {
                path: path.to_string(),
                source: error,
            }
        } else {
            Self::invalid_path(path, error.to_string())
        }
    }

    pub fn scim_type(&self) -> ScimErrorType {
        match self {
            Self::InvalidPath { .. } => ScimErrorType::InvalidPath,
            Self::InvalidFilter { .. } => ScimErrorType::InvalidFilter,
            Self::NoTarget { .. } => ScimErrorType::NoTarget,
            Self::AttributeNotModifiable { .. } => ScimErrorType::Mutability,
            Self::InvalidValue { .. } => ScimErrorType::InvalidValue,
        }
    }
}
