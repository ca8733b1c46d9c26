//! Error types for SCIM provider operations.
//!
//! Every controller operation returns [`ScimResult`]. Component errors (filter
//! parsing, schema validation, PATCH semantics, store failures) convert into
//! [`ScimError`] with `?`, and [`ScimError`] knows how to render itself as an
//! RFC 7644 §3.12 error body with the right HTTP status and `scimType`.

use crate::filter::ParseError;
use crate::patch::PatchError;
use crate::storage::StorageError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Schema URN carried by every SCIM error body.
pub const ERROR_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// Main error type for SCIM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Malformed filter or attribute path syntax
    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] ParseError),

    /// Filter that parsed but names attributes the resource type doesn't have
    #[error("Invalid filter: {message}")]
    UnsupportedFilter { message: String },

    /// Schema, type or mutability violations, all of them
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// PATCH request that cannot be applied
    #[error("{0}")]
    Patch(#[from] PatchError),

    /// Uniqueness violation
    #[error("{resource_type} with {attribute} '{value}' already exists")]
    Conflict {
        resource_type: String,
        attribute: String,
        value: String,
    },

    /// If-Match did not match the current version
    #[error("Precondition failed: {message}")]
    PreconditionFailed { message: String },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID {id}")]
    ResourceNotFound { resource_type: String, id: String },

    /// Unknown endpoint, schema or resource type
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request format or parameters
    #[error("Invalid request: {message}")]
    InvalidSyntax { message: String },

    /// Known endpoint, unsupported method
    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Host store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Machine-readable `scimType` codes from RFC 7644 §3.12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScimErrorType {
    InvalidFilter,
    TooMany,
    Uniqueness,
    Mutability,
    InvalidSyntax,
    InvalidPath,
    NoTarget,
    InvalidValue,
    InvalidVers,
    Sensitive,
}

impl ScimErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFilter => "invalidFilter",
            Self::TooMany => "tooMany",
            Self::Uniqueness => "uniqueness",
            Self::Mutability => "mutability",
            Self::InvalidSyntax => "invalidSyntax",
            Self::InvalidPath => "invalidPath",
            Self::NoTarget => "noTarget",
            Self::InvalidValue => "invalidValue",
            Self::InvalidVers => "invalidVers",
            Self::Sensitive => "sensitive",
        }
    }
}

impl fmt::Display for ScimErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScimError {
    /// Create a resource not found error
    pub fn resource_not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
        }
    }

    /// Create a precondition failure
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
        }
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidFilter(_)
            | Self::UnsupportedFilter { .. }
            | Self::Validation(_)
            | Self::Patch(_)
            | Self::InvalidSyntax { .. }
            | Self::Json(_) => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
            Self::ResourceNotFound { .. } | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Storage(StorageError::VersionMismatch { .. }) => StatusCode::PRECONDITION_FAILED,
            Self::Storage(StorageError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `scimType` reported alongside the status, if the error has one.
    pub fn scim_type(&self) -> Option<ScimErrorType> {
        match self {
            Self::InvalidFilter(_) | Self::UnsupportedFilter { .. } => {
                Some(ScimErrorType::InvalidFilter)
            }
            Self::Validation(errors) if errors.all_mutability() => Some(ScimErrorType::Mutability),
            Self::Validation(_) => Some(ScimErrorType::InvalidValue),
            Self::Patch(err) => Some(err.scim_type()),
            Self::Conflict { .. } => Some(ScimErrorType::Uniqueness),
            Self::InvalidSyntax { .. } | Self::Json(_) => Some(ScimErrorType::InvalidSyntax),
            _ => None,
        }
    }

    /// Render the RFC 7644 §3.12 error body.
    pub fn to_error_body(&self) -> Value {
        let mut body = json!({
            "schemas": [ERROR_SCHEMA],
            "status": self.status().as_u16().to_string(),
            "detail": self.to_string(),
        });
        if let Some(scim_type) = self.scim_type() {
            body["scimType"] = Value::String(scim_type.as_str().to_string());
        }
        body
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required attribute is missing
    #[error("Required attribute '{attribute}' is missing")]
    MissingRequiredAttribute { attribute: String },

    /// Attribute value doesn't match expected type
    #[error("Attribute '{attribute}' has invalid type, expected {expected}, got {actual}")]
    InvalidAttributeType {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Multi-valued attribute provided as single value
    #[error("Attribute '{attribute}' must be multi-valued (array)")]
    ExpectedMultiValue { attribute: String },

    /// Single-valued attribute provided as array
    #[error("Attribute '{attribute}' must be single-valued (not array)")]
    ExpectedSingleValue { attribute: String },

    /// Complex attribute missing a required sub-attribute
    #[error("Complex attribute '{attribute}' missing required sub-attribute '{sub_attribute}'")]
    MissingSubAttribute {
        attribute: String,
        sub_attribute: String,
    },

    /// Attribute not defined by any schema of the resource type
    #[error("Unknown attribute '{attribute}' in schema '{schema_id}'")]
    UnknownAttribute { attribute: String, schema_id: String },

    /// `schemas` missing or without the resource type's core schema
    #[error("'schemas' must contain '{core_schema}'")]
    MissingCoreSchema { core_schema: String },

    /// Schema URI not registered for the resource type
    #[error("Unknown schema URI: {uri}")]
    UnknownSchemaUri { uri: String },

    /// Required extension schema absent
    #[error("Missing required extension schema: {uri}")]
    MissingRequiredExtension { uri: String },

    /// More than one `primary: true` element
    #[error("Attribute '{attribute}' has more than one primary value")]
    MultiplePrimaryValues { attribute: String },

    /// Date-time value that is not RFC 3339
    #[error("Attribute '{attribute}' has invalid datetime format: {value}")]
    InvalidDateTimeFormat { attribute: String, value: String },

    /// Write to a readOnly attribute
    #[error("Attribute '{attribute}' is read-only")]
    ReadOnlyViolation { attribute: String },

    /// Change to an immutable attribute that already has a value
    #[error("Attribute '{attribute}' is immutable and already set")]
    ImmutableViolation { attribute: String },

    /// Generic validation error
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl ValidationError {
    /// True for readOnly/immutable violations.
    pub fn is_mutability(&self) -> bool {
        matches!(
            self,
            Self::ReadOnlyViolation { .. } | Self::ImmutableViolation { .. }
        )
    }
}

/// Every violation found while validating one resource, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Ok when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }

    fn all_mutability(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(ValidationError::is_mutability)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ScimError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}

/// Errors raised while assembling a controller.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Configuration rejected by `ScimConfig::validate`
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Schema document could not be read
    #[error("Failed to read schema document {path}: {source}")]
    SchemaIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Schema document is not valid JSON for the schema model
    #[error("Failed to parse schema document: {0}")]
    SchemaJson(#[from] serde_json::Error),

    /// Schema document parsed but is structurally invalid
    #[error("Invalid schema '{schema_id}': {message}")]
    InvalidSchema { schema_id: String, message: String },
}

impl BuildError {
    pub fn invalid_schema(schema_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema_id: schema_id.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for SCIM operations.
pub type ScimResult<T> = Result<T, ScimError>;

/// Result type alias for controller construction.
pub type BuildResult<T> = Result<T, BuildError>;
