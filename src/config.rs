//! Controller configuration.
//!
//! [`ScimConfig`] is plain data with defaults that suit a single-host
//! deployment. It is normally assembled through
//! [`ScimControllerBuilder`](crate::controller::ScimControllerBuilder), which
//! validates it before anything else is built.

use crate::error::{BuildError, BuildResult};
use crate::schema::SchemaRegistry;
use std::path::PathBuf;

/// Where the schema documents come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchemaSource {
    /// The RFC 7643 User, Group and Enterprise User schemas compiled into the crate
    #[default]
    Embedded,
    /// A directory holding `User.json`, `Group.json` and optionally
    /// `EnterpriseUser.json`
    Directory(PathBuf),
}

impl SchemaSource {
    /// Load the registry this source describes.
    pub fn load(&self) -> BuildResult<SchemaRegistry> {
        match self {
            Self::Embedded => SchemaRegistry::with_embedded_schemas(),
            Self::Directory(dir) => SchemaRegistry::from_schema_dir(dir),
        }
    }
}

/// Configuration for a SCIM controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScimConfig {
    /// Public URL of the SCIM root, used for `meta.location` and `Location`.
    /// Examples: "https://scim.example.com/v2", "http://localhost:8080/scim/v2"
    pub base_url: String,

    /// Upper bound for `count` on list requests.
    pub max_results: usize,

    /// Page size when a list request has no `count`.
    pub default_count: usize,

    /// Map `userName` onto the store's email field instead of its username.
    pub email_as_username: bool,

    /// Reject PUT, PATCH and DELETE requests that carry no `If-Match`.
    pub require_if_match: bool,

    pub schema_source: SchemaSource,

    /// Advertised as `documentationUri` in ServiceProviderConfig.
    pub documentation_uri: Option<String>,
}

impl Default for ScimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost/scim/v2".to_string(),
            max_results: 200,
            default_count: 200,
            email_as_username: false,
            require_if_match: false,
            schema_source: SchemaSource::Embedded,
            documentation_uri: None,
        }
    }
}

impl ScimConfig {
    /// Validate the configuration.
    ///
    /// Ensures the base URL is absolute and the page limits are usable.
    pub fn validate(&self) -> BuildResult<()> {
        if self.base_url.is_empty() {
            return Err(invalid("Base URL cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(invalid("Base URL must start with http:// or https://"));
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(invalid(format!("Base URL '{}' is not a valid URL", self.base_url)));
        }

        if self.max_results == 0 {
            return Err(invalid("max_results must be at least 1"));
        }

        if self.default_count > self.max_results {
            return Err(invalid(format!(
                "default_count ({}) cannot exceed max_results ({})",
                self.default_count, self.max_results
            )));
        }

        Ok(())
    }

    /// The base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn invalid(message: impl Into<String>) -> BuildError {
    BuildError::InvalidConfiguration {
        message: message.into(),
    }
}
