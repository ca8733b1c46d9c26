//! Builder for configuring SCIM controller instances.

use super::ScimController;
use super::discovery::ServiceProviderConfig;
use crate::config::{SchemaSource, ScimConfig};
use crate::error::BuildResult;
use crate::mapper::{MappingTable, ResourceMapper};
use crate::schema::{ResourceKind, SchemaRegistry};
use crate::storage::StorageProvider;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for configuring and creating [`ScimController`] instances.
///
/// # Examples
///
/// ```rust
/// use scim_provider::ScimControllerBuilder;
/// use scim_provider::storage::InMemoryStorage;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let controller = ScimControllerBuilder::new(InMemoryStorage::new())
///     .with_base_url("https://scim.company.com/scim/v2")
///     .with_max_results(100)
///     .with_email_as_username(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ScimControllerBuilder<S> {
    storage: S,
    config: ScimConfig,
    registry: Option<Arc<SchemaRegistry>>,
}

impl<S: StorageProvider> ScimControllerBuilder<S> {
    /// Start from the default configuration.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: ScimConfig::default(),
            registry: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: ScimConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the public URL of the SCIM root.
    ///
    /// # Examples
    ///
    /// - `"https://scim.company.com/v2"`
    /// - `"http://localhost:8080/scim/v2"`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Cap `count` on list requests. The default page size follows it down.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.config.max_results = max_results;
        self.config.default_count = self.config.default_count.min(max_results);
        self
    }

    pub fn with_default_count(mut self, default_count: usize) -> Self {
        self.config.default_count = default_count;
        self
    }

    pub fn with_email_as_username(mut self, enabled: bool) -> Self {
        self.config.email_as_username = enabled;
        self
    }

    pub fn with_require_if_match(mut self, required: bool) -> Self {
        self.config.require_if_match = required;
        self
    }

    /// Load schema documents from a directory instead of the embedded set.
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.schema_source = SchemaSource::Directory(dir.into());
        self
    }

    /// Share an already loaded registry; `schema_source` is then ignored.
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_documentation_uri(mut self, uri: impl Into<String>) -> Self {
        self.config.documentation_uri = Some(uri.into());
        self
    }

    /// Validate the configuration, load the schemas and build the controller.
    pub fn build(self) -> BuildResult<ScimController<S>> {
        self.config.validate()?;
        let registry = match self.registry {
            Some(registry) => registry,
            None => Arc::new(self.config.schema_source.load()?),
        };

        let mapper = |kind: ResourceKind| {
            ResourceMapper::new(
                registry.resource_type(kind).clone(),
                MappingTable::for_kind(kind, self.config.email_as_username),
                self.config.base_url(),
            )
        };
        let users = mapper(ResourceKind::User);
        let groups = mapper(ResourceKind::Group);
        let service_config = ServiceProviderConfig::new(
            self.config.max_results,
            self.config.documentation_uri.clone(),
        );

        info!(
            "SCIM controller ready at {} ({} schemas)",
            self.config.base_url(),
            registry.get_schemas().len()
        );
        Ok(ScimController {
            storage: self.storage,
            config: self.config,
            registry,
            users,
            groups,
            service_config,
        })
    }
}
