//! Resource endpoint controller.
//!
//! [`ScimController`] runs every request through the same sequence:
//! validate syntax, resolve the target resource, check the `If-Match`
//! precondition, execute against the mapper, patch engine and store, then
//! shape the response. Typed operations live in `resources` and `discovery`;
//! [`ScimController::handle`] maps HTTP-shaped [`ScimRequest`]s onto them.
//!
//! ```rust
//! use scim_provider::controller::{ScimControllerBuilder, ScimRequest};
//! use scim_provider::storage::InMemoryStorage;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = ScimControllerBuilder::new(InMemoryStorage::new()).build()?;
//!
//! let created = controller
//!     .handle(ScimRequest::post(
//!         "/Users",
//!         json!({
//!             "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!             "userName": "bjensen"
//!         }),
//!     ))
//!     .await;
//! assert_eq!(created.status, 201);
//! assert!(created.etag().is_some());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod discovery;
pub mod request;
pub mod resources;
pub mod response;
pub mod router;

pub use builder::ScimControllerBuilder;
pub use discovery::{AuthenticationScheme, ServiceProviderConfig};
pub use request::ScimRequest;
pub use response::{SCIM_CONTENT_TYPE, ScimResponse};

use crate::config::ScimConfig;
use crate::mapper::ResourceMapper;
use crate::schema::{ResourceKind, SchemaRegistry};
use crate::storage::StorageProvider;
use std::sync::Arc;

/// SCIM protocol engine over a host store.
///
/// Holds no mutable state of its own: concurrent requests share it through
/// `&self`, and every write goes through the store's version check.
pub struct ScimController<S> {
    storage: S,
    config: ScimConfig,
    registry: Arc<SchemaRegistry>,
    users: ResourceMapper,
    groups: ResourceMapper,
    service_config: ServiceProviderConfig,
}

impl<S: StorageProvider> ScimController<S> {
    pub fn builder(storage: S) -> ScimControllerBuilder<S> {
        ScimControllerBuilder::new(storage)
    }

    pub fn config(&self) -> &ScimConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn mapper(&self, kind: ResourceKind) -> &ResourceMapper {
        match kind {
            ResourceKind::User => &self.users,
            ResourceKind::Group => &self.groups,
        }
    }
}

impl<S> std::fmt::Debug for ScimController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScimController")
            .field("config", &self.config)
            .field("storage", &std::any::type_name::<S>())
            .finish()
    }
}
