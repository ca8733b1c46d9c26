//! SCIM 2.0 resource provider engine.
//!
//! Exposes a host identity store's Users and Groups over the SCIM 2.0
//! protocol (RFC 7643/7644): schema-driven validation, filter evaluation,
//! PATCH, pagination and sorting, ETag concurrency and the discovery
//! endpoints. The engine owns no persistent state; the host plugs its
//! store in through [`storage::StorageProvider`].
//!
//! # Core Components
//!
//! - [`ScimController`] - Runs CRUD, search and discovery, and routes
//!   HTTP-shaped [`ScimRequest`]s onto them
//! - [`SchemaRegistry`] - Loaded SCIM schemas and resource types
//! - [`storage::StorageProvider`] - Trait the host store implements
//!
//! # Quick Start
//!
//! ```rust
//! use scim_provider::{ScimControllerBuilder, ScimRequest};
//! use scim_provider::storage::InMemoryStorage;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = ScimControllerBuilder::new(InMemoryStorage::new())
//!     .with_base_url("https://scim.example.com/scim/v2")
//!     .build()?;
//!
//! controller
//!     .handle(ScimRequest::post(
//!         "/Users",
//!         json!({
//!             "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!             "userName": "bjensen"
//!         }),
//!     ))
//!     .await;
//!
//! let found = controller
//!     .handle(ScimRequest::get("/Users?filter=userName%20eq%20%22bjensen%22"))
//!     .await;
//! assert_eq!(found.body()["totalResults"], 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod list;
pub mod mapper;
pub mod patch;
pub mod resource;
pub mod schema;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{SchemaSource, ScimConfig};
pub use controller::{ScimController, ScimControllerBuilder, ScimRequest, ScimResponse};
pub use error::{BuildError, ScimError, ScimResult, ValidationError, ValidationErrors};
pub use filter::FilterExpression;
pub use list::{ListQuery, Page, SortOrder};
pub use patch::{PatchOperation, PatchRequest};
pub use resource::{IfMatch, Meta, Resource, Version};
pub use schema::{ResourceKind, Schema, SchemaRegistry};
