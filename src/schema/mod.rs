//! Schema model for SCIM resources.
//!
//! Schemas are loaded once into a [`SchemaRegistry`] and shared read-only.
//! Each [`ResourceType`] bundles its core schema, its extension schemas and
//! the common attributes (`id`, `externalId`, `meta`), and knows how to
//! resolve attribute names and validate resources against them.
//!
//! # Examples
//!
//! ```rust
//! use scim_provider::schema::{ResourceKind, SchemaRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//! let users = registry.resource_type(ResourceKind::User);
//! assert!(users.resolve(None, "userName").is_some());
//! # Ok(())
//! # }
//! ```

pub mod embedded;
pub mod registry;
pub mod types;
pub mod validation;


pub use registry::{ENTERPRISE_USER_SCHEMA, SchemaRegistry};
pub use types::{
    AttributeDefinition, AttributeScope, AttributeType, Mutability, ResolvedAttribute,
    ResourceKind, ResourceType, Returned, Schema, SchemaExtension, Uniqueness,
};
