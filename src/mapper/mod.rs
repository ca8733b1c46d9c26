//! Translation between SCIM resources and the host store's records.
//!
//! The host store keeps a handful of well-known attributes in native fields
//! (`username`, `email`, `firstName`, ...). The [`MappingTable`] names those
//! bindings and [`ResourceMapper`] moves values across them in both
//! directions, carrying every other attribute through generically.

pub mod mapper;
pub mod record;
pub mod table;

pub use mapper::{Prior, ResourceMapper};
pub use record::{StoreRecord, fields};
pub use table::{Binding, FieldMapping, MappingTable};
