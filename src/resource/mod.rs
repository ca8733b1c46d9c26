//! SCIM resource model.
//!
//! * [`Resource`] - a User or Group as an open-ended attribute tree, with
//!   extension attributes bucketed by schema URN
//! * [`Meta`] - server-maintained metadata
//! * [`Version`] and [`IfMatch`] - opaque versions and ETag preconditions
//! * [`AttributeSelection`] - `attributes`/`excludedAttributes` projection

pub mod meta;
pub mod projection;
pub mod resource;
pub mod version;

pub use meta::Meta;
pub use projection::AttributeSelection;
pub use resource::{Resource, get_ignore_case, key_ignore_case};
pub use version::{IfMatch, Version, VersionError};
