//! Storage abstraction over the host identity store.
//!
//! The protocol engine never owns persistent state. Everything it reads or
//! writes goes through a [`StorageProvider`], which the host implements over
//! its own user/group persistence API. [`InMemoryStorage`] is a reference
//! implementation used by tests and demos.
//!
//! The storage layer is responsible for:
//! - Assigning ids and timestamps on create
//! - Computing a new version on every write
//! - Rejecting updates whose expected version is stale
//!
//! It is NOT responsible for SCIM validation, mapping or metadata rendering.
//!
//! # Example Usage
//!
//! ```rust
//! use scim_provider::mapper::{StoreRecord, fields};
//! use scim_provider::schema::ResourceKind;
//! use scim_provider::storage::{InMemoryStorage, StorageKey, StorageProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let record = StoreRecord::new().with_field(fields::USERNAME, "bjensen");
//! let created = storage.create(ResourceKind::User, record).await?;
//! let id = created.id.clone().unwrap_or_default();
//!
//! let found = storage.find_by_id(StorageKey::new(ResourceKind::User, &id)).await?;
//! assert!(found.is_some());
//!
//! assert!(storage.delete(StorageKey::new(ResourceKind::User, &id), None).await?);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;


pub use errors::StorageError;
pub use in_memory::{InMemoryStorage, InMemoryStorageStats};

use crate::mapper::StoreRecord;
use crate::resource::Version;
use crate::schema::ResourceKind;
use std::fmt;
use std::future::Future;

/// Identifies one record: resource type plus store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    kind: ResourceKind,
    id: String,
}

impl StorageKey {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Predicate handed to [`StorageProvider::find_by_filter`].
pub type RecordPredicate<'a> = &'a (dyn Fn(&StoreRecord) -> bool + Send + Sync);

/// The host store's user/group persistence API.
///
/// All operations are async and every record returned carries its id,
/// timestamps and current version.
///
/// # Key Design Decisions
///
/// - **Versions belong to the store**: every successful `create` or `update`
///   returns a record with a fresh `version`.
/// - **Optimistic concurrency**: `update` takes the version the caller read
///   and fails with [`StorageError::VersionMismatch`] if it is stale.
/// - **DELETE returns boolean**: the controller picks 204 or 404 from it.
pub trait StorageProvider: Send + Sync {
    /// Retrieve a record by key, `None` if it does not exist.
    fn find_by_id(
        &self,
        key: StorageKey,
    ) -> impl Future<Output = Result<Option<StoreRecord>, StorageError>> + Send;

    /// Every record of a type the predicate accepts, ordered by id.
    fn find_by_filter(
        &self,
        kind: ResourceKind,
        predicate: RecordPredicate<'_>,
    ) -> impl Future<Output = Result<Vec<StoreRecord>, StorageError>> + Send;

    /// Persist a new record. The store assigns `id`, `created`,
    /// `lastModified` and `version`; any id on the input is ignored.
    fn create(
        &self,
        kind: ResourceKind,
        record: StoreRecord,
    ) -> impl Future<Output = Result<StoreRecord, StorageError>> + Send;

    /// Replace the record at `key` if its version still equals `expected_version`.
    fn update(
        &self,
        key: StorageKey,
        record: StoreRecord,
        expected_version: &Version,
    ) -> impl Future<Output = Result<StoreRecord, StorageError>> + Send;

    /// Delete a record. `true` if it existed.
    ///
    /// With `expected_version`, the delete only happens if the stored version
    /// still equals it; otherwise [`StorageError::VersionMismatch`].
    fn delete(
        &self,
        key: StorageKey,
        expected_version: Option<&Version>,
    ) -> impl Future<Output = Result<bool, StorageError>> + Send;
}
