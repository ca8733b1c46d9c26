//! In-memory storage implementation.
//!
//! A thread-safe [`StorageProvider`] backed by a `HashMap` behind a tokio
//! `RwLock`. It stands in for the host identity store in tests and demos.
//!
//! # Features
//!
//! * Thread-safe concurrent access with async RwLock
//! * UUID v4 ids, never reused
//! * Content-hash versions salted with a write counter, so a rewrite of
//!   identical content still yields a new version
//! * Results ordered by id
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
//! let created = storage
//!     .create(ResourceKind::Group, StoreRecord::new().with_field(fields::GROUP_NAME, "Admins"))
//!     .await?;
//!
//! let admins = storage
//!     .find_by_filter(ResourceKind::Group, &|record: &StoreRecord| {
//!         record.field_str(fields::GROUP_NAME) == Some("Admins")
//!     })
//!     .await?;
//! assert_eq!(admins.len(), 1);
//! assert_eq!(admins[0].id, created.id);
//! # Ok(())
//! # }
//! ```

use crate::mapper::StoreRecord;
use crate::resource::Version;
use crate::schema::ResourceKind;
use crate::storage::{RecordPredicate, StorageError, StorageKey, StorageProvider};
use chrono::Utc;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    // kind -> id -> record
    records: HashMap<ResourceKind, HashMap<String, StoreRecord>>,
    revision: u64,
}

impl Tables {
    fn next_version(&mut self, record: &StoreRecord) -> Version {
        self.revision += 1;
        let content = format!("{}:{}", self.revision, record.content());
        Version::from_content(content.as_bytes())
    }
}

/// Thread-safe in-memory storage implementation.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    data: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get storage statistics for debugging and monitoring.
    pub async fn stats(&self) -> InMemoryStorageStats {
        let tables = self.data.read().await;
        let count = |kind| tables.records.get(&kind).map_or(0, HashMap::len);
        InMemoryStorageStats {
            users: count(ResourceKind::User),
            groups: count(ResourceKind::Group),
            writes: tables.revision,
        }
    }

    /// Clear all data (useful for testing).
    pub async fn clear(&self) {
        let mut tables = self.data.write().await;
        tables.records.clear();
    }
}

impl StorageProvider for InMemoryStorage {
    async fn find_by_id(&self, key: StorageKey) -> Result<Option<StoreRecord>, StorageError> {
        let tables = self.data.read().await;
        let record = tables
            .records
            .get(&key.kind())
            .and_then(|records| records.get(key.id()))
            .cloned();
        trace!("find_by_id {} -> {}", key, record.is_some());
        Ok(record)
    }

    async fn find_by_filter(
        &self,
        kind: ResourceKind,
        predicate: RecordPredicate<'_>,
    ) -> Result<Vec<StoreRecord>, StorageError> {
        let tables = self.data.read().await;
        let mut results: Vec<StoreRecord> = tables
            .records
            .get(&kind)
            .into_iter()
            .flat_map(HashMap::values)
            .filter(|record| predicate(*record))
            .cloned()
            .collect();

        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }

    async fn create(
        &self,
        kind: ResourceKind,
        mut record: StoreRecord,
    ) -> Result<StoreRecord, StorageError> {
        let mut tables = self.data.write().await;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        record.id = Some(id.clone());
        record.created = Some(now);
        record.last_modified = Some(now);
        record.version = Some(tables.next_version(&record));

        tables
            .records
            .entry(kind)
            .or_default()
            .insert(id.clone(), record.clone());
        debug!("Created {}/{}", kind, id);
        Ok(record)
    }

    async fn update(
        &self,
        key: StorageKey,
        mut record: StoreRecord,
        expected_version: &Version,
    ) -> Result<StoreRecord, StorageError> {
        let mut tables = self.data.write().await;

        let Some(current) = tables
            .records
            .get(&key.kind())
            .and_then(|records| records.get(key.id()))
        else {
            return Err(StorageError::not_found(key.kind(), key.id()));
        };
        if current.version.as_ref() != Some(expected_version) {
            debug!("Version mismatch updating {}", key);
            return Err(StorageError::version_mismatch(key.id()));
        }

        record.id = Some(key.id().to_string());
        record.created = current.created;
        record.last_modified = Some(Utc::now());
        record.version = Some(tables.next_version(&record));

        tables
            .records
            .entry(key.kind())
            .or_default()
            .insert(key.id().to_string(), record.clone());
        debug!("Updated {}", key);
        Ok(record)
    }

    async fn delete(
        &self,
        key: StorageKey,
        expected_version: Option<&Version>,
    ) -> Result<bool, StorageError> {
        let mut tables = self.data.write().await;
        let Some(records) = tables.records.get_mut(&key.kind()) else {
            return Ok(false);
        };
        if let (Some(expected), Some(current)) = (expected_version, records.get(key.id())) {
            if current.version.as_ref() != Some(expected) {
                debug!("Version mismatch deleting {}", key);
                return Err(StorageError::version_mismatch(key.id()));
            }
        }
        let existed = records.remove(key.id()).is_some();
        if existed {
            debug!("Deleted {}", key);
        }
        Ok(existed)
    }
}

/// Statistics about the current state of in-memory storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStorageStats {
    pub users: usize,
    pub groups: usize,
    /// Successful creates and updates since startup
    pub writes: u64,
}
