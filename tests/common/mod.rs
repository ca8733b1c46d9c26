//! Shared helpers for the integration suites.
//!
//! Everything here drives the controller the way a host would: through
//! [`ScimController::handle`] with HTTP-shaped requests.

use scim_provider::mapper::StoreRecord;
use scim_provider::resource::Version;
use scim_provider::schema::ResourceKind;
use scim_provider::storage::{
    InMemoryStorage, RecordPredicate, StorageError, StorageKey, StorageProvider,
};
use scim_provider::{ScimController, ScimControllerBuilder, ScimRequest, ScimResponse};
use serde_json::Value;

pub mod fixtures;

pub const BASE_URL: &str = "https://example.com/scim/v2";

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A controller over a fresh in-memory store.
pub fn controller() -> ScimController<InMemoryStorage> {
    controller_with(|builder| builder)
}

/// A controller over a fresh in-memory store, with builder tweaks.
pub fn controller_with(
    configure: impl FnOnce(ScimControllerBuilder<InMemoryStorage>) -> ScimControllerBuilder<InMemoryStorage>,
) -> ScimController<InMemoryStorage> {
    init_logging();
    let builder = ScimControllerBuilder::new(InMemoryStorage::new()).with_base_url(BASE_URL);
    configure(builder).build().expect("controller builds")
}

/// POST a resource and return the 201 response, failing the test otherwise.
pub async fn create<S: StorageProvider>(
    controller: &ScimController<S>,
    endpoint: &str,
    body: Value,
) -> ScimResponse {
    let response = controller.handle(ScimRequest::post(endpoint, body)).await;
    assert_eq!(
        response.status, 201,
        "create on {} failed: {}",
        endpoint,
        response.body()
    );
    response
}

/// Create a user and return its id.
pub async fn create_user<S: StorageProvider>(controller: &ScimController<S>, body: Value) -> String {
    id_of(&create(controller, "/Users", body).await)
}

/// Create a group and return its id.
pub async fn create_group<S: StorageProvider>(controller: &ScimController<S>, body: Value) -> String {
    id_of(&create(controller, "/Groups", body).await)
}

pub fn id_of(response: &ScimResponse) -> String {
    response.body()["id"]
        .as_str()
        .expect("response carries an id")
        .to_string()
}

pub fn etag_of(response: &ScimResponse) -> String {
    response.etag().expect("response carries an ETag").to_string()
}

/// `scimType` of an error response, if any.
pub fn scim_type(response: &ScimResponse) -> Option<&str> {
    response.body()["scimType"].as_str()
}

/// The `Resources` array of a ListResponse.
pub fn resources(response: &ScimResponse) -> &Vec<Value> {
    response.body()["Resources"]
        .as_array()
        .expect("ListResponse carries Resources")
}

/// A host store that is down.
#[derive(Debug, Default, Clone)]
pub struct FailingStorage;

impl FailingStorage {
    fn error() -> StorageError {
        StorageError::unavailable("directory service unreachable")
    }
}

impl StorageProvider for FailingStorage {
    async fn find_by_id(&self, _key: StorageKey) -> Result<Option<StoreRecord>, StorageError> {
        Err(Self::error())
    }

    async fn find_by_filter(
        &self,
        _kind: ResourceKind,
        _predicate: RecordPredicate<'_>,
    ) -> Result<Vec<StoreRecord>, StorageError> {
        Err(Self::error())
    }

    async fn create(
        &self,
        _kind: ResourceKind,
        _record: StoreRecord,
    ) -> Result<StoreRecord, StorageError> {
        Err(Self::error())
    }

    async fn update(
        &self,
        _key: StorageKey,
        _record: StoreRecord,
        _expected_version: &Version,
    ) -> Result<StoreRecord, StorageError> {
        Err(Self::error())
    }

    async fn delete(
        &self,
        _key: StorageKey,
        _expected_version: Option<&Version>,
    ) -> Result<bool, StorageError> {
        Err(Self::error())
    }
}
