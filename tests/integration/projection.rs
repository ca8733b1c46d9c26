//! `attributes` and `excludedAttributes` on reads, lists and writes.

use crate::common::fixtures::{ENTERPRISE_SCHEMA, enterprise_user, user_with_emails};
use crate::common::{controller, create, create_user, id_of, resources};
use scim_provider::ScimRequest;

#[tokio::test]
async fn test_attributes_on_get() {
    let controller = controller();
    let id = create_user(&controller, user_with_emails("bjensen")).await;

    let response = controller
        .handle(ScimRequest::get(format!(
            "/Users/{}?attributes=userName,name.givenName",
            id
        )))
        .await;

    assert_eq!(response.status, 200);
    let body = response.body();
    assert_eq!(body["id"], id);
    assert_eq!(body["userName"], "bjensen");
    assert_eq!(body["name"]["givenName"], "Barbara");
    assert!(body["name"].get("familyName").is_none());
    assert!(body.get("emails").is_none());
    assert!(body.get("meta").is_none());
    assert!(body["schemas"].is_array());
    assert!(response.etag().is_some());
}

#[tokio::test]
async fn test_excluded_attributes_keep_always_returned() {
    let controller = controller();
    let id = create_user(&controller, user_with_emails("bjensen")).await;

    let response = controller
        .handle(ScimRequest::get(format!(
            "/Users/{}?excludedAttributes=emails,id",
            id
        )))
        .await;

    let body = response.body();
    assert!(body.get("emails").is_none());
    assert_eq!(body["id"], id);
    assert_eq!(body["userName"], "bjensen");
}

#[tokio::test]
async fn test_extension_projection() {
    let controller = controller();
    let id = create_user(&controller, enterprise_user("bjensen", "Tour Operations")).await;

    let response = controller
        .handle(ScimRequest::get(format!(
            "/Users/{}?attributes={}:department",
            id, ENTERPRISE_SCHEMA
        )))
        .await;
    let body = response.body();
    assert_eq!(body[ENTERPRISE_SCHEMA]["department"], "Tour Operations");
    assert!(body[ENTERPRISE_SCHEMA].get("costCenter").is_none());
    assert!(body.get("title").is_none());

    let response = controller
        .handle(ScimRequest::get(format!(
            "/Users/{}?excludedAttributes={}",
            id, ENTERPRISE_SCHEMA
        )))
        .await;
    assert!(response.body().get(ENTERPRISE_SCHEMA).is_none());
    assert_eq!(response.body()["title"], "Tour Guide");
}

#[tokio::test]
async fn test_projection_on_list_and_create() {
    let controller = controller();
    let created = controller
        .handle(ScimRequest::post(
            "/Users?attributes=userName",
            user_with_emails("bjensen"),
        ))
        .await;
    assert_eq!(created.status, 201);
    assert!(created.body().get("name").is_none());
    assert!(created.location().is_some());

    create(&controller, "/Users", user_with_emails("jsmith")).await;
    let listed = controller
        .handle(ScimRequest::get("/Users?sortBy=userName&excludedAttributes=name,emails"))
        .await;
    for resource in resources(&listed) {
        assert!(resource.get("name").is_none());
        assert!(resource.get("emails").is_none());
        assert!(resource["userName"].is_string());
    }
    assert_eq!(resources(&listed)[0]["id"], id_of(&created));
}

#[tokio::test]
async fn test_projection_does_not_affect_filtering() {
    let controller = controller();
    create_user(&controller, user_with_emails("bjensen")).await;

    let response = controller
        .handle(ScimRequest::get(
            "/Users?filter=name.familyName%20eq%20%22Jensen%22&attributes=userName",
        ))
        .await;
    assert_eq!(response.body()["totalResults"], 1);
    assert!(resources(&response)[0].get("name").is_none());
}
