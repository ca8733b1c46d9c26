//! ServiceProviderConfig, ResourceTypes and Schemas endpoints.

use crate::common::fixtures::{ENTERPRISE_SCHEMA, GROUP_SCHEMA, USER_SCHEMA};
use crate::common::{BASE_URL, controller, controller_with, resources};
use scim_provider::ScimRequest;
use serde_json::json;

#[tokio::test]
async fn test_service_provider_config() {
    let controller = controller_with(|builder| {
        builder
            .with_max_results(50)
            .with_documentation_uri("https://example.com/docs/scim")
    });
    let response = controller.handle(ScimRequest::get("/ServiceProviderConfig")).await;

    assert_eq!(response.status, 200);
    let body = response.body();
    assert_eq!(
        body["schemas"],
        json!(["urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig"])
    );
    assert_eq!(body["documentationUri"], "https://example.com/docs/scim");
    assert_eq!(body["patch"]["supported"], true);
    assert_eq!(body["bulk"]["supported"], false);
    assert_eq!(body["bulk"]["maxOperations"], 1000);
    assert_eq!(body["bulk"]["maxPayloadSize"], 1_048_576);
    assert_eq!(body["filter"]["supported"], true);
    assert_eq!(body["filter"]["maxResults"], 50);
    assert_eq!(body["changePassword"]["supported"], false);
    assert_eq!(body["sort"]["supported"], true);
    assert_eq!(body["etag"]["supported"], true);
    assert_eq!(body["authenticationSchemes"][0]["type"], "oauthbearertoken");
    assert_eq!(
        body["meta"]["location"],
        format!("{}/ServiceProviderConfig", BASE_URL)
    );
}

#[tokio::test]
async fn test_resource_types() {
    let controller = controller();
    let response = controller.handle(ScimRequest::get("/ResourceTypes")).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body()["totalResults"], 2);
    let types = resources(&response);
    assert_eq!(types[0]["name"], "User");
    assert_eq!(types[0]["endpoint"], "/Users");
    assert_eq!(types[0]["schema"], USER_SCHEMA);
    assert_eq!(
        types[0]["schemaExtensions"],
        json!([{ "schema": ENTERPRISE_SCHEMA, "required": false }])
    );
    assert_eq!(types[1]["name"], "Group");
    assert_eq!(types[1]["schema"], GROUP_SCHEMA);

    let user = controller.handle(ScimRequest::get("/ResourceTypes/User")).await;
    assert_eq!(user.status, 200);
    assert_eq!(user.body()["id"], "User");
    assert_eq!(
        user.body()["meta"]["location"],
        format!("{}/ResourceTypes/User", BASE_URL)
    );

    let missing = controller.handle(ScimRequest::get("/ResourceTypes/Device")).await;
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn test_schemas() {
    let controller = controller();
    let response = controller.handle(ScimRequest::get("/Schemas")).await;

    assert_eq!(response.status, 200);
    let ids: Vec<&str> = resources(&response)
        .iter()
        .filter_map(|schema| schema["id"].as_str())
        .collect();
    assert!(ids.contains(&USER_SCHEMA));
    assert!(ids.contains(&GROUP_SCHEMA));
    assert!(ids.contains(&ENTERPRISE_SCHEMA));

    let user = controller
        .handle(ScimRequest::get(format!("/Schemas/{}", USER_SCHEMA)))
        .await;
    assert_eq!(user.status, 200);
    let attributes = user.body()["attributes"].as_array().cloned().unwrap_or_default();
    let user_name = attributes
        .iter()
        .find(|attr| attr["name"] == "userName")
        .cloned()
        .unwrap_or_default();
    assert_eq!(user_name["uniqueness"], "server");
    assert_eq!(user_name["required"], true);

    let missing = controller
        .handle(ScimRequest::get("/Schemas/urn:example:unknown"))
        .await;
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn test_discovery_is_read_only() {
    let controller = controller();
    let response = controller
        .handle(ScimRequest::post("/Schemas", json!({})))
        .await;
    assert_eq!(response.status, 405);

    let response = controller
        .handle(ScimRequest::delete("/ServiceProviderConfig"))
        .await;
    assert_eq!(response.status, 405);
}
