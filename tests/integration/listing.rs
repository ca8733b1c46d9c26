//! Filtering, sorting and pagination of `GET /Users` and `.search`.

use crate::common::fixtures::{enterprise_user, user_minimal};
use crate::common::{controller, controller_with, create_user, resources, scim_type};
use scim_provider::storage::InMemoryStorage;
use scim_provider::{ScimController, ScimRequest, ScimResponse};
use serde_json::{Value, json};

fn encode(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

async fn list(controller: &ScimController<InMemoryStorage>, pairs: &[(&str, &str)]) -> ScimResponse {
    controller
        .handle(ScimRequest::get(format!("/Users?{}", encode(pairs))))
        .await
}

fn user_names(response: &ScimResponse) -> Vec<String> {
    resources(response)
        .iter()
        .filter_map(|resource| resource["userName"].as_str().map(str::to_string))
        .collect()
}

async fn seed(controller: &ScimController<InMemoryStorage>) {
    let people = [
        ("alice", "Engineer", true),
        ("bob", "Analyst", false),
        ("carol", "Engineer", true),
        ("dave", "Manager", true),
        ("erin", "Analyst", true),
    ];
    for (name, title, active) in people {
        let mut body = user_minimal(name);
        body["title"] = json!(title);
        body["active"] = json!(active);
        body["emails"] = json!([{ "value": format!("{}@example.com", name), "type": "work" }]);
        create_user(controller, body).await;
    }
}

#[tokio::test]
async fn test_list_response_envelope() {
    let controller = controller();
    seed(&controller).await;

    let response = controller.handle(ScimRequest::get("/Users")).await;
    assert_eq!(response.status, 200);
    let body = response.body();
    assert_eq!(
        body["schemas"],
        json!(["urn:ietf:params:scim:api:messages:2.0:ListResponse"])
    );
    assert_eq!(body["totalResults"], 5);
    assert_eq!(body["startIndex"], 1);
    assert_eq!(body["itemsPerPage"], 5);
    assert_eq!(resources(&response).len(), 5);
}

#[tokio::test]
async fn test_filter_selects_exactly_matching_resources() {
    let controller = controller();
    seed(&controller).await;

    let response = list(&controller, &[("filter", r#"userName eq "carol""#)]).await;
    assert_eq!(user_names(&response), vec!["carol"]);

    let response = list(&controller, &[("filter", r#"userName eq "CAROL""#)]).await;
    assert_eq!(user_names(&response), vec!["carol"]);

    let response = list(&controller, &[("filter", r#"userName eq "zed""#)]).await;
    assert_eq!(response.body()["totalResults"], 0);
    assert_eq!(resources(&response).len(), 0);
}

#[tokio::test]
async fn test_logical_and_value_path_filters() {
    let controller = controller();
    seed(&controller).await;

    let response = list(
        &controller,
        &[
            ("filter", r#"title eq "Engineer" or (active eq false and title eq "Analyst")"#),
            ("sortBy", "userName"),
        ],
    )
    .await;
    assert_eq!(user_names(&response), vec!["alice", "bob", "carol"]);

    let response = list(
        &controller,
        &[("filter", r#"emails[type eq "work" and value sw "d"]"#)],
    )
    .await;
    assert_eq!(user_names(&response), vec!["dave"]);

    let response = list(
        &controller,
        &[("filter", r#"not (title pr)"#)],
    )
    .await;
    assert_eq!(response.body()["totalResults"], 0);
}

#[tokio::test]
async fn test_filter_on_meta_and_extension() {
    let controller = controller();
    create_user(&controller, enterprise_user("bjensen", "Tour Operations")).await;
    create_user(&controller, enterprise_user("jsmith", "Finance")).await;

    let response = list(
        &controller,
        &[(
            "filter",
            r#"urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:department eq "Finance""#,
        )],
    )
    .await;
    assert_eq!(user_names(&response), vec!["jsmith"]);

    let response = list(
        &controller,
        &[("filter", r#"meta.created gt "2000-01-01T00:00:00Z""#)],
    )
    .await;
    assert_eq!(response.body()["totalResults"], 2);

    let response = list(&controller, &[("filter", r#"meta.resourceType eq "User""#)]).await;
    assert_eq!(response.body()["totalResults"], 2);
}

#[tokio::test]
async fn test_invalid_filters() {
    let controller = controller();
    seed(&controller).await;

    let malformed = list(&controller, &[("filter", r#"userName eq"#)]).await;
    assert_eq!(malformed.status, 400);
    assert_eq!(scim_type(&malformed), Some("invalidFilter"));

    let unknown = list(&controller, &[("filter", r#"shoeSize gt 10"#)]).await;
    assert_eq!(unknown.status, 400);
    assert_eq!(scim_type(&unknown), Some("invalidFilter"));
}

#[tokio::test]
async fn test_sorting() {
    let controller = controller();
    seed(&controller).await;

    let response = list(
        &controller,
        &[("sortBy", "userName"), ("sortOrder", "descending")],
    )
    .await;
    assert_eq!(user_names(&response), vec!["erin", "dave", "carol", "bob", "alice"]);

    let response = list(&controller, &[("sortBy", "title"), ("sortOrder", "ascending")]).await;
    let titles: Vec<&str> = resources(&response)
        .iter()
        .filter_map(|resource| resource["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Analyst", "Analyst", "Engineer", "Engineer", "Manager"]);

    let response = list(&controller, &[("sortBy", "emails")]).await;
    assert_eq!(user_names(&response), vec!["alice", "bob", "carol", "dave", "erin"]);

    let bad = list(&controller, &[("sortOrder", "sideways")]).await;
    assert_eq!(bad.status, 400);
    assert_eq!(scim_type(&bad), Some("invalidSyntax"));
}

#[tokio::test]
async fn test_pagination_windows() {
    let controller = controller();
    seed(&controller).await;

    let first = list(
        &controller,
        &[("sortBy", "userName"), ("startIndex", "1"), ("count", "2")],
    )
    .await;
    assert_eq!(user_names(&first), vec!["alice", "bob"]);
    assert_eq!(first.body()["totalResults"], 5);
    assert_eq!(first.body()["itemsPerPage"], 2);
    assert_eq!(first.body()["startIndex"], 1);

    let last = list(
        &controller,
        &[("sortBy", "userName"), ("startIndex", "5"), ("count", "2")],
    )
    .await;
    assert_eq!(user_names(&last), vec!["erin"]);

    let beyond = list(&controller, &[("startIndex", "10"), ("count", "2")]).await;
    assert_eq!(beyond.status, 200);
    assert_eq!(beyond.body()["totalResults"], 5);
    assert_eq!(beyond.body()["itemsPerPage"], 0);
    assert_eq!(resources(&beyond).len(), 0);

    let zero = list(&controller, &[("count", "0")]).await;
    assert_eq!(zero.body()["totalResults"], 5);
    assert_eq!(resources(&zero).len(), 0);

    let clamped = list(&controller, &[("startIndex", "-3"), ("count", "1")]).await;
    assert_eq!(clamped.body()["startIndex"], 1);
}

#[tokio::test]
async fn test_count_is_capped_by_max_results() {
    let controller = controller_with(|builder| builder.with_max_results(3));
    seed(&controller).await;

    let response = list(&controller, &[("count", "100")]).await;
    assert_eq!(response.body()["totalResults"], 5);
    assert_eq!(resources(&response).len(), 3);

    let default = controller.handle(ScimRequest::get("/Users")).await;
    assert_eq!(resources(&default).len(), 3);
}

#[tokio::test]
async fn test_dot_search() {
    let controller = controller();
    seed(&controller).await;

    let response = controller
        .handle(ScimRequest::post(
            "/Users/.search",
            json!({
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:SearchRequest"],
                "filter": "title eq \"Analyst\"",
                "sortBy": "userName",
                "sortOrder": "descending",
                "attributes": ["userName"],
                "startIndex": 1,
                "count": 10
            }),
        ))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(user_names(&response), vec!["erin", "bob"]);
    let first = &resources(&response)[0];
    assert!(first.get("title").is_none());
    assert!(first["id"].is_string());

    let missing_schema = controller
        .handle(ScimRequest::post("/Users/.search", json!({ "filter": "title pr" })))
        .await;
    assert_eq!(missing_schema.status, 400);
}

#[tokio::test]
async fn test_groups_are_listed_separately() {
    let controller = controller();
    seed(&controller).await;

    let response = controller.handle(ScimRequest::get("/Groups")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body()["totalResults"], 0);
    assert_eq!(response.body()["Resources"], Value::Array(vec![]));
}
