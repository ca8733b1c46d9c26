//! Property-based checks for pagination, filtering and PATCH.
//!
//! Each case builds a fresh controller and drives it synchronously with
//! `tokio_test::block_on`, so proptest can shrink failures normally.

use crate::common::fixtures::{patch, user_minimal};
use crate::common::{controller, create, create_user, etag_of, id_of, resources};
use proptest::prelude::*;
use scim_provider::{FilterExpression, ScimRequest};
use serde_json::json;
use std::collections::BTreeSet;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 32,
        ..ProptestConfig::default()
    }
}

fn user_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-z]{3,10}", 1..6)
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn pagination_window_is_consistent(
        total in 0usize..12,
        start_index in -2i64..16,
        count in 0usize..15,
    ) {
        let (total_results, returned) = tokio_test::block_on(async {
            let controller = controller();
            for i in 0..total {
                create_user(&controller, user_minimal(&format!("user{:02}", i))).await;
            }
            let response = controller
                .handle(ScimRequest::get(format!(
                    "/Users?sortBy=userName&startIndex={}&count={}",
                    start_index, count
                )))
                .await;
            assert_eq!(response.status, 200);
            (
                response.body()["totalResults"].as_u64(),
                resources(&response).len(),
            )
        });

        let start = start_index.max(1) as usize;
        let expected = count.min((total + 1).saturating_sub(start));
        prop_assert_eq!(total_results, Some(total as u64));
        prop_assert_eq!(returned, expected);
    }

    #[test]
    fn equality_filter_selects_exactly_one_user(
        names in user_names(),
        pick in any::<prop::sample::Index>(),
        upper in any::<bool>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let target = pick.get(&names).clone();
        let literal = if upper { target.to_uppercase() } else { target.clone() };

        let matched = tokio_test::block_on(async {
            let controller = controller();
            for name in &names {
                create_user(&controller, user_minimal(name)).await;
            }
            let filter = format!("userName eq \"{}\"", literal).replace(' ', "%20").replace('"', "%22");
            let response = controller
                .handle(ScimRequest::get(format!("/Users?filter={}", filter)))
                .await;
            assert_eq!(response.status, 200);
            resources(&response)
                .iter()
                .filter_map(|user| user["userName"].as_str().map(str::to_string))
                .collect::<Vec<_>>()
        });

        // userName is not caseExact
        prop_assert_eq!(matched, vec![target]);
    }

    #[test]
    fn add_then_remove_leaves_resource_untouched(
        attribute in prop::sample::select(vec!["nickName", "title", "displayName", "userType"]),
        value in "[A-Za-z][A-Za-z ]{0,19}",
    ) {
        let (before, after) = tokio_test::block_on(async {
            let controller = controller();
            let created = create(&controller, "/Users", user_minimal("bjensen")).await;
            let path = format!("/Users/{}", id_of(&created));

            let response = controller
                .handle(ScimRequest::patch(
                    &path,
                    patch(json!([
                        { "op": "add", "path": attribute, "value": value },
                        { "op": "remove", "path": attribute }
                    ])),
                ))
                .await;
            assert_eq!(response.status, 200, "{}", response.body());
            (
                (etag_of(&created), created.body().clone()),
                (etag_of(&response), response.body().clone()),
            )
        });

        prop_assert_eq!(before, after);
    }

    #[test]
    fn filter_parser_never_panics(input in "\\PC{0,40}") {
        let _ = FilterExpression::parse(&input);
    }

    #[test]
    fn attribute_presence_filters_parse(
        attribute in prop::sample::select(vec!["userName", "name.givenName", "emails.value", "meta.lastModified"]),
    ) {
        let filter = format!("{} pr", attribute);
        prop_assert!(FilterExpression::parse(&filter).is_ok());
    }
}
