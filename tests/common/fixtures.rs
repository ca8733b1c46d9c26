//! Request bodies, mostly the RFC 7643 §8 examples.

use serde_json::{Value, json};

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
pub const ENTERPRISE_SCHEMA: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
pub const PATCH_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// RFC 7643 §8.1 minimal user.
pub fn user_minimal(user_name: &str) -> Value {
    json!({
        "schemas": [USER_SCHEMA],
        "userName": user_name
    })
}

/// A user with work and home emails.
pub fn user_with_emails(user_name: &str) -> Value {
    json!({
        "schemas": [USER_SCHEMA],
        "userName": user_name,
        "name": {
            "familyName": "Jensen",
            "givenName": "Barbara"
        },
        "emails": [
            { "value": "a@example.com", "type": "work", "primary": true },
            { "value": "b@example.com", "type": "home" }
        ],
        "active": true
    })
}

/// RFC 7643 §8.3 enterprise user, trimmed.
pub fn enterprise_user(user_name: &str, department: &str) -> Value {
    json!({
        "schemas": [USER_SCHEMA, ENTERPRISE_SCHEMA],
        "userName": user_name,
        "externalId": format!("ext-{}", user_name),
        "name": {
            "formatted": "Ms. Barbara J Jensen, III",
            "familyName": "Jensen",
            "givenName": "Barbara"
        },
        "title": "Tour Guide",
        "active": true,
        "password": "t1meMa$heen",
        ENTERPRISE_SCHEMA: {
            "employeeNumber": "701984",
            "costCenter": "4130",
            "organization": "Universal Studios",
            "division": "Theme Park",
            "department": department
        }
    })
}

/// RFC 7643 §8.4 group.
pub fn group(display_name: &str, member_ids: &[&str]) -> Value {
    let members: Vec<Value> = member_ids
        .iter()
        .map(|id| json!({ "value": id, "type": "User" }))
        .collect();
    json!({
        "schemas": [GROUP_SCHEMA],
        "displayName": display_name,
        "members": members
    })
}

pub fn patch(operations: Value) -> Value {
    json!({
        "schemas": [PATCH_SCHEMA],
        "Operations": operations
    })
}
