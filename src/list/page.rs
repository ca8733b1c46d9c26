//! `startIndex`/`count` pagination and the ListResponse envelope.

use serde_json::{Value, json};

/// Schema URN of a ListResponse message.
pub const LIST_RESPONSE_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";

/// A clamped pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub start_index: usize,
    pub count: usize,
}

impl PageRequest {
    /// Clamp client values: `startIndex` below 1 means 1, a negative `count`
    /// means 0, and `count` never exceeds `max_results`.
    pub fn new(
        start_index: Option<i64>,
        count: Option<i64>,
        default_count: usize,
        max_results: usize,
    ) -> Self {
        let start_index = start_index.unwrap_or(1).max(1);
        let count = count
            .map(|count| usize::try_from(count.max(0)).unwrap_or(usize::MAX))
            .unwrap_or(default_count)
            .min(max_results);
        Self {
            start_index: usize::try_from(start_index).unwrap_or(usize::MAX),
            count,
        }
    }
}

/// One page of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub resources: Vec<T>,
    /// Size of the whole result set, not of this page
    pub total_results: usize,
    pub start_index: usize,
    pub items_per_page: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            resources: self.resources.into_iter().map(f).collect(),
            total_results: self.total_results,
            start_index: self.start_index,
            items_per_page: self.items_per_page,
        }
    }
}

impl Page<Value> {
    pub fn to_list_response(&self) -> Value {
        json!({
            "schemas": [LIST_RESPONSE_SCHEMA],
            "totalResults": self.total_results,
            "startIndex": self.start_index,
            "itemsPerPage": self.items_per_page,
            "Resources": self.resources,
        })
    }
}

/// Cut one page out of an already filtered and sorted result set.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_results = items.len();
    let resources: Vec<T> = items
        .into_iter()
        .skip(request.start_index - 1)
        .take(request.count)
        .collect();

    Page {
        items_per_page: resources.len(),
        resources,
        total_results,
        start_index: request.start_index,
    }
}
