//! Listing: query parameters, sorting and pagination.

pub mod page;
pub mod query;
pub mod sort;

pub use page::{LIST_RESPONSE_SCHEMA, Page, PageRequest, paginate};
pub use query::{ListQuery, SEARCH_REQUEST_SCHEMA};
pub use sort::{SortOrder, sort_resources};
