pub mod concurrency;
pub mod discovery;
pub mod errors;
pub mod listing;
pub mod patch;
pub mod projection;
pub mod properties;
pub mod resources;
