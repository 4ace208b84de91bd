//! Item records and the API fetcher
//!
//! - [`Item`]: typed story/comment record with explicit optional fields
//! - [`ItemFetcher`]: rate-limited, failure-tolerant API lookups

mod fetcher;
mod types;

pub use fetcher::{build_api_client, FetchError, ItemFetcher, RetryPolicy};
pub use types::{Item, ItemId, ItemKind};
