//! Client side content access
//!
//! A `ContentSource` talks to the content API; `ContentCache` sits in front
//! of it and guarantees at most one in-flight fetch per document id.

mod cache;
mod source;

pub use cache::{CacheStats, ContentCache};
pub use source::{ContentSource, FetchError, HttpContentSource};
