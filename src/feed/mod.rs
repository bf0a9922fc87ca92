//! Client-side feed synchronization.
//!
//! [`FeedSync`] owns what the user sees. It hydrates from the local cache
//! when possible, falls back to a [`PostSource`] otherwise, and applies new
//! posts, likes and replies optimistically, rewriting the cache after each.

pub mod cache;
pub mod error;
pub mod source;
pub mod store;
pub mod sync;

pub use cache::{Freshness, PostCache};
pub use error::FeedError;
pub use source::{HttpListing, PostSource, SeedListing};
pub use store::{CacheError, FileStore, KvStore, MemoryStore};
pub use sync::{FeedState, FeedSync, LikeToggle, LoadingState};
