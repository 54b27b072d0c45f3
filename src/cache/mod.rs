//! TTL page cache for rendered feed pages.
//!
//! Rendered responses for configured routes are memoized under a route-scoped
//! key for a fixed time window. Writes do not invalidate entries; staleness
//! inside the window is an accepted trade for read load. `PageCache::clear`
//! drops everything at once.

mod config;
mod keys;
mod lock;
mod middleware;
mod store;

pub use config::{CacheConfig, CachedRoute};
pub use keys::PageKey;
pub use middleware::{CacheState, page_cache_layer};
pub use store::{CachedResponse, PageCache};
