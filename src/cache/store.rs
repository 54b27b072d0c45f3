//! Page cache storage: a keyed store with time-based expiry and explicit
//! clear. Values are idempotently recomputable rendered responses, so no
//! per-entry locking is needed.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use metrics::counter;

use super::keys::PageKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// Rendered response held by the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

struct CacheEntry {
    stored_at: Instant,
    response: CachedResponse,
}

pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<PageKey, CacheEntry>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a live entry. Expired entries are dropped on access.
    pub fn get(&self, key: &PageKey) -> Option<CachedResponse> {
        let expired = {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                None => {
                    counter!("quill_page_cache_miss_total").increment(1);
                    return None;
                }
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    counter!("quill_page_cache_hit_total").increment(1);
                    return Some(entry.response.clone());
                }
                Some(_) => true,
            }
        };
        if expired {
            rw_write(&self.entries, SOURCE, "get.expire").remove(key);
            counter!("quill_page_cache_expired_total").increment(1);
        }
        None
    }

    pub fn set(&self, key: PageKey, response: CachedResponse) {
        let entry = CacheEntry {
            stored_at: Instant::now(),
            response,
        };
        rw_write(&self.entries, SOURCE, "set").insert(key, entry);
    }

    /// Remove every cached entry immediately. This is the only way a write
    /// becomes visible before the TTL runs out.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
        counter!("quill_page_cache_clear_total").increment(1);
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::thread::sleep;

    use super::*;

    fn sample_response(body: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn round_trip_within_ttl() {
        let cache = PageCache::new(Duration::from_secs(20));
        assert!(cache.get(&PageKey::Index).is_none());

        cache.set(PageKey::Index, sample_response("hello"));

        let cached = cache.get(&PageKey::Index).expect("cached response");
        assert_eq!(cached.body, b"hello");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = PageCache::new(Duration::from_millis(10));
        cache.set(PageKey::Index, sample_response("old"));

        sleep(Duration::from_millis(25));

        assert!(cache.get(&PageKey::Index).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_removes_all_entries() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache.set(PageKey::Index, sample_response("index"));
        cache.set(
            PageKey::Group {
                slug: "rust".to_string(),
            },
            sample_response("group"),
        );
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(&PageKey::Index).is_none());
    }

    #[test]
    fn stale_entry_survives_writes_until_cleared() {
        // A new post does not touch the cache; only clear() does.
        let cache = PageCache::new(Duration::from_secs(20));
        cache.set(PageKey::Index, sample_response("before write"));

        let cached = cache.get(&PageKey::Index).expect("stale entry");
        assert_eq!(cached.body, b"before write");

        cache.clear();
        assert!(cache.get(&PageKey::Index).is_none());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let cache = PageCache::new(Duration::from_secs(20));

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.entries.write().expect("entries lock");
            panic!("poison entries lock");
        }));

        cache.set(PageKey::Index, sample_response("ok"));
        assert!(cache.get(&PageKey::Index).is_some());
    }
}
