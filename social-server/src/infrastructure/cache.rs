//! Process-wide page cache for rendered listing responses.
//!
//! Entries are keyed by route (path and query) and expire after a fixed TTL.
//! Writes never invalidate entries: a cached page can lag behind the
//! database by up to one TTL, or until `clear` is called.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use actix_web::web::Bytes;
use lru::LruCache;
use tracing::{debug, warn};

/// A response body with the status and headers needed to replay it.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

struct Entry {
    page: CachedPage,
    expires_at: Instant,
}

pub struct PageCache {
    ttl: Duration,
    entries: Mutex<LruCache<String, Entry>>,
}

impl PageCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// A zero TTL turns the cache off.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &str) -> Option<CachedPage> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.lock("get");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.page.clone()),
            Some(_) => {
                debug!(key, "page cache entry expired");
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, page: CachedPage) {
        if !self.is_enabled() {
            return;
        }
        let entry = Entry {
            page,
            expires_at: Instant::now() + self.ttl,
        };
        if let Some((evicted, _)) = self.lock("insert").push(key.clone(), entry) {
            if evicted != key {
                debug!(key = %evicted, "page cache entry evicted");
            }
        }
    }

    pub fn clear(&self) {
        self.lock("clear").clear();
    }

    pub fn len(&self) -> usize {
        self.lock("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, LruCache<String, Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(op, result = "poisoned_recovered", "recovered from poisoned page cache lock");
                poisoned.into_inner()
            }
        }
    }
}
