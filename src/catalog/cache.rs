//! Catalog response cache
//!
//! Keeps recent catalog lookups in memory with a TTL and an entry limit.
//! Expired entries are dropped first, then the least recently used.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::CacheConfig;
use crate::content::ContentRef;

use super::CatalogData;

/// Cache entry with metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<CatalogData>,
    pub created_at: SystemTime,
    pub last_accessed: SystemTime,
    pub access_count: usize,
}

impl CacheEntry {
    pub fn new(data: Arc<CatalogData>) -> Self {
        let now = SystemTime::now();
        Self {
            data,
            created_at: now,
            last_accessed: now,
            access_count: 1,
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = SystemTime::now();
        self.access_count += 1;
    }

    pub fn age_secs(&self) -> u64 {
        self.created_at.elapsed().map(|d| d.as_secs()).unwrap_or(0)
    }

    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        self.age_secs() >= ttl_secs
    }
}

/// TTL cache for catalog lookups
pub struct CatalogCache {
    entries: DashMap<String, CacheEntry>,
    config: CacheConfig,
}

impl CatalogCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    /// Cache key for a content reference
    pub fn make_key(content: &ContentRef) -> String {
        format!(
            "{}:{}:{}:{}",
            content.kind,
            content.catalog_id,
            content.season.as_deref().unwrap_or(""),
            content.episode.as_deref().unwrap_or("")
        )
    }

    /// Get a cached response, dropping it if it has expired
    pub fn get(&self, content: &ContentRef) -> Option<Arc<CatalogData>> {
        let key = Self::make_key(content);

        let expired = match self.entries.get_mut(&key) {
            Some(mut entry) => {
                if entry.is_expired(self.config.ttl_secs) {
                    true
                } else {
                    entry.touch();
                    return Some(entry.data.clone());
                }
            }
            None => return None,
        };

        if expired {
            self.entries.remove(&key);
        }
        None
    }

    pub fn contains(&self, content: &ContentRef) -> bool {
        self.entries.contains_key(&Self::make_key(content))
    }

    /// Cache a response
    pub fn insert(&self, content: &ContentRef, data: Arc<CatalogData>) {
        if self.config.max_entries == 0 || self.config.ttl_secs == 0 {
            return;
        }

        if self.entries.len() >= self.config.max_entries {
            self.evict_if_needed();
        }

        self.entries
            .insert(Self::make_key(content), CacheEntry::new(data));
    }

    /// Make room for one more entry
    fn evict_if_needed(&self) {
        self.clear_expired();

        if self.entries.len() < self.config.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().last_accessed)
            .map(|e| e.key().clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// Clear all expired entries
    pub fn clear_expired(&self) {
        let ttl = self.config.ttl_secs;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut count = 0;
        let mut oldest_age = 0;
        let mut hits = 0;

        for entry in self.entries.iter() {
            count += 1;
            hits += entry.value().access_count.saturating_sub(1);
            oldest_age = oldest_age.max(entry.value().age_secs());
        }

        CacheStats {
            entry_count: count,
            max_entries: self.config.max_entries,
            ttl_secs: self.config.ttl_secs,
            hits,
            oldest_entry_age_secs: oldest_age,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache statistics
#[derive(Debug, serde::Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub max_entries: usize,
    pub ttl_secs: u64,
    pub hits: usize,
    pub oldest_entry_age_secs: u64,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
