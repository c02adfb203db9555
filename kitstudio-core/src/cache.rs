//! Memoized renderer output.
//!
//! A plain map with wholesale clearing: descriptors never change after registration,
//! so entries never go stale on their own.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub markup: String,
    pub rendered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RenderCache {
    entries: DashMap<String, CacheEntry>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|e| e.markup.clone())
    }

    /// Insert or overwrite the entry for `key`.
    pub fn put(&self, key: impl Into<String>, markup: impl Into<String>) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                markup: markup.into(),
                rendered_at: Utc::now(),
            },
        );
    }

    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        tracing::debug!(dropped, "render cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
