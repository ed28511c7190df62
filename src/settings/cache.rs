//! Process-wide settings cache.
//!
//! # Responsibilities
//! - Exact-key lookups and full snapshots of every setting
//! - Wholesale replacement after a successful write cycle
//!
//! # Design Decisions
//! - Snapshot is an immutable `BTreeMap` behind `ArcSwap`: readers see the
//!   old map or the new one, never a mix
//! - Keyed by setting key, so enumeration order is stable
//! - `init` and `refresh` are the only mutation points

use arc_swap::ArcSwap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::observability::metrics;
use crate::store::SettingsStore;

use super::types::SettingValue;

type Snapshot = BTreeMap<String, SettingValue>;

/// Read-through view over the settings universe.
pub trait SettingsCacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<SettingValue>;

    fn get_all(&self) -> Vec<SettingValue>;

    /// Replace the whole view with `entries`.
    fn refresh(&self, entries: Vec<SettingValue>);
}

/// Default cache implementation.
pub struct SettingsCache {
    snapshot: ArcSwap<Snapshot>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self { snapshot: ArcSwap::from_pointee(Snapshot::new()) }
    }

    /// Build a cache around a fixed set of entries.
    pub fn with_entries(entries: Vec<SettingValue>) -> Self {
        let cache = Self::new();
        cache.refresh(entries);
        cache
    }

    /// Populate from the store at startup.
    pub async fn init(&self, store: &dyn SettingsStore) -> Result<()> {
        let entries = store.load_all().await?;
        self.refresh(entries);
        tracing::info!(entries = self.len(), "Settings cache initialized");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsCacheBackend for SettingsCache {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.snapshot.load().get(key).cloned()
    }

    fn get_all(&self) -> Vec<SettingValue> {
        self.snapshot.load().values().cloned().collect()
    }

    fn refresh(&self, entries: Vec<SettingValue>) {
        let next: Snapshot = entries.into_iter().map(|s| (s.key.clone(), s)).collect();
        let count = next.len();
        self.snapshot.store(Arc::new(next));
        metrics::record_cache_size(count);
        tracing::debug!(entries = count, "Settings cache refreshed");
    }
}
