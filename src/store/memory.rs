//! In-memory settings store with optional JSON persistence.
//!
//! # Design Decisions
//! - An edit builds the next row set off to the side, writes it to disk and
//!   only then swaps it into the table; a failed write leaves the table as it was
//! - The file is written to a hidden sibling and renamed over the original
//! - Edits are serialized so two batches cannot interleave their writes

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::settings::types::{Actor, SettingChange, SettingValue};

use super::defaults::default_settings;
use super::SettingsStore;

/// A thread-safe settings table.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<DashMap<String, SettingValue>>,
    persistence_path: Option<PathBuf>,
    writer: Arc<Mutex<()>>,
}

impl MemoryStore {
    /// Create a store holding `rows`, memory only.
    pub fn new(rows: Vec<SettingValue>) -> Self {
        let store = Self::default();
        for row in rows {
            store.rows.insert(row.key.clone(), row);
        }
        store
    }

    pub fn with_defaults() -> Self {
        Self::new(default_settings())
    }

    /// Load from file if it exists, otherwise seed with the built-in defaults.
    /// Later edits are written back to `path`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let rows = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let rows: Vec<SettingValue> = serde_json::from_reader(reader)
                .map_err(|e| Error::System(format!("Invalid settings file {}: {}", path.display(), e)))?;
            tracing::info!(path = %path.display(), count = rows.len(), "Loaded settings from file");
            rows
        } else {
            tracing::info!(path = %path.display(), "No settings file, seeding defaults");
            default_settings()
        };

        let mut store = Self::new(rows);
        store.persistence_path = Some(path.to_path_buf());
        Ok(store)
    }

    fn sorted_rows(&self) -> Vec<SettingValue> {
        let mut rows: Vec<_> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    /// Write `rows` to the persistence file, if any, via tmp + rename.
    async fn save_to_file(&self, rows: &[SettingValue]) -> Result<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(rows)
            .map_err(|e| Error::System(format!("Failed to serialize settings: {}", e)))?;

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("settings.json");
        let staging = path.with_file_name(format!(".{}.tmp", name));
        tokio::fs::write(&staging, bytes).await?;
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), count = rows.len(), "Saved settings to file");
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<SettingValue>> {
        Ok(self.sorted_rows())
    }

    async fn edit(&self, changes: &[SettingChange], actor: Option<&Actor>) -> Result<Vec<SettingValue>> {
        let _guard = self.writer.lock().await;

        if let Some(missing) = changes.iter().find(|c| !self.rows.contains_key(&c.key)) {
            return Err(Error::setting_not_found(&missing.key));
        }

        let now = Utc::now();
        let mut next = self.sorted_rows();
        let mut updated = Vec::with_capacity(changes.len());
        for change in changes {
            if let Some(row) = next.iter_mut().find(|r| r.key == change.key) {
                row.value = change.value.clone();
                row.updated_at = now;
                updated.push(row.clone());
            }
        }

        self.save_to_file(&next).await?;

        for row in next {
            self.rows.insert(row.key.clone(), row);
        }

        tracing::info!(
            count = updated.len(),
            actor = actor.map(|a| a.id.as_str()).unwrap_or("internal"),
            "Settings persisted"
        );
        Ok(updated)
    }
}
