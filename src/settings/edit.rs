//! Batch edit pipeline.
//!
//! # Data Flow
//! ```text
//! EditRequest (shorthand | batch)
//!     → Normalized   (canonical string values, `type` hint extracted)
//!     → Authorized   (every entry passes AccessGate, else whole batch fails)
//!     → Validated    (DocumentValidator)
//!     → Persisted    (SettingsStore::edit)
//!     → CacheRefreshed (cache repopulated, edited entries projected)
//! ```
//!
//! # Design Decisions
//! - Each stage consumes the previous stage's value, so stages cannot be
//!   skipped or reordered
//! - Any failure aborts the batch before persistence; nothing partial is written
//! - Persistence and validation errors propagate unchanged

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::permissions::Action;
use crate::store::{DocumentValidator, SettingsStore};

use super::cache::SettingsCacheBackend;
use super::gate::AccessGate;
use super::projector::{project, SettingsResult};
use super::types::{Context, SettingChange, SettingValue, PERMALINKS_KEY, TYPE_HINT_KEY};

/// One entry of an edit request, value in any JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdit {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Incoming edit, either a single key/value or a `{settings: [...]}` batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditRequest {
    Batch { settings: Vec<RawEdit> },
    Shorthand { key: String, value: Value },
}

impl EditRequest {
    pub fn shorthand(key: impl Into<String>, value: impl Into<Value>) -> Self {
        EditRequest::Shorthand { key: key.into(), value: value.into() }
    }

    pub fn batch(entries: Vec<RawEdit>) -> Self {
        EditRequest::Batch { settings: entries }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStage {
    Received,
    Normalized,
    Authorized,
    Validated,
    Persisted,
    CacheRefreshed,
}

impl fmt::Display for EditStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditStage::Received => "received",
            EditStage::Normalized => "normalized",
            EditStage::Authorized => "authorized",
            EditStage::Validated => "validated",
            EditStage::Persisted => "persisted",
            EditStage::CacheRefreshed => "cache_refreshed",
        };
        f.write_str(name)
    }
}

/// Batch with canonical values and the access-class hint pulled out.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub changes: Vec<SettingChange>,
    pub type_hint: Option<String>,
}

#[derive(Debug)]
pub struct Authorized(Normalized);

#[derive(Debug)]
pub struct Validated(Normalized);

#[derive(Debug)]
pub struct Persisted {
    updated: Vec<SettingValue>,
    type_hint: Option<String>,
}

/// Canonical storage form: strings as-is, anything else as compact JSON.
pub fn canonical_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Collapse either request shape into one change list.
pub fn normalize(request: EditRequest) -> Result<Normalized> {
    let entries = match request {
        EditRequest::Shorthand { key, value } => vec![RawEdit { key, value }],
        EditRequest::Batch { settings } => settings,
    };

    let mut type_hint = None;
    let mut changes = Vec::with_capacity(entries.len());
    for entry in entries {
        let value = canonical_value(entry.value);
        if entry.key == TYPE_HINT_KEY {
            type_hint = Some(value);
        } else {
            changes.push(SettingChange { key: entry.key, value });
        }
    }

    if changes.is_empty() {
        return Err(Error::BadRequest("No settings provided to edit".into()));
    }

    Ok(Normalized { changes, type_hint })
}

/// Runs one edit batch through every stage.
pub struct EditPipeline {
    cache: Arc<dyn SettingsCacheBackend>,
    gate: AccessGate,
    validator: Arc<dyn DocumentValidator>,
    store: Arc<dyn SettingsStore>,
}

impl EditPipeline {
    pub fn new(
        cache: Arc<dyn SettingsCacheBackend>,
        gate: AccessGate,
        validator: Arc<dyn DocumentValidator>,
        store: Arc<dyn SettingsStore>,
    ) -> Self {
        Self { cache, gate, validator, store }
    }

    pub async fn run(&self, request: EditRequest, ctx: &Context) -> Result<SettingsResult> {
        tracing::debug!(stage = %EditStage::Received, "Edit batch received");

        let outcome = self.advance(request, ctx).await;
        match &outcome {
            Ok(result) => {
                metrics::record_edit("success");
                tracing::info!(
                    stage = %EditStage::CacheRefreshed,
                    count = result.settings.len(),
                    "Edit batch applied"
                );
            }
            Err(e) => {
                metrics::record_edit(e.kind().as_str());
                tracing::warn!(error = %e, kind = ?e.kind(), "Edit batch rejected");
            }
        }
        outcome
    }

    async fn advance(&self, request: EditRequest, ctx: &Context) -> Result<SettingsResult> {
        let normalized = normalize(request)?;
        tracing::debug!(stage = %EditStage::Normalized, count = normalized.changes.len(), "Edit batch normalized");

        // Structural veto ahead of authorization keeps the key invisible.
        if normalized.changes[0].key == PERMALINKS_KEY {
            return Err(Error::setting_not_found(PERMALINKS_KEY));
        }

        let authorized = self.authorize(normalized, ctx).await?;
        let validated = self.validate(authorized).await?;
        let persisted = self.persist(validated, ctx).await?;
        self.refresh(persisted).await
    }

    async fn authorize(&self, batch: Normalized, ctx: &Context) -> Result<Authorized> {
        for change in &batch.changes {
            let setting = self
                .cache
                .get(&change.key)
                .ok_or_else(|| Error::setting_not_found(&change.key))?;
            self.gate.can_access(&setting, Action::Edit, ctx).await?;
        }
        tracing::debug!(stage = %EditStage::Authorized, "Edit batch authorized");
        Ok(Authorized(batch))
    }

    async fn validate(&self, Authorized(batch): Authorized) -> Result<Validated> {
        self.validator.check(&batch.changes).await?;
        tracing::debug!(stage = %EditStage::Validated, "Edit batch validated");
        Ok(Validated(batch))
    }

    async fn persist(&self, Validated(batch): Validated, ctx: &Context) -> Result<Persisted> {
        let updated = self.store.edit(&batch.changes, ctx.actor.as_ref()).await?;
        tracing::debug!(stage = %EditStage::Persisted, count = updated.len(), "Edit batch persisted");
        Ok(Persisted { updated, type_hint: batch.type_hint })
    }

    async fn refresh(&self, persisted: Persisted) -> Result<SettingsResult> {
        let all = self.store.load_all().await?;
        self.cache.refresh(all);
        Ok(project(persisted.updated, persisted.type_hint.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_shorthand_and_batch_normalize_alike() {
        let short = normalize(EditRequest::shorthand("title", "X")).unwrap();
        let batch = normalize(EditRequest::batch(vec![RawEdit { key: "title".into(), value: json!("X") }])).unwrap();
        assert_eq!(short, batch);
    }

    #[test]
    fn test_non_string_values_are_serialized() {
        let batch = normalize(EditRequest::batch(vec![
            RawEdit { key: "is_private".into(), value: json!(true) },
            RawEdit { key: "navigation".into(), value: json!([{"label": "Home", "url": "/"}]) },
            RawEdit { key: "count".into(), value: json!(3) },
        ]))
        .unwrap();
        let values: Vec<_> = batch.changes.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["true", r#"[{"label":"Home","url":"/"}]"#, "3"]);
    }

    #[test]
    fn test_type_entry_becomes_hint() {
        let batch = normalize(EditRequest::batch(vec![
            RawEdit { key: "title".into(), value: json!("X") },
            RawEdit { key: "type".into(), value: json!("blog") },
        ]))
        .unwrap();
        assert_eq!(batch.type_hint.as_deref(), Some("blog"));
        assert_eq!(batch.changes.len(), 1);
    }

    #[test]
    fn test_empty_batch_is_bad_request() {
        let err = normalize(EditRequest::batch(vec![])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_request_shapes_deserialize() {
        let batch: EditRequest = serde_json::from_value(json!({"settings": [{"key": "title", "value": "X"}]})).unwrap();
        assert!(matches!(batch, EditRequest::Batch { .. }));

        let short: EditRequest = serde_json::from_value(json!({"key": "title", "value": 1})).unwrap();
        assert!(matches!(short, EditRequest::Shorthand { .. }));
    }
}
