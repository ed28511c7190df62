//! Persistence and document-checking collaborators.
//!
//! # Data Flow
//! ```text
//! startup:  SettingsStore::load_all → SettingsCache::init
//! edit:     DocumentValidator::check → SettingsStore::edit → load_all → cache refresh
//! ```
//!
//! # Design Decisions
//! - Both collaborators are traits; the pipeline never sees storage details
//! - Errors from either propagate unchanged
//! - `MemoryStore` optionally writes through to a JSON file

pub mod defaults;
pub mod memory;
pub mod validator;

use async_trait::async_trait;

use crate::error::Result;
use crate::settings::types::{Actor, SettingChange, SettingValue};

pub use memory::MemoryStore;
pub use validator::SchemaValidator;

/// Durable storage for settings rows.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Every stored setting.
    async fn load_all(&self) -> Result<Vec<SettingValue>>;

    /// Apply `changes` and return the updated rows, in the order given.
    async fn edit(&self, changes: &[SettingChange], actor: Option<&Actor>) -> Result<Vec<SettingValue>>;
}

/// Batch-level shape and schema checks.
#[async_trait]
pub trait DocumentValidator: Send + Sync {
    async fn check(&self, changes: &[SettingChange]) -> Result<()>;
}
