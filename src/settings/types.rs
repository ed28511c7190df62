//! Settings data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key reserved for the permalink structure. Never readable or editable here.
pub const PERMALINKS_KEY: &str = "permalinks";

/// Key selecting the active theme. Changed only through the theme workflow.
pub const ACTIVE_THEME_KEY: &str = "active_theme";

/// Synthetic batch entry carrying the access-class hint of an edit.
pub const TYPE_HINT_KEY: &str = "type";

/// Access class of a setting, governing default visibility and edit rights.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccessClass {
    Core,
    Blog,
    Theme,
    Private,
    Other(String),
}

impl AccessClass {
    pub fn as_str(&self) -> &str {
        match self {
            AccessClass::Core => "core",
            AccessClass::Blog => "blog",
            AccessClass::Theme => "theme",
            AccessClass::Private => "private",
            AccessClass::Other(name) => name,
        }
    }
}

impl From<String> for AccessClass {
    fn from(value: String) -> Self {
        match value.as_str() {
            "core" => AccessClass::Core,
            "blog" => AccessClass::Blog,
            "theme" => AccessClass::Theme,
            "private" => AccessClass::Private,
            _ => AccessClass::Other(value),
        }
    }
}

impl From<&str> for AccessClass {
    fn from(value: &str) -> Self {
        AccessClass::from(value.to_string())
    }
}

impl From<AccessClass> for String {
    fn from(value: AccessClass) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed configuration entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingValue {
    /// Persistence identifier, owned by the store.
    pub id: String,
    pub key: String,
    /// Canonical string form of the payload.
    pub value: String,
    #[serde(rename = "type")]
    pub class: AccessClass,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SettingValue {
    pub fn is_core(&self) -> bool {
        self.class == AccessClass::Core
    }
}

/// A validated key/value change, value already in canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingChange {
    pub key: String,
    pub value: String,
}

/// The caller on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Caller context. `internal` marks calls originating inside the system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub internal: bool,
    pub actor: Option<Actor>,
}

impl Context {
    pub fn internal() -> Self {
        Self { internal: true, actor: None }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_actor(actor: Actor) -> Self {
        Self { internal: false, actor: Some(actor) }
    }
}
