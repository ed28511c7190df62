//! Built-in settings used when no persisted file exists.

use chrono::Utc;
use uuid::Uuid;

use crate::settings::types::{AccessClass, SettingValue};

const DEFAULTS: &[(&str, &str, &str)] = &[
    ("db_hash", "", "core"),
    ("next_update_check", "", "core"),
    ("notifications", "[]", "core"),
    ("session_secret", "", "core"),
    ("title", "My Site", "blog"),
    ("description", "Thoughts, stories and ideas.", "blog"),
    ("logo", "", "blog"),
    ("cover_image", "", "blog"),
    ("icon", "", "blog"),
    ("default_locale", "en", "blog"),
    ("active_timezone", "Etc/UTC", "blog"),
    ("force_i18n", "true", "blog"),
    ("permalinks", "/:slug/", "blog"),
    ("facebook", "", "blog"),
    ("twitter", "", "blog"),
    ("navigation", r#"[{"label":"Home","url":"/"}]"#, "blog"),
    ("ghost_head", "", "blog"),
    ("ghost_foot", "", "blog"),
    ("active_theme", "casper", "theme"),
    ("is_private", "false", "private"),
    ("password", "", "private"),
    ("public_hash", "", "private"),
];

/// Fresh rows for every built-in setting.
pub fn default_settings() -> Vec<SettingValue> {
    let now = Utc::now();
    DEFAULTS
        .iter()
        .map(|(key, value, class)| SettingValue {
            id: Uuid::new_v4().to_string(),
            key: key.to_string(),
            value: value.to_string(),
            class: AccessClass::from(*class),
            created_at: now,
            updated_at: now,
        })
        .collect()
}
