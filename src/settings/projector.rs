//! Shapes settings into the response envelope.

use serde::{Deserialize, Serialize};

use super::types::SettingValue;

/// Response envelope for every settings operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsResult {
    pub settings: Vec<SettingValue>,
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Present only when a type filter was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(rename = "type")]
    pub class: String,
}

/// Filter `entries` by a comma-separated list of access classes and wrap them.
///
/// With no filter every entry passes through and `meta.filters` stays unset.
pub fn project<I>(entries: I, type_filter: Option<&str>) -> SettingsResult
where
    I: IntoIterator<Item = SettingValue>,
{
    match type_filter {
        Some(filter) => {
            let classes: Vec<&str> = filter.split(',').map(str::trim).collect();
            let settings = entries
                .into_iter()
                .filter(|s| classes.contains(&s.class.as_str()))
                .collect();
            SettingsResult {
                settings,
                meta: Meta { filters: Some(Filters { class: filter.to_string() }) },
            }
        }
        None => SettingsResult { settings: entries.into_iter().collect(), meta: Meta::default() },
    }
}
