//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration for the settings service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Content directory layout.
    pub content: ContentConfig,

    /// Settings persistence.
    pub store: StoreConfig,

    /// Edit batch validation limits.
    pub validation: ValidationConfig,

    /// Bearer tokens accepted by the HTTP surface.
    pub auth: AuthConfig,

    /// Role → action grants for the bundled permission engine.
    pub permissions: PermissionsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

impl ServiceConfig {
    pub fn routes_path(&self) -> PathBuf {
        self.content.path.join(&self.content.settings_dir).join(&self.content.routes_file)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:2368").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:2368".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Where the content tree and routes artifact live.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content root directory.
    pub path: PathBuf,

    /// Settings directory, relative to `path`.
    pub settings_dir: String,

    /// File name of the routes artifact.
    pub routes_file: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("content"),
            settings_dir: "settings".to_string(),
            routes_file: "routes.yaml".to_string(),
        }
    }
}

/// Settings persistence.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file the settings table is loaded from and written back to.
    /// Memory only when unset.
    pub persistence_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Largest accepted setting value, in bytes.
    pub max_value_bytes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_value_bytes: 64 * 1024 }
    }
}

/// A bearer token bound to an actor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    pub token: String,
    pub actor: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<TokenConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Role name → allowed actions (`browse`, `read`, `edit`).
    pub roles: HashMap<String, Vec<String>>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        let all = vec!["browse".to_string(), "read".to_string(), "edit".to_string()];
        let mut roles = HashMap::new();
        roles.insert("Owner".to_string(), all.clone());
        roles.insert("Administrator".to_string(), all);
        roles.insert("Editor".to_string(), vec!["browse".to_string(), "read".to_string()]);
        Self { roles }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format: "pretty" or "compact".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
