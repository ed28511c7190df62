//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the settings store and fill the cache
//! - Load the site application against the current routes artifact
//! - Assemble the settings API from its collaborators
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::permissions::RolePermissions;
use crate::routing::{RoutesArtifact, SiteReloader, SiteRouter};
use crate::settings::{SettingsApi, SettingsCache};
use crate::store::{MemoryStore, SchemaValidator, SettingsStore};

/// Build a ready-to-serve settings API from configuration.
pub async fn build_api(config: &ServiceConfig) -> Result<SettingsApi> {
    let store: Arc<dyn SettingsStore> = match &config.store.persistence_path {
        Some(path) => Arc::new(MemoryStore::load_from_file(path)?),
        None => Arc::new(MemoryStore::with_defaults()),
    };

    let cache = Arc::new(SettingsCache::new());
    cache.init(store.as_ref()).await?;

    let engine = Arc::new(RolePermissions::from_config(&config.permissions.roles)?);
    let validator = Arc::new(SchemaValidator::new(config.validation.max_value_bytes));

    let artifact = RoutesArtifact::new(config.routes_path());
    let site = Arc::new(SiteRouter::new(artifact.clone()));
    site.reload().await?;
    tracing::info!(path = %artifact.path().display(), "Site application loaded");

    Ok(SettingsApi::new(cache, engine, store, validator, artifact, site.clone(), site))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BrowseOptions, Context};

    #[tokio::test]
    async fn test_build_api_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.content.path = dir.path().to_path_buf();

        let api = build_api(&config).await.unwrap();
        let result = api.browse(&BrowseOptions::default()).await.unwrap();
        assert!(result.settings.iter().any(|s| s.key == "title"));
        assert_eq!(api.download(&Context::internal()).await.unwrap(), None);
    }
}
