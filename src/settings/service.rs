//! Settings API: the operations callers invoke.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::permissions::{Action, PermissionEngine};
use crate::routing::{RoutesArtifact, RoutesConfigTransaction, SiteReloader, UrlGenerators};
use crate::store::{DocumentValidator, SettingsStore};

use super::cache::SettingsCacheBackend;
use super::edit::{EditPipeline, EditRequest};
use super::gate::{visible_to, AccessGate};
use super::projector::{project, SettingsResult};
use super::types::{AccessClass, Context, PERMALINKS_KEY};

/// Optional browse parameters.
#[derive(Debug, Clone, Default)]
pub struct BrowseOptions {
    /// Comma-separated access classes.
    pub class_filter: Option<String>,
    pub context: Option<Context>,
}

pub struct SettingsApi {
    cache: Arc<dyn SettingsCacheBackend>,
    gate: AccessGate,
    pipeline: EditPipeline,
    routes: RoutesConfigTransaction,
}

impl SettingsApi {
    pub fn new(
        cache: Arc<dyn SettingsCacheBackend>,
        engine: Arc<dyn PermissionEngine>,
        store: Arc<dyn SettingsStore>,
        validator: Arc<dyn DocumentValidator>,
        artifact: RoutesArtifact,
        generators: Arc<dyn UrlGenerators>,
        site: Arc<dyn SiteReloader>,
    ) -> Self {
        let gate = AccessGate::new(engine);
        let pipeline = EditPipeline::new(cache.clone(), gate.clone(), validator, store);
        let routes = RoutesConfigTransaction::new(artifact, gate.clone(), generators, site);
        Self { cache, gate, pipeline, routes }
    }

    pub fn routes(&self) -> &RoutesConfigTransaction {
        &self.routes
    }

    /// All settings visible to the caller, narrowed by `class_filter`.
    ///
    /// Without a context only blog settings are candidates.
    pub async fn browse(&self, options: &BrowseOptions) -> Result<SettingsResult> {
        let filter = options.class_filter.as_deref();

        let Some(ctx) = &options.context else {
            let public = self
                .cache
                .get_all()
                .into_iter()
                .filter(|s| s.class == AccessClass::Blog && s.key != PERMALINKS_KEY);
            return Ok(project(public, filter));
        };

        self.gate.can_browse(ctx).await?;

        let visible = self.cache.get_all().into_iter().filter(|s| visible_to(s, ctx));
        Ok(project(visible, filter))
    }

    /// A single setting by key.
    pub async fn read(&self, key: &str, ctx: &Context) -> Result<SettingsResult> {
        let setting = self.cache.get(key).ok_or_else(|| Error::setting_not_found(key))?;
        self.gate.can_access(&setting, Action::Read, ctx).await?;
        Ok(project([setting], None))
    }

    pub async fn edit(&self, request: EditRequest, ctx: &Context) -> Result<SettingsResult> {
        self.pipeline.run(request, ctx).await
    }

    pub async fn upload(&self, source: &Path, ctx: &Context) -> Result<()> {
        self.routes.upload(source, ctx).await
    }

    pub async fn download(&self, ctx: &Context) -> Result<Option<String>> {
        self.routes.download(ctx).await
    }
}
