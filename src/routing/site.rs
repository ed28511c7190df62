//! The site application that consumes the routes artifact.
//!
//! # Responsibilities
//! - Parse the artifact into a `RoutesDocument`
//! - Build one URL generator per route, collection and taxonomy
//! - Release generators without discarding the loaded document
//!
//! # Design Decisions
//! - State lives behind `ArcSwap`; a reload swaps in a fully built state
//! - A parse failure leaves the previous state untouched and surfaces as a
//!   reload failure
//! - A missing artifact loads the built-in default routes

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::artifact::RoutesArtifact;

/// Rebuilds the dependent application against the current artifact.
#[async_trait]
pub trait SiteReloader: Send + Sync {
    async fn reload(&self) -> Result<()>;
}

/// URL-generation resources tied to a loaded routes configuration.
pub trait UrlGenerators: Send + Sync {
    /// Drop generator resources only; the next reload recreates them.
    fn release_resources(&self);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub permalink: String,
    #[serde(default)]
    pub template: Option<String>,
}

/// Parsed routes artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesDocument {
    #[serde(default)]
    pub routes: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionConfig>,
    #[serde(default)]
    pub taxonomies: BTreeMap<String, String>,
}

impl RoutesDocument {
    pub fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| Error::System(format!("Invalid routes configuration: {}", e)))
    }

    pub fn defaults() -> Self {
        let mut collections = BTreeMap::new();
        collections.insert(
            "/".to_string(),
            CollectionConfig { permalink: "/{slug}/".into(), template: Some("index".into()) },
        );
        let mut taxonomies = BTreeMap::new();
        taxonomies.insert("tag".to_string(), "/tag/{slug}/".to_string());
        taxonomies.insert("author".to_string(), "/author/{slug}/".to_string());
        Self { routes: BTreeMap::new(), collections, taxonomies }
    }
}

/// A resolvable URL pattern produced from the routes document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlGenerator {
    pub kind: &'static str,
    pub identifier: String,
    pub permalink: String,
}

#[derive(Debug, Default)]
struct SiteState {
    document: RoutesDocument,
    generators: Vec<UrlGenerator>,
}

/// YAML-backed site application.
pub struct SiteRouter {
    artifact: RoutesArtifact,
    state: ArcSwap<SiteState>,
}

impl SiteRouter {
    pub fn new(artifact: RoutesArtifact) -> Self {
        Self { artifact, state: ArcSwap::from_pointee(SiteState::default()) }
    }

    pub fn document(&self) -> RoutesDocument {
        self.state.load().document.clone()
    }

    pub fn generators(&self) -> Vec<UrlGenerator> {
        self.state.load().generators.clone()
    }

    fn build_generators(document: &RoutesDocument) -> Vec<UrlGenerator> {
        let routes = document.routes.keys().map(|url| UrlGenerator {
            kind: "route",
            identifier: url.clone(),
            permalink: url.clone(),
        });
        let collections = document.collections.iter().map(|(root, c)| UrlGenerator {
            kind: "collection",
            identifier: root.clone(),
            permalink: c.permalink.clone(),
        });
        let taxonomies = document.taxonomies.iter().map(|(name, permalink)| UrlGenerator {
            kind: "taxonomy",
            identifier: name.clone(),
            permalink: permalink.clone(),
        });
        routes.chain(collections).chain(taxonomies).collect()
    }
}

#[async_trait]
impl SiteReloader for SiteRouter {
    async fn reload(&self) -> Result<()> {
        let document = match self.artifact.read().await? {
            Some(contents) => RoutesDocument::parse(&contents)?,
            None => RoutesDocument::defaults(),
        };
        let generators = Self::build_generators(&document);
        tracing::info!(generators = generators.len(), "Site routes loaded");
        self.state.store(Arc::new(SiteState { document, generators }));
        Ok(())
    }
}

impl UrlGenerators for SiteRouter {
    fn release_resources(&self) {
        let current = self.state.load_full();
        self.state.store(Arc::new(SiteState { document: current.document.clone(), generators: Vec::new() }));
        tracing::debug!("URL generators released");
    }
}
