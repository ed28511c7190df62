//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use site_settings::error::{Error, Result};
use site_settings::permissions::{Action, PermissionEngine, Target};
use site_settings::routing::{RoutesArtifact, SiteReloader, UrlGenerators};
use site_settings::settings::{AccessClass, Actor, Context, SettingChange, SettingValue, SettingsApi, SettingsCache};
use site_settings::store::{MemoryStore, SchemaValidator, SettingsStore};

pub fn setting(key: &str, value: &str, class: &str) -> SettingValue {
    let now = Utc::now();
    SettingValue {
        id: format!("id-{}", key),
        key: key.to_string(),
        value: value.to_string(),
        class: AccessClass::from(class),
        created_at: now,
        updated_at: now,
    }
}

pub fn fixture_settings() -> Vec<SettingValue> {
    vec![
        setting("title", "Fixture Blog", "blog"),
        setting("description", "A fixture", "blog"),
        setting("permalinks", "/:slug/", "blog"),
        setting("db_hash", "abc123", "core"),
        setting("active_theme", "casper", "theme"),
        setting("is_private", "false", "private"),
    ]
}

pub fn editor() -> Context {
    Context::for_actor(Actor { id: "editor-1".into(), roles: vec!["Editor".into()] })
}

/// Permission engine with a fixed verdict plus per-key denials.
#[derive(Default)]
pub struct ScriptedEngine {
    pub deny_all: AtomicBool,
    pub denied_keys: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn deny_key(&self, key: &str) {
        self.denied_keys.lock().unwrap().insert(key.to_string());
    }
}

#[async_trait]
impl PermissionEngine for ScriptedEngine {
    async fn can(&self, _ctx: &Context, _action: Action, target: &Target) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.deny_all.load(Ordering::SeqCst) {
            return Err(Error::PermissionDenied("scripted denial".into()));
        }
        if let Target::Setting(key) = target {
            if self.denied_keys.lock().unwrap().contains(key) {
                return Err(Error::PermissionDenied(format!("scripted denial for {}", key)));
            }
        }
        Ok(())
    }
}

/// Store wrapper counting persistence calls.
pub struct CountingStore {
    pub inner: MemoryStore,
    pub edits: AtomicUsize,
}

#[async_trait]
impl SettingsStore for CountingStore {
    async fn load_all(&self) -> Result<Vec<SettingValue>> {
        self.inner.load_all().await
    }

    async fn edit(&self, changes: &[SettingChange], actor: Option<&Actor>) -> Result<Vec<SettingValue>> {
        self.edits.fetch_add(1, Ordering::SeqCst);
        self.inner.edit(changes, actor).await
    }
}

/// Reloader that reads the artifact on every reload and fails when it
/// contains `fail_marker`.
pub struct ScriptedReloader {
    pub artifact: RoutesArtifact,
    pub fail_marker: Mutex<Option<String>>,
    pub always_fail: AtomicBool,
    pub seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedReloader {
    pub fn new(artifact: RoutesArtifact) -> Self {
        Self {
            artifact,
            fail_marker: Mutex::new(None),
            always_fail: AtomicBool::new(false),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_when_contains(&self, marker: &str) {
        *self.fail_marker.lock().unwrap() = Some(marker.to_string());
    }

    pub fn seen(&self) -> Vec<Option<String>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SiteReloader for ScriptedReloader {
    async fn reload(&self) -> Result<()> {
        let contents = self.artifact.read().await?;
        self.seen.lock().unwrap().push(contents.clone());

        if self.always_fail.load(Ordering::SeqCst) {
            return Err(Error::System("site application unavailable".into()));
        }
        let marker = self.fail_marker.lock().unwrap().clone();
        if let (Some(marker), Some(contents)) = (marker, contents) {
            if contents.contains(&marker) {
                return Err(Error::System("routes rejected by site application".into()));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingGenerators {
    pub releases: AtomicUsize,
}

impl UrlGenerators for CountingGenerators {
    fn release_resources(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub api: SettingsApi,
    pub cache: Arc<SettingsCache>,
    pub store: Arc<CountingStore>,
    pub engine: Arc<ScriptedEngine>,
    pub reloader: Arc<ScriptedReloader>,
    pub generators: Arc<CountingGenerators>,
    pub artifact: RoutesArtifact,
    pub dir: TempDir,
}

impl Harness {
    pub fn edits(&self) -> usize {
        self.store.edits.load(Ordering::SeqCst)
    }

    /// Write `contents` to a file outside the settings directory.
    pub async fn upload_source(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }
}

pub async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CountingStore { inner: MemoryStore::new(fixture_settings()), edits: AtomicUsize::new(0) });
    let cache = Arc::new(SettingsCache::new());
    cache.init(store.as_ref()).await.unwrap();

    let engine = Arc::new(ScriptedEngine::default());
    let artifact = RoutesArtifact::in_content(dir.path(), "settings", "routes.yaml");
    let reloader = Arc::new(ScriptedReloader::new(artifact.clone()));
    let generators = Arc::new(CountingGenerators::default());

    let api = SettingsApi::new(
        cache.clone(),
        engine.clone(),
        store.clone(),
        Arc::new(SchemaValidator::default()),
        artifact.clone(),
        generators.clone(),
        reloader.clone(),
    );

    Harness { api, cache, store, engine, reloader, generators, artifact, dir }
}
