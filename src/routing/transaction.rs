//! Backup / replace / reload protocol for the routes artifact.
//!
//! # Responsibilities
//! - Gate uploads on `edit` and downloads on `browse`
//! - Back up, replace, release generators and reload on upload
//! - Restore the backup and reload again when the reload fails
//!
//! # Design Decisions
//! - One compensating action, attempted once; a failure inside it propagates
//! - The caller sees the original failure when the rollback succeeds
//! - Uploads are serialized by a single-writer lock so a concurrent upload
//!   cannot restore another upload's backup
//! - With no prior artifact, rollback removes the new file instead
//! - Download read failures become a fixed not-found message, except host
//!   failures (permissions, timeouts) which surface as I/O errors

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::permissions::Action;
use crate::settings::gate::AccessGate;
use crate::settings::types::Context;

use super::artifact::RoutesArtifact;
use super::site::{SiteReloader, UrlGenerators};

pub struct RoutesConfigTransaction {
    artifact: RoutesArtifact,
    gate: AccessGate,
    generators: Arc<dyn UrlGenerators>,
    site: Arc<dyn SiteReloader>,
    writer: Mutex<()>,
}

impl RoutesConfigTransaction {
    pub fn new(
        artifact: RoutesArtifact,
        gate: AccessGate,
        generators: Arc<dyn UrlGenerators>,
        site: Arc<dyn SiteReloader>,
    ) -> Self {
        Self { artifact, gate, generators, site, writer: Mutex::new(()) }
    }

    pub fn artifact(&self) -> &RoutesArtifact {
        &self.artifact
    }

    /// Install the file at `source` as the new routes artifact.
    pub async fn upload(&self, source: &Path, ctx: &Context) -> Result<()> {
        self.gate.can_manage(ctx, Action::Edit).await?;

        let _guard = self.writer.lock().await;

        let backup = if self.artifact.exists().await? {
            let path = self.artifact.backup(Utc::now()).await?;
            tracing::info!(backup = %path.display(), "Routes artifact backed up");
            Some(path)
        } else {
            None
        };

        match self.install(source).await {
            Ok(()) => {
                metrics::record_upload("success");
                tracing::info!(path = %self.artifact.path().display(), "Routes artifact replaced");
                Ok(())
            }
            Err(original) => {
                tracing::error!(error = %original, "Routes upload failed, restoring previous artifact");
                metrics::record_upload("rolled_back");
                self.rollback(backup.as_deref()).await?;
                Err(original)
            }
        }
    }

    /// Current artifact contents, `None` when no artifact exists.
    pub async fn download(&self, ctx: &Context) -> Result<Option<String>> {
        self.gate.can_manage(ctx, Action::Browse).await?;

        self.artifact.read().await.map_err(|e| {
            tracing::warn!(error = %e, path = %self.artifact.path().display(), "Failed to read routes artifact");
            if is_system_failure(&e) {
                Error::Io(e)
            } else {
                Error::NotFound("Routes configuration could not be read.".to_string())
            }
        })
    }

    async fn install(&self, source: &Path) -> Result<()> {
        self.artifact.replace_from(source).await?;
        self.generators.release_resources();
        self.site.reload().await
    }

    async fn rollback(&self, backup: Option<&Path>) -> Result<()> {
        metrics::record_rollback();
        match backup {
            Some(path) => self.artifact.replace_from(path).await?,
            None => self.artifact.remove().await?,
        }
        self.site.reload().await.map_err(|e| {
            tracing::error!(error = %e, "Reload after routes rollback failed");
            e
        })?;
        tracing::info!("Routes artifact restored");
        Ok(())
    }

    /// Backups currently on disk, oldest first.
    pub async fn backups(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut entries = match tokio::fs::read_dir(self.artifact.dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(found),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if self.artifact.is_backup(&path) {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }
}

/// Read failures that say something about the host rather than the artifact.
fn is_system_failure(e: &std::io::Error) -> bool {
    use std::io::ErrorKind::*;
    matches!(e.kind(), PermissionDenied | Interrupted | TimedOut | OutOfMemory)
}
