//! Routes artifact file handling.
//!
//! # Responsibilities
//! - Resolve the artifact and backup locations
//! - Name backups from a capture timestamp
//! - Replace the artifact in one atomic step
//!
//! # Design Decisions
//! - Replacement copies into a hidden sibling file, then renames over the
//!   artifact; a reader sees the old file or the new one, never a partial write
//! - Backups live next to the artifact so the rename never crosses filesystems

use chrono::{DateTime, NaiveDateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};

const BACKUP_PREFIX: &str = "routes-";
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Location of the routing-configuration artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutesArtifact {
    path: PathBuf,
}

impl RoutesArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<content>/<settings_dir>/<file_name>`
    pub fn in_content(content: &Path, settings_dir: &str, file_name: &str) -> Self {
        Self::new(content.join(settings_dir).join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    fn extension(&self) -> &str {
        self.path.extension().and_then(|e| e.to_str()).unwrap_or("yaml")
    }

    /// Backup path for a capture at `at`, second granularity.
    pub fn backup_path(&self, at: DateTime<Utc>) -> PathBuf {
        self.dir()
            .join(format!("{}{}.{}", BACKUP_PREFIX, at.format(BACKUP_TIME_FORMAT), self.extension()))
    }

    /// Whether `path` is named like one of this artifact's backups.
    pub fn is_backup(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.strip_prefix(BACKUP_PREFIX)
            .and_then(|rest| rest.strip_suffix(self.extension()))
            .and_then(|rest| rest.strip_suffix('.'))
            .is_some_and(|stamp| NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).is_ok())
    }

    pub async fn exists(&self) -> io::Result<bool> {
        tokio::fs::try_exists(&self.path).await
    }

    /// Raw contents, `None` when the artifact does not exist.
    pub async fn read(&self) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Copy the current artifact to a timestamped backup.
    pub async fn backup(&self, at: DateTime<Utc>) -> io::Result<PathBuf> {
        let backup = self.backup_path(at);
        tokio::fs::copy(&self.path, &backup).await?;
        Ok(backup)
    }

    /// Atomically replace the artifact with the contents of `source`.
    pub async fn replace_from(&self, source: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(self.dir()).await?;
        let staging = self.staging_path();
        if let Err(e) = tokio::fs::copy(source, &staging).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        tokio::fs::rename(&staging, &self.path).await
    }

    pub async fn remove(&self) -> io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("routes.yaml");
        self.dir().join(format!(".{}.tmp", name))
    }
}
