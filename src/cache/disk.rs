//! On-disk JSON container for drug records.
//!
//! One serialized object keyed by canonical name, at a configurable path.
//! Reads tolerate a missing file (empty container) and report a corrupt one
//! without failing the process. Writes are read-modify-write under a
//! single-writer lock and land via a tmp-file rename, so the container is
//! never truncated or interleaved mid-write; concurrent writers serialize,
//! last writer wins on record content.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::{CanonicalName, DrugRecord};
use crate::{EirError, Result};

/// Durable store for the canonical-name → record mapping.
#[derive(Debug)]
pub struct DiskStore {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: Mutex<()>,
}

impl DiskStore {
    /// Open a store at `path`, creating parent directories as needed.
    ///
    /// Fails with [`EirError::Configuration`] when the path cannot host the
    /// container (uncreatable parent, or the path is a directory). An
    /// existing corrupt container is logged and left in place; the next
    /// successful [`put`](Self::put) rewrites it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EirError::Configuration(format!(
                        "failed to create cache dir {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        if path.is_dir() {
            return Err(EirError::Configuration(format!(
                "cache path {} is a directory",
                path.display()
            )));
        }

        // Startup probe, purely informational.
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<CanonicalName, DrugRecord>>(
                &content,
            ) {
                Ok(entries) => {
                    info!(count = entries.len(), path = %path.display(), "loaded drug cache");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt drug cache, starting empty");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no existing drug cache");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable drug cache, starting empty");
            }
        }

        let tmp_path = path.with_extension("json.tmp");
        Ok(Self {
            path,
            tmp_path,
            writer: Mutex::new(()),
        })
    }

    /// Filesystem path of the container.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole container.
    ///
    /// A missing file is an empty container; an unreadable or corrupt file
    /// is an [`EirError::Persistence`].
    pub async fn load(&self) -> Result<BTreeMap<CanonicalName, DrugRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(EirError::Persistence(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_str(&content).map_err(|e| {
            EirError::Persistence(format!("corrupt container {}: {e}", self.path.display()))
        })
    }

    /// Read one record from the container.
    pub async fn get(&self, name: &CanonicalName) -> Result<Option<DrugRecord>> {
        Ok(self.load().await?.remove(name))
    }

    /// Insert one record and persist the container.
    ///
    /// Read-modify-write under the writer lock; the updated container is
    /// written to a tmp sibling and renamed over the old file.
    pub async fn put(&self, name: &CanonicalName, record: &DrugRecord) -> Result<()> {
        let _guard = self.writer.lock().await;
        let mut entries = match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                // The container is already lost; rewrite it around this record.
                warn!(error = %e, "container unreadable during put, rewriting");
                BTreeMap::new()
            }
        };
        entries.insert(name.clone(), record.clone());

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| EirError::Persistence(format!("failed to serialize container: {e}")))?;
        tokio::fs::write(&self.tmp_path, json).await.map_err(|e| {
            EirError::Persistence(format!("failed to write {}: {e}", self.tmp_path.display()))
        })?;
        tokio::fs::rename(&self.tmp_path, &self.path).await.map_err(|e| {
            EirError::Persistence(format!(
                "failed to rename {} to {}: {e}",
                self.tmp_path.display(),
                self.path.display()
            ))
        })
    }

    /// Number of records currently persisted (0 when missing or unreadable).
    pub async fn len(&self) -> usize {
        self.load().await.map(|entries| entries.len()).unwrap_or(0)
    }

    /// Delete the container file, if present.
    pub async fn wipe(&self) -> Result<()> {
        let _guard = self.writer.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EirError::Persistence(format!(
                "failed to delete {}: {e}",
                self.path.display()
            ))),
        }
    }
}
