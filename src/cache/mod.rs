//! Caching subsystem.
//!
//! Two tiers with different lifetimes:
//!
//! - **memory tier** — `moka::sync::Cache`, process lifetime, O(1) lookups.
//!   Unbounded, no TTL: drug labels are a slowly-changing reference dataset
//!   and entries stay valid until [`TieredCache::clear`] removes them.
//! - **disk tier** — [`DiskStore`], one JSON container that survives
//!   restarts and is the sole source of durable truth.
//!
//! `get` consults memory first, then disk, promoting a disk hit into memory.
//! `put` writes memory first, then disk; a persistence failure is logged and
//! counted but never surfaced, so the record keeps serving from memory for
//! the rest of the process lifetime (a restart loses it).

pub mod disk;

pub use disk::DiskStore;

use std::path::{Path, PathBuf};

use metrics::counter;
use serde::Serialize;
use tracing::warn;

use crate::telemetry;
use crate::types::{CanonicalName, DrugRecord};
use crate::Result;

/// Point-in-time entry counts per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries in the memory tier.
    pub memory_entries: u64,
    /// Records persisted in the disk container.
    pub disk_entries: usize,
}

/// Two-tier drug-record cache: in-memory map over a durable JSON container.
///
/// Constructed once at startup and injected into the gateway; safe for
/// concurrent `get`/`put` from many in-flight fetches. The memory tier
/// relies on moka's internal synchronization, the disk tier on its
/// single-writer lock and atomic renames.
pub struct TieredCache {
    memory: moka::sync::Cache<CanonicalName, DrugRecord>,
    disk: DiskStore,
}

impl TieredCache {
    /// Open a tiered cache backed by the JSON container at `path`.
    ///
    /// Fatal ([`EirError::Configuration`](crate::EirError::Configuration))
    /// when the path cannot host the container; an existing corrupt
    /// container is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            memory: moka::sync::Cache::builder().build(),
            disk: DiskStore::open(path)?,
        })
    }

    /// Look up a record by canonical name.
    ///
    /// Memory tier first; on miss, the disk tier, promoting a hit into
    /// memory before returning it. A disk read failure degrades to a miss so
    /// the caller falls through to a remote fetch.
    pub async fn get(&self, name: &CanonicalName) -> Option<DrugRecord> {
        if let Some(record) = self.memory.get(name) {
            counter!(telemetry::CACHE_HITS_TOTAL, "tier" => "memory").increment(1);
            return Some(record);
        }

        match self.disk.get(name).await {
            Ok(Some(record)) => {
                self.memory.insert(name.clone(), record.clone());
                counter!(telemetry::CACHE_HITS_TOTAL, "tier" => "disk").increment(1);
                Some(record)
            }
            Ok(None) => {
                counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
            Err(e) => {
                warn!(name = %name, error = %e, "disk read failed, treating as miss");
                counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert a record into both tiers.
    ///
    /// The memory write always takes effect. A disk failure is logged and
    /// counted, never propagated: a successful remote fetch must not turn
    /// into a failed batch slot because persistence misbehaved.
    pub async fn put(&self, name: &CanonicalName, record: DrugRecord) {
        self.memory.insert(name.clone(), record.clone());
        if let Err(e) = self.disk.put(name, &record).await {
            warn!(name = %name, error = %e, "failed to persist record");
            counter!(telemetry::CACHE_PERSIST_FAILURES_TOTAL).increment(1);
        }
    }

    /// Entry counts for both tiers.
    pub async fn stats(&self) -> CacheStats {
        self.memory.run_pending_tasks();
        CacheStats {
            memory_entries: self.memory.entry_count(),
            disk_entries: self.disk.len().await,
        }
    }

    /// Drop every entry from both tiers and delete the container file.
    pub async fn clear(&self) -> Result<()> {
        self.memory.invalidate_all();
        self.disk.wipe().await
    }

    /// Filesystem path of the disk container.
    pub fn path(&self) -> &Path {
        self.disk.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DrugRecord {
        DrugRecord::new(name, "test")
    }

    #[tokio::test]
    async fn put_then_get_returns_equal_record() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TieredCache::open(dir.path().join("cache.json")).unwrap();

        let name = CanonicalName::new("amlodipine");
        let rec = record("Amlodipine");
        cache.put(&name, rec.clone()).await;

        assert_eq!(cache.get(&name).await, Some(rec));
    }

    #[tokio::test]
    async fn disk_hit_promotes_into_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let name = CanonicalName::new("metformin");

        // Populate through one cache instance, read through a fresh one.
        let first = TieredCache::open(&path).unwrap();
        first.put(&name, record("Metformin")).await;
        drop(first);

        let second = TieredCache::open(&path).unwrap();
        let stats = second.stats().await;
        assert_eq!(stats.memory_entries, 0);
        assert_eq!(stats.disk_entries, 1);

        assert!(second.get(&name).await.is_some());
        assert_eq!(second.stats().await.memory_entries, 1);
    }

    #[tokio::test]
    async fn persistence_failure_keeps_memory_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let cache = TieredCache::open(&path).unwrap();

        // Turn the container path into a directory so the rename fails.
        std::fs::create_dir(&path).unwrap();

        let name = CanonicalName::new("aspirin");
        cache.put(&name, record("Aspirin")).await;

        // Memory still serves the record.
        assert!(cache.get(&name).await.is_some());
    }

    #[tokio::test]
    async fn clear_wipes_both_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TieredCache::open(dir.path().join("cache.json")).unwrap();

        let name = CanonicalName::new("warfarin");
        cache.put(&name, record("Warfarin")).await;
        cache.clear().await.unwrap();

        assert_eq!(cache.get(&name).await, None);
        let stats = cache.stats().await;
        assert_eq!(stats.memory_entries, 0);
        assert_eq!(stats.disk_entries, 0);
    }
}
