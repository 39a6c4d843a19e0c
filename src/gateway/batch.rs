//! Batch lookup pipeline: resolve, dedupe, tiered cache, bounded fetch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::cache::TieredCache;
use crate::providers::DrugSource;
use crate::resolver::FuzzyResolver;
use crate::telemetry;
use crate::types::{CanonicalName, DrugRecord};
use crate::{EirError, Result};

/// Gateway for batched drug-label lookups.
///
/// A batch runs through five stages: each query is normalized and fuzzily
/// resolved against the reference lexicon, distinct names are deduplicated,
/// the tiered cache is consulted, misses are fetched from the remote source
/// under a gateway-wide concurrency bound, and outcomes are merged back so
/// that output position `i` always answers `queries[i]`.
///
/// Failures stay per-item: one bad lookup never aborts the rest of the
/// batch. The concurrency bound is shared across all batches on the same
/// gateway, so overlapping callers queue for fetch slots rather than
/// multiplying external load.
pub struct DrugGateway {
    source: Arc<dyn DrugSource>,
    cache: TieredCache,
    resolver: FuzzyResolver,
    limiter: Semaphore,
    fetch_timeout: Duration,
}

impl DrugGateway {
    pub(crate) fn new(
        source: Arc<dyn DrugSource>,
        cache: TieredCache,
        resolver: FuzzyResolver,
        max_concurrent_fetches: usize,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            resolver,
            limiter: Semaphore::new(max_concurrent_fetches),
            fetch_timeout,
        }
    }

    /// The tiered cache backing this gateway.
    pub fn cache(&self) -> &TieredCache {
        &self.cache
    }

    /// The fuzzy resolver backing this gateway.
    pub fn resolver(&self) -> &FuzzyResolver {
        &self.resolver
    }

    /// Name of the configured remote source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Look up a single drug by generic or misspelled name.
    ///
    /// One-element convenience over [`DrugGateway::resolve_batch`].
    pub async fn lookup(&self, query: &str) -> Result<DrugRecord> {
        let mut results = self.resolve_batch(&[query]).await;
        results
            .pop()
            .unwrap_or_else(|| Err(EirError::Unresolved(query.to_string())))
    }

    /// Resolve a batch of drug-name queries to label records.
    ///
    /// Returns one result per query, in query order. Queries that fail fuzzy
    /// resolution come back as [`EirError::Unresolved`] in their slot;
    /// duplicate queries within the batch share a single cache check and at
    /// most one remote fetch, and every duplicate position receives the same
    /// outcome.
    #[instrument(skip(self, queries), fields(batch_size = queries.len()))]
    pub async fn resolve_batch(&self, queries: &[&str]) -> Vec<Result<DrugRecord>> {
        let start = Instant::now();

        // Slots start as unresolved; cache hits and fetch outcomes overwrite
        // them below.
        let mut outcomes: Vec<Result<DrugRecord>> = queries
            .iter()
            .map(|&q| Err(EirError::Unresolved(q.to_string())))
            .collect();

        let mut pending: BTreeMap<CanonicalName, Vec<usize>> = BTreeMap::new();
        for (idx, &query) in queries.iter().enumerate() {
            match self.resolver.resolve(query) {
                Some(name) => pending.entry(name).or_default().push(idx),
                None => {
                    metrics::counter!(telemetry::UNRESOLVED_TOTAL).increment(1);
                    debug!(query, "no confident match in reference lexicon");
                }
            }
        }
        let unresolved = queries.len() - pending.values().map(Vec::len).sum::<usize>();

        // Tier check per distinct name; a hit fans back out to every
        // position that resolved to it.
        let mut misses: Vec<(CanonicalName, Vec<usize>)> = Vec::new();
        let mut hits = 0usize;
        for (name, positions) in pending {
            match self.cache.get(&name).await {
                Some(record) => {
                    hits += 1;
                    for idx in positions {
                        outcomes[idx] = Ok(record.clone());
                    }
                }
                None => misses.push((name, positions)),
            }
        }

        let fetched = misses.len();
        let results = join_all(misses.iter().map(|(name, _)| self.fetch_one(name))).await;
        for ((_, positions), outcome) in misses.into_iter().zip(results) {
            for idx in positions {
                outcomes[idx] = outcome.clone();
            }
        }

        let any_err = outcomes.iter().any(Result::is_err);
        let any_ok = outcomes.iter().any(Result::is_ok);
        let status = if !any_err {
            "ok"
        } else if any_ok {
            "partial"
        } else {
            "error"
        };
        metrics::counter!(telemetry::BATCHES_TOTAL, "status" => status).increment(1);
        metrics::histogram!(telemetry::BATCH_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        info!(hits, fetched, unresolved, status, "batch lookup complete");

        outcomes
    }

    /// Fetch one canonical name from the remote source and cache the result.
    ///
    /// Waits for a fetch slot (queueing, never rejecting), applies the
    /// per-fetch timeout, and releases the slot before touching the cache so
    /// disk writes never occupy remote capacity.
    async fn fetch_one(&self, name: &CanonicalName) -> Result<DrugRecord> {
        let permit = self.limiter.acquire().await.expect("semaphore closed");
        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.fetch_timeout, self.source.fetch(name)).await
        {
            Ok(result) => result,
            Err(_) => Err(EirError::Timeout(self.fetch_timeout)),
        };
        drop(permit);

        let status = match &outcome {
            Ok(_) => "ok",
            Err(EirError::Timeout(_)) => "timeout",
            Err(_) => "error",
        };
        metrics::counter!(telemetry::FETCHES_TOTAL,
            "source" => self.source.name().to_owned(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::FETCH_DURATION_SECONDS,
            "source" => self.source.name().to_owned(),
        )
        .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(record) => {
                self.cache.put(name, record.clone()).await;
                Ok(record)
            }
            Err(e) => {
                warn!(name = %name, source = self.source.name(), error = %e, "drug lookup failed");
                Err(e)
            }
        }
    }
}
