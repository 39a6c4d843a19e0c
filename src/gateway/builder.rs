//! Builder for configuring gateway instances

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::DrugGateway;
use crate::cache::TieredCache;
use crate::providers::{DrugSource, OpenFdaClient};
use crate::resolver::FuzzyResolver;
use crate::{EirError, Result, lexicon};

/// Default resolver acceptance threshold (percent similarity).
pub const DEFAULT_THRESHOLD: f64 = 75.0;

/// Default bound on concurrently in-flight remote fetches.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;

/// Default per-fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(40);

/// Main entry point for creating gateway instances.
pub struct Eir;

impl Eir {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> EirBuilder {
        EirBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct EirBuilder {
    source: Option<Arc<dyn DrugSource>>,
    cache_path: Option<PathBuf>,
    reference_names: Vec<String>,
    threshold: f64,
    max_concurrent_fetches: usize,
    fetch_timeout: Duration,
}

impl EirBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            cache_path: None,
            reference_names: lexicon::SEED_NAMES.iter().map(|s| s.to_string()).collect(),
            threshold: DEFAULT_THRESHOLD,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Configure the openFDA drug-label API as the remote source.
    pub fn openfda(mut self) -> Self {
        self.source = Some(Arc::new(OpenFdaClient::new()));
        self
    }

    /// Configure a custom remote source.
    ///
    /// Any [`DrugSource`] works here, including test doubles.
    pub fn source(mut self, source: Arc<dyn DrugSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the on-disk cache container path.
    ///
    /// Defaults to `drug_cache.json` under `EIR_CACHE_DIR` if set, otherwise
    /// under the platform cache directory.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Replace the reference lexicon used for fuzzy resolution.
    ///
    /// Defaults to the built-in generic-name seed list. An empty set is
    /// allowed; every query then resolves as unmatched.
    pub fn reference_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the resolver acceptance threshold, in percent (0-100).
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the bound on concurrently in-flight remote fetches.
    ///
    /// Lookups beyond the bound queue; they are never rejected.
    pub fn max_concurrent_fetches(mut self, bound: usize) -> Self {
        self.max_concurrent_fetches = bound;
        self
    }

    /// Set the per-fetch timeout.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<DrugGateway> {
        let Some(source) = self.source else {
            return Err(EirError::NoSource);
        };

        // NaN fails the range check too.
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(EirError::Configuration(format!(
                "threshold must be within 0-100, got {}",
                self.threshold
            )));
        }

        if self.max_concurrent_fetches == 0 {
            return Err(EirError::Configuration(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }

        if self.fetch_timeout.is_zero() {
            return Err(EirError::Configuration(
                "fetch_timeout must be non-zero".to_string(),
            ));
        }

        let cache_path = self.cache_path.unwrap_or_else(default_cache_path);
        let cache = TieredCache::open(cache_path)?;
        let resolver = FuzzyResolver::new(self.reference_names, self.threshold);

        Ok(DrugGateway::new(
            source,
            cache,
            resolver,
            self.max_concurrent_fetches,
            self.fetch_timeout,
        ))
    }
}

impl Default for EirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_cache_path() -> PathBuf {
    std::env::var("EIR_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("eir")
        })
        .join("drug_cache.json")
}
