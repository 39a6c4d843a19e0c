//! Telemetry metric name constants.
//!
//! Centralised metric names for eir operations. Consumers install their own
//! `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `eir_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `source` — drug source name (e.g. "openfda")
//! - `tier` — cache tier: "memory" or "disk"
//! - `status` — outcome: "ok" or "error"

/// Total batch lookups processed by the gateway.
///
/// Labels: `status` ("ok" | "partial" | "error" — "partial" means at least
/// one slot failed while another succeeded).
pub const BATCHES_TOTAL: &str = "eir_batches_total";

/// Batch duration in seconds, resolve through merge.
pub const BATCH_DURATION_SECONDS: &str = "eir_batch_duration_seconds";

/// Total remote fetches dispatched.
///
/// Labels: `source`, `status` ("ok" | "error" | "timeout").
pub const FETCHES_TOTAL: &str = "eir_fetches_total";

/// Remote fetch duration in seconds.
///
/// Labels: `source`.
pub const FETCH_DURATION_SECONDS: &str = "eir_fetch_duration_seconds";

/// Total cache hits.
///
/// Labels: `tier` ("memory" | "disk").
pub const CACHE_HITS_TOTAL: &str = "eir_cache_hits_total";

/// Total cache misses (both tiers missed).
pub const CACHE_MISSES_TOTAL: &str = "eir_cache_misses_total";

/// Total disk persistence failures swallowed by the cache layer.
pub const CACHE_PERSIST_FAILURES_TOTAL: &str = "eir_cache_persist_failures_total";

/// Total queries that failed fuzzy resolution.
pub const UNRESOLVED_TOTAL: &str = "eir_unresolved_total";
