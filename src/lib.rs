//! Eir - Tiered caching gateway for drug-label lookups
//!
//! This crate resolves free-form (often misspelled) drug names against a
//! reference lexicon and serves label records through a two-tier cache
//! (in-memory plus one JSON container on disk) backed by a pluggable remote
//! source, openFDA by default. Batch lookups deduplicate repeated names,
//! fetch cache misses in parallel under a fixed concurrency bound, and
//! return per-item results in input order.
//!
//! # Example
//!
//! ```rust,no_run
//! use eir::Eir;
//!
//! #[tokio::main]
//! async fn main() -> eir::Result<()> {
//!     let gateway = Eir::builder()
//!         .openfda()
//!         .build()?;
//!
//!     for result in gateway.resolve_batch(&["amlodipin", "metformin"]).await {
//!         match result {
//!             Ok(record) => println!("{}: {}", record.name, record.category),
//!             Err(e) => println!("lookup failed: {e}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod gateway;
pub mod lexicon;
pub mod providers;
pub mod resolver;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheStats, DiskStore, TieredCache};
pub use error::{EirError, Result};
pub use gateway::{DrugGateway, Eir, EirBuilder};
pub use lexicon::{DetectedCondition, detect_conditions};
pub use providers::{DrugSource, OpenFdaClient};
pub use resolver::{FuzzyResolver, similarity};
pub use types::{CanonicalName, DrugRecord};
