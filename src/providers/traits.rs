//! Capability trait for remote drug-information sources.

use async_trait::async_trait;

use crate::Result;
use crate::types::{CanonicalName, DrugRecord};

/// A remote drug-information lookup capability.
///
/// The gateway holds one source behind `Arc<dyn DrugSource>`; tests inject
/// doubles to exercise not-found, timeout, and unavailable paths
/// deterministically, without network access.
#[async_trait]
pub trait DrugSource: Send + Sync {
    /// Short stable name for logs and record provenance (e.g. "openfda").
    fn name(&self) -> &str;

    /// Fetch the record for a canonical drug name.
    ///
    /// Returns [`EirError::NotFound`](crate::EirError::NotFound) when the
    /// source explicitly reports the drug absent, transport or API errors
    /// otherwise. One call per invocation: retries are the caller's concern.
    async fn fetch(&self, name: &CanonicalName) -> Result<DrugRecord>;
}
