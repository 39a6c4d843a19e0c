//! Structured drug record returned by lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured facts about one drug, as produced by a lookup source.
///
/// A record is immutable once cached; a later fetch for the same canonical
/// name overwrites it wholesale (no versioning). Text fields hold short
/// plain-language phrases suitable for direct display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugRecord {
    /// Display name (title-cased where the source provides casing).
    pub name: String,
    /// Drug class or category (e.g. "Calcium Channel Blocker").
    pub category: String,
    /// What the drug treats.
    pub treats: String,
    /// Short explanation of how the drug works.
    pub explanation: String,
    /// Representative dosage strength from the label (e.g. "5 mg").
    pub dosage: String,
    /// Dosing frequency (e.g. "Once daily").
    pub frequency: String,
    /// Common side effects, a few short phrases.
    pub side_effects: Vec<String>,
    /// Key warning from the label, one short sentence.
    pub warnings: String,
    /// Name of the source that produced this record (e.g. "openfda").
    pub source: String,
    /// When the record was retrieved from the source.
    pub retrieved_at: DateTime<Utc>,
}

impl DrugRecord {
    /// Create a record with the given display name and source; all other
    /// fields start empty and `retrieved_at` is set to now.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            treats: String::new(),
            explanation: String::new(),
            dosage: String::new(),
            frequency: String::new(),
            side_effects: Vec::new(),
            warnings: String::new(),
            source: source.into(),
            retrieved_at: Utc::now(),
        }
    }
}
