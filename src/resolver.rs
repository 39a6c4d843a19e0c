//! Fuzzy drug-name resolution.
//!
//! Maps free-text drug names (possibly OCR-garbled or misspelled) onto a
//! reference set of canonical names using normalized Levenshtein similarity.
//! Resolution is pure: no side effects, and "no confident match" is a `None`,
//! never an error.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

use crate::types::CanonicalName;

/// Similarity between two strings on a 0–100 scale.
///
/// Levenshtein ratio: `100 × (1 − distance / max(len(a), len(b)))`. Two
/// identical strings score 100; two strings with nothing in common score 0.
/// Case-sensitive over its inputs; callers compare normalized keys.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

/// Resolves raw queries against a fixed reference set of canonical names.
#[derive(Debug, Clone)]
pub struct FuzzyResolver {
    reference: BTreeSet<CanonicalName>,
    threshold: f64,
}

impl FuzzyResolver {
    /// Build a resolver over `names`, accepting matches that score at least
    /// `threshold` on the 0–100 scale.
    ///
    /// Names are normalized on the way in; blank entries are dropped.
    pub fn new<I, S>(names: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let reference = names
            .into_iter()
            .map(|name| CanonicalName::new(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self {
            reference,
            threshold,
        }
    }

    /// Resolve a raw query to the best-matching canonical name.
    ///
    /// An exact match after normalization short-circuits. Otherwise every
    /// reference name is scored and the best candidate is returned only if
    /// its score meets the threshold. Ties prefer the lexicographically
    /// smallest candidate, so results are reproducible.
    ///
    /// Returns `None` for a blank query, an empty reference set, or a best
    /// score below the threshold.
    pub fn resolve(&self, query: &str) -> Option<CanonicalName> {
        let normalized = CanonicalName::new(query);
        if normalized.is_empty() {
            return None;
        }
        if self.reference.contains(&normalized) {
            return Some(normalized);
        }

        let mut best: Option<(&CanonicalName, f64)> = None;
        for candidate in &self.reference {
            let score = similarity(normalized.as_str(), candidate.as_str());
            // BTreeSet iterates in lexicographic order; replacing only on a
            // strictly greater score keeps the smallest candidate among ties.
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        match best {
            Some((name, score)) if score >= self.threshold => Some(name.clone()),
            _ => None,
        }
    }

    /// Whether `name` is a member of the reference set.
    pub fn contains(&self, name: &CanonicalName) -> bool {
        self.reference.contains(name)
    }

    /// Accepted similarity threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of reference names.
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// Whether the reference set is empty.
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }
}
