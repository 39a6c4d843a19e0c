//! openFDA drug-label client.
//!
//! Queries the public openFDA `/drug/label.json` endpoint. A lookup tries an
//! exact brand/generic name match first, then a prefix-wildcard search whose
//! candidate names are ranked locally with normalized Levenshtein
//! similarity, which absorbs OCR-style misspellings the label index cannot
//! match. See: <https://open.fda.gov/apis/drug/label/>

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::traits::DrugSource;
use crate::lexicon;
use crate::resolver::similarity;
use crate::types::{CanonicalName, DrugRecord};
use crate::{EirError, Result};

/// Default base URL for the openFDA drug endpoints.
const DEFAULT_BASE_URL: &str = "https://api.fda.gov/drug";

/// Per-request timeout for label queries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum candidates requested from a wildcard search.
const WILDCARD_LIMIT: &str = "30";

/// Minimum similarity (0-100) for accepting a wildcard candidate.
const FUZZY_ACCEPT_SCORE: f64 = 75.0;

/// Source name used in logs and record provenance.
const SOURCE_NAME: &str = "openfda";

/// Client for the openFDA drug-label API.
///
/// No API key is required for the public rate tier; the gateway's fetch
/// bound keeps request concurrency under it.
#[derive(Clone)]
pub struct OpenFdaClient {
    http: Client,
    base_url: String,
}

impl OpenFdaClient {
    /// Create a client against the public openFDA endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Exact brand/generic name search.
    ///
    /// Returns `Ok(None)` when the index has no exact match (openFDA reports
    /// "no matches" as HTTP 404), so the caller can fall back to the
    /// wildcard search.
    async fn exact_search(&self, name: &str) -> Result<Option<DrugRecord>> {
        let url = format!("{}/label.json", self.base_url);
        let search = format!(r#"openfda.brand_name:"{name}" openfda.generic_name:"{name}""#);

        let response = self
            .http
            .get(&url)
            .query(&[("search", search.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(|e| EirError::Http(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(&response));
        }

        let data: LabelResponse = response
            .json()
            .await
            .map_err(|e| EirError::Http(e.to_string()))?;

        Ok(data.results.first().map(|entry| parse_record(entry, name)))
    }

    /// Prefix-wildcard search with local fuzzy ranking of candidate names.
    async fn fuzzy_search(&self, name: &str) -> Result<DrugRecord> {
        let prefix = wildcard_prefix(name);
        debug!(name, prefix = prefix.as_str(), "wildcard label search");

        let url = format!("{}/label.json", self.base_url);
        let search =
            format!(r#"openfda.brand_name:"{prefix}"* openfda.generic_name:"{prefix}"*"#);

        let response = self
            .http
            .get(&url)
            .query(&[("search", search.as_str()), ("limit", WILDCARD_LIMIT)])
            .send()
            .await
            .map_err(|e| EirError::Http(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(EirError::NotFound(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(status_error(&response));
        }

        let data: LabelResponse = response
            .json()
            .await
            .map_err(|e| EirError::Http(e.to_string()))?;

        let mut best: Option<(&LabelEntry, &str, f64)> = None;
        for entry in &data.results {
            let candidates = entry
                .openfda
                .brand_name
                .iter()
                .chain(entry.openfda.generic_name.iter());
            for candidate in candidates {
                let score = similarity(name, &candidate.to_lowercase());
                if best.is_none_or(|(_, _, best_score)| score > best_score) {
                    best = Some((entry, candidate, score));
                }
            }
        }

        match best {
            Some((entry, matched, score)) if score >= FUZZY_ACCEPT_SCORE => {
                info!(query = name, matched, score, "fuzzy label match");
                Ok(parse_record(entry, matched))
            }
            Some((_, _, score)) => {
                debug!(query = name, best_score = score, "no candidate above threshold");
                Err(EirError::NotFound(name.to_string()))
            }
            None => Err(EirError::NotFound(name.to_string())),
        }
    }
}

impl Default for OpenFdaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrugSource for OpenFdaClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, name: &CanonicalName) -> Result<DrugRecord> {
        if let Some(record) = self.exact_search(name.as_str()).await? {
            debug!(name = %name, "exact label match");
            return Ok(record);
        }
        self.fuzzy_search(name.as_str()).await
    }
}

/// Map a non-success response to the appropriate error.
fn status_error(response: &reqwest::Response) -> EirError {
    let status = response.status();
    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            EirError::RateLimited { retry_after }
        }
        code => EirError::Api {
            status: code,
            message: format!("openFDA error: {status}"),
        },
    }
}

/// Wildcard prefix: the first `min(5, max(4, len - 2))` characters.
///
/// Short enough to survive a trailing OCR error, long enough to keep the
/// candidate list focused.
fn wildcard_prefix(name: &str) -> String {
    let len = name.chars().count();
    let prefix_len = len.saturating_sub(2).clamp(4, 5);
    name.chars().take(prefix_len).collect()
}

// ============================================================================
// Label parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    results: Vec<LabelEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct LabelEntry {
    #[serde(default)]
    openfda: OpenFdaFields,
    #[serde(default)]
    indications_and_usage: Vec<String>,
    #[serde(default)]
    mechanism_of_action: Vec<String>,
    #[serde(default)]
    clinical_pharmacology: Vec<String>,
    #[serde(default)]
    description: Vec<String>,
    #[serde(default)]
    dosage_and_administration: Vec<String>,
    #[serde(default)]
    adverse_reactions: Vec<String>,
    #[serde(default)]
    warnings_and_cautions: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    boxed_warning: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenFdaFields {
    #[serde(default)]
    brand_name: Vec<String>,
    #[serde(default)]
    generic_name: Vec<String>,
    #[serde(default)]
    pharm_class_epc: Vec<String>,
}

/// Assemble a [`DrugRecord`] from one label entry.
fn parse_record(entry: &LabelEntry, display_name: &str) -> DrugRecord {
    DrugRecord {
        name: title_case(display_name),
        category: extract_category(entry),
        treats: extract_indications(entry),
        explanation: extract_explanation(entry),
        dosage: extract_dosage(entry),
        frequency: extract_frequency(entry),
        side_effects: extract_side_effects(entry),
        warnings: extract_warnings(entry),
        source: SOURCE_NAME.to_string(),
        retrieved_at: Utc::now(),
    }
}

/// First non-empty string in a label field.
fn first_text(field: &[String]) -> Option<&str> {
    field.first().map(String::as_str).filter(|s| !s.is_empty())
}

fn first_sentence(text: &str) -> &str {
    match text.split_once('.') {
        Some((head, _)) => head.trim(),
        None => text.trim(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_category(entry: &LabelEntry) -> String {
    match first_text(&entry.openfda.pharm_class_epc) {
        Some(class) => {
            let class = class.replace("[EPC]", "");
            truncate_chars(class.trim(), 100)
        }
        None => "Prescription Medication".to_string(),
    }
}

fn extract_indications(entry: &LabelEntry) -> String {
    match first_text(&entry.indications_and_usage) {
        Some(text) => truncate_chars(&simplify_text(first_sentence(text)), 200),
        None => "Various medical conditions".to_string(),
    }
}

fn extract_explanation(entry: &LabelEntry) -> String {
    let fields = [
        &entry.mechanism_of_action,
        &entry.clinical_pharmacology,
        &entry.description,
    ];
    for field in fields {
        if let Some(text) = first_text(field) {
            return truncate_chars(&simplify_text(first_sentence(text)), 200);
        }
    }
    "Prescription medication - consult your doctor".to_string()
}

fn extract_dosage(entry: &LabelEntry) -> String {
    first_text(&entry.dosage_and_administration)
        .and_then(dosage_token)
        .unwrap_or_else(|| "As prescribed by doctor".to_string())
}

/// First `<number> <unit>` token in label text (e.g. "5 mg", "100 units").
///
/// The unit must end at a word boundary, so "5 grams" is not read as "5 g".
fn dosage_token(text: &str) -> Option<String> {
    const UNITS: [&str; 6] = ["units", "unit", "mcg", "mg", "ml", "g"];

    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if !c.is_ascii_digit() {
            continue;
        }
        let mut end = start + 1;
        while let Some((i, d)) = chars.peek().copied() {
            if d.is_ascii_digit() {
                end = i + 1;
                chars.next();
            } else {
                break;
            }
        }
        let rest = text[end..].trim_start_matches([' ', '\t']);
        for unit in UNITS {
            let head_matches = rest
                .get(..unit.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(unit));
            if head_matches
                && !rest[unit.len()..].starts_with(|ch: char| ch.is_ascii_alphabetic())
            {
                return Some(format!("{} {}", &text[start..end], unit));
            }
        }
    }
    None
}

fn extract_frequency(entry: &LabelEntry) -> String {
    let Some(text) = first_text(&entry.dosage_and_administration) else {
        return "As directed by your doctor".to_string();
    };
    let lower = text.to_lowercase();

    if lower.contains("once daily") || lower.contains("once a day") {
        return "Once daily".to_string();
    }
    if lower.contains("twice daily") || lower.contains("twice a day") {
        return "Twice daily".to_string();
    }
    if lower.contains("three times") {
        return "Three times daily".to_string();
    }
    if lower.contains("four times") {
        return "Four times daily".to_string();
    }

    // Dosage shorthand ("BID", "Q6H", ...) appears as standalone tokens.
    for token in lower.split(|c: char| !c.is_ascii_alphanumeric()) {
        if token == "qd" {
            return "Once daily".to_string();
        }
        if let Some(expansion) = lexicon::expand_abbreviation(token) {
            return expansion.to_string();
        }
    }

    "As directed by your doctor".to_string()
}

fn extract_side_effects(entry: &LabelEntry) -> Vec<String> {
    let fallback = || vec!["See package information".to_string()];
    let Some(text) = first_text(&entry.adverse_reactions) else {
        return fallback();
    };

    let head = truncate_chars(text, 300);
    let effects: Vec<String> = head
        .lines()
        .take(5)
        .map(|line| line.trim_matches(['•', '-', '*', ' ', '\t']))
        .filter(|line| {
            let len = line.chars().count();
            len > 3 && len < 50
        })
        .map(capitalize_first)
        .collect();

    if effects.is_empty() { fallback() } else { effects }
}

fn extract_warnings(entry: &LabelEntry) -> String {
    let fields = [
        &entry.warnings_and_cautions,
        &entry.warnings,
        &entry.boxed_warning,
    ];
    for field in fields {
        if let Some(text) = first_text(field) {
            return truncate_chars(&simplify_text(first_sentence(text)), 200);
        }
    }
    "Consult your doctor before use".to_string()
}

/// Plain-language substitutions applied to label text, longest phrase first
/// where one phrase contains another.
const JARGON: &[(&str, &str)] = &[
    ("indicated for the treatment of", "treats"),
    ("indicated for", "used to treat"),
    ("administration", "taking"),
    ("administered", "given"),
    ("hypertension", "high blood pressure"),
    ("diabetes mellitus", "diabetes"),
    ("hyperlipidemia", "high cholesterol"),
    ("dyslipidemia", "abnormal cholesterol"),
    ("myocardial infarction", "heart attack"),
    ("cerebrovascular accident", "stroke"),
    ("angina pectoris", "chest pain"),
    ("patients with", "people with"),
    ("patients", "people"),
    ("therapeutic", "treatment"),
    ("prophylaxis", "prevention"),
    ("concomitant", "together with"),
    ("contraindicated", "should not be used"),
];

fn simplify_text(text: &str) -> String {
    let mut simplified = text.to_lowercase();
    for (jargon, plain) in JARGON {
        if simplified.contains(jargon) {
            simplified = simplified.replace(jargon, plain);
        }
    }
    capitalize_first(&simplified)
}
