//! Embedded drug lexicon.
//!
//! Compiled-in reference data: a seed set of common canonical drug names
//! (the default resolver reference set), dosage-abbreviation expansions, and
//! combination-therapy patterns for condition detection. All tables are
//! static; callers needing a different universe supply their own names
//! through the gateway builder.

use serde::Serialize;

use crate::types::CanonicalName;

/// Common canonical drug names (lowercase generics).
///
/// Serves as the default reference set for fuzzy resolution. Every member
/// of every combination pattern below is included.
pub const SEED_NAMES: &[&str] = &[
    "acetaminophen",
    "albuterol",
    "allopurinol",
    "alprazolam",
    "amitriptyline",
    "amlodipine",
    "amoxicillin",
    "apixaban",
    "aspirin",
    "atenolol",
    "atorvastatin",
    "azithromycin",
    "bisoprolol",
    "budesonide",
    "buspirone",
    "candesartan",
    "captopril",
    "carvedilol",
    "cephalexin",
    "cetirizine",
    "ciprofloxacin",
    "citalopram",
    "clonazepam",
    "clopidogrel",
    "cyclobenzaprine",
    "dapagliflozin",
    "dexamethasone",
    "diclofenac",
    "digoxin",
    "diltiazem",
    "doxycycline",
    "duloxetine",
    "empagliflozin",
    "enalapril",
    "escitalopram",
    "esomeprazole",
    "famotidine",
    "fexofenadine",
    "finasteride",
    "fluoxetine",
    "furosemide",
    "gabapentin",
    "glimepiride",
    "glipizide",
    "hydrochlorothiazide",
    "hydroxyzine",
    "ibuprofen",
    "insulin",
    "lamotrigine",
    "lansoprazole",
    "levetiracetam",
    "levofloxacin",
    "levothyroxine",
    "lisinopril",
    "loratadine",
    "losartan",
    "meloxicam",
    "metformin",
    "methotrexate",
    "metoprolol",
    "mirtazapine",
    "montelukast",
    "naproxen",
    "nifedipine",
    "olmesartan",
    "omeprazole",
    "ondansetron",
    "pantoprazole",
    "paracetamol",
    "prednisone",
    "pregabalin",
    "propranolol",
    "quetiapine",
    "ramipril",
    "rivaroxaban",
    "rosuvastatin",
    "sertraline",
    "simvastatin",
    "sitagliptin",
    "spironolactone",
    "tamsulosin",
    "telmisartan",
    "tramadol",
    "trazodone",
    "valsartan",
    "venlafaxine",
    "warfarin",
];

/// Dosage abbreviations and their plain-language expansions.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("OD", "Once Daily"),
    ("BD", "Twice Daily"),
    ("BID", "Twice Daily"),
    ("TID", "Three Times Daily"),
    ("TDS", "Three Times Daily"),
    ("QID", "Four Times Daily"),
    ("PRN", "As Needed"),
    ("AC", "Before Meals"),
    ("PC", "After Meals"),
    ("HS", "At Bedtime"),
    ("STAT", "Immediately"),
    ("SOS", "If Necessary"),
    ("QH", "Every Hour"),
    ("Q4H", "Every 4 Hours"),
    ("Q6H", "Every 6 Hours"),
    ("Q8H", "Every 8 Hours"),
    ("Q12H", "Every 12 Hours"),
];

/// Expand a dosage abbreviation (e.g. "BID") to plain language.
///
/// Lookup is case-insensitive; returns `None` for unrecognized tokens.
pub fn expand_abbreviation(token: &str) -> Option<&'static str> {
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(token))
        .map(|(_, expansion)| *expansion)
}

/// Drug combinations that indicate a specific condition when all members
/// appear together in one validated set.
const COMBINATIONS: &[(&[&str], &str, &str)] = &[
    (
        &["metformin", "glimepiride"],
        "Type 2 Diabetes (Moderate to Severe)",
        "Your blood sugar needs two medications to control it properly",
    ),
    (
        &["metformin", "glipizide"],
        "Type 2 Diabetes (Moderate to Severe)",
        "Your blood sugar needs two medications to control it properly",
    ),
    (
        &["amlodipine", "telmisartan"],
        "High Blood Pressure (Combination Therapy)",
        "Your blood pressure needs two medications working together",
    ),
    (
        &["amlodipine", "losartan"],
        "High Blood Pressure (Combination Therapy)",
        "Your blood pressure needs two medications working together",
    ),
    (
        &["aspirin", "atorvastatin"],
        "Heart Disease Prevention",
        "These medications protect your heart and blood vessels",
    ),
    (
        &["aspirin", "clopidogrel"],
        "Heart Disease / Stroke Prevention",
        "Dual antiplatelet therapy to prevent blood clots",
    ),
    (
        &["metformin", "atorvastatin", "amlodipine"],
        "Metabolic Syndrome",
        "You have multiple conditions: diabetes, high cholesterol, and high blood pressure",
    ),
    (
        &["levothyroxine"],
        "Hypothyroidism (Low Thyroid)",
        "Your thyroid gland is not producing enough hormone",
    ),
    (
        &["insulin"],
        "Diabetes (Type 1 or Advanced Type 2)",
        "Your blood sugar requires insulin treatment",
    ),
];

/// A condition indicated by a recognized drug combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectedCondition {
    /// Condition name.
    pub condition: &'static str,
    /// Plain-language explanation of why the combination indicates it.
    pub explanation: &'static str,
}

/// Detect conditions indicated by the given set of validated canonical names.
///
/// A pattern matches when every one of its members is present. Patterns are
/// reported in table order; overlapping patterns may all match.
pub fn detect_conditions(names: &[CanonicalName]) -> Vec<DetectedCondition> {
    COMBINATIONS
        .iter()
        .filter(|(members, _, _)| {
            members
                .iter()
                .all(|member| names.iter().any(|name| name.as_str() == *member))
        })
        .map(|(_, condition, explanation)| DetectedCondition {
            condition,
            explanation,
        })
        .collect()
}
