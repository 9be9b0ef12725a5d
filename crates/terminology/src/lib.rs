//! Language-indexed lookup of medical phrase keys to localised strings.
//!
//! Leaf dependency of all export encoders. The table is immutable: the
//! built-in table is constructed once per process and shared by reference,
//! and tenant-specific tables can be constructed explicitly and passed in.
//! Lookups never fail; the fallback chain is requested language → German →
//! the key itself (or a caller-supplied literal).

use intake_types::Language;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Built-in phrase rows: key, German, English.
///
/// Keys are grouped by concern: generic tokens, laterality and certainty
/// labels, anamnesis category headings, and fixed clinical phrases.
const PHRASES: &[(&str, &str, &str)] = &[
    ("yes", "ja", "yes"),
    ("no", "nein", "no"),
    ("laterality.right", "rechts", "right"),
    ("laterality.left", "links", "left"),
    ("laterality.both", "beidseits", "both"),
    ("certainty.confirmed", "gesichert", "confirmed"),
    ("certainty.suspected", "Verdacht auf", "suspected"),
    ("certainty.history", "Zustand nach", "history of"),
    ("certainty.excluded", "Ausschluss von", "excluded"),
    ("category.preexisting", "Vorerkrankungen", "Pre-existing conditions"),
    ("category.eye_history", "Augenanamnese", "Ocular history"),
    ("category.medications", "Medikamente", "Medications"),
    ("category.allergies", "Allergien", "Allergies"),
    ("category.findings", "Befunde", "Findings"),
    ("category.request", "Anliegen", "Request"),
    ("condition.diabetes", "Diabetes mellitus", "Diabetes mellitus"),
    ("condition.hypertension", "Arterielle Hypertonie", "Arterial hypertension"),
    ("condition.glaucoma", "Glaukom", "Glaucoma"),
    ("condition.cataract", "Katarakt", "Cataract"),
    (
        "condition.macular_degeneration",
        "Makuladegeneration",
        "Macular degeneration",
    ),
    ("detail.diabetes_type_1", "Typ 1", "type 1"),
    ("detail.diabetes_type_2", "Typ 2", "type 2"),
    ("eye.visual_aid", "Sehhilfe vorhanden", "Wears corrective eyewear"),
    ("eye.contact_lenses", "Kontaktlinsen", "Contact lenses"),
    ("allergy.contrast_media", "Kontrastmittel", "Contrast media"),
    ("pregnancy", "Schwangerschaft", "Pregnancy"),
    (
        "note.important_medication",
        "Wichtige Dauermedikation, bitte beachten",
        "Important long-term medication, please review",
    ),
    ("medication.anticoagulant", "Antikoagulanzien", "Anticoagulants"),
    (
        "medication.corticosteroid",
        "Systemische Kortikosteroide",
        "Systemic corticosteroids",
    ),
    ("medication.antimalarial", "Antimalariamittel", "Antimalarials"),
    ("medication.alpha_blocker", "Alphablocker", "Alpha blockers"),
    ("medication.amiodarone", "Amiodaron", "Amiodarone"),
];

/// Diagnosis-code description overrides: normalised code, German, English.
///
/// A lookup for `E11.30` falls back to the `E11` base row when no exact row
/// exists; see [`Terminology::describe_code`].
const CODE_DESCRIPTIONS: &[(&str, &str, &str)] = &[
    ("E10", "Diabetes mellitus, Typ 1", "Type 1 diabetes mellitus"),
    ("E11", "Diabetes mellitus, Typ 2", "Type 2 diabetes mellitus"),
    (
        "E14.90",
        "Diabetes mellitus, nicht näher bezeichnet",
        "Unspecified diabetes mellitus",
    ),
    ("H36.0", "Diabetische Retinopathie", "Diabetic retinopathy"),
    (
        "H35.30",
        "Trockene Makuladegeneration",
        "Dry macular degeneration",
    ),
    (
        "H35.31",
        "Feuchte Makuladegeneration",
        "Wet macular degeneration",
    ),
    ("H40.9", "Glaukom, nicht näher bezeichnet", "Unspecified glaucoma"),
    ("H26.9", "Katarakt, nicht näher bezeichnet", "Unspecified cataract"),
    ("I10", "Essentielle Hypertonie", "Essential hypertension"),
];

/// Immutable phrase and code-description table.
pub struct Terminology {
    phrases: HashMap<&'static str, (&'static str, &'static str)>,
    codes: HashMap<&'static str, (&'static str, &'static str)>,
}

impl Terminology {
    fn from_rows(
        phrases: &'static [(&'static str, &'static str, &'static str)],
        codes: &'static [(&'static str, &'static str, &'static str)],
    ) -> Self {
        Self {
            phrases: phrases.iter().map(|(k, de, en)| (*k, (*de, *en))).collect(),
            codes: codes.iter().map(|(k, de, en)| (*k, (*de, *en))).collect(),
        }
    }

    /// The shared built-in table, constructed once per process.
    pub fn builtin() -> &'static Terminology {
        static TABLE: OnceLock<Terminology> = OnceLock::new();
        TABLE.get_or_init(|| Terminology::from_rows(PHRASES, CODE_DESCRIPTIONS))
    }

    /// Translate a phrase key, falling back to German and finally to the key
    /// itself.
    pub fn translate(&self, key: &str, language: Language) -> String {
        self.phrase(key, language)
            .unwrap_or(key)
            .to_string()
    }

    /// Translate a phrase key with a caller-supplied literal fallback.
    pub fn translate_or(&self, key: &str, language: Language, fallback: &str) -> String {
        self.phrase(key, language).unwrap_or(fallback).to_string()
    }

    /// Localised description for a diagnosis code.
    ///
    /// The code is normalised (trimmed, upper-cased) before lookup. When no
    /// exact row exists, a secondary lookup by the code's base segment before
    /// the `.` sub-code delimiter is attempted, so `H36.0` answers for
    /// `H36.01` and `E11` answers for `E11.30`.
    pub fn describe_code(&self, code: &str, language: Language) -> Option<String> {
        let normalised = code.trim().to_uppercase();
        if let Some(row) = self.codes.get(normalised.as_str()) {
            return Some(pick(*row, language).to_string());
        }
        let base = normalised.split('.').next().unwrap_or(&normalised);
        self.codes
            .get(base)
            .map(|row| pick(*row, language).to_string())
    }

    fn phrase(&self, key: &str, language: Language) -> Option<&'static str> {
        self.phrases.get(key).map(|row| pick(*row, language))
    }
}

fn pick(row: (&'static str, &'static str), language: Language) -> &'static str {
    let (de, en) = row;
    let chosen = match language {
        Language::De => de,
        Language::En => en,
    };
    // German is the ultimate fallback for rows with a blank translation.
    if chosen.is_empty() {
        de
    } else {
        chosen
    }
}
