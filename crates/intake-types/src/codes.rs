//! Clinical code enums shared by all export encoders.
//!
//! Each enum carries the per-format renderings the encoders need (GDT single
//! letters, HL7 codes, FHIR code strings) plus tolerant parsing from the
//! free-text tokens a questionnaire submission can contain. Unrecognised
//! tokens never fail; they map to the neutral variant of each enum so a
//! partial, still-valid artifact is always produced.

use serde::{Deserialize, Serialize};

/// Anatomical sidedness of a finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    /// Right side.
    Right,
    /// Left side.
    Left,
    /// Both sides.
    Bilateral,
    /// No sidedness recorded.
    None,
}

impl Laterality {
    /// Tolerant mapping from a questionnaire answer token.
    ///
    /// Recognises English and German tokens plus single-letter abbreviations;
    /// anything else maps to [`Laterality::None`].
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "right" | "rechts" | "r" => Laterality::Right,
            "left" | "links" | "l" => Laterality::Left,
            "both" | "bilateral" | "beide" | "beidseits" | "b" => Laterality::Bilateral,
            _ => Laterality::None,
        }
    }

    /// Strict side-token match used at the wire boundary to recognise
    /// laterality-shaped answers. Unlike [`Laterality::from_token`] this
    /// returns `None` for anything that is not a known side token.
    pub fn from_exact_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "right" | "rechts" => Some(Laterality::Right),
            "left" | "links" => Some(Laterality::Left),
            "both" | "bilateral" | "beide" | "beidseits" => Some(Laterality::Bilateral),
            _ => None,
        }
    }

    /// Single-letter token used in GDT diagnosis lines. Empty when none.
    pub fn letter(&self) -> &'static str {
        match self {
            Laterality::Right => "R",
            Laterality::Left => "L",
            Laterality::Bilateral => "B",
            Laterality::None => "",
        }
    }

    /// Terminology phrase key for the human-readable side label.
    pub fn phrase_key(&self) -> Option<&'static str> {
        match self {
            Laterality::Right => Some("laterality.right"),
            Laterality::Left => Some("laterality.left"),
            Laterality::Bilateral => Some("laterality.both"),
            Laterality::None => Option::None,
        }
    }
}

/// Diagnostic confidence classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Certainty {
    /// Confirmed diagnosis.
    Confirmed,
    /// Suspected diagnosis.
    Suspected,
    /// Historic condition, no longer active.
    HistoryOf,
    /// Explicitly excluded diagnosis.
    Excluded,
}

impl Certainty {
    /// Tolerant mapping from a rule-table or questionnaire token.
    ///
    /// Accepts long-form words and the single-letter billing tokens;
    /// unrecognised tokens map to [`Certainty::Confirmed`].
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "confirmed" | "g" => Certainty::Confirmed,
            "suspected" | "v" => Certainty::Suspected,
            "history-of" | "history_of" | "z" => Certainty::HistoryOf,
            "excluded" | "a" => Certainty::Excluded,
            _ => Certainty::Confirmed,
        }
    }

    /// Single-letter billing token (G/V/Z/A) used in GDT diagnosis lines and
    /// HL7 diagnosis segments.
    pub fn letter(&self) -> &'static str {
        match self {
            Certainty::Confirmed => "G",
            Certainty::Suspected => "V",
            Certainty::HistoryOf => "Z",
            Certainty::Excluded => "A",
        }
    }

    /// Terminology phrase key for the human-readable certainty label.
    pub fn phrase_key(&self) -> &'static str {
        match self {
            Certainty::Confirmed => "certainty.confirmed",
            Certainty::Suspected => "certainty.suspected",
            Certainty::HistoryOf => "certainty.history",
            Certainty::Excluded => "certainty.excluded",
        }
    }
}

/// Administrative sex derived from a free-text sex/salutation answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    /// Unrecognised or absent source value.
    Unknown,
}

impl Sex {
    /// Tolerant, case-insensitive mapping from free text.
    ///
    /// Recognises English and German sex words and salutations. Anything else
    /// maps to [`Sex::Unknown`] rather than failing.
    pub fn from_text(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "m" | "male" | "mann" | "herr" | "männlich" | "maennlich" => Sex::Male,
            "f" | "w" | "female" | "frau" | "weiblich" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    /// HL7 PID-8 administrative sex code. Empty when unknown.
    pub fn hl7_code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "",
        }
    }

    /// GDT field 3110 digit. Empty when unknown (the field is then omitted).
    pub fn gdt_code(&self) -> &'static str {
        match self {
            Sex::Male => "1",
            Sex::Female => "2",
            Sex::Unknown => "",
        }
    }

    /// FHIR `Patient.gender` code.
    pub fn fhir_code(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        }
    }
}

/// Output language for human-readable phrases in export artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// German, the ultimate fallback language.
    De,
    /// English.
    En,
}

impl Language {
    /// Parse a language code, defaulting to German for unknown values.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" | "en-gb" | "en-us" => Language::En,
            _ => Language::De,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laterality_tokens_map_tolerantly() {
        assert_eq!(Laterality::from_token("Rechts"), Laterality::Right);
        assert_eq!(Laterality::from_token("l"), Laterality::Left);
        assert_eq!(Laterality::from_token("beidseits"), Laterality::Bilateral);
        assert_eq!(Laterality::from_token("somewhere"), Laterality::None);
        assert_eq!(Laterality::from_token(""), Laterality::None);
    }

    #[test]
    fn exact_side_tokens_exclude_abbreviations() {
        // Single letters are too ambiguous for shape detection at the wire
        // boundary ("l" could be a custom field value).
        assert_eq!(Laterality::from_exact_token("r"), Option::None);
        assert_eq!(
            Laterality::from_exact_token("links"),
            Some(Laterality::Left)
        );
    }

    #[test]
    fn laterality_letters() {
        assert_eq!(Laterality::Right.letter(), "R");
        assert_eq!(Laterality::Left.letter(), "L");
        assert_eq!(Laterality::Bilateral.letter(), "B");
        assert_eq!(Laterality::None.letter(), "");
    }

    #[test]
    fn certainty_tokens_and_letters() {
        assert_eq!(Certainty::from_token("suspected"), Certainty::Suspected);
        assert_eq!(Certainty::from_token("Z"), Certainty::HistoryOf);
        assert_eq!(Certainty::from_token("nonsense"), Certainty::Confirmed);
        assert_eq!(Certainty::Excluded.letter(), "A");
    }

    #[test]
    fn sex_mapping_is_tolerant() {
        assert_eq!(Sex::from_text("Frau"), Sex::Female);
        assert_eq!(Sex::from_text("MALE"), Sex::Male);
        assert_eq!(Sex::from_text("divers"), Sex::Unknown);
        assert_eq!(Sex::Unknown.hl7_code(), "");
        assert_eq!(Sex::Female.gdt_code(), "2");
        assert_eq!(Sex::Male.fhir_code(), "male");
    }

    #[test]
    fn language_defaults_to_german() {
        assert_eq!(Language::from_code("en"), Language::En);
        assert_eq!(Language::from_code("fr"), Language::De);
        assert_eq!(Language::from_code(""), Language::De);
    }
}
