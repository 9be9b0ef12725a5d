//! Questionnaire answer shapes.
//!
//! A submission's answer map is a tagged union over a small closed set of
//! shapes so that encoders pattern-match exhaustively instead of
//! string-sniffing. The wire boundary (see `record`) decides the shape once;
//! everything downstream works on these variants.

use crate::codes::Laterality;
use serde::{Deserialize, Serialize};

/// One structured medication list entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationEntry {
    /// Trade or display name.
    pub name: String,

    /// Active substance, if the patient knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substance: Option<String>,

    /// Strength, free text (e.g. "100 mg").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,

    /// Dosage scheme, free text (e.g. "1-0-1").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,

    /// Additional intake instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl MedicationEntry {
    /// One-line human-readable summary, used by the text-oriented encoders.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(substance) = &self.substance {
            parts.push(format!("({substance})"));
        }
        if let Some(strength) = &self.strength {
            parts.push(strength.clone());
        }
        if let Some(dosage) = &self.dosage {
            parts.push(dosage.clone());
        }
        if let Some(instructions) = &self.instructions {
            parts.push(instructions.clone());
        }
        parts.join(" ")
    }
}

/// The value of one answered question.
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerValue {
    /// Boolean-like token (checkbox, yes/no question).
    Flag(bool),
    /// Enumerated single token (e.g. `type_2`, `wet`).
    Choice(String),
    /// Free text.
    Text(String),
    /// List of free-text items.
    Items(Vec<String>),
    /// Structured medication list.
    Medications(Vec<MedicationEntry>),
    /// Nested side/laterality token.
    Side(Laterality),
}

impl AnswerValue {
    /// Whether this answer counts as an affirmative token for rule
    /// resolution. Only flags and affirmative choice tokens qualify; free
    /// text and lists are never treated as affirmation.
    pub fn is_affirmative(&self) -> bool {
        match self {
            AnswerValue::Flag(value) => *value,
            AnswerValue::Choice(token) => matches!(
                token.trim().to_lowercase().as_str(),
                "yes" | "ja" | "true" | "y" | "1"
            ),
            _ => false,
        }
    }

    /// The answer as a single enumerated token, when it has one.
    pub fn as_token(&self) -> Option<&str> {
        match self {
            AnswerValue::Choice(token) => Some(token.as_str()),
            AnswerValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// The answer as individual list items, for answers that carry an
    /// enumerable list (allergies, for instance). Free text is split on
    /// semicolons and commas; explicit list items are split the same way.
    pub fn list_items(&self) -> Vec<String> {
        let raw = match self {
            AnswerValue::Items(items) => items.clone(),
            other => vec![other.display_text()],
        };
        raw.iter()
            .flat_map(|item| item.split([';', ',']))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Stringified value for generic observation output. Arrays are joined
    /// with a comma-space separator.
    pub fn display_text(&self) -> String {
        match self {
            AnswerValue::Flag(true) => "yes".to_string(),
            AnswerValue::Flag(false) => "no".to_string(),
            AnswerValue::Choice(token) => token.clone(),
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Items(items) => items.join(", "),
            AnswerValue::Medications(entries) => entries
                .iter()
                .map(MedicationEntry::summary)
                .collect::<Vec<_>>()
                .join(", "),
            AnswerValue::Side(side) => side.letter().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_tokens() {
        assert!(AnswerValue::Flag(true).is_affirmative());
        assert!(!AnswerValue::Flag(false).is_affirmative());
        assert!(AnswerValue::Choice("Ja".into()).is_affirmative());
        assert!(AnswerValue::Choice("1".into()).is_affirmative());
        assert!(!AnswerValue::Choice("type_2".into()).is_affirmative());
        assert!(!AnswerValue::Text("yes please".into()).is_affirmative());
        assert!(!AnswerValue::Items(vec!["yes".into()]).is_affirmative());
    }

    #[test]
    fn list_items_split_on_delimiters() {
        let text = AnswerValue::Text("pollen; penicillin, latex".into());
        assert_eq!(text.list_items(), vec!["pollen", "penicillin", "latex"]);

        let items = AnswerValue::Items(vec!["a;b".into(), "c".into()]);
        assert_eq!(items.list_items(), vec!["a", "b", "c"]);
    }

    #[test]
    fn display_text_joins_lists_with_comma_space() {
        let value = AnswerValue::Items(vec!["pollen".into(), "penicillin".into()]);
        assert_eq!(value.display_text(), "pollen, penicillin");
    }

    #[test]
    fn medication_summary_folds_optional_parts() {
        let entry = MedicationEntry {
            name: "Marcumar".into(),
            substance: Some("Phenprocoumon".into()),
            strength: Some("3 mg".into()),
            dosage: Some("1-0-0".into()),
            instructions: None,
        };
        assert_eq!(entry.summary(), "Marcumar (Phenprocoumon) 3 mg 1-0-0");

        let bare = MedicationEntry {
            name: "ASS".into(),
            substance: None,
            strength: None,
            dosage: None,
            instructions: None,
        };
        assert_eq!(bare.summary(), "ASS");
    }
}
