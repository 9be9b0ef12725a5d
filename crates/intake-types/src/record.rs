//! Canonical intake record and its wire model.
//!
//! This module provides both the domain-level record every encoder consumes
//! and a strict YAML wire model for loading records at the boundary.
//!
//! Responsibilities:
//! - Define the immutable [`CanonicalRecord`] domain type
//! - Define a strict wire model for serialisation/deserialisation
//! - Provide translation helpers between domain types and the wire model
//! - Decide the shape of each answer value exactly once, at the boundary
//!
//! Notes:
//! - A record is created by the decryption/form-parsing layer and owned
//!   exclusively by the export call; nothing here mutates it afterwards.
//! - Answer keys are tenant- and template-scoped; the engine never infers
//!   meaning from a key it does not recognise.

use crate::answer::{AnswerValue, MedicationEntry};
use crate::codes::Laterality;
use crate::{RecordError, RecordResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Demographic fields of one submission. All fields optional; encoders omit
/// what is absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Demographics {
    pub surname: Option<String>,
    pub given_name: Option<String>,
    pub title: Option<String>,
    /// Birth date as submitted (`DD.MM.YYYY` or `YYYY-MM-DD`).
    pub birth_date: Option<String>,
    /// Free-text sex/salutation answer; mapped per format via [`crate::Sex`].
    pub sex: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// One decrypted, parsed questionnaire submission.
///
/// Treated as immutable once built: the export engine only ever reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalRecord {
    /// Tenant (practice location) this submission belongs to.
    pub tenant_id: String,

    /// Questionnaire template the submission was filled against.
    pub template_id: String,

    /// Demographic fields.
    pub demographics: Demographics,

    /// Question key to answer value, in declaration order.
    pub answers: IndexMap<String, AnswerValue>,

    /// Opaque reference to a captured signature image, if any.
    pub signature_ref: Option<String>,

    /// Opaque references to uploaded files, if any.
    pub file_refs: Vec<String>,
}

impl CanonicalRecord {
    /// Create a record with empty answers; answers are supplied via
    /// [`CanonicalRecord::with_answer`] before the record is handed to an
    /// export call.
    pub fn new(tenant_id: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            template_id: template_id.into(),
            demographics: Demographics::default(),
            answers: IndexMap::new(),
            signature_ref: None,
            file_refs: Vec::new(),
        }
    }

    /// Builder-style answer insertion, preserving insertion order.
    pub fn with_answer(mut self, key: impl Into<String>, value: AnswerValue) -> Self {
        self.answers.insert(key.into(), value);
        self
    }

    /// Builder-style demographics assignment.
    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }

    /// Look up one answer.
    pub fn answer(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.get(key)
    }

    /// Whether the answer for `key` is an affirmative token.
    pub fn is_affirmative(&self, key: &str) -> bool {
        self.answer(key).is_some_and(AnswerValue::is_affirmative)
    }

    /// The answer for `key` as a single token, when it has one.
    pub fn answer_token(&self, key: &str) -> Option<&str> {
        self.answer(key).and_then(AnswerValue::as_token)
    }

    /// Resolve the laterality recorded under `key`: a nested side answer is
    /// used directly, a token answer is mapped tolerantly, anything else is
    /// [`Laterality::None`].
    pub fn laterality_of(&self, key: &str) -> Laterality {
        match self.answer(key) {
            Some(AnswerValue::Side(side)) => *side,
            Some(value) => value
                .as_token()
                .map(Laterality::from_token)
                .unwrap_or(Laterality::None),
            None => Laterality::None,
        }
    }

    /// Parse a canonical record from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g.
    /// `answers.diabetes_type`) to the failing field when the YAML does not
    /// match the wire schema.
    pub fn parse(yaml_text: &str) -> RecordResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, RecordWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(RecordError::Translation(format!(
                    "Record schema mismatch at {path}: {source}"
                )));
            }
        };

        Ok(wire_to_domain(wire))
    }

    /// Render the record as YAML text (used for fixtures and round-trips).
    pub fn render(&self) -> RecordResult<String> {
        let wire = domain_to_wire(self);
        serde_yaml::to_string(&wire)
            .map_err(|e| RecordError::Translation(format!("Failed to serialise record: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of a canonical record.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct RecordWire {
    #[serde(rename = "tenantId")]
    pub tenant_id: String,

    #[serde(rename = "templateId")]
    pub template_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<DemographicsWire>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub answers: IndexMap<String, AnswerWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct DemographicsWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,

    #[serde(rename = "givenName", default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "birthDate", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    #[serde(rename = "postalCode", default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Wire representation of one answer value.
///
/// Untagged: the YAML shape decides the variant. Medication lists must come
/// before plain item lists so a list of mappings is not misread.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
enum AnswerWire {
    Bool(bool),
    Number(f64),
    Medications(Vec<MedicationWire>),
    Items(Vec<String>),
    Text(String),
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct MedicationWire {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Decide the domain shape of a string answer.
///
/// Exact side tokens become nested laterality answers; short single tokens
/// become enumerated choices; everything else is free text. This heuristic
/// lives only at the wire boundary.
fn classify_string(value: String) -> AnswerValue {
    if let Some(side) = Laterality::from_exact_token(&value) {
        return AnswerValue::Side(side);
    }
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() <= 32 && !trimmed.contains(char::is_whitespace) {
        return AnswerValue::Choice(trimmed.to_string());
    }
    AnswerValue::Text(value)
}

fn answer_to_domain(wire: AnswerWire) -> AnswerValue {
    match wire {
        AnswerWire::Bool(value) => AnswerValue::Flag(value),
        AnswerWire::Number(value) => AnswerValue::Choice(format_number(value)),
        AnswerWire::Medications(entries) => AnswerValue::Medications(
            entries
                .into_iter()
                .map(|m| MedicationEntry {
                    name: m.name,
                    substance: m.substance,
                    strength: m.strength,
                    dosage: m.dosage,
                    instructions: m.instructions,
                })
                .collect(),
        ),
        AnswerWire::Items(items) => AnswerValue::Items(items),
        AnswerWire::Text(value) => classify_string(value),
    }
}

fn answer_to_wire(value: &AnswerValue) -> AnswerWire {
    match value {
        AnswerValue::Flag(flag) => AnswerWire::Bool(*flag),
        AnswerValue::Choice(token) => AnswerWire::Text(token.clone()),
        AnswerValue::Text(text) => AnswerWire::Text(text.clone()),
        AnswerValue::Items(items) => AnswerWire::Items(items.clone()),
        AnswerValue::Medications(entries) => AnswerWire::Medications(
            entries
                .iter()
                .map(|m| MedicationWire {
                    name: m.name.clone(),
                    substance: m.substance.clone(),
                    strength: m.strength.clone(),
                    dosage: m.dosage.clone(),
                    instructions: m.instructions.clone(),
                })
                .collect(),
        ),
        AnswerValue::Side(side) => AnswerWire::Text(
            match side {
                Laterality::Right => "right",
                Laterality::Left => "left",
                Laterality::Bilateral => "both",
                Laterality::None => "",
            }
            .to_string(),
        ),
    }
}

/// Render a YAML number the way a form field would have carried it.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn wire_to_domain(wire: RecordWire) -> CanonicalRecord {
    let demographics = wire
        .patient
        .map(|p| Demographics {
            surname: p.surname,
            given_name: p.given_name,
            title: p.title,
            birth_date: p.birth_date,
            sex: p.sex,
            street: p.street,
            postal_code: p.postal_code,
            city: p.city,
            country: p.country,
            phone: p.phone,
            email: p.email,
        })
        .unwrap_or_default();

    let answers = wire
        .answers
        .into_iter()
        .map(|(key, value)| (key, answer_to_domain(value)))
        .collect();

    CanonicalRecord {
        tenant_id: wire.tenant_id,
        template_id: wire.template_id,
        demographics,
        answers,
        signature_ref: wire.signature,
        file_refs: wire.files,
    }
}

fn domain_to_wire(record: &CanonicalRecord) -> RecordWire {
    let d = &record.demographics;
    let patient = if *d == Demographics::default() {
        None
    } else {
        Some(DemographicsWire {
            surname: d.surname.clone(),
            given_name: d.given_name.clone(),
            title: d.title.clone(),
            birth_date: d.birth_date.clone(),
            sex: d.sex.clone(),
            street: d.street.clone(),
            postal_code: d.postal_code.clone(),
            city: d.city.clone(),
            country: d.country.clone(),
            phone: d.phone.clone(),
            email: d.email.clone(),
        })
    };

    RecordWire {
        tenant_id: record.tenant_id.clone(),
        template_id: record.template_id.clone(),
        patient,
        answers: record
            .answers
            .iter()
            .map(|(key, value)| (key.clone(), answer_to_wire(value)))
            .collect(),
        signature: record.signature_ref.clone(),
        files: record.file_refs.clone(),
    }
}
