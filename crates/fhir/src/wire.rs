//! Serialize-only wire structs for the emitted resource graph.
//!
//! Only the fields the encoder actually emits are modelled; optional fields
//! are skipped entirely when absent so the JSON stays minimal. There is no
//! deserialisation side because the import direction is out of scope.

use serde::Serialize;

// ============================================================================
// Bundle scaffolding
// ============================================================================

/// Top-level `Bundle` of type `collection`.
#[derive(Clone, Debug, Serialize)]
pub struct BundleWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    #[serde(rename = "type")]
    pub bundle_type: &'static str,

    pub entry: Vec<EntryWire>,
}

/// One bundle entry: a generated `urn:uuid:` identifier plus the resource.
#[derive(Clone, Debug, Serialize)]
pub struct EntryWire {
    #[serde(rename = "fullUrl")]
    pub full_url: String,

    pub resource: ResourceWire,
}

/// Closed set of resource kinds the encoder emits.
///
/// Untagged: every variant carries its own `resourceType` discriminator.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ResourceWire {
    Patient(PatientWire),
    Condition(ConditionWire),
    AllergyIntolerance(AllergyIntoleranceWire),
    MedicationStatement(MedicationStatementWire),
    Observation(ObservationWire),
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct PatientWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanNameWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPointWire>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConditionWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    #[serde(rename = "clinicalStatus")]
    pub clinical_status: CodeableConceptWire,

    #[serde(rename = "verificationStatus")]
    pub verification_status: CodeableConceptWire,

    pub code: CodeableConceptWire,

    #[serde(rename = "bodySite", skip_serializing_if = "Vec::is_empty")]
    pub body_site: Vec<CodeableConceptWire>,

    pub subject: ReferenceWire,
}

#[derive(Clone, Debug, Serialize)]
pub struct AllergyIntoleranceWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    pub code: CodeableConceptWire,

    pub patient: ReferenceWire,
}

#[derive(Clone, Debug, Serialize)]
pub struct MedicationStatementWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    pub status: &'static str,

    #[serde(rename = "medicationCodeableConcept")]
    pub medication: CodeableConceptWire,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dosage: Vec<DosageWire>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<AnnotationWire>,

    pub subject: ReferenceWire,
}

#[derive(Clone, Debug, Serialize)]
pub struct ObservationWire {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,

    pub status: &'static str,

    pub code: CodeableConceptWire,

    pub subject: ReferenceWire,

    #[serde(rename = "valueBoolean", skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    #[serde(rename = "valueQuantity", skip_serializing_if = "Option::is_none")]
    pub value_quantity: Option<QuantityWire>,

    #[serde(rename = "valueString", skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

// ============================================================================
// Shared datatypes
// ============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct HumanNameWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AddressWire {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(rename = "postalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ContactPointWire {
    pub system: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CodeableConceptWire {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<CodingWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConceptWire {
    /// Concept with a single coding and no text.
    pub fn coded(system: &str, code: &str, display: Option<&str>) -> Self {
        Self {
            coding: vec![CodingWire {
                system: system.to_string(),
                code: code.to_string(),
                display: display.map(ToString::to_string),
            }],
            text: None,
        }
    }

    /// Concept carrying only free text.
    pub fn text_only(text: &str) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.to_string()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CodingWire {
    pub system: String,

    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReferenceWire {
    pub reference: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DosageWire {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnnotationWire {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuantityWire {
    pub value: f64,
}
