//! Bundle assembly.

use crate::wire::*;
use crate::FhirResult;
use diagnosis::DiagnosisEntry;
use intake_types::{
    dates, AnswerValue, CanonicalRecord, Certainty, ExportConfig, IdGenerator, Language,
    Laterality, Sex,
};
use terminology::Terminology;

const SYSTEM_ICD10: &str = "http://fhir.de/CodeSystem/bfarm/icd-10-gm";
const SYSTEM_SNOMED: &str = "http://snomed.info/sct";
const SYSTEM_CONDITION_CLINICAL: &str =
    "http://terminology.hl7.org/CodeSystem/condition-clinical";
const SYSTEM_CONDITION_VER_STATUS: &str =
    "http://terminology.hl7.org/CodeSystem/condition-ver-status";

/// Fixed clinical flag observations: question key, SNOMED code, display.
const FLAG_OBSERVATIONS: &[(&str, &str, &str)] = &[
    ("visual_aid", "50121007", "Eye glasses, device"),
    ("contact_lenses", "57368009", "Contact lens, device"),
    ("pregnancy", "77386006", "Patient currently pregnant"),
];

/// Important-medication flags: question key, phrase key.
const IMPORTANT_MEDICATION_FLAGS: &[(&str, &str)] = &[
    ("anticoagulants", "medication.anticoagulant"),
    ("corticosteroids", "medication.corticosteroid"),
    ("antimalarials", "medication.antimalarial"),
    ("alpha_blockers", "medication.alpha_blocker"),
    ("amiodarone", "medication.amiodarone"),
];

/// Answer-key prefix marking tenant-configured custom fields.
const CUSTOM_FIELD_PREFIX: &str = "custom_";

/// Resource-graph bundle encoder.
pub struct FhirEncoder;

impl FhirEncoder {
    /// Serialise one record and its resolved diagnoses into a `Bundle` JSON
    /// document. The Patient resource comes first; every other resource
    /// references it through the same generated `urn:uuid:` identifier.
    pub fn encode(
        record: &CanonicalRecord,
        diagnoses: &[DiagnosisEntry],
        config: &ExportConfig,
        terminology: &Terminology,
        ids: &dyn IdGenerator,
    ) -> FhirResult<serde_json::Value> {
        let patient_url = format!("urn:uuid:{}", ids.next_id());
        let subject = ReferenceWire {
            reference: patient_url.clone(),
        };

        let mut entries = vec![EntryWire {
            full_url: patient_url,
            resource: ResourceWire::Patient(patient_resource(record)),
        }];

        let push = |entries: &mut Vec<EntryWire>, resource: ResourceWire| {
            entries.push(EntryWire {
                full_url: format!("urn:uuid:{}", ids.next_id()),
                resource,
            });
        };

        for entry in diagnoses {
            push(
                &mut entries,
                ResourceWire::Condition(condition_resource(
                    entry,
                    &subject,
                    terminology,
                    config.language(),
                )),
            );
        }

        for item in allergy_items(record, config, terminology) {
            push(
                &mut entries,
                ResourceWire::AllergyIntolerance(AllergyIntoleranceWire {
                    resource_type: "AllergyIntolerance",
                    code: CodeableConceptWire::text_only(&item),
                    patient: subject.clone(),
                }),
            );
        }

        for statement in medication_statements(record, config, terminology, &subject) {
            push(&mut entries, ResourceWire::MedicationStatement(statement));
        }

        for observation in observations(record, &subject) {
            push(&mut entries, ResourceWire::Observation(observation));
        }

        let bundle = BundleWire {
            resource_type: "Bundle",
            bundle_type: "collection",
            entry: entries,
        };
        Ok(serde_json::to_value(&bundle)?)
    }
}

fn patient_resource(record: &CanonicalRecord) -> PatientWire {
    let d = &record.demographics;

    let name = if d.surname.is_some() || d.given_name.is_some() || d.title.is_some() {
        vec![HumanNameWire {
            family: d.surname.clone(),
            given: d.given_name.clone().into_iter().collect(),
            prefix: d.title.clone(),
        }]
    } else {
        Vec::new()
    };

    let address = if d.street.is_some() || d.city.is_some() || d.postal_code.is_some() {
        vec![AddressWire {
            line: d.street.clone().into_iter().collect(),
            city: d.city.clone(),
            postal_code: d.postal_code.clone(),
            country: d.country.clone(),
        }]
    } else {
        Vec::new()
    };

    let mut telecom = Vec::new();
    if let Some(phone) = &d.phone {
        telecom.push(ContactPointWire {
            system: "phone",
            value: phone.clone(),
        });
    }
    if let Some(email) = &d.email {
        telecom.push(ContactPointWire {
            system: "email",
            value: email.clone(),
        });
    }

    PatientWire {
        resource_type: "Patient",
        name,
        gender: d
            .sex
            .as_deref()
            .map(|s| Sex::from_text(s).fhir_code().to_string()),
        birth_date: d.birth_date.as_deref().and_then(dates::normalize_date),
        address,
        telecom,
    }
}

fn condition_resource(
    entry: &DiagnosisEntry,
    subject: &ReferenceWire,
    terminology: &Terminology,
    language: Language,
) -> ConditionWire {
    // Rule rows may carry no description; the code table fills in.
    let description = if entry.description.is_empty() {
        terminology.describe_code(entry.code.as_str(), language)
    } else {
        Some(entry.description.clone())
    };
    let mut code =
        CodeableConceptWire::coded(SYSTEM_ICD10, entry.code.as_str(), description.as_deref());
    code.text = description;

    let status = verification_status(entry.certainty);
    let mut verification = CodeableConceptWire::coded(SYSTEM_CONDITION_VER_STATUS, status, None);
    // The value set has no historic state, so the localised certainty label
    // keeps the history-of distinction readable.
    verification.text = Some(terminology.translate_or(
        entry.certainty.phrase_key(),
        language,
        status,
    ));

    ConditionWire {
        resource_type: "Condition",
        clinical_status: CodeableConceptWire::coded(SYSTEM_CONDITION_CLINICAL, "active", None),
        verification_status: verification,
        code,
        body_site: body_site(entry.laterality).into_iter().collect(),
        subject: subject.clone(),
    }
}

/// Verification status for a certainty classification. Historic conditions
/// stay `confirmed`; only an explicit exclusion maps to `refuted`.
fn verification_status(certainty: Certainty) -> &'static str {
    match certainty {
        Certainty::Confirmed | Certainty::HistoryOf => "confirmed",
        Certainty::Suspected => "provisional",
        Certainty::Excluded => "refuted",
    }
}

fn body_site(laterality: Laterality) -> Option<CodeableConceptWire> {
    let (code, display) = match laterality {
        Laterality::Right => ("24028007", "Right"),
        Laterality::Left => ("7771000", "Left"),
        Laterality::Bilateral => ("51440002", "Right and left"),
        Laterality::None => return None,
    };
    Some(CodeableConceptWire::coded(SYSTEM_SNOMED, code, Some(display)))
}

fn allergy_items(
    record: &CanonicalRecord,
    config: &ExportConfig,
    terminology: &Terminology,
) -> Vec<String> {
    let mut items: Vec<String> = record
        .answer("allergies")
        .map(AnswerValue::list_items)
        .unwrap_or_default();
    if record.is_affirmative("contrast_media_allergy") {
        items.push(terminology.translate("allergy.contrast_media", config.language()));
    }
    items
}

fn medication_statements(
    record: &CanonicalRecord,
    config: &ExportConfig,
    terminology: &Terminology,
    subject: &ReferenceWire,
) -> Vec<MedicationStatementWire> {
    let language = config.language();
    let mut statements = Vec::new();

    if let Some(AnswerValue::Medications(entries)) = record.answer("medications") {
        for entry in entries {
            let mut name = entry.name.clone();
            if let Some(substance) = &entry.substance {
                name.push_str(&format!(" ({substance})"));
            }

            let dosage_text: Vec<&str> = [
                entry.strength.as_deref(),
                entry.dosage.as_deref(),
                entry.instructions.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();

            statements.push(MedicationStatementWire {
                resource_type: "MedicationStatement",
                status: "active",
                medication: CodeableConceptWire::text_only(&name),
                dosage: if dosage_text.is_empty() {
                    Vec::new()
                } else {
                    vec![DosageWire {
                        text: dosage_text.join(" "),
                    }]
                },
                note: Vec::new(),
                subject: subject.clone(),
            });
        }
    }

    let warning = terminology.translate("note.important_medication", language);
    for (key, phrase_key) in IMPORTANT_MEDICATION_FLAGS {
        if record.is_affirmative(key) {
            statements.push(MedicationStatementWire {
                resource_type: "MedicationStatement",
                status: "active",
                medication: CodeableConceptWire::text_only(
                    &terminology.translate(phrase_key, language),
                ),
                dosage: Vec::new(),
                note: vec![AnnotationWire {
                    text: warning.clone(),
                }],
                subject: subject.clone(),
            });
        }
    }

    statements
}

fn observations(record: &CanonicalRecord, subject: &ReferenceWire) -> Vec<ObservationWire> {
    let mut observations = Vec::new();

    for (key, code, display) in FLAG_OBSERVATIONS {
        if let Some(answer) = record.answer(key) {
            observations.push(ObservationWire {
                resource_type: "Observation",
                status: "final",
                code: CodeableConceptWire::coded(SYSTEM_SNOMED, code, Some(display)),
                subject: subject.clone(),
                value_boolean: Some(answer.is_affirmative()),
                value_quantity: None,
                value_string: None,
            });
        }
    }

    for (key, answer) in &record.answers {
        if !key.starts_with(CUSTOM_FIELD_PREFIX) {
            continue;
        }
        let (value_boolean, value_quantity, value_string) = infer_value(answer);
        observations.push(ObservationWire {
            resource_type: "Observation",
            status: "final",
            code: CodeableConceptWire::text_only(key),
            subject: subject.clone(),
            value_boolean,
            value_quantity,
            value_string,
        });
    }

    observations
}

/// Value-type inference for custom fields: boolean-like answers become a
/// boolean value, numeric tokens a quantity, everything else a string.
fn infer_value(answer: &AnswerValue) -> (Option<bool>, Option<QuantityWire>, Option<String>) {
    match answer {
        AnswerValue::Flag(value) => (Some(*value), None, None),
        AnswerValue::Choice(token) => match token.trim().parse::<f64>() {
            // "inf" and "nan" parse but have no JSON number representation.
            Ok(value) if value.is_finite() => (None, Some(QuantityWire { value }), None),
            _ => (None, None, Some(token.clone())),
        },
        other => (None, None, Some(other.display_text())),
    }
}
