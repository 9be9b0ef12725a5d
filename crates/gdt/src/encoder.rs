//! Record encoding into the fixed segment sequence.
//!
//! Segment order is fixed: communication header, file header, patient
//! segment, treatment segment (anamnesis blocks, then diagnoses, then
//! medications, then findings), file trailer, communication trailer. Each
//! segment begins by emitting its own record-type field.

use crate::fields::*;
use crate::frame::FieldWriter;
use crate::wrap::wrap_text;
use diagnosis::special::{AmdForm, DiabetesType};
use diagnosis::DiagnosisEntry;
use intake_types::{dates, AnswerValue, CanonicalRecord, Clock, ExportConfig, Language, Sex};
use terminology::Terminology;

/// Column width for wrapped request summaries.
pub const REQUEST_WRAP_WIDTH: usize = 70;

/// Answer keys rendered as pre-existing conditions in the anamnesis block,
/// with their phrase keys.
const CONDITION_KEYS: &[(&str, &str)] = &[
    ("diabetes", "condition.diabetes"),
    ("hypertension", "condition.hypertension"),
    ("glaucoma", "condition.glaucoma"),
    ("cataract", "condition.cataract"),
    ("macular_degeneration", "condition.macular_degeneration"),
];

/// Answer keys rendered in the ocular-history block.
const EYE_HISTORY_KEYS: &[(&str, &str)] = &[
    ("visual_aid", "eye.visual_aid"),
    ("contact_lenses", "eye.contact_lenses"),
];

/// Fixed-field record encoder.
pub struct GdtEncoder;

impl GdtEncoder {
    /// Serialise one record and its resolved diagnoses into a framed byte
    /// stream. Infallible: anomalies degrade into omission, substitution or
    /// truncation, never into a broken stream.
    pub fn encode(
        record: &CanonicalRecord,
        diagnoses: &[DiagnosisEntry],
        config: &ExportConfig,
        terminology: &Terminology,
        clock: &dyn Clock,
    ) -> Vec<u8> {
        let language = config.language();
        let mut writer = FieldWriter::new();

        // Communication header
        writer.field(TAG_RECORD_TYPE, REC_COMM_HEADER);
        writer.field(TAG_SOFTWARE, config.software_name());
        writer.field(TAG_SOFTWARE_VERSION, config.software_version());
        writer.field(TAG_SENDER_ID, config.sender_id());
        writer.field(TAG_RECEIVER_ID, config.receiver_id());
        writer.field(TAG_CHARSET, CHARSET_ISO_8859_1);
        writer.field(
            TAG_CREATION_DATE,
            &clock.now().format("%d%m%Y").to_string(),
        );

        // File header
        writer.field(TAG_RECORD_TYPE, REC_FILE_HEADER);
        writer.field(TAG_TENANT_ID, &record.tenant_id);
        writer.field(TAG_TEMPLATE_ID, &record.template_id);

        Self::patient_segment(&mut writer, record);
        Self::treatment_segment(&mut writer, record, diagnoses, terminology, language);

        // Trailers
        writer.field(TAG_RECORD_TYPE, REC_FILE_TRAILER);
        writer.field(TAG_RECORD_TYPE, REC_COMM_TRAILER);

        writer.into_bytes()
    }

    fn patient_segment(writer: &mut FieldWriter, record: &CanonicalRecord) {
        let d = &record.demographics;
        writer.field(TAG_RECORD_TYPE, REC_PATIENT);
        writer.field(TAG_SURNAME, d.surname.as_deref().unwrap_or(""));
        writer.field(TAG_GIVEN_NAME, d.given_name.as_deref().unwrap_or(""));
        if let Some(birth) = d.birth_date.as_deref().and_then(dates::gdt_date) {
            writer.field(TAG_BIRTH_DATE, &birth);
        }
        writer.field(TAG_TITLE, d.title.as_deref().unwrap_or(""));

        let postal_city = match (d.postal_code.as_deref(), d.city.as_deref()) {
            (Some(postal), Some(city)) => format!("{postal} {city}"),
            (Some(postal), None) => postal.to_string(),
            (None, Some(city)) => city.to_string(),
            (None, None) => String::new(),
        };
        writer.field(TAG_POSTAL_CITY, &postal_city);
        writer.field(TAG_STREET, d.street.as_deref().unwrap_or(""));

        if let Some(sex) = d.sex.as_deref() {
            writer.field(TAG_SEX, Sex::from_text(sex).gdt_code());
        }
        writer.field(TAG_EMAIL, d.email.as_deref().unwrap_or(""));
        writer.field(TAG_PHONE, d.phone.as_deref().unwrap_or(""));
    }

    fn treatment_segment(
        writer: &mut FieldWriter,
        record: &CanonicalRecord,
        diagnoses: &[DiagnosisEntry],
        terminology: &Terminology,
        language: Language,
    ) {
        writer.field(TAG_RECORD_TYPE, REC_TREATMENT);

        let anamnesis = build_anamnesis(record, terminology, language);
        writer.field(TAG_ANAMNESIS, &anamnesis);

        for entry in diagnoses {
            writer.field(TAG_DIAGNOSIS, &diagnosis_line(entry));
        }

        if let Some(AnswerValue::Medications(entries)) = record.answer("medications") {
            for entry in entries {
                writer.field(TAG_MEDICATION, &entry.summary());
            }
        }

        if let Some(findings) = record.answer("findings").map(AnswerValue::display_text) {
            writer.field(TAG_FINDINGS, &findings);
        }

        if let Some(request) = record.answer("request").map(AnswerValue::display_text) {
            let wrapped = wrap_text(&request, REQUEST_WRAP_WIDTH).join("\n");
            writer.field(TAG_REQUEST, &wrapped);
        }
    }
}

/// Diagnosis line content: `code,laterality-letter,certainty-letter`, with
/// the laterality position left empty when there is no sidedness.
fn diagnosis_line(entry: &DiagnosisEntry) -> String {
    format!(
        "{},{},{}",
        entry.code.as_str(),
        entry.laterality.letter(),
        entry.certainty.letter()
    )
}

/// Concatenate the conditionally-included anamnesis phrase lines, with
/// two-space sub-indentation for nested detail lines.
fn build_anamnesis(
    record: &CanonicalRecord,
    terminology: &Terminology,
    language: Language,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    let mut conditions: Vec<String> = Vec::new();
    for (key, phrase_key) in CONDITION_KEYS {
        if !record.is_affirmative(key) {
            continue;
        }
        conditions.push(format!("- {}", terminology.translate(phrase_key, language)));

        if *key == "diabetes" {
            if let Some(diabetes_type) = record
                .answer_token("diabetes_type")
                .and_then(DiabetesType::from_token)
            {
                let detail_key = match diabetes_type {
                    DiabetesType::Type1 => "detail.diabetes_type_1",
                    DiabetesType::Type2 => "detail.diabetes_type_2",
                };
                conditions.push(format!("  {}", terminology.translate(detail_key, language)));
            }
        }
        if *key == "macular_degeneration" {
            if let Some(form) = record
                .answer_token("macular_degeneration_type")
                .and_then(AmdForm::from_token)
            {
                conditions.push(format!("  {}", form.description()));
            }
        }
    }
    if !conditions.is_empty() {
        lines.push(format!(
            "{}:",
            terminology.translate("category.preexisting", language)
        ));
        lines.append(&mut conditions);
    }

    let mut eye_history: Vec<String> = Vec::new();
    for (key, phrase_key) in EYE_HISTORY_KEYS {
        if record.is_affirmative(key) {
            eye_history.push(format!("- {}", terminology.translate(phrase_key, language)));
        }
    }
    if !eye_history.is_empty() {
        lines.push(format!(
            "{}:",
            terminology.translate("category.eye_history", language)
        ));
        lines.append(&mut eye_history);
    }

    let mut allergies: Vec<String> = Vec::new();
    if let Some(answer) = record.answer("allergies") {
        for item in answer.list_items() {
            allergies.push(format!("- {item}"));
        }
    }
    if record.is_affirmative("contrast_media_allergy") {
        allergies.push(format!(
            "- {}",
            terminology.translate("allergy.contrast_media", language)
        ));
    }
    if !allergies.is_empty() {
        lines.push(format!(
            "{}:",
            terminology.translate("category.allergies", language)
        ));
        lines.append(&mut allergies);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::parse_frames;
    use chrono::TimeZone;
    use intake_types::{Certainty, Demographics, FixedClock, Laterality, NonEmptyText};

    fn config() -> ExportConfig {
        ExportConfig::new("INTAKE", "PVS", "intake-export", "0.1.0", Language::De).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(chrono::Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap())
    }

    fn entry(code: &str, laterality: Laterality) -> DiagnosisEntry {
        DiagnosisEntry {
            code: NonEmptyText::new(code).unwrap(),
            description: String::new(),
            certainty: Certainty::Confirmed,
            laterality,
        }
    }

    fn sample_record() -> CanonicalRecord {
        CanonicalRecord::new("praxis-001", "ophtha-intake-v2")
            .with_demographics(Demographics {
                surname: Some("Müller".into()),
                given_name: Some("Anna".into()),
                birth_date: Some("20.03.1992".into()),
                sex: Some("weiblich".into()),
                street: Some("Hauptstr. 5".into()),
                postal_code: Some("10115".into()),
                city: Some("Berlin".into()),
                ..Demographics::default()
            })
            .with_answer("diabetes", AnswerValue::Flag(true))
            .with_answer("diabetes_type", AnswerValue::Choice("type_2".into()))
            .with_answer("allergies", AnswerValue::Text("pollen; penicillin".into()))
    }

    fn frames_text(bytes: &[u8]) -> Vec<(String, String)> {
        parse_frames(bytes)
            .into_iter()
            .map(|(tag, content)| {
                // Latin-1 bytes map 1:1 onto Unicode scalar values.
                (tag, content.iter().map(|&b| b as char).collect())
            })
            .collect()
    }

    #[test]
    fn segment_order_is_fixed() {
        let bytes = GdtEncoder::encode(
            &sample_record(),
            &[],
            &config(),
            Terminology::builtin(),
            &clock(),
        );
        let record_types: Vec<String> = frames_text(&bytes)
            .into_iter()
            .filter(|(tag, _)| tag == TAG_RECORD_TYPE)
            .map(|(_, content)| content)
            .collect();
        assert_eq!(
            record_types,
            vec!["0020", "0021", "6100", "6200", "0022", "0023"]
        );
    }

    #[test]
    fn diagnosis_lines_for_diabetes_type_2() {
        let diagnoses = vec![
            entry("E11.30", Laterality::None),
            entry("H36.0", Laterality::Right),
            entry("H36.0", Laterality::Left),
        ];
        let bytes = GdtEncoder::encode(
            &sample_record(),
            &diagnoses,
            &config(),
            Terminology::builtin(),
            &clock(),
        );
        let lines: Vec<String> = frames_text(&bytes)
            .into_iter()
            .filter(|(tag, _)| tag == TAG_DIAGNOSIS)
            .map(|(_, content)| content)
            .collect();
        assert_eq!(lines, vec!["E11.30,,G", "H36.0,R,G", "H36.0,L,G"]);
    }

    #[test]
    fn patient_segment_carries_demographics() {
        let bytes = GdtEncoder::encode(
            &sample_record(),
            &[],
            &config(),
            Terminology::builtin(),
            &clock(),
        );
        let frames = frames_text(&bytes);
        let field = |tag: &str| {
            frames
                .iter()
                .find(|(t, _)| t == tag)
                .map(|(_, content)| content.clone())
        };

        assert_eq!(field(TAG_SURNAME).as_deref(), Some("Müller"));
        assert_eq!(field(TAG_BIRTH_DATE).as_deref(), Some("20031992"));
        assert_eq!(field(TAG_POSTAL_CITY).as_deref(), Some("10115 Berlin"));
        assert_eq!(field(TAG_SEX).as_deref(), Some("2"));
        // No title was supplied, so the field is absent entirely.
        assert_eq!(field(TAG_TITLE), None);
        assert_eq!(field(TAG_CREATION_DATE).as_deref(), Some("15052024"));
    }

    #[test]
    fn anamnesis_block_nests_detail_lines() {
        let record = sample_record();
        let text = build_anamnesis(&record, Terminology::builtin(), Language::De);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Vorerkrankungen:",
                "- Diabetes mellitus",
                "  Typ 2",
                "Allergien:",
                "- pollen",
                "- penicillin",
            ]
        );
    }

    #[test]
    fn anamnesis_lines_become_individual_frames() {
        let bytes = GdtEncoder::encode(
            &sample_record(),
            &[],
            &config(),
            Terminology::builtin(),
            &clock(),
        );
        let anamnesis: Vec<String> = frames_text(&bytes)
            .into_iter()
            .filter(|(tag, _)| tag == TAG_ANAMNESIS)
            .map(|(_, content)| content)
            .collect();
        assert_eq!(anamnesis.len(), 6);
        assert_eq!(anamnesis[2], "  Typ 2");
    }

    #[test]
    fn single_token_findings_survive_wire_classification() {
        // A short whitespace-free answer parses as a choice token, not free
        // text; the findings field must be emitted either way.
        let record = CanonicalRecord::parse(
            "tenantId: praxis-001\ntemplateId: ophtha-intake-v2\nanswers:\n  findings: stable\n",
        )
        .unwrap();
        let bytes = GdtEncoder::encode(
            &record,
            &[],
            &config(),
            Terminology::builtin(),
            &clock(),
        );
        let findings: Vec<String> = frames_text(&bytes)
            .into_iter()
            .filter(|(tag, _)| tag == TAG_FINDINGS)
            .map(|(_, content)| content)
            .collect();
        assert_eq!(findings, vec!["stable"]);
    }

    #[test]
    fn request_summary_is_word_wrapped() {
        let record = sample_record().with_answer(
            "request",
            AnswerValue::Text("word ".repeat(40).trim_end().to_string()),
        );
        let bytes = GdtEncoder::encode(
            &record,
            &[],
            &config(),
            Terminology::builtin(),
            &clock(),
        );
        let request_frames: Vec<String> = frames_text(&bytes)
            .into_iter()
            .filter(|(tag, _)| tag == TAG_REQUEST)
            .map(|(_, content)| content)
            .collect();
        assert!(request_frames.len() > 1);
        assert!(request_frames
            .iter()
            .all(|line| line.chars().count() <= REQUEST_WRAP_WIDTH));
    }

}
