//! Message assembly for the two supported message shapes.

use crate::segment::{Segment, ENCODING_CHARACTERS};
use diagnosis::DiagnosisEntry;
use intake_types::{dates, AnswerValue, CanonicalRecord, Clock, ExportConfig, IdGenerator, Sex};
use terminology::Terminology;

/// Segment terminator; segments are joined with a single CR, including after
/// the final segment.
pub const SEGMENT_TERMINATOR: char = '\r';

const VERSION_ID: &str = "2.3";
const PROCESSING_ID: &str = "P";

/// The two supported message shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// Admission message carrying diagnosis and allergy segments.
    Admission,
    /// Observation message carrying one OBX per answered question.
    Observation,
}

impl MessageKind {
    /// MSH-9 `type^trigger` literal.
    pub fn message_type(&self) -> &'static str {
        match self {
            MessageKind::Admission => "ADT^A01",
            MessageKind::Observation => "ORU^R01",
        }
    }
}

/// Segment-based message encoder.
pub struct Hl7Encoder;

impl Hl7Encoder {
    /// Serialise one record and its resolved diagnoses into a CR-terminated
    /// segment stream. Infallible: absent data is omitted field by field.
    pub fn encode(
        record: &CanonicalRecord,
        diagnoses: &[DiagnosisEntry],
        kind: MessageKind,
        config: &ExportConfig,
        terminology: &Terminology,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
    ) -> String {
        let mut segments = vec![
            msh_segment(kind, config, clock, ids),
            pid_segment(record),
        ];

        match kind {
            MessageKind::Admission => {
                segments.extend(dg1_segments(diagnoses, config, terminology));
                segments.extend(al1_segments(record, config, terminology));
            }
            MessageKind::Observation => {
                segments.extend(obx_segments(record));
            }
        }

        let mut message = String::new();
        for segment in &segments {
            message.push_str(&segment.render());
            message.push(SEGMENT_TERMINATOR);
        }
        message
    }
}

fn msh_segment(
    kind: MessageKind,
    config: &ExportConfig,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> Segment {
    Segment::new("MSH")
        .raw_field(ENCODING_CHARACTERS)
        .field(config.software_name())
        .field(config.sender_id())
        .field(config.receiver_id())
        .field("")
        .field(&clock.now().format("%Y%m%d%H%M%S").to_string())
        .field("")
        .raw_field(kind.message_type())
        .field(&ids.next_id())
        .field(PROCESSING_ID)
        .field(VERSION_ID)
}

fn pid_segment(record: &CanonicalRecord) -> Segment {
    let d = &record.demographics;
    let birth = d
        .birth_date
        .as_deref()
        .and_then(dates::compact_date)
        .unwrap_or_default();
    let sex = d.sex.as_deref().map(Sex::from_text).unwrap_or(Sex::Unknown);

    Segment::new("PID")
        .field("1")
        .field("")
        .field("")
        .field("")
        .components(&[
            d.surname.as_deref().unwrap_or(""),
            d.given_name.as_deref().unwrap_or(""),
        ])
        .field("")
        .field(&birth)
        .field(sex.hl7_code())
        .field("")
        .field("")
        .components(&[
            d.street.as_deref().unwrap_or(""),
            "",
            d.city.as_deref().unwrap_or(""),
            "",
            d.postal_code.as_deref().unwrap_or(""),
            d.country.as_deref().unwrap_or(""),
        ])
        .field("")
        .field(d.phone.as_deref().unwrap_or(""))
}

fn dg1_segments(
    diagnoses: &[DiagnosisEntry],
    config: &ExportConfig,
    terminology: &Terminology,
) -> Vec<Segment> {
    let language = config.language();
    diagnoses
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            // Rule rows may carry no description; the code table fills in.
            let description = if entry.description.is_empty() {
                terminology
                    .describe_code(entry.code.as_str(), language)
                    .unwrap_or_default()
            } else {
                entry.description.clone()
            };
            let laterality = entry
                .laterality
                .phrase_key()
                .map(|key| terminology.translate(key, language))
                .unwrap_or_default();
            Segment::new("DG1")
                .field(&(index + 1).to_string())
                .field("I10")
                .components(&[entry.code.as_str(), &description, "I10"])
                .field(&laterality)
                .field(entry.certainty.letter())
        })
        .collect()
}

fn al1_segments(
    record: &CanonicalRecord,
    config: &ExportConfig,
    terminology: &Terminology,
) -> Vec<Segment> {
    let mut items: Vec<String> = record
        .answer("allergies")
        .map(AnswerValue::list_items)
        .unwrap_or_default();
    if record.is_affirmative("contrast_media_allergy") {
        items.push(terminology.translate("allergy.contrast_media", config.language()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Segment::new("AL1")
                .field(&(index + 1).to_string())
                .field("")
                .field(item)
        })
        .collect()
}

fn obx_segments(record: &CanonicalRecord) -> Vec<Segment> {
    record
        .answers
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .enumerate()
        .map(|(index, (key, value))| {
            Segment::new("OBX")
                .field(&(index + 1).to_string())
                .field("ST")
                .components(&[key, &humanize(key)])
                .field("")
                .field(&value.display_text())
        })
        .collect()
}

/// Human-readable label from a question key: underscores become spaces and
/// the first character is upper-cased.
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::unescape;
    use chrono::TimeZone;
    use intake_types::{
        Certainty, Demographics, FixedClock, Language, Laterality, NonEmptyText, SequenceIds,
    };

    fn config() -> ExportConfig {
        ExportConfig::new("INTAKE", "PVS", "intake-export", "0.1.0", Language::De).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(chrono::Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap())
    }

    fn encode(record: &CanonicalRecord, diagnoses: &[DiagnosisEntry], kind: MessageKind) -> String {
        Hl7Encoder::encode(
            record,
            diagnoses,
            kind,
            &config(),
            Terminology::builtin(),
            &clock(),
            &SequenceIds::new("msg"),
        )
    }

    fn entry(code: &str, laterality: Laterality) -> DiagnosisEntry {
        DiagnosisEntry {
            code: NonEmptyText::new(code).unwrap(),
            description: format!("desc {code}"),
            certainty: Certainty::Confirmed,
            laterality,
        }
    }

    fn sample_record() -> CanonicalRecord {
        CanonicalRecord::new("praxis-001", "ophtha-intake-v2").with_demographics(Demographics {
            surname: Some("Williams".into()),
            given_name: Some("Sarah".into()),
            birth_date: Some("1992-03-20".into()),
            sex: Some("weiblich".into()),
            street: Some("Hauptstr. 5".into()),
            postal_code: Some("10115".into()),
            city: Some("Berlin".into()),
            country: Some("DE".into()),
            ..Demographics::default()
        })
    }

    fn segments(message: &str) -> Vec<&str> {
        message.split_terminator(SEGMENT_TERMINATOR).collect()
    }

    #[test]
    fn msh_declares_encoding_type_and_version() {
        let message = encode(&sample_record(), &[], MessageKind::Admission);
        let segments = segments(&message);
        let msh: Vec<&str> = segments[0].split('|').collect();

        assert_eq!(msh[0], "MSH");
        assert_eq!(msh[1], "^~\\&");
        assert_eq!(msh[2], "intake-export");
        assert_eq!(msh[3], "INTAKE");
        assert_eq!(msh[4], "PVS");
        assert_eq!(msh[6], "20240515143000");
        assert_eq!(msh[8], "ADT^A01");
        assert_eq!(msh[9], "msg-0001");
        assert_eq!(msh[10], "P");
        assert_eq!(msh[11], "2.3");
    }

    #[test]
    fn message_ends_with_a_segment_terminator() {
        let message = encode(&sample_record(), &[], MessageKind::Observation);
        assert!(message.ends_with(SEGMENT_TERMINATOR));
        assert!(!message.contains('\n'));
    }

    #[test]
    fn pid_carries_name_birth_sex_and_address() {
        let message = encode(&sample_record(), &[], MessageKind::Admission);
        let binding = segments(&message);
        let pid: Vec<&str> = binding[1].split('|').collect();

        assert_eq!(pid[0], "PID");
        assert_eq!(pid[5], "Williams^Sarah");
        assert_eq!(pid[7], "19920320");
        assert_eq!(pid[8], "F");
        assert_eq!(pid[11], "Hauptstr. 5^^Berlin^^10115^DE");
    }

    #[test]
    fn admission_emits_one_dg1_per_diagnosis_entry() {
        let diagnoses = vec![
            entry("E11.30", Laterality::None),
            entry("H36.0", Laterality::Right),
            entry("H36.0", Laterality::Left),
        ];
        let message = encode(&sample_record(), &diagnoses, MessageKind::Admission);
        let dg1: Vec<&str> = segments(&message)
            .into_iter()
            .filter(|s| s.starts_with("DG1"))
            .collect();

        assert_eq!(dg1.len(), 3);
        assert_eq!(dg1[0], "DG1|1|I10|E11.30^desc E11.30^I10||G");
        assert_eq!(dg1[1], "DG1|2|I10|H36.0^desc H36.0^I10|rechts|G");
        assert_eq!(dg1[2], "DG1|3|I10|H36.0^desc H36.0^I10|links|G");
    }

    #[test]
    fn dg1_description_falls_back_to_the_code_table() {
        let diagnoses = vec![DiagnosisEntry {
            code: NonEmptyText::new("I10").unwrap(),
            description: String::new(),
            certainty: Certainty::Confirmed,
            laterality: Laterality::None,
        }];
        let message = encode(&sample_record(), &diagnoses, MessageKind::Admission);
        let dg1 = segments(&message)
            .into_iter()
            .find(|s| s.starts_with("DG1"))
            .expect("one DG1 segment");
        assert_eq!(dg1, "DG1|1|I10|I10^Essentielle Hypertonie^I10||G");
    }

    #[test]
    fn allergy_answers_split_into_al1_segments() {
        let record = sample_record()
            .with_answer("allergies", AnswerValue::Text("pollen; penicillin".into()))
            .with_answer("contrast_media_allergy", AnswerValue::Flag(true));
        let message = encode(&record, &[], MessageKind::Admission);
        let al1: Vec<&str> = segments(&message)
            .into_iter()
            .filter(|s| s.starts_with("AL1"))
            .collect();

        assert_eq!(
            al1,
            vec!["AL1|1||pollen", "AL1|2||penicillin", "AL1|3||Kontrastmittel"]
        );
    }

    #[test]
    fn observation_emits_obx_in_declaration_order() {
        let record = sample_record()
            .with_answer("diabetes", AnswerValue::Flag(true))
            .with_answer("diabetes_type", AnswerValue::Choice("type_2".into()))
            .with_answer("_session", AnswerValue::Text("internal".into()))
            .with_answer("notes", AnswerValue::Items(vec!["a".into(), "b".into()]));
        let message = encode(&record, &[], MessageKind::Observation);
        let obx: Vec<&str> = segments(&message)
            .into_iter()
            .filter(|s| s.starts_with("OBX"))
            .collect();

        assert_eq!(
            obx,
            vec![
                "OBX|1|ST|diabetes^Diabetes||yes",
                "OBX|2|ST|diabetes_type^Diabetes type||type_2",
                "OBX|3|ST|notes^Notes||a, b",
            ]
        );
    }

    #[test]
    fn embedded_pipe_survives_field_splitting_and_unescaping() {
        let original = "pressure high | check left eye";
        let record =
            sample_record().with_answer("notes", AnswerValue::Text(original.into()));
        let message = encode(&record, &[], MessageKind::Observation);
        let obx = segments(&message)
            .into_iter()
            .find(|s| s.starts_with("OBX"))
            .expect("one OBX segment");

        let fields: Vec<&str> = obx.split('|').collect();
        // The embedded pipe must not add a spurious field boundary.
        assert_eq!(fields.len(), 6);
        assert_eq!(unescape(fields[5]), original);
    }
}
