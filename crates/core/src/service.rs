//! The export entry point.

use crate::format::ExportFormat;
use crate::license::LicenseGate;
use crate::{ExportError, ExportResult};
use diagnosis::{Resolver, RuleProvider};
use fhir::FhirEncoder;
use gdt::GdtEncoder;
use hl7::{Hl7Encoder, MessageKind};
use intake_types::{CanonicalRecord, Clock, ExportConfig, IdGenerator};
use terminology::Terminology;

/// One produced export artifact.
#[derive(Clone, Debug)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub file_extension: &'static str,
}

/// Facade over the resolver and the three encoders.
///
/// Holds only borrowed collaborators; one instance can serve any number of
/// concurrent export calls.
pub struct ExportService<'a> {
    config: &'a ExportConfig,
    rules: &'a dyn RuleProvider,
    gate: &'a dyn LicenseGate,
    terminology: &'a Terminology,
    clock: &'a dyn Clock,
    ids: &'a dyn IdGenerator,
}

impl<'a> ExportService<'a> {
    pub fn new(
        config: &'a ExportConfig,
        rules: &'a dyn RuleProvider,
        gate: &'a dyn LicenseGate,
        terminology: &'a Terminology,
        clock: &'a dyn Clock,
        ids: &'a dyn IdGenerator,
    ) -> Self {
        Self {
            config,
            rules,
            gate,
            terminology,
            clock,
            ids,
        }
    }

    /// Export one record in the requested format.
    ///
    /// The licensing gate is consulted exactly once, before any encoding
    /// work; a negative answer aborts the call.
    pub fn export(
        &self,
        record: &CanonicalRecord,
        format: ExportFormat,
    ) -> ExportResult<ExportArtifact> {
        if !self.gate.is_entitled(format, &record.tenant_id) {
            tracing::warn!(%format, tenant = %record.tenant_id, "export not entitled");
            return Err(ExportError::NotEntitled {
                format,
                tenant_id: record.tenant_id.clone(),
            });
        }

        let diagnoses =
            Resolver::new(self.rules).resolve(&record.template_id, &record.tenant_id, record);
        tracing::debug!(
            %format,
            tenant = %record.tenant_id,
            diagnoses = diagnoses.len(),
            "encoding export"
        );

        let bytes = match format {
            ExportFormat::Gdt => GdtEncoder::encode(
                record,
                &diagnoses,
                self.config,
                self.terminology,
                self.clock,
            ),
            ExportFormat::Hl7Admission | ExportFormat::Hl7Observation => {
                let kind = match format {
                    ExportFormat::Hl7Admission => MessageKind::Admission,
                    _ => MessageKind::Observation,
                };
                Hl7Encoder::encode(
                    record,
                    &diagnoses,
                    kind,
                    self.config,
                    self.terminology,
                    self.clock,
                    self.ids,
                )
                .into_bytes()
            }
            ExportFormat::Fhir => {
                let bundle = FhirEncoder::encode(
                    record,
                    &diagnoses,
                    self.config,
                    self.terminology,
                    self.ids,
                )?;
                serde_json::to_vec_pretty(&bundle).map_err(fhir::FhirError::from)?
            }
        };

        Ok(ExportArtifact {
            bytes,
            mime_type: format.mime_type(),
            file_extension: format.file_extension(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::AllowAll;
    use chrono::TimeZone;
    use diagnosis::{DiagnosisRule, InMemoryRules};
    use intake_types::{
        AnswerValue, Certainty, Demographics, FixedClock, Language, SequenceIds,
    };

    struct DenyAll;

    impl LicenseGate for DenyAll {
        fn is_entitled(&self, _format: ExportFormat, _tenant_id: &str) -> bool {
            false
        }
    }

    fn config() -> ExportConfig {
        ExportConfig::new("INTAKE", "PVS", "intake-export", "0.1.0", Language::De).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(chrono::Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap())
    }

    fn sample_record() -> CanonicalRecord {
        CanonicalRecord::new("praxis-001", "ophtha-intake-v2")
            .with_demographics(Demographics {
                surname: Some("Williams".into()),
                given_name: Some("Sarah".into()),
                birth_date: Some("1992-03-20".into()),
                sex: Some("weiblich".into()),
                ..Demographics::default()
            })
            .with_answer("diabetes", AnswerValue::Flag(true))
            .with_answer("diabetes_type", AnswerValue::Choice("type_2".into()))
    }

    fn export(
        record: &CanonicalRecord,
        rules: &InMemoryRules,
        format: ExportFormat,
    ) -> ExportArtifact {
        let config = config();
        let clock = clock();
        let ids = SequenceIds::new("res");
        let service = ExportService::new(
            &config,
            rules,
            &AllowAll,
            Terminology::builtin(),
            &clock,
            &ids,
        );
        service.export(record, format).unwrap()
    }

    #[test]
    fn diabetes_scenario_spans_all_three_formats() {
        let record = sample_record();
        let rules = InMemoryRules::new(vec![]);

        let gdt = export(&record, &rules, ExportFormat::Gdt);
        let text: String = gdt.bytes.iter().map(|&b| b as char).collect();
        assert!(text.contains("E11.30,,G"));
        assert!(text.contains("H36.0,R,G"));
        assert!(text.contains("H36.0,L,G"));
        assert_eq!(gdt.mime_type, "application/x-gdt");
        assert_eq!(gdt.file_extension, ".gdt");

        let hl7 = export(&record, &rules, ExportFormat::Hl7Admission);
        let message = String::from_utf8(hl7.bytes).unwrap();
        assert_eq!(message.matches("DG1|").count(), 3);
        assert_eq!(hl7.mime_type, "application/hl7-v2");

        let fhir = export(&record, &rules, ExportFormat::Fhir);
        let bundle: serde_json::Value = serde_json::from_slice(&fhir.bytes).unwrap();
        let conditions = bundle["entry"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|e| e["resource"]["resourceType"] == "Condition")
            .count();
        assert_eq!(conditions, 3);
        assert_eq!(fhir.mime_type, "application/fhir+json");
    }

    #[test]
    fn negative_entitlement_aborts_before_encoding() {
        let config = config();
        let clock = clock();
        let ids = SequenceIds::new("res");
        let rules = InMemoryRules::new(vec![]);
        let service = ExportService::new(
            &config,
            &rules,
            &DenyAll,
            Terminology::builtin(),
            &clock,
            &ids,
        );

        let err = service
            .export(&sample_record(), ExportFormat::Gdt)
            .unwrap_err();
        match err {
            ExportError::NotEntitled { format, tenant_id } => {
                assert_eq!(format, ExportFormat::Gdt);
                assert_eq!(tenant_id, "praxis-001");
            }
            other => panic!("expected NotEntitled, got {other:?}"),
        }
    }

    #[test]
    fn absent_tenant_rules_do_not_change_the_artifact() {
        let global = DiagnosisRule {
            template_id: "ophtha-intake-v2".into(),
            question_key: "glaucoma".into(),
            code: "H40.9".into(),
            description: "Glaukom".into(),
            certainty: Certainty::Confirmed,
            laterality_question: None,
            tenant_id: None,
            active: true,
            sort_order: 10,
        };
        let mut unrelated = global.clone();
        unrelated.tenant_id = Some("praxis-999".into());
        unrelated.code = "H40.1".into();

        let record = CanonicalRecord::new("praxis-001", "ophtha-intake-v2")
            .with_answer("glaucoma", AnswerValue::Flag(true));

        let global_only = InMemoryRules::new(vec![global.clone()]);
        let with_unrelated_tenant = InMemoryRules::new(vec![global, unrelated]);

        let a = export(&record, &global_only, ExportFormat::Gdt);
        let b = export(&record, &with_unrelated_tenant, ExportFormat::Gdt);
        assert_eq!(a.bytes, b.bytes);
    }
}
