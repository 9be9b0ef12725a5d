//! Diagnosis rule rows and rule-table providers.
//!
//! Rules are authored by an administrative collaborator and read-only to the
//! engine. A global rule (no tenant) is the default; a tenant-specific rule
//! with the same (template, question key) pair replaces it entirely.

use crate::{DiagnosisError, DiagnosisResult};
use intake_types::Certainty;
use serde::{Deserialize, Serialize};

/// One row of the answer-to-diagnosis mapping table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosisRule {
    /// Questionnaire template this rule applies to.
    pub template_id: String,

    /// Answer key that triggers the rule.
    pub question_key: String,

    /// Diagnosis code to emit.
    pub code: String,

    /// Human-readable description of the diagnosis.
    pub description: String,

    /// Diagnostic confidence emitted with the entry.
    pub certainty: Certainty,

    /// Answer key whose value carries the laterality, if any.
    pub laterality_question: Option<String>,

    /// Owning tenant; `None` marks a global default rule.
    pub tenant_id: Option<String>,

    /// Inactive rules are ignored during resolution.
    pub active: bool,

    /// Primary ordering of resolved entries.
    pub sort_order: i32,
}

/// Source of rule rows for a (template, tenant) pair.
///
/// Implementations must return both the tenant-specific rows and the global
/// defaults; override merging is the resolver's concern. Row order must be
/// stable across calls so resolution stays deterministic.
pub trait RuleProvider {
    fn rules_for(&self, template_id: &str, tenant_id: &str) -> Vec<DiagnosisRule>;
}

/// In-memory rule table, typically loaded from a YAML file at startup.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRules {
    rules: Vec<DiagnosisRule>,
}

impl InMemoryRules {
    pub fn new(rules: Vec<DiagnosisRule>) -> Self {
        Self { rules }
    }

    /// Parse a rule table from YAML text.
    ///
    /// Uses `serde_path_to_error` to surface the failing field path on schema
    /// mismatch.
    pub fn parse(yaml_text: &str) -> DiagnosisResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, RuleTableWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(DiagnosisError::Translation(format!(
                    "Rule table schema mismatch at {path}: {source}"
                )));
            }
        };

        Ok(Self::new(wire.rules.into_iter().map(RuleWire::into_domain).collect()))
    }

    pub fn rules(&self) -> &[DiagnosisRule] {
        &self.rules
    }
}

impl RuleProvider for InMemoryRules {
    fn rules_for(&self, template_id: &str, tenant_id: &str) -> Vec<DiagnosisRule> {
        self.rules
            .iter()
            .filter(|rule| rule.template_id == template_id)
            .filter(|rule| match &rule.tenant_id {
                Some(tenant) => tenant == tenant_id,
                None => true,
            })
            .cloned()
            .collect()
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct RuleTableWire {
    pub rules: Vec<RuleWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct RuleWire {
    #[serde(rename = "templateId")]
    pub template_id: String,

    #[serde(rename = "questionKey")]
    pub question_key: String,

    pub code: String,

    #[serde(default)]
    pub description: String,

    /// Certainty token (`confirmed`, `suspected`, `history-of`, `excluded`
    /// or the single-letter forms); defaults to confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certainty: Option<String>,

    #[serde(
        rename = "lateralityQuestion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub laterality_question: Option<String>,

    #[serde(rename = "tenantId", default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(rename = "sortOrder", default)]
    pub sort_order: i32,
}

fn default_active() -> bool {
    true
}

impl RuleWire {
    fn into_domain(self) -> DiagnosisRule {
        DiagnosisRule {
            template_id: self.template_id,
            question_key: self.question_key,
            code: self.code,
            description: self.description,
            certainty: self
                .certainty
                .as_deref()
                .map(Certainty::from_token)
                .unwrap_or(Certainty::Confirmed),
            laterality_question: self.laterality_question,
            tenant_id: self.tenant_id,
            active: self.active,
            sort_order: self.sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"rules:
  - templateId: ophtha-intake-v2
    questionKey: glaucoma
    code: H40.9
    description: Glaukom
    certainty: suspected
    lateralityQuestion: glaucoma_side
    sortOrder: 10
  - templateId: ophtha-intake-v2
    questionKey: glaucoma
    code: H40.1
    description: Offenwinkelglaukom
    tenantId: praxis-001
    sortOrder: 10
  - templateId: other-template
    questionKey: glaucoma
    code: H40.9
"#;

    #[test]
    fn parses_rule_table_yaml() {
        let table = InMemoryRules::parse(SAMPLE).expect("parse rules");
        assert_eq!(table.rules().len(), 3);

        let first = &table.rules()[0];
        assert_eq!(first.certainty, Certainty::Suspected);
        assert_eq!(first.laterality_question.as_deref(), Some("glaucoma_side"));
        assert!(first.active);
        assert_eq!(first.tenant_id, None);
    }

    #[test]
    fn rules_for_scopes_by_template_and_tenant() {
        let table = InMemoryRules::parse(SAMPLE).expect("parse rules");

        let rows = table.rules_for("ophtha-intake-v2", "praxis-001");
        assert_eq!(rows.len(), 2);

        // A different tenant sees only the global row.
        let rows = table.rules_for("ophtha-intake-v2", "praxis-999");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tenant_id, None);

        let rows = table.rules_for("unknown-template", "praxis-001");
        assert!(rows.is_empty());
    }

    #[test]
    fn rejects_unknown_keys_with_path() {
        let input = "rules:\n  - templateId: t\n    questionKey: q\n    code: X\n    bogus: 1\n";
        let err = InMemoryRules::parse(input).expect_err("should reject");
        match err {
            DiagnosisError::Translation(msg) => assert!(msg.contains("bogus")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }
}
