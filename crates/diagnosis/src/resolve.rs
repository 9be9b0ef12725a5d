//! Rule resolution.
//!
//! `resolve(template, tenant, record)` produces the ordered, deduplicated
//! diagnosis entry list shared by all export encoders. The algorithm:
//!
//! 1. Fetch active rules for the template and tenant (including globals).
//! 2. Tenant-specific rules replace the global rule for the same question key
//!    entirely (full replacement, not field-level merge).
//! 3. Skip rules whose answer is not an affirmative token.
//! 4. Apply special-case expansion for diabetes and macular degeneration;
//!    resolve declared laterality sources for everything else.
//! 5. Deduplicate by (code, laterality), preserving first-seen order.
//! 6. When no configured rules exist, fall back to a small built-in table so
//!    exports degrade gracefully instead of emitting no diagnoses at all.

use crate::rules::{DiagnosisRule, RuleProvider};
use crate::special::{self, AmdForm, DiabetesType, SpecialRule};
use intake_types::{CanonicalRecord, Certainty, Laterality, NonEmptyText};
use std::collections::HashSet;

/// One resolved diagnosis, produced fresh per export call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosisEntry {
    /// Diagnosis code; guaranteed non-empty.
    pub code: NonEmptyText,

    /// Human-readable description.
    pub description: String,

    /// Diagnostic confidence.
    pub certainty: Certainty,

    /// Anatomical sidedness.
    pub laterality: Laterality,
}

impl DiagnosisEntry {
    fn build(
        code: &str,
        description: &str,
        certainty: Certainty,
        laterality: Laterality,
    ) -> Option<Self> {
        match NonEmptyText::new(code) {
            Ok(code) => Some(Self {
                code,
                description: description.to_string(),
                certainty,
                laterality,
            }),
            Err(_) => {
                tracing::warn!(description, "skipping diagnosis rule without a code");
                None
            }
        }
    }
}

/// Diagnosis resolution engine over an injected rule provider.
pub struct Resolver<'a> {
    provider: &'a dyn RuleProvider,
}

impl<'a> Resolver<'a> {
    pub fn new(provider: &'a dyn RuleProvider) -> Self {
        Self { provider }
    }

    /// Resolve the diagnosis entries for one record.
    ///
    /// Deterministic for a given (template, tenant, record) triple; never
    /// fails. Worst case is an empty list.
    pub fn resolve(
        &self,
        template_id: &str,
        tenant_id: &str,
        record: &CanonicalRecord,
    ) -> Vec<DiagnosisEntry> {
        let mut rules: Vec<DiagnosisRule> = self
            .provider
            .rules_for(template_id, tenant_id)
            .into_iter()
            .filter(|rule| rule.active)
            .collect();

        // Tenant rules win entirely over the global rule for the same key.
        let tenant_keys: HashSet<String> = rules
            .iter()
            .filter(|rule| rule.tenant_id.is_some())
            .map(|rule| rule.question_key.clone())
            .collect();
        rules.retain(|rule| rule.tenant_id.is_some() || !tenant_keys.contains(&rule.question_key));

        // Stable sort keeps insertion order within equal sort_order values.
        rules.sort_by_key(|rule| rule.sort_order);

        if rules.is_empty() {
            rules = builtin_rules(template_id);
        }

        evaluate(&rules, record)
    }
}

fn evaluate(rules: &[DiagnosisRule], record: &CanonicalRecord) -> Vec<DiagnosisEntry> {
    let mut entries = Vec::new();
    let mut seen: HashSet<(String, Laterality)> = HashSet::new();

    for rule in rules {
        if !record.is_affirmative(&rule.question_key) {
            continue;
        }

        let expanded = match SpecialRule::for_question(&rule.question_key) {
            Some(SpecialRule::Diabetes) => expand_diabetes(rule, record),
            Some(SpecialRule::MacularDegeneration) => expand_macular_degeneration(rule, record),
            None => generic_entry(rule, record).into_iter().collect(),
        };

        for entry in expanded {
            let key = (entry.code.as_str().to_string(), entry.laterality);
            if seen.insert(key) {
                entries.push(entry);
            }
        }
    }

    entries
}

/// Diabetes expansion: a recognised type answer emits the type-specific
/// systemic code plus one retinopathy entry per eye, regardless of what
/// laterality source the base rule declares. Anything else emits a single
/// generic code with no laterality.
fn expand_diabetes(rule: &DiagnosisRule, record: &CanonicalRecord) -> Vec<DiagnosisEntry> {
    let diabetes_type = record
        .answer_token(special::QK_DIABETES_TYPE)
        .and_then(DiabetesType::from_token);

    match diabetes_type {
        Some(diabetes_type) => [
            DiagnosisEntry::build(
                diabetes_type.systemic_code(),
                diabetes_type.description(),
                rule.certainty,
                Laterality::None,
            ),
            DiagnosisEntry::build(
                special::CODE_DIABETIC_RETINOPATHY,
                special::DESC_DIABETIC_RETINOPATHY,
                rule.certainty,
                Laterality::Right,
            ),
            DiagnosisEntry::build(
                special::CODE_DIABETIC_RETINOPATHY,
                special::DESC_DIABETIC_RETINOPATHY,
                rule.certainty,
                Laterality::Left,
            ),
        ]
        .into_iter()
        .flatten()
        .collect(),
        None => DiagnosisEntry::build(
            special::CODE_DIABETES_GENERIC,
            special::DESC_DIABETES_GENERIC,
            rule.certainty,
            Laterality::None,
        )
        .into_iter()
        .collect(),
    }
}

/// Macular degeneration: the wet/dry sub-answer selects the code; the
/// declared laterality source still applies. Without a recognised sub-answer
/// the rule's own code is used.
fn expand_macular_degeneration(
    rule: &DiagnosisRule,
    record: &CanonicalRecord,
) -> Vec<DiagnosisEntry> {
    let laterality = declared_laterality(rule, record);

    let (code, description) = match record
        .answer_token(special::QK_MACULAR_DEGENERATION_TYPE)
        .and_then(AmdForm::from_token)
    {
        Some(form) => (form.code(), form.description()),
        None => (rule.code.as_str(), rule.description.as_str()),
    };

    DiagnosisEntry::build(code, description, rule.certainty, laterality)
        .into_iter()
        .collect()
}

fn generic_entry(rule: &DiagnosisRule, record: &CanonicalRecord) -> Option<DiagnosisEntry> {
    DiagnosisEntry::build(
        &rule.code,
        &rule.description,
        rule.certainty,
        declared_laterality(rule, record),
    )
}

fn declared_laterality(rule: &DiagnosisRule, record: &CanonicalRecord) -> Laterality {
    rule.laterality_question
        .as_deref()
        .map(|key| record.laterality_of(key))
        .unwrap_or(Laterality::None)
}

/// Built-in fallback table keyed by well-known question keys, used when a
/// template has no configured rules at all.
fn builtin_rules(template_id: &str) -> Vec<DiagnosisRule> {
    let row = |order: i32, key: &str, code: &str, description: &str| DiagnosisRule {
        template_id: template_id.to_string(),
        question_key: key.to_string(),
        code: code.to_string(),
        description: description.to_string(),
        certainty: Certainty::Confirmed,
        laterality_question: Some(format!("{key}_side")),
        tenant_id: None,
        active: true,
        sort_order: order,
    };

    vec![
        row(10, special::QK_DIABETES, special::CODE_DIABETES_GENERIC, special::DESC_DIABETES_GENERIC),
        row(
            20,
            special::QK_MACULAR_DEGENERATION,
            special::CODE_AMD_DRY,
            special::DESC_AMD_DRY,
        ),
        row(30, "glaucoma", "H40.9", "Glaukom, nicht näher bezeichnet"),
        row(40, "cataract", "H26.9", "Katarakt, nicht näher bezeichnet"),
        row(50, "hypertension", "I10", "Essentielle Hypertonie"),
    ]
}
