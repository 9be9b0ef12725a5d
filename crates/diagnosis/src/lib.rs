//! Diagnosis resolution rule engine.
//!
//! Merges a global rule set with tenant (practice location) overrides and
//! evaluates per-answer special cases to produce an ordered, deduplicated
//! list of diagnosis entries. All three export encoders consume that list;
//! none of them re-derives diagnosis codes on their own.
//!
//! Resolution never fails: malformed rule rows are skipped with a warning and
//! the worst case is an empty list.

pub mod resolve;
pub mod rules;
pub mod special;

pub use resolve::{DiagnosisEntry, Resolver};
pub use rules::{DiagnosisRule, InMemoryRules, RuleProvider};
pub use special::SpecialRule;

/// Errors returned by the `diagnosis` crate.
///
/// Only the rule-table wire parsing raises; resolution itself degrades
/// gracefully instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`DiagnosisError`].
pub type DiagnosisResult<T> = Result<T, DiagnosisError>;
