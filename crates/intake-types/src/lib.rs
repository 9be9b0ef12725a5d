//! Domain primitives and the canonical intake record model.
//!
//! This crate defines the data that every export encoder consumes:
//! - [`CanonicalRecord`]: one decrypted, parsed questionnaire submission
//! - [`AnswerValue`]: the closed set of answer shapes a submission can carry
//! - Clinical code enums ([`Laterality`], [`Certainty`], [`Sex`]) with their
//!   per-format renderings
//! - Injected capabilities ([`Clock`], [`IdGenerator`]) so encoder output is
//!   reproducible under test
//!
//! **No format concerns**: serialisation into GDT frames, HL7 segments or FHIR
//! resources belongs in the `gdt`, `hl7` and `fhir` crates.

pub mod answer;
pub mod codes;
pub mod config;
pub mod dates;
pub mod ports;
pub mod record;
pub mod text;

pub use answer::{AnswerValue, MedicationEntry};
pub use codes::{Certainty, Language, Laterality, Sex};
pub use config::ExportConfig;
pub use ports::{Clock, FixedClock, IdGenerator, SequenceIds, SystemClock, UuidGenerator};
pub use record::{CanonicalRecord, Demographics};
pub use text::NonEmptyText;

/// Errors returned when building or parsing canonical records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`RecordError`].
pub type RecordResult<T> = Result<T, RecordError>;
