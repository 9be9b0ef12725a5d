//! Resource-graph (FHIR R4-style) bundle encoding.
//!
//! This crate serialises a canonical record plus its resolved diagnoses into
//! a JSON `Bundle` of type `collection`: one Patient resource first, then
//! Condition, AllergyIntolerance, MedicationStatement and Observation
//! resources, all referencing the Patient by a freshly generated `urn:uuid:`
//! identifier.
//!
//! Output direction only; the import direction is out of scope.

pub mod encoder;
pub mod wire;

pub use encoder::FhirEncoder;

/// Errors returned by the `fhir` crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("failed to serialise bundle: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
