//! Export facade for the intake engine.
//!
//! This crate wires the diagnosis resolver and the three format encoders
//! behind one entry point: [`ExportService::export`] selects an encoder by
//! requested [`ExportFormat`] and enforces the licensing precondition before
//! any encoding work starts.
//!
//! **No transport concerns**: reading records from disk, HTTP surfaces or
//! process wiring belong to the callers (see the `intake` binary).

pub mod format;
pub mod license;
pub mod service;

pub use format::ExportFormat;
pub use license::{AllowAll, LicenseGate};
pub use service::{ExportArtifact, ExportService};

/// Errors returned by an export call.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("tenant {tenant_id} is not entitled to format {format}")]
    NotEntitled {
        format: ExportFormat,
        tenant_id: String,
    },

    #[error(transparent)]
    Encode(#[from] fhir::FhirError),
}

/// Type alias for Results that can fail with an [`ExportError`].
pub type ExportResult<T> = Result<T, ExportError>;
