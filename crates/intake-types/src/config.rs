//! Export configuration.
//!
//! Resolved once at process startup and passed into the encoders by
//! reference. The intent is to avoid reading process-wide environment
//! variables during export handling, which can lead to inconsistent behaviour
//! in multi-threaded runtimes and test harnesses.

use crate::codes::Language;
use crate::{RecordError, RecordResult};

/// Identification and language settings carried into every export artifact.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    sender_id: String,
    receiver_id: String,
    software_name: String,
    software_version: String,
    language: Language,
}

impl ExportConfig {
    /// Create a new `ExportConfig`.
    ///
    /// Sender and receiver identifiers must be non-empty; they end up in the
    /// GDT communication header and the HL7 message header.
    pub fn new(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        software_name: impl Into<String>,
        software_version: impl Into<String>,
        language: Language,
    ) -> RecordResult<Self> {
        let sender_id = sender_id.into();
        let receiver_id = receiver_id.into();
        if sender_id.trim().is_empty() {
            return Err(RecordError::InvalidInput("sender_id cannot be empty".into()));
        }
        if receiver_id.trim().is_empty() {
            return Err(RecordError::InvalidInput(
                "receiver_id cannot be empty".into(),
            ));
        }

        Ok(Self {
            sender_id,
            receiver_id,
            software_name: software_name.into(),
            software_version: software_version.into(),
            language,
        })
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn receiver_id(&self) -> &str {
        &self.receiver_id
    }

    pub fn software_name(&self) -> &str {
        &self.software_name
    }

    pub fn software_version(&self) -> &str {
        &self.software_version
    }

    pub fn language(&self) -> Language {
        self.language
    }
}
