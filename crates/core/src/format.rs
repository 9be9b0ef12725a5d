//! Export format selection.

use std::fmt;
use std::str::FromStr;

/// The formats an export can be requested in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Fixed-field (BDT/GDT-style) byte stream.
    Gdt,
    /// Segment-based admission message (`ADT^A01`).
    Hl7Admission,
    /// Segment-based observation message (`ORU^R01`).
    Hl7Observation,
    /// Resource-graph JSON bundle.
    Fhir,
}

impl ExportFormat {
    /// All formats, in the order they are listed to users.
    pub fn all() -> [ExportFormat; 4] {
        [
            ExportFormat::Gdt,
            ExportFormat::Hl7Admission,
            ExportFormat::Hl7Observation,
            ExportFormat::Fhir,
        ]
    }

    /// MIME type of the produced artifact.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Gdt => "application/x-gdt",
            ExportFormat::Hl7Admission | ExportFormat::Hl7Observation => "application/hl7-v2",
            ExportFormat::Fhir => "application/fhir+json",
        }
    }

    /// File extension, including the leading dot.
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Gdt => ".gdt",
            ExportFormat::Hl7Admission | ExportFormat::Hl7Observation => ".hl7",
            ExportFormat::Fhir => ".json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ExportFormat::Gdt => "gdt",
            ExportFormat::Hl7Admission => "hl7-admission",
            ExportFormat::Hl7Observation => "hl7-observation",
            ExportFormat::Fhir => "fhir",
        };
        f.write_str(token)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gdt" => Ok(ExportFormat::Gdt),
            "hl7-admission" => Ok(ExportFormat::Hl7Admission),
            "hl7-observation" => Ok(ExportFormat::Hl7Observation),
            "fhir" => Ok(ExportFormat::Fhir),
            other => Err(format!(
                "unknown export format '{other}' (expected gdt, hl7-admission, hl7-observation or fhir)"
            )),
        }
    }
}
