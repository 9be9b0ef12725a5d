//! Field tags and record types of the fixed-field format.
//!
//! Tags are the 4-digit field identifiers emitted after each length prefix;
//! record types are the values of the `8000` field that open each segment.

/// Record type, opens every segment.
pub const TAG_RECORD_TYPE: &str = "8000";
/// Name of the generating software.
pub const TAG_SOFTWARE: &str = "0102";
/// Version of the generating software.
pub const TAG_SOFTWARE_VERSION: &str = "0132";
/// Identifier of the receiving system.
pub const TAG_RECEIVER_ID: &str = "8315";
/// Identifier of the sending system.
pub const TAG_SENDER_ID: &str = "8316";
/// Character set indicator.
pub const TAG_CHARSET: &str = "9206";
/// Creation date (`DDMMYYYY`).
pub const TAG_CREATION_DATE: &str = "9103";
/// Questionnaire template identifier.
pub const TAG_TEMPLATE_ID: &str = "8402";
/// Tenant (practice location) identifier.
pub const TAG_TENANT_ID: &str = "0201";

pub const TAG_SURNAME: &str = "3101";
pub const TAG_GIVEN_NAME: &str = "3102";
/// Birth date (`DDMMYYYY`).
pub const TAG_BIRTH_DATE: &str = "3103";
pub const TAG_TITLE: &str = "3104";
/// Postal code and city in one field.
pub const TAG_POSTAL_CITY: &str = "3106";
pub const TAG_STREET: &str = "3107";
/// Sex digit (1 = male, 2 = female); omitted when unknown.
pub const TAG_SEX: &str = "3110";
pub const TAG_EMAIL: &str = "3619";
pub const TAG_PHONE: &str = "3626";

/// Anamnesis free-text line.
pub const TAG_ANAMNESIS: &str = "6220";
/// Diagnosis line `code,laterality,certainty`.
pub const TAG_DIAGNOSIS: &str = "6001";
/// Medication line.
pub const TAG_MEDICATION: &str = "6230";
/// Findings free-text line.
pub const TAG_FINDINGS: &str = "6210";
/// Request/service summary line (word-wrapped).
pub const TAG_REQUEST: &str = "6227";

pub const REC_COMM_HEADER: &str = "0020";
pub const REC_FILE_HEADER: &str = "0021";
pub const REC_PATIENT: &str = "6100";
pub const REC_TREATMENT: &str = "6200";
pub const REC_FILE_TRAILER: &str = "0022";
pub const REC_COMM_TRAILER: &str = "0023";

/// Charset indicator value for ISO 8859-1.
pub const CHARSET_ISO_8859_1: &str = "3";
