//! Date normalisation helpers.
//!
//! Questionnaire submissions carry dates either in German notation
//! (`DD.MM.YYYY`) or already in ISO form (`YYYY-MM-DD`). Encoders need one of
//! three renderings; all three return `None` for unparseable input so that
//! the corresponding field is simply omitted.

use chrono::NaiveDate;

fn parse(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d.%m.%Y"))
        .ok()
}

/// ISO `YYYY-MM-DD`, as used in FHIR resources.
pub fn normalize_date(input: &str) -> Option<String> {
    parse(input).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Compact `YYYYMMDD`, as used in HL7 v2 date fields.
pub fn compact_date(input: &str) -> Option<String> {
    parse(input).map(|date| date.format("%Y%m%d").to_string())
}

/// `DDMMYYYY`, as used in GDT field content.
pub fn gdt_date(input: &str) -> Option<String> {
    parse(input).map(|date| date.format("%d%m%Y").to_string())
}
