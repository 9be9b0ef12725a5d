//! Segment-based (HL7 v2.x-style) message encoding.
//!
//! This crate serialises a canonical record plus its resolved diagnoses into
//! pipe-delimited, CR-terminated segments. Two message shapes exist: an
//! admission message (`ADT^A01`) carrying diagnosis and allergy segments, and
//! an observation message (`ORU^R01`) carrying one generic observation
//! segment per answered question.
//!
//! Encoding never fails; absent data is omitted field by field.

pub mod encoder;
pub mod escape;
pub mod segment;

pub use encoder::{Hl7Encoder, MessageKind};
pub use escape::{escape, unescape};
pub use segment::Segment;
