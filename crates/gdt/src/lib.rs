//! Fixed-field (BDT/GDT-style) record encoding.
//!
//! This crate serialises a canonical record plus its resolved diagnoses into
//! the length-framed field format ingested by German practice-management
//! systems: every field is `LEN(3) + TAG(4) + content + CRLF`, with `LEN`
//! counting the whole frame in bytes of the single-byte target charset.
//!
//! Encoding never fails. Overlong content is truncated to a still-valid
//! frame, unmappable characters are substituted, and absent data is omitted.

pub mod encoder;
pub mod fields;
pub mod frame;
pub mod wrap;

pub use encoder::GdtEncoder;
pub use frame::{FieldWriter, MAX_CONTENT_LEN, MAX_FRAME_LEN};
pub use wrap::wrap_text;
