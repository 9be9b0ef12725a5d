//! Length-framed field writing.
//!
//! Every frame is `LEN(3, zero-padded) + TAG(4) + content + CRLF` where `LEN`
//! counts the entire frame including its own prefix and the CRLF. Lengths are
//! measured **after** transcoding the content to the single-byte target
//! charset; measuring UTF-8 lengths first would miscompute frame boundaries
//! for any non-ASCII content.

const PREFIX_LEN: usize = 7; // 3-digit length + 4-digit tag
const TERMINATOR_LEN: usize = 2; // CRLF

/// Maximum total frame length in bytes.
pub const MAX_FRAME_LEN: usize = 999;

/// Maximum content length after transcoding.
pub const MAX_CONTENT_LEN: usize = MAX_FRAME_LEN - PREFIX_LEN - TERMINATOR_LEN;

/// Transcode to ISO 8859-1 with best-effort `?` substitution for characters
/// outside the Latin-1 range. Returns the bytes and whether any substitution
/// happened.
fn to_latin1(text: &str) -> (Vec<u8>, bool) {
    let mut lossy = false;
    let bytes = text
        .chars()
        .map(|c| {
            let code_point = c as u32;
            if code_point <= 0xFF {
                code_point as u8
            } else {
                lossy = true;
                b'?'
            }
        })
        .collect();
    (bytes, lossy)
}

/// Accumulates framed fields into one byte stream.
#[derive(Debug, Default)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one field under `tag`.
    ///
    /// Multi-line values are split on newline boundaries; each non-empty
    /// line becomes its own frame under the same tag. Leading indentation is
    /// preserved (anamnesis blocks use it for nested detail lines); trailing
    /// whitespace is not. Empty values emit nothing. Content whose frame
    /// would exceed [`MAX_FRAME_LEN`] is truncated so the emitted frame is
    /// exactly the maximum.
    pub fn field(&mut self, tag: &str, value: &str) {
        debug_assert_eq!(tag.len(), 4, "field tags are 4 digits");

        for line in value.split('\n') {
            let line = line.trim_end_matches('\r').trim_end();
            if line.trim().is_empty() {
                continue;
            }

            let (mut bytes, lossy) = to_latin1(line);
            if lossy {
                tracing::warn!(tag, "substituted characters outside the target charset");
            }
            if bytes.len() > MAX_CONTENT_LEN {
                tracing::warn!(tag, length = bytes.len(), "truncating overlong field content");
                bytes.truncate(MAX_CONTENT_LEN);
            }

            let total = bytes.len() + PREFIX_LEN + TERMINATOR_LEN;
            self.buf.extend_from_slice(format!("{total:03}").as_bytes());
            self.buf.extend_from_slice(tag.as_bytes());
            self.buf.extend_from_slice(&bytes);
            self.buf.extend_from_slice(b"\r\n");
        }
    }

    /// Finish writing and take the byte stream.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Split a byte stream back into (tag, content) pairs, verifying each
/// declared length against the actual frame. Test support only.
#[cfg(test)]
pub(crate) fn parse_frames(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut frames = Vec::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        let declared: usize = std::str::from_utf8(&rest[..3]).unwrap().parse().unwrap();
        let frame = &rest[..declared];
        assert_eq!(&frame[declared - 2..], b"\r\n");
        let tag = std::str::from_utf8(&frame[3..7]).unwrap().to_string();
        frames.push((tag, frame[7..declared - 2].to_vec()));
        rest = &rest[declared..];
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_carry_their_total_length() {
        let mut writer = FieldWriter::new();
        writer.field("3101", "Williams");
        let bytes = writer.into_bytes();

        // 8 content bytes + 7 prefix + 2 CRLF = 17.
        assert_eq!(&bytes[..3], b"017");
        assert_eq!(&bytes[3..7], b"3101");
        assert_eq!(bytes.len(), 17);
    }

    #[test]
    fn length_counts_target_charset_bytes_not_utf8() {
        let mut writer = FieldWriter::new();
        writer.field("3101", "Müller");
        let bytes = writer.into_bytes();

        // "Müller" is 7 bytes in UTF-8 but 6 in ISO 8859-1.
        assert_eq!(&bytes[..3], b"015");
        assert_eq!(bytes[7 + 1], 0xFC); // ü as a single Latin-1 byte
    }

    #[test]
    fn characters_outside_latin1_are_substituted() {
        let mut writer = FieldWriter::new();
        writer.field("6210", "cost: 5€");
        let frames = parse_frames(&writer.into_bytes());
        assert_eq!(frames[0].1, b"cost: 5?");
    }

    #[test]
    fn overlong_content_truncates_to_exactly_max_frame() {
        let mut writer = FieldWriter::new();
        writer.field("6220", &"a".repeat(2000));
        let bytes = writer.into_bytes();

        assert_eq!(bytes.len(), MAX_FRAME_LEN);
        assert_eq!(&bytes[..3], b"999");
        let frames = parse_frames(&bytes);
        assert_eq!(frames[0].1.len(), MAX_CONTENT_LEN);
    }

    #[test]
    fn multi_line_values_become_one_frame_per_line() {
        let mut writer = FieldWriter::new();
        writer.field("6220", "first\nsecond\n\n  \nthird");
        let frames = parse_frames(&writer.into_bytes());

        assert_eq!(frames.len(), 3);
        for (tag, _) in &frames {
            assert_eq!(tag, "6220");
        }
        assert_eq!(frames[2].1, b"third");
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let mut writer = FieldWriter::new();
        writer.field("6220", "first\r\nsecond");
        let frames = parse_frames(&writer.into_bytes());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].1, b"first");
    }

    #[test]
    fn empty_values_emit_nothing() {
        let mut writer = FieldWriter::new();
        writer.field("3104", "");
        writer.field("3104", "   ");
        assert!(writer.into_bytes().is_empty());
    }
}
