//! Reserved-character escaping for segment field content.
//!
//! The reserved set is `|` (field), `^` (component), `&` (subcomponent),
//! `~` (repetition) and `\` (escape); line breaks map to the `\.br\` token.

/// Escape reserved characters in one field value.
///
/// The escape character is replaced first: replacing it in any later position
/// would re-escape the backslashes introduced by the other tokens.
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\E\\")
        .replace("\r\n", "\\.br\\")
        .replace('\r', "\\.br\\")
        .replace('\n', "\\.br\\")
        .replace('|', "\\F\\")
        .replace('^', "\\S\\")
        .replace('&', "\\T\\")
        .replace('~', "\\R\\")
}

/// Reverse [`escape`]. Unknown escape sequences and a trailing lone
/// backslash are kept verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('\\') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('\\') {
            Some(end) => {
                match &after[..end] {
                    "E" => out.push('\\'),
                    ".br" => out.push('\n'),
                    "F" => out.push('|'),
                    "S" => out.push('^'),
                    "T" => out.push('&'),
                    "R" => out.push('~'),
                    token => {
                        out.push('\\');
                        out.push_str(token);
                        out.push('\\');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push('\\');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_each_reserved_character() {
        assert_eq!(escape("a|b"), "a\\F\\b");
        assert_eq!(escape("a^b"), "a\\S\\b");
        assert_eq!(escape("a&b"), "a\\T\\b");
        assert_eq!(escape("a~b"), "a\\R\\b");
        assert_eq!(escape("a\\b"), "a\\E\\b");
        assert_eq!(escape("a\nb"), "a\\.br\\b");
        assert_eq!(escape("a\r\nb"), "a\\.br\\b");
    }

    #[test]
    fn escape_character_is_handled_before_the_rest() {
        // A naive ordering would turn the backslash of \F\ into \E\ again.
        assert_eq!(escape("\\|"), "\\E\\\\F\\");
        assert_eq!(unescape("\\E\\\\F\\"), "\\|");
    }

    #[test]
    fn round_trips_mixed_content() {
        let original = "check left|right eye ^ both & more ~ done \\ end";
        assert_eq!(unescape(&escape(original)), original);
    }

    #[test]
    fn unknown_sequences_are_kept_verbatim() {
        assert_eq!(unescape("a\\X41\\b"), "a\\X41\\b");
        assert_eq!(unescape("dangling\\"), "dangling\\");
    }
}
