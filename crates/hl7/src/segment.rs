//! Pipe-delimited segment assembly.

use crate::escape::escape;

/// The MSH-2 encoding-characters declaration: component, repetition, escape
/// and subcomponent separators, in that order.
pub const ENCODING_CHARACTERS: &str = "^~\\&";

/// Builder for one segment. Field values are escaped as they are added, so
/// callers pass raw text and never pre-escape.
#[derive(Debug)]
pub struct Segment {
    fields: Vec<String>,
}

impl Segment {
    /// Start a segment with its three-letter identifier.
    pub fn new(id: &str) -> Self {
        Self {
            fields: vec![id.to_string()],
        }
    }

    /// Append one escaped field.
    pub fn field(mut self, value: &str) -> Self {
        self.fields.push(escape(value));
        self
    }

    /// Append one field composed of `^`-separated components, each escaped
    /// individually so the component separators survive.
    pub fn components(mut self, parts: &[&str]) -> Self {
        let composed = parts.iter().map(|p| escape(p)).collect::<Vec<_>>().join("^");
        self.fields.push(composed);
        self
    }

    /// Append pre-composed field content without escaping. Only for fields
    /// whose content *is* reserved characters (MSH-2) or a fixed
    /// `type^trigger` literal.
    pub fn raw_field(mut self, value: &str) -> Self {
        self.fields.push(value.to_string());
        self
    }

    /// Render the segment as one pipe-joined line, without terminator.
    pub fn render(&self) -> String {
        self.fields.join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_escaped_on_insertion() {
        let segment = Segment::new("NTE").field("1").field("a|b");
        assert_eq!(segment.render(), "NTE|1|a\\F\\b");
    }

    #[test]
    fn components_escape_parts_but_keep_separators() {
        let segment = Segment::new("PID").components(&["Miller", "Anna^Marie"]);
        assert_eq!(segment.render(), "PID|Miller^Anna\\S\\Marie");
    }

    #[test]
    fn raw_fields_pass_through() {
        let segment = Segment::new("MSH").raw_field(ENCODING_CHARACTERS);
        assert_eq!(segment.render(), "MSH|^~\\&");
    }
}
