//! Fixed-column line wrapping for free-text request summaries.

/// Wrap `text` at `width` columns, breaking on word boundaries. Words longer
/// than the width are hard-split. Existing newlines start a fresh line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word;
            // Hard-split words that can never fit on one line.
            while word.chars().count() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split_at = word
                    .char_indices()
                    .nth(width)
                    .map(|(idx, _)| idx)
                    .unwrap_or(word.len());
                lines.push(word[..split_at].to_string());
                word = &word[split_at..];
            }
            if word.is_empty() {
                continue;
            }

            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("please check the left eye for retinal changes", 20);
        assert_eq!(
            lines,
            vec!["please check the", "left eye for retinal", "changes"]
        );
        assert!(lines.iter().all(|line| line.chars().count() <= 20));
    }

    #[test]
    fn keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("short note", 70), vec!["short note"]);
    }

    #[test]
    fn hard_splits_overlong_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn respects_existing_line_breaks() {
        let lines = wrap_text("first\nsecond paragraph", 70);
        assert_eq!(lines, vec!["first", "second paragraph"]);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(wrap_text("", 70).is_empty());
        assert!(wrap_text("   \n  ", 70).is_empty());
    }
}
