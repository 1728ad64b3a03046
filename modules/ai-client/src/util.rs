/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code fences from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```text")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Strip a short leading label such as `Keywords:` or `Categories -` that
/// models like to put in front of list answers.
///
/// Only the first line is inspected, and only a label of at most three words
/// is removed, so sentences that merely contain a colon are left intact.
pub fn strip_list_label(response: &str) -> &str {
    let trimmed = response.trim_start();
    let first_line = trimmed.lines().next().unwrap_or("");
    let Some(idx) = first_line.find(':') else {
        return trimmed;
    };
    let label = &first_line[..idx];
    if label.is_empty() || label.split_whitespace().count() > 3 || label.contains(',') {
        return trimmed;
    }
    trimmed[idx + 1..].trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn truncate_within_bounds_is_identity() {
        assert_eq!(truncate_to_char_boundary("Hello", 100), "Hello");
    }

    #[test]
    fn code_fences_are_removed() {
        assert_eq!(strip_code_blocks("```\nPets, Animals\n```"), "Pets, Animals");
        assert_eq!(strip_code_blocks("```text\ncats\n```"), "cats");
        assert_eq!(strip_code_blocks("cats"), "cats");
    }

    #[test]
    fn short_labels_are_removed() {
        assert_eq!(strip_list_label("Keywords: cats, dogs"), "cats, dogs");
        assert_eq!(strip_list_label("Suggested categories: Pets"), "Pets");
    }

    #[test]
    fn sentences_with_colons_are_kept() {
        let text = "The article argues that pets matter: cats, dogs";
        assert_eq!(strip_list_label(text), text);
        assert_eq!(strip_list_label("cats, dogs: ferrets"), "cats, dogs: ferrets");
    }
}
