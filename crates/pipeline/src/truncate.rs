//! Character-bounded truncation for model payloads.
//!
//! Document content is truncated before being sent to the generation service
//! to respect payload limits. Counting characters instead of bytes keeps the
//! cuts on UTF-8 boundaries.

/// Take at most `max_chars` characters from the start of `text`.
pub fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Take the first `head_chars` and last `tail_chars` characters of `text`,
/// marking the elision. Short texts are returned unchanged.
pub fn head_tail(text: &str, head_chars: usize, tail_chars: usize) -> String {
    let total = text.chars().count();
    if total <= head_chars + tail_chars {
        return text.to_string();
    }

    let head = prefix(text, head_chars);
    let tail_start = text
        .char_indices()
        .nth(total - tail_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    format!("{}\n[...]\n{}", head, &text[tail_start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_short_text_unchanged() {
        assert_eq!(prefix("hello", 10), "hello");
    }

    #[test]
    fn test_prefix_cuts_at_char_count() {
        assert_eq!(prefix("hello world", 5), "hello");
    }

    #[test]
    fn test_prefix_multibyte_safe() {
        // Each 'é' is two bytes; a byte slice at 3 would panic
        let text = "ééééé";
        assert_eq!(prefix(text, 3), "ééé");
    }

    #[test]
    fn test_head_tail_short_text_unchanged() {
        assert_eq!(head_tail("short", 10, 10), "short");
    }

    #[test]
    fn test_head_tail_elides_middle() {
        let text = "aaaaabbbbbccccc";
        let result = head_tail(text, 5, 5);
        assert!(result.starts_with("aaaaa"));
        assert!(result.ends_with("ccccc"));
        assert!(result.contains("[...]"));
        assert!(!result.contains('b'));
    }

    #[test]
    fn test_head_tail_exact_boundary_unchanged() {
        let text = "aaaaabbbbb";
        assert_eq!(head_tail(text, 5, 5), text);
    }
}
