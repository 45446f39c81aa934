//! Utility functions for the Teller portal.

/// Truncate a string to at most `max_chars` characters, appending "..." if
/// truncated.
///
/// Uses character boundaries instead of byte indices, so multi-byte UTF-8
/// content (emoji, CJK, accented characters) is handled safely. Strings of
/// `max_chars` characters or fewer are returned untouched.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
        assert_eq!(truncate_with_ellipsis("😀😀😀😀", 2), "😀😀...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
    }

    #[test]
    fn test_boundary_length_is_untouched() {
        let exactly = "a".repeat(100);
        assert_eq!(truncate_with_ellipsis(&exactly, 100), exactly);

        let over = "b".repeat(150);
        let truncated = truncate_with_ellipsis(&over, 100);
        assert_eq!(truncated.chars().count(), 103);
        assert!(truncated.ends_with("..."));
    }
}
