use std::borrow::Cow;

/// Strip HTML tags from product descriptions.
///
/// Upstream product bodies arrive as HTML (`body_html`); merchant feed
/// descriptions must be plain text. Removes everything between `<` and the
/// matching `>`, including the brackets. Unterminated tags (a `<` with no
/// closing `>`) are dropped to the end of the string rather than emitted.
///
/// Returns `Cow::Borrowed` when the input contains no `<` (common for
/// already-clean descriptions) — a single byte scan with no allocation.
///
/// This does not decode entities: `&amp;` stays `&amp;`, which is exactly
/// what a feed item body needs since the output is re-embedded in XML.
pub fn strip_html_tags(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();

    // Fast path: no tags at all
    if !bytes.contains(&b'<') {
        return Cow::Borrowed(s);
    }

    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        if bytes[i] == b'<' {
            // Skip until the closing '>' (or end of input for a broken tag)
            i += 1;
            while i < len && bytes[i] != b'>' {
                i += 1;
            }
            if i < len {
                i += 1; // consume '>'
            }
        } else {
            // Batch-copy the run of non-tag bytes
            let start = i;
            while i < len && bytes[i] != b'<' {
                i += 1;
            }
            // '<' is ASCII and cannot appear mid-codepoint in valid UTF-8,
            // so s[start..i] is always a valid slice.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

/// Truncate a string to at most `max_chars` characters, respecting
/// char boundaries. Used to cap descriptions at the Merchant Center
/// limit (5000 characters).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Collapse runs of whitespace (including newlines left behind by block
/// tags) into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> Cow<'_, str> {
    let trimmed = s.trim();
    if !trimmed
        .chars()
        .any(|c| c == '\n' || c == '\r' || c == '\t')
        && !trimmed.contains("  ")
    {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut last_was_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "A plain product description with no markup.";
        let result = strip_html_tags(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_strip_simple_tags() {
        let input = "<p>Soft cotton <strong>t-shirt</strong> in blue.</p>";
        assert_eq!(strip_html_tags(input), "Soft cotton t-shirt in blue.");
    }

    #[test]
    fn test_strip_tags_with_attributes() {
        let input = r#"<a href="https://example.com" class="link">Details</a> here"#;
        assert_eq!(strip_html_tags(input), "Details here");
    }

    #[test]
    fn test_strip_unterminated_tag() {
        let input = "Before <img src=\"broken";
        assert_eq!(strip_html_tags(input), "Before ");
    }

    #[test]
    fn test_strip_preserves_entities() {
        let input = "<p>Salt &amp; pepper</p>";
        assert_eq!(strip_html_tags(input), "Salt &amp; pepper");
    }

    #[test]
    fn test_strip_empty_string() {
        let result = strip_html_tags("");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "");
    }

    #[test]
    fn test_strip_unicode_preserved() {
        let input = "<p>Gemütlich — ふわふわ</p>";
        assert_eq!(strip_html_tags(input), "Gemütlich — ふわふわ");
    }

    #[test]
    fn test_strip_adjacent_tags() {
        let input = "<div><br/><span>x</span></div>";
        assert_eq!(strip_html_tags(input), "x");
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_chars_exact() {
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_chars_cuts() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_chars_multibyte_boundary() {
        // Each char is multi-byte; must not panic or split a codepoint
        assert_eq!(truncate_chars("日本語テスト", 3), "日本語");
    }

    #[test]
    fn test_collapse_whitespace_clean_returns_borrowed() {
        let result = collapse_whitespace("already clean");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "already clean");
    }

    #[test]
    fn test_collapse_whitespace_newlines_and_runs() {
        assert_eq!(
            collapse_whitespace("  line one\n\n  line two\tend  "),
            "line one line two end"
        );
    }
}
