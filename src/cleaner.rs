//! Article content cleaning.
//!
//! NewsAPI delivers article bodies as short snippets that may still contain
//! markup, and it marks where it cut the text with a `[+N chars]` suffix.
//! [`clean`] turns such a snippet into plain, single-spaced text suitable for
//! the summarizer.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Provider convention for "+N characters truncated".
const TRUNCATION_MARKER: &str = "[+";

/// Clean raw article content.
///
/// 1. `None` or empty input yields an empty string.
/// 2. Every `<...>` tag is removed.
/// 3. Everything from the first `[+` onward is dropped.
/// 4. Whitespace runs (newlines included) collapse to single spaces, trimmed.
///
/// The function is pure and idempotent: `clean(Some(&clean(s))) == clean(s)`.
pub fn clean(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let stripped = HTML_TAG.replace_all(raw, "");
    let kept = match stripped.find(TRUNCATION_MARKER) {
        Some(at) => &stripped[..at],
        None => &stripped[..],
    };

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_none_and_empty() {
        assert_eq!(clean(None), "");
        assert_eq!(clean(Some("")), "");
        assert_eq!(clean(Some("   \n\t ")), "");
    }

    #[test]
    fn test_clean_strips_tags() {
        let out = clean(Some("<p>Shares of <b>Acme</b> rose.</p><br/>"));
        assert_eq!(out, "Shares of Acme rose.");
        assert!(!out.contains("<b>"));
        assert!(!out.contains("<br/>"));
    }

    #[test]
    fn test_clean_tag_with_attributes() {
        let out = clean(Some(r#"<a href="https://example.com" class="x">Link</a> text"#));
        assert_eq!(out, "Link text");
    }

    #[test]
    fn test_clean_cuts_at_truncation_marker() {
        let out = clean(Some("The Federal Reserve held rates steady on Wednesday… [+123 chars]"));
        assert_eq!(out, "The Federal Reserve held rates steady on Wednesday…");
        assert!(!out.contains("chars"));
    }

    #[test]
    fn test_clean_marker_only() {
        assert_eq!(clean(Some("[+4000 chars]")), "");
    }

    #[test]
    fn test_clean_marker_after_tag_removal() {
        // The marker is looked for after tags are gone.
        assert_eq!(clean(Some("Intro [<i></i>+12 chars]")), "Intro");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        let out = clean(Some("  Line one\r\n\r\nLine   two\u{00a0}end\t "));
        assert_eq!(out, "Line one Line two end");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "<div>Hello <span>world</span></div>  [+99 chars]",
            "<<b>>odd <> markup",
            "a < b and c > d",
            "plain text",
            "\n\n<ul><li>one</li>\n<li>two</li></ul>",
            "[ +not a marker] but [+this is",
        ];
        for s in samples {
            let once = clean(Some(s));
            assert_eq!(clean(Some(&once)), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_clean_unmatched_angle_brackets_survive() {
        assert_eq!(clean(Some("profit <> loss")), "profit <> loss");
        assert_eq!(clean(Some("x < y")), "x < y");
    }
}
