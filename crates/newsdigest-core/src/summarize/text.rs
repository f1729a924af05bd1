use std::sync::OnceLock;

use regex::Regex;

/// NewsAPI cuts `content` at ~200 chars and appends a marker like `… [+2712 chars]`
fn truncation_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"\s*(?:…|\.\.\.)?\s*\[\+\d+ chars\]\s*$").expect("truncation marker regex is valid")
    })
}

/// Article text as it should be fed to the model
pub fn clean_content(content: &str) -> String {
    let stripped = truncation_marker().replace(content, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_truncation_marker() {
        assert_eq!(
            clean_content("Apple unveiled a new chip on Tuesday… [+2712 chars]"),
            "Apple unveiled a new chip on Tuesday"
        );
        assert_eq!(
            clean_content("Markets closed higher... [+15 chars]"),
            "Markets closed higher"
        );
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean_content("  line one\r\n\r\nline   two \t"), "line one line two");
    }

    #[test]
    fn test_marker_only_in_trailing_position() {
        let text = "A [+3 chars] marker mid-sentence stays";
        assert_eq!(clean_content(text), text);
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(clean_content(""), "");
        assert_eq!(clean_content(" [+120 chars]"), "");
    }
}
