use chrono::NaiveDateTime;

/// Wire format of `publishedAt`
pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Display format, e.g. `Mar 05, 2024 02:07 PM`
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%b %d, %Y %I:%M %p";

/// Parse an API timestamp into its display form
pub fn parse_timestamp(text: &str) -> Option<String> {
    // chrono skips whitespace ahead of numeric fields; the wire shape allows none
    if text.trim() != text {
        return None;
    }
    NaiveDateTime::parse_from_str(text, API_TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.format(DISPLAY_TIMESTAMP_FORMAT).to_string())
}

/// The "Published" value shown for an article
///
/// Blank or missing values yield `None`; values that do not parse are kept as-is.
pub fn normalize_published(raw: Option<&str>) -> Option<String> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    match parse_timestamp(raw) {
        Some(formatted) => Some(formatted),
        None => {
            tracing::debug!("Keeping unparseable publishedAt value: {:?}", raw);
            Some(raw.to_string())
        }
    }
}
