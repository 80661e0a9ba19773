/// Value written for any text field that came back empty
pub const PLACEHOLDER: &str = "N/A";

/// Value written when no rating could be read
pub const MISSING_RATING: &str = "0";

/// Trims a raw field value, treating a missing value as empty
pub fn clean_text(raw: Option<&str>) -> &str {
    raw.map(str::trim).unwrap_or_default()
}

/// Trims a raw field value and substitutes the placeholder when nothing is left
pub fn normalize_field(raw: Option<&str>) -> String {
    match clean_text(raw) {
        "" => PLACEHOLDER.to_string(),
        text => text.to_string(),
    }
}

/// Reduces rating text such as `"4.8 (1,204)"` or `"(4.5)"` to its leading token
///
/// Parentheses are dropped before splitting so a bracketed score still survives.
pub fn normalize_rating(raw: Option<&str>) -> String {
    let stripped = clean_text(raw).replace(['(', ')'], "");
    stripped
        .split_whitespace()
        .next()
        .unwrap_or(MISSING_RATING)
        .to_string()
}
