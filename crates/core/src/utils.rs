/// Derives the normalized company identifier from a display name.
/// Trims, strips spaces, commas and periods, then lower-cases.
/// Names that normalize to nothing have no identifier.
pub fn derive_company_id(company_name: &str) -> Option<String> {
    let id: String = company_name
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | ',' | '.'))
        .collect::<String>()
        .to_lowercase();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Splits a full name into (first name, remaining names) on single spaces
pub fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split(' ');
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Parses a follower count as exported by the scraper ("1,234", " 56 ", "789.0")
pub fn parse_follower_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }
    // Float-typed exports carry a trailing ".0"
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Trims a string and treats an empty result as missing
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
