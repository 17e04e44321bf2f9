//! Version requirement normalization

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+[0-9A-Za-z.\-]*").unwrap());

/// Extract the first numeric-leading version token from a raw requirement
/// string (`v1.2.3` -> `1.2.3`, `1+build` -> `1`). When no numeric token
/// exists the raw string is kept as-is.
pub fn normalize_requirement(raw: &str) -> String {
    match VERSION_TOKEN_RE.find(raw) {
        Some(m) => m.as_str().to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_requirement;

    #[test]
    fn strips_prefixes_and_build_metadata() {
        assert_eq!(normalize_requirement("1.2.3"), "1.2.3");
        assert_eq!(normalize_requirement("v1.2.3"), "1.2.3");
        assert_eq!(normalize_requirement("1+meta"), "1");
        assert_eq!(normalize_requirement("foo1.2.3"), "1.2.3");
        assert_eq!(normalize_requirement(""), "");
    }

    #[test]
    fn keeps_non_numeric_requirements_verbatim() {
        assert_eq!(normalize_requirement("latest"), "latest");
        assert_eq!(normalize_requirement("*"), "*");
    }
}
