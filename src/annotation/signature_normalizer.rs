// Tue Jan 13 2026 - Alex

use crate::model::Signature;
use once_cell::sync::Lazy;
use regex::Regex;

// Longest leading run of C-identifier characters: strips compiler-appended
// suffixes such as ".constprop.28" from a symbol or signature name.
static FUNCTION_PREFIX_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>[_A-Za-z0-9]+)([^_A-Za-z0-9].*)?$").unwrap());

// Example: "get_range.lto.2501[driver/accel_kionix.c:327]"
static ANNOTATION_SIGNATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[^\[]+)(\[(?P<path>[^:]+)(:(?P<linenum>\d+))?\])?$").unwrap()
});

/// Strips a compiler-appended suffix from a raw symbol/signature name,
/// keeping just the C-identifier prefix. `None` if the text has none.
pub fn strip_prefix_name(text: &str) -> Option<String> {
    FUNCTION_PREFIX_NAME_RE
        .captures(text)
        .map(|caps| caps["name"].to_string())
}

fn canonicalize_best_effort(path: &str) -> String {
    std::fs::canonicalize(path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Parses and normalizes raw annotation signature text (§4.4): `NAME`,
/// `NAME[PATH]`, or `NAME[PATH:LINE]`. Returns `None` on any parse failure,
/// in which case the raw text belongs in `invalid_signatures`.
pub fn normalize_signature(text: &str) -> Option<Signature> {
    let caps = ANNOTATION_SIGNATURE_RE.captures(text.trim())?;
    let name = strip_prefix_name(caps["name"].trim())?;

    let path = caps.name("path").map(|m| canonicalize_best_effort(m.as_str().trim()));
    let line = caps
        .name("linenum")
        .and_then(|m| m.as_str().trim().parse::<u32>().ok());

    Some(Signature::new(name, path, line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_compiler_suffix() {
        assert_eq!(strip_prefix_name("SHA256_transform.constprop.28").as_deref(), Some("SHA256_transform"));
    }

    #[test]
    fn parses_bare_name() {
        let sig = normalize_signature("motion_lid_calc").unwrap();
        assert_eq!(sig.name(), "motion_lid_calc");
        assert_eq!(sig.path(), None);
        assert_eq!(sig.line(), None);
    }

    #[test]
    fn parses_name_with_path_and_line() {
        let sig = normalize_signature("get_range[driver/accel_kionix.c:327]").unwrap();
        assert_eq!(sig.name(), "get_range");
        assert!(sig.path().is_some());
        assert_eq!(sig.line(), Some(327));
    }
}
