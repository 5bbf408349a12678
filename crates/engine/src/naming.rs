//! Filesystem-safe, collision-free display names.

use std::collections::HashSet;

/// Used when a name is missing or sanitizes to nothing.
pub const DEFAULT_NAME: &str = "image";
/// Longest name (in characters) [`sanitize`] will return.
pub const MAX_NAME_CHARS: usize = 255;

const ILLEGAL: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make `name` safe to use as a file name.
///
/// Control characters and `< > : " / \ | ? *` become `_`, surrounding
/// whitespace is trimmed, and the result is cut to [`MAX_NAME_CHARS`]
/// characters. Missing or empty names become [`DEFAULT_NAME`].
///
/// Idempotent: sanitizing a sanitized name changes nothing.
///
/// ```
/// use imgrab_engine::naming::sanitize;
/// assert_eq!(sanitize(Some("  hero: v2/final ")), "hero_ v2_final");
/// assert_eq!(sanitize(Some("   ")), "image");
/// assert_eq!(sanitize(None), "image");
/// ```
pub fn sanitize(name: Option<&str>) -> String {
    let replaced: String = name
        .unwrap_or_default()
        .chars()
        .map(|c| match c.is_control() || ILLEGAL.contains(&c) {
            true => '_',
            false => c,
        })
        .collect();
    // Trim again after truncating, or a cut landing on whitespace would
    // leave a name that the next pass changes.
    let truncated: String = replaced.trim().chars().take(MAX_NAME_CHARS).collect();
    match truncated.trim_end() {
        "" => DEFAULT_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// `base`, or the first of `base_1`, `base_2`, … not already in `taken`.
pub fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n: u64| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        // Infallible: `taken` is finite and the range isn't.
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "image")]
    #[case(Some(""), "image")]
    #[case(Some(" \t "), "_")]
    #[case(Some("Icon"), "Icon")]
    #[case(Some("  padded  "), "padded")]
    #[case(Some("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j")]
    #[case(Some("line\nbreak"), "line_break")]
    #[case(Some("nul\0byte"), "nul_byte")]
    #[case(Some("日本語 ✓"), "日本語 ✓")]
    #[case(Some("???"), "___")]
    fn test_sanitize(#[case] input: Option<&str>, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_sanitize_truncates_by_characters() {
        let long = "é".repeat(300);
        let sanitized = sanitize(Some(&long));
        assert_eq!(sanitized.chars().count(), MAX_NAME_CHARS);
    }

    #[rstest]
    #[case("plain")]
    #[case("  :: weird //  ")]
    #[case("\u{0}\u{1}\u{7f}")]
    #[case("\u{2003}em space\u{2003}")]
    fn test_sanitize_idempotent(#[case] input: &str) {
        let once = sanitize(Some(input));
        assert_eq!(sanitize(Some(&once)), once);
    }

    #[test]
    fn test_sanitize_idempotent_when_cut_lands_on_space() {
        let input = format!("{} tail", "x".repeat(MAX_NAME_CHARS - 1));
        let once = sanitize(Some(&input));
        assert_eq!(once, "x".repeat(MAX_NAME_CHARS - 1));
        assert_eq!(sanitize(Some(&once)), once);
    }

    #[test]
    fn test_unique_name() {
        let mut taken = HashSet::new();
        for expected in ["Icon", "Icon_1", "Icon_2"] {
            let name = unique_name("Icon", &taken);
            assert_eq!(name, expected);
            taken.insert(name);
        }
        assert_eq!(unique_name("Other", &taken), "Other");
    }

    #[test]
    fn test_unique_name_skips_taken_suffixes() {
        let taken = HashSet::from(["Icon".to_string(), "Icon_1".to_string()]);
        assert_eq!(unique_name("Icon", &taken), "Icon_2");
    }
}
