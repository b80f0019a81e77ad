//! Variable markers embedded in free text.
//!
//! Display text (names, descriptions, messages) uses `\v[n]`. Damage
//! formulas use the bare `v[n]`. No other escape codes are recognised.

use once_cell::sync::Lazy;
use regex::Regex;

static DISPLAY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\\v\[(\d+)\]").expect("valid display marker pattern"));

// The optional backslash is captured so `\v[n]` can be rejected without lookbehind.
static FORMULA_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\\)?v\[(\d+)\]").expect("valid formula marker pattern"));

/// One entry per `\v[n]` marker, left to right. An id too large for `u32`
/// is `None` but still holds its position.
pub fn display_markers(text: &str) -> Vec<Option<u32>> {
    DISPLAY_MARKER
        .captures_iter(text)
        .map(|caps| caps[1].parse().ok())
        .collect()
}

/// One entry per bare `v[n]` marker in a formula, left to right.
/// Any character may precede the `v` except a backslash.
pub fn formula_markers(formula: &str) -> Vec<Option<u32>> {
    FORMULA_MARKER
        .captures_iter(formula)
        .filter(|caps| caps.get(1).is_none())
        .map(|caps| caps[2].parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(markers: Vec<Option<u32>>) -> Vec<u32> {
        markers.into_iter().flatten().collect()
    }

    #[test]
    fn test_display_markers_in_order() {
        assert_eq!(
            ids(display_markers(r"\V[3] has \v[12] of \v[3]")),
            vec![3, 12, 3]
        );
    }

    #[test]
    fn test_display_ignores_other_escapes() {
        assert!(display_markers(r"\c[4]Hello\n[1] v[5] \vv[2]").is_empty());
        assert!(display_markers("").is_empty());
    }

    #[test]
    fn test_formula_markers() {
        assert_eq!(ids(formula_markers("a.atk * 4 - b.def + v[7] * V[2]")), vec![7, 2]);
    }

    #[test]
    fn test_forms_are_independent() {
        assert!(formula_markers(r"\v[4]").is_empty());
        assert!(display_markers("v[4]").is_empty());
        assert_eq!(ids(formula_markers(r"\v[1] + v[2]")), vec![2]);
    }

    #[test]
    fn test_formula_marker_after_word_characters() {
        assert_eq!(
            ids(formula_markers("a.mdv[2] + 2v[3] + _v[4] + (v[5])")),
            vec![2, 3, 4, 5]
        );
    }

    #[test]
    fn test_oversized_id_keeps_its_slot() {
        assert_eq!(
            display_markers(r"\v[99999999999] \v[2]"),
            vec![None, Some(2)]
        );
        assert_eq!(formula_markers("v[99999999999] + v[2]"), vec![None, Some(2)]);
    }
}
