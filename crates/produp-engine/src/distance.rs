//! Edit-distance string similarity.

/// Similarity of two strings in `[0, 1]` based on Levenshtein distance.
///
/// Both inputs are trimmed and lower-cased first. The result is
/// `1 - distance / max(len_a, len_b)` with lengths counted in chars.
/// Two empty strings are identical (`1.0`); one empty string against a
/// non-empty one scores `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    let len_a = a.chars().count();
    let len_b = b.chars().count();

    match (len_a, len_b) {
        (0, 0) => 1.0,
        (0, _) | (_, 0) => 0.0,
        _ => {
            if a == b {
                return 1.0;
            }
            let distance = strsim::levenshtein(&a, &b);
            1.0 - distance as f64 / len_a.max(len_b) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(approx_eq(
            normalized_similarity("Wireless Mouse X200", "Wireless Mouse X200"),
            1.0
        ));
    }

    #[test]
    fn comparison_ignores_case_and_outer_whitespace() {
        assert!(approx_eq(
            normalized_similarity("  wireless MOUSE x200 ", "Wireless Mouse X200"),
            1.0
        ));
    }

    #[test]
    fn two_substitutions_over_nineteen_chars() {
        let sim = normalized_similarity("Wireless Mouse X200", "Wireless Mouse X2OO");
        assert!(approx_eq(sim, 1.0 - 2.0 / 19.0), "got {sim}");
    }

    #[test]
    fn both_empty_scores_one() {
        assert!(approx_eq(normalized_similarity("", "   "), 1.0));
    }

    #[test]
    fn one_empty_scores_zero() {
        assert!(approx_eq(normalized_similarity("", "mouse"), 0.0));
        assert!(approx_eq(normalized_similarity("mouse", "  "), 0.0));
    }

    #[test]
    fn completely_different_strings_of_equal_length_score_zero() {
        assert!(approx_eq(normalized_similarity("abc", "xyz"), 0.0));
    }

    #[test]
    fn length_is_counted_in_chars_not_bytes() {
        // One substitution over four chars, although "é" is two bytes.
        let sim = normalized_similarity("café", "cafe");
        assert!(approx_eq(sim, 0.75), "got {sim}");
    }

    #[test]
    fn similarity_is_symmetric() {
        let ab = normalized_similarity("kitten", "sitting");
        let ba = normalized_similarity("sitting", "kitten");
        assert!(approx_eq(ab, ba));
        assert!(approx_eq(ab, 1.0 - 3.0 / 7.0));
    }
}
