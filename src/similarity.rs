use rapidfuzz::fuzz;

/// Scoring function used by the fuzzy aggregator. Must return a value in `0..=100`.
pub type Scorer = fn(&str, &str) -> u8;

/// Similarity of two strings as a whole-number percentage.
///
/// Normalized indel similarity over chars (`2 * LCS / (len(a) + len(b))`), scaled to
/// 0..=100 and rounded. Identical strings score 100; strings sharing no characters
/// score 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    let score = (fuzz::ratio(a.chars(), b.chars()) * 100.0).round();
    score.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::ratio;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(ratio("SELECT 1", "SELECT 1"), 100);
    }

    #[test]
    fn disjoint_strings_score_0() {
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("", "abc"), 0);
    }

    #[test]
    fn single_substitution_in_long_query_scores_high() {
        let a = "SELECT * FROM users WHERE id=1";
        let b = "SELECT * FROM users WHERE id=2";
        assert_eq!(ratio(a, b), 97);
        assert_eq!(ratio(a, "SELECT * FROM orders"), 68);
    }

    #[test]
    fn appended_clause_costs_only_its_own_length() {
        let base = "SELECT * FROM t WHERE a=1";
        assert_eq!(ratio(base, "SELECT * FROM t WHERE a=1 LIMIT 10"), 85);
    }

    #[test]
    fn ratio_is_symmetric() {
        let a = "SELECT * FROM users WHERE id = 1";
        let b = "SELECT * FROM users WHERE id = 12345";
        assert_eq!(ratio(a, b), ratio(b, a));
        assert_eq!(ratio(a, b), 94);
    }
}
