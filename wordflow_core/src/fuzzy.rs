//! Fuzzy string matching for "did you mean" lookups

use strsim::{jaro_winkler, normalized_levenshtein};

/// Minimum similarity for a fuzzy hit
pub const FUZZY_THRESHOLD: f64 = 0.8;

/// Similarity in `[0, 1]` between two strings, ignoring case and surrounding whitespace
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return 1.0;
    }

    // Jaro-Winkler weighs typos near the end lighter, so it gets the larger share
    normalized_levenshtein(&a, &b) * 0.4 + jaro_winkler(&a, &b) * 0.6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_ignores_case() {
        assert_eq!(similarity("  Jubilant ", "jubilant"), 1.0);
    }

    #[test]
    fn test_typo_is_close() {
        assert!(similarity("ephemral", "ephemeral") >= FUZZY_THRESHOLD);
    }

    #[test]
    fn test_unrelated_words_are_far() {
        assert!(similarity("cacophony", "diligent") < FUZZY_THRESHOLD);
    }
}
