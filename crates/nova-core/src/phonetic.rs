/// Character-level Levenshtein distance (unit cost insert/delete/substitute)
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row over the shorter string
    let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, sc) in short.iter().enumerate() {
            let substitution = diagonal + usize::from(lc != sc);
            let deletion = row[j + 1] + 1;
            let insertion = row[j] + 1;

            diagonal = row[j + 1];
            row[j + 1] = substitution.min(deletion).min(insertion);
        }
    }

    row[short.len()]
}

/// Normalized phonetic similarity in [0, 1].
///
/// `1 - distance / max(len)`, with two empty strings scoring 1.0 and exactly
/// one empty string scoring 0.0.
pub fn phonetic_score(input_reading: &str, candidate_reading: &str) -> f32 {
    let len_a = input_reading.chars().count();
    let len_b = candidate_reading.chars().count();

    match (len_a, len_b) {
        (0, 0) => return 1.0,
        (0, _) | (_, 0) => return 0.0,
        _ => {}
    }

    let max_len = len_a.max(len_b);
    let distance = edit_distance(input_reading, candidate_reading);

    1.0 - distance as f32 / max_len as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn edge_cases() {
        assert_eq!(phonetic_score("", ""), 1.0);
        assert_eq!(phonetic_score("", "x"), 0.0);
        assert_eq!(phonetic_score("x", ""), 0.0);
        assert_eq!(phonetic_score("こんにちは", "こんにちは"), 1.0);
    }

    #[test]
    fn distance_counts_characters_not_bytes() {
        assert_eq!(edit_distance("ねこ", "ねご"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "あいう"), 3);
    }

    #[test]
    fn length_variants_stay_close() {
        // A positional scan would score this 0.2; true edit distance sees one insertion.
        let score = phonetic_score("おばさん", "おばあさん");
        assert!((score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn shifted_strings_are_not_penalized_positionally() {
        let score = phonetic_score("んにちは", "こんにちは");
        assert!(score > 0.75);
    }

    fn arb_kana() -> impl Strategy<Value = String> {
        "[あ-ん]{0,12}"
    }

    proptest! {
        #[test]
        fn prop_identity(s in "[あ-んa-z]{1,16}") {
            prop_assert_eq!(phonetic_score(&s, &s), 1.0);
        }

        #[test]
        fn prop_symmetric(a in arb_kana(), b in arb_kana()) {
            prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
        }

        #[test]
        fn prop_bounded(a in arb_kana(), b in arb_kana()) {
            let score = phonetic_score(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn prop_distance_bounds(a in arb_kana(), b in arb_kana()) {
            let la = a.chars().count();
            let lb = b.chars().count();
            let d = edit_distance(&a, &b);
            prop_assert!(d >= la.abs_diff(lb));
            prop_assert!(d <= la.max(lb));
        }
    }
}
