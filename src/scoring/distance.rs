use super::text::{char_len, normalize};
use crate::domain::models::BilingualText;

/// Largest normalized edit ratio still accepted as a correct free-text answer.
pub const FREE_TEXT_THRESHOLD: f64 = 0.15;

/// Levenshtein distance over code points, two rolling rows.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Edit distance divided by the longer string's length.
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    let longest = char_len(a).max(char_len(b));
    if longest == 0 {
        return 0.0;
    }
    distance(a, b) as f64 / longest as f64
}

pub fn is_free_text_correct(answer: &str, correct: &BilingualText) -> bool {
    is_free_text_correct_within(answer, correct, FREE_TEXT_THRESHOLD)
}

/// An empty answer never matches, nor does a question without usable
/// candidates. Otherwise any candidate within `threshold` accepts.
pub fn is_free_text_correct_within(answer: &str, correct: &BilingualText, threshold: f64) -> bool {
    let answer = normalize(answer);
    if answer.is_empty() {
        return false;
    }

    correct
        .candidates()
        .iter()
        .any(|candidate| edit_ratio(&answer, candidate) <= threshold)
}
