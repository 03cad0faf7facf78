use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Lowercased title words with plurals folded, numbers kept apart so
/// "Quiz 1" and "Quiz 2" never collapse.
struct TitleKey {
    words: BTreeSet<String>,
    numbers: BTreeSet<String>,
}

impl TitleKey {
    fn new(title: &str) -> Self {
        let mut words = BTreeSet::new();
        let mut numbers = BTreeSet::new();
        for token in title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            if token.chars().all(|c| c.is_ascii_digit()) {
                numbers.insert(token);
            } else {
                let singular = token
                    .strip_suffix('s')
                    .filter(|stem| stem.len() >= 3)
                    .unwrap_or(&token)
                    .to_string();
                words.insert(singular);
            }
        }
        Self { words, numbers }
    }

    fn joined(&self) -> String {
        self.words.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }
}

/// Whether two captured titles name the same graded item.
///
/// Titles with different numbers never match. Otherwise equal word sets,
/// one title's words contained in the other's ("Midterm" in "Midterm
/// Test"), or an edit similarity of the word sets at `threshold` or above
/// count as the same item.
pub fn is_near_duplicate(a: &str, b: &str, threshold: f32) -> bool {
    let (a, b) = (TitleKey::new(a), TitleKey::new(b));
    if a.words.is_empty() || b.words.is_empty() {
        return false;
    }
    if !a.numbers.is_empty() && !b.numbers.is_empty() && a.numbers != b.numbers {
        return false;
    }
    a.words.is_subset(&b.words)
        || b.words.is_subset(&a.words)
        || normalized_levenshtein(&a.joined(), &b.joined()) as f32 >= threshold
}
