//! Trigram similarity with the same rules as PostgreSQL's `pg_trgm`.
//!
//! Text is lower-cased and split into words on anything that is not
//! alphanumeric. Each word is padded with two blanks in front and one
//! behind, then cut into overlapping three-character windows. Similarity is
//! the size of the shared trigram set over the size of the union.

use std::collections::HashSet;

pub fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars().flat_map(char::to_lowercase))
            .chain(std::iter::once(' '))
            .collect();
        for w in padded.windows(3) {
            set.insert([w[0], w[1], w[2]]);
        }
    }
    set
}

/// `similarity(a, b)` as computed by pg_trgm, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f32 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - shared;
    shared as f32 / union as f32
}
