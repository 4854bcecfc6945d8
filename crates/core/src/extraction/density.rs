//! Information-density scoring of candidate sets
//!
//! Each candidate scores the fraction of its fields that carry information;
//! a set scores the sum over its candidates. The densest set wins, and the
//! earliest set wins ties.

use calbot_domain::{EventCandidate, FieldValue, MessageExtract};

/// Whether a text field carries information.
///
/// Blank strings are empty. Strings made only of `_` and `-` once the date
/// punctuation `T` and `:` is stripped are unfilled placeholders, so
/// `____-__-__T__:__` scores as empty while `2025-10-__T__:__` does not.
pub fn is_meaningful(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    let mut residue = trimmed.chars().filter(|c| *c != 'T' && *c != ':').peekable();
    if residue.peek().is_none() {
        return false;
    }
    !residue.all(|c| c == '_' || c == '-')
}

/// Fraction of a candidate's fields that are filled, in `0.0..=1.0`.
pub fn candidate_density(candidate: &EventCandidate) -> f64 {
    let fields = candidate.field_values();
    if fields.is_empty() {
        return 0.0;
    }
    let filled = fields
        .iter()
        .filter(|field| match field {
            FieldValue::Text(text) => is_meaningful(text),
            FieldValue::Scalar => true,
            FieldValue::Absent => false,
        })
        .count();
    filled as f64 / fields.len() as f64
}

/// Sum of candidate densities; `0.0` for an empty set.
pub fn extract_density(extract: &MessageExtract) -> f64 {
    extract.events.iter().map(candidate_density).sum()
}

/// Index of the strictly highest score, earliest index on ties.
pub fn densest_index(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Pick the densest candidate set, keeping its score.
pub fn select_densest(sets: Vec<MessageExtract>) -> Option<(MessageExtract, f64)> {
    let scores: Vec<f64> = sets.iter().map(extract_density).collect();
    let index = densest_index(&scores)?;
    let score = scores[index];
    sets.into_iter().nth(index).map(|set| (set, score))
}
