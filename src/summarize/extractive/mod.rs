//! Extractive summarization: pick the highest rated sentences of the source
//! and return them verbatim, in source order.

mod lexrank;
mod lsa;
mod luhn;

use serde::Serialize;
use std::collections::HashMap;

use crate::text::{Document, Language, Sentence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractiveAlgorithm {
    LexRank,
    Lsa,
    Luhn,
}

impl ExtractiveAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            ExtractiveAlgorithm::LexRank => "lexrank",
            ExtractiveAlgorithm::Lsa => "lsa",
            ExtractiveAlgorithm::Luhn => "luhn",
        }
    }

    /// One score per sentence, higher is better.
    fn rate(self, doc: &Document) -> Vec<f64> {
        match self {
            ExtractiveAlgorithm::LexRank => lexrank::rate(doc),
            ExtractiveAlgorithm::Lsa => lsa::rate(doc),
            ExtractiveAlgorithm::Luhn => luhn::rate(doc),
        }
    }
}

/// Returns at most `sentence_count` sentences of `text`. Returns fewer when the
/// document is shorter, and none only when no sentence could be tokenized.
pub fn rank(
    text: &str,
    language: Language,
    sentence_count: usize,
    algorithm: ExtractiveAlgorithm,
) -> Vec<String> {
    let doc = Document::parse(text, language);
    if doc.is_empty() || sentence_count == 0 {
        return Vec::new();
    }
    let ratings = algorithm.rate(&doc);
    tracing::debug!(
        algorithm = algorithm.name(),
        sentences = doc.len(),
        requested = sentence_count,
        "rated document"
    );
    select_top(&ratings, sentence_count)
        .into_iter()
        .map(|i| doc.sentences[i].text.clone())
        .collect()
}

/// Indices of the `count` best ratings, earlier sentence wins ties, returned
/// in ascending order.
fn select_top(ratings: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ratings.len()).collect();
    order.sort_by(|&a, &b| ratings[b].total_cmp(&ratings[a]).then(a.cmp(&b)));
    order.truncate(count);
    order.sort_unstable();
    order
}

fn term_counts(sentence: &Sentence) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for term in sentence.terms() {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}
