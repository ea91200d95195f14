//! Luhn's significant-word method: a sentence scores by its densest cluster
//! of frequent content words.

use std::collections::{HashMap, HashSet};

use crate::text::{Document, Sentence};

/// Insignificant tokens allowed between two significant ones in a cluster.
const MAX_GAP: usize = 4;

pub(super) fn rate(doc: &Document) -> Vec<f64> {
    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for term in doc.sentences.iter().flat_map(|s| s.terms()) {
        *frequencies.entry(term).or_insert(0) += 1;
    }
    let significant: HashSet<&str> = frequencies
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(term, _)| term)
        .collect();
    doc.sentences
        .iter()
        .map(|s| rate_sentence(s, &significant))
        .collect()
}

fn rate_sentence(sentence: &Sentence, significant: &HashSet<&str>) -> f64 {
    let mut best: f64 = 0.0;
    // (significant words, span length) of the open cluster
    let mut cluster: Option<(usize, usize)> = None;
    let mut gap = 0;
    for token in &sentence.tokens {
        if !token.stop && significant.contains(token.term.as_str()) {
            cluster = Some(match cluster {
                Some((hits, len)) => (hits + 1, len + gap + 1),
                None => (1, 1),
            });
            gap = 0;
        } else if let Some((hits, len)) = cluster {
            gap += 1;
            if gap > MAX_GAP {
                best = best.max(score(hits, len));
                cluster = None;
                gap = 0;
            }
        }
    }
    if let Some((hits, len)) = cluster {
        best = best.max(score(hits, len));
    }
    best
}

fn score(hits: usize, len: usize) -> f64 {
    (hits * hits) as f64 / len as f64
}
