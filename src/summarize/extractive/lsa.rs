//! Latent semantic analysis. Builds a term by sentence matrix, decomposes it
//! with a one-sided Jacobi SVD and scores each sentence by its weight across
//! the strongest topics.

use std::collections::BTreeMap;

use super::term_counts;
use crate::text::Document;

const MIN_DIMENSIONS: usize = 3;
const REDUCTION_RATIO: f64 = 0.5;
const MAX_SWEEPS: usize = 60;
const TOLERANCE: f64 = 1e-12;

pub(super) fn rate(doc: &Document) -> Vec<f64> {
    let n = doc.len();
    let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
    for sentence in &doc.sentences {
        for term in sentence.terms() {
            let next = vocabulary.len();
            vocabulary.entry(term).or_insert(next);
        }
    }
    if vocabulary.is_empty() {
        return vec![0.0; n];
    }

    // Column j holds sentence j.
    let mut columns = vec![vec![0.0; vocabulary.len()]; n];
    for (column, sentence) in columns.iter_mut().zip(&doc.sentences) {
        let counts = term_counts(sentence);
        let max = counts.values().copied().max().unwrap_or(1) as f64;
        for (term, count) in counts {
            column[vocabulary[term]] = 0.4 + 0.6 * count as f64 / max;
        }
    }

    let (sigma, v) = jacobi_svd(columns);
    let mut topics: Vec<usize> = (0..n).collect();
    topics.sort_by(|&a, &b| sigma[b].total_cmp(&sigma[a]));
    let dimensions = MIN_DIMENSIONS
        .max((n as f64 * REDUCTION_RATIO).ceil() as usize)
        .min(n);
    let topics = &topics[..dimensions];

    (0..n)
        .map(|k| {
            topics
                .iter()
                .map(|&t| (sigma[t] * v[k][t]).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect()
}

/// Orthogonalizes the columns of `a` in place with plane rotations. Returns
/// the singular values (column norms) and the right singular vectors, where
/// `v[row][topic]` is the weight of sentence `row` in `topic`.
fn jacobi_svd(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let m = a.first().map(Vec::len).unwrap_or(0);
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n {
            for q in (p + 1)..n {
                let alpha = dot(&a[p], &a[p]);
                let beta = dot(&a[q], &a[q]);
                let gamma = dot(&a[p], &a[q]);
                if gamma.abs() <= TOLERANCE * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;
                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;
                for i in 0..m {
                    let (ap, aq) = (a[p][i], a[q][i]);
                    a[p][i] = c * ap - s * aq;
                    a[q][i] = s * ap + c * aq;
                }
                for row in v.iter_mut() {
                    let (vp, vq) = (row[p], row[q]);
                    row[p] = c * vp - s * vq;
                    row[q] = s * vp + c * vq;
                }
            }
        }
        if !rotated {
            break;
        }
    }

    let sigma = a.iter().map(|col| dot(col, col).sqrt()).collect();
    (sigma, v)
}

fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}
