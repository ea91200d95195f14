//! Graph centrality ranking. Sentences are nodes, and two sentences share an
//! edge when their TF-IDF cosine similarity reaches [`THRESHOLD`]. The score is
//! the stationary distribution of a damped random walk over the
//! degree-normalized graph.

use std::collections::HashMap;

use super::term_counts;
use crate::text::Document;

const THRESHOLD: f64 = 0.1;
const DAMPING: f64 = 0.85;
const EPSILON: f64 = 1e-6;
const MAX_ITERATIONS: usize = 200;

pub(super) fn rate(doc: &Document) -> Vec<f64> {
    stationary(&adjacency(&similarities(doc)))
}

fn similarities(doc: &Document) -> Vec<Vec<f64>> {
    let n = doc.len();
    let tfs: Vec<HashMap<&str, f64>> = doc
        .sentences
        .iter()
        .map(|s| {
            let counts = term_counts(s);
            let max = counts.values().copied().max().unwrap_or(1) as f64;
            counts
                .into_iter()
                .map(|(t, c)| (t, c as f64 / max))
                .collect()
        })
        .collect();
    let idf = inverse_document_frequency(&tfs);

    let mut sims = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let sim = cosine(&tfs[i], &tfs[j], &idf);
            sims[i][j] = sim;
            sims[j][i] = sim;
        }
    }
    sims
}

// No self loops.
fn adjacency(sims: &[Vec<f64>]) -> Vec<Vec<bool>> {
    sims.iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, &sim)| i != j && sim >= THRESHOLD)
                .collect()
        })
        .collect()
}

fn inverse_document_frequency<'a>(tfs: &[HashMap<&'a str, f64>]) -> HashMap<&'a str, f64> {
    let mut df: HashMap<&str, usize> = HashMap::new();
    for tf in tfs {
        for term in tf.keys() {
            *df.entry(*term).or_insert(0) += 1;
        }
    }
    let n = tfs.len() as f64;
    df.into_iter()
        .map(|(t, d)| (t, (1.0 + n / d as f64).ln()))
        .collect()
}

fn cosine(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>, idf: &HashMap<&str, f64>) -> f64 {
    let numerator: f64 = a
        .iter()
        .filter_map(|(t, x)| b.get(t).map(|y| x * y * idf_squared(idf, t)))
        .sum();
    if numerator == 0.0 {
        return 0.0;
    }
    let denominator = weighted_norm(a, idf) * weighted_norm(b, idf);
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn weighted_norm(v: &HashMap<&str, f64>, idf: &HashMap<&str, f64>) -> f64 {
    v.iter()
        .map(|(t, x)| x * x * idf_squared(idf, t))
        .sum::<f64>()
        .sqrt()
}

fn idf_squared(idf: &HashMap<&str, f64>, term: &str) -> f64 {
    idf.get(term).copied().unwrap_or(0.0).powi(2)
}

/// Power iteration over the degree-normalized adjacency matrix. Sentences
/// without edges spread their mass uniformly.
fn stationary(edges: &[Vec<bool>]) -> Vec<f64> {
    let n = edges.len();
    let uniform = 1.0 / n as f64;
    let degrees: Vec<usize> = edges
        .iter()
        .map(|row| row.iter().filter(|&&e| e).count())
        .collect();
    let mut p = vec![uniform; n];
    for _ in 0..MAX_ITERATIONS {
        let dangling: f64 = (0..n).filter(|&i| degrees[i] == 0).map(|i| p[i]).sum();
        let mut next = vec![(1.0 - DAMPING) * uniform + DAMPING * dangling * uniform; n];
        for i in 0..n {
            if degrees[i] == 0 {
                continue;
            }
            let share = DAMPING * p[i] / degrees[i] as f64;
            for j in (0..n).filter(|&j| edges[i][j]) {
                next[j] += share;
            }
        }
        let delta: f64 = next.iter().zip(&p).map(|(a, b)| (a - b).abs()).sum();
        p = next;
        if delta < EPSILON {
            break;
        }
    }
    p
}
