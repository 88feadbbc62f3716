//! # Viterbi Decoding
//!
//! Finds the highest scoring label sequence under a [`CrfModel`] by dynamic
//! programming, in `O(N × L²)` for `N` tokens and `L` labels.
//!
//! ```text
//! init:      v[0][l] = emission(l, x_0)
//! recursion: v[i][l] = max_{l'} [v[i-1][l'] + transition(l', l)] + emission(l, x_i)
//! backtrack from argmax_l v[N-1][l]
//! ```

use serde::{Deserialize, Serialize};

use crate::crf::{compute_emission_scores, CrfModel};
use crate::features::FeatureVector;
use crate::tagger::Label;

/// Best path found by [`viterbi_decode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViterbiResult {
    /// One label per input token.
    pub best_sequence: Vec<Label>,
    /// Unnormalised score of that sequence.
    pub best_score: f64,
}

/// Decodes the label sequence for a token sequence's feature vectors.
pub fn viterbi_decode(model: &CrfModel, feature_vectors: &[FeatureVector]) -> ViterbiResult {
    if feature_vectors.is_empty() {
        return ViterbiResult {
            best_sequence: vec![],
            best_score: 0.0,
        };
    }

    let n_tokens = feature_vectors.len();
    let labels = Label::all();
    let n_labels = labels.len();

    let emission = compute_emission_scores(model, feature_vectors);

    let mut viterbi: Vec<f64> = emission[0].clone();
    // backptr[i][l] = best previous label index for label l at token i
    let mut backptr: Vec<Vec<usize>> = vec![vec![0usize; n_labels]; n_tokens];

    for i in 1..n_tokens {
        let mut next = vec![f64::NEG_INFINITY; n_labels];
        for l in 0..n_labels {
            let mut best_prev_score = f64::NEG_INFINITY;
            let mut best_prev = 0;
            for prev in 0..n_labels {
                let score = viterbi[prev] + model.transition_score(labels[prev], labels[l]);
                if score > best_prev_score {
                    best_prev_score = score;
                    best_prev = prev;
                }
            }
            next[l] = best_prev_score + emission[i][l];
            backptr[i][l] = best_prev;
        }
        viterbi = next;
    }

    let (mut best_last, best_score) = best_in_slice(&viterbi);
    let mut best_sequence = vec![labels[0]; n_tokens];
    best_sequence[n_tokens - 1] = labels[best_last];
    for i in (0..n_tokens - 1).rev() {
        best_last = backptr[i + 1][best_last];
        best_sequence[i] = labels[best_last];
    }

    ViterbiResult {
        best_sequence,
        best_score,
    }
}

/// (index, value) of the first maximum in a slice.
fn best_in_slice(scores: &[f64]) -> (usize, f64) {
    scores
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
}
