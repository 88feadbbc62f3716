//! # CRF — Linear-Chain Conditional Random Field
//!
//! Scoring side of the address tagger. A label sequence `y` for a token
//! sequence `x` scores as
//!
//! ```text
//! score(y, x) = Σ_i [emission(y_i, x_i) + transition(y_{i-1}, y_i)]
//! emission(y, x_i) = Σ_k w_{k,y} * f_k(x_i)
//! ```
//!
//! where `f_k` are the flattened feature-map attributes of token `i`
//! (`word:BAKER`, `previous:road`, ...). Decoding lives in [`crate::viterbi`];
//! weights are learned by [`crate::perceptron`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureVector;
use crate::tagger::Label;

/// CRF weights.
///
/// - `emission_weights`: `attribute|label` → weight
/// - `transition_weights`: `[prev_label][next_label]` → weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrfModel {
    pub emission_weights: HashMap<String, f64>,
    pub transition_weights: Vec<Vec<f64>>,
}

impl CrfModel {
    /// A model with every weight at zero.
    pub fn new() -> Self {
        let n = Label::COUNT;
        Self {
            emission_weights: HashMap::new(),
            transition_weights: vec![vec![0.0f64; n]; n],
        }
    }

    /// `Σ_k w_{k,label} * f_k(x)`
    pub fn emission_score(&self, features: &FeatureVector, label: Label) -> f64 {
        features
            .features
            .iter()
            .map(|(name, value)| {
                value * self.emission_weights.get(&emission_key(name, label)).unwrap_or(&0.0)
            })
            .sum()
    }

    pub fn transition_score(&self, prev: Label, next: Label) -> f64 {
        self.transition_weights[prev.index()][next.index()]
    }

    pub fn set_emission(&mut self, attribute: &str, label: Label, weight: f64) {
        self.emission_weights.insert(emission_key(attribute, label), weight);
    }

    pub fn set_transition(&mut self, from: Label, to: Label, weight: f64) {
        self.transition_weights[from.index()][to.index()] = weight;
    }

    /// Number of non-zero emission weights.
    pub fn active_emissions(&self) -> usize {
        self.emission_weights.values().filter(|w| **w != 0.0).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for CrfModel {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn emission_key(attribute: &str, label: Label) -> String {
    format!("{attribute}|{}", label.label())
}

/// Emission scores for every token and label: `scores[i][label.index()]`.
pub fn compute_emission_scores(model: &CrfModel, feature_vectors: &[FeatureVector]) -> Vec<Vec<f64>> {
    let labels = Label::all();
    feature_vectors
        .iter()
        .map(|fv| labels.iter().map(|l| model.emission_score(fv, *l)).collect())
        .collect()
}
