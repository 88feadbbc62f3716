//! # Averaged Structured Perceptron
//!
//! Learns [`CrfModel`] weights from labelled address sequences. For each
//! example the current weights decode a label sequence with Viterbi; on a
//! mistake the gold sequence's attributes and transitions are promoted and
//! the predicted ones demoted.
//!
//! Uses "lazy averaging": a weight's running total is only brought up to
//! date when the weight changes, so each update costs O(active attributes)
//! instead of O(all weights).

use std::collections::HashMap;

use tracing::debug;

use crate::crf::{emission_key, CrfModel};
use crate::features::FeatureVector;
use crate::tagger::Label;
use crate::viterbi::viterbi_decode;

/// A training sequence already turned into feature vectors.
#[derive(Debug, Clone)]
pub struct EncodedSequence {
    pub vectors: Vec<FeatureVector>,
    pub labels: Vec<Label>,
}

/// Running total of one weight for averaging.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    total: f64,
    last_update: usize,
}

impl Accumulator {
    /// Adds the contribution of `weight` held constant since the last update.
    fn catch_up(&mut self, weight: f64, step: usize) {
        self.total += (step - self.last_update) as f64 * weight;
        self.last_update = step;
    }
}

/// Averaged perceptron trainer for [`CrfModel`].
#[derive(Debug, Clone)]
pub struct PerceptronTrainer {
    /// Current (non-averaged) weights, used for decoding during training.
    current: CrfModel,
    emission_acc: HashMap<String, Accumulator>,
    transition_acc: Vec<Vec<Accumulator>>,
    /// Examples processed so far.
    steps: usize,
}

impl PerceptronTrainer {
    pub fn new() -> Self {
        Self {
            current: CrfModel::new(),
            emission_acc: HashMap::new(),
            transition_acc: vec![vec![Accumulator::default(); Label::COUNT]; Label::COUNT],
            steps: 0,
        }
    }

    /// Runs `iterations` passes over the corpus and returns the averaged model.
    pub fn train(mut self, corpus: &[EncodedSequence], iterations: usize) -> CrfModel {
        for epoch in 0..iterations {
            let mut mistakes = 0usize;
            for sequence in corpus {
                let predicted = viterbi_decode(&self.current, &sequence.vectors).best_sequence;
                if predicted != sequence.labels {
                    mistakes += 1;
                    self.update(sequence, &predicted);
                }
                self.steps += 1;
            }
            debug!(epoch, mistakes, sequences = corpus.len(), "perceptron epoch");
            if mistakes == 0 {
                break;
            }
        }
        self.finalize()
    }

    /// Promotes the gold path and demotes the predicted one.
    fn update(&mut self, sequence: &EncodedSequence, predicted: &[Label]) {
        let gold = &sequence.labels;
        for (i, fv) in sequence.vectors.iter().enumerate() {
            if gold[i] != predicted[i] {
                for (attribute, value) in &fv.features {
                    self.update_emission(attribute, gold[i], *value);
                    self.update_emission(attribute, predicted[i], -*value);
                }
            }
            if i > 0 && (gold[i - 1], gold[i]) != (predicted[i - 1], predicted[i]) {
                self.update_transition(gold[i - 1], gold[i], 1.0);
                self.update_transition(predicted[i - 1], predicted[i], -1.0);
            }
        }
    }

    fn update_emission(&mut self, attribute: &str, label: Label, delta: f64) {
        let key = emission_key(attribute, label);
        let weight = self.current.emission_weights.entry(key.clone()).or_insert(0.0);
        self.emission_acc
            .entry(key)
            .or_default()
            .catch_up(*weight, self.steps);
        *weight += delta;
    }

    fn update_transition(&mut self, from: Label, to: Label, delta: f64) {
        let (f, t) = (from.index(), to.index());
        let weight = &mut self.current.transition_weights[f][t];
        self.transition_acc[f][t].catch_up(*weight, self.steps);
        *weight += delta;
    }

    /// Brings every total up to the final step and replaces weights by their averages.
    fn finalize(mut self) -> CrfModel {
        let steps = self.steps;
        if steps == 0 {
            return self.current;
        }
        let steps_f64 = steps as f64;

        let mut averaged = CrfModel::new();
        for (key, acc) in self.emission_acc.iter_mut() {
            let weight = self.current.emission_weights.get(key).copied().unwrap_or(0.0);
            acc.catch_up(weight, steps);
            let avg = acc.total / steps_f64;
            if avg != 0.0 {
                averaged.emission_weights.insert(key.clone(), avg);
            }
        }
        for (f, row) in self.transition_acc.iter_mut().enumerate() {
            for (t, acc) in row.iter_mut().enumerate() {
                acc.catch_up(self.current.transition_weights[f][t], steps);
                averaged.transition_weights[f][t] = acc.total / steps_f64;
            }
        }
        averaged
    }
}

impl Default for PerceptronTrainer {
    fn default() -> Self {
        Self::new()
    }
}
