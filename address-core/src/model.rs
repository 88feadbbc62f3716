//! # Sequence Tagger Interface and Default Model
//!
//! The pipeline only depends on [`SequenceTagger`]: give it the feature
//! sequence of an address, get back one [`Label`] per token. Any statistical
//! or rule-based implementation can sit behind it.
//!
//! [`AddressModel`] is the implementation shipped with the crate: a
//! linear-chain CRF ([`crate::crf`]) decoded with Viterbi and trained with
//! the averaged perceptron ([`crate::perceptron`]).
//!
//! ## Example
//!
//! ```rust
//! use address_core::{AddressModel, AddressParser, Label, Lexicon, ReferenceSets};
//!
//! let model = AddressModel::build().unwrap();
//! let parser = AddressParser::new(Lexicon::standard(), ReferenceSets::sample()).with_tagger(model);
//!
//! let tagged = parser.tag("Flat 2, 10 Main Street, London EC1A 1BB").unwrap();
//! assert_eq!(tagged.get(Label::TownName), Some("London"));
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::training_examples;
use crate::crf::CrfModel;
use crate::error::{AddressError, Result};
use crate::features::{extract_features, FeatureVector, TokenFeatures};
use crate::lexicon::Lexicon;
use crate::perceptron::{EncodedSequence, PerceptronTrainer};
use crate::reference::ReferenceSets;
use crate::tagger::Label;
use crate::tokenizer::Token;
use crate::viterbi::viterbi_decode;

/// Maps a feature sequence to an index-aligned label sequence.
///
/// Implementations must return exactly one label per input map.
pub trait SequenceTagger: Send + Sync {
    fn tag(&self, features: &[TokenFeatures]) -> Vec<Label>;
}

impl<F> SequenceTagger for F
where
    F: Fn(&[TokenFeatures]) -> Vec<Label> + Send + Sync,
{
    fn tag(&self, features: &[TokenFeatures]) -> Vec<Label> {
        self(features)
    }
}

/// A feature sequence with its gold labels.
#[derive(Debug, Clone)]
pub struct LabeledSequence {
    pub features: Vec<TokenFeatures>,
    pub labels: Vec<Label>,
}

/// Learns a [`SequenceTagger`] from labelled feature sequences.
pub trait SequenceTrainer {
    type Model: SequenceTagger;

    fn train(&self, examples: &[LabeledSequence]) -> Result<Self::Model>;
}

/// A tokenized, labelled address.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub tokens: Vec<String>,
    pub labels: Vec<Label>,
}

impl TrainingExample {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Label)>,
        S: Into<String>,
    {
        let (tokens, labels) = pairs.into_iter().map(|(t, l)| (t.into(), l)).unzip();
        Self { tokens, labels }
    }

    /// Featurizes the tokens with the given dictionaries.
    pub fn to_labeled(&self, lexicon: &Lexicon, reference: &ReferenceSets) -> Result<LabeledSequence> {
        if self.tokens.len() != self.labels.len() {
            return Err(AddressError::Training {
                reason: format!(
                    "{} tokens but {} labels in example starting {:?}",
                    self.tokens.len(),
                    self.labels.len(),
                    self.tokens.first()
                ),
            });
        }
        let tokens: Vec<Token> = self
            .tokens
            .iter()
            .enumerate()
            .map(|(i, text)| Token::detached(text.clone(), i))
            .collect();
        Ok(LabeledSequence {
            features: extract_features(&tokens, lexicon, reference),
            labels: self.labels.clone(),
        })
    }
}

fn default_iterations() -> usize {
    10
}

/// Training settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Maximum passes over the corpus; training stops early after a pass without mistakes.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

/// Averaged-perceptron trainer producing an [`AddressModel`].
#[derive(Debug, Clone, Default)]
pub struct CrfTrainer {
    pub config: TrainingConfig,
}

impl CrfTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }
}

impl SequenceTrainer for CrfTrainer {
    type Model = AddressModel;

    fn train(&self, examples: &[LabeledSequence]) -> Result<AddressModel> {
        if examples.is_empty() {
            return Err(AddressError::Training {
                reason: "empty training corpus".to_string(),
            });
        }

        let mut encoded = Vec::with_capacity(examples.len());
        for (n, example) in examples.iter().enumerate() {
            if example.features.len() != example.labels.len() {
                return Err(AddressError::Training {
                    reason: format!(
                        "example {n}: {} feature maps but {} labels",
                        example.features.len(),
                        example.labels.len()
                    ),
                });
            }
            encoded.push(EncodedSequence {
                vectors: encode(&example.features),
                labels: example.labels.clone(),
            });
        }

        let crf = PerceptronTrainer::new().train(&encoded, self.config.iterations);
        info!(
            examples = examples.len(),
            weights = crf.active_emissions(),
            "address model trained"
        );
        Ok(AddressModel::from_crf(crf))
    }
}

fn encode(features: &[TokenFeatures]) -> Vec<FeatureVector> {
    features
        .iter()
        .enumerate()
        .map(|(i, fm)| fm.to_vector(i))
        .collect()
}

/// Trained CRF address tagger.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressModel {
    crf: CrfModel,
}

impl AddressModel {
    pub fn from_crf(crf: CrfModel) -> Self {
        Self { crf }
    }

    pub fn crf(&self) -> &CrfModel {
        &self.crf
    }

    /// Trains on tokenized examples, featurizing them with the given dictionaries.
    ///
    /// Use the same `lexicon` / `reference` for the parser that will run the model,
    /// otherwise lookup features seen in training will not fire at tagging time.
    pub fn train(
        examples: &[TrainingExample],
        lexicon: &Lexicon,
        reference: &ReferenceSets,
        config: TrainingConfig,
    ) -> Result<Self> {
        let labeled = examples
            .iter()
            .map(|e| e.to_labeled(lexicon, reference))
            .collect::<Result<Vec<_>>>()?;
        CrfTrainer::new(config).train(&labeled)
    }

    /// Trains on the embedded corpus with the standard lexicon and sample reference data.
    pub fn build() -> Result<Self> {
        Self::build_with(&Lexicon::standard(), &ReferenceSets::sample(), TrainingConfig::default())
    }

    /// Trains on the embedded corpus with custom dictionaries.
    pub fn build_with(lexicon: &Lexicon, reference: &ReferenceSets, config: TrainingConfig) -> Result<Self> {
        Self::train(&training_examples(), lexicon, reference, config)
    }

    pub fn to_json(&self) -> Result<String> {
        self.crf.to_json()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_crf(CrfModel::from_json(json)?))
    }
}

impl SequenceTagger for AddressModel {
    fn tag(&self, features: &[TokenFeatures]) -> Vec<Label> {
        viterbi_decode(&self.crf, &encode(features)).best_sequence
    }
}
