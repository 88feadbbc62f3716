//! # address-core — Probabilistic Postal Address Parsing
//!
//! Prepares free-text postal addresses for a sequence tagger and turns the
//! tagger's labels back into structured address components.
//!
//! ## Pipeline
//!
//! 1.  **Input**: raw string (or bytes, decoded lossily).
//! 2.  **Tokenization** ([`tokenizer`]): punctuation-aware split that keeps
//!     trailing commas/semicolons on the token they follow.
//! 3.  **Feature extraction** ([`features`]): one feature map per token with
//!     lexical, shape, lookup and neighbour features. Uses the keyword
//!     dictionaries in [`lexicon`] and the postcode/town sets in [`reference`].
//! 4.  **Tagging** ([`model`]): any [`SequenceTagger`]; the bundled one is a
//!     linear-chain CRF ([`crf`], [`viterbi`]) trained with an averaged
//!     perceptron ([`perceptron`]) on the embedded [`corpus`].
//! 5.  **Assembly** ([`tagger`]): tokens grouped by label into a [`TaggedAddress`].
//!
//! ## Example
//!
//! ```rust
//! use address_core::{AddressParser, Label};
//!
//! let parser = AddressParser::pretrained().unwrap();
//! let address = parser.tag("12 Queen Street, Cardiff CF10 2BU").unwrap();
//!
//! for (label, text) in address.iter() {
//!     println!("{label}: {text}");
//! }
//! assert_eq!(address.get(Label::TownName), Some("Cardiff"));
//! ```

pub mod corpus;
pub mod crf;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod model;
pub mod perceptron;
pub mod pipeline;
pub mod reference;
pub mod tagger;
pub mod tokenizer;
pub mod viterbi;

pub use error::{AddressError, Result};
pub use features::{FeatureValue, TokenFeatures};
pub use lexicon::{LexicalCategory, Lexicon};
pub use model::{AddressModel, SequenceTagger, SequenceTrainer, TrainingConfig, TrainingExample};
pub use pipeline::AddressParser;
pub use reference::ReferenceSets;
pub use tagger::{assemble, Label, TaggedAddress, TaggedToken};
pub use tokenizer::{tokenize, Token};
