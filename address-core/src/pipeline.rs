//! # Address Pipeline
//!
//! Wires the stages together:
//!
//! ```text
//! raw string → tokenize → extract_features → SequenceTagger → assemble
//! ```
//!
//! The dictionaries and the tagger are injected at construction and only
//! read afterwards, so one `AddressParser` can be shared across threads and
//! several parsers with different reference data can coexist.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{AddressError, Result};
use crate::features::{extract_features, TokenFeatures};
use crate::lexicon::Lexicon;
use crate::model::{AddressModel, SequenceTagger, TrainingConfig};
use crate::reference::ReferenceSets;
use crate::tagger::{assemble_tagged, TaggedAddress, TaggedToken};
use crate::tokenizer::{decode_lossy, tokenize, Token};

/// Parses free-text addresses into labelled tokens and components.
#[derive(Clone)]
pub struct AddressParser {
    lexicon: Arc<Lexicon>,
    reference: Arc<ReferenceSets>,
    tagger: Option<Arc<dyn SequenceTagger>>,
}

impl AddressParser {
    /// A parser without a tagger: [`features`](Self::features) works,
    /// `parse` / `tag` return [`AddressError::ModelUnavailable`].
    pub fn new(lexicon: Lexicon, reference: ReferenceSets) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
            reference: Arc::new(reference),
            tagger: None,
        }
    }

    /// Standard lexicon, sample reference data and a model trained on the
    /// embedded corpus.
    pub fn pretrained() -> Result<Self> {
        Self::pretrained_with(ReferenceSets::sample(), TrainingConfig::default())
    }

    /// Standard lexicon, the given reference data and a model trained on the
    /// embedded corpus with it.
    pub fn pretrained_with(reference: ReferenceSets, config: TrainingConfig) -> Result<Self> {
        let lexicon = Lexicon::standard();
        let model = AddressModel::build_with(&lexicon, &reference, config)?;
        Ok(Self::new(lexicon, reference).with_tagger(model))
    }

    pub fn with_tagger(self, tagger: impl SequenceTagger + 'static) -> Self {
        self.with_shared_tagger(Arc::new(tagger))
    }

    pub fn with_shared_tagger(mut self, tagger: Arc<dyn SequenceTagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn has_model(&self) -> bool {
        self.tagger.is_some()
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn reference(&self) -> &ReferenceSets {
        &self.reference
    }

    pub fn tokenize(&self, raw: &str) -> Vec<Token> {
        tokenize(raw)
    }

    /// Feature maps for every token of `raw`, index-aligned with [`tokenize`].
    pub fn features(&self, raw: &str) -> Vec<TokenFeatures> {
        extract_features(&tokenize(raw), &self.lexicon, &self.reference)
    }

    /// Labels each token of `raw`.
    ///
    /// Empty or separator-only input gives an empty vector.
    ///
    /// # Errors
    /// [`AddressError::ModelUnavailable`] when no tagger is installed.
    ///
    /// # Panics
    /// When the tagger returns a label sequence of the wrong length.
    pub fn parse(&self, raw: &str) -> Result<Vec<TaggedToken>> {
        let tagger = self.tagger.as_ref().ok_or(AddressError::ModelUnavailable)?;

        let tokens = tokenize(raw);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let features = extract_features(&tokens, &self.lexicon, &self.reference);
        let labels = tagger.tag(&features);
        assert_eq!(
            labels.len(),
            tokens.len(),
            "tagger returned {} labels for {} tokens",
            labels.len(),
            tokens.len()
        );
        debug!(tokens = tokens.len(), "address parsed");

        Ok(tokens
            .into_iter()
            .zip(labels)
            .map(|(token, label)| TaggedToken { token, label })
            .collect())
    }

    /// [`parse`](Self::parse) for byte input; invalid UTF-8 is decoded lossily.
    pub fn parse_bytes(&self, raw: &[u8]) -> Result<Vec<TaggedToken>> {
        self.parse(&decode_lossy(raw))
    }

    /// Parses `raw` and assembles the labelled tokens into components.
    pub fn tag(&self, raw: &str) -> Result<TaggedAddress> {
        Ok(assemble_tagged(&self.parse(raw)?))
    }

    /// Tags independent addresses in parallel. Output order matches input order.
    pub fn tag_many<S: AsRef<str> + Sync>(&self, raws: &[S]) -> Result<Vec<TaggedAddress>> {
        if !self.has_model() {
            return Err(AddressError::ModelUnavailable);
        }
        raws.par_iter().map(|raw| self.tag(raw.as_ref())).collect()
    }
}

impl std::fmt::Debug for AddressParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressParser")
            .field("outcodes", &self.reference.outcodes.len())
            .field("posttowns", &self.reference.posttowns.len())
            .field("has_model", &self.has_model())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::Label;

    /// Rule tagger for deterministic pipeline tests.
    fn rules(features: &[TokenFeatures]) -> Vec<Label> {
        features
            .iter()
            .map(|fm| {
                if fm.get_str("digits") == Some("all_digits") {
                    Label::BuildingNumber
                } else if fm.get_bool("posttown") == Some(true) {
                    Label::TownName
                } else if fm.get_bool("flat") == Some(true)
                    || fm.previous().and_then(|p| p.get_bool("flat")) == Some(true)
                {
                    Label::SubBuildingName
                } else if fm.get_bool("outcode") == Some(true) || fm.get_bool("rawstring.end") == Some(true) {
                    Label::Postcode
                } else if fm.get_str("digits") == Some("no_digits") {
                    Label::StreetName
                } else {
                    Label::Null
                }
            })
            .collect()
    }

    fn parser() -> AddressParser {
        AddressParser::new(Lexicon::standard(), ReferenceSets::sample()).with_tagger(rules)
    }

    #[test]
    fn test_parse_without_model_fails() {
        let parser = AddressParser::new(Lexicon::standard(), ReferenceSets::sample());
        assert!(!parser.has_model());
        assert!(matches!(parser.parse("10 Main Street"), Err(AddressError::ModelUnavailable)));
        assert!(matches!(parser.parse(""), Err(AddressError::ModelUnavailable)));
        assert!(matches!(parser.tag("10 Main Street"), Err(AddressError::ModelUnavailable)));
        assert!(matches!(parser.tag_many(&["x"]), Err(AddressError::ModelUnavailable)));
    }

    #[test]
    fn test_features_work_without_model() {
        let parser = AddressParser::new(Lexicon::standard(), ReferenceSets::sample());
        assert_eq!(parser.features("10 Main Street").len(), 3);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parser().parse("").unwrap().is_empty());
        assert!(parser().parse("  ,, ;").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pairs_tokens_with_labels() {
        let tagged = parser().parse("Flat 2, 10 Main Street, London EC1A 1BB").unwrap();
        let pairs: Vec<(&str, Label)> = tagged.iter().map(|t| (t.token.text.as_str(), t.label)).collect();
        assert_eq!(
            pairs,
            [
                ("Flat", Label::SubBuildingName),
                ("2,", Label::SubBuildingName),
                ("10", Label::BuildingNumber),
                ("Main", Label::StreetName),
                ("Street,", Label::StreetName),
                ("London", Label::TownName),
                ("EC1A", Label::Postcode),
                ("1BB", Label::Postcode),
            ]
        );
    }

    #[test]
    fn test_tag_assembles_components() {
        let tagged = parser().tag("Flat 2, 10 Main Street, London EC1A 1BB").unwrap();
        assert_eq!(tagged.get(Label::SubBuildingName), Some("Flat 2"));
        assert_eq!(tagged.get(Label::BuildingNumber), Some("10"));
        assert_eq!(tagged.get(Label::StreetName), Some("Main Street"));
        assert_eq!(tagged.get(Label::TownName), Some("London"));
        assert_eq!(tagged.get(Label::Postcode), Some("EC1A 1BB"));
    }

    #[test]
    fn test_parse_bytes_recovers_from_bad_utf8() {
        let mut bytes = b"10 Main Street ".to_vec();
        bytes.push(0xfe);
        let tagged = parser().parse_bytes(&bytes).unwrap();
        assert_eq!(tagged[0].label, Label::BuildingNumber);
    }

    #[test]
    fn test_tag_many_keeps_order() {
        let results = parser().tag_many(&["10 Main Street", "Leeds", ""]).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].get(Label::BuildingNumber), Some("10"));
        assert_eq!(results[1].get(Label::TownName), Some("Leeds"));
        assert!(results[2].is_empty());
    }

    #[test]
    #[should_panic(expected = "labels for")]
    fn test_misaligned_tagger_panics() {
        let broken = |_: &[TokenFeatures]| vec![Label::Null];
        let parser = AddressParser::new(Lexicon::standard(), ReferenceSets::sample()).with_tagger(broken);
        let _ = parser.parse("10 Main Street");
    }

    #[test]
    fn test_parsers_with_different_reference_data() {
        let york = AddressParser::new(Lexicon::standard(), ReferenceSets::from_pairs([("YO1", "York")]))
            .with_tagger(rules);
        let empty = AddressParser::new(Lexicon::standard(), ReferenceSets::default()).with_tagger(rules);

        assert_eq!(york.tag("Elm York").unwrap().get(Label::TownName), Some("York"));
        assert_eq!(empty.tag("Elm York").unwrap().get(Label::TownName), None);
    }

    #[test]
    fn test_pretrained_parser_end_to_end() {
        let parser = AddressParser::pretrained().unwrap();
        let tagged = parser.tag("221B Baker Street, London NW1 6XE").unwrap();
        assert_eq!(tagged.get(Label::TownName), Some("London"));
        assert_eq!(tagged.get(Label::BuildingNumber), Some("221B"));
    }
}
