//! # Feature Extraction for Address Tokens
//!
//! Every token gets a feature map: a small dictionary of named signals that
//! the sequence tagger scores. Values are booleans, strings, or (for the
//! `previous` / `next` context) a nested copy of a neighbour's map.
//!
//! ## Intrinsic features (from the uppercased token `U`)
//!
//! | Feature       | Value                                                    |
//! |---------------|----------------------------------------------------------|
//! | `digits`      | `all_digits`, `some_digits` or `no_digits`               |
//! | `word`        | `U`, or `false` when `U` is fully numeric                |
//! | `length`      | `d:<len>` for numbers, `w:<len>` otherwise               |
//! | `endsinpunc`  | trailing punctuation character (not `.`), or `false`     |
//! | `has.vowels`  | `U` contains A, E, I, O or U                             |
//! | lexicon flags | `directional`, `flat`, `company`, `road`, `residential`, `business`, `locational` |
//! | reference     | `outcode`, `posttown`                                    |
//!
//! ## Context features
//!
//! Built in two passes over the intrinsic maps:
//!
//! 1. Each map gets a frozen copy of its neighbours' intrinsic features under
//!    `previous` and `next`.
//! 2. Boundary markers are added afterwards: `rawstring.start` on the first map
//!    and on token 1's `previous`, `rawstring.end` on the last map and on the
//!    second-to-last token's `next`. A lone token gets `singleton` instead.
//!
//! Because the neighbour copies are taken from the intrinsic maps, the
//! markers added in pass 2 never leak into unrelated context entries.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::lexicon::{LexicalCategory, Lexicon};
use crate::reference::ReferenceSets;
use crate::tokenizer::Token;

pub const DIGITS: &str = "digits";
pub const WORD: &str = "word";
pub const LENGTH: &str = "length";
pub const ENDS_IN_PUNC: &str = "endsinpunc";
pub const OUTCODE: &str = "outcode";
pub const POSTTOWN: &str = "posttown";
pub const HAS_VOWELS: &str = "has.vowels";
pub const PREVIOUS: &str = "previous";
pub const NEXT: &str = "next";
pub const RAWSTRING_START: &str = "rawstring.start";
pub const RAWSTRING_END: &str = "rawstring.end";
pub const SINGLETON: &str = "singleton";

/// A single feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Str(String),
    /// A neighbour's intrinsic features (`previous` / `next`).
    Map(Box<TokenFeatures>),
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Bool(b)
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Str(s)
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Str(s.to_string())
    }
}

impl From<TokenFeatures> for FeatureValue {
    fn from(m: TokenFeatures) -> Self {
        FeatureValue::Map(Box::new(m))
    }
}

/// The feature map of one token.
///
/// Keys are kept sorted so the map serializes and flattens deterministically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenFeatures {
    entries: BTreeMap<String, FeatureValue>,
}

impl TokenFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FeatureValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// `Some(b)` only for boolean features.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key) {
            Some(FeatureValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// `Some(s)` only for string features.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(FeatureValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    fn get_map_mut(&mut self, key: &str) -> Option<&mut TokenFeatures> {
        match self.entries.get_mut(key) {
            Some(FeatureValue::Map(m)) => Some(&mut **m),
            _ => None,
        }
    }

    /// Intrinsic features of the previous token, if any.
    pub fn previous(&self) -> Option<&TokenFeatures> {
        match self.entries.get(PREVIOUS) {
            Some(FeatureValue::Map(m)) => Some(&**m),
            _ => None,
        }
    }

    /// Intrinsic features of the next token, if any.
    pub fn next(&self) -> Option<&TokenFeatures> {
        match self.entries.get(NEXT) {
            Some(FeatureValue::Map(m)) => Some(&**m),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens the map into weighted attributes, CRFsuite style.
    ///
    /// - `word = "BAKER"` → `word:BAKER` (1.0)
    /// - `road = true` → `road` (1.0); `false` values are dropped
    /// - `previous = {...}` → `previous:word:BAKER`, `previous:road`, ...
    pub fn attributes(&self) -> Vec<(String, f64)> {
        let mut out = Vec::with_capacity(self.entries.len());
        self.collect_attributes("", &mut out);
        out
    }

    fn collect_attributes(&self, prefix: &str, out: &mut Vec<(String, f64)>) {
        for (key, value) in &self.entries {
            match value {
                FeatureValue::Bool(true) => out.push((format!("{prefix}{key}"), 1.0)),
                FeatureValue::Bool(false) => {}
                FeatureValue::Str(s) => out.push((format!("{prefix}{key}:{s}"), 1.0)),
                FeatureValue::Map(m) => m.collect_attributes(&format!("{prefix}{key}:"), out),
            }
        }
    }

    /// Sparse vector form consumed by the CRF.
    pub fn to_vector(&self, token_index: usize) -> FeatureVector {
        let mut fv = FeatureVector::new(token_index);
        fv.insert("bias", 1.0);
        for (name, value) in self.attributes() {
            fv.insert(name, value);
        }
        fv
    }
}

/// Sparse attribute vector for one token.
///
/// Most attributes are binary, so the map stays small even though the
/// attribute space (`word:<anything>`) is unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Active attributes. Ex: `{"road": 1.0, "word:STREET": 1.0}`.
    pub features: HashMap<String, f64>,
    /// Index of the token this vector describes.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: HashMap::new(),
            token_index,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    /// Dot product with a weight map: $\sum_k w_k \cdot f_k$.
    pub fn dot(&self, weights: &HashMap<String, f64>) -> f64 {
        self.features
            .iter()
            .map(|(k, v)| v * weights.get(k).unwrap_or(&0.0))
            .sum()
    }
}

/// Builds the feature sequence for a token sequence.
///
/// The output is index-aligned with `tokens`: map `i` describes token `i`.
/// An empty input gives an empty output.
///
/// # Example
/// For `"10 Downing Street"`, map 1 (`Downing`) contains `word = "DOWNING"`,
/// `previous.digits = "all_digits"` and `next.road = true`.
pub fn extract_features(
    tokens: &[Token],
    lexicon: &Lexicon,
    reference: &ReferenceSets,
) -> Vec<TokenFeatures> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let intrinsic: Vec<TokenFeatures> = tokens
        .iter()
        .map(|t| token_features(&t.text, lexicon, reference))
        .collect();

    mark_boundaries(attach_context(&intrinsic))
}

/// Pass 1: copies of each neighbour's intrinsic map under `previous` / `next`.
fn attach_context(intrinsic: &[TokenFeatures]) -> Vec<TokenFeatures> {
    let n = intrinsic.len();
    intrinsic
        .iter()
        .enumerate()
        .map(|(i, own)| {
            let mut fm = own.clone();
            if i > 0 {
                fm.insert(PREVIOUS, intrinsic[i - 1].clone());
            }
            if i + 1 < n {
                fm.insert(NEXT, intrinsic[i + 1].clone());
            }
            fm
        })
        .collect()
}

/// Pass 2: start/end markers, or `singleton` for a one-token string.
fn mark_boundaries(mut sequence: Vec<TokenFeatures>) -> Vec<TokenFeatures> {
    let n = sequence.len();
    match n {
        0 => {}
        1 => sequence[0].insert(SINGLETON, true),
        _ => {
            sequence[0].insert(RAWSTRING_START, true);
            if let Some(prev) = sequence[1].get_map_mut(PREVIOUS) {
                prev.insert(RAWSTRING_START, true);
            }
            sequence[n - 1].insert(RAWSTRING_END, true);
            if let Some(next) = sequence[n - 2].get_map_mut(NEXT) {
                next.insert(RAWSTRING_END, true);
            }
        }
    }
    sequence
}

/// Intrinsic features of a single token, independent of its neighbours.
pub fn token_features(token: &str, lexicon: &Lexicon, reference: &ReferenceSets) -> TokenFeatures {
    let upper = token.to_uppercase();
    let all_digits = is_all_digits(&upper);
    let len = upper.chars().count();

    let mut fm = TokenFeatures::new();
    fm.insert(DIGITS, digits(&upper));
    fm.insert(
        WORD,
        if all_digits {
            FeatureValue::Bool(false)
        } else {
            FeatureValue::Str(upper.clone())
        },
    );
    fm.insert(
        LENGTH,
        if all_digits {
            format!("d:{len}")
        } else {
            format!("w:{len}")
        },
    );
    fm.insert(
        ENDS_IN_PUNC,
        match ends_in_punctuation(token) {
            Some(c) => FeatureValue::Str(c.to_string()),
            None => FeatureValue::Bool(false),
        },
    );
    for category in LexicalCategory::all() {
        fm.insert(category.feature_name(), lexicon.contains(category, &upper));
    }
    fm.insert(OUTCODE, reference.is_outcode(&upper));
    fm.insert(POSTTOWN, reference.is_posttown(&upper));
    fm.insert(HAS_VOWELS, upper.chars().any(|c| matches!(c, 'A' | 'E' | 'I' | 'O' | 'U')));
    fm
}

/// Decimal digits only: `3½` or `Ⅻ` are not numbers here.
fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// `all_digits`, `some_digits` or `no_digits`.
pub fn digits(upper: &str) -> &'static str {
    if is_all_digits(upper) {
        "all_digits"
    } else if upper.chars().any(|c| c.is_ascii_digit()) {
        "some_digits"
    } else {
        "no_digits"
    }
}

/// Trailing punctuation of a raw token: the last character when it is
/// neither a word character nor `.`, and something precedes it.
fn ends_in_punctuation(token: &str) -> Option<char> {
    let mut chars = token.chars();
    let last = chars.next_back()?;
    chars.next()?;
    if last == '.' || last == '_' || last.is_alphanumeric() {
        None
    } else {
        Some(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use proptest::prelude::*;

    fn extract(raw: &str) -> Vec<TokenFeatures> {
        extract_features(&tokenize(raw), &Lexicon::standard(), &ReferenceSets::sample())
    }

    fn single(token: &str) -> TokenFeatures {
        token_features(token, &Lexicon::standard(), &ReferenceSets::sample())
    }

    #[test]
    fn test_mixed_token_has_some_digits() {
        let fm = single("221B");
        assert_eq!(fm.get_str(DIGITS), Some("some_digits"));
        assert_eq!(fm.get_str(WORD), Some("221B"));
        assert_eq!(fm.get_str(LENGTH), Some("w:4"));
    }

    #[test]
    fn test_numeric_token() {
        let fm = single("221");
        assert_eq!(fm.get_str(DIGITS), Some("all_digits"));
        assert_eq!(fm.get_bool(WORD), Some(false));
        assert_eq!(fm.get_str(LENGTH), Some("d:3"));
    }

    #[test]
    fn test_fraction_is_not_all_digits() {
        let fm = single("3½");
        assert_eq!(fm.get_str(DIGITS), Some("some_digits"));
        assert_eq!(fm.get_str(WORD), Some("3½"));
        assert_eq!(fm.get_str(LENGTH), Some("w:2"));

        let fm = single("Ⅻ");
        assert_eq!(fm.get_str(DIGITS), Some("no_digits"));
        assert_eq!(fm.get_str(WORD), Some("Ⅻ"));
    }

    #[test]
    fn test_word_token_is_uppercased() {
        let fm = single("Baker");
        assert_eq!(fm.get_str(DIGITS), Some("no_digits"));
        assert_eq!(fm.get_str(WORD), Some("BAKER"));
        assert_eq!(fm.get_str(LENGTH), Some("w:5"));
        assert_eq!(fm.get_bool(HAS_VOWELS), Some(true));
    }

    #[test]
    fn test_word_keeps_captured_punctuation() {
        let fm = single("Street,");
        assert_eq!(fm.get_str(WORD), Some("STREET,"));
        assert_eq!(fm.get_str(LENGTH), Some("w:7"));
        assert_eq!(fm.get_bool("road"), Some(false));
    }

    #[test]
    fn test_ends_in_punctuation() {
        assert_eq!(single("Street,").get_str(ENDS_IN_PUNC), Some(","));
        assert_eq!(single("(Rear)").get_str(ENDS_IN_PUNC), Some(")"));
        assert_eq!(single("Road;").get_str(ENDS_IN_PUNC), Some(";"));
        assert_eq!(single("St.").get_bool(ENDS_IN_PUNC), Some(false));
        assert_eq!(single("O'Neil").get_bool(ENDS_IN_PUNC), Some(false));
        assert_eq!(single("Baker").get_bool(ENDS_IN_PUNC), Some(false));
        assert_eq!(single("&").get_bool(ENDS_IN_PUNC), Some(false));
    }

    #[test]
    fn test_has_vowels() {
        assert_eq!(single("SW1A").get_bool(HAS_VOWELS), Some(true));
        assert_eq!(single("M14").get_bool(HAS_VOWELS), Some(false));
        assert_eq!(single("Flt").get_bool(HAS_VOWELS), Some(false));
    }

    #[test]
    fn test_lexicon_flags() {
        let fm = single("street");
        assert_eq!(fm.get_bool("road"), Some(true));
        assert_eq!(fm.get_bool("flat"), Some(false));

        let fm = single("Court");
        assert_eq!(fm.get_bool("road"), Some(true));
        assert_eq!(fm.get_bool("residential"), Some(true));

        assert_eq!(single("Ltd").get_bool("company"), Some(true));
        assert_eq!(single("Flat").get_bool("flat"), Some(true));
        assert_eq!(single("north").get_bool("directional"), Some(true));
        assert_eq!(single("Hospital").get_bool("business"), Some(true));
        assert_eq!(single("1st").get_bool("locational"), Some(true));
    }

    #[test]
    fn test_reference_lookups() {
        assert_eq!(single("london").get_bool(POSTTOWN), Some(true));
        assert_eq!(single("London").get_bool(POSTTOWN), Some(true));
        assert_eq!(single("Londres").get_bool(POSTTOWN), Some(false));
        assert_eq!(single("sw1a").get_bool(OUTCODE), Some(true));
        assert_eq!(single("SW1A").get_bool(POSTTOWN), Some(false));
    }

    #[test]
    fn test_boundary_markers() {
        let features = extract("221B Baker Street, London");
        assert_eq!(features.len(), 4);

        assert_eq!(features[0].get_bool(RAWSTRING_START), Some(true));
        assert_eq!(features[3].get_bool(RAWSTRING_END), Some(true));
        for fm in &features[1..3] {
            assert!(!fm.contains_key(RAWSTRING_START));
            assert!(!fm.contains_key(RAWSTRING_END));
        }
        assert!(!features[0].contains_key(RAWSTRING_END));
        assert!(!features[3].contains_key(RAWSTRING_START));

        let prev_of_1 = features[1].previous().unwrap();
        assert_eq!(prev_of_1.get_bool(RAWSTRING_START), Some(true));
        let next_of_2 = features[2].next().unwrap();
        assert_eq!(next_of_2.get_bool(RAWSTRING_END), Some(true));

        // Inner context copies stay unmarked.
        assert!(!features[2].previous().unwrap().contains_key(RAWSTRING_START));
        assert!(!features[1].next().unwrap().contains_key(RAWSTRING_END));
        assert!(!features[0].contains_key(SINGLETON));
    }

    #[test]
    fn test_two_tokens() {
        let features = extract("Baker Street");
        assert_eq!(features[0].get_bool(RAWSTRING_START), Some(true));
        assert_eq!(features[1].get_bool(RAWSTRING_END), Some(true));
        assert_eq!(features[1].previous().unwrap().get_bool(RAWSTRING_START), Some(true));
        assert_eq!(features[0].next().unwrap().get_bool(RAWSTRING_END), Some(true));
        assert!(features[0].previous().is_none());
        assert!(features[1].next().is_none());
    }

    #[test]
    fn test_singleton() {
        let features = extract("Postcode");
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].get_bool(SINGLETON), Some(true));
        assert!(!features[0].contains_key(RAWSTRING_START));
        assert!(!features[0].contains_key(RAWSTRING_END));
        assert!(features[0].previous().is_none());
        assert!(features[0].next().is_none());
    }

    #[test]
    fn test_empty_sequence() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_context_copies_are_intrinsic() {
        let features = extract("10 Downing Street London");
        let fm = &features[1];
        assert_eq!(fm.get_str(WORD), Some("DOWNING"));
        assert_eq!(fm.previous().unwrap().get_str(DIGITS), Some("all_digits"));
        assert_eq!(fm.next().unwrap().get_bool("road"), Some(true));

        // One level of nesting only.
        assert!(fm.previous().unwrap().previous().is_none());
        assert!(fm.next().unwrap().next().is_none());
        assert!(fm.next().unwrap().previous().is_none());
    }

    #[test]
    fn test_attributes_flatten() {
        let features = extract("10 Downing Street");
        let attrs: Vec<String> = features[1].attributes().into_iter().map(|(k, _)| k).collect();
        assert!(attrs.contains(&"word:DOWNING".to_string()));
        assert!(attrs.contains(&"digits:no_digits".to_string()));
        assert!(attrs.contains(&"previous:digits:all_digits".to_string()));
        assert!(attrs.contains(&"previous:rawstring.start".to_string()));
        assert!(attrs.contains(&"next:road".to_string()));
        assert!(attrs.contains(&"next:rawstring.end".to_string()));
        // `false` values are not emitted
        assert!(!attrs.iter().any(|a| a == "road"));

        let fv = features[1].to_vector(1);
        assert_eq!(fv.features.get("bias"), Some(&1.0));
        assert_eq!(fv.token_index, 1);
    }

    #[test]
    fn test_feature_map_serializes_as_plain_object() {
        let features = extract("10 Downing");
        let json = serde_json::to_value(&features[0]).unwrap();
        assert_eq!(json["digits"], "all_digits");
        assert_eq!(json["word"], false);
        assert_eq!(json["next"]["word"], "DOWNING");
        assert_eq!(json["next"]["rawstring.end"], true);

        let back: TokenFeatures = serde_json::from_value(json).unwrap();
        assert_eq!(back, features[0]);
    }

    proptest! {
        #[test]
        fn prop_features_align_with_tokens(s in "[A-Za-z0-9 ,;#&().]{1,60}") {
            let tokens = tokenize(&s);
            let features = extract_features(&tokens, &Lexicon::standard(), &ReferenceSets::sample());
            prop_assert_eq!(features.len(), tokens.len());
            for (token, fm) in tokens.iter().zip(&features) {
                let upper = token.text.to_uppercase();
                prop_assert_eq!(fm.get_str(DIGITS), Some(digits(&upper)));
                if is_all_digits(&upper) {
                    prop_assert_eq!(fm.get_bool(WORD), Some(false));
                } else {
                    prop_assert_eq!(fm.get_str(WORD), Some(upper.as_str()));
                }
            }
        }
    }
}
