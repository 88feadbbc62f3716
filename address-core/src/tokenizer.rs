//! # Address Tokenizer
//!
//! Splits a raw address string into the tokens the feature extractor sees.
//! Each token keeps its original casing, any captured punctuation, and its
//! byte offsets in the input.
//!
//! ## Splitting Rules
//!
//! - A token is a maximal run of characters other than whitespace, `,`, `;`,
//!   `#`, `&`, `(` and `)`, starting at a word boundary.
//! - Leading `(` characters are captured into the token: `"(Rear"`.
//! - A trailing run of `.`, `,`, `;`, `)` or newline is captured too: `"Street,"`.
//! - `#` and `&` are emitted as single-character tokens.
//! - Everything else (whitespace, bare separators) is dropped.
//!
//! ## Example
//!
//! ```rust
//! use address_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Flat 2, 10 Main Street, London");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Flat", "2,", "10", "Main", "Street,", "London"]);
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A token cut from the original address string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Token text as it appears in the input (ex: "Street,", "(Rear", "&").
    pub text: String,
    /// Byte offset of the first character in the input (inclusive).
    pub start: usize,
    /// Byte offset past the last character (exclusive).
    pub end: usize,
    /// Position in the token sequence (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// Builds a token that has no position in a source string, e.g. one read
    /// from pre-tokenized training data.
    pub fn detached(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            start: 0,
            end: 0,
            index,
        }
    }
}

const TOKEN_PATTERN: &str = r"\(*\b[^\s,;#&()]+[.,;)\n]*|[#&]";

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// Tokenizes an address string.
///
/// Pure function of its input. Empty or whitespace-only input yields an empty vector.
pub fn tokenize(raw: &str) -> Vec<Token> {
    token_regex()
        .find_iter(raw)
        .enumerate()
        .map(|(index, m)| Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            index,
        })
        .collect()
}

/// Tokenizes raw bytes, decoding them as UTF-8 first.
///
/// Invalid sequences never fail the call: they are replaced with U+FFFD and
/// the rest of the input is tokenized as usual.
pub fn tokenize_bytes(raw: &[u8]) -> Vec<Token> {
    tokenize(&decode_lossy(raw))
}

/// Decodes bytes as UTF-8, falling back to a lossy conversion.
pub fn decode_lossy(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(err) => {
            debug!(valid_up_to = err.valid_up_to(), "invalid UTF-8 in address input, decoding lossily");
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(raw: &str) -> Vec<String> {
        tokenize(raw).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_captures_trailing_punctuation() {
        assert_eq!(
            texts("Flat 2, 10 Main Street, London"),
            ["Flat", "2,", "10", "Main", "Street,", "London"]
        );
    }

    #[test]
    fn test_tokenize_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
        assert!(tokenize(" , ; ").is_empty());
    }

    #[test]
    fn test_tokenize_hash_and_ampersand_are_standalone() {
        assert_eq!(texts("Smith & Sons # 4"), ["Smith", "&", "Sons", "#", "4"]);
    }

    #[test]
    fn test_tokenize_leading_parenthesis_is_captured() {
        assert_eq!(texts("(Rear) 4 High St."), ["(Rear)", "4", "High", "St."]);
    }

    #[test]
    fn test_tokenize_semicolon_separated() {
        assert_eq!(texts("Unit 3;Park Road;Leeds"), ["Unit", "3;", "Park", "Road;", "Leeds"]);
    }

    #[test]
    fn test_tokenize_keeps_newline_in_token() {
        assert_eq!(texts("10 Main Street\nLondon"), ["10", "Main", "Street\n", "London"]);
    }

    #[test]
    fn test_tokenize_offsets_and_indices() {
        let raw = "221B Baker Street";
        let tokens = tokenize(raw);
        assert_eq!(tokens.len(), 3);
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.index, i);
            assert_eq!(&raw[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_tokenize_bytes_valid_and_invalid() {
        assert_eq!(tokenize_bytes(b"10 Main Street").len(), 3);

        let mut bytes = b"10 Main ".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b" London");
        let tokens = tokenize_bytes(&bytes);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"10"));
        assert!(texts.contains(&"London"));
    }

    proptest! {
        #[test]
        fn prop_tokenize_is_deterministic(s in "\\PC{0,60}") {
            prop_assert_eq!(tokenize(&s), tokenize(&s));
        }

        #[test]
        fn prop_tokens_are_ordered_substrings(s in "[A-Za-z0-9 ,;#&().\n]{0,60}") {
            let tokens = tokenize(&s);
            let mut last_end = 0;
            for token in &tokens {
                prop_assert!(token.start >= last_end);
                prop_assert_eq!(&s[token.start..token.end], token.text.as_str());
                last_end = token.end;
            }
        }
    }
}
