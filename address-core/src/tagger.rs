//! # Address Labels and Component Assembly
//!
//! Defines the closed set of labels a tagger may assign to a token, and the
//! assembler that turns `(token, label)` pairs back into address components.
//!
//! | Label              | Example tokens              |
//! |--------------------|-----------------------------|
//! | `OrganisationName` | Acme Widgets Ltd            |
//! | `DepartmentName`   | Accounts Department         |
//! | `SubBuildingName`  | Flat 2, Unit 4              |
//! | `BuildingName`     | Rose Cottage                |
//! | `BuildingNumber`   | 10, 221B                    |
//! | `StreetName`       | Main Street                 |
//! | `Locality`         | Headingley                  |
//! | `TownName`         | Leeds                       |
//! | `Postcode`         | LS6 3AB                     |
//! | `Null`             | anything else               |

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::tokenizer::Token;

/// Characters stripped from both ends of an assembled component, besides whitespace.
const BOUNDARY_PUNCTUATION: &[char] = &[',', ';'];

/// Address component assigned to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    OrganisationName,
    DepartmentName,
    SubBuildingName,
    BuildingName,
    BuildingNumber,
    StreetName,
    Locality,
    TownName,
    Postcode,
    /// Token belongs to no component.
    Null,
}

impl Label {
    /// Number of labels, [`Label::Null`] included.
    pub const COUNT: usize = 10;

    /// All labels in index order.
    pub fn all() -> [Label; Label::COUNT] {
        [
            Label::OrganisationName,
            Label::DepartmentName,
            Label::SubBuildingName,
            Label::BuildingName,
            Label::BuildingNumber,
            Label::StreetName,
            Label::Locality,
            Label::TownName,
            Label::Postcode,
            Label::Null,
        ]
    }

    /// Row/column of this label in the transition matrix.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            Label::OrganisationName => "OrganisationName",
            Label::DepartmentName => "DepartmentName",
            Label::SubBuildingName => "SubBuildingName",
            Label::BuildingName => "BuildingName",
            Label::BuildingNumber => "BuildingNumber",
            Label::StreetName => "StreetName",
            Label::Locality => "Locality",
            Label::TownName => "TownName",
            Label::Postcode => "Postcode",
            Label::Null => "Null",
        }
    }

    /// Parses a label name (ex: "StreetName" → `Label::StreetName`).
    pub fn from_label(s: &str) -> Option<Self> {
        Label::all().into_iter().find(|l| l.label() == s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A token with the label the tagger gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub label: Label,
}

/// Assembled address: label → component text, in first-seen label order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedAddress {
    components: Vec<(Label, String)>,
}

impl TaggedAddress {
    pub fn get(&self, label: Label) -> Option<&str> {
        self.components
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, s)| s.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.components.iter().map(|(l, _)| *l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, &str)> {
        self.components.iter().map(|(l, s)| (*l, s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Drops the [`Label::Null`] component, if present.
    pub fn without_null(mut self) -> Self {
        self.components.retain(|(l, _)| *l != Label::Null);
        self
    }
}

impl Serialize for TaggedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.components.len()))?;
        for (label, text) in &self.components {
            map.serialize_entry(label.label(), text)?;
        }
        map.end()
    }
}

/// Groups tokens by label and joins each group into a component string.
///
/// Labels appear in the order of their first token; tokens keep their input
/// order within a group even when not contiguous. Each component is joined
/// with single spaces and stripped of surrounding whitespace, `,` and `;`.
/// `Null` is kept like any other label.
///
/// # Panics
///
/// When `tokens` and `labels` differ in length. That means the tagger broke
/// index alignment, which is a bug rather than bad input.
pub fn assemble<S: AsRef<str>>(tokens: &[S], labels: &[Label]) -> TaggedAddress {
    assert_eq!(
        tokens.len(),
        labels.len(),
        "token/label length mismatch: tagger output must be index-aligned with its input"
    );

    let mut groups: Vec<(Label, Vec<&str>)> = Vec::new();
    for (token, label) in tokens.iter().zip(labels) {
        match groups.iter_mut().find(|(l, _)| l == label) {
            Some((_, parts)) => parts.push(token.as_ref()),
            None => groups.push((*label, vec![token.as_ref()])),
        }
    }

    let components = groups
        .into_iter()
        .map(|(label, parts)| (label, clean_component(&parts.join(" "))))
        .collect();

    TaggedAddress { components }
}

/// Same as [`assemble`], from already paired tokens.
pub fn assemble_tagged(tagged: &[TaggedToken]) -> TaggedAddress {
    let tokens: Vec<&str> = tagged.iter().map(|t| t.token.text.as_str()).collect();
    let labels: Vec<Label> = tagged.iter().map(|t| t.label).collect();
    assemble(&tokens, &labels)
}

fn clean_component(joined: &str) -> String {
    joined
        .trim_matches(|c: char| c.is_whitespace() || BOUNDARY_PUNCTUATION.contains(&c))
        .to_string()
}
