//! # Lexical Categories
//!
//! Fixed dictionaries of address keywords used as boolean features. All
//! entries are uppercase and matched exactly against the uppercased token.
//!
//! | Category      | Examples                         |
//! |---------------|----------------------------------|
//! | Directional   | N, NE, NORTH, SOUTHWEST          |
//! | Flat          | FLAT, APT, UNIT, BLOCK           |
//! | Company       | LTD, PLC, LLP                    |
//! | Road          | ROAD, RD, STREET, CLOSE, WAY     |
//! | Residential   | HOUSE, FARM, COTTAGE, MEWS       |
//! | Business      | OFFICE, HOSPITAL, BANK           |
//! | Locational    | BASEMENT, GROUND, FLOOR, 1ST     |

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keyword categories recognised by the feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalCategory {
    Directional,
    Flat,
    Company,
    Road,
    Residential,
    Business,
    Locational,
}

impl LexicalCategory {
    /// Feature name used for membership in this category.
    pub fn feature_name(&self) -> &'static str {
        match self {
            LexicalCategory::Directional => "directional",
            LexicalCategory::Flat => "flat",
            LexicalCategory::Company => "company",
            LexicalCategory::Road => "road",
            LexicalCategory::Residential => "residential",
            LexicalCategory::Business => "business",
            LexicalCategory::Locational => "locational",
        }
    }

    pub fn all() -> [LexicalCategory; 7] {
        [
            LexicalCategory::Directional,
            LexicalCategory::Flat,
            LexicalCategory::Company,
            LexicalCategory::Road,
            LexicalCategory::Residential,
            LexicalCategory::Business,
            LexicalCategory::Locational,
        ]
    }

    fn standard_words(&self) -> &'static [&'static str] {
        match self {
            LexicalCategory::Directional => DIRECTIONS,
            LexicalCategory::Flat => FLAT,
            LexicalCategory::Company => COMPANY,
            LexicalCategory::Road => ROAD,
            LexicalCategory::Residential => RESIDENTIAL,
            LexicalCategory::Business => BUSINESS,
            LexicalCategory::Locational => LOCATIONAL,
        }
    }
}

const DIRECTIONS: &[&str] = &[
    "N", "S", "E", "W", "NE", "NW", "SE", "SW", "NORTH", "SOUTH", "EAST", "WEST",
    "NORTHEAST", "NORTHWEST", "SOUTHEAST", "SOUTHWEST",
];

const FLAT: &[&str] = &[
    "FLAT", "FLT", "APARTMENT", "APPTS", "APPT", "APTS", "APT", "ROOM", "ANNEX", "ANNEXE",
    "UNIT", "BLOCK", "BLK",
];

const COMPANY: &[&str] = &[
    "CIC", "CIO", "LLP", "LP", "LTD", "LIMITED", "CYF", "PLC", "CCC", "UNLTD", "ULTD",
];

const ROAD: &[&str] = &[
    "ROAD", "RAOD", "RD", "DRIVE", "DR", "STREET", "STRT", "AVENUE", "AVENEU", "SQUARE",
    "LANE", "LNE", "LN", "COURT", "CRT", "CT", "PARK", "PK", "GRDN", "GARDEN", "CRESCENT",
    "CLOSE", "CL", "WALK", "WAY", "TERRACE", "BVLD",
];

const RESIDENTIAL: &[&str] = &[
    "HOUSE", "HSE", "FARM", "LODGE", "COURT", "COTTAGE", "COTTAGES", "VILLA", "VILLAS",
    "MAISONETTE", "MEWS",
];

const BUSINESS: &[&str] = &["OFFICE", "HOSPITAL", "CARE", "CLUB", "BANK", "BAR", "UK", "SOCIETY"];

const LOCATIONAL: &[&str] = &[
    "BASEMENT", "GROUND", "UPPER", "ABOVE", "TOP", "LOWER", "FLOOR", "FIRST", "1ST", "SECOND",
    "2ND", "THIRD", "3RD", "FOURTH", "4TH",
];

/// The keyword dictionaries, one set per [`LexicalCategory`].
///
/// Built once and shared read-only; pass a custom one to the parser to
/// experiment with different vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    pub directional: HashSet<String>,
    pub flat: HashSet<String>,
    pub company: HashSet<String>,
    pub road: HashSet<String>,
    pub residential: HashSet<String>,
    pub business: HashSet<String>,
    pub locational: HashSet<String>,
}

impl Lexicon {
    /// A lexicon with every category empty.
    pub fn empty() -> Self {
        Self {
            directional: HashSet::new(),
            flat: HashSet::new(),
            company: HashSet::new(),
            road: HashSet::new(),
            residential: HashSet::new(),
            business: HashSet::new(),
            locational: HashSet::new(),
        }
    }

    /// The standard UK address vocabulary.
    pub fn standard() -> Self {
        LexicalCategory::all()
            .into_iter()
            .fold(Self::empty(), |lexicon, category| {
                lexicon.with_words(category, category.standard_words().iter().copied())
            })
    }

    /// Adds words (uppercased) to one category.
    pub fn with_words<I, S>(mut self, category: LexicalCategory, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.set_mut(category);
        set.extend(words.into_iter().map(|w| w.as_ref().trim().to_uppercase()));
        self
    }

    pub fn set(&self, category: LexicalCategory) -> &HashSet<String> {
        match category {
            LexicalCategory::Directional => &self.directional,
            LexicalCategory::Flat => &self.flat,
            LexicalCategory::Company => &self.company,
            LexicalCategory::Road => &self.road,
            LexicalCategory::Residential => &self.residential,
            LexicalCategory::Business => &self.business,
            LexicalCategory::Locational => &self.locational,
        }
    }

    fn set_mut(&mut self, category: LexicalCategory) -> &mut HashSet<String> {
        match category {
            LexicalCategory::Directional => &mut self.directional,
            LexicalCategory::Flat => &mut self.flat,
            LexicalCategory::Company => &mut self.company,
            LexicalCategory::Road => &mut self.road,
            LexicalCategory::Residential => &mut self.residential,
            LexicalCategory::Business => &mut self.business,
            LexicalCategory::Locational => &mut self.locational,
        }
    }

    /// Exact membership of an already uppercased word.
    pub fn contains(&self, category: LexicalCategory, upper: &str) -> bool {
        self.set(category).contains(upper)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::standard()
    }
}
