//! # Reference Lookup Sets
//!
//! Postcode districts ("outcodes") and post towns, built from a table of
//! `(postcode, town)` pairs. The core only needs the two uppercase sets; where
//! the table comes from is up to the caller.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::{AddressError, Result};

/// Known outcodes and post towns, keyed by uppercase exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSets {
    pub outcodes: HashSet<String>,
    pub posttowns: HashSet<String>,
}

/// A handful of real district → town pairs, enough for demos and tests.
const SAMPLE_TABLE: &[(&str, &str)] = &[
    ("EC1A", "LONDON"),
    ("SW1A", "LONDON"),
    ("NW1", "LONDON"),
    ("W1", "LONDON"),
    ("E1", "LONDON"),
    ("M1", "MANCHESTER"),
    ("M14", "MANCHESTER"),
    ("B1", "BIRMINGHAM"),
    ("LS1", "LEEDS"),
    ("LS6", "LEEDS"),
    ("CF10", "CARDIFF"),
    ("EH1", "EDINBURGH"),
    ("G1", "GLASGOW"),
    ("BS1", "BRISTOL"),
    ("NP20", "NEWPORT"),
    ("PO15", "FAREHAM"),
    ("SO14", "SOUTHAMPTON"),
    ("OX1", "OXFORD"),
    ("CB2", "CAMBRIDGE"),
    ("YO1", "YORK"),
];

impl ReferenceSets {
    /// Builds the sets from `(postcode, town)` pairs, trimming and uppercasing both.
    pub fn from_pairs<I, P, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let mut sets = Self::default();
        for (postcode, town) in pairs {
            let postcode = postcode.as_ref().trim();
            let town = town.as_ref().trim();
            if !postcode.is_empty() {
                sets.outcodes.insert(postcode.to_uppercase());
            }
            if !town.is_empty() {
                sets.posttowns.insert(town.to_uppercase());
            }
        }
        sets
    }

    /// The built-in sample table.
    pub fn sample() -> Self {
        Self::from_pairs(SAMPLE_TABLE.iter().copied())
    }

    /// Parses a comma separated table whose header names a `postcode` and a
    /// `town` column (any order, other columns ignored).
    pub fn from_csv_str(table: &str) -> Result<Self> {
        let mut lines = table
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines.next().ok_or(AddressError::ReferenceData {
            line: 1,
            reason: "empty table".to_string(),
        })?;
        let columns: Vec<String> = split_row(header, header_line)?
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();
        let column = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| AddressError::ReferenceData {
                    line: header_line,
                    reason: format!("header has no '{name}' column"),
                })
        };
        let postcode_col = column("postcode")?;
        let town_col = column("town")?;

        let mut pairs = Vec::new();
        for (line_no, line) in lines {
            let cells = split_row(line, line_no)?;
            let cell = |idx: usize| {
                cells.get(idx).cloned().ok_or_else(|| AddressError::ReferenceData {
                    line: line_no,
                    reason: format!("expected at least {} columns, found {}", idx + 1, cells.len()),
                })
            };
            pairs.push((cell(postcode_col)?, cell(town_col)?));
        }

        let sets = Self::from_pairs(pairs);
        debug!(
            outcodes = sets.outcodes.len(),
            posttowns = sets.posttowns.len(),
            "reference table loaded"
        );
        Ok(sets)
    }

    /// Reads and parses a reference table from disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let table = std::fs::read_to_string(path.as_ref())?;
        Self::from_csv_str(&table)
    }

    pub fn is_outcode(&self, upper: &str) -> bool {
        self.outcodes.contains(upper)
    }

    pub fn is_posttown(&self, upper: &str) -> bool {
        self.posttowns.contains(upper)
    }
}

/// Splits one CSV row into trimmed cells.
///
/// A cell wrapped in double quotes may contain commas; `""` inside it is a
/// literal quote. Quoted cells spanning several lines are not supported.
fn split_row(line: &str, line_no: usize) -> Result<Vec<String>> {
    let malformed = |reason: &str| AddressError::ReferenceData {
        line: line_no,
        reason: reason.to_string(),
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut quoted = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            ',' => {
                cells.push(cell.trim().to_string());
                cell.clear();
                quoted = false;
            }
            '"' if cell.trim().is_empty() && !quoted => {
                cell.clear();
                in_quotes = true;
                quoted = true;
            }
            '"' => return Err(malformed("stray quote inside cell")),
            _ if quoted && !c.is_whitespace() => {
                return Err(malformed("text after closing quote"));
            }
            _ => cell.push(c),
        }
    }
    if in_quotes {
        return Err(malformed("unterminated quoted cell"));
    }
    cells.push(cell.trim().to_string());
    Ok(cells)
}
