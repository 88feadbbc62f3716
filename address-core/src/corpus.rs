//! # Labelled UK Address Corpus
//!
//! Small hand-labelled corpus used to train the default model and to test
//! the pipeline end to end. Each entry stores the raw string together with
//! its tokens (exactly as [`crate::tokenizer::tokenize`] cuts them) and the
//! label of each token.

use crate::model::TrainingExample;
use crate::tagger::Label;

const ORG: Label = Label::OrganisationName;
const DEP: Label = Label::DepartmentName;
const SUB: Label = Label::SubBuildingName;
const BLD: Label = Label::BuildingName;
const NUM: Label = Label::BuildingNumber;
const STR: Label = Label::StreetName;
const LOC: Label = Label::Locality;
const TWN: Label = Label::TownName;
const PC: Label = Label::Postcode;
const NUL: Label = Label::Null;

/// A labelled address.
pub struct AnnotatedAddress {
    /// Raw address string.
    pub text: &'static str,
    /// `(token, label)` pairs in input order.
    pub annotations: &'static [(&'static str, Label)],
}

/// Returns the full corpus.
pub fn get_corpus() -> Vec<AnnotatedAddress> {
    vec![
        AnnotatedAddress {
            text: "Flat 2, 10 Main Street, London EC1A 1BB",
            annotations: &[
                ("Flat", SUB), ("2,", SUB), ("10", NUM), ("Main", STR), ("Street,", STR),
                ("London", TWN), ("EC1A", PC), ("1BB", PC),
            ],
        },
        AnnotatedAddress {
            text: "221B Baker Street, London NW1 6XE",
            annotations: &[
                ("221B", NUM), ("Baker", STR), ("Street,", STR), ("London", TWN), ("NW1", PC),
                ("6XE", PC),
            ],
        },
        AnnotatedAddress {
            text: "Acme Widgets Ltd, Unit 4, Park Road, Leeds LS6 2AB",
            annotations: &[
                ("Acme", ORG), ("Widgets", ORG), ("Ltd,", ORG), ("Unit", SUB), ("4,", SUB),
                ("Park", STR), ("Road,", STR), ("Leeds", TWN), ("LS6", PC), ("2AB", PC),
            ],
        },
        AnnotatedAddress {
            text: "Rose Cottage, Church Lane, Headingley, Leeds LS6 3AA",
            annotations: &[
                ("Rose", BLD), ("Cottage,", BLD), ("Church", STR), ("Lane,", STR),
                ("Headingley,", LOC), ("Leeds", TWN), ("LS6", PC), ("3AA", PC),
            ],
        },
        AnnotatedAddress {
            text: "Accounts Department, Northern Bank Plc, 5 King Street, Manchester M1 4AB",
            annotations: &[
                ("Accounts", DEP), ("Department,", DEP), ("Northern", ORG), ("Bank", ORG),
                ("Plc,", ORG), ("5", NUM), ("King", STR), ("Street,", STR), ("Manchester", TWN),
                ("M1", PC), ("4AB", PC),
            ],
        },
        AnnotatedAddress {
            text: "12 Queen Street, Cardiff CF10 2BU",
            annotations: &[
                ("12", NUM), ("Queen", STR), ("Street,", STR), ("Cardiff", TWN), ("CF10", PC),
                ("2BU", PC),
            ],
        },
        AnnotatedAddress {
            text: "Top Floor Flat, 27 Victoria Road, Fulwood, Sheffield S10 2DJ",
            annotations: &[
                ("Top", SUB), ("Floor", SUB), ("Flat,", SUB), ("27", NUM), ("Victoria", STR),
                ("Road,", STR), ("Fulwood,", LOC), ("Sheffield", TWN), ("S10", PC), ("2DJ", PC),
            ],
        },
        AnnotatedAddress {
            text: "Manor Farm, Mill Lane, Wheatley, Oxford OX1 4AA",
            annotations: &[
                ("Manor", BLD), ("Farm,", BLD), ("Mill", STR), ("Lane,", STR), ("Wheatley,", LOC),
                ("Oxford", TWN), ("OX1", PC), ("4AA", PC),
            ],
        },
        AnnotatedAddress {
            text: "Apartment 3, Riverside House, 1 Quay Street, Bristol BS1 5AB",
            annotations: &[
                ("Apartment", SUB), ("3,", SUB), ("Riverside", BLD), ("House,", BLD), ("1", NUM),
                ("Quay", STR), ("Street,", STR), ("Bristol", TWN), ("BS1", PC), ("5AB", PC),
            ],
        },
        AnnotatedAddress {
            text: "The Old Bakery, High Street, Grantchester, Cambridge CB2 9NQ",
            annotations: &[
                ("The", BLD), ("Old", BLD), ("Bakery,", BLD), ("High", STR), ("Street,", STR),
                ("Grantchester,", LOC), ("Cambridge", TWN), ("CB2", PC), ("9NQ", PC),
            ],
        },
        AnnotatedAddress {
            text: "St. Mary's Hospital, Praed Street, London W2 1NY",
            annotations: &[
                ("St.", ORG), ("Mary's", ORG), ("Hospital,", ORG), ("Praed", STR),
                ("Street,", STR), ("London", TWN), ("W2", PC), ("1NY", PC),
            ],
        },
        AnnotatedAddress {
            text: "48 Castle Road, Southsea, Portsmouth PO5 3DE",
            annotations: &[
                ("48", NUM), ("Castle", STR), ("Road,", STR), ("Southsea,", LOC),
                ("Portsmouth", TWN), ("PO5", PC), ("3DE", PC),
            ],
        },
        AnnotatedAddress {
            text: "Room 101, Ministry House, 3 Whitehall Place, London SW1A 2HD",
            annotations: &[
                ("Room", SUB), ("101,", SUB), ("Ministry", BLD), ("House,", BLD), ("3", NUM),
                ("Whitehall", STR), ("Place,", STR), ("London", TWN), ("SW1A", PC), ("2HD", PC),
            ],
        },
        AnnotatedAddress {
            text: "Ground Floor, 9 Princes Street, Edinburgh EH1 2EU",
            annotations: &[
                ("Ground", SUB), ("Floor,", SUB), ("9", NUM), ("Princes", STR), ("Street,", STR),
                ("Edinburgh", TWN), ("EH1", PC), ("2EU", PC),
            ],
        },
        AnnotatedAddress {
            text: "Glasgow Tenants Society, 40 George Square, Glasgow G1 1DU",
            annotations: &[
                ("Glasgow", ORG), ("Tenants", ORG), ("Society,", ORG), ("40", NUM),
                ("George", STR), ("Square,", STR), ("Glasgow", TWN), ("G1", PC), ("1DU", PC),
            ],
        },
        AnnotatedAddress {
            text: "7 Elm Close, York YO1 7HH",
            annotations: &[
                ("7", NUM), ("Elm", STR), ("Close,", STR), ("York", TWN), ("YO1", PC), ("7HH", PC),
            ],
        },
        AnnotatedAddress {
            text: "Unit 12, Ocean Way, Southampton SO14 3TJ",
            annotations: &[
                ("Unit", SUB), ("12,", SUB), ("Ocean", STR), ("Way,", STR), ("Southampton", TWN),
                ("SO14", PC), ("3TJ", PC),
            ],
        },
        AnnotatedAddress {
            text: "Flat 5 Belmont Court, 18 Station Road, Newport NP20 4AB",
            annotations: &[
                ("Flat", SUB), ("5", SUB), ("Belmont", BLD), ("Court,", BLD), ("18", NUM),
                ("Station", STR), ("Road,", STR), ("Newport", TWN), ("NP20", PC), ("4AB", PC),
            ],
        },
        AnnotatedAddress {
            text: "c/o Mrs Jones, 3 Birch Walk, Fareham PO15 5AA",
            annotations: &[
                ("c/o", NUL), ("Mrs", NUL), ("Jones,", NUL), ("3", NUM), ("Birch", STR),
                ("Walk,", STR), ("Fareham", TWN), ("PO15", PC), ("5AA", PC),
            ],
        },
        AnnotatedAddress {
            text: "Smith & Sons Ltd, 2 Bridge Street, Birmingham B1 2JR",
            annotations: &[
                ("Smith", ORG), ("&", ORG), ("Sons", ORG), ("Ltd,", ORG), ("2", NUM),
                ("Bridge", STR), ("Street,", STR), ("Birmingham", TWN), ("B1", PC), ("2JR", PC),
            ],
        },
        AnnotatedAddress {
            text: "Basement Flat, 33 Albert Terrace, Bath BA1 2AA",
            annotations: &[
                ("Basement", SUB), ("Flat,", SUB), ("33", NUM), ("Albert", STR),
                ("Terrace,", STR), ("Bath", TWN), ("BA1", PC), ("2AA", PC),
            ],
        },
        AnnotatedAddress {
            text: "64 North Road East, Leeds LS1 4AP",
            annotations: &[
                ("64", NUM), ("North", STR), ("Road", STR), ("East,", STR), ("Leeds", TWN),
                ("LS1", PC), ("4AP", PC),
            ],
        },
    ]
}

/// The corpus as training examples.
pub fn training_examples() -> Vec<TrainingExample> {
    get_corpus()
        .iter()
        .map(|entry| TrainingExample::from_pairs(entry.annotations.iter().copied()))
        .collect()
}

/// Unlabelled addresses for the web demo.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Flat", "Flat 4, 22 Station Road, Leeds LS1 4AP"),
        ("Business", "Northern Care Ltd, Unit 7, Mill Lane, Manchester M14 5AB"),
        ("Named building", "Ivy Cottage, Church Lane, Wheatley, Oxford OX1 4AA"),
        ("Department", "Finance Department, City Bank Plc, 8 King Street, London EC1A 1BB"),
        ("Messy", "(rear) 3b high st.; york yo1 7hh"),
    ]
}
