// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::io;

use thiserror::Error;

use crate::seq::alphabet::Alphabet;

pub type Result<T> = std::result::Result<T, SeqMorphError>;

#[derive(Debug, Error)]
pub enum SeqMorphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Malformed regex: {0}")]
    Regex(#[from] regex::Error),

    /// Region or slice bounds where end <= start.
    #[error("Invalid range: start of slice must precede end ({start} !< {end})")]
    InvalidRange { start: usize, end: usize },

    /// A record whose length differs from the rest of the alignment.
    #[error("Unexpected sequence length {found} for '{id}' (expected {expected}). Is this an alignment?")]
    LengthMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("Cannot {operation} record '{id}' with alphabet {alphabet}")]
    AlphabetMismatch {
        id: String,
        operation: &'static str,
        alphabet: Alphabet,
    },

    #[error("Unrecognized codon: {0}")]
    UnrecognizedCodon(String),

    /// Spill buffer could not store or restore a record.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// Lets '?' work on plain message strings, as the readers produce them.
impl From<String> for SeqMorphError {
    fn from(s: String) -> Self {
        SeqMorphError::Format(s)
    }
}

impl From<serde_json::Error> for SeqMorphError {
    fn from(e: serde_json::Error) -> Self {
        SeqMorphError::Serialization(e.to_string())
    }
}
