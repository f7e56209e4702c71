// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

// A record for sequences, consisting of an id, some description and a raw sequence, plus optional
// annotations. Meant to be format-agnostic - should work for FastA, Stockholm, etc. Sequences are
// ASCII (the readers reject anything else), so positions are byte offsets.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::seq::alphabet::Alphabet;

/// Global (per-record) metadata. A `List` whose length equals the sequence length is considered
/// positional and follows the sequence through reversal; other edits that change the length drop
/// it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Annotation {
    Text(String),
    Integer(i64),
    Float(f64),
    List(Vec<String>),
}

/// Per-site metadata, always as long as the sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterAnnotation {
    Scores(Vec<u32>),
    Symbols(String),
}

impl LetterAnnotation {
    pub fn len(&self) -> usize {
        match self {
            LetterAnnotation::Scores(v) => v.len(),
            LetterAnnotation::Symbols(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reversed(&self) -> LetterAnnotation {
        match self {
            LetterAnnotation::Scores(v) => LetterAnnotation::Scores(v.iter().rev().copied().collect()),
            LetterAnnotation::Symbols(s) => LetterAnnotation::Symbols(s.chars().rev().collect()),
        }
    }

    pub fn slice(&self, range: Range<usize>) -> LetterAnnotation {
        let range = clamp(range, self.len());
        match self {
            LetterAnnotation::Scores(v) => LetterAnnotation::Scores(v[range].to_vec()),
            LetterAnnotation::Symbols(s) => {
                LetterAnnotation::Symbols(String::from_utf8_lossy(&s.as_bytes()[range]).into_owned())
            }
        }
    }

    pub fn select(&self, keep: &[bool]) -> LetterAnnotation {
        match self {
            LetterAnnotation::Scores(v) => LetterAnnotation::Scores(
                v.iter()
                    .zip(keep)
                    .filter_map(|(x, k)| k.then_some(*x))
                    .collect(),
            ),
            LetterAnnotation::Symbols(s) => LetterAnnotation::Symbols(
                s.chars()
                    .zip(keep)
                    .filter_map(|(c, k)| k.then_some(c))
                    .collect(),
            ),
        }
    }

    /// Concatenates two annotations of the same kind; None if the kinds differ.
    pub fn concat(&self, other: &LetterAnnotation) -> Option<LetterAnnotation> {
        match (self, other) {
            (LetterAnnotation::Scores(a), LetterAnnotation::Scores(b)) => {
                Some(LetterAnnotation::Scores(a.iter().chain(b).copied().collect()))
            }
            (LetterAnnotation::Symbols(a), LetterAnnotation::Symbols(b)) => {
                Some(LetterAnnotation::Symbols(format!("{}{}", a, b)))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeqRecord {
    pub id: String,
    pub description: String,
    pub sequence: String,
    #[serde(default)]
    pub alphabet: Alphabet,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, Annotation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub letter_annotations: BTreeMap<String, LetterAnnotation>,
}

fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    let start = range.start.min(end);
    start..end
}

impl SeqRecord {
    /// Builds a record, guessing its alphabet from the sequence.
    pub fn new(id: impl Into<String>, description: impl Into<String>, sequence: impl Into<String>) -> Self {
        let sequence = sequence.into();
        SeqRecord {
            id: id.into(),
            description: description.into(),
            alphabet: Alphabet::guess(&sequence),
            sequence,
            annotations: BTreeMap::new(),
            letter_annotations: BTreeMap::new(),
        }
    }

    /// Splits a header line (without '>') into id (first word) and description (whole line).
    pub fn from_header(header: &str, sequence: String) -> Self {
        let description = header.trim();
        let id = description.split_whitespace().next().unwrap_or("");
        SeqRecord::new(id, description, sequence)
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Length once every character of `gap_chars` is removed.
    pub fn ungapped_len(&self, gap_chars: &str) -> usize {
        self.sequence.chars().filter(|c| !gap_chars.contains(*c)).count()
    }

    /// Title line for FastA output: the description if it already starts with the id, else both.
    pub fn title(&self) -> String {
        if self.description.is_empty() {
            self.id.clone()
        } else if self.description.split_whitespace().next() == Some(self.id.as_str()) {
            self.description.clone()
        } else {
            format!("{} {}", self.id, self.description)
        }
    }

    /// True iff every letter annotation has the sequence's length.
    pub fn annotations_consistent(&self) -> bool {
        self.letter_annotations.values().all(|v| v.len() == self.len())
    }

    /// Changes the id; if the description starts with the old id, that leading occurrence becomes
    /// the new id as well.
    pub fn rename(&mut self, new_id: impl Into<String>) {
        let new_id = new_id.into();
        if let Some(rest) = self.description.strip_prefix(self.id.as_str()) {
            self.description = format!("{}{}", new_id, rest);
        }
        self.id = new_id;
    }

    /// Maps every symbol; the length does not change, so annotations are kept.
    pub fn map_symbols<F: FnMut(char) -> char>(mut self, f: F) -> Self {
        self.sequence = self.sequence.chars().map(f).collect();
        self
    }

    /// Replaces the sequence with one of arbitrary length. Positional annotations no longer line
    /// up and are dropped.
    pub fn replace_sequence(mut self, sequence: String) -> Self {
        self.drop_positional();
        self.sequence = sequence;
        self
    }

    /// Reverses the order of sites, mapping each symbol through `f`. Positional annotations are
    /// reversed in lockstep.
    pub fn reversed_with<F: FnMut(char) -> char>(mut self, f: F) -> Self {
        let len = self.len();
        self.sequence = self.sequence.chars().rev().map(f).collect();
        for value in self.letter_annotations.values_mut() {
            *value = value.reversed();
        }
        for value in self.annotations.values_mut() {
            if let Annotation::List(items) = value {
                if items.len() == len {
                    items.reverse();
                }
            }
        }
        self
    }

    /// Cuts `range` (clamped to the sequence). Letter annotations are cut with it.
    pub fn slice(&self, range: Range<usize>) -> SeqRecord {
        let range = clamp(range, self.len());
        let mut result = self.clone();
        result.drop_positional_globals();
        result.sequence = String::from_utf8_lossy(&self.sequence.as_bytes()[range.clone()]).into_owned();
        for value in result.letter_annotations.values_mut() {
            *value = value.slice(range.clone());
        }
        result
    }

    /// Appends `other`'s sequence. Letter annotations survive only if both sides carry the same
    /// key with the same kind; id, description and global annotations are `self`'s.
    pub fn concat(mut self, other: &SeqRecord) -> SeqRecord {
        self.drop_positional_globals();
        self.sequence.push_str(&other.sequence);
        let keys: Vec<String> = self.letter_annotations.keys().cloned().collect();
        for key in keys {
            let joined = match (self.letter_annotations.get(&key), other.letter_annotations.get(&key)) {
                (Some(a), Some(b)) => a.concat(b),
                _ => None,
            };
            match joined {
                Some(value) => {
                    self.letter_annotations.insert(key, value);
                }
                None => {
                    self.letter_annotations.remove(&key);
                }
            }
        }
        self
    }

    /// Keeps the columns whose `keep` flag is set. Letter annotations are selected identically.
    pub fn select_columns(mut self, keep: &[bool]) -> SeqRecord {
        self.drop_positional_globals();
        self.sequence = self
            .sequence
            .chars()
            .zip(keep)
            .filter_map(|(c, k)| k.then_some(c))
            .collect();
        for value in self.letter_annotations.values_mut() {
            *value = value.select(keep);
        }
        self
    }

    fn drop_positional(&mut self) {
        self.drop_positional_globals();
        self.letter_annotations.clear();
    }

    fn drop_positional_globals(&mut self) {
        let len = self.len();
        self.annotations
            .retain(|_, v| !matches!(v, Annotation::List(items) if items.len() == len));
    }
}
