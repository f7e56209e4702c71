// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Filters: records are kept or dropped whole, never modified, and order is preserved.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::errors::Result;
use crate::seq::record::SeqRecord;
use crate::transform::filter_records;
use crate::transform::rename::case_insensitive;

pub fn name_include<I>(records: I, pattern: &str) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let regex = case_insensitive(pattern)?;
    Ok(filter_records(records, move |rec| regex.is_match(&rec.id)))
}

pub fn name_exclude<I>(records: I, pattern: &str) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let regex = case_insensitive(pattern)?;
    Ok(filter_records(records, move |rec| !regex.is_match(&rec.id)))
}

pub fn seq_include<I>(records: I, pattern: &str) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let regex = case_insensitive(pattern)?;
    Ok(filter_records(records, move |rec| regex.is_match(&rec.sequence)))
}

pub fn seq_exclude<I>(records: I, pattern: &str) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let regex = case_insensitive(pattern)?;
    Ok(filter_records(records, move |rec| !regex.is_match(&rec.sequence)))
}

/// Reads a set of ids, one per line. Surrounding whitespace is ignored, as are blank lines.
pub fn read_id_list<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let file = File::open(path)?;
    let mut ids = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let id = line.trim();
        if !id.is_empty() {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}

pub fn include_from_ids<I>(records: I, ids: HashSet<String>) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    filter_records(records, move |rec| ids.contains(rec.id.trim()))
}

pub fn exclude_from_ids<I>(records: I, ids: HashSet<String>) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    filter_records(records, move |rec| !ids.contains(rec.id.trim()))
}

pub fn max_length_discard<I>(records: I, max_length: usize) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    filter_records(records, move |rec| {
        let keep = rec.len() <= max_length;
        if !keep {
            debug!("Discarding long sequence: {}, length={}", rec.id, rec.len());
        }
        keep
    })
}

pub fn min_length_discard<I>(records: I, min_length: usize) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    filter_records(records, move |rec| {
        let keep = rec.len() >= min_length;
        if !keep {
            debug!("Discarding short sequence: {}, length={}", rec.id, rec.len());
        }
        keep
    })
}

/// Like `min_length_discard()`, but on the length without the characters in `gap_chars`.
pub fn min_ungap_length_discard<I>(
    records: I,
    min_length: usize,
    gap_chars: &str,
) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let gap_chars = gap_chars.to_string();
    filter_records(records, move |rec| {
        let ungapped = rec.ungapped_len(&gap_chars);
        let keep = ungapped >= min_length;
        if !keep {
            debug!("Discarding short sequence: {}, ungapped length={}", rec.id, ungapped);
        }
        keep
    })
}

/// Drops records that are nothing but gaps (empty sequences included).
pub fn prune_empty<I>(records: I, gap_chars: &str) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let gap_chars = gap_chars.to_string();
    filter_records(records, move |rec| {
        rec.sequence.chars().any(|c| !gap_chars.contains(c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_utils::*;
    use crate::transform::GAP_CHARS;
    use std::io::Write;

    fn input() -> std::vec::IntoIter<Result<SeqRecord>> {
        stream(&[
            ("Human_1", "ACGT"),
            ("mouse_1", "AC--GTAC"),
            ("HUMAN_2", "--A-"),
            ("rat_1", "----"),
        ])
    }

    #[test]
    fn test_name_include_exclude() {
        assert_eq!(ids(name_include(input(), "human").unwrap()), vec!["Human_1", "HUMAN_2"]);
        assert_eq!(ids(name_exclude(input(), "human").unwrap()), vec!["mouse_1", "rat_1"]);
    }

    #[test]
    fn test_seq_include_exclude() {
        assert_eq!(ids(seq_include(input(), "gt").unwrap()), vec!["Human_1", "mouse_1"]);
        assert_eq!(ids(seq_exclude(input(), "^-").unwrap()), vec!["Human_1", "mouse_1"]);
    }

    #[test]
    fn test_bad_pattern() {
        assert!(name_include(input(), "[").is_err());
    }

    #[test]
    fn test_length_discards() {
        assert_eq!(ids(max_length_discard(input(), 4)), vec!["Human_1", "HUMAN_2", "rat_1"]);
        assert_eq!(ids(min_length_discard(input(), 5)), vec!["mouse_1"]);
        assert_eq!(
            ids(min_ungap_length_discard(input(), 4, GAP_CHARS)),
            vec!["Human_1", "mouse_1"]
        );
    }

    #[test]
    fn test_prune_empty() {
        assert_eq!(
            ids(prune_empty(input(), GAP_CHARS)),
            vec!["Human_1", "mouse_1", "HUMAN_2"]
        );
    }

    #[test]
    fn test_id_list_filters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mouse_1\n  rat_1  \n").unwrap();
        file.flush().unwrap();
        let wanted = read_id_list(file.path()).unwrap();
        assert_eq!(wanted.len(), 2);
        assert_eq!(ids(include_from_ids(input(), wanted.clone())), vec!["mouse_1", "rat_1"]);
        assert_eq!(ids(exclude_from_ids(input(), wanted)), vec!["Human_1", "HUMAN_2"]);
    }
}
