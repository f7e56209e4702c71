// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Symbol-level cleanups: gap normalisation, case, ungapping.

use crate::errors::Result;
use crate::seq::record::SeqRecord;
use crate::transform::{map_records, GAP_CHAR};

/// Converts the '?' and '~' placeholders to gaps. Length does not change.
pub fn dashes_cleanup<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    map_records(records, |rec| {
        Ok(rec.map_symbols(|c| match c {
            '?' | '~' => GAP_CHAR,
            other => other,
        }))
    })
}

pub fn upper_sequences<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    map_records(records, |rec| Ok(rec.map_symbols(|c| c.to_ascii_uppercase())))
}

pub fn lower_sequences<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    map_records(records, |rec| Ok(rec.map_symbols(|c| c.to_ascii_lowercase())))
}

/// Removes every character of `gap_chars` from a record. Per-site annotations cannot survive
/// this and are dropped.
pub fn ungap_record(rec: SeqRecord, gap_chars: &str) -> SeqRecord {
    let ungapped: String = rec.sequence.chars().filter(|c| !gap_chars.contains(*c)).collect();
    rec.replace_sequence(ungapped)
}

pub fn ungap_sequences<I>(records: I, gap_chars: &str) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let gap_chars = gap_chars.to_string();
    map_records(records, move |rec| Ok(ungap_record(rec, &gap_chars)))
}
