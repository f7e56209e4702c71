// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Alignment column statistics, and the squeeze transform built on them.

use log::debug;

use crate::errors::{Result, SeqMorphError};
use crate::seq::record::SeqRecord;

/// For each column, the fraction of records with a gap there. Every record must have the length
/// of the first. An empty stream gives an empty vector.
pub fn gap_proportion<I>(records: I, gap_chars: &str) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = Result<SeqRecord>>,
{
    let mut gaps: Vec<usize> = Vec::new();
    let mut count = 0usize;
    for rec in records {
        let rec = rec?;
        if count == 0 {
            gaps = vec![0; rec.len()];
        } else if rec.len() != gaps.len() {
            return Err(SeqMorphError::LengthMismatch {
                found: rec.len(),
                expected: gaps.len(),
                id: rec.id,
            });
        }
        for (col, c) in rec.sequence.chars().enumerate() {
            if gap_chars.contains(c) {
                gaps[col] += 1;
            }
        }
        count += 1;
    }
    Ok(gaps.into_iter().map(|g| g as f64 / count as f64).collect())
}

/// Drops every column whose gap proportion in `stats` is at least `threshold`. `stats` is a
/// separate pass over the same alignment (e.g. a buffer snapshot) and is consumed up front.
pub fn squeeze<I, S>(
    records: I,
    threshold: f64,
    stats: S,
) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
    S: IntoIterator<Item = Result<SeqRecord>>,
{
    let keep: Vec<bool> = gap_proportion(stats, "-")?
        .into_iter()
        .map(|p| p < threshold)
        .collect();
    debug!(
        "Squeeze keeps {} of {} columns",
        keep.iter().filter(|k| **k).count(),
        keep.len()
    );
    Ok(records.map(move |rec| {
        let rec = rec?;
        if rec.len() != keep.len() {
            return Err(SeqMorphError::LengthMismatch {
                found: rec.len(),
                expected: keep.len(),
                id: rec.id,
            });
        }
        Ok(rec.select_columns(&keep))
    }))
}
