// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

use crate::errors::Result;
use crate::seq::record::SeqRecord;

/// The first `n` records. Record `n + 1` is never pulled from upstream.
pub fn head<I>(records: I, n: usize) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    records.take(n)
}

/// The last `n` of `record_count` records. The count comes from a prior pass over the same input.
pub fn tail<I>(records: I, n: usize, record_count: usize) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    records.skip(record_count.saturating_sub(n))
}
