// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Sorts in two passes: a scan keeps only (key, id) per record, then records are re-fetched by id
// through an index. Sorting is stable, so ties come out in parse order whichever the direction.

use std::fmt;

use clap::ValueEnum;
use itertools::Itertools;
use log::info;

use crate::errors::Result;
use crate::seq::index::RecordLookup;
use crate::seq::record::SeqRecord;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortDirection {
    #[clap(name = "asc")]
    Ascending,
    #[clap(name = "desc")]
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

fn sorted_ids<I, K, F>(scan: I, direction: SortDirection, key: F) -> Result<Vec<String>>
where
    I: IntoIterator<Item = Result<SeqRecord>>,
    K: Ord,
    F: Fn(&SeqRecord) -> K,
{
    let keyed: Vec<(K, String)> = scan
        .into_iter()
        .map(|rec| rec.map(|rec| (key(&rec), rec.id)))
        .collect::<Result<_>>()?;
    let ids = match direction {
        SortDirection::Ascending => keyed
            .into_iter()
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, id)| id)
            .collect(),
        SortDirection::Descending => keyed
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0))
            .map(|(_, id)| id)
            .collect(),
    };
    Ok(ids)
}

fn fetch_all<'a, L: RecordLookup + ?Sized>(
    ids: Vec<String>,
    index: &'a mut L,
) -> impl Iterator<Item = Result<SeqRecord>> + 'a {
    ids.into_iter().map(move |id| index.fetch(&id))
}

/// Records by sequence length. `scan` is a full pass over the input; `index` serves the records
/// themselves.
pub fn sort_length<'a, I, L>(
    scan: I,
    index: &'a mut L,
    direction: SortDirection,
) -> Result<impl Iterator<Item = Result<SeqRecord>> + 'a>
where
    I: IntoIterator<Item = Result<SeqRecord>>,
    L: RecordLookup + ?Sized,
{
    info!("Indexing sequences by length: {}", direction);
    let ids = sorted_ids(scan, direction, |rec| rec.len())?;
    Ok(fetch_all(ids, index))
}

/// Records by id, in byte order.
pub fn sort_name<'a, I, L>(
    scan: I,
    index: &'a mut L,
    direction: SortDirection,
) -> Result<impl Iterator<Item = Result<SeqRecord>> + 'a>
where
    I: IntoIterator<Item = Result<SeqRecord>>,
    L: RecordLookup + ?Sized,
{
    info!("Indexing sequences by name: {}", direction);
    let ids = sorted_ids(scan, direction, |rec| rec.id.clone())?;
    Ok(fetch_all(ids, index))
}
