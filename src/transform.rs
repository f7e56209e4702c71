// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Record transforms. Every transform takes a record stream and returns a lazy record stream; errors
// coming from upstream are passed along untouched, so the consumer sees them where they happened.

pub mod buffer;
pub mod cleanup;
pub mod cut;
pub mod dedup;
pub mod filter;
pub mod rename;
pub mod sort;
pub mod squeeze;
pub mod transcribe;
pub mod translate;
pub mod window;

use crate::errors::Result;
use crate::seq::record::SeqRecord;

/// Characters treated as gaps when ungapping.
pub const GAP_CHARS: &str = "-.";

/// The canonical gap character (alignment columns, region isolation).
pub const GAP_CHAR: char = '-';

/// Applies `f` to every record.
pub fn map_records<I, F>(records: I, mut f: F) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
    F: FnMut(SeqRecord) -> Result<SeqRecord>,
{
    records.map(move |rec| rec.and_then(&mut f))
}

/// Keeps the records for which `keep` holds.
pub fn filter_records<I, P>(records: I, mut keep: P) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
    P: FnMut(&SeqRecord) -> bool,
{
    records.filter(move |rec| match rec {
        Ok(rec) => keep(rec),
        Err(_) => true,
    })
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::errors::Result;
    use crate::seq::record::SeqRecord;

    /// Builds an Ok stream from (id, sequence) pairs; descriptions equal ids.
    pub fn stream(pairs: &[(&str, &str)]) -> std::vec::IntoIter<Result<SeqRecord>> {
        pairs
            .iter()
            .map(|(id, seq)| Ok(SeqRecord::new(*id, *id, *seq)))
            .collect::<Vec<_>>()
            .into_iter()
    }

    pub fn ids<I: Iterator<Item = Result<SeqRecord>>>(records: I) -> Vec<String> {
        records.map(|r| r.unwrap().id).collect()
    }

    pub fn seqs<I: Iterator<Item = Result<SeqRecord>>>(records: I) -> Vec<String> {
        records.map(|r| r.unwrap().sequence).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;
    use crate::errors::SeqMorphError;

    #[test]
    fn test_errors_pass_through_filter() {
        let input = vec![
            Ok(SeqRecord::new("a", "a", "AC")),
            Err(SeqMorphError::Format(String::from("boom"))),
        ];
        let out: Vec<_> = filter_records(input.into_iter(), |_| false).collect();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_err());
    }

    #[test]
    fn test_map_records() {
        let out = seqs(map_records(stream(&[("a", "AC")]), |mut r| {
            r.sequence.push('G');
            Ok(r)
        }));
        assert_eq!(out, vec!["ACG"]);
    }
}
