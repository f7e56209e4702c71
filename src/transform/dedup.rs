// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

use std::collections::{HashMap, HashSet};
use std::io::Write;

use itertools::Itertools;
use log::warn;
use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::seq::record::SeqRecord;
use crate::transform::filter_records;

/// Grouping key for sequence content: hex SHA-256 of the upper-cased sequence.
pub fn checksum(sequence: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_ascii_uppercase().as_bytes());
    hex::encode(hasher.finalize())
}

/// Passes on the first record of each distinct sequence and remembers the ids of the rest.
/// Once upstream is exhausted, the groups (checksum, ids) are available in first-seen order, and
/// are written to the report, if any, one space-separated line per group.
pub struct DeduplicateSequences<'a, I> {
    records: I,
    positions: HashMap<String, usize>,
    groups: Vec<(String, Vec<String>)>,
    report: Option<Box<dyn Write + 'a>>,
}

impl<'a, I> DeduplicateSequences<'a, I>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    pub fn new(records: I) -> Self {
        DeduplicateSequences {
            records,
            positions: HashMap::new(),
            groups: Vec::new(),
            report: None,
        }
    }

    pub fn with_report<W: Write + 'a>(mut self, report: W) -> Self {
        self.report = Some(Box::new(report));
        self
    }

    pub fn groups(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }

    fn write_report(&mut self) -> Result<()> {
        if let Some(mut out) = self.report.take() {
            for (_, ids) in &self.groups {
                writeln!(out, "{}", ids.iter().join(" "))?;
            }
            out.flush()?;
        }
        Ok(())
    }
}

impl<I> Iterator for DeduplicateSequences<'_, I>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rec = match self.records.next() {
                Some(Ok(rec)) => rec,
                Some(Err(e)) => return Some(Err(e)),
                None => return self.write_report().err().map(Err),
            };
            let key = checksum(&rec.sequence);
            match self.positions.get(&key) {
                Some(&pos) => self.groups[pos].1.push(rec.id),
                None => {
                    self.positions.insert(key.clone(), self.groups.len());
                    self.groups.push((key, vec![rec.id.clone()]));
                    return Some(Ok(rec));
                }
            }
        }
    }
}

pub fn deduplicate_sequences<'a, I>(records: I) -> DeduplicateSequences<'a, I>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    DeduplicateSequences::new(records)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaxonKey {
    TaxId(i64),
    Id(String),
}

impl TaxonKey {
    /// The integer before the first '|' if there is one, else the whole id.
    pub fn of(id: &str) -> TaxonKey {
        match id.split_once('|') {
            Some((prefix, _)) => match prefix.parse::<i64>() {
                Ok(taxid) => TaxonKey::TaxId(taxid),
                Err(_) => {
                    warn!("Unable to parse integer taxid from {}", id);
                    TaxonKey::Id(id.to_string())
                }
            },
            None => TaxonKey::Id(id.to_string()),
        }
    }
}

/// Keeps the first record of each taxon.
pub fn deduplicate_taxa<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let mut seen = HashSet::new();
    filter_records(records, move |rec| seen.insert(TaxonKey::of(&rec.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_utils::*;

    #[test]
    fn test_checksum_ignores_case() {
        assert_eq!(checksum("acgt"), checksum("ACGT"));
        assert_ne!(checksum("ACGT"), checksum("ACGA"));
        assert_eq!(checksum("").len(), 64);
    }

    #[test]
    fn test_deduplicate_sequences() {
        let input = stream(&[("A", "ACGT"), ("B", "acgt"), ("C", "TTTT")]);
        let mut dedup = deduplicate_sequences(input);
        let kept: Vec<_> = dedup.by_ref().map(|r| r.unwrap().id).collect();
        assert_eq!(kept, vec!["A", "C"]);
        let groups: Vec<_> = dedup.groups().iter().map(|(_, ids)| ids.clone()).collect();
        assert_eq!(groups, vec![vec!["A", "B"], vec!["C"]]);
        assert_eq!(dedup.groups()[1].0, checksum("TTTT"));
    }

    #[test]
    fn test_deduplicate_report() {
        let mut report = Vec::new();
        {
            let input = stream(&[("A", "ACGT"), ("C", "TTTT"), ("B", "ACGT")]);
            let dedup = deduplicate_sequences(input).with_report(&mut report);
            assert_eq!(dedup.count(), 2);
        }
        assert_eq!(String::from_utf8(report).unwrap(), "A B\nC\n");
    }

    #[test]
    fn test_report_not_written_when_abandoned() {
        let mut report = Vec::new();
        {
            let input = stream(&[("A", "ACGT"), ("C", "TTTT")]);
            let mut dedup = deduplicate_sequences(input).with_report(&mut report);
            dedup.next();
        }
        assert!(report.is_empty());
    }

    #[test]
    fn test_taxon_key() {
        assert_eq!(TaxonKey::of("9|x"), TaxonKey::TaxId(9));
        assert_eq!(TaxonKey::of("abc|x"), TaxonKey::Id(String::from("abc|x")));
        assert_eq!(TaxonKey::of("9"), TaxonKey::Id(String::from("9")));
    }

    #[test]
    fn test_deduplicate_taxa() {
        let input = stream(&[("9|x", "A"), ("9|y", "C"), ("10|z", "G")]);
        assert_eq!(ids(deduplicate_taxa(input)), vec!["9|x", "10|z"]);
        let input = stream(&[("foo|x", "A"), ("foo|x", "C"), ("foo|y", "G")]);
        assert_eq!(ids(deduplicate_taxa(input)), vec!["foo|x", "foo|y"]);
    }
}
