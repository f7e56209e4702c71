// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Positional edits: region isolation, cutting, reversal.

use std::ops::Range;
use std::str::FromStr;

use crate::errors::{Result, SeqMorphError};
use crate::seq::alphabet::complement_fn;
use crate::seq::record::SeqRecord;
use crate::transform::{map_records, GAP_CHAR};

/// A slice of a sequence, 0-based and half-open. Missing bounds mean "from the start" / "to the
/// end". The text form (`FromStr`) is 1-based and inclusive: `5:10`, `:10`, `5:`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CutSlice {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl CutSlice {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Result<CutSlice> {
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                return Err(SeqMorphError::InvalidRange { start, end });
            }
        }
        Ok(CutSlice { start, end })
    }

    /// The concrete range for a sequence of length `len`.
    pub fn range(&self, len: usize) -> Range<usize> {
        self.start.unwrap_or(0)..self.end.unwrap_or(len)
    }
}

impl FromStr for CutSlice {
    type Err = SeqMorphError;

    fn from_str(s: &str) -> Result<CutSlice> {
        let bad = || SeqMorphError::Format(format!("Bad slice '{}' (expected start:end)", s));
        let (start, end) = s.split_once(':').ok_or_else(bad)?;
        let start = match start.trim() {
            "" => None,
            txt => match txt.parse::<usize>() {
                Ok(n) if n > 0 => Some(n - 1),
                _ => return Err(bad()),
            },
        };
        let end = match end.trim() {
            "" => None,
            txt => Some(txt.parse::<usize>().map_err(|_| bad())?),
        };
        CutSlice::new(start, end)
    }
}

/// Parses a comma-separated list of slices, e.g. `1:10,20:30`.
pub fn parse_slices(s: &str) -> Result<Vec<CutSlice>> {
    s.split(',').map(CutSlice::from_str).collect()
}

/// Replaces everything outside `[start, end)` with gaps. The sequence keeps its length.
pub fn isolate_region<I>(
    records: I,
    start: usize,
    end: usize,
) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    if end <= start {
        return Err(SeqMorphError::InvalidRange { start, end });
    }
    Ok(map_records(records, move |rec| {
        let len = rec.len();
        let (start, end) = (start.min(len), end.min(len));
        let mut isolated = String::with_capacity(len);
        isolated.extend(std::iter::repeat(GAP_CHAR).take(start));
        isolated.push_str(&String::from_utf8_lossy(&rec.sequence.as_bytes()[start..end]));
        isolated.extend(std::iter::repeat(GAP_CHAR).take(len - end));
        let mut rec = rec;
        rec.sequence = isolated;
        Ok(rec)
    }))
}

pub fn cut_sequences<I>(records: I, slice: CutSlice) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    map_records(records, move |rec| Ok(rec.slice(slice.range(rec.len()))))
}

/// Cuts several slices and concatenates them in order. Letter annotations are cut with each
/// slice and joined the same way, so they stay aligned.
pub fn multi_cut_sequences<I>(
    records: I,
    slices: Vec<CutSlice>,
) -> Result<impl Iterator<Item = Result<SeqRecord>>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    if slices.is_empty() {
        return Err(SeqMorphError::Format(String::from("At least one slice is required")));
    }
    Ok(map_records(records, move |rec| {
        let len = rec.len();
        let mut pieces = slices.iter().map(|s| rec.slice(s.range(len)));
        let first = pieces.next().unwrap_or_else(|| rec.slice(0..0));
        Ok(pieces.fold(first, |acc, piece| acc.concat(&piece)))
    }))
}

pub fn reverse_sequences<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    map_records(records, |rec| Ok(rec.reversed_with(|c| c)))
}

pub fn reverse_complement_sequences<I>(records: I) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    map_records(records, |rec| match complement_fn(rec.alphabet, &rec.sequence) {
        Some(complement) => Ok(rec.reversed_with(complement)),
        None => Err(SeqMorphError::AlphabetMismatch {
            id: rec.id,
            operation: "reverse-complement",
            alphabet: rec.alphabet,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::alphabet::Alphabet;
    use crate::seq::record::{Annotation, LetterAnnotation};
    use crate::transform::test_utils::*;

    fn with_quality(id: &str, seq: &str) -> SeqRecord {
        let mut rec = SeqRecord::new(id, format!("{} desc", id), seq);
        let scores = (0..seq.len() as u32).collect();
        rec.letter_annotations
            .insert(String::from("quality"), LetterAnnotation::Scores(scores));
        rec
    }

    #[test]
    fn test_isolate_region() {
        let out = seqs(isolate_region(stream(&[("a", "ABCDEFGHIJ")]), 2, 5).unwrap());
        assert_eq!(out, vec!["--CDE-----"]);
        assert_eq!(out[0].len(), 10);
    }

    #[test]
    fn test_isolate_region_clamps_to_length() {
        let out = seqs(isolate_region(stream(&[("a", "ABCD")]), 2, 50).unwrap());
        assert_eq!(out, vec!["--CD"]);
    }

    #[test]
    fn test_isolate_region_invalid_range() {
        let res = isolate_region(stream(&[("a", "ABCD")]), 5, 5);
        assert!(matches!(res, Err(SeqMorphError::InvalidRange { start: 5, end: 5 })));
    }

    #[test]
    fn test_parse_slice() {
        assert_eq!(
            "5:10".parse::<CutSlice>().unwrap(),
            CutSlice { start: Some(4), end: Some(10) }
        );
        assert_eq!(":3".parse::<CutSlice>().unwrap(), CutSlice { start: None, end: Some(3) });
        assert_eq!("2:".parse::<CutSlice>().unwrap(), CutSlice { start: Some(1), end: None });
        assert!("0:3".parse::<CutSlice>().is_err());
        assert!("3".parse::<CutSlice>().is_err());
        assert!(matches!(
            "10:5".parse::<CutSlice>(),
            Err(SeqMorphError::InvalidRange { start: 9, end: 5 })
        ));
    }

    #[test]
    fn test_parse_slices() {
        let slices = parse_slices("1:2,5:").unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[1].range(8), 4..8);
    }

    #[test]
    fn test_cut_keeps_annotations() {
        let input = vec![Ok(with_quality("a", "ACGTACGT"))];
        let slice = CutSlice::new(Some(2), Some(5)).unwrap();
        let rec = cut_sequences(input.into_iter(), slice).next().unwrap().unwrap();
        assert_eq!(rec.sequence, "GTA");
        assert_eq!(rec.letter_annotations["quality"], LetterAnnotation::Scores(vec![2, 3, 4]));
    }

    #[test]
    fn test_multi_cut_concatenates_in_slice_order() {
        let input = vec![Ok(with_quality("a", "ACGTACGT"))];
        let slices = vec![
            CutSlice::new(Some(6), None).unwrap(),
            CutSlice::new(None, Some(2)).unwrap(),
        ];
        let rec = multi_cut_sequences(input.into_iter(), slices)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(rec.sequence, "GTAC");
        assert_eq!(
            rec.letter_annotations["quality"],
            LetterAnnotation::Scores(vec![6, 7, 0, 1])
        );
        assert_eq!(rec.id, "a");
        assert_eq!(rec.description, "a desc");
    }

    #[test]
    fn test_multi_cut_needs_a_slice() {
        assert!(multi_cut_sequences(stream(&[("a", "AC")]), vec![]).is_err());
    }

    #[test]
    fn test_reverse_twice_restores_record() {
        let mut rec = with_quality("a", "ACGTTT");
        rec.annotations
            .insert(String::from("source"), Annotation::Text(String::from("x")));
        let input = vec![Ok(rec.clone())];
        let back = reverse_sequences(reverse_sequences(input.into_iter()))
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_reverse_complement() {
        let input = vec![Ok(with_quality("a", "AACGn-"))];
        let rec = reverse_complement_sequences(input.into_iter())
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(rec.sequence, "-nCGTT");
        assert_eq!(
            rec.letter_annotations["quality"],
            LetterAnnotation::Scores(vec![5, 4, 3, 2, 1, 0])
        );
    }

    #[test]
    fn test_reverse_complement_rna() {
        let input = vec![Ok(SeqRecord::new("r", "r", "AUGC"))];
        let out = seqs(reverse_complement_sequences(input.into_iter()));
        assert_eq!(out, vec!["GCAU"]);
    }

    #[test]
    fn test_reverse_complement_protein_fails() {
        let input = vec![Ok(SeqRecord::new("p", "p", "MKV").with_alphabet(Alphabet::Protein))];
        let res = reverse_complement_sequences(input.into_iter()).next().unwrap();
        assert!(matches!(res, Err(SeqMorphError::AlphabetMismatch { .. })));
    }

    #[test]
    fn test_reverse_complement_ambiguity_codes() {
        let out = seqs(reverse_complement_sequences(stream(&[("d", "ACGTRYKMSWACGT")])));
        assert_eq!(out, vec!["ACGTWSKMRYACGT"]);
    }
}
