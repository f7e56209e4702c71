// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

use std::fmt;

use clap::ValueEnum;

use crate::errors::{Result, SeqMorphError};
use crate::seq::alphabet::Alphabet;
use crate::seq::record::SeqRecord;
use crate::transform::map_records;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Transcription {
    #[clap(name = "dna2rna")]
    DnaToRna,
    #[clap(name = "rna2dna")]
    RnaToDna,
}

impl fmt::Display for Transcription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Transcription::DnaToRna => "dna2rna",
            Transcription::RnaToDna => "rna2dna",
        };
        write!(f, "{}", s)
    }
}

/// Transcribes (T -> U) or back-transcribes (U -> T), preserving case. Records must carry the
/// source alphabet, or an unknown one.
pub fn transcribe<I>(records: I, mode: Transcription) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    let (source, target, from, to) = match mode {
        Transcription::DnaToRna => (Alphabet::Dna, Alphabet::Rna, 'T', 'U'),
        Transcription::RnaToDna => (Alphabet::Rna, Alphabet::Dna, 'U', 'T'),
    };
    map_records(records, move |rec| {
        if rec.alphabet != source && rec.alphabet != Alphabet::Unknown {
            return Err(SeqMorphError::AlphabetMismatch {
                id: rec.id,
                operation: if mode == Transcription::DnaToRna {
                    "transcribe"
                } else {
                    "back-transcribe"
                },
                alphabet: rec.alphabet,
            });
        }
        let lower_from = from.to_ascii_lowercase();
        let lower_to = to.to_ascii_lowercase();
        let mut rec = rec.map_symbols(|c| {
            if c == from {
                to
            } else if c == lower_from {
                lower_to
            } else {
                c
            }
        });
        rec.alphabet = target;
        Ok(rec)
    })
}
