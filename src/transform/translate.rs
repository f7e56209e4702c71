// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Codon translation: a genetic-code table behind a trait, plus an adapter that decides what to
// do with codons the table does not know.

use std::collections::HashSet;
use std::fmt;

use clap::ValueEnum;
use log::{debug, warn};

use crate::errors::{Result, SeqMorphError};
use crate::seq::alphabet::Alphabet;
use crate::seq::record::SeqRecord;
use crate::transform::{map_records, GAP_CHAR};

/// Symbol emitted for codons that cannot be translated but contain a gap.
pub const MISSING_CHAR: char = 'X';

/// Symbol of stop codons.
pub const STOP_CHAR: char = '*';

/// A codon -> amino-acid table. Codons are upper case; stops map to `STOP_CHAR`.
pub trait GeneticCode {
    fn lookup(&self, codon: &str) -> Option<char>;
}

// Codon order: AAA, AAC, AAG, AAT, ACA, ... TTT (bases A=0, C=1, G=2, T/U=3).
const STANDARD_AA: &[u8; 64] = b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF";

/// NCBI table 1. The DNA flavour knows T, the RNA one U; neither knows ambiguity codes.
#[derive(Clone, Copy, Debug)]
pub struct StandardCode {
    fourth_base: u8,
}

impl StandardCode {
    pub fn dna() -> StandardCode {
        StandardCode { fourth_base: b'T' }
    }

    pub fn rna() -> StandardCode {
        StandardCode { fourth_base: b'U' }
    }

    fn base_index(&self, b: u8) -> Option<usize> {
        match b {
            b'A' => Some(0),
            b'C' => Some(1),
            b'G' => Some(2),
            _ if b == self.fourth_base => Some(3),
            _ => None,
        }
    }
}

impl GeneticCode for StandardCode {
    fn lookup(&self, codon: &str) -> Option<char> {
        let [b1, b2, b3] = <[u8; 3]>::try_from(codon.as_bytes()).ok()?;
        let idx = self.base_index(b1)? * 16 + self.base_index(b2)? * 4 + self.base_index(b3)?;
        Some(STANDARD_AA[idx] as char)
    }
}

/// Wraps a genetic code: known codons translate, unknown gapped codons become `MISSING_CHAR`
/// (with one warning per distinct codon), and anything else is an error.
pub struct CodonTranslator<G> {
    code: G,
    warned: HashSet<String>,
}

impl<G: GeneticCode> CodonTranslator<G> {
    pub fn new(code: G) -> Self {
        CodonTranslator {
            code,
            warned: HashSet::new(),
        }
    }

    pub fn translate_codon(&mut self, codon: &str) -> Result<char> {
        let codon = codon.to_ascii_uppercase();
        if let Some(aa) = self.code.lookup(&codon) {
            return Ok(aa);
        }
        if codon.contains(GAP_CHAR) {
            if !self.warned.contains(&codon) {
                warn!("Unknown Codon: {}", codon);
                self.warned.insert(codon);
            }
            return Ok(MISSING_CHAR);
        }
        Err(SeqMorphError::UnrecognizedCodon(codon))
    }

    /// Translates whole codons; a trailing partial codon is ignored. With `to_stop`, translation
    /// ends at the first stop codon, which is not emitted.
    pub fn translate_sequence(&mut self, sequence: &str, to_stop: bool) -> Result<String> {
        let bytes = sequence.as_bytes();
        let mut protein = String::with_capacity(bytes.len() / 3);
        for codon in bytes.chunks(3) {
            if codon.len() < 3 {
                debug!("Ignoring partial codon {:?}", String::from_utf8_lossy(codon));
                break;
            }
            let aa = self.translate_codon(&String::from_utf8_lossy(codon))?;
            if to_stop && aa == STOP_CHAR {
                break;
            }
            protein.push(aa);
        }
        Ok(protein)
    }

    /// Number of distinct unknown gapped codons seen so far.
    pub fn warned_codons(&self) -> usize {
        self.warned.len()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Translation {
    #[clap(name = "dna2protein")]
    DnaToProtein,
    #[clap(name = "dna2proteinstop")]
    DnaToProteinStop,
    #[clap(name = "rna2protein")]
    RnaToProtein,
    #[clap(name = "rna2proteinstop")]
    RnaToProteinStop,
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Translation::DnaToProtein => "dna2protein",
            Translation::DnaToProteinStop => "dna2proteinstop",
            Translation::RnaToProtein => "rna2protein",
            Translation::RnaToProteinStop => "rna2proteinstop",
        };
        write!(f, "{}", s)
    }
}

impl Translation {
    pub fn source(&self) -> Alphabet {
        match self {
            Translation::DnaToProtein | Translation::DnaToProteinStop => Alphabet::Dna,
            Translation::RnaToProtein | Translation::RnaToProteinStop => Alphabet::Rna,
        }
    }

    pub fn to_stop(&self) -> bool {
        matches!(self, Translation::DnaToProteinStop | Translation::RnaToProteinStop)
    }

    pub fn standard_code(&self) -> StandardCode {
        match self.source() {
            Alphabet::Rna => StandardCode::rna(),
            _ => StandardCode::dna(),
        }
    }
}

/// Translates with the standard genetic code matching `mode`.
pub fn translate<I>(records: I, mode: Translation) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
{
    translate_with(records, CodonTranslator::new(mode.standard_code()), mode)
}

pub fn translate_with<I, G>(
    records: I,
    mut translator: CodonTranslator<G>,
    mode: Translation,
) -> impl Iterator<Item = Result<SeqRecord>>
where
    I: Iterator<Item = Result<SeqRecord>>,
    G: GeneticCode,
{
    let source = mode.source();
    let to_stop = mode.to_stop();
    map_records(records, move |rec| {
        if rec.alphabet != source && rec.alphabet != Alphabet::Unknown {
            return Err(SeqMorphError::AlphabetMismatch {
                id: rec.id,
                operation: "translate",
                alphabet: rec.alphabet,
            });
        }
        let protein = translator.translate_sequence(&rec.sequence, to_stop)?;
        let mut rec = rec.replace_sequence(protein);
        rec.alphabet = Alphabet::Protein;
        Ok(rec)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::test_utils::*;

    #[test]
    fn test_standard_code() {
        let dna = StandardCode::dna();
        assert_eq!(dna.lookup("ATG"), Some('M'));
        assert_eq!(dna.lookup("TGG"), Some('W'));
        assert_eq!(dna.lookup("TAA"), Some('*'));
        assert_eq!(dna.lookup("GCU"), None);
        assert_eq!(dna.lookup("AT"), None);
        assert_eq!(StandardCode::rna().lookup("UUU"), Some('F'));
    }

    #[test]
    fn test_gapped_codon_is_missing_and_warned_once() {
        let mut tr = CodonTranslator::new(StandardCode::dna());
        assert_eq!(tr.translate_codon("A-G").unwrap(), 'X');
        assert_eq!(tr.translate_codon("a-g").unwrap(), 'X');
        assert_eq!(tr.warned_codons(), 1);
        assert_eq!(tr.translate_codon("---").unwrap(), 'X');
        assert_eq!(tr.warned_codons(), 2);
    }

    #[test]
    fn test_ungapped_unknown_codon_fails() {
        let mut tr = CodonTranslator::new(StandardCode::dna());
        assert!(matches!(
            tr.translate_codon("NNN"),
            Err(SeqMorphError::UnrecognizedCodon(c)) if c == "NNN"
        ));
    }

    #[test]
    fn test_translate_sequence() {
        let mut tr = CodonTranslator::new(StandardCode::dna());
        assert_eq!(tr.translate_sequence("ATGTAAGGGAA", false).unwrap(), "M*G");
        assert_eq!(tr.translate_sequence("ATGTAAGGGAA", true).unwrap(), "M");
        assert_eq!(tr.translate_sequence("atg---tgg", false).unwrap(), "MXW");
    }

    #[test]
    fn test_translate_records() {
        let input = stream(&[("a", "ATGGCCTGA"), ("b", "AUGUGA")]);
        let out: Vec<_> = translate(input, Translation::DnaToProteinStop).collect();
        let a = out[0].as_ref().unwrap();
        assert_eq!(a.sequence, "MA");
        assert_eq!(a.alphabet, Alphabet::Protein);
        assert!(matches!(out[1], Err(SeqMorphError::AlphabetMismatch { .. })));
    }

    #[test]
    fn test_translate_rna() {
        let out = seqs(translate(stream(&[("r", "AUGUGA")]), Translation::RnaToProtein));
        assert_eq!(out, vec!["M*"]);
    }

    #[test]
    fn test_translate_rna_without_u() {
        let out = seqs(translate(stream(&[("r", "AAAGGGCCC")]), Translation::RnaToProtein));
        assert_eq!(out, vec!["KGP"]);
    }
}
