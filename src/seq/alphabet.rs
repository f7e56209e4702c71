// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// Amino-acid codes that are not also IUPAC nucleotide codes.
const PROTEIN_ONLY: &str = "EFIJLOPQZ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    #[clap(name = "dna")]
    Dna,
    #[clap(name = "rna")]
    Rna,
    #[clap(name = "protein")]
    Protein,
    #[default]
    #[clap(name = "unknown")]
    Unknown,
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Alphabet::Dna => "dna",
            Alphabet::Rna => "rna",
            Alphabet::Protein => "protein",
            Alphabet::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl Alphabet {
    /// Guesses the alphabet of a raw sequence. Any protein-only letter makes it `Protein`;
    /// otherwise T without U is `Dna` and U without T is `Rna`. Everything else (no T nor U, both,
    /// empty or all-gap) is `Unknown`, which every transform accepts.
    pub fn guess(sequence: &str) -> Alphabet {
        let mut has_t = false;
        let mut has_u = false;
        for c in sequence.chars() {
            match c.to_ascii_uppercase() {
                c if PROTEIN_ONLY.contains(c) => return Alphabet::Protein,
                'T' => has_t = true,
                'U' => has_u = true,
                _ => {}
            }
        }
        match (has_t, has_u) {
            (true, false) => Alphabet::Dna,
            (false, true) => Alphabet::Rna,
            _ => Alphabet::Unknown,
        }
    }

    pub fn is_nucleotide(&self) -> bool {
        matches!(self, Alphabet::Dna | Alphabet::Rna)
    }
}

/// Complements a single DNA symbol (IUPAC codes included). Case is preserved; anything without a
/// complement (gaps, unknown symbols) is returned as is.
pub fn complement_dna(c: char) -> char {
    let comp = match c.to_ascii_uppercase() {
        'A' => 'T',
        'T' => 'A',
        'U' => 'A',
        'C' => 'G',
        'G' => 'C',
        'R' => 'Y',
        'Y' => 'R',
        'K' => 'M',
        'M' => 'K',
        'S' => 'S',
        'W' => 'W',
        'B' => 'V',
        'V' => 'B',
        'D' => 'H',
        'H' => 'D',
        'N' => 'N',
        _ => return c,
    };
    if c.is_ascii_lowercase() {
        comp.to_ascii_lowercase()
    } else {
        comp
    }
}

/// Like `complement_dna()`, but A pairs with U.
pub fn complement_rna(c: char) -> char {
    match c {
        'A' => 'U',
        'a' => 'u',
        other => complement_dna(other),
    }
}

/// Returns the complement mapping for an alphabet, or None if the alphabet has none (protein).
/// For an unknown alphabet the sequence itself decides: U without T means RNA.
pub fn complement_fn(alphabet: Alphabet, sequence: &str) -> Option<fn(char) -> char> {
    match alphabet {
        Alphabet::Dna => Some(complement_dna),
        Alphabet::Rna => Some(complement_rna),
        Alphabet::Protein => None,
        Alphabet::Unknown => {
            let has_u = sequence.contains(|c: char| c == 'U' || c == 'u');
            let has_t = sequence.contains(|c: char| c == 'T' || c == 't');
            if has_u && !has_t {
                Some(complement_rna)
            } else {
                Some(complement_dna)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_dna() {
        assert_eq!(Alphabet::guess("ACGT-ACGTN"), Alphabet::Dna);
    }

    #[test]
    fn test_guess_rna() {
        assert_eq!(Alphabet::guess("ACGU..ACGU"), Alphabet::Rna);
    }

    #[test]
    fn test_guess_protein() {
        assert_eq!(Alphabet::guess("MKVLAAGIVEHW"), Alphabet::Protein);
    }

    #[test]
    fn test_guess_without_t_or_u() {
        assert_eq!(Alphabet::guess("GGCAGA"), Alphabet::Unknown);
        assert_eq!(Alphabet::guess("ACGTU"), Alphabet::Unknown);
    }

    #[test]
    fn test_guess_iupac_rich_dna() {
        assert_eq!(Alphabet::guess("ACGTRYKMSWACGT"), Alphabet::Dna);
        assert_eq!(Alphabet::guess("nnnnbdhvt"), Alphabet::Dna);
    }

    #[test]
    fn test_guess_empty() {
        assert_eq!(Alphabet::guess("----"), Alphabet::Unknown);
        assert_eq!(Alphabet::guess(""), Alphabet::Unknown);
    }

    #[test]
    fn test_complement_preserves_case() {
        assert_eq!(complement_dna('a'), 't');
        assert_eq!(complement_dna('G'), 'C');
        assert_eq!(complement_dna('-'), '-');
        assert_eq!(complement_rna('A'), 'U');
        assert_eq!(complement_rna('u'), 'a');
    }

    #[test]
    fn test_no_protein_complement() {
        assert!(complement_fn(Alphabet::Protein, "MKV").is_none());
    }
}
