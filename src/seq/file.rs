// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::fmt;
use std::io::{self, BufReader};
use std::path::Path;

use clap::ValueEnum;

use crate::errors::Result;
use crate::seq::alphabet::Alphabet;
use crate::seq::fasta::{read_fasta_file, FastaReader};
use crate::seq::record::SeqRecord;
use crate::seq::stockholm::{read_stockholm, read_stockholm_file};

// For our purposes, a sequence file is a lazy, forward-only stream of records. Errors travel
// inside the stream so that a consumer sees them exactly where they happened.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<SeqRecord>> + 'a>;

/// Path understood as standard input.
pub const STDIN_PATH: &str = "-";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SeqFileFormat {
    #[clap(name = "fasta")]
    #[clap(alias = "f")]
    FastA,
    #[clap(name = "stockholm")]
    #[clap(alias = "s")]
    Stockholm,
}

impl fmt::Display for SeqFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeqFileFormat::FastA => "fasta",
            SeqFileFormat::Stockholm => "stockholm",
        };
        write!(f, "{}", s)
    }
}

impl SeqFileFormat {
    /// Guesses the format from a file extension; anything unrecognised is FastA.
    pub fn from_path<P: AsRef<Path>>(path: P) -> SeqFileFormat {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("sto") | Some("stk") | Some("sth") => SeqFileFormat::Stockholm,
            _ => SeqFileFormat::FastA,
        }
    }
}

/// Opens `path` (or stdin, for "-") as a record stream. FastA is read lazily; Stockholm is
/// interleaved, so it has to be read whole first.
pub fn open_records(
    path: &str,
    format: SeqFileFormat,
    alphabet: Option<Alphabet>,
) -> Result<RecordStream<'static>> {
    match format {
        SeqFileFormat::FastA => {
            if path == STDIN_PATH {
                let reader = FastaReader::new(BufReader::new(io::stdin().lock()));
                Ok(Box::new(reader.with_alphabet(alphabet)))
            } else {
                Ok(Box::new(read_fasta_file(path)?.with_alphabet(alphabet)))
            }
        }
        SeqFileFormat::Stockholm => {
            let records = if path == STDIN_PATH {
                read_stockholm(io::stdin().lock())?
            } else {
                read_stockholm_file(path)?
            };
            Ok(Box::new(records.into_iter().map(move |rec| {
                Ok(match alphabet {
                    Some(a) => rec.with_alphabet(a),
                    None => rec,
                })
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SeqFileFormat::from_path("aln.sto"), SeqFileFormat::Stockholm);
        assert_eq!(SeqFileFormat::from_path("seqs.fasta"), SeqFileFormat::FastA);
        assert_eq!(SeqFileFormat::from_path("noext"), SeqFileFormat::FastA);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(open_records("/nonexistent/seqs.fa", SeqFileFormat::FastA, None).is_err());
    }
}
