// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Random access to records by id, for the transforms that need to emit records in an order other
// than the file's.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::errors::{Result, SeqMorphError};
use crate::seq::alphabet::Alphabet;
use crate::seq::fasta::FastaReader;
use crate::seq::record::SeqRecord;

pub trait RecordLookup {
    fn fetch(&mut self, id: &str) -> Result<SeqRecord>;
}

pub(crate) fn missing_id(id: &str) -> SeqMorphError {
    SeqMorphError::Format(format!("No record with id '{}' in index", id))
}

pub(crate) fn duplicate_id(id: &str) -> SeqMorphError {
    SeqMorphError::Format(format!("Duplicate id '{}' cannot be indexed", id))
}

/// Byte offsets of every header in a FastA file. Only the offsets are held in memory; records are
/// re-read from disk on each fetch.
pub struct FastaIndex {
    reader: BufReader<File>,
    offsets: HashMap<String, u64>,
    alphabet: Option<Alphabet>,
}

impl FastaIndex {
    pub fn build<P: AsRef<Path>>(path: P, alphabet: Option<Alphabet>) -> Result<FastaIndex> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut offsets = HashMap::new();
        let mut offset: u64 = 0;
        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 {
                break;
            }
            if let Some(header) = line.strip_prefix(b">") {
                let header = String::from_utf8_lossy(header);
                let id = header.split_whitespace().next().unwrap_or("").to_string();
                if offsets.insert(id.clone(), offset).is_some() {
                    return Err(duplicate_id(&id));
                }
            }
            offset += n as u64;
        }
        Ok(FastaIndex {
            reader,
            offsets,
            alphabet,
        })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.offsets.contains_key(id)
    }
}

impl RecordLookup for FastaIndex {
    fn fetch(&mut self, id: &str) -> Result<SeqRecord> {
        let offset = *self.offsets.get(id).ok_or_else(|| missing_id(id))?;
        self.reader.seek(SeekFrom::Start(offset))?;
        FastaReader::new(&mut self.reader)
            .with_alphabet(self.alphabet)
            .next()
            .unwrap_or_else(|| Err(missing_id(id)))
    }
}

/// Index over records already in memory (e.g. a Stockholm alignment).
#[derive(Default)]
pub struct MemoryIndex {
    records: HashMap<String, SeqRecord>,
}

impl MemoryIndex {
    pub fn from_records<I>(records: I) -> Result<MemoryIndex>
    where
        I: IntoIterator<Item = Result<SeqRecord>>,
    {
        let mut index = MemoryIndex::default();
        for record in records {
            let record = record?;
            if index.records.contains_key(&record.id) {
                return Err(duplicate_id(&record.id));
            }
            index.records.insert(record.id.clone(), record);
        }
        Ok(index)
    }
}

impl RecordLookup for MemoryIndex {
    fn fetch(&mut self, id: &str) -> Result<SeqRecord> {
        self.records.get(id).cloned().ok_or_else(|| missing_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fasta_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_fasta_index_fetch_out_of_order() {
        let file = fasta_file(">a first\nAC\nGT\n>b\nGGG\n>c\nT\n");
        let mut index = FastaIndex::build(file.path(), None).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.fetch("c").unwrap().sequence, "T");
        let a = index.fetch("a").unwrap();
        assert_eq!(a.sequence, "ACGT");
        assert_eq!(a.description, "a first");
        assert_eq!(index.fetch("b").unwrap().sequence, "GGG");
    }

    #[test]
    fn test_fasta_index_missing_id() {
        let file = fasta_file(">a\nAC\n");
        let mut index = FastaIndex::build(file.path(), None).unwrap();
        assert!(index.fetch("zz").is_err());
    }

    #[test]
    fn test_fasta_index_duplicate_id() {
        let file = fasta_file(">a\nAC\n>a\nGG\n");
        assert!(FastaIndex::build(file.path(), None).is_err());
    }

    #[test]
    fn test_memory_index() {
        let recs = vec![Ok(SeqRecord::new("x", "x", "AC")), Ok(SeqRecord::new("y", "y", "G"))];
        let mut index = MemoryIndex::from_records(recs).unwrap();
        assert_eq!(index.fetch("y").unwrap().sequence, "G");
    }
}
