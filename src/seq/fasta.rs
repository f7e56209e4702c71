// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::errors::{Result, SeqMorphError};
use crate::seq::alphabet::Alphabet;
use crate::seq::record::SeqRecord;

pub const LINE_WIDTH: usize = 60;

/// Streaming FastA reader: yields one record at a time, never holding more than the current
/// record in memory.
pub struct FastaReader<R> {
    reader: R,
    buf: String,
    pending_header: Option<String>,
    alphabet: Option<Alphabet>,
    line_num: usize,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        FastaReader {
            reader,
            buf: String::new(),
            pending_header: None,
            alphabet: None,
            line_num: 0,
            done: false,
        }
    }

    /// Forces the alphabet of every record instead of guessing it.
    pub fn with_alphabet(mut self, alphabet: Option<Alphabet>) -> Self {
        self.alphabet = alphabet;
        self
    }

    fn read_line(&mut self) -> Result<Option<&str>> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_num += 1;
        Ok(Some(self.buf.trim_end_matches(&['\n', '\r'][..])))
    }

    fn next_header(&mut self) -> Result<Option<String>> {
        if let Some(hdr) = self.pending_header.take() {
            return Ok(Some(hdr));
        }
        loop {
            let line_num = self.line_num + 1;
            match self.read_line()? {
                None => return Ok(None),
                Some(l) if l.trim().is_empty() => continue,
                Some(l) => match l.strip_prefix('>') {
                    Some(hdr) => return Ok(Some(hdr.to_string())),
                    None => {
                        return Err(SeqMorphError::Format(format!(
                            "line {}: expected a '>' header",
                            line_num
                        )))
                    }
                },
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<SeqRecord>> {
        let Some(header) = self.next_header()? else {
            return Ok(None);
        };
        let mut sequence = String::new();
        loop {
            let line_num = self.line_num + 1;
            let Some(l) = self.read_line()? else {
                break;
            };
            if let Some(hdr) = l.strip_prefix('>') {
                self.pending_header = Some(hdr.to_string());
                break;
            }
            if !l.is_ascii() {
                return Err(SeqMorphError::Format(format!(
                    "line {}: non-ASCII sequence data",
                    line_num
                )));
            }
            sequence.extend(l.chars().filter(|c| !c.is_whitespace()));
        }
        let mut record = SeqRecord::from_header(&header, sequence);
        if let Some(alphabet) = self.alphabet {
            record.alphabet = alphabet;
        }
        Ok(Some(record))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

pub fn read_fasta_file<P: AsRef<Path>>(path: P) -> Result<FastaReader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(FastaReader::new(BufReader::new(file)))
}

pub fn write_fasta<W: Write>(writer: &mut W, record: &SeqRecord) -> Result<()> {
    writeln!(writer, ">{}", record.title())?;
    // Sequences are ASCII, so byte chunks are whole symbols.
    for chunk in record.sequence.as_bytes().chunks(LINE_WIDTH) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes every record, stopping at the first error (records already written stay written).
/// Returns the number of records written.
pub fn write_fasta_records<W, I>(writer: &mut W, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<SeqRecord>>,
{
    let mut count = 0;
    for record in records {
        write_fasta(writer, &record?)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}
