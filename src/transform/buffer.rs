// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Re-iterable record buffer. Small inputs stay in memory; past a size threshold everything moves
// to a temporary file of length-prefixed (u32, little-endian) JSON records. The file is removed
// when the buffer is dropped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::errors::{Result, SeqMorphError};
use crate::seq::index::{duplicate_id, missing_id, RecordLookup};
use crate::seq::record::{Annotation, LetterAnnotation, SeqRecord};

/// In-memory budget, in (estimated) bytes, before spilling to disk.
pub const DEFAULT_BUFFER_SIZE: usize = 20 * (1 << 20);

pub struct RecordBuffer {
    threshold: usize,
    size: usize,
    count: usize,
    memory: Vec<SeqRecord>,
    spill: Option<NamedTempFile>,
}

// Rough footprint of a record; only used to decide when to spill.
fn estimated_size(rec: &SeqRecord) -> usize {
    let letters: usize = rec
        .letter_annotations
        .values()
        .map(|v| match v {
            LetterAnnotation::Scores(s) => s.len() * 4,
            LetterAnnotation::Symbols(s) => s.len(),
        })
        .sum();
    let globals: usize = rec
        .annotations
        .iter()
        .map(|(k, v)| {
            k.len()
                + match v {
                    Annotation::Text(t) => t.len(),
                    Annotation::List(items) => items.iter().map(|s| s.len()).sum(),
                    _ => 8,
                }
        })
        .sum();
    rec.id.len() + rec.description.len() + rec.sequence.len() + letters + globals
}

fn write_record<W: Write>(writer: &mut W, rec: &SeqRecord) -> Result<()> {
    let bytes = serde_json::to_vec(rec)?;
    let len = u32::try_from(bytes.len()).map_err(|_| {
        SeqMorphError::Serialization(format!("Record {} too large to buffer", rec.id))
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&bytes)?;
    Ok(())
}

impl RecordBuffer {
    /// Drains `records` into a new buffer. The first upstream error aborts buffering and is
    /// returned.
    pub fn new<I>(records: I, threshold: usize) -> Result<RecordBuffer>
    where
        I: IntoIterator<Item = Result<SeqRecord>>,
    {
        let mut buffer = RecordBuffer {
            threshold,
            size: 0,
            count: 0,
            memory: Vec::new(),
            spill: None,
        };
        let mut writer: Option<BufWriter<File>> = None;
        for rec in records {
            let rec = rec?;
            buffer.count += 1;
            if let Some(w) = writer.as_mut() {
                write_record(w, &rec)?;
                continue;
            }
            buffer.size += estimated_size(&rec);
            buffer.memory.push(rec);
            if buffer.size > buffer.threshold {
                writer = Some(buffer.promote()?);
            }
        }
        if let Some(mut w) = writer {
            w.flush()?;
        }
        Ok(buffer)
    }

    // Moves the in-memory records to a fresh spill file; returns a writer for the rest.
    fn promote(&mut self) -> Result<BufWriter<File>> {
        let file = NamedTempFile::new()?;
        debug!(
            "Record buffer over {} bytes, spilling to {}",
            self.threshold,
            file.path().display()
        );
        let mut writer = BufWriter::new(file.reopen()?);
        for rec in self.memory.drain(..) {
            write_record(&mut writer, &rec)?;
        }
        self.spill = Some(file);
        Ok(writer)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_spilled(&self) -> bool {
        self.spill.is_some()
    }

    pub fn spill_path(&self) -> Option<&Path> {
        self.spill.as_ref().map(|f| f.path())
    }

    /// Random access to the buffered records by id. A spilled buffer is indexed by offset into
    /// the spill file, so records stay on disk until fetched.
    pub fn index(&self) -> Result<BufferIndex<'_>> {
        match &self.spill {
            None => {
                let mut records = HashMap::with_capacity(self.memory.len());
                for rec in &self.memory {
                    if records.insert(rec.id.as_str(), rec).is_some() {
                        return Err(duplicate_id(&rec.id));
                    }
                }
                Ok(BufferIndex::Memory(records))
            }
            Some(file) => {
                let mut reader = BufReader::new(file.reopen()?);
                let mut offsets = HashMap::with_capacity(self.count);
                let mut offset: u64 = 0;
                for _ in 0..self.count {
                    let bytes = read_entry(&mut reader)?;
                    let IdOnly { id } = serde_json::from_slice(&bytes)?;
                    if offsets.insert(id.clone(), offset).is_some() {
                        return Err(duplicate_id(&id));
                    }
                    offset += 4 + bytes.len() as u64;
                }
                Ok(BufferIndex::Spilled { reader, offsets })
            }
        }
    }

    /// A fresh iterator over the buffered records, in their original order. Snapshots are
    /// independent of one another.
    pub fn snapshot(&self) -> Result<Snapshot<'_>> {
        match &self.spill {
            None => Ok(Snapshot::Memory(self.memory.iter())),
            Some(file) => Ok(Snapshot::Spilled {
                reader: BufReader::new(file.reopen()?),
                remaining: self.count,
            }),
        }
    }
}

pub enum Snapshot<'a> {
    Memory(std::slice::Iter<'a, SeqRecord>),
    Spilled {
        reader: BufReader<File>,
        remaining: usize,
    },
}

fn truncated(e: io::Error) -> SeqMorphError {
    match e.kind() {
        ErrorKind::UnexpectedEof => SeqMorphError::Serialization(String::from("Truncated spill file")),
        _ => SeqMorphError::Io(e),
    }
}

// One length-prefixed entry of the spill log, still serialized.
fn read_entry<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut len = [0u8; 4];
    reader.read_exact(&mut len).map_err(truncated)?;
    let mut bytes = vec![0u8; u32::from_le_bytes(len) as usize];
    reader.read_exact(&mut bytes).map_err(truncated)?;
    Ok(bytes)
}

fn read_record<R: Read>(reader: &mut R) -> Result<SeqRecord> {
    Ok(serde_json::from_slice(&read_entry(reader)?)?)
}

impl Iterator for Snapshot<'_> {
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Snapshot::Memory(iter) => iter.next().cloned().map(Ok),
            Snapshot::Spilled { reader, remaining } => {
                if *remaining == 0 {
                    return None;
                }
                let rec = read_record(reader);
                // A bad record poisons the rest of the log.
                *remaining = if rec.is_ok() { *remaining - 1 } else { 0 };
                Some(rec)
            }
        }
    }
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

pub enum BufferIndex<'a> {
    Memory(HashMap<&'a str, &'a SeqRecord>),
    Spilled {
        reader: BufReader<File>,
        offsets: HashMap<String, u64>,
    },
}

impl RecordLookup for BufferIndex<'_> {
    fn fetch(&mut self, id: &str) -> Result<SeqRecord> {
        match self {
            BufferIndex::Memory(records) => records
                .get(id)
                .map(|rec| (*rec).clone())
                .ok_or_else(|| missing_id(id)),
            BufferIndex::Spilled { reader, offsets } => {
                let offset = *offsets.get(id).ok_or_else(|| missing_id(id))?;
                reader.seek(SeekFrom::Start(offset))?;
                read_record(reader)
            }
        }
    }
}

/// Buffers `records`, hands the buffer to `f`, and drops it (and any spill file) afterwards.
pub fn with_record_buffer<I, F, T>(records: I, threshold: usize, f: F) -> Result<T>
where
    I: IntoIterator<Item = Result<SeqRecord>>,
    F: FnOnce(&RecordBuffer) -> Result<T>,
{
    let buffer = RecordBuffer::new(records, threshold)?;
    f(&buffer)
}
