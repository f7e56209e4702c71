// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Chains transforms into one lazy record stream. Most steps just wrap the stream they are given;
// the few that need more than a single pass (tail, squeeze, sort) say so through `Requires`, and
// the driver puts a record buffer or an index in front of them. Every stage counts what goes in
// and what comes out, and the counts are logged once the run is over.

#[cfg(test)]
mod tests;

use std::cell::Cell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use bitflags::bitflags;
use log::info;

use crate::config::SeqMorphConfig;
use crate::errors::{Result, SeqMorphError};
use crate::seq::alphabet::Alphabet;
use crate::seq::fasta::write_fasta_records;
use crate::seq::file::{open_records, RecordStream, SeqFileFormat, STDIN_PATH};
use crate::seq::index::{FastaIndex, MemoryIndex, RecordLookup};
use crate::seq::record::SeqRecord;
use crate::transform::buffer::{with_record_buffer, DEFAULT_BUFFER_SIZE};
use crate::transform::cleanup::{dashes_cleanup, lower_sequences, ungap_sequences, upper_sequences};
use crate::transform::cut::{
    cut_sequences, isolate_region, multi_cut_sequences, reverse_complement_sequences,
    reverse_sequences, CutSlice,
};
use crate::transform::dedup::{deduplicate_sequences, deduplicate_taxa};
use crate::transform::filter::{
    exclude_from_ids, include_from_ids, max_length_discard, min_length_discard,
    min_ungap_length_discard, name_exclude, name_include, prune_empty, read_id_list, seq_exclude,
    seq_include,
};
use crate::transform::rename::{
    first_name_capture, name_append_suffix, name_insert_prefix, name_replace, strip_range,
};
use crate::transform::sort::{sort_length, sort_name, SortDirection};
use crate::transform::squeeze::squeeze;
use crate::transform::transcribe::{transcribe, Transcription};
use crate::transform::translate::{translate, Translation};
use crate::transform::window::{head, tail};
use crate::transform::GAP_CHARS;

bitflags! {
    /// What a step needs besides its input stream.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Requires: u8 {
        /// A re-iterable copy of its input.
        const BUFFER       = 0b001;
        /// The number of input records, known up front.
        const RECORD_COUNT = 0b010;
        /// Random access to its input by id.
        const INDEX        = 0b100;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    DashesCleanup,
    UpperCase,
    LowerCase,
    Ungap,
    IsolateRegion { start: usize, end: usize },
    Cut(CutSlice),
    MultiCut(Vec<CutSlice>),
    Reverse,
    ReverseComplement,
    NameSuffix(String),
    NamePrefix(String),
    NameReplace { search: String, replace: String },
    FirstNameCapture,
    StripRange,
    NameInclude(String),
    NameExclude(String),
    SeqInclude(String),
    SeqExclude(String),
    IncludeFromIds(PathBuf),
    ExcludeFromIds(PathBuf),
    MaxLength(usize),
    MinLength(usize),
    MinUngapLength(usize),
    PruneEmpty,
    Transcribe(Transcription),
    Translate(Translation),
    DeduplicateSequences { report: Option<PathBuf> },
    DeduplicateTaxa,
    Head(usize),
    Tail(usize),
    Squeeze(f64),
    SortLength(SortDirection),
    SortName(SortDirection),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::DashesCleanup => "dashes-cleanup",
            Step::UpperCase => "upper",
            Step::LowerCase => "lower",
            Step::Ungap => "ungap",
            Step::IsolateRegion { .. } => "isolate-region",
            Step::Cut(_) => "cut",
            Step::MultiCut(_) => "multi-cut",
            Step::Reverse => "reverse",
            Step::ReverseComplement => "reverse-complement",
            Step::NameSuffix(_) => "name-suffix",
            Step::NamePrefix(_) => "name-prefix",
            Step::NameReplace { .. } => "name-replace",
            Step::FirstNameCapture => "first-name",
            Step::StripRange => "strip-range",
            Step::NameInclude(_) => "include",
            Step::NameExclude(_) => "exclude",
            Step::SeqInclude(_) => "pattern-include",
            Step::SeqExclude(_) => "pattern-exclude",
            Step::IncludeFromIds(_) => "include-from-file",
            Step::ExcludeFromIds(_) => "exclude-from-file",
            Step::MaxLength(_) => "max-length",
            Step::MinLength(_) => "min-length",
            Step::MinUngapLength(_) => "min-ungapped-length",
            Step::PruneEmpty => "prune-empty",
            Step::Transcribe(_) => "transcribe",
            Step::Translate(_) => "translate",
            Step::DeduplicateSequences { .. } => "deduplicate-sequences",
            Step::DeduplicateTaxa => "deduplicate-taxa",
            Step::Head(_) => "head",
            Step::Tail(_) => "tail",
            Step::Squeeze(_) => "squeeze",
            Step::SortLength(_) => "sort-length",
            Step::SortName(_) => "sort-name",
        }
    }

    pub fn requires(&self) -> Requires {
        match self {
            Step::Tail(_) => Requires::BUFFER | Requires::RECORD_COUNT,
            Step::Squeeze(_) => Requires::BUFFER,
            Step::SortLength(_) | Step::SortName(_) => Requires::INDEX,
            _ => Requires::empty(),
        }
    }
}

/// Where the records come from. Sorting wants to read its input twice, which only files allow;
/// anything else gets buffered first.
#[derive(Clone, Debug)]
pub enum Source {
    File {
        path: String,
        format: SeqFileFormat,
        alphabet: Option<Alphabet>,
    },
    Records(Vec<SeqRecord>),
}

impl Source {
    pub fn open(&self) -> Result<RecordStream<'_>> {
        match self {
            Source::File {
                path,
                format,
                alphabet,
            } => open_records(path, *format, *alphabet),
            Source::Records(records) => {
                Ok(Box::new(records.iter().cloned().map(Ok::<_, SeqMorphError>)))
            }
        }
    }

    fn rereadable(&self) -> bool {
        !matches!(self, Source::File { path, .. } if path == STDIN_PATH)
    }

    fn index(&self) -> Result<Box<dyn RecordLookup>> {
        match self {
            Source::File {
                path,
                format: SeqFileFormat::FastA,
                alphabet,
            } => Ok(Box::new(FastaIndex::build(path, *alphabet)?)),
            _ => Ok(Box::new(MemoryIndex::from_records(self.open()?)?)),
        }
    }
}

/// Record counts of one stage, taken at its input and output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageReport {
    pub name: &'static str,
    pub consumed: usize,
    pub emitted: usize,
}

impl StageReport {
    pub fn dropped(&self) -> usize {
        self.consumed.saturating_sub(self.emitted)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub written: usize,
    pub stages: Vec<StageReport>,
}

struct Stage {
    name: &'static str,
    consumed: Rc<Cell<usize>>,
    emitted: Rc<Cell<usize>>,
}

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

fn tap<'a>(stream: RecordStream<'a>, count: Rc<Cell<usize>>) -> RecordStream<'a> {
    Box::new(stream.inspect(move |rec| {
        if rec.is_ok() {
            count.set(count.get() + 1);
        }
    }))
}

/// Final consumer of a pipeline's output; returns how many records it took.
pub type Sink<'s> = dyn for<'r> FnMut(RecordStream<'r>) -> Result<usize> + 's;

pub struct Pipeline {
    steps: Vec<Step>,
    buffer_size: usize,
    gap_chars: String,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Pipeline {
        Pipeline {
            steps,
            buffer_size: DEFAULT_BUFFER_SIZE,
            gap_chars: String::from(GAP_CHARS),
        }
    }

    pub fn with_config(mut self, config: &SeqMorphConfig) -> Pipeline {
        self.buffer_size = config.buffer_size;
        self.gap_chars = config.gap_chars.clone();
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Pipeline {
        self.buffer_size = buffer_size;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Runs the pipeline and writes the result as FastA.
    pub fn run<W: Write>(&self, source: &Source, out: &mut W) -> Result<PipelineReport> {
        self.run_with(source, &mut |records| write_fasta_records(&mut *out, records))
    }

    /// Runs the pipeline and collects the result.
    pub fn collect(&self, source: &Source) -> Result<Vec<SeqRecord>> {
        let mut result = Vec::new();
        self.run_with(source, &mut |records| {
            for rec in records {
                result.push(rec?);
            }
            Ok(result.len())
        })?;
        Ok(result)
    }

    /// Runs the pipeline, handing the final stream to `sink`, which returns how many records it
    /// consumed.
    pub fn run_with(&self, source: &Source, sink: &mut Sink<'_>) -> Result<PipelineReport> {
        let mut stages = Vec::new();
        let outcome = source
            .open()
            .and_then(|input| self.drive(source, input, &self.steps, true, &mut stages, sink));
        let reports: Vec<StageReport> = stages
            .iter()
            .map(|s| StageReport {
                name: s.name,
                consumed: s.consumed.get(),
                emitted: s.emitted.get(),
            })
            .collect();
        for r in &reports {
            info!(
                "stage {}: consumed {}, emitted {}, dropped {}",
                r.name,
                r.consumed,
                r.emitted,
                r.dropped()
            );
        }
        let written = outcome?;
        info!("Wrote {} records", written);
        Ok(PipelineReport {
            written,
            stages: reports,
        })
    }

    // Wraps stateless steps around `stream` until one needs more; then sets up its buffer or
    // index and recurses on the remaining steps, so that whatever the step borrows lives for the
    // rest of the run.
    fn drive<'a>(
        &self,
        source: &Source,
        stream: RecordStream<'a>,
        steps: &[Step],
        at_source: bool,
        stages: &mut Vec<Stage>,
        sink: &mut Sink<'_>,
    ) -> Result<usize> {
        let mut stream = stream;
        for (i, step) in steps.iter().enumerate() {
            let rest = &steps[i + 1..];
            let requires = step.requires();
            if requires.is_empty() {
                stream = self.stage(step, stream, stages, |s| self.apply(step, s))?;
                continue;
            }
            if requires.contains(Requires::INDEX) && at_source && i == 0 && source.rereadable() {
                let mut index = source.index()?;
                let sorted = self.stage(step, stream, stages, |scan| {
                    self.sort(step, scan, index.as_mut())
                })?;
                return self.drive(source, sorted, rest, false, stages, sink);
            }
            let (consumed, emitted) = (counter(), counter());
            stages.push(Stage {
                name: step.name(),
                consumed: consumed.clone(),
                emitted: emitted.clone(),
            });
            return with_record_buffer(stream, self.buffer_size, |buffer| {
                consumed.set(buffer.len());
                match step {
                    Step::Tail(n) => {
                        let out = Box::new(tail(buffer.snapshot()?, *n, buffer.len()));
                        self.drive(source, tap(out, emitted), rest, false, stages, sink)
                    }
                    Step::Squeeze(threshold) => {
                        let out = Box::new(squeeze(buffer.snapshot()?, *threshold, buffer.snapshot()?)?);
                        self.drive(source, tap(out, emitted), rest, false, stages, sink)
                    }
                    _ => {
                        let mut index = buffer.index()?;
                        let out = self.sort(step, Box::new(buffer.snapshot()?), &mut index)?;
                        self.drive(source, tap(out, emitted), rest, false, stages, sink)
                    }
                }
            });
        }
        sink(stream)
    }

    fn stage<'a, F>(
        &self,
        step: &Step,
        stream: RecordStream<'a>,
        stages: &mut Vec<Stage>,
        build: F,
    ) -> Result<RecordStream<'a>>
    where
        F: FnOnce(RecordStream<'a>) -> Result<RecordStream<'a>>,
    {
        let (consumed, emitted) = (counter(), counter());
        stages.push(Stage {
            name: step.name(),
            consumed: consumed.clone(),
            emitted: emitted.clone(),
        });
        let out = build(tap(stream, consumed))?;
        Ok(tap(out, emitted))
    }

    fn sort<'a>(
        &self,
        step: &Step,
        scan: RecordStream<'_>,
        index: &'a mut dyn RecordLookup,
    ) -> Result<RecordStream<'a>> {
        match step {
            Step::SortLength(direction) => Ok(Box::new(sort_length(scan, index, *direction)?)),
            Step::SortName(direction) => Ok(Box::new(sort_name(scan, index, *direction)?)),
            _ => unreachable!("{} is not a sort", step.name()),
        }
    }

    fn apply<'a>(&self, step: &Step, s: RecordStream<'a>) -> Result<RecordStream<'a>> {
        let gaps = self.gap_chars.as_str();
        let out: RecordStream<'a> = match step {
            Step::DashesCleanup => Box::new(dashes_cleanup(s)),
            Step::UpperCase => Box::new(upper_sequences(s)),
            Step::LowerCase => Box::new(lower_sequences(s)),
            Step::Ungap => Box::new(ungap_sequences(s, gaps)),
            Step::IsolateRegion { start, end } => Box::new(isolate_region(s, *start, *end)?),
            Step::Cut(slice) => Box::new(cut_sequences(s, *slice)),
            Step::MultiCut(slices) => Box::new(multi_cut_sequences(s, slices.clone())?),
            Step::Reverse => Box::new(reverse_sequences(s)),
            Step::ReverseComplement => Box::new(reverse_complement_sequences(s)),
            Step::NameSuffix(suffix) => Box::new(name_append_suffix(s, suffix)),
            Step::NamePrefix(prefix) => Box::new(name_insert_prefix(s, prefix)),
            Step::NameReplace { search, replace } => Box::new(name_replace(s, search, replace)?),
            Step::FirstNameCapture => Box::new(first_name_capture(s)),
            Step::StripRange => Box::new(strip_range(s)),
            Step::NameInclude(pattern) => Box::new(name_include(s, pattern)?),
            Step::NameExclude(pattern) => Box::new(name_exclude(s, pattern)?),
            Step::SeqInclude(pattern) => Box::new(seq_include(s, pattern)?),
            Step::SeqExclude(pattern) => Box::new(seq_exclude(s, pattern)?),
            Step::IncludeFromIds(path) => Box::new(include_from_ids(s, read_id_list(path)?)),
            Step::ExcludeFromIds(path) => Box::new(exclude_from_ids(s, read_id_list(path)?)),
            Step::MaxLength(n) => Box::new(max_length_discard(s, *n)),
            Step::MinLength(n) => Box::new(min_length_discard(s, *n)),
            Step::MinUngapLength(n) => Box::new(min_ungap_length_discard(s, *n, gaps)),
            Step::PruneEmpty => Box::new(prune_empty(s, gaps)),
            Step::Transcribe(mode) => Box::new(transcribe(s, *mode)),
            Step::Translate(mode) => Box::new(translate(s, *mode)),
            Step::DeduplicateSequences { report: None } => Box::new(deduplicate_sequences(s)),
            Step::DeduplicateSequences { report: Some(path) } => {
                let report = BufWriter::new(File::create(path)?);
                Box::new(deduplicate_sequences(s).with_report(report))
            }
            Step::DeduplicateTaxa => Box::new(deduplicate_taxa(s)),
            Step::Head(n) => Box::new(head(s, *n)),
            Step::Tail(_) | Step::Squeeze(_) | Step::SortLength(_) | Step::SortName(_) => {
                unreachable!("{} is not a single-pass step", step.name())
            }
        };
        Ok(out)
    }
}
