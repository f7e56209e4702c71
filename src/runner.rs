// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::{
    fmt,
    fs::File,
    io::{stdout, BufWriter},
    path::PathBuf,
};

use clap::{Parser, ValueEnum};
use log::{info, warn};

use crate::config::{find_config, SeqMorphConfig};
use crate::errors::{Result, SeqMorphError};
use crate::pipeline::{Pipeline, Source, Step};
use crate::seq::alphabet::Alphabet;
use crate::seq::file::SeqFileFormat;
use crate::transform::cut::{parse_slices, CutSlice};
use crate::transform::sort::SortDirection;
use crate::transform::transcribe::Transcription;
use crate::transform::translate::Translation;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None) ]
struct Cli {
    /// Input sequence file ("-" for standard input)
    input: String,

    /// Output FastA file (default: standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input file format
    #[arg(short, long = "format",
        help = "Sequence file format [fasta|stockholm] (or just f|s); default: from extension",
        hide_possible_values = true,
    )]
    format: Option<SeqFileFormat>,

    /// Alphabet of the input records (default: guessed per record)
    #[arg(short, long)]
    alphabet: Option<Alphabet>,

    /// In-memory buffer size [bytes] before spilling to disk
    #[arg(long = "buffer-size")]
    buffer_size: Option<usize>,

    /// Sort records first
    #[arg(long)]
    sort: Option<SortOrder>,

    /// Change '?' and '~' to '-'
    #[arg(long = "dash-gap")]
    dash_gap: bool,

    /// Upper-case all sequences
    #[arg(long, conflicts_with = "lower")]
    upper: bool,

    /// Lower-case all sequences
    #[arg(long)]
    lower: bool,

    /// Remove gaps
    #[arg(long)]
    ungap: bool,

    /// Replace everything outside START:END (1-based, inclusive) with gaps
    #[arg(long = "isolate-region", value_name = "START:END")]
    isolate_region: Option<String>,

    /// Keep only the given slices, e.g. 1:10,20:30 (1-based, inclusive)
    #[arg(long, value_name = "SLICES")]
    cut: Option<String>,

    /// Reverse the order of sites
    #[arg(long, conflicts_with = "reverse_complement")]
    reverse: bool,

    /// Reverse-complement nucleotide sequences
    #[arg(long = "reverse-complement")]
    reverse_complement: bool,

    /// Append a suffix to every id
    #[arg(long = "name-suffix")]
    name_suffix: Option<String>,

    /// Insert a prefix before every id
    #[arg(long = "name-prefix")]
    name_prefix: Option<String>,

    /// Regex substitution on ids and descriptions (case-insensitive)
    #[arg(long = "pattern-replace", num_args = 2, value_names = ["SEARCH", "REPLACE"])]
    pattern_replace: Option<Vec<String>>,

    /// Keep only the first word of the header
    #[arg(long = "first-name")]
    first_name: bool,

    /// Strip trailing /START-STOP ranges from ids
    #[arg(long = "strip-range")]
    strip_range: bool,

    /// Keep records whose id matches the regex (case-insensitive)
    #[arg(long = "include")]
    name_include: Option<String>,

    /// Drop records whose id matches the regex (case-insensitive)
    #[arg(long = "exclude")]
    name_exclude: Option<String>,

    /// Keep records whose sequence matches the regex (case-insensitive)
    #[arg(long = "pattern-include")]
    seq_include: Option<String>,

    /// Drop records whose sequence matches the regex (case-insensitive)
    #[arg(long = "pattern-exclude")]
    seq_exclude: Option<String>,

    /// Keep only the records whose id is listed in this file (one per line)
    #[arg(long = "include-from-file")]
    include_from_file: Option<PathBuf>,

    /// Drop the records whose id is listed in this file (one per line)
    #[arg(long = "exclude-from-file")]
    exclude_from_file: Option<PathBuf>,

    /// Drop sequences longer than this
    #[arg(long = "max-length")]
    max_length: Option<usize>,

    /// Drop sequences shorter than this
    #[arg(long = "min-length")]
    min_length: Option<usize>,

    /// Drop sequences with fewer non-gap symbols than this
    #[arg(long = "min-ungapped-length")]
    min_ungapped_length: Option<usize>,

    /// Drop sequences made only of gaps
    #[arg(long = "prune-empty")]
    prune_empty: bool,

    /// Keep only the first N records
    #[arg(long, conflicts_with = "tail")]
    head: Option<usize>,

    /// Keep only the last N records
    #[arg(long)]
    tail: Option<usize>,

    /// Remove columns that are gaps in every record
    #[arg(long)]
    squeeze: bool,

    /// Remove columns whose gap proportion is at least this (implies --squeeze)
    #[arg(long = "squeeze-threshold", value_name = "PROP")]
    squeeze_threshold: Option<f64>,

    /// Drop records whose sequence was already seen
    #[arg(long = "deduplicate-sequences")]
    deduplicate_sequences: bool,

    /// Write groups of identical sequences to this file (implies --deduplicate-sequences)
    #[arg(long = "deduplicated-sequences-file")]
    deduplicated_sequences_file: Option<PathBuf>,

    /// Drop records whose taxon (integer before the first '|', else the id) was already seen
    #[arg(long = "deduplicate-taxa")]
    deduplicate_taxa: bool,

    /// Transcribe (dna2rna) or back-transcribe (rna2dna)
    #[arg(long)]
    transcribe: Option<Transcription>,

    /// Translate to protein [dna2protein|dna2proteinstop|rna2protein|rna2proteinstop]
    #[arg(long)]
    translate: Option<Translation>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SortOrder {
    #[clap(name = "length-asc")]
    LengthAsc,
    #[clap(name = "length-desc")]
    LengthDesc,
    #[clap(name = "name-asc")]
    NameAsc,
    #[clap(name = "name-desc")]
    NameDesc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::LengthAsc => "length-asc",
            SortOrder::LengthDesc => "length-desc",
            SortOrder::NameAsc => "name-asc",
            SortOrder::NameDesc => "name-desc",
        };
        write!(f, "{}", s)
    }
}

impl SortOrder {
    fn step(self) -> Step {
        match self {
            SortOrder::LengthAsc => Step::SortLength(SortDirection::Ascending),
            SortOrder::LengthDesc => Step::SortLength(SortDirection::Descending),
            SortOrder::NameAsc => Step::SortName(SortDirection::Ascending),
            SortOrder::NameDesc => Step::SortName(SortDirection::Descending),
        }
    }
}

fn isolate_step(text: &str) -> Result<Step> {
    match text.parse::<CutSlice>()? {
        CutSlice {
            start: Some(start),
            end: Some(end),
        } => Ok(Step::IsolateRegion { start, end }),
        _ => Err(SeqMorphError::Format(format!(
            "Region '{}' needs both a start and an end",
            text
        ))),
    }
}

impl Cli {
    // Steps always run in this order, whatever the order of the flags.
    fn steps(&self) -> Result<Vec<Step>> {
        let mut steps = Vec::new();
        if let Some(order) = self.sort {
            steps.push(order.step());
        }

        if self.dash_gap {
            steps.push(Step::DashesCleanup);
        }
        if self.upper {
            steps.push(Step::UpperCase);
        }
        if self.lower {
            steps.push(Step::LowerCase);
        }

        if let Some(region) = &self.isolate_region {
            steps.push(isolate_step(region)?);
        }
        if let Some(text) = &self.cut {
            let mut slices = parse_slices(text)?;
            if slices.len() == 1 {
                steps.push(Step::Cut(slices.remove(0)));
            } else {
                steps.push(Step::MultiCut(slices));
            }
        }
        if self.reverse {
            steps.push(Step::Reverse);
        }
        if self.reverse_complement {
            steps.push(Step::ReverseComplement);
        }
        if self.ungap {
            steps.push(Step::Ungap);
        }

        if let Some(suffix) = &self.name_suffix {
            steps.push(Step::NameSuffix(suffix.clone()));
        }
        if let Some(prefix) = &self.name_prefix {
            steps.push(Step::NamePrefix(prefix.clone()));
        }
        if let Some([search, replace]) = self.pattern_replace.as_deref() {
            steps.push(Step::NameReplace {
                search: search.clone(),
                replace: replace.clone(),
            });
        }
        if self.first_name {
            steps.push(Step::FirstNameCapture);
        }
        if self.strip_range {
            steps.push(Step::StripRange);
        }

        if let Some(pattern) = &self.name_include {
            steps.push(Step::NameInclude(pattern.clone()));
        }
        if let Some(pattern) = &self.name_exclude {
            steps.push(Step::NameExclude(pattern.clone()));
        }
        if let Some(pattern) = &self.seq_include {
            steps.push(Step::SeqInclude(pattern.clone()));
        }
        if let Some(pattern) = &self.seq_exclude {
            steps.push(Step::SeqExclude(pattern.clone()));
        }
        if let Some(path) = &self.include_from_file {
            steps.push(Step::IncludeFromIds(path.clone()));
        }
        if let Some(path) = &self.exclude_from_file {
            steps.push(Step::ExcludeFromIds(path.clone()));
        }
        if let Some(n) = self.max_length {
            steps.push(Step::MaxLength(n));
        }
        if let Some(n) = self.min_length {
            steps.push(Step::MinLength(n));
        }
        if let Some(n) = self.min_ungapped_length {
            steps.push(Step::MinUngapLength(n));
        }
        if self.prune_empty {
            steps.push(Step::PruneEmpty);
        }

        if let Some(n) = self.head {
            steps.push(Step::Head(n));
        }
        if let Some(n) = self.tail {
            steps.push(Step::Tail(n));
        }

        if let Some(threshold) = self.squeeze_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(SeqMorphError::Format(format!(
                    "Squeeze threshold {} is not a proportion",
                    threshold
                )));
            }
            steps.push(Step::Squeeze(threshold));
        } else if self.squeeze {
            steps.push(Step::Squeeze(1.0));
        }

        if self.deduplicate_sequences || self.deduplicated_sequences_file.is_some() {
            steps.push(Step::DeduplicateSequences {
                report: self.deduplicated_sequences_file.clone(),
            });
        }
        if self.deduplicate_taxa {
            steps.push(Step::DeduplicateTaxa);
        }

        if let Some(mode) = self.transcribe {
            steps.push(Step::Transcribe(mode));
        }
        if let Some(mode) = self.translate {
            steps.push(Step::Translate(mode));
        }
        Ok(steps)
    }
}

fn load_config() -> SeqMorphConfig {
    match find_config() {
        Some(path) => match SeqMorphConfig::from_file(&path) {
            Ok(config) => {
                info!("Read config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                SeqMorphConfig::default()
            }
        },
        None => SeqMorphConfig::default(),
    }
}

pub fn run() -> Result<()> {
    env_logger::init();
    info!("Starting log");

    let cli = Cli::parse();

    let mut config = load_config();
    if let Some(size) = cli.buffer_size {
        config.buffer_size = size;
    }
    if cli.alphabet.is_some() {
        config.alphabet = cli.alphabet;
    }

    let pipeline = Pipeline::new(cli.steps()?).with_config(&config);
    let source = Source::File {
        format: cli.format.unwrap_or_else(|| SeqFileFormat::from_path(&cli.input)),
        path: cli.input,
        alphabet: config.alphabet,
    };

    let report = match &cli.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            pipeline.run(&source, &mut out)?
        }
        None => {
            let stdout = stdout();
            let mut out = BufWriter::new(stdout.lock());
            pipeline.run(&source, &mut out)?
        }
    };
    info!("{} records written", report.written);

    Ok(())
}
