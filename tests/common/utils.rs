// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::cell::Cell;

use seqmorph::{
    errors::Result,
    pipeline::{Pipeline, Source},
    seq::{file::SeqFileFormat, record::SeqRecord},
};

#[allow(dead_code)]
pub fn data_path(name: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[allow(dead_code)]
pub fn data_source(name: &str, format: SeqFileFormat) -> Source {
    Source::File {
        path: data_path(name),
        format,
        alphabet: None,
    }
}

/// Runs the pipeline and returns its FastA output.
#[allow(dead_code)]
pub fn run_to_string(pipeline: &Pipeline, source: &Source) -> String {
    let mut out = Vec::new();
    pipeline.run(source, &mut out).expect("pipeline run");
    String::from_utf8(out).expect("utf-8 output")
}

/// `n` records r0, r1, ...; `pulled` counts how many were taken.
#[allow(dead_code)]
pub fn counting_source(n: usize, pulled: &Cell<usize>) -> impl Iterator<Item = Result<SeqRecord>> + '_ {
    (0..n).map(move |i| {
        pulled.set(pulled.get() + 1);
        Ok(SeqRecord::new(format!("r{}", i), format!("r{} test", i), "acgt"))
    })
}
