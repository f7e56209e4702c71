use super::{Pipeline, Requires, Source, Step};
use crate::{
    config::SeqMorphConfig,
    errors::SeqMorphError,
    seq::{file::SeqFileFormat, record::SeqRecord},
    transform::sort::SortDirection,
};
use serde_json::json;
use std::io::Write;

fn source(pairs: &[(&str, &str)]) -> Source {
    Source::Records(
        pairs
            .iter()
            .map(|(id, seq)| SeqRecord::new(*id, *id, *seq))
            .collect(),
    )
}

fn ids(records: Vec<SeqRecord>) -> Vec<String> {
    records.into_iter().map(|r| r.id).collect()
}

fn sort_input() -> Source {
    source(&[("c", "ACG"), ("a", "A"), ("d", "ACGT"), ("b", "TTT")])
}

#[test]
fn test_requires() {
    assert!(Step::UpperCase.requires().is_empty());
    assert_eq!(Step::Squeeze(0.5).requires(), Requires::BUFFER);
    assert!(Step::Tail(2).requires().contains(Requires::BUFFER | Requires::RECORD_COUNT));
    assert_eq!(Step::SortName(SortDirection::Ascending).requires(), Requires::INDEX);
}

#[test]
fn test_stateless_chain_and_stage_counts() {
    let pipeline = Pipeline::new(vec![Step::UpperCase, Step::MinLength(3)]);
    let mut out = Vec::new();
    let report = pipeline
        .run(&source(&[("a", "acgt"), ("b", "ac"), ("c", "ggggg")]), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), ">a\nACGT\n>c\nGGGGG\n");
    assert_eq!(report.written, 2);
    assert_eq!(report.stages.len(), 2);
    assert_eq!(report.stages[0].name, "upper");
    assert_eq!(report.stages[0].consumed, 3);
    assert_eq!(report.stages[1].emitted, 2);
    assert_eq!(report.stages[1].dropped(), 1);
}

#[test]
fn test_head_stops_pulling_upstream() {
    let pipeline = Pipeline::new(vec![Step::UpperCase, Step::Head(2)]);
    let input = source(&[("a", "A"), ("b", "C"), ("c", "G"), ("d", "T"), ("e", "A")]);
    let report = pipeline.run(&input, &mut Vec::new()).unwrap();
    assert_eq!(report.written, 2);
    assert_eq!(report.stages[0].consumed, 2);
}

#[test]
fn test_tail_through_spilled_buffer() {
    let pipeline = Pipeline::new(vec![Step::Tail(2)]).with_buffer_size(0);
    let input = source(&[("a", "A"), ("b", "C"), ("c", "G"), ("d", "T")]);
    assert_eq!(ids(pipeline.collect(&input).unwrap()), vec!["c", "d"]);
    let report = pipeline.run(&input, &mut Vec::new()).unwrap();
    assert_eq!(report.stages[0].consumed, 4);
    assert_eq!(report.stages[0].emitted, 2);
}

#[test]
fn test_squeeze_after_other_steps() {
    let pipeline = Pipeline::new(vec![Step::UpperCase, Step::Squeeze(0.5)]);
    let input = source(&[
        ("s1", "-acg-t"),
        ("s2", "aacg-t"),
        ("s3", "-acg-t"),
        ("s4", "aac.-t"),
    ]);
    let seqs: Vec<_> = pipeline
        .collect(&input)
        .unwrap()
        .into_iter()
        .map(|r| r.sequence)
        .collect();
    assert_eq!(seqs, vec!["ACGT", "ACGT", "ACGT", "AC.T"]);
}

#[test]
fn test_sort_at_source() {
    let pipeline = Pipeline::new(vec![Step::SortLength(SortDirection::Ascending)]);
    assert_eq!(ids(pipeline.collect(&sort_input()).unwrap()), vec!["a", "c", "b", "d"]);
}

#[test]
fn test_sort_after_filter() {
    let pipeline = Pipeline::new(vec![
        Step::MinLength(2),
        Step::SortLength(SortDirection::Descending),
    ]);
    assert_eq!(ids(pipeline.collect(&sort_input()).unwrap()), vec!["d", "c", "b"]);
}

#[test]
fn test_sort_after_filter_from_spilled_buffer() {
    let pipeline = Pipeline::new(vec![
        Step::MinLength(2),
        Step::SortName(SortDirection::Ascending),
    ])
    .with_buffer_size(0);
    assert_eq!(ids(pipeline.collect(&sort_input()).unwrap()), vec!["b", "c", "d"]);
}

#[test]
fn test_sort_fasta_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, ">b x\nAC\n>c\nA\n>a y\nACGT\n").unwrap();
    file.flush().unwrap();
    let input = Source::File {
        path: file.path().to_string_lossy().into_owned(),
        format: SeqFileFormat::FastA,
        alphabet: None,
    };
    let pipeline = Pipeline::new(vec![Step::SortName(SortDirection::Descending)]);
    let mut out = Vec::new();
    pipeline.run(&input, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), ">c\nA\n>b x\nAC\n>a y\nACGT\n");
}

#[test]
fn test_bad_pattern_fails_run() {
    let pipeline = Pipeline::new(vec![Step::NameInclude(String::from("("))]);
    let res = pipeline.run(&sort_input(), &mut Vec::new());
    assert!(matches!(res, Err(SeqMorphError::Regex(_))));
}

#[test]
fn test_records_before_failure_stay_written() {
    let pipeline = Pipeline::new(vec![Step::ReverseComplement]);
    let input = source(&[("a", "AACG"), ("p", "MKVLLW"), ("c", "CC")]);
    let mut out = Vec::new();
    let res = pipeline.run(&input, &mut out);
    assert!(matches!(res, Err(SeqMorphError::AlphabetMismatch { .. })));
    assert_eq!(String::from_utf8(out).unwrap(), ">a\nCGTT\n");
}

#[test]
fn test_dedup_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("dups.txt");
    let pipeline = Pipeline::new(vec![Step::DeduplicateSequences {
        report: Some(report.clone()),
    }]);
    let input = source(&[("A", "ACGT"), ("B", "ACGT"), ("C", "TTTT")]);
    assert_eq!(ids(pipeline.collect(&input).unwrap()), vec!["A", "C"]);
    assert_eq!(std::fs::read_to_string(report).unwrap(), "A B\nC\n");
}

#[test]
fn test_config_gap_chars() {
    let config = SeqMorphConfig::from_value(&json!({"gap_chars": "~"})).unwrap();
    let pipeline = Pipeline::new(vec![Step::Ungap, Step::MinUngapLength(4)]).with_config(&config);
    let out = pipeline
        .collect(&source(&[("a", "AC~-GT"), ("b", "A~~C")]))
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].sequence, "AC-GT");
}
