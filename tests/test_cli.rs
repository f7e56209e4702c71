// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

mod common;

use std::io::Write;
use std::process::{Command, Stdio};

use crate::common::utils;

// Runs the binary in an empty directory (so no config file is picked up), feeding `input` on stdin.
fn run_cli(args: &[&str], input: &str) -> String {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_seqmorph"))
        .args(args)
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn stockholm_from_stdin() {
    let alignment = std::fs::read_to_string(utils::data_path("small.sto")).unwrap();
    let out = run_cli(&["-", "--format", "stockholm", "--squeeze"], &alignment);
    insta::assert_snapshot!(out, @r"
    >seqA first sequence
    ACGT.A
    >seqB
    ACGTTA
    >seqC
    A-GT-A
    ");
}

#[test]
fn fasta_from_stdin() {
    let out = run_cli(&["-", "--upper", "--sort", "name-desc"], ">a\nacg\n>b\nTT\n");
    assert_eq!(out, ">b\nTT\n>a\nACG\n");
}
