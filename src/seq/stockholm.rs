// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{Result, SeqMorphError};
use crate::seq::record::{LetterAnnotation, SeqRecord};

/// Reads a (possibly interleaved) Stockholm alignment. `#=GS <name> DE <text>` lines become the
/// description and `#=GR <name> <tag> <values>` lines become letter annotations keyed by tag;
/// other markup is ignored.
pub fn read_stockholm<R: BufRead>(reader: R) -> Result<Vec<SeqRecord>> {
    let mut order: Vec<String> = Vec::new();
    let mut sequences: HashMap<String, String> = HashMap::new();
    let mut descriptions: HashMap<String, String> = HashMap::new();
    let mut per_residue: HashMap<String, Vec<(String, String)>> = HashMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let l = line?;
        let trimmed = l.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("//") {
            break;
        }
        if let Some(markup) = trimmed.strip_prefix("#=GS ") {
            let mut fields = markup.splitn(3, char::is_whitespace);
            if let (Some(name), Some("DE"), Some(text)) = (fields.next(), fields.next(), fields.next()) {
                descriptions.insert(name.to_string(), text.trim().to_string());
            }
            continue;
        }
        if let Some(markup) = trimmed.strip_prefix("#=GR ") {
            let fields: Vec<&str> = markup.split_whitespace().collect();
            match fields.as_slice() {
                [name, tag, values] => {
                    let entries = per_residue.entry(name.to_string()).or_default();
                    match entries.iter_mut().find(|(t, _)| t.as_str() == *tag) {
                        Some((_, acc)) => acc.push_str(values),
                        None => entries.push((tag.to_string(), values.to_string())),
                    }
                }
                _ => {
                    return Err(SeqMorphError::Format(format!(
                        "line {}: malformed #=GR line",
                        idx + 1
                    )))
                }
            }
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(name), Some(fragment), None) => {
                if !fragment.is_ascii() {
                    return Err(SeqMorphError::Format(format!(
                        "line {}: non-ASCII sequence data",
                        idx + 1
                    )));
                }
                let entry = sequences.entry(name.to_string()).or_insert_with(|| {
                    order.push(name.to_string());
                    String::new()
                });
                entry.push_str(fragment);
            }
            _ => {
                return Err(SeqMorphError::Format(format!(
                    "line {}: expected exactly two fields",
                    idx + 1
                )))
            }
        }
    }

    let mut result = Vec::with_capacity(order.len());
    for name in order {
        let sequence = sequences.remove(&name).unwrap_or_default();
        let description = match descriptions.remove(&name) {
            Some(text) => format!("{} {}", name, text),
            None => name.clone(),
        };
        let mut record = SeqRecord::new(name.as_str(), description, sequence);
        for (tag, values) in per_residue.remove(&name).unwrap_or_default() {
            if values.len() != record.len() {
                return Err(SeqMorphError::Format(format!(
                    "#=GR {} {} has {} values for {} residues",
                    name,
                    tag,
                    values.len(),
                    record.len()
                )));
            }
            record
                .letter_annotations
                .insert(tag, LetterAnnotation::Symbols(values));
        }
        result.push(record);
    }

    Ok(result)
}

pub fn read_stockholm_file<P: AsRef<Path>>(path: P) -> Result<Vec<SeqRecord>> {
    let file = File::open(path)?;
    read_stockholm(BufReader::new(file))
}
