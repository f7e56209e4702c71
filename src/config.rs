// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Peter Carlton

// Optional JSON config file, `.seqmorphconfig`, looked up in $HOME and then in the current
// directory. Unknown keys are ignored; command-line flags take precedence over everything here.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::{Result, SeqMorphError};
use crate::seq::alphabet::Alphabet;
use crate::transform::buffer::DEFAULT_BUFFER_SIZE;
use crate::transform::GAP_CHARS;

pub const CONFIG_FILE_NAME: &str = ".seqmorphconfig";

#[derive(Clone, Debug, PartialEq)]
pub struct SeqMorphConfig {
    /// Bytes of records held in memory before a buffer spills to disk.
    pub buffer_size: usize,
    /// Characters removed by ungapping and ignored by ungapped-length filters.
    pub gap_chars: String,
    /// Alphabet forced on input records; guessed per record when absent.
    pub alphabet: Option<Alphabet>,
}

impl Default for SeqMorphConfig {
    fn default() -> Self {
        SeqMorphConfig {
            buffer_size: DEFAULT_BUFFER_SIZE,
            gap_chars: String::from(GAP_CHARS),
            alphabet: None,
        }
    }
}

impl SeqMorphConfig {
    pub fn from_file(path: &Path) -> Result<SeqMorphConfig> {
        let text = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| SeqMorphError::Config(format!("{}: {}", path.display(), e)))?;
        SeqMorphConfig::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<SeqMorphConfig> {
        let mut config = SeqMorphConfig::default();
        if !value.is_object() {
            return Err(SeqMorphError::Config(String::from("expected a JSON object")));
        }
        if let Some(v) = value.get("buffer_size") {
            config.buffer_size = v
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| bad_value("buffer_size", v))?;
        }
        if let Some(v) = value.get("gap_chars") {
            config.gap_chars = v
                .as_str()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| bad_value("gap_chars", v))?
                .to_string();
        }
        if let Some(v) = value.get("alphabet") {
            config.alphabet = Some(
                serde_json::from_value(v.clone()).map_err(|_| bad_value("alphabet", v))?,
            );
        }
        Ok(config)
    }
}

fn bad_value(key: &str, value: &Value) -> SeqMorphError {
    SeqMorphError::Config(format!("bad value for '{}': {}", key, value))
}

pub fn find_config() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let path = PathBuf::from(home).join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }
    None
}
