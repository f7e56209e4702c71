// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

pub mod config;
pub mod errors;
pub mod pipeline;
mod runner;
pub mod seq;
pub mod transform;

use crate::errors::SeqMorphError;

pub fn run() -> Result<(), SeqMorphError> {
    runner::run()
}
