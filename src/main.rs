// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier
// Modifications (c) 2026 Peter Carlton

use seqmorph::errors::SeqMorphError;

fn main() -> Result<(), SeqMorphError> {
    seqmorph::run()
}
