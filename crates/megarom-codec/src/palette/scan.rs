//! Palette discovery
//!
//! Fixed candidate offsets are probed first, then (optionally) every 32-byte
//! aligned window of the image. A window qualifies when enough of its words
//! are well-formed color words.

use super::{COLORS_PER_PALETTE, PALETTE_SIZE, Palette, is_well_formed};
use crate::error::{RomResult, ValidationError};
use crate::rom::RomImage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::trace;

/// Palette scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteScanConfig {
    /// Offsets probed before the stride scan
    pub candidate_offsets: Vec<usize>,
    /// Also probe every 32-byte aligned window
    pub stride_scan: bool,
    /// Well-formed words (out of 16) needed to accept a window
    pub min_valid_colors: usize,
    /// Stop after this many palettes
    pub max_palettes: usize,
}

impl Default for PaletteScanConfig {
    fn default() -> Self {
        Self {
            candidate_offsets: (0x20000..=0x70000).step_by(0x10000).collect(),
            stride_scan: true,
            min_valid_colors: 12,
            max_palettes: 256,
        }
    }
}

impl PaletteScanConfig {
    /// Replace the fixed candidate offsets
    pub fn with_candidates(mut self, offsets: Vec<usize>) -> Self {
        self.candidate_offsets = offsets;
        self
    }

    /// Enable or disable the stride scan
    pub fn with_stride_scan(mut self, enable: bool) -> Self {
        self.stride_scan = enable;
        self
    }

    /// Set the acceptance threshold
    pub fn with_min_valid_colors(mut self, count: usize) -> Self {
        self.min_valid_colors = count;
        self
    }

    /// Set the result limit
    pub fn with_max_palettes(mut self, max: usize) -> Self {
        self.max_palettes = max;
        self
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=COLORS_PER_PALETTE).contains(&self.min_valid_colors) {
            return Err(ValidationError::InvalidConfig(format!(
                "min_valid_colors must be 1-16, got {}",
                self.min_valid_colors
            )));
        }
        if self.max_palettes == 0 {
            return Err(ValidationError::InvalidConfig(
                "max_palettes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A palette found by [`scan_palettes`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteCandidate {
    /// Offset of the 32 encoded bytes
    pub offset: usize,
    /// Decoded colors (stray bits dropped)
    pub palette: Palette,
    /// How many of the 16 words were well formed
    pub valid_colors: usize,
}

/// Find plausible palettes in `rom`
///
/// Candidate offsets come first in the order given, then stride hits in
/// ascending order. Palettes that decode identically to an earlier hit are
/// skipped.
pub fn scan_palettes(rom: &RomImage, config: &PaletteScanConfig) -> RomResult<Vec<PaletteCandidate>> {
    config.validate()?;

    let data = rom.as_bytes();
    let last_start = data.len().checked_sub(PALETTE_SIZE);
    let stride = config
        .stride_scan
        .then(|| last_start.map(|last| (0..=last).step_by(PALETTE_SIZE)))
        .flatten()
        .into_iter()
        .flatten();

    let offsets = config
        .candidate_offsets
        .iter()
        .copied()
        .filter(|&offset| last_start.is_some_and(|last| offset <= last))
        .chain(stride);

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for offset in offsets {
        if found.len() >= config.max_palettes {
            break;
        }

        let window = rom.slice(offset, PALETTE_SIZE)?;
        let valid_colors = window
            .chunks_exact(2)
            .filter(|pair| is_well_formed(u16::from_be_bytes([pair[0], pair[1]])))
            .count();
        if valid_colors < config.min_valid_colors {
            continue;
        }

        let palette = Palette::decode_masked(window)?;
        if seen.insert(palette) {
            found.push(PaletteCandidate {
                offset,
                palette,
                valid_colors,
            });
        }
    }

    trace!(found = found.len(), len = data.len(), "palette scan complete");
    Ok(found)
}
