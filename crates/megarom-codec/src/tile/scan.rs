//! Tile discovery over 32-byte aligned windows

use super::{TILE_BYTES, Tile};
use crate::error::{RomResult, ValidationError};
use crate::rom::RomImage;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which windows count as tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileFilter {
    /// Every window
    All,
    /// Windows with at least one non-zero byte
    #[default]
    NonBlank,
    /// Windows with 8 to 28 non-zero bytes, typical of drawn graphics
    GraphicsLike,
}

impl TileFilter {
    const GRAPHICS_MIN_NONZERO: usize = 8;
    const GRAPHICS_MAX_NONZERO: usize = 28;

    /// Whether a 32-byte window passes the filter
    pub fn accepts(self, window: &[u8]) -> bool {
        let nonzero = window.iter().filter(|&&b| b != 0).count();
        match self {
            Self::All => true,
            Self::NonBlank => nonzero > 0,
            Self::GraphicsLike => {
                (Self::GRAPHICS_MIN_NONZERO..=Self::GRAPHICS_MAX_NONZERO).contains(&nonzero)
            }
        }
    }
}

/// Tile scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileScanConfig {
    /// First offset scanned
    pub start: usize,
    /// End of the scanned range (exclusive), or the whole image
    pub end: Option<usize>,
    /// Window filter
    pub filter: TileFilter,
    /// Stop after this many tiles
    pub max_tiles: usize,
}

impl Default for TileScanConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            filter: TileFilter::default(),
            max_tiles: 256,
        }
    }
}

impl TileScanConfig {
    /// Restrict the scan to `start..end`
    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.start = start;
        self.end = Some(end);
        self
    }

    /// Set the window filter
    pub fn with_filter(mut self, filter: TileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the result limit
    pub fn with_max_tiles(mut self, max: usize) -> Self {
        self.max_tiles = max;
        self
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_tiles == 0 {
            return Err(ValidationError::InvalidConfig(
                "max_tiles must be at least 1".to_string(),
            ));
        }
        if self.end.is_some_and(|end| end < self.start) {
            return Err(ValidationError::InvalidConfig(format!(
                "tile scan range ends before it starts ({:#X})",
                self.start
            )));
        }
        Ok(())
    }
}

/// A tile and where it was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedTile {
    /// Offset of the 32 encoded bytes
    pub offset: usize,
    /// Decoded tile
    pub tile: Tile,
}

/// Decode tiles from successive 32-byte windows
///
/// Windows start at `config.start` and step by 32; the range is clamped to
/// the image and a trailing partial window is ignored.
pub fn scan_tiles(rom: &RomImage, config: &TileScanConfig) -> RomResult<Vec<LocatedTile>> {
    config.validate()?;

    let end = config.end.map_or(rom.len(), |end| end.min(rom.len()));
    let mut found = Vec::new();
    let mut offset = config.start;
    while offset.checked_add(TILE_BYTES).is_some_and(|stop| stop <= end) {
        if found.len() >= config.max_tiles {
            break;
        }

        let window = rom.slice(offset, TILE_BYTES)?;
        if config.filter.accepts(window) {
            found.push(LocatedTile {
                offset,
                tile: Tile::decode(window)?,
            });
        }
        offset += TILE_BYTES;
    }

    trace!(found = found.len(), filter = ?config.filter, "tile scan complete");
    Ok(found)
}
