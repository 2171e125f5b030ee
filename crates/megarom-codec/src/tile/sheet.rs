//! Tile sheet composition

use super::{TILE_DIM, Tile};
use crate::error::ValidationError;

/// Largest matrix or raster, in pixels (4096 x 4096)
pub const MAX_PIXELS: usize = 1 << 24;

/// Rectangular grid of palette indices, row-major
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMatrix {
    width: usize,
    height: usize,
    indices: Vec<u8>,
}

impl IndexMatrix {
    /// Zero-filled matrix of at most [`MAX_PIXELS`] pixels
    pub fn new(width: usize, height: usize) -> Result<Self, ValidationError> {
        let pixels = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            indices: vec![0; pixels],
        })
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether the matrix has no pixels
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Index at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.indices.get(y * self.width + x).copied()
    }

    /// Rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on zero
        self.indices.chunks_exact(self.width.max(1))
    }

    fn blit(&mut self, tile: &Tile, left: usize, top: usize) {
        for (dy, row) in tile.rows().iter().enumerate() {
            let start = (top + dy) * self.width + left;
            self.indices[start..start + TILE_DIM].copy_from_slice(row);
        }
    }
}

impl From<&Tile> for IndexMatrix {
    fn from(tile: &Tile) -> Self {
        let mut matrix = Self {
            width: TILE_DIM,
            height: TILE_DIM,
            indices: vec![0; TILE_DIM * TILE_DIM],
        };
        matrix.blit(tile, 0, 0);
        matrix
    }
}

/// Lay tiles out left to right, top to bottom, `columns` per row
///
/// The sheet is always `columns` tiles wide. A short final row is padded
/// with index 0; no tiles gives an empty matrix.
pub fn compose_sheet(tiles: &[Tile], columns: usize) -> Result<IndexMatrix, ValidationError> {
    if columns == 0 {
        return Err(ValidationError::ZeroColumns);
    }
    if tiles.is_empty() {
        return Ok(IndexMatrix::default());
    }

    let rows = tiles.len().div_ceil(columns);
    let mut sheet = IndexMatrix::new(columns.saturating_mul(TILE_DIM), rows.saturating_mul(TILE_DIM))?;
    for (i, tile) in tiles.iter().enumerate() {
        sheet.blit(tile, (i % columns) * TILE_DIM, (i / columns) * TILE_DIM);
    }
    Ok(sheet)
}

/// `width * height`, rejected above [`MAX_PIXELS`]
pub(crate) fn checked_area(width: usize, height: usize) -> Result<usize, ValidationError> {
    width
        .checked_mul(height)
        .filter(|&pixels| pixels <= MAX_PIXELS)
        .ok_or(ValidationError::ImageTooLarge {
            width,
            height,
            max: MAX_PIXELS,
        })
}
