//! Planar 4bpp tile codec
//!
//! A tile is 8x8 pixels of 4-bit palette indices stored in 32 bytes. Each
//! pixel row takes four consecutive bytes, one per bitplane:
//!
//! ```text
//! row y:  [plane0][plane1][plane2][plane3]
//!
//! pixel (x, y) = bit (7 - x) of plane0        (index bit 0)
//!              | bit (7 - x) of plane1 << 1   (index bit 1)
//!              | bit (7 - x) of plane2 << 2   (index bit 2)
//!              | bit (7 - x) of plane3 << 3   (index bit 3)
//! ```
//!
//! Every 32-byte input decodes to a tile that encodes back to the same bytes.

mod render;
mod scan;
mod sheet;

pub use render::{GridOverlay, GridSpacing, RenderOptions, RgbImage, render, render_tile};
pub use scan::{LocatedTile, TileFilter, TileScanConfig, scan_tiles};
pub use sheet::{IndexMatrix, MAX_PIXELS, compose_sheet};

use crate::error::{BoundsError, RomResult, ValidationError};
use crate::rom::RomImage;

/// Encoded tile size in bytes
pub const TILE_BYTES: usize = 32;
/// Tile edge length in pixels
pub const TILE_DIM: usize = 8;
/// Largest palette index a pixel can hold
pub const MAX_INDEX: u8 = 15;

const PLANES: usize = 4;

/// 8x8 grid of palette indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    pixels: [[u8; TILE_DIM]; TILE_DIM],
}

impl Tile {
    /// Decode 32 planar bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.len() != TILE_BYTES {
            return Err(ValidationError::WrongSize {
                what: "tile",
                expected: TILE_BYTES,
                actual: bytes.len(),
            });
        }

        let mut pixels = [[0u8; TILE_DIM]; TILE_DIM];
        for (row, planes) in pixels.iter_mut().zip(bytes.chunks_exact(PLANES)) {
            for (x, pixel) in row.iter_mut().enumerate() {
                let shift = 7 - x;
                *pixel = planes
                    .iter()
                    .enumerate()
                    .fold(0, |acc, (plane, &byte)| acc | (((byte >> shift) & 1) << plane));
            }
        }

        Ok(Self { pixels })
    }

    /// Encode to 32 planar bytes
    pub fn encode(&self) -> [u8; TILE_BYTES] {
        let mut out = [0u8; TILE_BYTES];
        for (planes, row) in out.chunks_exact_mut(PLANES).zip(&self.pixels) {
            for (plane, byte) in planes.iter_mut().enumerate() {
                *byte = row
                    .iter()
                    .enumerate()
                    .fold(0, |acc, (x, &pixel)| acc | (((pixel >> plane) & 1) << (7 - x)));
            }
        }
        out
    }

    /// Build from pixel rows, rejecting indices above 15
    pub fn from_pixels(pixels: [[u8; TILE_DIM]; TILE_DIM]) -> Result<Self, ValidationError> {
        for (y, row) in pixels.iter().enumerate() {
            if let Some(x) = row.iter().position(|&p| p > MAX_INDEX) {
                return Err(ValidationError::PixelOutOfRange {
                    x,
                    y,
                    value: row[x],
                });
            }
        }
        Ok(Self { pixels })
    }

    /// Index at column `x`, row `y`
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        self.pixels.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Pixel rows, top to bottom
    pub const fn rows(&self) -> &[[u8; TILE_DIM]; TILE_DIM] {
        &self.pixels
    }

    /// Whether every pixel is index 0
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().flatten().all(|&p| p == 0)
    }
}

/// Decode the tile stored at `offset`
pub fn read_tile(rom: &RomImage, offset: usize) -> RomResult<Tile> {
    Ok(Tile::decode(rom.slice(offset, TILE_BYTES)?)?)
}

/// Decode `count` consecutive tiles starting at `offset`
pub fn read_tiles(rom: &RomImage, offset: usize, count: usize) -> RomResult<Vec<Tile>> {
    let length = count
        .checked_mul(TILE_BYTES)
        .ok_or(BoundsError::Overflow {
            offset,
            length: usize::MAX,
        })?;
    rom.slice(offset, length)?
        .chunks_exact(TILE_BYTES)
        .map(|chunk| Tile::decode(chunk).map_err(Into::into))
        .collect()
}

/// Return a copy of `rom` with `tile` encoded at `offset`
pub fn write_tile(rom: &RomImage, offset: usize, tile: &Tile) -> RomResult<RomImage> {
    rom.with_bytes_at(offset, &tile.encode())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RomError;
    use crate::test_utils::build_rom;

    #[test]
    fn test_plane0_row_is_all_ones() {
        let mut bytes = [0u8; TILE_BYTES];
        bytes[..4].copy_from_slice(&[0xFF, 0x00, 0x00, 0x00]);
        let tile = Tile::decode(&bytes).unwrap();
        assert_eq!(tile.rows()[0], [1; 8]);
        assert_eq!(tile.rows()[1], [0; 8]);
    }

    #[test]
    fn test_plane_weights() {
        let mut bytes = [0u8; TILE_BYTES];
        // Leftmost pixel from plane 3 only, rightmost from all planes
        bytes[4..8].copy_from_slice(&[0x01, 0x01, 0x01, 0x81]);
        let tile = Tile::decode(&bytes).unwrap();
        assert_eq!(tile.pixel(0, 1), Some(8));
        assert_eq!(tile.pixel(7, 1), Some(15));
        assert_eq!(tile.pixel(3, 1), Some(0));
        assert_eq!(tile.pixel(8, 1), None);
    }

    #[test]
    fn test_from_pixels_checks_range() {
        let mut pixels = [[0u8; 8]; 8];
        pixels[2][5] = 16;
        assert_eq!(
            Tile::from_pixels(pixels),
            Err(ValidationError::PixelOutOfRange { x: 5, y: 2, value: 16 })
        );

        pixels[2][5] = 15;
        let tile = Tile::from_pixels(pixels).unwrap();
        assert_eq!(Tile::decode(&tile.encode()).unwrap(), tile);
        assert!(!tile.is_blank());
        assert!(Tile::default().is_blank());
    }

    #[test]
    fn test_wrong_size() {
        assert_eq!(
            Tile::decode(&[0u8; 33]),
            Err(ValidationError::WrongSize {
                what: "tile",
                expected: 32,
                actual: 33
            })
        );
    }

    #[test]
    fn test_rom_access() {
        let rom = build_rom(0x1000);
        let mut pixels = [[0u8; 8]; 8];
        pixels[0][0] = 9;
        let tile = Tile::from_pixels(pixels).unwrap();

        let written = write_tile(&rom, 0x800, &tile).unwrap();
        assert_eq!(read_tile(&written, 0x800).unwrap(), tile);
        assert_eq!(read_tiles(&written, 0x800, 2).unwrap(), vec![tile, Tile::default()]);
        assert!(matches!(read_tile(&rom, 0xFF0), Err(RomError::Bounds(_))));
        assert!(matches!(read_tiles(&rom, 0, usize::MAX), Err(RomError::Bounds(_))));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        proptest! {
            /// Any 32 bytes survive decode then encode unchanged
            #[test]
            fn tile_bytes_round_trip(bytes in prop::array::uniform32(any::<u8>())) {
                let tile = Tile::decode(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(tile.encode(), bytes);
                prop_assert!(tile.rows().iter().flatten().all(|&p| p <= MAX_INDEX));
            }
        }
    }
}
