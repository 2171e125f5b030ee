//! Palette codec
//!
//! A palette is 16 colors stored as 32 bytes of big-endian color words:
//!
//! ```text
//! bit  15 14 13 12 | 11 10  9  8 |  7  6  5  4 |  3  2  1  0
//!       0  0  0  0 |  B  B  B  0 |  G  G  G  0 |  R  R  R  0
//! ```
//!
//! Each 3-bit channel expands to 8 bits through [`LEVELS`]. Encoding snaps
//! every 8-bit channel to the nearest level, so arbitrary RGB input is lossy
//! once and stable afterwards.

mod scan;

pub use scan::{PaletteCandidate, PaletteScanConfig, scan_palettes};

use crate::error::{RomResult, ValidationError};
use crate::rom::RomImage;
use serde::{Deserialize, Serialize};

/// Encoded palette size in bytes
pub const PALETTE_SIZE: usize = 32;
/// Colors per palette
pub const COLORS_PER_PALETTE: usize = 16;
/// Bits a well-formed color word may use
pub const COLOR_MASK: u16 = 0x0EEE;

/// 8-bit value of each 3-bit channel level (`level * 255 / 7`)
pub const LEVELS: [u8; 8] = [0, 36, 72, 109, 145, 182, 218, 255];

/// 8-bit RGB color
///
/// Serializes as an `[r, g, b]` array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Expand a color word, ignoring bits outside [`COLOR_MASK`]
    pub const fn from_word(word: u16) -> Self {
        Self {
            r: LEVELS[((word >> 1) & 0x7) as usize],
            g: LEVELS[((word >> 5) & 0x7) as usize],
            b: LEVELS[((word >> 9) & 0x7) as usize],
        }
    }

    /// Pack into a color word, snapping each channel to the nearest level
    pub fn to_word(self) -> u16 {
        let r = u16::from(nearest_level(self.r));
        let g = u16::from(nearest_level(self.g));
        let b = u16::from(nearest_level(self.b));
        (b << 9) | (g << 5) | (r << 1)
    }

    /// The nearest color the hardware can show
    pub fn quantized(self) -> Self {
        Self::from_word(self.to_word())
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.r, color.g, color.b]
    }
}

/// Index of the level closest to `value`; ties go to the lower level
fn nearest_level(value: u8) -> u8 {
    LEVELS
        .iter()
        .enumerate()
        .min_by_key(|&(_, &level)| level.abs_diff(value))
        .map_or(0, |(index, _)| index as u8)
}

/// Whether a color word only uses channel bits
pub const fn is_well_formed(word: u16) -> bool {
    word & !COLOR_MASK == 0
}

/// Exactly 16 colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct Palette {
    colors: [Rgb; COLORS_PER_PALETTE],
}

impl Palette {
    /// Decode 32 bytes, rejecting words with stray bits
    pub fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        let words = color_words(bytes)?;
        if let Some(index) = words.iter().position(|&w| !is_well_formed(w)) {
            return Err(ValidationError::MalformedColor {
                index,
                word: words[index],
            });
        }
        Ok(Self::from_words(&words))
    }

    /// Decode 32 bytes, dropping stray bits instead of rejecting them
    pub fn decode_masked(bytes: &[u8]) -> Result<Self, ValidationError> {
        Ok(Self::from_words(&color_words(bytes)?))
    }

    fn from_words(words: &[u16; COLORS_PER_PALETTE]) -> Self {
        Self {
            colors: words.map(Rgb::from_word),
        }
    }

    /// Encode to 32 bytes, quantizing every channel
    pub fn encode(&self) -> [u8; PALETTE_SIZE] {
        let mut out = [0u8; PALETTE_SIZE];
        for (chunk, color) in out.chunks_exact_mut(2).zip(&self.colors) {
            chunk.copy_from_slice(&color.to_word().to_be_bytes());
        }
        out
    }

    /// Build from exactly 16 colors
    pub fn from_colors(colors: &[Rgb]) -> Result<Self, ValidationError> {
        let colors: [Rgb; COLORS_PER_PALETTE] = colors
            .try_into()
            .map_err(|_| ValidationError::WrongColorCount(colors.len()))?;
        Ok(Self { colors })
    }

    /// Build from integer triples, checking every channel is 0-255
    pub fn from_tuples(tuples: &[[i64; 3]]) -> Result<Self, ValidationError> {
        if tuples.len() != COLORS_PER_PALETTE {
            return Err(ValidationError::WrongColorCount(tuples.len()));
        }

        let mut colors = [Rgb::default(); COLORS_PER_PALETTE];
        for (index, (slot, tuple)) in colors.iter_mut().zip(tuples).enumerate() {
            let mut channels = [0u8; 3];
            for (channel, &value) in channels.iter_mut().zip(tuple) {
                *channel = u8::try_from(value)
                    .map_err(|_| ValidationError::ChannelOutOfRange { index, value })?;
            }
            *slot = Rgb::from(channels);
        }
        Ok(Self { colors })
    }

    /// Every color snapped to the hardware levels
    pub fn quantized(&self) -> Self {
        Self {
            colors: self.colors.map(Rgb::quantized),
        }
    }

    /// All 16 colors
    pub const fn colors(&self) -> &[Rgb; COLORS_PER_PALETTE] {
        &self.colors
    }

    /// Color at `index`, if below 16
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Colors as `[r, g, b]` triples
    pub fn to_tuples(&self) -> Vec<[u8; 3]> {
        self.colors.iter().map(|&c| c.into()).collect()
    }
}

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = ValidationError;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        Self::from_colors(&colors)
    }
}

impl From<Palette> for Vec<Rgb> {
    fn from(palette: Palette) -> Self {
        palette.colors.to_vec()
    }
}

fn color_words(bytes: &[u8]) -> Result<[u16; COLORS_PER_PALETTE], ValidationError> {
    if bytes.len() != PALETTE_SIZE {
        return Err(ValidationError::WrongSize {
            what: "palette",
            expected: PALETTE_SIZE,
            actual: bytes.len(),
        });
    }

    let mut words = [0u16; COLORS_PER_PALETTE];
    for (word, pair) in words.iter_mut().zip(bytes.chunks_exact(2)) {
        *word = u16::from_be_bytes([pair[0], pair[1]]);
    }
    Ok(words)
}

/// Decode the palette stored at `offset`
pub fn read_palette(rom: &RomImage, offset: usize) -> RomResult<Palette> {
    Ok(Palette::decode(rom.slice(offset, PALETTE_SIZE)?)?)
}

/// Return a copy of `rom` with `palette` encoded at `offset`
pub fn write_palette(rom: &RomImage, offset: usize, palette: &Palette) -> RomResult<RomImage> {
    rom.with_bytes_at(offset, &palette.encode())
}
