//! Codecs for Mega Drive / Genesis cartridge ROM images
//!
#![allow(clippy::cast_possible_truncation)] // Byte and word packing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Channel and plane names
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::cast_precision_loss)] // Entropy statistics
//! This crate turns raw cartridge dumps into typed values and back. Every
//! decode has an encode, and unmodified data always round-trips to the same
//! bytes.
//!
//! # Components
//!
//! - **[`rom`]**: container detection (linear, interleaved halves, SMD blocks)
//!   and the immutable [`RomImage`]
//! - **[`header`]**: fixed-offset header fields, region codes and the checksum
//! - **[`palette`]**: 16-color palettes in the 9-bit hardware color format
//! - **[`tile`]**: 8x8 4bpp planar tiles, tile sheets and RGB rendering
//! - **[`text`]**: printable-run scanning and length-bounded replacement
//! - **[`patch`]**: byte diffs between images and a compact binary container
//! - **[`bounds`]**: range validation every codec runs before touching a buffer
//! - **[`analysis`]**: statistics, fingerprints, pattern search and hex views
//!
//! # Design Principles
//!
//! - **Immutable images**: every write returns a new [`RomImage`]
//! - **Fixed shapes**: a palette is always 16 colors, a tile always 32 bytes
//! - **Checked access**: no codec slices a buffer with an unvalidated range
//! - **Explicit limits**: scans stop at the limits in their config
//!
//! # Example
//!
//! ```rust
//! use megarom_codec::{RomImage, diff, apply, scan_text, TextScanConfig, replace_text};
//!
//! let mut raw = vec![0u8; 0x1000];
//! raw[0x800..0x806].copy_from_slice(b"PLAYER");
//! let rom = RomImage::from_linear(raw)?;
//!
//! let records = scan_text(&rom, &TextScanConfig::default())?;
//! let player = records.iter().find(|r| r.text == "PLAYER").unwrap();
//! let edited = replace_text(&rom, player, "HERO")?;
//!
//! let patch = diff(&rom, &edited)?;
//! assert_eq!(patch.len(), 6);
//! assert_eq!(apply(&rom, &patch)?, edited);
//! # Ok::<(), megarom_codec::RomError>(())
//! ```

#![warn(missing_docs)]

pub mod analysis;
pub mod bounds;
/// Grouped scan and render settings loadable from JSON
pub mod config;
pub mod error;
pub mod header;
pub mod palette;
pub mod patch;
pub mod rom;
pub mod text;
pub mod tile;

#[cfg(test)]
pub(crate) mod test_utils;

pub use analysis::{RomStatistics, fingerprint, short_fingerprint, statistics};
pub use bounds::validate_range;
pub use config::ScanConfig;
pub use error::{BoundsError, FormatError, RomError, RomResult, ValidationError};
pub use header::{ChecksumReport, Regions, RomHeader, verify_checksum};
pub use palette::{Palette, PaletteScanConfig, Rgb, read_palette, scan_palettes, write_palette};
pub use patch::{PatchEntry, PatchSet, PatchSummary, apply, diff};
pub use rom::{ContainerKind, LayoutScorer, Normalizer, RomImage};
pub use text::{TextPatcher, TextRecord, TextRegions, TextScanConfig, replace_text, scan, scan_text};
pub use tile::{
    IndexMatrix, RenderOptions, RgbImage, Tile, TileScanConfig, compose_sheet, read_tile, render,
    scan_tiles, write_tile,
};
