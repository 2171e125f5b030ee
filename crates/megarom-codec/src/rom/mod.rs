//! ROM image container and format normalization
//!
//! A [`RomImage`] always holds the cartridge in canonical linear byte order.
//! It remembers which container layout it was loaded from so that
//! [`RomImage::to_container_bytes`] can restore the original layout on save.
//!
//! Images are immutable. Every operation that changes bytes copies the buffer
//! first and returns a new image, so a caller holding the old image never
//! observes a partial write.
//!
//! # Usage
//!
//! ```rust
//! use megarom_codec::rom::{ContainerKind, RomImage};
//!
//! let raw = vec![0u8; 0x400];
//! let rom = RomImage::load(&raw, Some(ContainerKind::Linear))?;
//! assert_eq!(rom.len(), 0x400);
//!
//! let patched = rom.with_bytes_at(0x300, b"HI")?;
//! assert_eq!(patched.slice(0x300, 2)?, b"HI");
//! assert_eq!(rom.slice(0x300, 2)?, &[0, 0]);
//! # Ok::<(), megarom_codec::RomError>(())
//! ```

mod detect;
pub mod interleave;

pub use detect::{HeaderPlausibility, LayoutScorer, Normalizer};

use crate::bounds::{checked_slice, validate_range};
use crate::error::{FormatError, RomResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Smallest buffer that still contains the full header region
pub const MIN_ROM_SIZE: usize = 0x200;

/// Container layout a ROM dump was stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    /// Plain linear dump (`.bin`, `.gen`)
    Linear,
    /// Even-address half followed by odd-address half (`.md`)
    InterleavedHalves,
    /// 16 KiB interleaved blocks with optional copier header (`.smd`)
    SmdBlocks,
}

impl ContainerKind {
    /// All layouts, in detection tie-break order
    pub const ALL: [Self; 3] = [Self::Linear, Self::InterleavedHalves, Self::SmdBlocks];

    /// Guess the layout from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "bin" | "gen" | "sg" => Some(Self::Linear),
            "md" => Some(Self::InterleavedHalves),
            "smd" => Some(Self::SmdBlocks),
            _ => None,
        }
    }

    /// Guess the layout from a file name or path
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether this layout needs de-interleaving
    pub fn is_interleaved(self) -> bool {
        !matches!(self, Self::Linear)
    }
}

impl FromStr for ContainerKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| FormatError::UnknownHint(s.to_string()))
    }
}

/// Normalized, immutable ROM image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    data: Vec<u8>,
    container: ContainerKind,
    copier_header: Option<Vec<u8>>,
}

impl RomImage {
    /// Wrap an already-linear buffer
    pub fn from_linear(data: Vec<u8>) -> RomResult<Self> {
        Self::from_parts(data, ContainerKind::Linear, None)
    }

    /// Normalize a raw dump using the default header-plausibility scorer
    pub fn load(raw: &[u8], hint: Option<ContainerKind>) -> RomResult<Self> {
        Normalizer::new().normalize(raw, hint)
    }

    /// Normalize a raw dump, taking the layout hint from its file name
    pub fn load_named(raw: &[u8], file_name: impl AsRef<Path>) -> RomResult<Self> {
        Self::load(raw, ContainerKind::from_path(file_name))
    }

    pub(crate) fn from_parts(
        data: Vec<u8>,
        container: ContainerKind,
        copier_header: Option<Vec<u8>>,
    ) -> RomResult<Self> {
        if data.len() < MIN_ROM_SIZE {
            return Err(FormatError::TooSmall {
                len: data.len(),
                min: MIN_ROM_SIZE,
            }
            .into());
        }

        Ok(Self {
            data,
            container,
            copier_header,
        })
    }

    /// Linear ROM bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length of the linear buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed image; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Layout the image was loaded from
    pub fn container(&self) -> ContainerKind {
        self.container
    }

    /// SMD copier header preserved from load, if any
    pub fn copier_header(&self) -> Option<&[u8]> {
        self.copier_header.as_deref()
    }

    /// Bounds-checked view of `length` bytes at `offset`
    pub fn slice(&self, offset: usize, length: usize) -> RomResult<&[u8]> {
        Ok(checked_slice(&self.data, offset, length)?)
    }

    /// Read a single byte
    pub fn read_u8(&self, offset: usize) -> RomResult<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    /// Read a big-endian 16-bit word
    pub fn read_u16_be(&self, offset: usize) -> RomResult<u16> {
        let bytes = self.slice(offset, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian 32-bit word
    pub fn read_u32_be(&self, offset: usize) -> RomResult<u32> {
        let bytes = self.slice(offset, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Copy the image and overwrite `bytes.len()` bytes at `offset`
    pub fn with_bytes_at(&self, offset: usize, bytes: &[u8]) -> RomResult<Self> {
        let range = validate_range(offset, bytes.len(), self.data.len())?;
        Ok(self.modified(|data| data[range].copy_from_slice(bytes)))
    }

    /// Copy the buffer, let `edit` change it, and wrap the result
    ///
    /// `edit` must not resize the buffer; callers validate their ranges first.
    pub(crate) fn modified(&self, edit: impl FnOnce(&mut [u8])) -> Self {
        let mut data = self.data.clone();
        edit(&mut data);
        Self {
            data,
            container: self.container,
            copier_header: self.copier_header.clone(),
        }
    }

    /// Convert back to the container layout the image was loaded from
    pub fn to_container_bytes(&self) -> RomResult<Vec<u8>> {
        self.to_layout(self.container)
    }

    /// Convert to an arbitrary container layout
    ///
    /// The preserved copier header is only emitted for [`ContainerKind::SmdBlocks`].
    pub fn to_layout(&self, kind: ContainerKind) -> RomResult<Vec<u8>> {
        let bytes = match kind {
            ContainerKind::Linear => self.data.clone(),
            ContainerKind::InterleavedHalves => interleave::interleave_halves(&self.data)?,
            ContainerKind::SmdBlocks => {
                let blocks = interleave::interleave_smd(&self.data)?;
                match &self.copier_header {
                    Some(header) => {
                        let mut out = Vec::with_capacity(header.len() + blocks.len());
                        out.extend_from_slice(header);
                        out.extend_from_slice(&blocks);
                        out
                    }
                    None => blocks,
                }
            }
        };
        Ok(bytes)
    }
}

impl AsRef<[u8]> for RomImage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
