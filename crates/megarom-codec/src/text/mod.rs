//! ASCII text location and length-bounded replacement
//!
//! [`scan_text`] finds maximal runs of printable bytes and reports each as a
//! [`TextRecord`]. [`TextPatcher`] writes replacement text back into the span
//! a record describes, never past it, and refuses to write when the buffer no
//! longer holds the text the record was scanned from.
//!
//! # Usage
//!
//! ```rust
//! use megarom_codec::rom::RomImage;
//! use megarom_codec::text::{TextPatcher, scan};
//!
//! let mut raw = vec![0u8; 0x400];
//! raw[0x300..0x305].copy_from_slice(b"HELLO");
//! let rom = RomImage::from_linear(raw)?;
//!
//! let records = scan(&rom, 4)?;
//! let hello = records.iter().find(|r| r.text == "HELLO").unwrap();
//! let patched = TextPatcher::default().replace(&rom, hello, "HI")?;
//! assert_eq!(patched.slice(0x300, 5)?, b"HI\0\0\0");
//! # Ok::<(), megarom_codec::RomError>(())
//! ```

mod patcher;
mod scanner;

pub use patcher::{TextPatcher, replace_text};
pub use scanner::{TextRegions, TextScanConfig, scan, scan_text};

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A run of text found in the image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRecord {
    /// Absolute offset of the first byte
    pub offset: usize,
    /// Length of the original run in bytes
    pub length: usize,
    /// Text as scanned, one char per byte
    pub text: String,
}

impl TextRecord {
    /// Record for `bytes` found at `offset`
    pub fn from_bytes(offset: usize, bytes: &[u8]) -> Self {
        Self {
            offset,
            length: bytes.len(),
            text: bytes_to_text(bytes),
        }
    }

    /// Byte span the record covers
    ///
    /// Not bounds checked; callers validate against the image first.
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset.saturating_add(self.length)
    }

    /// Whether `bytes` still hold this record's text
    pub fn matches(&self, bytes: &[u8]) -> bool {
        bytes.len() == self.length && bytes_to_text(bytes) == self.text
    }
}

/// Latin-1 view of raw bytes
fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
