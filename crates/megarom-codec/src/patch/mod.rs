//! Byte-level patch sets
//!
//! A [`PatchSet`] records every byte that differs between two equal-length
//! images, together with its old and new value. Replaying it onto the source
//! image reproduces the modified one; replaying it anywhere else fails,
//! because every entry checks the byte it expects to overwrite.

mod container;

pub use container::{PATCH_MAGIC, PATCH_VERSION};

use crate::bounds::validate_range;
use crate::error::{RomResult, ValidationError};
use crate::rom::RomImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One changed byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchEntry {
    /// Absolute offset in the linear image
    pub offset: usize,
    /// Byte in the source image
    pub before: u8,
    /// Byte in the modified image
    pub after: u8,
}

/// Ordered set of byte changes against a source image of known length
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchSet {
    source_len: usize,
    entries: Vec<PatchEntry>,
}

impl<'de> Deserialize<'de> for PatchSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            source_len: usize,
            entries: Vec<PatchEntry>,
        }

        let fields = Fields::deserialize(deserializer)?;
        Self::new(fields.source_len, fields.entries).map_err(serde::de::Error::custom)
    }
}

/// Counts and extent of a patch set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    /// Number of changed bytes
    pub changed_bytes: usize,
    /// Number of contiguous runs of changed bytes
    pub runs: usize,
    /// Lowest and highest changed offset
    pub span: Option<(usize, usize)>,
}

impl PatchSet {
    /// Build from entries, which must be strictly ascending by offset
    pub fn new(source_len: usize, entries: Vec<PatchEntry>) -> Result<Self, ValidationError> {
        check_order(&entries)?;
        Ok(Self { source_len, entries })
    }

    /// Length of the image the patch was made against
    pub const fn source_len(&self) -> usize {
        self.source_len
    }

    /// Entries in ascending offset order
    pub fn entries(&self) -> &[PatchEntry] {
        &self.entries
    }

    /// Number of changed bytes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the images were identical
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Patch that undoes this one
    pub fn invert(&self) -> Self {
        Self {
            source_len: self.source_len,
            entries: self
                .entries
                .iter()
                .map(|e| PatchEntry {
                    offset: e.offset,
                    before: e.after,
                    after: e.before,
                })
                .collect(),
        }
    }

    /// Changed byte count, run count and touched span
    pub fn summary(&self) -> PatchSummary {
        let runs = self
            .entries
            .iter()
            .enumerate()
            .filter(|&(i, entry)| i == 0 || self.entries[i - 1].offset.saturating_add(1) != entry.offset)
            .count();

        PatchSummary {
            changed_bytes: self.entries.len(),
            runs,
            span: self
                .entries
                .first()
                .zip(self.entries.last())
                .map(|(first, last)| (first.offset, last.offset)),
        }
    }
}

fn check_order(entries: &[PatchEntry]) -> Result<(), ValidationError> {
    match entries.windows(2).position(|w| w[0].offset >= w[1].offset) {
        Some(i) => Err(ValidationError::UnorderedPatch { index: i + 1 }),
        None => Ok(()),
    }
}

/// Diff two equal-length images
pub fn diff(original: &RomImage, modified: &RomImage) -> RomResult<PatchSet> {
    Ok(diff_bytes(original.as_bytes(), modified.as_bytes())?)
}

/// Diff two equal-length buffers
pub fn diff_bytes(original: &[u8], modified: &[u8]) -> Result<PatchSet, ValidationError> {
    if original.len() != modified.len() {
        return Err(ValidationError::LengthMismatch {
            left: original.len(),
            right: modified.len(),
        });
    }

    let entries = original
        .iter()
        .zip(modified)
        .enumerate()
        .filter(|&(_, (before, after))| before != after)
        .map(|(offset, (&before, &after))| PatchEntry {
            offset,
            before,
            after,
        })
        .collect();

    Ok(PatchSet {
        source_len: original.len(),
        entries,
    })
}

/// Replay `patch` onto `rom`, returning the modified image
///
/// Every entry is checked before anything is written, so a failed apply
/// never yields a partially patched image.
pub fn apply(rom: &RomImage, patch: &PatchSet) -> RomResult<RomImage> {
    if rom.len() != patch.source_len {
        return Err(ValidationError::LengthMismatch {
            left: patch.source_len,
            right: rom.len(),
        }
        .into());
    }
    check_order(&patch.entries)?;

    let data = rom.as_bytes();
    let mut writes = Vec::with_capacity(patch.entries.len());
    for entry in &patch.entries {
        let range = validate_range(entry.offset, 1, data.len())?;
        let found = data[range.start];
        if found != entry.before {
            return Err(ValidationError::PatchMismatch {
                offset: entry.offset,
                expected: entry.before,
                found,
            }
            .into());
        }
        writes.push((range, entry.after));
    }

    debug!(entries = writes.len(), len = rom.len(), "applying patch");
    Ok(rom.modified(|data| {
        for (range, after) in writes {
            data[range].fill(after);
        }
    }))
}
