//! Binary patch container
//!
//! ```text
//! offset  size  field
//! 0       4     magic "MRPS"
//! 4       1     version (1)
//! 5       4     source length (u32 BE)
//! 9       4     entry count (u32 BE)
//! 13      6*n   entries: offset (u32 BE), before (u8), after (u8)
//! ```

use super::{PatchEntry, PatchSet};
use crate::error::{FormatError, RomResult, binrw_message};
use binrw::{BinRead, BinWrite};
use std::io::Cursor;

/// Container magic
pub const PATCH_MAGIC: [u8; 4] = *b"MRPS";
/// Current container version
pub const PATCH_VERSION: u8 = 1;

#[binrw::binrw]
#[derive(Debug)]
#[brw(big)]
struct PatchFile {
    #[br(assert(magic == PATCH_MAGIC, "invalid patch magic {:?}", magic))]
    magic: [u8; 4],
    #[br(assert(version == PATCH_VERSION, "unsupported patch version {}", version))]
    version: u8,
    source_len: u32,
    #[br(temp)]
    #[bw(calc = entries.len() as u32)]
    count: u32,
    #[br(count = count)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, BinRead, BinWrite)]
#[brw(big)]
struct RawEntry {
    offset: u32,
    before: u8,
    after: u8,
}

impl PatchSet {
    /// Serialize to the binary container
    pub fn to_bytes(&self) -> RomResult<Vec<u8>> {
        let source_len = to_u32(self.source_len, "source length")?;
        to_u32(self.entries.len(), "entry count")?;
        let entries = self
            .entries
            .iter()
            .map(|e| {
                Ok(RawEntry {
                    offset: to_u32(e.offset, "entry offset")?,
                    before: e.before,
                    after: e.after,
                })
            })
            .collect::<Result<Vec<_>, FormatError>>()?;

        let file = PatchFile {
            magic: PATCH_MAGIC,
            version: PATCH_VERSION,
            source_len,
            entries,
        };
        let mut out = Vec::new();
        file.write(&mut Cursor::new(&mut out))
            .map_err(|e| FormatError::MalformedPatch(binrw_message(&e)))?;
        Ok(out)
    }

    /// Parse the binary container
    ///
    /// Structural problems are a format error; entries out of order are a
    /// validation error.
    pub fn from_bytes(data: &[u8]) -> RomResult<Self> {
        let mut cursor = Cursor::new(data);
        let file = PatchFile::read(&mut cursor).map_err(|e| FormatError::MalformedPatch(binrw_message(&e)))?;
        if cursor.position() != data.len() as u64 {
            return Err(FormatError::MalformedPatch(format!(
                "{} trailing bytes",
                data.len() as u64 - cursor.position()
            ))
            .into());
        }

        let entries = file
            .entries
            .into_iter()
            .map(|e| PatchEntry {
                offset: e.offset as usize,
                before: e.before,
                after: e.after,
            })
            .collect();
        Ok(Self::new(file.source_len as usize, entries)?)
    }
}

fn to_u32(value: usize, what: &str) -> Result<u32, FormatError> {
    u32::try_from(value).map_err(|_| FormatError::MalformedPatch(format!("{what} {value} exceeds u32")))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{RomError, ValidationError};

    fn sample() -> PatchSet {
        PatchSet::new(
            0x2000,
            vec![
                PatchEntry { offset: 0x10, before: 0xAA, after: 0xBB },
                PatchEntry { offset: 0x1234, before: 0x00, after: 0xFF },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(&bytes[..4], &PATCH_MAGIC);
        assert_eq!(bytes[4], PATCH_VERSION);
        assert_eq!(&bytes[5..9], &0x2000u32.to_be_bytes());
        assert_eq!(&bytes[9..13], &2u32.to_be_bytes());
        assert_eq!(&bytes[13..19], &[0x00, 0x00, 0x00, 0x10, 0xAA, 0xBB]);
        assert_eq!(bytes.len(), 13 + 2 * 6);

        assert_eq!(PatchSet::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_empty_patch() {
        let empty = PatchSet::new(0x400, Vec::new()).unwrap();
        let bytes = empty.to_bytes().unwrap();
        assert_eq!(bytes.len(), 13);
        assert_eq!(PatchSet::from_bytes(&bytes).unwrap(), empty);
    }

    #[test]
    fn test_malformed() {
        let bytes = sample().to_bytes().unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            PatchSet::from_bytes(&bad_magic),
            Err(RomError::Format(FormatError::MalformedPatch(_)))
        ));

        let mut bad_version = bytes.clone();
        bad_version[4] = 2;
        assert!(matches!(
            PatchSet::from_bytes(&bad_version),
            Err(RomError::Format(FormatError::MalformedPatch(_)))
        ));

        assert!(matches!(
            PatchSet::from_bytes(&bytes[..bytes.len() - 1]),
            Err(RomError::Format(FormatError::MalformedPatch(_)))
        ));

        let mut trailing = bytes;
        trailing.push(0);
        assert!(matches!(
            PatchSet::from_bytes(&trailing),
            Err(RomError::Format(FormatError::MalformedPatch(_)))
        ));
    }

    #[test]
    fn test_error_messages_are_single_line() {
        let bytes = sample().to_bytes().unwrap();
        let message = |data: &[u8]| match PatchSet::from_bytes(data) {
            Err(RomError::Format(FormatError::MalformedPatch(message))) => Some(message),
            _ => None,
        }
        .unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        let bad_magic = message(&bad_magic);
        assert!(bad_magic.starts_with("invalid patch magic"), "{bad_magic}");

        let mut bad_version = bytes.clone();
        bad_version[4] = 9;
        let bad_version = message(&bad_version);
        assert!(bad_version.starts_with("unsupported patch version 9"), "{bad_version}");

        assert_eq!(message(&bytes[..bytes.len() - 1]), "unexpected end of data");

        for text in [bad_magic, bad_version] {
            assert!(!text.contains('\n'), "{text}");
            assert!(!text.contains('\u{1b}'), "{text}");
        }
    }

    #[test]
    fn test_unordered_entries_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        // Swap the two 6-byte entries
        let (first, second) = bytes[13..].split_at_mut(6);
        first.swap_with_slice(second);
        assert_eq!(
            PatchSet::from_bytes(&bytes),
            Err(RomError::Validation(ValidationError::UnorderedPatch { index: 1 }))
        );
    }
}
