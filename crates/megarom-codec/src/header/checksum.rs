//! Header checksum verification
//!
//! The checksum is the 16-bit wrapping sum of big-endian words from 0x200 up
//! to the declared ROM end (inclusive). A mismatch is reported, not raised:
//! modified images are expected to disagree with their stored value.

use crate::bounds::checked_slice;
use crate::error::{FormatError, RomResult};
use crate::rom::{MIN_ROM_SIZE, RomImage};
use serde::{Deserialize, Serialize};

/// First byte covered by the checksum
pub const CHECKSUM_START: usize = 0x200;
/// Location of the stored checksum
pub const CHECKSUM_OFFSET: usize = 0x18E;

const ROM_END_OFFSET: usize = 0x1A4;

/// Stored versus recomputed checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumReport {
    /// Value stored in the header
    pub stored: u16,
    /// Value recomputed from the image
    pub computed: u16,
    /// Whether the two agree
    pub matches: bool,
}

/// Recompute the checksum of a linear image
pub fn compute_checksum(rom: &RomImage) -> u16 {
    compute_checksum_raw(rom.as_bytes())
}

/// Compare the stored checksum with a recomputed one
pub fn verify_checksum(rom: &RomImage) -> RomResult<ChecksumReport> {
    let data = rom.as_bytes();
    if data.len() < MIN_ROM_SIZE {
        return Err(FormatError::TooSmall {
            len: data.len(),
            min: MIN_ROM_SIZE,
        }
        .into());
    }

    let stored = rom.read_u16_be(CHECKSUM_OFFSET)?;
    let computed = compute_checksum_raw(data);
    Ok(ChecksumReport {
        stored,
        computed,
        matches: stored == computed,
    })
}

/// Return a copy of the image with the recomputed checksum stored
pub fn fix_checksum(rom: &RomImage) -> RomResult<RomImage> {
    let computed = compute_checksum(rom);
    rom.with_bytes_at(CHECKSUM_OFFSET, &computed.to_be_bytes())
}

/// End of the checksummed region, clamped to the buffer
///
/// Falls back to the buffer length when the declared end is missing or
/// points inside the header.
fn checksum_end(data: &[u8]) -> usize {
    let declared = data
        .get(ROM_END_OFFSET..ROM_END_OFFSET + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize);

    match declared {
        Some(end) if end >= CHECKSUM_START => end.saturating_add(1).min(data.len()),
        _ => data.len(),
    }
}

pub(crate) fn compute_checksum_raw(data: &[u8]) -> u16 {
    let end = checksum_end(data);
    let Ok(region) = checked_slice(data, CHECKSUM_START, end.saturating_sub(CHECKSUM_START)) else {
        return 0;
    };

    region
        .chunks(2)
        .map(|word| match *word {
            [hi, lo] => u16::from_be_bytes([hi, lo]),
            [hi] => u16::from_be_bytes([hi, 0]),
            _ => 0,
        })
        .fold(0u16, u16::wrapping_add)
}

pub(crate) fn stored_checksum_raw(data: &[u8]) -> Option<u16> {
    data.get(CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{build_rom, build_rom_with_body};

    #[test]
    fn test_fixture_checksum_matches() {
        let rom = build_rom_with_body(0x1000, |i| (i % 251) as u8);
        let report = verify_checksum(&rom).unwrap();
        assert!(report.matches);
        assert_eq!(report.stored, report.computed);
    }

    #[test]
    fn test_known_sum() {
        let rom = build_rom(0x400);
        // Words 0x0102 and 0xFFFF wrap to 0x0101
        let rom = rom.with_bytes_at(0x200, &[0x01, 0x02, 0xFF, 0xFF]).unwrap();
        assert_eq!(compute_checksum(&rom), 0x0101);
    }

    #[test]
    fn test_mismatch_is_reported_not_raised() {
        let rom = build_rom(0x1000);
        let modified = rom.with_bytes_at(0x300, &[0x12, 0x34]).unwrap();

        let report = verify_checksum(&modified).unwrap();
        assert!(!report.matches);
        assert_eq!(report.computed, 0x1234);
        assert_eq!(report.stored, 0);

        let fixed = fix_checksum(&modified).unwrap();
        assert!(verify_checksum(&fixed).unwrap().matches);
        assert_eq!(fixed.read_u16_be(CHECKSUM_OFFSET).unwrap(), 0x1234);
        // Source untouched
        assert_eq!(modified.read_u16_be(CHECKSUM_OFFSET).unwrap(), 0);
    }

    #[test]
    fn test_declared_end_limits_region() {
        let rom = build_rom(0x1000);
        // Declare the ROM as ending at 0x3FF; bytes after that are ignored
        let rom = rom.with_bytes_at(ROM_END_OFFSET, &0x3FFu32.to_be_bytes()).unwrap();
        let rom = rom.with_bytes_at(0x800, &[0xAA, 0xAA]).unwrap();
        assert_eq!(compute_checksum(&rom), 0);

        // A declared end below the body falls back to the buffer length
        let rom = rom.with_bytes_at(ROM_END_OFFSET, &0x10u32.to_be_bytes()).unwrap();
        assert_eq!(compute_checksum(&rom), 0xAAAA);
    }

    #[test]
    fn test_odd_trailing_byte() {
        let rom = build_rom(0x400);
        let rom = rom.with_bytes_at(ROM_END_OFFSET, &0x200u32.to_be_bytes()).unwrap();
        let rom = rom.with_bytes_at(0x200, &[0x7F, 0x01]).unwrap();
        // Region is the single byte at 0x200, padded with a zero low byte
        assert_eq!(compute_checksum(&rom), 0x7F00);
    }

    #[test]
    fn test_raw_sum_of_short_buffers() {
        assert_eq!(compute_checksum_raw(&[]), 0);
        assert_eq!(compute_checksum_raw(&[0xFF; CHECKSUM_START - 1]), 0);
        assert_eq!(compute_checksum_raw(&[0xFF; CHECKSUM_START]), 0);

        let mut data = vec![0u8; CHECKSUM_START + 3];
        data[CHECKSUM_START..].copy_from_slice(&[0x12, 0x34, 0x56]);
        assert_eq!(compute_checksum_raw(&data), 0x6834);
        assert_eq!(stored_checksum_raw(&data[..CHECKSUM_OFFSET + 1]), None);
    }
}
