//! Cartridge header parsing
//!
//! The header occupies 0x100..0x200 of the linear image. All multi-byte
//! integers are big-endian.
//!
//! ```text
//! 0x100  console signature   16 bytes  "SEGA MEGA DRIVE " / "SEGA GENESIS    "
//! 0x110  copyright           16 bytes
//! 0x120  domestic title      48 bytes
//! 0x150  overseas title      48 bytes
//! 0x180  serial              14 bytes
//! 0x18E  checksum            u16
//! 0x190  device support      16 bytes
//! 0x1A0  ROM start / end     u32 / u32
//! 0x1A8  RAM start / end     u32 / u32
//! 0x1B0  extra memory        12 bytes
//! 0x1BC  modem               12 bytes
//! 0x1C8  notes               40 bytes
//! 0x1F0  region codes        3 bytes
//! 0x1F3  reserved            13 bytes
//! ```

mod checksum;
mod region;

pub use checksum::{CHECKSUM_OFFSET, CHECKSUM_START, ChecksumReport, compute_checksum, fix_checksum, verify_checksum};
pub(crate) use checksum::{compute_checksum_raw, stored_checksum_raw};
pub use region::Regions;

use crate::bounds::checked_slice;
use crate::error::{FormatError, RomResult, binrw_message};
use crate::rom::{MIN_ROM_SIZE, RomImage};
use binrw::{BinRead, BinWrite};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Offset of the header region
pub const HEADER_OFFSET: usize = 0x100;
/// Size of the header region
pub const HEADER_SIZE: usize = 0x100;

/// Console signatures accepted verbatim
pub const KNOWN_SIGNATURES: [&[u8; 16]; 2] = [b"SEGA MEGA DRIVE ", b"SEGA GENESIS    "];

/// Raw fixed-layout header (256 bytes, big-endian)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(big)]
#[bw(big)]
pub struct RomHeader {
    /// Console signature
    pub console: [u8; 16],
    /// Copyright / release date
    pub copyright: [u8; 16],
    /// Domestic (Japanese) title
    pub domestic_title: [u8; 48],
    /// Overseas title
    pub overseas_title: [u8; 48],
    /// Product type and serial number
    pub serial: [u8; 14],
    /// Stored checksum
    pub checksum: u16,
    /// Supported input devices
    pub device_support: [u8; 16],
    /// Declared ROM start address
    pub rom_start: u32,
    /// Declared ROM end address (inclusive)
    pub rom_end: u32,
    /// Declared RAM start address
    pub ram_start: u32,
    /// Declared RAM end address (inclusive)
    pub ram_end: u32,
    /// Extra memory (SRAM) descriptor
    pub extra_memory: [u8; 12],
    /// Modem descriptor
    pub modem: [u8; 12],
    /// Free-form notes
    pub notes: [u8; 40],
    /// Region codes
    pub region: [u8; 3],
    /// Reserved padding
    pub reserved: [u8; 13],
}

impl RomHeader {
    /// Parse the header region of a linear image
    pub fn parse(rom: &RomImage) -> RomResult<Self> {
        Self::parse_bytes(rom.as_bytes())
    }

    /// Parse the header region from a linear byte buffer
    pub fn parse_bytes(data: &[u8]) -> RomResult<Self> {
        if data.len() < MIN_ROM_SIZE {
            return Err(FormatError::TooSmall {
                len: data.len(),
                min: MIN_ROM_SIZE,
            }
            .into());
        }

        let region = checked_slice(data, HEADER_OFFSET, HEADER_SIZE)?;
        Self::read(&mut Cursor::new(region))
            .map_err(|e| FormatError::MalformedHeader(binrw_message(&e)).into())
    }

    /// Serialize back to the 256-byte header region
    pub fn to_bytes(&self) -> RomResult<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        self.write(&mut Cursor::new(&mut out))
            .map_err(|e| FormatError::MalformedHeader(binrw_message(&e)))?;
        Ok(out)
    }

    /// Whether the console signature names a Mega Drive / Genesis cartridge
    pub fn has_valid_signature(&self) -> bool {
        signature_is_valid(&self.console)
    }

    /// Decoded region support
    pub fn regions(&self) -> Regions {
        Regions::from_codes(&self.region)
    }

    /// Best display title: overseas if present, else domestic
    pub fn title(&self) -> String {
        let overseas = clean_text(&self.overseas_title);
        if overseas.is_empty() {
            clean_text(&self.domestic_title)
        } else {
            overseas
        }
    }

    /// Human-readable summary of the header
    pub fn info(&self) -> HeaderInfo {
        HeaderInfo {
            console: clean_text(&self.console),
            copyright: clean_text(&self.copyright),
            domestic_title: clean_text(&self.domestic_title),
            overseas_title: clean_text(&self.overseas_title),
            serial: clean_text(&self.serial),
            checksum: self.checksum,
            rom_start: self.rom_start,
            rom_end: self.rom_end,
            regions: self.regions(),
            signature_valid: self.has_valid_signature(),
        }
    }
}

/// Decoded header fields for display and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    /// Console signature
    pub console: String,
    /// Copyright / release date
    pub copyright: String,
    /// Domestic title
    pub domestic_title: String,
    /// Overseas title
    pub overseas_title: String,
    /// Serial number
    pub serial: String,
    /// Stored checksum
    pub checksum: u16,
    /// Declared ROM start
    pub rom_start: u32,
    /// Declared ROM end
    pub rom_end: u32,
    /// Region support
    pub regions: Regions,
    /// Whether the console signature was recognized
    pub signature_valid: bool,
}

/// Locate the console signature when it is not at the standard offset
pub fn find_header_offset(rom: &RomImage) -> Option<usize> {
    let data = rom.as_bytes();
    if has_valid_signature(data) {
        return Some(HEADER_OFFSET);
    }

    KNOWN_SIGNATURES.iter().find_map(|signature| {
        data.windows(signature.len())
            .position(|window| window == signature.as_slice())
    })
}

/// Signature check straight on a linear buffer
pub(crate) fn has_valid_signature(data: &[u8]) -> bool {
    checked_slice(data, HEADER_OFFSET, 16).is_ok_and(signature_is_valid)
}

fn signature_is_valid(console: &[u8]) -> bool {
    KNOWN_SIGNATURES
        .iter()
        .any(|signature| console == signature.as_slice())
        || console.starts_with(b"SEGA")
}

/// ASCII-only, NUL/space trimmed, with internal whitespace collapsed
fn clean_text(bytes: &[u8]) -> String {
    let ascii: String = bytes
        .iter()
        .filter(|&&b| b.is_ascii_graphic() || b == b' ')
        .map(|&b| char::from(b))
        .collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RomError;
    use crate::test_utils::build_rom;

    #[test]
    fn test_parse_fixture_header() {
        let rom = build_rom(0x1000);
        let header = RomHeader::parse(&rom).unwrap();

        assert!(header.has_valid_signature());
        assert_eq!(&header.console, b"SEGA MEGA DRIVE ");
        assert_eq!(header.title(), "TEST CART");
        assert_eq!(header.rom_start, 0);
        assert_eq!(header.rom_end, 0xFFF);
        assert!(header.regions().americas);
    }

    #[test]
    fn test_header_round_trip() {
        let rom = build_rom(0x1000);
        let header = RomHeader::parse(&rom).unwrap();
        let bytes = header.to_bytes().unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(bytes.as_slice(), &rom.as_bytes()[HEADER_OFFSET..HEADER_OFFSET + HEADER_SIZE]);
    }

    #[test]
    fn test_title_whitespace_normalized() {
        let rom = build_rom(0x400);
        let rom = rom.with_bytes_at(0x150, b"  SONIC   THE\0\0HEDGEHOG  ").unwrap();
        let info = RomHeader::parse(&rom).unwrap().info();
        assert_eq!(info.overseas_title, "SONIC THEHEDGEHOG");

        let blank = rom.with_bytes_at(0x150, &[b' '; 48]).unwrap();
        let header = RomHeader::parse(&blank).unwrap();
        assert_eq!(header.title(), "TEST CART");
    }

    #[test]
    fn test_genesis_signature_and_unknown() {
        let rom = build_rom(0x400);
        let genesis = rom.with_bytes_at(0x100, b"SEGA GENESIS    ").unwrap();
        assert!(RomHeader::parse(&genesis).unwrap().has_valid_signature());

        let other = rom.with_bytes_at(0x100, b"NOT A CARTRIDGE ").unwrap();
        assert!(!RomHeader::parse(&other).unwrap().has_valid_signature());
        assert_eq!(find_header_offset(&other), None);
    }

    #[test]
    fn test_find_relocated_signature() {
        let rom = build_rom(0x1000);
        let moved = rom.with_bytes_at(0x100, &[0u8; 16]).unwrap();
        let moved = moved.with_bytes_at(0x800, b"SEGA GENESIS    ").unwrap();
        assert_eq!(find_header_offset(&moved), Some(0x800));
        assert_eq!(find_header_offset(&rom), Some(HEADER_OFFSET));
    }

    #[test]
    fn test_short_buffer_is_format_error() {
        assert!(matches!(
            RomHeader::parse_bytes(&[0u8; 0x1FF]),
            Err(RomError::Format(FormatError::TooSmall { .. }))
        ));
    }
}
