//! Whole-image statistics, fingerprints, search and hex views

use crate::error::RomResult;
use crate::rom::RomImage;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Bytes shown per hex view line
pub const HEX_LINE_WIDTH: usize = 16;

/// Byte distribution of an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RomStatistics {
    /// Image length in bytes
    pub size: usize,
    /// Count of 0x00 bytes
    pub null_bytes: usize,
    /// Count of 0xFF bytes
    pub ff_bytes: usize,
    /// Number of distinct byte values
    pub unique_bytes: usize,
    /// Shannon entropy in bits per byte (0.0 - 8.0)
    pub entropy: f64,
}

/// Compute the byte distribution of `rom`
pub fn statistics(rom: &RomImage) -> RomStatistics {
    let data = rom.as_bytes();
    let mut histogram = [0usize; 256];
    for &byte in data {
        histogram[usize::from(byte)] += 1;
    }

    let total = data.len() as f64;
    let entropy: f64 = histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum();

    RomStatistics {
        size: data.len(),
        null_bytes: histogram[0x00],
        ff_bytes: histogram[0xFF],
        unique_bytes: histogram.iter().filter(|&&count| count > 0).count(),
        entropy,
    }
}

/// MD5 of the linear image as lowercase hex
pub fn fingerprint(rom: &RomImage) -> String {
    hex::encode(md5::compute(rom.as_bytes()).0)
}

/// First eight hex digits of [`fingerprint`]
pub fn short_fingerprint(rom: &RomImage) -> String {
    let mut full = fingerprint(rom);
    full.truncate(8);
    full
}

/// Every offset where `pattern` occurs, overlapping matches included
///
/// An empty pattern matches nowhere.
pub fn find_pattern(rom: &RomImage, pattern: &[u8]) -> Vec<usize> {
    if pattern.is_empty() {
        return Vec::new();
    }
    rom.as_bytes()
        .windows(pattern.len())
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(offset, _)| offset)
        .collect()
}

/// Hex dump of `length` bytes at `offset`
///
/// One line per 16 bytes: `ADDRESS | HEX | ASCII`, with non-printable bytes
/// shown as `.` in the ASCII column.
pub fn hex_view(rom: &RomImage, offset: usize, length: usize) -> RomResult<Vec<String>> {
    let bytes = rom.slice(offset, length)?;

    Ok(bytes
        .chunks(HEX_LINE_WIDTH)
        .enumerate()
        .map(|(i, chunk)| {
            let mut hex = String::with_capacity(HEX_LINE_WIDTH * 3);
            for (j, byte) in chunk.iter().enumerate() {
                if j > 0 {
                    hex.push(' ');
                }
                let _ = write!(hex, "{byte:02X}");
            }
            let ascii: String = chunk
                .iter()
                .map(|&b| if (0x20..=0x7E).contains(&b) { char::from(b) } else { '.' })
                .collect();
            format!(
                "{:08X} | {hex:<width$} | {ascii}",
                offset + i * HEX_LINE_WIDTH,
                width = HEX_LINE_WIDTH * 3
            )
        })
        .collect())
}
