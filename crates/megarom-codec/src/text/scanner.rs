//! Printable-run scanner

use super::TextRecord;
use crate::error::{RomResult, ValidationError};
use crate::rom::RomImage;
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};
use tracing::trace;

const PRINTABLE: RangeInclusive<u8> = 0x20..=0x7E;

/// Offset ranges to scan; empty means the whole image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextRegions(Vec<Range<usize>>);

impl TextRegions {
    /// Scan only `ranges`
    pub fn new(ranges: Vec<Range<usize>>) -> Self {
        Self(ranges)
    }

    /// Areas where cartridges commonly keep their text
    pub fn common() -> Self {
        Self(vec![0x10000..0x20000, 0x80000..0x100000, 0x120000..0x180000])
    }

    /// Whether the whole image is scanned
    pub fn is_whole_image(&self) -> bool {
        self.0.is_empty()
    }

    /// Ranges clamped to `len`, sorted, with overlaps merged
    pub fn resolve(&self, len: usize) -> Vec<Range<usize>> {
        if self.0.is_empty() {
            return vec![0..len];
        }

        let mut ranges: Vec<_> = self
            .0
            .iter()
            .map(|r| r.start.min(len)..r.end.min(len))
            .filter(|r| !r.is_empty())
            .collect();
        ranges.sort_by_key(|r| r.start);

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start < last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        merged
    }
}

/// Text scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextScanConfig {
    /// Shortest run reported
    pub min_length: usize,
    /// Bytes accepted as text besides 0x20-0x7E
    pub extra_bytes: Vec<u8>,
    /// Where to look
    pub regions: TextRegions,
    /// Stop after this many records
    pub max_records: usize,
}

impl Default for TextScanConfig {
    fn default() -> Self {
        Self {
            min_length: 4,
            extra_bytes: Vec::new(),
            regions: TextRegions::default(),
            max_records: 100_000,
        }
    }
}

impl TextScanConfig {
    /// Set the shortest run reported
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Accept extra bytes inside runs
    pub fn with_extra_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.extra_bytes = bytes.into();
        self
    }

    /// Restrict the scan to `regions`
    pub fn with_regions(mut self, regions: TextRegions) -> Self {
        self.regions = regions;
        self
    }

    /// Set the result limit
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_length == 0 {
            return Err(ValidationError::InvalidConfig(
                "min_length must be at least 1".to_string(),
            ));
        }
        if self.max_records == 0 {
            return Err(ValidationError::InvalidConfig(
                "max_records must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn is_text_byte(&self, byte: u8) -> bool {
        PRINTABLE.contains(&byte) || self.extra_bytes.contains(&byte)
    }
}

/// Scan the whole image with default settings and the given minimum length
pub fn scan(rom: &RomImage, min_length: usize) -> RomResult<Vec<TextRecord>> {
    scan_text(rom, &TextScanConfig::default().with_min_length(min_length))
}

/// Find maximal text runs, in ascending offset order
pub fn scan_text(rom: &RomImage, config: &TextScanConfig) -> RomResult<Vec<TextRecord>> {
    config.validate()?;

    let mut records = Vec::new();
    for region in config.regions.resolve(rom.len()) {
        let bytes = rom.slice(region.start, region.len())?;
        if !scan_region(bytes, region.start, config, &mut records) {
            break;
        }
    }

    trace!(records = records.len(), "text scan complete");
    Ok(records)
}

/// Returns false once the record limit is reached
fn scan_region(bytes: &[u8], base: usize, config: &TextScanConfig, out: &mut Vec<TextRecord>) -> bool {
    let mut run_start = None;
    // Trailing sentinel flushes a run that reaches the region end
    for (i, is_text) in bytes
        .iter()
        .map(|&b| config.is_text_byte(b))
        .chain(std::iter::once(false))
        .enumerate()
    {
        match (run_start, is_text) {
            (None, true) => run_start = Some(i),
            (Some(start), false) => {
                run_start = None;
                if i - start < config.min_length {
                    continue;
                }
                out.push(TextRecord::from_bytes(base + start, &bytes[start..i]));
                if out.len() >= config.max_records {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::build_rom;

    fn hello_world_rom() -> RomImage {
        build_rom(0x1000)
            .with_bytes_at(0x800, b"\0HELLO\0WORLD\0")
            .unwrap()
    }

    #[test]
    fn test_hello_world() {
        let rom = hello_world_rom();
        let config = TextScanConfig::default().with_regions(TextRegions::new(vec![0x200..0x1000]));
        let records = scan_text(&rom, &config).unwrap();

        assert_eq!(
            records,
            vec![
                TextRecord::from_bytes(0x801, b"HELLO"),
                TextRecord::from_bytes(0x807, b"WORLD"),
            ]
        );
    }

    #[test]
    fn test_min_length_and_header_text() {
        let rom = hello_world_rom();
        let records = scan(&rom, 6).unwrap();
        // Header strings are found, the five-letter words are not
        assert!(records.iter().any(|r| r.text.starts_with("SEGA MEGA DRIVE")));
        assert!(records.iter().all(|r| r.length >= 6 && r.text != "HELLO"));
        assert!(records.windows(2).all(|w| w[0].span().end <= w[1].offset));
    }

    #[test]
    fn test_extra_bytes_extend_runs() {
        let rom = build_rom(0x1000).with_bytes_at(0x900, b"\0AB\xFFCD\0").unwrap();
        let region = TextRegions::new(vec![0x900..0x910]);

        let plain = TextScanConfig::default().with_min_length(2).with_regions(region);
        let texts: Vec<_> = scan_text(&rom, &plain).unwrap().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["AB", "CD"]);

        let extended = plain.with_extra_bytes([0xFFu8]);
        let records = scan_text(&rom, &extended).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].length, 5);
        assert_eq!(records[0].offset, 0x901);
    }

    #[test]
    fn test_runs_stop_at_region_end() {
        let rom = build_rom(0x1000).with_bytes_at(0x900, b"ABCDEFGH").unwrap();
        let config = TextScanConfig::default()
            .with_regions(TextRegions::new(vec![0x900..0x904, 0x904..0x908]));
        let records = scan_text(&rom, &config).unwrap();
        assert_eq!(
            records,
            vec![
                TextRecord::from_bytes(0x900, b"ABCD"),
                TextRecord::from_bytes(0x904, b"EFGH"),
            ]
        );
    }

    #[test]
    fn test_region_resolution() {
        let regions = TextRegions::new(vec![0x50..0x80, 0x10..0x60, 0x900..0x2000, 0x5000..0x6000]);
        assert_eq!(regions.resolve(0x1000), vec![0x10..0x80, 0x900..0x1000]);
        assert_eq!(TextRegions::default().resolve(0x400), vec![0..0x400]);

        let common = TextRegions::common().resolve(0x90000);
        assert_eq!(common, vec![0x10000..0x20000, 0x80000..0x90000]);
    }

    #[test]
    fn test_limits_and_validation() {
        let rom = hello_world_rom();
        let config = TextScanConfig::default()
            .with_regions(TextRegions::new(vec![0x800..0x900]))
            .with_max_records(1);
        let records = scan_text(&rom, &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "HELLO");

        assert!(scan(&rom, 0).is_err());
        assert!(scan_text(&rom, &TextScanConfig::default().with_max_records(0)).is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config: TextScanConfig =
            serde_json::from_str(r#"{"min_length": 3, "regions": [{"start": 16, "end": 32}]}"#).unwrap();
        assert_eq!(config.min_length, 3);
        assert_eq!(config.regions, TextRegions::new(vec![16..32]));
        assert_eq!(config.max_records, TextScanConfig::default().max_records);
    }
}
