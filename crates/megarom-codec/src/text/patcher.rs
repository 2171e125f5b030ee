//! Length-bounded text replacement

use super::TextRecord;
use crate::bounds::validate_range;
use crate::error::{RomResult, ValidationError};
use crate::rom::RomImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Writes replacement text into scanned record spans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPatcher {
    /// Byte written after shorter replacements
    pub filler: u8,
}

impl TextPatcher {
    /// Patcher that pads with `filler`
    pub const fn with_filler(filler: u8) -> Self {
        Self { filler }
    }

    /// Replace the text of `record`, returning a new image
    ///
    /// The replacement is written left-justified and the remainder of the
    /// span is filled. Nothing outside the record's span changes. Fails if
    /// the replacement is longer than the record or not ASCII, or if the
    /// image no longer holds the record's text.
    pub fn replace(&self, rom: &RomImage, record: &TextRecord, new_text: &str) -> RomResult<RomImage> {
        let span = validate_range(record.offset, record.length, rom.len())?;

        if !new_text.is_ascii() {
            return Err(ValidationError::NonAsciiText.into());
        }
        if new_text.len() > record.length {
            return Err(ValidationError::TextTooLong {
                new_len: new_text.len(),
                max_len: record.length,
            }
            .into());
        }
        if !record.matches(&rom.as_bytes()[span.clone()]) {
            return Err(ValidationError::StaleRecord {
                offset: record.offset,
            }
            .into());
        }

        debug!(
            offset = record.offset,
            old = %record.text,
            new = new_text,
            "replacing text"
        );
        let filler = self.filler;
        Ok(rom.modified(|data| {
            let target = &mut data[span];
            let (text, rest) = target.split_at_mut(new_text.len());
            text.copy_from_slice(new_text.as_bytes());
            rest.fill(filler);
        }))
    }

    /// Apply several replacements in order
    ///
    /// Records must not overlap. If any replacement fails the error is
    /// returned and `rom` is unchanged.
    pub fn replace_all<'a, I>(&self, rom: &RomImage, replacements: I) -> RomResult<RomImage>
    where
        I: IntoIterator<Item = (&'a TextRecord, &'a str)>,
    {
        replacements
            .into_iter()
            .try_fold(rom.clone(), |current, (record, text)| self.replace(&current, record, text))
    }
}

/// Replace with the default zero filler
pub fn replace_text(rom: &RomImage, record: &TextRecord, new_text: &str) -> RomResult<RomImage> {
    TextPatcher::default().replace(rom, record, new_text)
}
