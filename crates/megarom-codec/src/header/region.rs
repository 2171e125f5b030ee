//! Region code decoding
//!
//! Early cartridges list regions as letters (`J`, `U`, `E`, or `W` for all).
//! Later ones store a single hex digit bitmask: bit 0 Japan, bit 2 Americas,
//! bit 3 Europe.

use serde::{Deserialize, Serialize};

/// Markets a cartridge declares support for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regions {
    /// NTSC Japan
    pub japan: bool,
    /// NTSC Americas
    pub americas: bool,
    /// PAL Europe
    pub europe: bool,
}

impl Regions {
    const JAPAN_BIT: u8 = 0x1;
    const AMERICAS_BIT: u8 = 0x4;
    const EUROPE_BIT: u8 = 0x8;

    /// Decode the region code field
    pub fn from_codes(codes: &[u8]) -> Self {
        let mut regions = Self::default();
        let mut saw_letter = false;

        for &code in codes {
            match code.to_ascii_uppercase() {
                b'J' => regions.japan = true,
                b'U' => regions.americas = true,
                b'E' => regions.europe = true,
                b'W' => regions = Self::all(),
                _ => continue,
            }
            saw_letter = true;
        }

        if saw_letter {
            return regions;
        }

        // No letters: the first character is a hex bitmask
        codes
            .first()
            .and_then(|&c| char::from(c).to_digit(16))
            .map_or(regions, |mask| {
                let mask = mask as u8;
                Self {
                    japan: mask & Self::JAPAN_BIT != 0,
                    americas: mask & Self::AMERICAS_BIT != 0,
                    europe: mask & Self::EUROPE_BIT != 0,
                }
            })
    }

    /// Every region
    pub const fn all() -> Self {
        Self {
            japan: true,
            americas: true,
            europe: true,
        }
    }

    /// Whether no region was recognized
    pub const fn is_empty(self) -> bool {
        !self.japan && !self.americas && !self.europe
    }

    /// Short display name
    ///
    /// Multi-region carts that are not worldwide report their first market in
    /// the order USA, Japan, Europe.
    pub const fn display_name(self) -> &'static str {
        if self.japan && self.americas && self.europe {
            "WORLDWIDE"
        } else if self.americas {
            "USA"
        } else if self.japan {
            "JAPAN"
        } else if self.europe {
            "EUROPE"
        } else {
            "UNKNOWN"
        }
    }
}
