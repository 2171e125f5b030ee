//! Grouped codec settings
//!
//! Every section is optional in JSON; missing sections and fields take their
//! defaults.
//!
//! ```json
//! {
//!   "text":    { "min_length": 4, "extra_bytes": [], "regions": [], "max_records": 100000 },
//!   "palette": { "candidate_offsets": [131072], "stride_scan": true, "min_valid_colors": 12, "max_palettes": 256 },
//!   "tile":    { "start": 0, "end": null, "filter": "non_blank", "max_tiles": 256 },
//!   "render":  { "scale": 2, "grid": { "spacing": "tile", "color": [128, 128, 128] } },
//!   "patcher": { "filler": 0 }
//! }
//! ```

use crate::error::{FormatError, RomResult, ValidationError};
use crate::palette::PaletteScanConfig;
use crate::text::{TextPatcher, TextScanConfig};
use crate::tile::{RenderOptions, TileScanConfig};
use serde::{Deserialize, Serialize};

/// Settings for every scanning and rendering operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Text scanning
    pub text: TextScanConfig,
    /// Palette scanning
    pub palette: PaletteScanConfig,
    /// Tile scanning
    pub tile: TileScanConfig,
    /// Rasterizing
    pub render: RenderOptions,
    /// Text replacement
    pub patcher: TextPatcher,
}

impl ScanConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> RomResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FormatError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> RomResult<String> {
        Ok(serde_json::to_string_pretty(self).map_err(|e| FormatError::InvalidConfig(e.to_string()))?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.text.validate()?;
        self.palette.validate()?;
        self.tile.validate()?;
        self.render.validate()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RomError;
    use crate::tile::{GridSpacing, TileFilter};

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ScanConfig::from_json("{}").unwrap(), ScanConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = ScanConfig::from_json(
            r#"{
                "text": { "min_length": 6, "extra_bytes": [255] },
                "tile": { "filter": "graphics_like" },
                "render": { "scale": 4, "grid": { "spacing": "pixel" } },
                "patcher": { "filler": 32 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.text.min_length, 6);
        assert_eq!(config.text.extra_bytes, vec![0xFF]);
        assert_eq!(config.tile.filter, TileFilter::GraphicsLike);
        assert_eq!(config.render.scale, 4);
        assert_eq!(config.render.grid.map(|g| g.spacing), Some(GridSpacing::Pixel));
        assert_eq!(config.patcher.filler, b' ');
        assert_eq!(config.palette, PaletteScanConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let config = ScanConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(ScanConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            ScanConfig::from_json("{ not json"),
            Err(RomError::Format(FormatError::InvalidConfig(_)))
        ));
        assert!(matches!(
            ScanConfig::from_json(r#"{"tile": {"filter": "sprites"}}"#),
            Err(RomError::Format(FormatError::InvalidConfig(_)))
        ));
        assert_eq!(
            ScanConfig::from_json(r#"{"render": {"scale": 32}}"#),
            Err(RomError::Validation(ValidationError::InvalidScale(32)))
        );
        assert!(matches!(
            ScanConfig::from_json(r#"{"text": {"min_length": 0}}"#),
            Err(RomError::Validation(ValidationError::InvalidConfig(_)))
        ));
    }
}
