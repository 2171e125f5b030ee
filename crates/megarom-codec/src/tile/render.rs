//! Rasterizing index matrices
//!
//! Rendering is a pure function of the matrix, the palette and the options.
//! The grid overlay only paints the output raster; decoded indices never
//! change.

use super::sheet::{IndexMatrix, checked_area};
use super::{TILE_DIM, Tile};
use crate::error::ValidationError;
use crate::palette::{Palette, Rgb};
use serde::{Deserialize, Serialize};

/// Largest accepted upscale factor
pub const MAX_SCALE: u32 = 16;

/// Where grid lines fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSpacing {
    /// Between every source pixel
    Pixel,
    /// Between every 8x8 tile
    Tile,
}

/// Grid lines drawn over the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOverlay {
    /// Line spacing
    pub spacing: GridSpacing,
    /// Line color
    #[serde(default = "GridOverlay::default_color")]
    pub color: Rgb,
}

impl GridOverlay {
    const fn default_color() -> Rgb {
        Rgb::new(128, 128, 128)
    }

    /// Gray grid with the given spacing
    pub const fn new(spacing: GridSpacing) -> Self {
        Self {
            spacing,
            color: Self::default_color(),
        }
    }

    /// Override the line color
    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// Raster settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Integer upscale factor, 1-16
    pub scale: u32,
    /// Optional grid overlay
    pub grid: Option<GridOverlay>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1,
            grid: None,
        }
    }
}

impl RenderOptions {
    /// Set the upscale factor
    pub const fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Draw a grid over the raster
    pub const fn with_grid(mut self, grid: GridOverlay) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Check the scale is within 1-16
    pub fn validate(&self) -> Result<(), ValidationError> {
        if (1..=MAX_SCALE).contains(&self.scale) {
            Ok(())
        } else {
            Err(ValidationError::InvalidScale(self.scale))
        }
    }
}

/// RGB raster, row-major
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl RgbImage {
    /// Width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Color at column `x`, row `y`
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Packed `RGBRGB...` bytes for image encoders
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| <[u8; 3]>::from(p)).collect()
    }
}

/// Render a matrix through `palette`
pub fn render(matrix: &IndexMatrix, palette: &Palette, options: &RenderOptions) -> Result<RgbImage, ValidationError> {
    options.validate()?;

    let scale = options.scale as usize;
    let width = matrix.width().saturating_mul(scale);
    let height = matrix.height().saturating_mul(scale);
    let area = checked_area(width, height)?;
    let grid = options.grid.map(|grid| {
        let step = match grid.spacing {
            GridSpacing::Pixel => scale,
            GridSpacing::Tile => scale * TILE_DIM,
        };
        (step, grid.color)
    });

    let mut pixels = Vec::with_capacity(area);
    for y in 0..height {
        for x in 0..width {
            let on_line = grid.filter(|&(step, _)| on_grid(x, step) || on_grid(y, step));
            let color = match on_line {
                Some((_, color)) => color,
                None => matrix
                    .get(x / scale, y / scale)
                    .and_then(|index| palette.get(usize::from(index)))
                    .unwrap_or_default(),
            };
            pixels.push(color);
        }
    }

    Ok(RgbImage {
        width,
        height,
        pixels,
    })
}

/// Render a single tile
pub fn render_tile(tile: &Tile, palette: &Palette, options: &RenderOptions) -> Result<RgbImage, ValidationError> {
    render(&IndexMatrix::from(tile), palette, options)
}

fn on_grid(position: usize, step: usize) -> bool {
    position > 0 && position % step == 0
}
