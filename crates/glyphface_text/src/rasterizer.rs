//! Glyph rasterization
//!
//! The [`Rasterizer`] trait is the boundary to the font backend: one call per
//! code point, returning a single-channel bitmap and 26.6 fixed-point metrics.
//! [`SwashRasterizer`] implements it with swash.

use crate::font::FontFace;
use crate::{FaceError, Result};
use std::path::Path;
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;
use tracing::warn;

/// Number of 26.6 fixed-point units per pixel
pub const FIXED_26_6: i32 = 64;

/// Per-glyph metrics in 26.6 fixed point (1/64 pixel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    /// Horizontal advance to the next pen position
    pub advance: i32,
    /// Offset from the pen position to the left edge of the bitmap
    pub bearing_x: i32,
    /// Offset from the baseline up to the top edge of the bitmap
    pub bearing_y: i32,
    /// Bounding box width
    pub width: i32,
    /// Bounding box height
    pub height: i32,
}

impl GlyphMetrics {
    /// Build metrics from whole pixel values
    pub fn from_pixels(advance: f32, bearing_x: i32, bearing_y: i32, width: u32, height: u32) -> Self {
        Self {
            advance: (advance * FIXED_26_6 as f32).round() as i32,
            bearing_x: bearing_x * FIXED_26_6,
            bearing_y: bearing_y * FIXED_26_6,
            width: width as i32 * FIXED_26_6,
            height: height as i32 * FIXED_26_6,
        }
    }

    /// Horizontal advance in pixels
    pub fn advance_px(&self) -> f32 {
        self.advance as f32 / FIXED_26_6 as f32
    }
}

/// Rasterized glyph bitmap with metrics
#[derive(Debug, Clone, Default)]
pub struct RasterizedGlyph {
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Bytes between the starts of consecutive rows in memory.
    ///
    /// Positive: the first row in memory is the visual top (the usual case).
    /// Negative: the first row in memory is the visual bottom.
    pub pitch: i32,
    /// Pixel data (8-bit coverage)
    pub pixels: Vec<u8>,
    /// Glyph metrics
    pub metrics: GlyphMetrics,
}

impl RasterizedGlyph {
    /// An empty glyph (like space) with only an advance
    pub fn empty(advance: f32) -> Self {
        Self {
            metrics: GlyphMetrics::from_pixels(advance, 0, 0, 0, 0),
            ..Default::default()
        }
    }
}

/// Font-wide metrics in pixels at the rasterizer's pixel size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobalMetrics {
    /// Pixels per em
    pub pixel_size: u32,
    /// Distance from baseline to the top of the em box
    pub ascender: f32,
    /// Distance from baseline to the bottom (negative below the baseline)
    pub descender: f32,
    /// Extra spacing between lines
    pub line_gap: f32,
    /// Baseline to baseline distance
    pub line_height: f32,
}

/// A font backend that rasterizes one code point at a time
pub trait Rasterizer {
    /// Rasterize the glyph for a code point at the configured pixel size.
    ///
    /// Code points the font does not cover resolve to the font's missing
    /// glyph rather than failing.
    fn rasterize(&mut self, code_point: u32) -> Result<RasterizedGlyph>;

    /// Font-wide metrics at the configured pixel size
    fn global_metrics(&self) -> GlobalMetrics;

    /// Pixels per em
    fn pixel_size(&self) -> u32;
}

/// Glyph rasterizer using swash
pub struct SwashRasterizer {
    /// Parsed font (owns the font bytes)
    font: FontFace,
    /// Pixels per em
    pixel_size: u32,
    /// Swash scale context (caches scaling state)
    scale_context: ScaleContext,
}

impl SwashRasterizer {
    /// Create a rasterizer for an already parsed font
    pub fn new(font: FontFace, pixel_size: u32) -> Result<Self> {
        swash::FontRef::from_index(font.data(), font.face_index() as usize).ok_or_else(|| {
            FaceError::FontParse(format!(
                "face {} not readable by rasterizer",
                font.face_index()
            ))
        })?;

        Ok(Self {
            font,
            pixel_size,
            scale_context: ScaleContext::new(),
        })
    }

    /// Open a font file and create a rasterizer for it
    pub fn open(path: &Path, face_index: u32, pixel_size: u32) -> Result<Self> {
        let font = FontFace::from_file(path, face_index)?;
        Self::new(font, pixel_size).map_err(|e| FaceError::FontOpenFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// The font being rasterized
    pub fn font(&self) -> &FontFace {
        &self.font
    }
}

impl Rasterizer for SwashRasterizer {
    fn rasterize(&mut self, code_point: u32) -> Result<RasterizedGlyph> {
        let size = self.pixel_size as f32;
        let font = swash::FontRef::from_index(self.font.data(), self.font.face_index() as usize)
            .ok_or_else(|| FaceError::Rasterize {
                code_point,
                reason: "invalid font data".to_string(),
            })?;

        let glyph_id = font.charmap().map(code_point);
        if glyph_id == 0 && code_point != 0 {
            warn!("No glyph for U+{:04X}, using missing glyph", code_point);
        }

        let advance = font.glyph_metrics(&[]).scale(size).advance_width(glyph_id);

        let mut scaler = self.scale_context.builder(font).size(size).build();

        // Single-channel coverage only; color sources are not consulted
        let mut render = Render::new(&[Source::Outline, Source::Bitmap(StrikeWith::BestFit)]);
        render.format(Format::Alpha);

        let Some(image) = render.render(&mut scaler, glyph_id) else {
            // Empty glyph (like space) - no bitmap but has advance
            return Ok(RasterizedGlyph::empty(advance));
        };

        if !matches!(image.content, Content::Mask) {
            return Err(FaceError::Rasterize {
                code_point,
                reason: "only single-channel coverage bitmaps are supported".to_string(),
            });
        }

        let width = image.placement.width;
        let height = image.placement.height;

        Ok(RasterizedGlyph {
            width,
            height,
            pitch: width as i32,
            pixels: image.data,
            metrics: GlyphMetrics::from_pixels(
                advance,
                image.placement.left,
                image.placement.top,
                width,
                height,
            ),
        })
    }

    fn global_metrics(&self) -> GlobalMetrics {
        let metrics = self.font.metrics();
        let size = self.pixel_size as f32;
        GlobalMetrics {
            pixel_size: self.pixel_size,
            ascender: metrics.ascender_px(size),
            descender: metrics.descender_px(size),
            line_gap: metrics.line_gap_px(size),
            line_height: metrics.line_height_px(size),
        }
    }

    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }
}

impl std::fmt::Debug for SwashRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwashRasterizer")
            .field("font", &self.font)
            .field("pixel_size", &self.pixel_size)
            .finish()
    }
}
