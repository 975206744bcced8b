//! Glyph placement
//!
//! Reserves a rectangle for a rasterized bitmap and copies its rows into the
//! atlas. The rasterizer's first visual row is the top of the glyph while the
//! atlas' row 0 (texture v = 0) is the bottom, so rows are flipped on copy.

use crate::atlas::{AtlasSurface, Placement};
use crate::rasterizer::RasterizedGlyph;
use crate::{FaceError, Result};

/// Copies rasterized bitmaps into an [`AtlasSurface`]
#[derive(Debug, Default, Clone, Copy)]
pub struct GlyphPlacer;

impl GlyphPlacer {
    /// Reserve space for `glyph` and blit it into `surface`
    pub fn place(surface: &mut AtlasSurface, glyph: &RasterizedGlyph) -> Result<Placement> {
        validate_bitmap(glyph)?;

        let placement = surface.reserve(glyph.width, glyph.height)?;
        if glyph.width == 0 || glyph.height == 0 {
            // Nothing to copy; pitch and buffer may be anything
            return Ok(placement);
        }

        let width = glyph.width as usize;
        let stride = glyph.pitch.unsigned_abs() as usize;
        for row in 0..glyph.height {
            // Positive pitch stores the top row first; take rows from the end
            let src_row = if glyph.pitch > 0 {
                glyph.height - 1 - row
            } else {
                row
            };
            let start = src_row as usize * stride;
            surface
                .row_mut(&placement, row)
                .copy_from_slice(&glyph.pixels[start..start + width]);
        }

        Ok(placement)
    }
}

fn validate_bitmap(glyph: &RasterizedGlyph) -> Result<()> {
    if glyph.width == 0 || glyph.height == 0 {
        return Ok(());
    }

    let stride = glyph.pitch.unsigned_abs() as usize;
    if stride < glyph.width as usize {
        return Err(FaceError::InvalidBitmap {
            code_point: None,
            reason: format!("pitch {} shorter than width {}", glyph.pitch, glyph.width),
        });
    }

    let required = stride * (glyph.height as usize - 1) + glyph.width as usize;
    if glyph.pixels.len() < required {
        return Err(FaceError::InvalidBitmap {
            code_point: None,
            reason: format!(
                "buffer holds {} bytes, {}x{} bitmap with pitch {} needs {}",
                glyph.pixels.len(),
                glyph.width,
                glyph.height,
                glyph.pitch,
                required
            ),
        });
    }

    Ok(())
}
