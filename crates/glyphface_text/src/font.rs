//! Font loading
//!
//! Provides font parsing via ttf-parser and font metric extraction.

use crate::{FaceError, Result};
use std::path::Path;
use std::sync::Arc;

/// Font metrics in font units (typically 1000 or 2048 units per em)
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Units per em (typically 1000 or 2048)
    pub units_per_em: u16,
    /// Ascender (distance from baseline to top of tallest glyph)
    pub ascender: i16,
    /// Descender (distance from baseline to bottom, typically negative)
    pub descender: i16,
    /// Line gap (additional spacing between lines)
    pub line_gap: i16,
}

impl FontMetrics {
    /// Calculate line height in font units
    pub fn line_height(&self) -> i16 {
        self.ascender - self.descender + self.line_gap
    }

    /// Scale a value from font units to pixels
    pub fn scale(&self, value: i16, pixel_size: f32) -> f32 {
        value as f32 * pixel_size / self.units_per_em as f32
    }

    /// Get ascender in pixels
    pub fn ascender_px(&self, pixel_size: f32) -> f32 {
        self.scale(self.ascender, pixel_size)
    }

    /// Get descender in pixels (typically negative)
    pub fn descender_px(&self, pixel_size: f32) -> f32 {
        self.scale(self.descender, pixel_size)
    }

    /// Get line gap in pixels
    pub fn line_gap_px(&self, pixel_size: f32) -> f32 {
        self.scale(self.line_gap, pixel_size)
    }

    /// Get line height in pixels
    pub fn line_height_px(&self, pixel_size: f32) -> f32 {
        self.scale(self.line_height(), pixel_size)
    }
}

/// A parsed font face
///
/// Owns the font bytes; the data is released when the face is dropped.
pub struct FontFace {
    /// Raw font data (kept alive for the rasterizer)
    data: Arc<Vec<u8>>,
    /// Face index within the font file (for TTC files)
    face_index: u32,
    /// Font metrics
    metrics: FontMetrics,
    /// Number of glyphs in the font
    glyph_count: u16,
    /// Font family name
    family_name: String,
}

impl FontFace {
    /// Load a font from raw TTF/OTF data (uses face index 0)
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_with_index(data, 0)
    }

    /// Load a font from raw TTF/OTF data with a specific face index
    pub fn from_data_with_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        let data = Arc::new(data);

        let face = ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| FaceError::FontParse(format!("{:?}", e)))?;

        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        };

        let family_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::FAMILY)
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let glyph_count = face.number_of_glyphs();

        Ok(Self {
            data,
            face_index,
            metrics,
            glyph_count,
            family_name,
        })
    }

    /// Load a font from a file path
    ///
    /// Both unreadable files and unparseable data are reported as
    /// [`FaceError::FontOpenFailed`].
    pub fn from_file(path: &Path, face_index: u32) -> Result<Self> {
        let open_failed = |reason: String| FaceError::FontOpenFailed {
            path: path.display().to_string(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| open_failed(e.to_string()))?;
        Self::from_data_with_index(data, face_index).map_err(|e| match e {
            FaceError::FontParse(reason) => open_failed(reason),
            other => other,
        })
    }

    /// Get font metrics
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Get number of glyphs
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    /// Get font family name
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Get raw font data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get face index within the font file
    pub fn face_index(&self) -> u32 {
        self.face_index
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family_name", &self.family_name)
            .field("face_index", &self.face_index)
            .field("glyph_count", &self.glyph_count)
            .finish()
    }
}
