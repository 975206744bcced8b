//! Glyph atlas building for GPU text rendering
//!
//! This crate provides:
//! - Font loading and validation (TTF/OTF via ttf-parser)
//! - Glyph rasterization (swash)
//! - Shelf packing of glyph bitmaps into a fixed-size atlas
//! - Quad geometry (vertices + triangle indices) per glyph
//! - Code point lookup of per-glyph render records
//!
//! Uploading the results to the GPU is left to an [`UploadSink`].

pub mod atlas;
pub mod face;
pub mod font;
pub mod geometry;
pub mod placer;
pub mod rasterizer;
pub mod table;
pub mod upload;

pub use atlas::{AtlasOptions, AtlasSurface, Placement, ShelfCursor};
pub use face::{Face, FaceBuilder};
pub use font::{FontFace, FontMetrics};
pub use geometry::{GeometryTable, Vertex};
pub use placer::GlyphPlacer;
pub use rasterizer::{GlobalMetrics, GlyphMetrics, RasterizedGlyph, Rasterizer, SwashRasterizer};
pub use table::{GlyphTable, RenderRecord, FALLBACK_CODE_POINT};
pub use upload::UploadSink;

use thiserror::Error;

/// Glyph atlas build errors
#[derive(Error, Debug)]
pub enum FaceError {
    #[error("Failed to open font {path}: {reason}")]
    FontOpenFailed { path: String, reason: String },

    #[error("Failed to parse font: {0}")]
    FontParse(String),

    #[error("Glyph {width}x{height} (code point {code_point:?}) exceeds the {atlas_size}x{atlas_size} atlas")]
    GlyphTooLarge {
        code_point: Option<u32>,
        width: u32,
        height: u32,
        atlas_size: u32,
    },

    #[error("Atlas is full, cannot place {width}x{height} glyph (code point {code_point:?}) at {cursor}")]
    AtlasFull {
        code_point: Option<u32>,
        width: u32,
        height: u32,
        cursor: ShelfCursor,
    },

    #[error("Invalid bitmap for code point {code_point:?}: {reason}")]
    InvalidBitmap {
        code_point: Option<u32>,
        reason: String,
    },

    #[error("Failed to rasterize code point {code_point}: {reason}")]
    Rasterize { code_point: u32, reason: String },

    #[error("Fallback glyph (code point 0) is missing")]
    MissingFallback,

    #[error("Glyphs have already been loaded for this face")]
    AlreadyLoaded,

    #[error("Glyphs have not been loaded yet")]
    NotLoaded,

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl FaceError {
    /// Attach the code point being processed to placement errors raised by
    /// the atlas, which only knows about rectangles.
    pub(crate) fn for_code_point(self, cp: u32) -> Self {
        match self {
            FaceError::GlyphTooLarge {
                width,
                height,
                atlas_size,
                ..
            } => FaceError::GlyphTooLarge {
                code_point: Some(cp),
                width,
                height,
                atlas_size,
            },
            FaceError::AtlasFull {
                width,
                height,
                cursor,
                ..
            } => FaceError::AtlasFull {
                code_point: Some(cp),
                width,
                height,
                cursor,
            },
            FaceError::InvalidBitmap { reason, .. } => FaceError::InvalidBitmap {
                code_point: Some(cp),
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, FaceError>;
