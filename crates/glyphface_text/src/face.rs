//! Face building
//!
//! A [`Face`] owns a rasterizer for one font at one pixel size. Loading
//! glyphs rasterizes each requested code point in order, packs it into the
//! atlas, emits its quad and records where its indices start. The finished
//! atlas and geometry are handed to an [`UploadSink`] and kept for queries.

use crate::atlas::{AtlasOptions, AtlasSurface};
use crate::geometry::GeometryTable;
use crate::placer::GlyphPlacer;
use crate::rasterizer::{GlobalMetrics, RasterizedGlyph, Rasterizer, SwashRasterizer};
use crate::table::{GlyphTable, RenderRecord, FALLBACK_CODE_POINT};
use crate::upload::UploadSink;
use crate::{FaceError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Per-build state: the atlas being packed, the geometry being emitted and
/// the records collected so far
#[derive(Debug, Default)]
pub struct FaceBuilder {
    surface: AtlasSurface,
    geometry: GeometryTable,
    glyphs: GlyphTable,
}

impl FaceBuilder {
    /// Start a build with an empty atlas
    pub fn new(options: AtlasOptions) -> Self {
        Self {
            surface: AtlasSurface::with_options(options),
            geometry: GeometryTable::new(),
            glyphs: GlyphTable::new(),
        }
    }

    /// Rasterize one code point and add it to the build
    pub fn add_glyph<R: Rasterizer + ?Sized>(
        &mut self,
        rasterizer: &mut R,
        code_point: u32,
    ) -> Result<RenderRecord> {
        let glyph = rasterizer.rasterize(code_point)?;
        self.add_rasterized(code_point, &glyph)
    }

    /// Add an already rasterized glyph to the build
    pub fn add_rasterized(&mut self, code_point: u32, glyph: &RasterizedGlyph) -> Result<RenderRecord> {
        let placement = GlyphPlacer::place(&mut self.surface, glyph)
            .map_err(|e| e.for_code_point(code_point))?;

        let index_offset = self
            .geometry
            .emit_quad(&glyph.metrics, &placement, self.surface.size());

        let record = RenderRecord {
            index_offset,
            advance: glyph.metrics.advance_px(),
        };
        self.glyphs.insert(code_point, record);

        debug!(
            "Placed U+{:04X} {}x{} at ({}, {}), index offset {}",
            code_point, placement.width, placement.height, placement.x, placement.y, index_offset
        );

        Ok(record)
    }

    /// The atlas packed so far
    pub fn surface(&self) -> &AtlasSurface {
        &self.surface
    }

    /// The geometry emitted so far
    pub fn geometry(&self) -> &GeometryTable {
        &self.geometry
    }

    /// The records collected so far
    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }
}

#[derive(Debug)]
enum FaceState {
    Opened,
    GlyphsLoaded(FaceBuilder),
}

/// A font at a fixed pixel size with its packed glyph atlas
///
/// Not `Clone`: the face exclusively owns its rasterizer and font data, which
/// are released when it is dropped.
pub struct Face<R: Rasterizer = SwashRasterizer> {
    rasterizer: R,
    options: AtlasOptions,
    state: FaceState,
}

impl Face<SwashRasterizer> {
    /// Open a font file at `pixel_size` pixels per em with a default atlas
    pub fn open(path: impl AsRef<Path>, pixel_size: u32) -> Result<Self> {
        Self::open_with(path, pixel_size, AtlasOptions::default())
    }

    /// Open a font file with explicit atlas options
    pub fn open_with(path: impl AsRef<Path>, pixel_size: u32, options: AtlasOptions) -> Result<Self> {
        let rasterizer = SwashRasterizer::open(path.as_ref(), 0, pixel_size)?;
        info!(
            "Opened {} at {}px",
            rasterizer.font().family_name(),
            pixel_size
        );
        Ok(Self::with_rasterizer(rasterizer, options))
    }
}

impl<R: Rasterizer> Face<R> {
    /// Create a face around any rasterizer backend
    pub fn with_rasterizer(rasterizer: R, options: AtlasOptions) -> Self {
        Self {
            rasterizer,
            options,
            state: FaceState::Opened,
        }
    }

    /// Rasterize and pack `code_points` in the given order, then hand the
    /// atlas and geometry to `sink`.
    ///
    /// The sequence must contain code point 0, whose record answers lookups
    /// for code points that were not loaded. A face can be loaded once; on
    /// any error nothing is kept and the face stays unloaded.
    pub fn load_glyphs<I, S>(&mut self, code_points: I, mut sink: S) -> Result<()>
    where
        I: IntoIterator<Item = u32>,
        S: UploadSink,
    {
        if self.is_loaded() {
            return Err(FaceError::AlreadyLoaded);
        }

        let code_points: Vec<u32> = code_points.into_iter().collect();
        if !code_points.contains(&FALLBACK_CODE_POINT) {
            return Err(FaceError::MissingFallback);
        }

        let mut builder = FaceBuilder::new(self.options);
        for &code_point in &code_points {
            builder.add_glyph(&mut self.rasterizer, code_point)?;
        }

        sink.upload(&builder.surface, &builder.geometry)?;

        info!(
            "Loaded {} glyphs ({} requested) into {}x{} atlas, {:.1}% used",
            builder.glyphs.len(),
            code_points.len(),
            builder.surface.size(),
            builder.surface.size(),
            builder.surface.utilization() * 100.0
        );

        self.state = FaceState::GlyphsLoaded(builder);
        Ok(())
    }

    /// Whether glyphs have been loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, FaceState::GlyphsLoaded(_))
    }

    fn loaded(&self) -> Result<&FaceBuilder> {
        match &self.state {
            FaceState::GlyphsLoaded(data) => Ok(data),
            FaceState::Opened => Err(FaceError::NotLoaded),
        }
    }

    /// Render record for a code point, or for code point 0 if it was not
    /// loaded
    pub fn lookup(&self, code_point: u32) -> Result<RenderRecord> {
        self.loaded()?.glyphs.lookup(code_point)
    }

    /// The packed atlas
    pub fn atlas(&self) -> Result<&AtlasSurface> {
        Ok(&self.loaded()?.surface)
    }

    /// Atlas pixels, bottom row first
    pub fn atlas_pixels(&self) -> Result<&[u8]> {
        Ok(self.loaded()?.surface.pixels())
    }

    /// Quad vertices and indices for every loaded glyph
    pub fn geometry(&self) -> Result<&GeometryTable> {
        Ok(&self.loaded()?.geometry)
    }

    /// All render records
    pub fn glyphs(&self) -> Result<&GlyphTable> {
        Ok(&self.loaded()?.glyphs)
    }

    /// Font-wide metrics from the rasterizer
    pub fn global_metrics(&self) -> GlobalMetrics {
        self.rasterizer.global_metrics()
    }

    /// Pixels per em
    pub fn pixel_size(&self) -> u32 {
        self.rasterizer.pixel_size()
    }

    /// Atlas options used for loading
    pub fn options(&self) -> AtlasOptions {
        self.options
    }

    /// The rasterizer backend
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }
}

impl<R: Rasterizer> std::fmt::Debug for Face<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Face")
            .field("pixel_size", &self.rasterizer.pixel_size())
            .field("options", &self.options)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::INDEX_SIZE;
    use crate::rasterizer::GlyphMetrics;

    /// Rasterizer producing solid `side x side` squares whose pixel value is
    /// the low byte of the code point
    struct SquareRasterizer {
        side: u32,
        calls: Vec<u32>,
    }

    impl SquareRasterizer {
        fn new(side: u32) -> Self {
            Self {
                side,
                calls: Vec::new(),
            }
        }
    }

    impl Rasterizer for SquareRasterizer {
        fn rasterize(&mut self, code_point: u32) -> Result<RasterizedGlyph> {
            self.calls.push(code_point);
            let side = self.side;
            Ok(RasterizedGlyph {
                width: side,
                height: side,
                pitch: side as i32,
                pixels: vec![(code_point & 0xFF) as u8; (side * side) as usize],
                metrics: GlyphMetrics::from_pixels(side as f32 + 0.5, 1, side as i32, side, side),
            })
        }

        fn global_metrics(&self) -> GlobalMetrics {
            GlobalMetrics {
                pixel_size: self.side,
                ascender: 12.0,
                descender: -4.0,
                line_gap: 1.0,
                line_height: 17.0,
            }
        }

        fn pixel_size(&self) -> u32 {
            self.side
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        uploads: usize,
        pixels: Vec<u8>,
        index_count: usize,
    }

    impl UploadSink for RecordingSink {
        fn upload(&mut self, atlas: &AtlasSurface, geometry: &GeometryTable) -> Result<()> {
            self.uploads += 1;
            self.pixels = atlas.pixels().to_vec();
            self.index_count = geometry.indices().len();
            Ok(())
        }
    }

    struct FailingSink;

    impl UploadSink for FailingSink {
        fn upload(&mut self, _atlas: &AtlasSurface, _geometry: &GeometryTable) -> Result<()> {
            Err(FaceError::Upload("device lost".to_string()))
        }
    }

    fn face(side: u32, atlas: u32) -> Face<SquareRasterizer> {
        Face::with_rasterizer(SquareRasterizer::new(side), AtlasOptions { size: atlas })
    }

    #[test]
    fn test_index_offsets_follow_request_order() {
        let mut face = face(4, 32);
        face.load_glyphs([0, 1], crate::upload::NoUpload).unwrap();

        assert_eq!(face.lookup(0).unwrap().index_offset, 0);
        assert_eq!(face.lookup(1).unwrap().index_offset, 6 * INDEX_SIZE);
        assert_eq!(face.lookup(1).unwrap().advance, 4.5);
    }

    #[test]
    fn test_unknown_code_point_uses_fallback() {
        let mut face = face(4, 32);
        face.load_glyphs([0, 'a' as u32], crate::upload::NoUpload).unwrap();

        assert_eq!(face.lookup('z' as u32).unwrap(), face.lookup(0).unwrap());
    }

    #[test]
    fn test_rasterizes_in_request_order() {
        let mut face = face(4, 32);
        face.load_glyphs([66, 0, 65], crate::upload::NoUpload).unwrap();

        assert_eq!(face.rasterizer().calls, vec![66, 0, 65]);
        let atlas = face.atlas().unwrap();
        assert_eq!(atlas.pixel(0, 0), 66);
        assert_eq!(atlas.pixel(4, 0), 0);
        assert_eq!(atlas.pixel(8, 0), 65);
    }

    #[test]
    fn test_sink_receives_finished_data() {
        let mut face = face(4, 16);
        let mut sink = RecordingSink::default();
        face.load_glyphs([0, 7, 9], &mut sink).unwrap();

        assert_eq!(sink.uploads, 1);
        assert_eq!(sink.pixels, face.atlas_pixels().unwrap());
        assert_eq!(sink.index_count, 18);
        assert_eq!(face.geometry().unwrap().vertices().len(), 12);
    }

    #[test]
    fn test_duplicate_code_point_last_write_wins() {
        let mut face = face(4, 32);
        face.load_glyphs([0, 65, 65], crate::upload::NoUpload).unwrap();

        assert_eq!(face.lookup(65).unwrap().index_offset, 12 * INDEX_SIZE);
        assert_eq!(face.geometry().unwrap().quad_count(), 3);
        assert_eq!(face.glyphs().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_fallback_rejected_before_rasterizing() {
        let mut face = face(4, 32);
        let result = face.load_glyphs([65, 66], crate::upload::NoUpload);

        assert!(matches!(result, Err(FaceError::MissingFallback)));
        assert!(face.rasterizer().calls.is_empty());
        assert!(!face.is_loaded());
    }

    #[test]
    fn test_second_load_rejected() {
        let mut face = face(4, 32);
        face.load_glyphs([0], crate::upload::NoUpload).unwrap();

        assert!(matches!(
            face.load_glyphs([0, 65], crate::upload::NoUpload),
            Err(FaceError::AlreadyLoaded)
        ));
        assert_eq!(face.glyphs().unwrap().len(), 1);
    }

    #[test]
    fn test_queries_before_load() {
        let face = face(4, 32);
        assert!(matches!(face.lookup(0), Err(FaceError::NotLoaded)));
        assert!(matches!(face.atlas(), Err(FaceError::NotLoaded)));
        assert!(matches!(face.geometry(), Err(FaceError::NotLoaded)));
        assert_eq!(face.global_metrics().line_height, 17.0);
        assert_eq!(face.pixel_size(), 4);
    }

    #[test]
    fn test_atlas_full_reports_code_point() {
        // 8x8 atlas holds four 4x4 glyphs
        let mut face = face(4, 8);
        let result = face.load_glyphs([0, 1, 2, 3, 4], crate::upload::NoUpload);

        match result {
            Err(FaceError::AtlasFull { code_point, .. }) => assert_eq!(code_point, Some(4)),
            other => panic!("expected AtlasFull, got {:?}", other),
        }
        assert!(!face.is_loaded());
    }

    #[test]
    fn test_glyph_too_large_reports_code_point() {
        let mut face = face(20, 16);
        match face.load_glyphs([0], crate::upload::NoUpload) {
            Err(FaceError::GlyphTooLarge {
                code_point,
                atlas_size,
                ..
            }) => {
                assert_eq!(code_point, Some(0));
                assert_eq!(atlas_size, 16);
            }
            other => panic!("expected GlyphTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_upload_keeps_face_unloaded() {
        let mut face = face(4, 16);
        assert!(matches!(
            face.load_glyphs([0, 1], FailingSink),
            Err(FaceError::Upload(_))
        ));
        assert!(!face.is_loaded());

        face.load_glyphs([0, 1], crate::upload::NoUpload).unwrap();
        assert!(face.is_loaded());
    }

    #[test]
    fn test_builder_standalone() {
        let mut rasterizer = SquareRasterizer::new(3);
        let mut builder = FaceBuilder::new(AtlasOptions { size: 8 });

        let first = builder.add_glyph(&mut rasterizer, 0).unwrap();
        let second = builder.add_glyph(&mut rasterizer, 1).unwrap();

        assert_eq!(first.index_offset, 0);
        assert_eq!(second.first_index(), 6);
        assert_eq!(builder.surface().cursor().cursor_x, 6);
        assert_eq!(builder.glyphs().len(), 2);
        assert_eq!(builder.geometry().quad_count(), 2);
    }
}
