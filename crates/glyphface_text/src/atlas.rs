//! Glyph atlas surface
//!
//! A fixed-size square, single-channel texture and the shelf packing cursor
//! that reserves rectangles inside it.
//!
//! Packing is first fit in request order: glyphs fill the current shelf left
//! to right, and a new shelf opens above it when the next glyph does not fit
//! in the remaining width. Nothing is sorted, so efficiency depends on the
//! order code points are requested in. Tall glyphs interleaved with short
//! ones waste the space above the short ones for the whole shelf.

use crate::{FaceError, Result};
use std::fmt;

/// Default atlas side length in pixels
pub const DEFAULT_ATLAS_SIZE: u32 = 256;

/// Atlas construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasOptions {
    /// Side length of the square atlas in pixels
    pub size: u32,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_ATLAS_SIZE,
        }
    }
}

/// Rectangle reserved for one glyph in the atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// X position in atlas (pixels)
    pub x: u32,
    /// Y position in atlas (pixels, row 0 is the bottom of the texture)
    pub y: u32,
    /// Width in atlas (pixels)
    pub width: u32,
    /// Height in atlas (pixels)
    pub height: u32,
}

impl Placement {
    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive top edge
    pub fn top(&self) -> u32 {
        self.y + self.height
    }

    /// Whether two placements share at least one pixel
    pub fn intersects(&self, other: &Placement) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

/// Shelf packing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShelfCursor {
    /// Bottom row of the current shelf
    pub baseline: u32,
    /// Tallest glyph placed on the current shelf so far
    pub shelf_height: u32,
    /// Next free column on the current shelf
    pub cursor_x: u32,
}

impl ShelfCursor {
    fn close_shelf(&mut self) {
        self.baseline += self.shelf_height;
        self.shelf_height = 0;
        self.cursor_x = 0;
    }
}

impl fmt::Display for ShelfCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shelf y={} h={} x={}",
            self.baseline, self.shelf_height, self.cursor_x
        )
    }
}

/// Single-channel atlas texture plus its packing cursor
pub struct AtlasSurface {
    /// Side length in pixels
    size: u32,
    /// Pixel data (8-bit intensity, row 0 is the bottom row)
    pixels: Vec<u8>,
    /// Shelf packing state
    cursor: ShelfCursor,
}

impl AtlasSurface {
    /// Create a zeroed atlas with the given side length
    pub fn new(size: u32) -> Self {
        Self {
            size,
            pixels: vec![0; (size as usize) * (size as usize)],
            cursor: ShelfCursor::default(),
        }
    }

    /// Create an atlas from options
    pub fn with_options(options: AtlasOptions) -> Self {
        Self::new(options.size)
    }

    /// Side length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Atlas dimensions (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.size, self.size)
    }

    /// Raw pixel data, `size * size` bytes, bottom row first
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Current packing state
    pub fn cursor(&self) -> ShelfCursor {
        self.cursor
    }

    /// Reserve a rectangle on the current shelf, opening a new shelf when
    /// the current one has no room left.
    pub fn reserve(&mut self, width: u32, height: u32) -> Result<Placement> {
        if width > self.size || height > self.size {
            return Err(FaceError::GlyphTooLarge {
                code_point: None,
                width,
                height,
                atlas_size: self.size,
            });
        }

        if self.cursor.cursor_x + width > self.size {
            self.cursor.close_shelf();
        }

        if self.cursor.baseline + height > self.size {
            return Err(FaceError::AtlasFull {
                code_point: None,
                width,
                height,
                cursor: self.cursor,
            });
        }

        self.cursor.shelf_height = self.cursor.shelf_height.max(height);

        let placement = Placement {
            x: self.cursor.cursor_x,
            y: self.cursor.baseline,
            width,
            height,
        };
        self.cursor.cursor_x += width;

        Ok(placement)
    }

    /// Mutable access to one destination row inside a placement
    pub(crate) fn row_mut(&mut self, placement: &Placement, row: u32) -> &mut [u8] {
        let start = ((placement.y + row) as usize) * (self.size as usize) + placement.x as usize;
        &mut self.pixels[start..start + placement.width as usize]
    }

    /// Read one pixel (row 0 is the bottom row)
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y as usize) * (self.size as usize) + x as usize]
    }

    /// Fraction of atlas rows consumed by closed and open shelves (0.0 to 1.0)
    pub fn utilization(&self) -> f32 {
        let used = self.cursor.baseline + self.cursor.shelf_height;
        used as f32 / self.size as f32
    }
}

impl Default for AtlasSurface {
    fn default() -> Self {
        Self::with_options(AtlasOptions::default())
    }
}

impl fmt::Debug for AtlasSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlasSurface")
            .field("dimensions", &(self.size, self.size))
            .field("cursor", &self.cursor)
            .field(
                "utilization",
                &format!("{:.1}%", self.utilization() * 100.0),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint(placements: &[Placement], size: u32) {
        for (i, a) in placements.iter().enumerate() {
            assert!(a.right() <= size && a.top() <= size, "{:?} out of bounds", a);
            for b in &placements[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_new_surface_is_zeroed() {
        let surface = AtlasSurface::new(16);
        assert_eq!(surface.pixels().len(), 256);
        assert!(surface.pixels().iter().all(|&p| p == 0));
        assert_eq!(surface.cursor(), ShelfCursor::default());
    }

    #[test]
    fn test_default_size() {
        let surface = AtlasSurface::default();
        assert_eq!(surface.dimensions(), (256, 256));
    }

    #[test]
    fn test_shelf_closes_when_row_is_full() {
        let mut surface = AtlasSurface::new(256);

        let first = surface.reserve(200, 10).unwrap();
        let second = surface.reserve(200, 10).unwrap();

        assert_eq!((first.x, first.y), (0, 0));
        assert_eq!((second.x, second.y), (0, 10));
        assert_eq!(surface.cursor().baseline, 10);
        assert_eq!(surface.cursor().cursor_x, 200);
    }

    #[test]
    fn test_shelf_height_tracks_tallest_glyph() {
        let mut surface = AtlasSurface::new(64);

        surface.reserve(20, 5).unwrap();
        surface.reserve(20, 12).unwrap();
        surface.reserve(20, 3).unwrap();
        assert_eq!(surface.cursor().shelf_height, 12);

        let next = surface.reserve(10, 4).unwrap();
        assert_eq!((next.x, next.y), (0, 12));
    }

    #[test]
    fn test_exact_tiling_then_full() {
        let mut surface = AtlasSurface::new(64);
        let mut placements = Vec::new();

        for _ in 0..16 {
            placements.push(surface.reserve(16, 16).unwrap());
        }
        assert_disjoint(&placements, 64);
        assert_eq!(surface.utilization(), 1.0);

        match surface.reserve(1, 1) {
            Err(FaceError::AtlasFull { width, height, .. }) => {
                assert_eq!((width, height), (1, 1));
            }
            other => panic!("expected AtlasFull, got {:?}", other),
        }
    }

    #[test]
    fn test_tall_glyph_on_open_shelf_is_full() {
        let mut surface = AtlasSurface::new(32);
        surface.reserve(32, 20).unwrap();
        surface.reserve(8, 8).unwrap();
        assert!(matches!(
            surface.reserve(8, 13),
            Err(FaceError::AtlasFull { .. })
        ));
    }

    #[test]
    fn test_oversize_rejected_regardless_of_state() {
        let mut surface = AtlasSurface::new(32);
        assert!(matches!(
            surface.reserve(33, 1),
            Err(FaceError::GlyphTooLarge { .. })
        ));

        surface.reserve(10, 10).unwrap();
        assert!(matches!(
            surface.reserve(1, 33),
            Err(FaceError::GlyphTooLarge { atlas_size: 32, .. })
        ));

        // A glyph as large as the atlas is still allowed on an empty surface
        let mut empty = AtlasSurface::new(32);
        assert!(empty.reserve(32, 32).is_ok());
    }

    #[test]
    fn test_zero_sized_reservation() {
        let mut surface = AtlasSurface::new(32);
        surface.reserve(10, 4).unwrap();
        let space = surface.reserve(0, 0).unwrap();
        assert_eq!(space, Placement { x: 10, y: 0, width: 0, height: 0 });
        assert_eq!(surface.cursor().cursor_x, 10);
    }

    #[test]
    fn test_mixed_sizes_never_overlap() {
        let mut surface = AtlasSurface::new(128);
        let mut placements = Vec::new();

        // Deterministic pseudo-random sizes
        let mut seed = 7u32;
        loop {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            let w = 1 + (seed >> 16) % 40;
            let h = 1 + (seed >> 8) % 30;
            match surface.reserve(w, h) {
                Ok(p) => placements.push(p),
                Err(FaceError::AtlasFull { .. }) => break,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert!(placements.len() > 4);
        assert_disjoint(&placements, 128);
    }
}
