//! Glyph quad geometry
//!
//! Each glyph becomes four vertices and six indices. Positions are in pixels
//! relative to the pen position on the baseline; texture coordinates point at
//! the glyph's rectangle in the atlas.
//!
//! Vertex layout (32 bytes, matches [`Vertex`]):
//! - position: `vec3<f32>`  offset 0,  location 0
//! - normal: `vec3<f32>`    offset 12, location 1 (always zero)
//! - tex_coords: `vec2<f32>` offset 24, location 2

use crate::atlas::Placement;
use crate::rasterizer::{GlyphMetrics, FIXED_26_6};
use std::mem::size_of;

/// Shader location of the position attribute
pub const POSITION_LOCATION: u32 = 0;
/// Shader location of the normal attribute
pub const NORMAL_LOCATION: u32 = 1;
/// Shader location of the texture coordinate attribute
pub const TEX_COORDS_LOCATION: u32 = 2;

/// Byte offset of the position attribute
pub const POSITION_OFFSET: usize = 0;
/// Byte offset of the normal attribute
pub const NORMAL_OFFSET: usize = 3 * size_of::<f32>();
/// Byte offset of the texture coordinate attribute
pub const TEX_COORDS_OFFSET: usize = 6 * size_of::<f32>();

/// Size of one index in bytes
pub const INDEX_SIZE: usize = size_of::<u32>();
/// Indices emitted per glyph
pub const INDICES_PER_GLYPH: usize = 6;
/// Vertices emitted per glyph
pub const VERTICES_PER_GLYPH: usize = 4;

/// A glyph quad vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in pixels (x, y, z)
    pub position: [f32; 3],
    /// Unused, always zero
    pub normal: [f32; 3],
    /// Atlas texture coordinates (u, v)
    pub tex_coords: [f32; 2],
}

impl Vertex {
    fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, 0.0],
            normal: [0.0; 3],
            tex_coords: [u, v],
        }
    }
}

/// Append-only vertex and index lists for all glyphs of a face
#[derive(Debug, Clone, Default)]
pub struct GeometryTable {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `glyphs` quads
    pub fn with_capacity(glyphs: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(glyphs * VERTICES_PER_GLYPH),
            indices: Vec::with_capacity(glyphs * INDICES_PER_GLYPH),
        }
    }

    /// All vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex data as bytes for buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as bytes for buffer upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of quads emitted so far
    pub fn quad_count(&self) -> usize {
        self.indices.len() / INDICES_PER_GLYPH
    }

    /// Append the quad for one glyph and return the byte offset of its first
    /// index.
    ///
    /// `metrics` are 26.6 fixed point; `placement` is the glyph's rectangle
    /// in an atlas `atlas_size` pixels square.
    pub fn emit_quad(&mut self, metrics: &GlyphMetrics, placement: &Placement, atlas_size: u32) -> usize {
        let unit = FIXED_26_6 as f32;
        let width = metrics.width as f32 / unit;
        let height = metrics.height as f32 / unit;

        let left = metrics.bearing_x as f32 / unit;
        let right = left + width;
        let top = metrics.bearing_y as f32 / unit;
        let bottom = top - height;

        let atlas = atlas_size as f32;
        let u_left = placement.x as f32 / atlas;
        let u_right = u_left + width / atlas;
        let v_bottom = placement.y as f32 / atlas;
        let v_top = v_bottom + height / atlas;

        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[
            Vertex::new(left, bottom, u_left, v_bottom),
            Vertex::new(right, bottom, u_right, v_bottom),
            Vertex::new(left, top, u_left, v_top),
            Vertex::new(right, top, u_right, v_top),
        ]);

        let offset = self.indices.len() * INDEX_SIZE;
        // Two counter-clockwise triangles
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);

        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn metrics_px(bearing_x: i32, bearing_y: i32, width: u32, height: u32) -> GlyphMetrics {
        GlyphMetrics::from_pixels(width as f32 + 1.0, bearing_x, bearing_y, width, height)
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(std::mem::offset_of!(Vertex, position), POSITION_OFFSET);
        assert_eq!(std::mem::offset_of!(Vertex, normal), NORMAL_OFFSET);
        assert_eq!(std::mem::offset_of!(Vertex, tex_coords), TEX_COORDS_OFFSET);
        assert_eq!(TEX_COORDS_OFFSET, 24);
    }

    #[test]
    fn test_quad_positions() {
        let mut table = GeometryTable::new();
        let placement = Placement { x: 0, y: 0, width: 6, height: 10 };
        table.emit_quad(&metrics_px(1, 8, 6, 10), &placement, 256);

        let v = table.vertices();
        assert_eq!(v.len(), 4);
        assert_eq!(v[0].position, [1.0, -2.0, 0.0]);
        assert_eq!(v[1].position, [7.0, -2.0, 0.0]);
        assert_eq!(v[2].position, [1.0, 8.0, 0.0]);
        assert_eq!(v[3].position, [7.0, 8.0, 0.0]);
        assert!(v.iter().all(|v| v.normal == [0.0; 3]));
    }

    #[test]
    fn test_uv_round_trip() {
        let mut table = GeometryTable::new();
        let placement = Placement { x: 37, y: 120, width: 13, height: 21 };
        table.emit_quad(&metrics_px(0, 15, 13, 21), &placement, 256);

        let v = table.vertices();
        let size = 256.0;
        let x = v[0].tex_coords[0] * size;
        let y = v[0].tex_coords[1] * size;
        let w = (v[3].tex_coords[0] - v[0].tex_coords[0]) * size;
        let h = (v[3].tex_coords[1] - v[0].tex_coords[1]) * size;

        assert!((x - 37.0).abs() < EPSILON * size);
        assert!((y - 120.0).abs() < EPSILON * size);
        assert!((w - 13.0).abs() < EPSILON * size);
        assert!((h - 21.0).abs() < EPSILON * size);

        // Corners share edges
        assert_eq!(v[0].tex_coords[1], v[1].tex_coords[1]);
        assert_eq!(v[0].tex_coords[0], v[2].tex_coords[0]);
    }

    #[test]
    fn test_indices_and_offsets() {
        let mut table = GeometryTable::new();
        let placement = Placement { x: 0, y: 0, width: 4, height: 4 };

        let first = table.emit_quad(&metrics_px(0, 4, 4, 4), &placement, 64);
        let second = table.emit_quad(&metrics_px(0, 4, 4, 4), &placement, 64);

        assert_eq!(first, 0);
        assert_eq!(second, 6 * INDEX_SIZE);
        assert_eq!(table.indices(), &[0, 1, 2, 2, 1, 3, 4, 5, 6, 6, 5, 7]);
        assert_eq!(table.quad_count(), 2);
        assert_eq!(table.index_bytes().len(), 12 * INDEX_SIZE);
        assert_eq!(table.vertex_bytes().len(), 8 * size_of::<Vertex>());
    }

    #[test]
    fn test_counter_clockwise_winding() {
        let mut table = GeometryTable::new();
        let placement = Placement { x: 0, y: 0, width: 5, height: 7 };
        table.emit_quad(&metrics_px(0, 7, 5, 7), &placement, 64);

        let v = table.vertices();
        for tri in table.indices().chunks(3) {
            let a = v[tri[0] as usize].position;
            let b = v[tri[1] as usize].position;
            let c = v[tri[2] as usize].position;
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0, "triangle {:?} is not counter-clockwise", tri);
        }
    }
}
