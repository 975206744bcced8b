//! GPU data layouts
//!
//! Vertex buffer layout for [`glyphface_text::Vertex`] and the uniform block
//! used by [`GLYPH_SHADER`](crate::GLYPH_SHADER). Structures use `#[repr(C)]`
//! and implement `bytemuck::Pod` for safe GPU buffer copies.

use glyphface_text::geometry::{
    NORMAL_LOCATION, NORMAL_OFFSET, POSITION_LOCATION, POSITION_OFFSET, TEX_COORDS_LOCATION,
    TEX_COORDS_OFFSET,
};
use glyphface_text::Vertex;

/// Vertex attributes (must match shader `VertexInput`)
pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: POSITION_OFFSET as wgpu::BufferAddress,
        shader_location: POSITION_LOCATION,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: NORMAL_OFFSET as wgpu::BufferAddress,
        shader_location: NORMAL_LOCATION,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: TEX_COORDS_OFFSET as wgpu::BufferAddress,
        shader_location: TEX_COORDS_LOCATION,
    },
];

/// Vertex buffer layout for glyph quads
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Glyph shader uniforms (matches shader `GlyphUniforms`)
///
/// Memory layout:
/// - transform: `mat4x4<f32>` (64 bytes) - pixel space to clip space
/// - pen: `vec4<f32>`         (16 bytes) - (x, y, 0, 0) pen position in pixels
/// - color: `vec4<f32>`       (16 bytes) - text color (RGBA, 0.0-1.0)
/// Total: 96 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphUniforms {
    /// Column-major pixel to clip space transform
    pub transform: [[f32; 4]; 4],
    /// Pen position (x, y, unused, unused)
    pub pen: [f32; 4],
    /// Text color
    pub color: [f32; 4],
}

impl GlyphUniforms {
    /// Uniforms for a viewport `width x height` pixels with the origin at the
    /// bottom-left corner and y pointing up, matching glyph quad positions
    pub fn orthographic(width: f32, height: f32, pen: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            transform: [
                [2.0 / width, 0.0, 0.0, 0.0],
                [0.0, 2.0 / height, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [-1.0, -1.0, 0.0, 1.0],
            ],
            pen: [pen[0], pen[1], 0.0, 0.0],
            color,
        }
    }

    /// Move the pen, keeping transform and color
    pub fn with_pen(mut self, x: f32, y: f32) -> Self {
        self.pen = [x, y, 0.0, 0.0];
        self
    }
}
