//! glyphface GPU upload
//!
//! Turns a loaded glyphface atlas into wgpu resources:
//!
//! - **Atlas texture**: `R8Unorm`, clamp-to-edge, nearest filtering
//! - **Geometry**: one vertex buffer and one `Uint32` index buffer for all glyphs
//! - **Drawing**: one `draw_indexed` call per glyph using its render record
//! - **Shader**: a WGSL program consuming the fixed vertex layout

pub mod primitives;
pub mod shaders;
pub mod text;

pub use primitives::{vertex_buffer_layout, GlyphUniforms, VERTEX_ATTRIBUTES};
pub use shaders::GLYPH_SHADER;
pub use text::{FaceBuffers, WgpuUploader};
