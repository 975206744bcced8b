//! WGSL shaders

/// Glyph quad shader
///
/// Bindings (group 0):
/// - 0: `GlyphUniforms` uniform buffer
/// - 1: atlas texture (`R8Unorm`)
/// - 2: atlas sampler
pub const GLYPH_SHADER: &str = r#"
// ============================================================================
// glyphface Glyph Shader
// ============================================================================

struct GlyphUniforms {
    // Pixel space to clip space
    transform: mat4x4<f32>,
    // Pen position in pixels (x, y, unused, unused)
    pen: vec4<f32>,
    // Text color
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: GlyphUniforms;
@group(0) @binding(1) var glyph_atlas: texture_2d<f32>;
@group(0) @binding(2) var glyph_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
}

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = vec4<f32>(vertex.position.xy + uniforms.pen.xy, vertex.position.z, 1.0);
    out.position = uniforms.transform * world;
    out.tex_coords = vertex.tex_coords;
    return out;
}

@fragment
fn fs_main(frag: VertexOutput) -> @location(0) vec4<f32> {
    let coverage = textureSample(glyph_atlas, glyph_sampler, frag.tex_coords).r;
    return vec4<f32>(uniforms.color.rgb, uniforms.color.a * coverage);
}
"#;
