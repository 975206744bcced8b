//! Atlas and geometry upload
//!
//! [`WgpuUploader`] is a glyphface [`UploadSink`] that creates the atlas
//! texture and the vertex/index buffers of a face. The resulting
//! [`FaceBuffers`] draw one glyph per `draw_indexed` call.

use glyphface_text::geometry::INDICES_PER_GLYPH;
use glyphface_text::{AtlasSurface, FaceError, GeometryTable, RenderRecord, UploadSink};
use std::sync::Arc;
use tracing::debug;
use wgpu::util::DeviceExt;

/// GPU resources for one loaded face
#[derive(Debug)]
pub struct FaceBuffers {
    /// Glyph atlas texture
    pub texture: wgpu::Texture,
    /// Glyph atlas texture view
    pub view: wgpu::TextureView,
    /// Sampler for the atlas
    pub sampler: wgpu::Sampler,
    /// Quad vertices for every glyph
    pub vertex_buffer: wgpu::Buffer,
    /// Six `u32` indices per glyph
    pub index_buffer: wgpu::Buffer,
    /// Total number of indices
    pub index_count: u32,
}

impl FaceBuffers {
    /// Bind the face geometry to a render pass
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draw one glyph; geometry must already be bound with [`bind`](Self::bind)
    pub fn draw_glyph(&self, pass: &mut wgpu::RenderPass<'_>, record: &RenderRecord) {
        let first = record.first_index();
        pass.draw_indexed(first..first + INDICES_PER_GLYPH as u32, 0, 0..1);
    }
}

/// Upload sink creating wgpu resources
pub struct WgpuUploader {
    /// GPU device for resource creation
    device: Arc<wgpu::Device>,
    /// GPU queue for texture upload
    queue: Arc<wgpu::Queue>,
    /// Resources of the last upload
    buffers: Option<FaceBuffers>,
}

impl WgpuUploader {
    /// Create an uploader for a device
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            buffers: None,
        }
    }

    /// Resources of the last upload
    pub fn buffers(&self) -> Option<&FaceBuffers> {
        self.buffers.as_ref()
    }

    /// Take ownership of the resources of the last upload
    pub fn take_buffers(&mut self) -> Option<FaceBuffers> {
        self.buffers.take()
    }

    fn create_atlas_texture(&self, atlas: &AtlasSurface) -> (wgpu::Texture, wgpu::TextureView) {
        let (width, height) = atlas.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Glyph Atlas Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }
}

impl UploadSink for WgpuUploader {
    fn upload(&mut self, atlas: &AtlasSurface, geometry: &GeometryTable) -> glyphface_text::Result<()> {
        if geometry.indices().is_empty() {
            return Err(FaceError::Upload("no glyph geometry to upload".to_string()));
        }

        let (texture, view) = self.create_atlas_texture(atlas);

        // Nearest filtering keeps glyphs sharp at 1:1 scale
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Glyph Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Glyph Vertex Buffer"),
                contents: geometry.vertex_bytes(),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Glyph Index Buffer"),
                contents: geometry.index_bytes(),
                usage: wgpu::BufferUsages::INDEX,
            });

        debug!(
            "Uploaded {}x{} atlas, {} vertices, {} indices",
            atlas.size(),
            atlas.size(),
            geometry.vertices().len(),
            geometry.indices().len()
        );

        self.buffers = Some(FaceBuffers {
            texture,
            view,
            sampler,
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices().len() as u32,
        });

        Ok(())
    }
}

impl std::fmt::Debug for WgpuUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuUploader")
            .field("uploaded", &self.buffers.is_some())
            .finish()
    }
}
