//! Hand-off of finished atlas data to a consumer (usually the GPU)

use crate::atlas::AtlasSurface;
use crate::geometry::GeometryTable;
use crate::Result;

/// Receives the finished atlas pixels and glyph geometry once per build
///
/// Implementations create textures and buffers (see `glyphface_gpu`) or
/// write the data somewhere else. Failures should be reported as
/// [`FaceError::Upload`](crate::FaceError::Upload).
pub trait UploadSink {
    /// Take the atlas surface and geometry of a finished build
    fn upload(&mut self, atlas: &AtlasSurface, geometry: &GeometryTable) -> Result<()>;
}

impl<T: UploadSink + ?Sized> UploadSink for &mut T {
    fn upload(&mut self, atlas: &AtlasSurface, geometry: &GeometryTable) -> Result<()> {
        (**self).upload(atlas, geometry)
    }
}

/// Sink that keeps nothing, for callers that read the face directly
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUpload;

impl UploadSink for NoUpload {
    fn upload(&mut self, _atlas: &AtlasSurface, _geometry: &GeometryTable) -> Result<()> {
        Ok(())
    }
}
