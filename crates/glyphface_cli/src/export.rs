//! File outputs for atlas builds
//!
//! [`PngExport`] stands in for a GPU upload: it receives the finished atlas
//! and writes it as a grayscale PNG. [`write_geometry_json`] dumps the
//! geometry table and render records of a loaded face.

use anyhow::{Context, Result};
use glyphface_text::{AtlasSurface, Face, FaceError, GeometryTable, Rasterizer, UploadSink};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Upload sink writing the atlas to a PNG file
#[derive(Debug)]
pub struct PngExport {
    path: PathBuf,
}

impl PngExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UploadSink for PngExport {
    fn upload(&mut self, atlas: &AtlasSurface, _geometry: &GeometryTable) -> glyphface_text::Result<()> {
        write_atlas_png(atlas, &self.path).map_err(|e| FaceError::Upload(format!("{:#}", e)))
    }
}

/// Write the atlas as a top-down grayscale PNG
pub fn write_atlas_png(atlas: &AtlasSurface, path: &Path) -> Result<()> {
    let (width, height) = atlas.dimensions();
    let image = image::GrayImage::from_raw(width, height, atlas.pixels().to_vec())
        .context("Atlas buffer does not match its dimensions")?;

    // Atlas rows are stored bottom-up
    let image = image::imageops::flip_vertical(&image);

    ensure_parent(path)?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote atlas {}", path.display());
    Ok(())
}

/// Build the JSON document describing a loaded face
pub fn geometry_json<R: Rasterizer>(face: &Face<R>) -> Result<serde_json::Value> {
    let geometry = face.geometry()?;
    let atlas = face.atlas()?;
    let metrics = face.global_metrics();

    let mut records: Vec<_> = face.glyphs()?.iter().collect();
    records.sort_by_key(|(cp, _)| *cp);

    let glyphs: Vec<_> = records
        .iter()
        .map(|(cp, record)| {
            json!({
                "code_point": cp,
                "index_offset": record.index_offset,
                "first_index": record.first_index(),
                "advance": record.advance,
            })
        })
        .collect();

    let vertices: Vec<_> = geometry
        .vertices()
        .iter()
        .map(|v| {
            json!({
                "position": v.position,
                "tex_coords": v.tex_coords,
            })
        })
        .collect();

    Ok(json!({
        "pixel_size": face.pixel_size(),
        "atlas_size": atlas.size(),
        "metrics": {
            "ascender": metrics.ascender,
            "descender": metrics.descender,
            "line_gap": metrics.line_gap,
            "line_height": metrics.line_height,
        },
        "glyphs": glyphs,
        "vertices": vertices,
        "indices": geometry.indices(),
    }))
}

/// Write [`geometry_json`] to a file
pub fn write_geometry_json<R: Rasterizer>(face: &Face<R>, path: &Path) -> Result<()> {
    let document = geometry_json(face)?;
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote geometry {}", path.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
