//! glyphface CLI
//!
//! Build glyph atlases from font files and inspect font metrics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glyphface_text::upload::NoUpload;
use glyphface_text::{AtlasOptions, Face};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod export;

use config::{GlyphfaceConfig, CONFIG_FILE};
use export::PngExport;

#[derive(Parser)]
#[command(name = "glyphface")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Glyph atlas builder", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rasterize glyphs and pack them into an atlas
    Build {
        /// Font file (overrides the config file)
        font: Option<PathBuf>,

        /// Config file (defaults to ./glyphface.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pixels per em
        #[arg(short, long)]
        size: Option<u32>,

        /// Atlas side length in pixels
        #[arg(long)]
        atlas_size: Option<u32>,

        /// Characters to load, in order
        #[arg(long)]
        chars: Option<String>,

        /// Code point range such as 32-126 or U+00A0-U+00FF (repeatable)
        #[arg(short, long = "range")]
        ranges: Vec<String>,

        /// Atlas PNG output path
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Geometry JSON output path
        #[arg(short, long)]
        geometry: Option<PathBuf>,
    },

    /// Show font metrics and how much of an atlas a glyph set uses
    Inspect {
        /// Font file
        font: PathBuf,

        /// Pixels per em
        #[arg(short, long, default_value = "32")]
        size: u32,

        /// Atlas side length in pixels
        #[arg(long, default_value = "256")]
        atlas_size: u32,
    },

    /// Write a default glyphface.toml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Build {
            font,
            config,
            size,
            atlas_size,
            chars,
            ranges,
            out,
            geometry,
        } => {
            let mut config = match config {
                Some(path) => GlyphfaceConfig::load(&path)?,
                None => GlyphfaceConfig::load_from_dir(Path::new("."))?.unwrap_or_default(),
            };

            if font.is_some() {
                config.font.path = font;
            }
            if let Some(size) = size {
                config.font.size = size;
            }
            if let Some(atlas_size) = atlas_size {
                config.atlas.size = atlas_size;
            }
            if let Some(chars) = chars {
                config.glyphs.chars = chars;
            }
            if !ranges.is_empty() {
                config.glyphs.ranges = ranges;
            }
            if let Some(out) = out {
                config.output.atlas = out;
            }
            if geometry.is_some() {
                config.output.geometry = geometry;
            }

            cmd_build(&config)
        }

        Commands::Inspect {
            font,
            size,
            atlas_size,
        } => cmd_inspect(&font, size, atlas_size),

        Commands::Init => cmd_init(),
    }
}

fn cmd_build(config: &GlyphfaceConfig) -> Result<()> {
    let font_path = config
        .font
        .path
        .as_deref()
        .context("No font given. Pass a font file or set [font] path in glyphface.toml")?;

    let code_points = config.code_points()?;
    info!(
        "Building {}px atlas ({}x{}) for {} code points from {}",
        config.font.size,
        config.atlas.size,
        config.atlas.size,
        code_points.len(),
        font_path.display()
    );

    let mut face = Face::open_with(
        font_path,
        config.font.size,
        AtlasOptions {
            size: config.atlas.size,
        },
    )?;

    face.load_glyphs(code_points, PngExport::new(&config.output.atlas))?;

    if let Some(path) = &config.output.geometry {
        export::write_geometry_json(&face, path)?;
    }

    Ok(())
}

fn cmd_inspect(font: &Path, size: u32, atlas_size: u32) -> Result<()> {
    let mut face = Face::open_with(font, size, AtlasOptions { size: atlas_size })?;
    let rasterizer_font = face.rasterizer().font();
    let metrics = face.global_metrics();

    println!("Family:       {}", rasterizer_font.family_name());
    println!("Glyphs:       {}", rasterizer_font.glyph_count());
    println!("Units/em:     {}", rasterizer_font.metrics().units_per_em);
    println!("Pixel size:   {}", metrics.pixel_size);
    println!("Ascender:     {:.2}", metrics.ascender);
    println!("Descender:    {:.2}", metrics.descender);
    println!("Line gap:     {:.2}", metrics.line_gap);
    println!("Line height:  {:.2}", metrics.line_height);

    let code_points = GlyphfaceConfig::default().code_points()?;
    match face.load_glyphs(code_points, NoUpload) {
        Ok(()) => {
            let atlas = face.atlas()?;
            println!(
                "ASCII atlas:  {:.1}% of {}x{} ({})",
                atlas.utilization() * 100.0,
                atlas_size,
                atlas_size,
                atlas.cursor()
            );
        }
        Err(e) => {
            warn!("ASCII does not fit: {}", e);
            println!("ASCII atlas:  does not fit in {}x{}", atlas_size, atlas_size);
        }
    }

    Ok(())
}

fn cmd_init() -> Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE);
    }

    let content = GlyphfaceConfig::default().to_toml()?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    info!("Created {}", CONFIG_FILE);
    Ok(())
}
