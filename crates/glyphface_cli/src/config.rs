//! glyphface configuration file handling
//!
//! `glyphface.toml` describes one atlas build:
//!
//! ```toml
//! [font]
//! path = "fonts/DejaVuSans.ttf"
//! size = 32
//!
//! [atlas]
//! size = 256
//!
//! [glyphs]
//! chars = "€"
//! ranges = ["32-126", "U+00A0-U+00FF"]
//!
//! [output]
//! atlas = "atlas.png"
//! geometry = "geometry.json"
//! ```
//!
//! Command-line flags override values from the file.

use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE: &str = "glyphface.toml";

/// Complete build configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GlyphfaceConfig {
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub atlas: AtlasConfig,
    #[serde(default)]
    pub glyphs: GlyphsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FontConfig {
    /// Font file path
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Pixels per em
    #[serde(default = "default_pixel_size")]
    pub size: u32,
}

fn default_pixel_size() -> u32 {
    32
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            size: default_pixel_size(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AtlasConfig {
    /// Side length of the square atlas in pixels
    #[serde(default = "default_atlas_size")]
    pub size: u32,
}

fn default_atlas_size() -> u32 {
    glyphface_text::atlas::DEFAULT_ATLAS_SIZE
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            size: default_atlas_size(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GlyphsConfig {
    /// Individual characters to load, in order
    #[serde(default)]
    pub chars: String,
    /// Inclusive code point ranges, `"32-126"` or `"U+0020-U+007E"`
    #[serde(default = "default_ranges")]
    pub ranges: Vec<String>,
}

fn default_ranges() -> Vec<String> {
    vec!["32-126".to_string()]
}

impl Default for GlyphsConfig {
    fn default() -> Self {
        Self {
            chars: String::new(),
            ranges: default_ranges(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OutputConfig {
    /// PNG file for the atlas image
    #[serde(default = "default_atlas_output")]
    pub atlas: PathBuf,
    /// JSON file for vertices, indices and render records
    #[serde(default)]
    pub geometry: Option<PathBuf>,
}

fn default_atlas_output() -> PathBuf {
    PathBuf::from("atlas.png")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            atlas: default_atlas_output(),
            geometry: None,
        }
    }
}

impl GlyphfaceConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load `glyphface.toml` from a directory if it exists
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GlyphfaceConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Ordered, de-duplicated code points to load.
    ///
    /// Code point 0 (the fallback glyph) always comes first, followed by
    /// `chars` and then each range in order.
    pub fn code_points(&self) -> Result<Vec<u32>> {
        let mut code_points = IndexSet::new();
        code_points.insert(0u32);
        code_points.extend(self.glyphs.chars.chars().map(u32::from));
        for range in &self.glyphs.ranges {
            let (start, end) = parse_range(range)?;
            // Surrogates are not scalar values
            code_points.extend((start..=end).filter(|&cp| char::from_u32(cp).is_some()));
        }
        Ok(code_points.into_iter().collect())
    }
}

/// Parse `"A-B"` or a single code point, decimal or `U+`/`0x` hexadecimal
pub fn parse_range(range: &str) -> Result<(u32, u32)> {
    let range = range.trim();
    let (start, end) = match range.split_once('-') {
        Some((start, end)) => (parse_code_point(start)?, parse_code_point(end)?),
        None => {
            let cp = parse_code_point(range)?;
            (cp, cp)
        }
    };

    if start > end {
        anyhow::bail!("Invalid range '{}': start is after end", range);
    }
    if end > char::MAX as u32 {
        anyhow::bail!(
            "Invalid range '{}': end is past U+{:X}",
            range,
            char::MAX as u32
        );
    }
    Ok((start, end))
}

fn parse_code_point(value: &str) -> Result<u32> {
    let value = value.trim();
    let hex = value
        .strip_prefix("U+")
        .or_else(|| value.strip_prefix("u+"))
        .or_else(|| value.strip_prefix("0x"));

    let parsed = match hex {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => value.parse::<u32>(),
    };
    parsed.with_context(|| format!("Invalid code point '{}'", value))
}
