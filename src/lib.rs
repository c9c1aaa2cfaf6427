// Library exports for qrstudio

pub mod content;
pub mod error;
pub mod matrix;
pub mod parser;
pub mod presets;
pub mod readiness;
pub mod style;

// Rendering pipeline
pub mod ir;
pub mod compiler;
pub mod raster;
pub mod vector;
pub mod surface;

// Session plumbing
pub mod scheduler;
pub mod session;
pub mod export;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use content::{ContentFields, ContentType};
pub use error::{EncodeError, ExportError, FormatError, QrStudioError, StyleError};
pub use export::{ExportArtifact, Exporter, ShareRequest, ShareSink};
pub use matrix::{EcLevel, Matrix, QrCodeGenEncoder, SymbolEncoder};
pub use presets::Preset;
pub use scheduler::{RenderRequest, RenderScheduler};
pub use session::{Action, Session};
pub use style::{Rgb, StyleOverrides, StyleSpec};
pub use surface::{Surface, SurfaceRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
    #[serde(rename = "print")]
    Print,
    #[serde(rename = "all")]
    All,
}

impl OutputFormat {
    pub fn includes_png(self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::All)
    }

    pub fn includes_svg(self) -> bool {
        matches!(self, OutputFormat::Svg | OutputFormat::All)
    }

    pub fn includes_print(self) -> bool {
        matches!(self, OutputFormat::Print | OutputFormat::All)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "print" | "html" => Ok(OutputFormat::Print),
            "all" => Ok(OutputFormat::All),
            other => Err(format!("unknown output format '{}' (png, svg, print, all)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Drawn dimension of the symbol, quiet zone included.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Quiet zone in modules.
    #[serde(default = "default_margin")]
    pub margin: u32,
    #[serde(default = "default_raster_scale")]
    pub raster_scale: u32,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_size() -> u32 { 400 }
fn default_margin() -> u32 { 2 }
fn default_raster_scale() -> u32 { 2 }
fn default_debounce_ms() -> u64 { 500 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 400,
            margin: 2,
            raster_scale: 2,
            debounce_ms: 500,
            format: OutputFormat::Png,
        }
    }
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load options from a JSON file; missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_from_empty_json() {
        let opts = RenderOptions::from_json("{}").unwrap();
        assert_eq!(opts, RenderOptions::default());
        assert_eq!(opts.debounce().as_millis(), 500);
    }

    #[test]
    fn test_options_partial_json() {
        let opts = RenderOptions::from_json(r#"{"size": 256, "format": "all"}"#).unwrap();
        assert_eq!(opts.size, 256);
        assert_eq!(opts.margin, 2);
        assert_eq!(opts.format, OutputFormat::All);
        assert!(opts.format.includes_png());
        assert!(opts.format.includes_svg());
        assert!(opts.format.includes_print());
    }

    #[test]
    fn test_options_reject_unknown_format() {
        assert!(RenderOptions::from_json(r#"{"format": "gif"}"#).is_err());
    }
}
