//! Export of the current surface to files, print and share targets.
//!
//! Every export recompiles the scene from the surface's matrix and the
//! style it is given, so PNG, SVG and print output always agree with each
//! other and with the preview.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use crate::compiler::compile_scene;
use crate::content::ContentType;
use crate::error::ExportError;
use crate::ir::Scene;
use crate::raster::rasterize;
use crate::style::StyleSpec;
use crate::surface::Surface;
use crate::vector::{escape_xml, svg_element, to_svg_string};
use crate::RenderOptions;

pub const PNG_MIME: &str = "image/png";
pub const SVG_MIME: &str = "image/svg+xml";
pub const HTML_MIME: &str = "text/html";

const SHARE_TITLE: &str = "QR Code";
const SHARE_TEXT: &str = "Check out this QR code!";

pub fn raster_filename(content_type: ContentType) -> String {
    format!("qr-code-{}.png", content_type.slug())
}

pub fn vector_filename(content_type: ContentType) -> String {
    format!("qr-code-{}.svg", content_type.slug())
}

pub fn print_filename(content_type: ContentType) -> String {
    format!("qr-code-{}-print.html", content_type.slug())
}

/// Bytes ready to hand to a download, file or share target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write into `dir` under the artifact's own filename.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "export written");
        Ok(path)
    }
}

/// What a platform share target receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub text: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub filename: String,
}

/// Platform share capability. Hosts without one pass `None` to
/// [`Exporter::share_raster`].
pub trait ShareSink {
    fn share(&mut self, request: ShareRequest) -> Result<(), ExportError>;
}

#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: RenderOptions,
}

impl Exporter {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn scene(&self, surface: &Surface, style: &StyleSpec) -> Result<Scene, ExportError> {
        let matrix = surface.matrix().ok_or(ExportError::NoContent)?;
        Ok(compile_scene(matrix, style, &self.options))
    }

    /// PNG bytes at `raster_scale` times the preview size.
    pub fn export_raster(
        &self,
        surface: &Surface,
        style: &StyleSpec,
    ) -> Result<Vec<u8>, ExportError> {
        let scene = self.scene(surface, style)?;
        let scale = self.options.raster_scale.max(1) as f64;
        let pixels = rasterize(&scene, scale).context("Failed to compose raster export")?;
        let png = pixels.to_png()?;
        Ok(png)
    }

    /// Standalone SVG document bytes.
    pub fn export_vector(
        &self,
        surface: &Surface,
        style: &StyleSpec,
    ) -> Result<Vec<u8>, ExportError> {
        let scene = self.scene(surface, style)?;
        Ok(to_svg_string(&scene).into_bytes())
    }

    /// HTML page embedding the vector markup and a one-line summary. It
    /// opens the host's print dialog when loaded.
    pub fn compose_print_document(
        &self,
        surface: &Surface,
        style: &StyleSpec,
        summary: &str,
    ) -> Result<String, ExportError> {
        let scene = self.scene(surface, style)?;
        let svg = svg_element(&scene, "100%", "100%");

        let mut doc = String::new();
        doc += "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n";
        doc += "<title>QR Code</title>\n";
        doc += "<style>\n";
        doc += "body { margin: 0; font-family: sans-serif; text-align: center; }\n";
        doc += ".symbol { width: 80mm; margin: 20mm auto 8mm; }\n";
        doc += ".summary { font-size: 11pt; color: #333333; word-break: break-all; }\n";
        doc += "@page { margin: 10mm; }\n";
        doc += "</style>\n</head>\n<body>\n";
        doc += "<div class=\"symbol\">\n";
        doc += &svg;
        doc += "</div>\n";
        doc += &format!("<p class=\"summary\">{}</p>\n", escape_xml(summary));
        doc += "<script>window.onload = function () { window.print(); };</script>\n";
        doc += "</body>\n</html>\n";
        Ok(doc)
    }

    pub fn raster_artifact(
        &self,
        surface: &Surface,
        style: &StyleSpec,
        content_type: ContentType,
    ) -> Result<ExportArtifact, ExportError> {
        Ok(ExportArtifact {
            filename: raster_filename(content_type),
            mime: PNG_MIME,
            bytes: self.export_raster(surface, style)?,
        })
    }

    pub fn vector_artifact(
        &self,
        surface: &Surface,
        style: &StyleSpec,
        content_type: ContentType,
    ) -> Result<ExportArtifact, ExportError> {
        Ok(ExportArtifact {
            filename: vector_filename(content_type),
            mime: SVG_MIME,
            bytes: self.export_vector(surface, style)?,
        })
    }

    pub fn print_artifact(
        &self,
        surface: &Surface,
        style: &StyleSpec,
        content_type: ContentType,
        summary: &str,
    ) -> Result<ExportArtifact, ExportError> {
        Ok(ExportArtifact {
            filename: print_filename(content_type),
            mime: HTML_MIME,
            bytes: self.compose_print_document(surface, style, summary)?.into_bytes(),
        })
    }

    /// Hand the PNG export to a share target.
    ///
    /// Returns `Ok(false)` without composing anything when no target is
    /// available.
    pub fn share_raster(
        &self,
        sink: Option<&mut dyn ShareSink>,
        surface: &Surface,
        style: &StyleSpec,
        content_type: ContentType,
    ) -> Result<bool, ExportError> {
        let Some(sink) = sink else {
            warn!("share requested but no share target is available");
            return Ok(false);
        };
        let artifact = self.raster_artifact(surface, style, content_type)?;
        sink.share(ShareRequest {
            title: SHARE_TITLE.to_string(),
            text: SHARE_TEXT.to_string(),
            bytes: artifact.bytes,
            mime: artifact.mime,
            filename: artifact.filename,
        })?;
        info!(content_type = %content_type, "shared");
        Ok(true)
    }
}
