//! Rendered preview surface.
//!
//! A [`Surface`] is either a placeholder or a fully drawn symbol. It is
//! replaced wholesale on every render and never partially updated.

use tracing::{debug, warn};

use crate::compiler::compile_scene;
use crate::error::EncodeError;
use crate::ir::Scene;
use crate::matrix::{Matrix, SymbolEncoder, SYMBOL_EC_LEVEL};
use crate::raster::{rasterize, PixelBuffer};
use crate::style::StyleSpec;
use crate::vector;
use crate::RenderOptions;

/// A drawn symbol: the inputs it came from plus both renderings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSurface {
    pub matrix: Matrix,
    pub style: StyleSpec,
    /// Vector node tree shared with the exporters.
    pub scene: Scene,
    /// Preview pixels at logical size.
    pub pixels: PixelBuffer,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Surface {
    /// Nothing to show yet; export stays disabled.
    #[default]
    Placeholder,
    Ready(Box<RenderedSurface>),
}

impl Surface {
    pub fn is_ready(&self) -> bool {
        matches!(self, Surface::Ready(_))
    }

    pub fn rendered(&self) -> Option<&RenderedSurface> {
        match self {
            Surface::Ready(r) => Some(r),
            Surface::Placeholder => None,
        }
    }

    pub fn matrix(&self) -> Option<&Matrix> {
        self.rendered().map(|r| &r.matrix)
    }

    /// SVG markup of the preview, if there is one.
    pub fn to_svg(&self) -> Option<String> {
        self.rendered().map(|r| vector::to_svg_string(&r.scene))
    }
}

/// Turns a matrix and style into a [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct SurfaceRenderer {
    options: RenderOptions,
}

impl SurfaceRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Draw `matrix` with `style`. A missing matrix, or a backend failure,
    /// yields the placeholder rather than a half-drawn symbol.
    pub fn render(&self, matrix: Option<&Matrix>, style: &StyleSpec) -> Surface {
        let Some(matrix) = matrix else {
            return Surface::Placeholder;
        };

        let scene = compile_scene(matrix, style, &self.options);
        match rasterize(&scene, 1.0) {
            Ok(pixels) => {
                debug!(
                    modules = matrix.size(),
                    width = pixels.width,
                    height = pixels.height,
                    frame = style.frame.enabled,
                    "surface rendered"
                );
                Surface::Ready(Box::new(RenderedSurface {
                    matrix: matrix.clone(),
                    style: style.clone(),
                    scene,
                    pixels,
                }))
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "preview rasterization failed");
                Surface::Placeholder
            }
        }
    }

    /// Encode `payload` at the fixed correction level, then render.
    pub fn render_payload(
        &self,
        encoder: &dyn SymbolEncoder,
        payload: &str,
        style: &StyleSpec,
    ) -> Result<Surface, EncodeError> {
        let matrix = encoder.encode(payload, SYMBOL_EC_LEVEL)?;
        Ok(self.render(Some(&matrix), style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{EcLevel, QrCodeGenEncoder};
    use crate::presets;

    struct RejectingEncoder;

    impl SymbolEncoder for RejectingEncoder {
        fn encode(&self, _payload: &str, _level: EcLevel) -> Result<Matrix, EncodeError> {
            Err(EncodeError::Rejected("too long".to_string()))
        }
    }

    fn renderer() -> SurfaceRenderer {
        SurfaceRenderer::new(RenderOptions { size: 120, ..Default::default() })
    }

    #[test]
    fn test_missing_matrix_is_placeholder() {
        let surface = renderer().render(None, &presets::classic().spec);
        assert_eq!(surface, Surface::Placeholder);
        assert!(!surface.is_ready());
        assert!(surface.to_svg().is_none());
    }

    #[test]
    fn test_render_payload_produces_pixels_and_scene() {
        let style = presets::classic().spec;
        let surface = renderer()
            .render_payload(&QrCodeGenEncoder, "https://example.com", &style)
            .unwrap();
        let rendered = surface.rendered().unwrap();
        assert_eq!((rendered.pixels.width, rendered.pixels.height), (120, 120));
        assert_eq!(rendered.style, style);
        assert!(surface.to_svg().unwrap().contains("<g id=\"symbol\""));
    }

    #[test]
    fn test_preview_and_scene_share_aspect_ratio_with_frame() {
        let mut style = presets::ocean().spec;
        style.frame.enabled = true;
        let surface = renderer().render_payload(&QrCodeGenEncoder, "hello", &style).unwrap();
        let r = surface.rendered().unwrap();
        let scene_ratio = r.scene.width() / r.scene.height();
        let pixel_ratio = r.pixels.width as f64 / r.pixels.height as f64;
        assert!((scene_ratio - pixel_ratio).abs() < 0.02);
        assert!(r.pixels.height > 120);
    }

    #[test]
    fn test_encoder_rejection_propagates() {
        let result = renderer().render_payload(&RejectingEncoder, "x", &presets::classic().spec);
        assert_eq!(result, Err(EncodeError::Rejected("too long".to_string())));
    }
}
