// Raster backend: executes a Scene on a plotters bitmap and encodes PNG.

use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::warn;

use crate::ir::{CornerRadii, Primitive, Rect, Scene};
use crate::style::Rgb;

/// Segments used to approximate each rounded corner.
const ARC_SEGMENTS: usize = 8;

/// RGB8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some(Rgb(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&self.data, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }
        Ok(png_bytes)
    }
}

fn color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Render `scene` at `scale` pixels per logical unit.
pub fn rasterize(scene: &Scene, scale: f64) -> Result<PixelBuffer> {
    if !(scale.is_finite() && scale > 0.0) {
        anyhow::bail!("Invalid raster scale {}", scale);
    }
    let width = (scene.width() * scale).round().max(1.0) as u32;
    let height = (scene.height() * scale).round().max(1.0) as u32;
    let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&color(scene.background))
            .context("Failed to fill background")?;

        for primitive in scene.primitives() {
            draw_primitive(&root, primitive, scale)?;
        }

        root.present().context("Failed to present drawing")?;
    }

    Ok(PixelBuffer { width, height, data: buffer })
}

fn px(v: f64, scale: f64) -> i32 {
    (v * scale).round() as i32
}

/// Pixel corners of `r`, bottom-right exclusive so neighbours do not overlap.
fn pixel_rect(r: &Rect, scale: f64) -> [(i32, i32); 2] {
    let (x0, y0) = (px(r.x, scale), px(r.y, scale));
    let x1 = (px(r.right(), scale) - 1).max(x0);
    let y1 = (px(r.bottom(), scale) - 1).max(y0);
    [(x0, y0), (x1, y1)]
}

fn draw_primitive(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    primitive: &Primitive,
    scale: f64,
) -> Result<()> {
    match primitive {
        Primitive::Rect { rect, fill } => {
            root.draw(&Rectangle::new(pixel_rect(rect, scale), color(*fill).filled()))
                .context("Failed to draw rectangle")?;
        }
        Primitive::RoundedRect { rect, radii, fill } => {
            let points: Vec<(i32, i32)> = rounded_outline(rect, radii)
                .into_iter()
                .map(|(x, y)| (px(x, scale), px(y, scale)))
                .collect();
            root.draw(&Polygon::new(points, color(*fill).filled()))
                .context("Failed to draw rounded rectangle")?;
        }
        Primitive::Circle { cx, cy, r, fill } => {
            let radius = (r * scale).round().max(1.0) as i32;
            root.draw(&Circle::new((px(*cx, scale), px(*cy, scale)), radius, color(*fill).filled()))
                .context("Failed to draw circle")?;
        }
        Primitive::Text { x, y, content, font, size, color: text_color } => {
            let c = color(*text_color);
            let style = TextStyle::from(FontDesc::new(
                FontFamily::from(font.as_str()),
                size * scale,
                FontStyle::Normal,
            ))
            .color(&c)
            .pos(Pos::new(HPos::Center, VPos::Center));
            // Glyph rendering depends on host fonts; keep the rest of the surface.
            if let Err(e) = root.draw_text(content, &style, (px(*x, scale), px(*y, scale))) {
                warn!(error = %e, font = %font, "frame text could not be rasterized");
            }
        }
    }
    Ok(())
}

/// Polygon outline of a rectangle with per-corner arcs, clockwise from the
/// top edge.
pub(crate) fn rounded_outline(rect: &Rect, radii: &CornerRadii) -> Vec<(f64, f64)> {
    use std::f64::consts::{FRAC_PI_2, PI};

    // (corner center, radius, start angle) for tr, br, bl, tl.
    let corners = [
        ((rect.right() - radii.tr, rect.y + radii.tr), radii.tr, -FRAC_PI_2),
        ((rect.right() - radii.br, rect.bottom() - radii.br), radii.br, 0.0),
        ((rect.x + radii.bl, rect.bottom() - radii.bl), radii.bl, FRAC_PI_2),
        ((rect.x + radii.tl, rect.y + radii.tl), radii.tl, PI),
    ];

    let mut points = Vec::with_capacity(4 * (ARC_SEGMENTS + 1));
    for ((cx, cy), r, start) in corners {
        if r <= 0.0 {
            points.push((cx, cy));
            continue;
        }
        for i in 0..=ARC_SEGMENTS {
            let a = start + FRAC_PI_2 * i as f64 / ARC_SEGMENTS as f64;
            points.push((cx + r * a.cos(), cy + r * a.sin()));
        }
    }
    points
}
