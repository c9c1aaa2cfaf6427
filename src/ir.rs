// Scene graph shared by the raster and vector backends.
//
// Everything is expressed in logical units. Backends scale uniformly, so a
// scene rendered at any size keeps the same proportions.

use crate::style::Rgb;

/// Axis-aligned rectangle in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Shrink by `d` on every side.
    pub fn inset(&self, d: f64) -> Rect {
        Rect::new(self.x + d, self.y + d, (self.w - 2.0 * d).max(0.0), (self.h - 2.0 * d).max(0.0))
    }
}

/// Per-corner radii, clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadii {
    pub tl: f64,
    pub tr: f64,
    pub br: f64,
    pub bl: f64,
}

impl CornerRadii {
    pub fn uniform(r: f64) -> Self {
        Self { tl: r, tr: r, br: r, bl: r }
    }

    pub fn is_zero(&self) -> bool {
        self.tl <= 0.0 && self.tr <= 0.0 && self.br <= 0.0 && self.bl <= 0.0
    }
}

/// A single drawing command. Backends execute these blindly, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        fill: Rgb,
    },
    RoundedRect {
        rect: Rect,
        radii: CornerRadii,
        fill: Rgb,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Rgb,
    },
    /// Text centered on `(x, y)`.
    Text {
        x: f64,
        y: f64,
        content: String,
        font: String,
        size: f64,
        color: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderGeometry {
    /// Outer edge of the stroked band.
    pub outer: Rect,
    pub thickness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PillGeometry {
    pub rect: Rect,
    pub radius: f64,
    pub font_size: f64,
}

/// Where everything sits on the canvas. Computed once from the style and
/// reused by every surface.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub width: f64,
    pub height: f64,
    /// Symbol box including its quiet zone.
    pub symbol: Rect,
    pub border: Option<BorderGeometry>,
    pub pill: Option<PillGeometry>,
}

/// Paint order: background, frame group, symbol group.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub layout: FrameLayout,
    pub background: Rgb,
    pub frame: Vec<Primitive>,
    pub symbol: Vec<Primitive>,
}

impl Scene {
    pub fn width(&self) -> f64 {
        self.layout.width
    }

    pub fn height(&self) -> f64 {
        self.layout.height
    }

    pub fn has_frame(&self) -> bool {
        !self.frame.is_empty()
    }

    /// All primitives after the background, in paint order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.frame.iter().chain(self.symbol.iter())
    }
}
