use crate::ir::{BorderGeometry, CornerRadii, FrameLayout, PillGeometry, Primitive, Rect, Scene};
use crate::matrix::{Matrix, FINDER_SIZE};
use crate::style::{
    FinderDotShape, FinderSquareShape, FinderStyle, FramePattern, FrameSpec, ModuleShape, Rgb,
    StyleSpec,
};
use crate::RenderOptions;

// =============================================================================
// Frame geometry constants (fractions of the symbol's drawn dimension)
// =============================================================================

/// Border inset around the symbol.
pub const FRAME_INSET_RATIO: f64 = 1.0 / 16.0;
const PILL_HEIGHT_RATIO: f64 = 0.12;
const PILL_MIN_WIDTH_RATIO: f64 = 0.4;
const PILL_FONT_RATIO: f64 = 0.5;
const CHAR_WIDTH_RATIO: f64 = 0.6;
const PILL_PADDING_CHARS: f64 = 2.0;
const GRADIENT_STEPS: usize = 16;

// =============================================================================
// Layout
// =============================================================================

/// Compute canvas size and the placement of symbol, border and pill.
///
/// Pure function of the frame settings and options; the pill width depends
/// only on the character count so every surface agrees on it.
pub fn layout_frame(frame: &FrameSpec, options: &RenderOptions) -> FrameLayout {
    let dim = options.size.max(1) as f64;

    if !frame.enabled {
        return FrameLayout {
            width: dim,
            height: dim,
            symbol: Rect::new(0.0, 0.0, dim, dim),
            border: None,
            pill: None,
        };
    }

    let inset = dim * FRAME_INSET_RATIO;
    let frame_side = dim + 2.0 * inset;

    let pill_size = if frame.text.is_empty() {
        None
    } else {
        let height = dim * PILL_HEIGHT_RATIO;
        let font_size = height * PILL_FONT_RATIO;
        let chars = frame.text.chars().count() as f64;
        let width = f64::max(
            dim * PILL_MIN_WIDTH_RATIO,
            chars * font_size * CHAR_WIDTH_RATIO + PILL_PADDING_CHARS * font_size,
        );
        Some((width, height, font_size))
    };

    let width = match pill_size {
        Some((pill_w, _, _)) => f64::max(frame_side, pill_w + inset),
        None => frame_side,
    };
    let frame_x = (width - frame_side) / 2.0;
    let frame_box = Rect::new(frame_x, 0.0, frame_side, frame_side);

    let (height, pill) = match pill_size {
        Some((pill_w, pill_h, font_size)) => {
            let gap = inset / 2.0;
            let rect = Rect::new((width - pill_w) / 2.0, frame_box.bottom() + gap, pill_w, pill_h);
            (
                rect.bottom() + gap,
                Some(PillGeometry { rect, radius: pill_h / 2.0, font_size }),
            )
        }
        None => (frame_side, None),
    };

    FrameLayout {
        width,
        height,
        symbol: Rect::new(frame_x + inset, inset, dim, dim),
        border: Some(BorderGeometry {
            outer: frame_box.inset(inset / 4.0),
            thickness: inset / 2.0,
        }),
        pill,
    }
}

// =============================================================================
// Scene compilation
// =============================================================================

/// Compile a matrix and style into the scene both backends consume.
pub fn compile_scene(matrix: &Matrix, style: &StyleSpec, options: &RenderOptions) -> Scene {
    let layout = layout_frame(&style.frame, options);

    let mut frame = Vec::new();
    if let Some(border) = &layout.border {
        compile_border(&mut frame, border, &style.frame);
    }
    if let Some(pill) = &layout.pill {
        compile_pill(&mut frame, pill, &style.frame);
    }

    let grid = ModuleGrid::new(matrix, layout.symbol, options.margin);
    let mut symbol = Vec::with_capacity(matrix.dark_count());
    compile_modules(&mut symbol, matrix, &grid, style);
    // Finders last so they are never covered by data modules.
    for (fx, fy) in matrix.finder_origins() {
        compile_finder(&mut symbol, &grid, fx, fy, &style.finder, style.background);
    }

    Scene { layout, background: style.background, frame, symbol }
}

/// Maps module coordinates to logical units.
struct ModuleGrid {
    origin_x: f64,
    origin_y: f64,
    module: f64,
}

impl ModuleGrid {
    fn new(matrix: &Matrix, symbol: Rect, margin: u32) -> Self {
        let span = matrix.size() as f64 + 2.0 * margin as f64;
        let module = symbol.w / span;
        Self {
            origin_x: symbol.x + margin as f64 * module,
            origin_y: symbol.y + margin as f64 * module,
            module,
        }
    }

    fn cell(&self, x: usize, y: usize, span: usize) -> Rect {
        Rect::new(
            self.origin_x + x as f64 * self.module,
            self.origin_y + y as f64 * self.module,
            span as f64 * self.module,
            span as f64 * self.module,
        )
    }
}

fn compile_modules(
    out: &mut Vec<Primitive>,
    matrix: &Matrix,
    grid: &ModuleGrid,
    style: &StyleSpec,
) {
    let n = matrix.size();
    let fill = style.module.color;
    let m = grid.module;

    // Neighbours inside finder regions do not count, so data modules next to
    // a finder still get their exposed corners shaped.
    let dark = |x: i64, y: i64| {
        matrix.get(x, y) && !matrix.is_finder_module(x as usize, y as usize)
    };

    for y in 0..n {
        for x in 0..n {
            if !matrix.get(x as i64, y as i64) || matrix.is_finder_module(x, y) {
                continue;
            }
            let rect = grid.cell(x, y, 1);
            let (xi, yi) = (x as i64, y as i64);
            let top = !dark(xi, yi - 1);
            let right = !dark(xi + 1, yi);
            let bottom = !dark(xi, yi + 1);
            let left = !dark(xi - 1, yi);

            let radii = match style.module.shape {
                ModuleShape::Square => CornerRadii::default(),
                ModuleShape::Dot => {
                    let (cx, cy) = rect.center();
                    out.push(Primitive::Circle { cx, cy, r: m / 2.0, fill });
                    continue;
                }
                ModuleShape::Rounded => CornerRadii {
                    tl: corner(top && left, m / 2.0),
                    tr: corner(top && right, m / 2.0),
                    br: corner(bottom && right, m / 2.0),
                    bl: corner(bottom && left, m / 2.0),
                },
                ModuleShape::Classy => CornerRadii {
                    tl: corner(top && left, m),
                    br: corner(bottom && right, m),
                    ..CornerRadii::default()
                },
                ModuleShape::ClassyRounded => CornerRadii {
                    tl: corner(top && left, m * 0.75),
                    tr: corner(top && right, m * 0.25),
                    br: corner(bottom && right, m * 0.75),
                    bl: corner(bottom && left, m * 0.25),
                },
            };

            if radii.is_zero() {
                out.push(Primitive::Rect { rect, fill });
            } else {
                out.push(Primitive::RoundedRect { rect, radii, fill });
            }
        }
    }
}

fn corner(exposed: bool, radius: f64) -> f64 {
    if exposed {
        radius
    } else {
        0.0
    }
}

/// One finder pattern: 7x7 ring, 5x5 light gap, 3x3 eye.
fn compile_finder(
    out: &mut Vec<Primitive>,
    grid: &ModuleGrid,
    fx: usize,
    fy: usize,
    finder: &FinderStyle,
    background: Rgb,
) {
    let m = grid.module;
    let outer = grid.cell(fx, fy, FINDER_SIZE);
    let gap = outer.inset(m);
    let eye = outer.inset(2.0 * m);

    match finder.square_shape {
        FinderSquareShape::Square => {
            out.push(Primitive::Rect { rect: outer, fill: finder.square_color });
            out.push(Primitive::Rect { rect: gap, fill: background });
        }
        FinderSquareShape::Dot => {
            let (cx, cy) = outer.center();
            out.push(Primitive::Circle { cx, cy, r: outer.w / 2.0, fill: finder.square_color });
            out.push(Primitive::Circle { cx, cy, r: gap.w / 2.0, fill: background });
        }
        FinderSquareShape::ExtraRounded => {
            out.push(Primitive::RoundedRect {
                rect: outer,
                radii: CornerRadii::uniform(2.5 * m),
                fill: finder.square_color,
            });
            out.push(Primitive::RoundedRect {
                rect: gap,
                radii: CornerRadii::uniform(1.5 * m),
                fill: background,
            });
        }
    }

    match finder.dot_shape {
        FinderDotShape::Square => out.push(Primitive::Rect { rect: eye, fill: finder.dot_color }),
        FinderDotShape::Dot => {
            let (cx, cy) = eye.center();
            out.push(Primitive::Circle { cx, cy, r: eye.w / 2.0, fill: finder.dot_color });
        }
    }
}

// =============================================================================
// Frame border patterns
// =============================================================================

/// Top, right, bottom, left bands of thickness `t` just inside `r`.
fn band_edges(r: Rect, t: f64) -> [Rect; 4] {
    [
        Rect::new(r.x, r.y, r.w, t),
        Rect::new(r.right() - t, r.y + t, t, (r.h - 2.0 * t).max(0.0)),
        Rect::new(r.x, r.bottom() - t, r.w, t),
        Rect::new(r.x, r.y + t, t, (r.h - 2.0 * t).max(0.0)),
    ]
}

fn push_band(out: &mut Vec<Primitive>, outer: Rect, t: f64, fill: Rgb) {
    for rect in band_edges(outer, t) {
        out.push(Primitive::Rect { rect, fill });
    }
}

fn compile_border(out: &mut Vec<Primitive>, border: &BorderGeometry, frame: &FrameSpec) {
    let outer = border.outer;
    let t = border.thickness;
    let color = frame.border_color;

    match frame.pattern {
        FramePattern::Solid => push_band(out, outer, t, color),
        FramePattern::Double => {
            let line = t / 3.0;
            push_band(out, outer, line, color);
            push_band(out, outer.inset(2.0 * line), line, color);
        }
        FramePattern::Dashed => {
            let dash = 3.0 * t;
            let gap = 2.0 * t;
            // Horizontal edges
            for y in [outer.y, outer.bottom() - t] {
                for (start, len) in dash_segments(outer.x, outer.w, dash, gap) {
                    out.push(Primitive::Rect { rect: Rect::new(start, y, len, t), fill: color });
                }
            }
            // Vertical edges
            for x in [outer.x, outer.right() - t] {
                for (start, len) in dash_segments(outer.y, outer.h, dash, gap) {
                    out.push(Primitive::Rect { rect: Rect::new(x, start, t, len), fill: color });
                }
            }
        }
        FramePattern::Dotted => {
            let path = outer.inset(t / 2.0);
            let corners = [
                (path.x, path.y),
                (path.right(), path.y),
                (path.right(), path.bottom()),
                (path.x, path.bottom()),
            ];
            for i in 0..4 {
                let (x0, y0) = corners[i];
                let (x1, y1) = corners[(i + 1) % 4];
                let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
                let count = (len / (2.0 * t)).round().max(1.0) as usize;
                // End point excluded: it is the next edge's start.
                for k in 0..count {
                    let f = k as f64 / count as f64;
                    out.push(Primitive::Circle {
                        cx: x0 + (x1 - x0) * f,
                        cy: y0 + (y1 - y0) * f,
                        r: t / 2.0,
                        fill: color,
                    });
                }
            }
        }
        FramePattern::Gradient => {
            // Clockwise from the top-left corner, lightening toward white.
            let edges = band_edges(outer, t);
            for (edge_idx, edge) in edges.iter().enumerate() {
                let horizontal = edge_idx % 2 == 0;
                let reversed = edge_idx >= 2;
                for step in 0..GRADIENT_STEPS {
                    let along = if reversed { GRADIENT_STEPS - 1 - step } else { step };
                    let frac = (edge_idx as f64 + step as f64 / GRADIENT_STEPS as f64) / 4.0;
                    let fill = color.mix(Rgb::WHITE, 0.5 * frac);
                    let rect = if horizontal {
                        let w = edge.w / GRADIENT_STEPS as f64;
                        Rect::new(edge.x + along as f64 * w, edge.y, w, edge.h)
                    } else {
                        let h = edge.h / GRADIENT_STEPS as f64;
                        Rect::new(edge.x, edge.y + along as f64 * h, edge.w, h)
                    };
                    out.push(Primitive::Rect { rect, fill });
                }
            }
        }
    }
}

/// Split `[start, start + len)` into dashes, centered so both ends match.
fn dash_segments(start: f64, len: f64, dash: f64, gap: f64) -> Vec<(f64, f64)> {
    if len <= dash {
        return vec![(start, len)];
    }
    let period = dash + gap;
    let count = ((len + gap) / period).floor().max(1.0) as usize;
    let used = count as f64 * dash + (count - 1) as f64 * gap;
    let offset = (len - used) / 2.0;
    (0..count)
        .map(|i| (start + offset + i as f64 * period, dash))
        .collect()
}

fn compile_pill(out: &mut Vec<Primitive>, pill: &PillGeometry, frame: &FrameSpec) {
    out.push(Primitive::RoundedRect {
        rect: pill.rect,
        radii: CornerRadii::uniform(pill.radius),
        fill: frame.border_color,
    });
    let (x, y) = pill.rect.center();
    out.push(Primitive::Text {
        x,
        y,
        content: frame.text.clone(),
        font: frame.font.clone(),
        size: pill.font_size,
        color: frame.text_color,
    });
}
