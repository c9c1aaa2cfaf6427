//! Vector backend: writes a Scene as a self-contained SVG document.
//!
//! Output is a background rect, then a `frame` group (border, pill, text),
//! then a `symbol` group. Text stays a `<text>` element so it scales
//! without rasterization. The string always uses Unix newlines.

use crate::ir::{CornerRadii, Primitive, Rect, Scene};

/// Format a coordinate compactly (max 3 decimals, no trailing zeros).
fn num(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Escape text for use in XML content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the scene as SVG markup, `width`/`height` in logical units.
pub fn to_svg_string(scene: &Scene) -> String {
    let (w, h) = (num(scene.width()), num(scene.height()));
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += &svg_element(scene, &w, &h);
    result
}

/// The `<svg>` element alone, for embedding in other documents.
pub fn svg_element(scene: &Scene, width: &str, height: &str) -> String {
    let mut result = String::new();
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" \
         width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n",
        width,
        height,
        num(scene.width()),
        num(scene.height())
    );
    result += &format!(
        "\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        scene.background.to_hex()
    );

    if scene.has_frame() {
        result += "\t<g id=\"frame\">\n";
        for p in &scene.frame {
            result += &primitive_element(p);
        }
        result += "\t</g>\n";
    }

    result += "\t<g id=\"symbol\" shape-rendering=\"crispEdges\">\n";
    for p in &scene.symbol {
        result += &primitive_element(p);
    }
    result += "\t</g>\n";
    result += "</svg>\n";
    result
}

/// One primitive as an indented element line.
fn primitive_element(primitive: &Primitive) -> String {
    match primitive {
        Primitive::Rect { rect, fill } => format!(
            "\t\t<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            num(rect.x),
            num(rect.y),
            num(rect.w),
            num(rect.h),
            fill.to_hex()
        ),
        Primitive::RoundedRect { rect, radii, fill } => format!(
            "\t\t<path d=\"{}\" fill=\"{}\"/>\n",
            rounded_path(rect, radii),
            fill.to_hex()
        ),
        Primitive::Circle { cx, cy, r, fill } => format!(
            "\t\t<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>\n",
            num(*cx),
            num(*cy),
            num(*r),
            fill.to_hex()
        ),
        Primitive::Text { x, y, content, font, size, color } => format!(
            "\t\t<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" \
             text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>\n",
            num(*x),
            num(*y),
            escape_xml(font),
            num(*size),
            color.to_hex(),
            escape_xml(content)
        ),
    }
}

/// Clockwise quarter arc of `radius` ending at (`x`, `y`).
fn arc(radius: f64, x: f64, y: f64) -> String {
    format!("A{0},{0} 0 0 1 {1},{2}", num(radius), num(x), num(y))
}

/// Path data for a rectangle with independent corner radii.
fn rounded_path(r: &Rect, radii: &CornerRadii) -> String {
    let mut d = format!("M{},{}", num(r.x + radii.tl), num(r.y));
    d += &format!("H{}", num(r.right() - radii.tr));
    if radii.tr > 0.0 {
        d += &arc(radii.tr, r.right(), r.y + radii.tr);
    }
    d += &format!("V{}", num(r.bottom() - radii.br));
    if radii.br > 0.0 {
        d += &arc(radii.br, r.right() - radii.br, r.bottom());
    }
    d += &format!("H{}", num(r.x + radii.bl));
    if radii.bl > 0.0 {
        d += &arc(radii.bl, r.x, r.bottom() - radii.bl);
    }
    d += &format!("V{}", num(r.y + radii.tl));
    if radii.tl > 0.0 {
        d += &arc(radii.tl, r.x + radii.tl, r.y);
    }
    d.push('Z');
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FrameLayout;
    use crate::style::Rgb;

    fn scene(frame: Vec<Primitive>, symbol: Vec<Primitive>) -> Scene {
        Scene {
            layout: FrameLayout {
                width: 100.0,
                height: 120.5,
                symbol: Rect::new(0.0, 0.0, 100.0, 100.0),
                border: None,
                pill: None,
            },
            background: Rgb(0xf0, 0xf9, 0xff),
            frame,
            symbol,
        }
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(1.25), "1.25");
        assert_eq!(num(1.0 / 3.0), "0.333");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn test_document_header_and_background() {
        let svg = to_svg_string(&scene(vec![], vec![]));
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg"));
        assert!(svg.contains("viewBox=\"0 0 100 120.5\""));
        assert!(svg.contains("<rect width=\"100%\" height=\"100%\" fill=\"#f0f9ff\"/>"));
        assert!(!svg.contains("id=\"frame\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_paint_order_background_frame_symbol() {
        let svg = to_svg_string(&scene(
            vec![Primitive::Text {
                x: 50.0,
                y: 110.0,
                content: "Scan <me> & \"go\"".into(),
                font: "sans-serif".into(),
                size: 12.0,
                color: Rgb::WHITE,
            }],
            vec![Primitive::Rect { rect: Rect::new(1.0, 1.0, 2.0, 2.0), fill: Rgb::BLACK }],
        ));
        let bg = svg.find("height=\"100%\"").unwrap();
        let frame = svg.find("<g id=\"frame\">").unwrap();
        let symbol = svg.find("<g id=\"symbol\"").unwrap();
        assert!(bg < frame && frame < symbol);
        assert!(svg.contains("Scan &lt;me&gt; &amp; &quot;go&quot;</text>"));
        assert!(svg.contains("text-anchor=\"middle\""));
    }

    #[test]
    fn test_rounded_path_arcs_only_where_needed() {
        let d = rounded_path(
            &Rect::new(0.0, 0.0, 10.0, 10.0),
            &CornerRadii { tl: 2.0, tr: 0.0, br: 2.0, bl: 0.0 },
        );
        assert_eq!(d, "M2,0H10V8A2,2 0 0 1 8,10H0V2A2,2 0 0 1 2,0Z");
    }

    #[test]
    fn test_circle_markup() {
        let svg = to_svg_string(&scene(
            vec![],
            vec![Primitive::Circle { cx: 5.5, cy: 5.5, r: 0.5, fill: Rgb(255, 0, 0) }],
        ));
        assert!(svg.contains("<circle cx=\"5.5\" cy=\"5.5\" r=\"0.5\" fill=\"#ff0000\"/>"));
    }
}
