//! Style model
//!
//! A [`StyleSpec`] is always fully populated. Partial edits are expressed as
//! [`StyleOverrides`] and merged onto a base spec (normally a preset); every
//! field the overrides leave unset falls back to the base, never to a
//! default-constructed value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StyleError;

// === Color ===

/// 24-bit sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Linear blend toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(lerp(self.0, other.0), lerp(self.1, other.1), lerp(self.2, other.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s).ok_or_else(|| StyleError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Rgb {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Parse hex (`#RRGGBB`, `#RGB`) or a basic named color.
pub fn parse_color(color_str: &str) -> Option<Rgb> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(Rgb(255, 255, 255)),
        "black" => Some(Rgb(0, 0, 0)),
        "red" => Some(Rgb(255, 0, 0)),
        "green" => Some(Rgb(0, 128, 0)),
        "blue" => Some(Rgb(0, 0, 255)),
        "yellow" => Some(Rgb(255, 255, 0)),
        "cyan" => Some(Rgb(0, 255, 255)),
        "magenta" => Some(Rgb(255, 0, 255)),
        "orange" => Some(Rgb(255, 165, 0)),
        "purple" => Some(Rgb(128, 0, 128)),
        "pink" => Some(Rgb(255, 192, 203)),
        "brown" => Some(Rgb(139, 69, 19)),
        "gray" | "grey" => Some(Rgb(128, 128, 128)),
        "navy" => Some(Rgb(0, 0, 128)),
        "teal" => Some(Rgb(0, 128, 128)),
        _ => None,
    }
}

fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Rgb(r, g, b))
        }
        _ => None,
    }
}

// === Shapes ===

macro_rules! named_variants {
    (
        $ty:ident,
        $kind:literal,
        { $($variant:ident => [$canonical:literal $(, $alias:literal)*]),+ $(,)? }
    ) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $canonical,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = StyleError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().replace('_', "-").as_str() {
                    $($canonical $(| $alias)* => Ok($ty::$variant),)+
                    _ => Err(StyleError::UnknownVariant { kind: $kind, value: s.to_string() }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Shape of the data-bearing modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleShape {
    Square,
    #[serde(alias = "dots")]
    Dot,
    Rounded,
    Classy,
    ClassyRounded,
}

named_variants!(ModuleShape, "module shape", {
    Square => ["square"],
    Dot => ["dot", "dots"],
    Rounded => ["rounded"],
    Classy => ["classy"],
    ClassyRounded => ["classy-rounded"],
});

/// Outer ring of a finder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinderSquareShape {
    Square,
    Dot,
    ExtraRounded,
}

named_variants!(FinderSquareShape, "finder square shape", {
    Square => ["square"],
    Dot => ["dot", "dots"],
    ExtraRounded => ["extra-rounded"],
});

/// Inner 3x3 eye of a finder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinderDotShape {
    Square,
    Dot,
}

named_variants!(FinderDotShape, "finder dot shape", {
    Square => ["square"],
    Dot => ["dot", "dots"],
});

/// Stroke pattern of the decorative frame border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FramePattern {
    Solid,
    Double,
    Dashed,
    Dotted,
    Gradient,
}

named_variants!(FramePattern, "frame pattern", {
    Solid => ["solid"],
    Double => ["double"],
    Dashed => ["dashed", "dash"],
    Dotted => ["dotted", "dot"],
    Gradient => ["gradient"],
});

// === Fully resolved spec ===

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleStyle {
    pub shape: ModuleShape,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinderStyle {
    pub square_shape: FinderSquareShape,
    pub square_color: Rgb,
    pub dot_shape: FinderDotShape,
    pub dot_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSpec {
    pub enabled: bool,
    pub border_color: Rgb,
    pub text: String,
    pub text_color: Rgb,
    pub font: String,
    pub pattern: FramePattern,
}

/// Complete visual description driving preview and every export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleSpec {
    pub background: Rgb,
    pub module: ModuleStyle,
    pub finder: FinderStyle,
    pub frame: FrameSpec,
}

impl StyleSpec {
    /// New spec with every field set in `overrides` replaced; `self` is untouched.
    pub fn merged(&self, overrides: &StyleOverrides) -> StyleSpec {
        let mut spec = self.clone();
        if let Some(bg) = overrides.background {
            spec.background = bg;
        }
        apply_module_overrides(&mut spec.module, &overrides.module);
        apply_finder_overrides(&mut spec.finder, &overrides.finder);
        apply_frame_overrides(&mut spec.frame, &overrides.frame);
        spec
    }
}

// === Partial overrides ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOverrides {
    pub shape: Option<ModuleShape>,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderOverrides {
    pub square_shape: Option<FinderSquareShape>,
    pub square_color: Option<Rgb>,
    pub dot_shape: Option<FinderDotShape>,
    pub dot_color: Option<Rgb>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameOverrides {
    pub enabled: Option<bool>,
    pub border_color: Option<Rgb>,
    pub text: Option<String>,
    pub text_color: Option<Rgb>,
    pub font: Option<String>,
    pub pattern: Option<FramePattern>,
}

/// User edits on top of a preset. `None` means "keep the base value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub background: Option<Rgb>,
    pub module: ModuleOverrides,
    pub finder: FinderOverrides,
    pub frame: FrameOverrides,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        *self == StyleOverrides::default()
    }

    /// Fold a newer edit into this one; fields set in `newer` win.
    pub fn layer(&mut self, newer: &StyleOverrides) {
        fn pick<T: Clone>(slot: &mut Option<T>, newer: &Option<T>) {
            if newer.is_some() {
                *slot = newer.clone();
            }
        }
        pick(&mut self.background, &newer.background);

        pick(&mut self.module.shape, &newer.module.shape);
        pick(&mut self.module.color, &newer.module.color);

        pick(&mut self.finder.square_shape, &newer.finder.square_shape);
        pick(&mut self.finder.square_color, &newer.finder.square_color);
        pick(&mut self.finder.dot_shape, &newer.finder.dot_shape);
        pick(&mut self.finder.dot_color, &newer.finder.dot_color);

        pick(&mut self.frame.enabled, &newer.frame.enabled);
        pick(&mut self.frame.border_color, &newer.frame.border_color);
        pick(&mut self.frame.text, &newer.frame.text);
        pick(&mut self.frame.text_color, &newer.frame.text_color);
        pick(&mut self.frame.font, &newer.frame.font);
        pick(&mut self.frame.pattern, &newer.frame.pattern);
    }
}

fn apply_module_overrides(resolved: &mut ModuleStyle, element: &ModuleOverrides) {
    if let Some(shape) = element.shape {
        resolved.shape = shape;
    }
    if let Some(color) = element.color {
        resolved.color = color;
    }
}

fn apply_finder_overrides(resolved: &mut FinderStyle, element: &FinderOverrides) {
    if let Some(shape) = element.square_shape {
        resolved.square_shape = shape;
    }
    if let Some(color) = element.square_color {
        resolved.square_color = color;
    }
    if let Some(shape) = element.dot_shape {
        resolved.dot_shape = shape;
    }
    if let Some(color) = element.dot_color {
        resolved.dot_color = color;
    }
}

fn apply_frame_overrides(resolved: &mut FrameSpec, element: &FrameOverrides) {
    if let Some(enabled) = element.enabled {
        resolved.enabled = enabled;
    }
    if let Some(color) = element.border_color {
        resolved.border_color = color;
    }
    if let Some(ref text) = element.text {
        resolved.text = text.clone();
    }
    if let Some(color) = element.text_color {
        resolved.text_color = color;
    }
    if let Some(ref font) = element.font {
        resolved.font = font.clone();
    }
    if let Some(pattern) = element.pattern {
        resolved.pattern = pattern;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#FF0000"), Some(Rgb(255, 0, 0)));
        assert_eq!(parse_color("#0f0"), Some(Rgb(0, 255, 0)));
        assert_eq!(parse_color("#CCCCCC"), Some(Rgb(204, 204, 204)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ééé"), None);
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("White"), Some(Rgb::WHITE));
        assert_eq!(parse_color("navy"), Some(Rgb(0, 0, 128)));
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_rgb_serde_as_hex() {
        let json = serde_json::to_string(&Rgb(30, 64, 175)).unwrap();
        assert_eq!(json, "\"#1e40af\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb(30, 64, 175));
        assert!(serde_json::from_str::<Rgb>("\"#zzzzzz\"").is_err());
    }

    #[test]
    fn test_mix() {
        assert_eq!(Rgb::BLACK.mix(Rgb::WHITE, 0.5), Rgb(128, 128, 128));
        assert_eq!(Rgb(10, 20, 30).mix(Rgb::WHITE, 0.0), Rgb(10, 20, 30));
    }

    #[test]
    fn test_shape_names() {
        assert_eq!("dots".parse::<ModuleShape>().unwrap(), ModuleShape::Dot);
        assert_eq!("classy_rounded".parse::<ModuleShape>().unwrap(), ModuleShape::ClassyRounded);
        assert_eq!(
            "Extra-Rounded".parse::<FinderSquareShape>().unwrap(),
            FinderSquareShape::ExtraRounded
        );
        assert!(matches!(
            "zigzag".parse::<FramePattern>(),
            Err(StyleError::UnknownVariant { kind: "frame pattern", .. })
        ));
    }

    #[test]
    fn test_merge_falls_back_to_base() {
        let base = presets::classic().spec;
        let overrides = StyleOverrides {
            module: ModuleOverrides { color: Some(Rgb(255, 0, 0)), shape: None },
            ..Default::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.module.color, Rgb(255, 0, 0));
        assert_eq!(merged.module.shape, base.module.shape);
        assert_eq!(merged.finder, base.finder);
        assert_eq!(merged.frame, base.frame);
        assert_eq!(merged.background, base.background);
    }

    #[test]
    fn test_merge_does_not_alias_base() {
        let base = presets::classic().spec;
        let snapshot = base.clone();
        let overrides = StyleOverrides {
            frame: FrameOverrides { text: Some("Scan me".into()), ..Default::default() },
            ..Default::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.frame.text, "Scan me");
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_layer_newer_wins_and_keeps_older() {
        let mut acc = StyleOverrides {
            background: Some(Rgb::BLACK),
            frame: FrameOverrides { text: Some("old".into()), ..Default::default() },
            ..Default::default()
        };
        acc.layer(&StyleOverrides {
            frame: FrameOverrides {
                text: Some("new".into()),
                enabled: Some(true),
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(acc.background, Some(Rgb::BLACK));
        assert_eq!(acc.frame.text.as_deref(), Some("new"));
        assert_eq!(acc.frame.enabled, Some(true));
    }

    #[test]
    fn test_overrides_deserialize_partially() {
        let json = r##"{ "module": { "shape": "dots" }, "frame": { "enabled": true } }"##;
        let overrides: StyleOverrides = serde_json::from_str(json).unwrap();
        assert_eq!(overrides.module.shape, Some(ModuleShape::Dot));
        assert_eq!(overrides.module.color, None);
        assert_eq!(overrides.frame.enabled, Some(true));
        assert!(overrides.background.is_none());
    }

    #[test]
    fn test_style_spec_json_round_trip() {
        let spec = presets::ocean().spec;
        let json = serde_json::to_string(&spec).unwrap();
        let back: StyleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
