//! Built-in style presets.
//!
//! Presets are merge bases only: a session starts from one and layers user
//! overrides on top. Each constructor returns a fresh value, so callers can
//! never mutate the library copy.
//!
//! - classic (default - black on white)
//! - ocean
//! - sunset
//! - forest
//! - midnight
//! - candy

use crate::style::{
    FinderDotShape, FinderSquareShape, FinderStyle, FramePattern, FrameSpec, ModuleShape,
    ModuleStyle, Rgb, StyleSpec,
};

/// A named, read-only style used as a merge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub spec: StyleSpec,
}

const DEFAULT_FONT: &str = "sans-serif";

fn frame(border: Rgb, text_color: Rgb, pattern: FramePattern) -> FrameSpec {
    FrameSpec {
        enabled: false,
        border_color: border,
        text: "Scan me".to_string(),
        text_color,
        font: DEFAULT_FONT.to_string(),
        pattern,
    }
}

/// Classic - plain black modules on white, what most scanners expect.
pub fn classic() -> Preset {
    Preset {
        name: "classic",
        description: "Black square modules on white",
        spec: StyleSpec {
            background: Rgb::WHITE,
            module: ModuleStyle { shape: ModuleShape::Square, color: Rgb::BLACK },
            finder: FinderStyle {
                square_shape: FinderSquareShape::Square,
                square_color: Rgb::BLACK,
                dot_shape: FinderDotShape::Square,
                dot_color: Rgb::BLACK,
            },
            frame: frame(Rgb::BLACK, Rgb::WHITE, FramePattern::Solid),
        },
    }
}

/// Ocean - deep blue dots with rounded finders.
pub fn ocean() -> Preset {
    Preset {
        name: "ocean",
        description: "Blue dots with extra-rounded finders",
        spec: StyleSpec {
            background: Rgb(0xf0, 0xf9, 0xff),
            module: ModuleStyle { shape: ModuleShape::Dot, color: Rgb(0x1e, 0x40, 0xaf) },
            finder: FinderStyle {
                square_shape: FinderSquareShape::ExtraRounded,
                square_color: Rgb(0x1e, 0x3a, 0x8a),
                dot_shape: FinderDotShape::Dot,
                dot_color: Rgb(0x25, 0x63, 0xeb),
            },
            frame: frame(Rgb(0x1e, 0x3a, 0x8a), Rgb::WHITE, FramePattern::Solid),
        },
    }
}

/// Sunset - warm classy modules.
pub fn sunset() -> Preset {
    Preset {
        name: "sunset",
        description: "Warm orange classy modules",
        spec: StyleSpec {
            background: Rgb(0xff, 0xf7, 0xed),
            module: ModuleStyle { shape: ModuleShape::Classy, color: Rgb(0xc2, 0x41, 0x0c) },
            finder: FinderStyle {
                square_shape: FinderSquareShape::ExtraRounded,
                square_color: Rgb(0x9a, 0x34, 0x12),
                dot_shape: FinderDotShape::Square,
                dot_color: Rgb(0xea, 0x58, 0x0c),
            },
            frame: frame(Rgb(0xea, 0x58, 0x0c), Rgb::WHITE, FramePattern::Gradient),
        },
    }
}

/// Forest - green rounded modules.
pub fn forest() -> Preset {
    Preset {
        name: "forest",
        description: "Green rounded modules",
        spec: StyleSpec {
            background: Rgb::WHITE,
            module: ModuleStyle { shape: ModuleShape::Rounded, color: Rgb(0x16, 0x65, 0x34) },
            finder: FinderStyle {
                square_shape: FinderSquareShape::Square,
                square_color: Rgb(0x14, 0x53, 0x2d),
                dot_shape: FinderDotShape::Dot,
                dot_color: Rgb(0x15, 0x80, 0x3d),
            },
            frame: frame(Rgb(0x14, 0x53, 0x2d), Rgb(0xf0, 0xfd, 0xf4), FramePattern::Double),
        },
    }
}

/// Midnight - light modules on a dark background.
///
/// Inverted symbols are not read by every scanner.
pub fn midnight() -> Preset {
    Preset {
        name: "midnight",
        description: "Light classy-rounded modules on near-black",
        spec: StyleSpec {
            background: Rgb(0x0f, 0x17, 0x2a),
            module: ModuleStyle {
                shape: ModuleShape::ClassyRounded,
                color: Rgb(0xe2, 0xe8, 0xf0),
            },
            finder: FinderStyle {
                square_shape: FinderSquareShape::Dot,
                square_color: Rgb(0xf8, 0xfa, 0xfc),
                dot_shape: FinderDotShape::Dot,
                dot_color: Rgb(0x38, 0xbd, 0xf8),
            },
            frame: frame(Rgb(0x38, 0xbd, 0xf8), Rgb(0x0f, 0x17, 0x2a), FramePattern::Dashed),
        },
    }
}

/// Candy - pink dots with a dotted frame.
pub fn candy() -> Preset {
    Preset {
        name: "candy",
        description: "Pink dots with a dotted frame",
        spec: StyleSpec {
            background: Rgb(0xfd, 0xf2, 0xf8),
            module: ModuleStyle { shape: ModuleShape::Dot, color: Rgb(0xbe, 0x18, 0x5d) },
            finder: FinderStyle {
                square_shape: FinderSquareShape::Dot,
                square_color: Rgb(0x9d, 0x17, 0x4d),
                dot_shape: FinderDotShape::Dot,
                dot_color: Rgb(0xdb, 0x27, 0x77),
            },
            frame: frame(Rgb(0xdb, 0x27, 0x77), Rgb::WHITE, FramePattern::Dotted),
        },
    }
}

/// Get a preset by name (case-insensitive, `-`/`_` interchangeable).
pub fn get_preset(name: &str) -> Option<Preset> {
    match name.trim().to_lowercase().replace('_', "-").as_str() {
        "classic" | "default" => Some(classic()),
        "ocean" => Some(ocean()),
        "sunset" => Some(sunset()),
        "forest" => Some(forest()),
        "midnight" => Some(midnight()),
        "candy" => Some(candy()),
        _ => None,
    }
}

pub fn preset_names() -> &'static [&'static str] {
    &["classic", "ocean", "sunset", "forest", "midnight", "candy"]
}

pub fn default_preset() -> Preset {
    classic()
}
