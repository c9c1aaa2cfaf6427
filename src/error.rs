//! Error taxonomy.
//!
//! Nothing here is fatal to a session: encode failures fall back to the
//! placeholder surface and export failures leave the export disabled.

use thiserror::Error;

/// A payload or content selection could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    #[error("malformed field assignment '{0}' (expected key=value)")]
    MalformedField(String),
}

/// The external symbol encoder refused the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("refusing to encode an empty payload")]
    EmptyPayload,

    #[error("encoder rejected payload: {0}")]
    Rejected(String),
}

/// Composition or serialization of an export failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export yet")]
    NoContent,

    #[error("composition failed: {0:#}")]
    Composition(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("share target failed: {0}")]
    Share(String),
}

/// A style description could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("style parse error: {0}")]
    Parse(String),
}

/// Umbrella error for callers that do not care which stage failed.
#[derive(Debug, Error)]
pub enum QrStudioError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
