// Style DSL Parser Module

pub mod lexer;
pub mod style;

// Public API re-exports
pub use style::{parse_pipeline, parse_style, StyleEdit};
