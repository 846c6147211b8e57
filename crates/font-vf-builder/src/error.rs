//! Error types for variable font building.

use std::path::PathBuf;

/// Result type for variable font building operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during variable font building.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read font file '{path}': {source}")]
    ReadFont { path: PathBuf, source: std::io::Error },

    #[error("failed to parse master '{master}': {source}")]
    ParseFont { master: String, source: read_fonts::ReadError },

    #[error("master '{master}' is missing required table '{table}'")]
    MissingTable { master: String, table: &'static str },

    #[error("invalid designspace: {0}")]
    InvalidDesignspace(String),

    #[error("incompatible masters: '{master}' {reason}")]
    IncompatibleMasters { master: String, reason: Incompatibility },

    #[error("font builder error: {0}")]
    FontBuilder(#[from] write_fonts::BuilderError),

    #[error("font read error: {0}")]
    Read(#[from] read_fonts::ReadError),

    #[error("font write error: {0}")]
    Write(#[from] write_fonts::error::Error),

    #[error("error building gvar table: {0:?}")]
    GvarBuild(write_fonts::tables::gvar::GvarInputError),
}

/// Why a master cannot join the variation model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Incompatibility {
    #[error("has {actual} glyphs, expected {expected}")]
    GlyphCount { expected: u16, actual: u16 },

    #[error("has {actual} points in glyph {glyph}, expected {expected}")]
    PointCount { glyph: u32, expected: usize, actual: usize },

    #[error("has {actual} components in glyph {glyph}, expected {expected}")]
    ComponentCount { glyph: u32, expected: usize, actual: usize },

    #[error("has a {actual} outline for glyph {glyph}, expected {expected}")]
    OutlineKind { glyph: u32, expected: &'static str, actual: &'static str },

    #[error("sits at {axis}={value}, outside the axis range")]
    OutOfRange { axis: String, value: f32 },

    #[error("has no source at the default location")]
    NoDefault,
}
