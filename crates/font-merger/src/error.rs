use std::{io, result};

use read_fonts::ReadError;
use thiserror::Error;
use write_fonts::{BuilderError, error};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("failed to write font: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("failed to edit GSUB: {0}")]
    Gsub(#[from] warpnine_font_gsub::Error),

    #[error("no fonts provided for merging")]
    NoFonts,

    #[error("fonts have incompatible unitsPerEm: expected {expected}, got {actual}")]
    IncompatibleUnitsPerEm { expected: u16, actual: u16 },

    #[error("table values must be equal for '{table}' field '{field}'")]
    NotEqual { table: &'static str, field: &'static str },

    #[error("glyph '{name}' from font {font} differs from the glyph of the same name")]
    GlyphNameCollision { name: String, font: usize },

    #[error("font {0} has CFF outlines; only TrueType outlines can be merged")]
    CffNotSupported(usize),

    #[error("merged font would have {0} glyphs, more than 65535")]
    TooManyGlyphs(usize),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = result::Result<T, MergeError>;
