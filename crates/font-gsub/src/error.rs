use std::result;

use read_fonts::ReadError;
use write_fonts::{BuilderError, error};

/// Errors raised while reading or rewriting a GSUB table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to write table: {0}")]
    Write(#[from] error::Error),

    #[error("no GSUB table in {0} font")]
    NoGsub(&'static str),

    #[error(
        "incompatible masters: donor has {donor_glyphs} glyphs but target only has {target_glyphs}"
    )]
    IncompatibleMasters { donor_glyphs: u16, target_glyphs: u16 },
}

pub type Result<T> = result::Result<T, Error>;
