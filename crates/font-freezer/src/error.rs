//! Error types for feature freezing.

use std::result;

use read_fonts::ReadError;
use write_fonts::BuilderError;

/// Errors that can occur while freezing features.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to read GSUB lookups: {0}")]
    Lookups(#[from] warpnine_font_gsub::Error),

    #[error("no GSUB table in font")]
    NoGsub,

    #[error("no cmap table in font")]
    NoCmap,

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("no matching features found for {0:?}")]
    NoMatchingFeatures(Vec<String>),

    #[error("no substitutions found for features {0:?}")]
    NoSubstitutions(Vec<String>),
}

pub type Result<T> = result::Result<T, Error>;
