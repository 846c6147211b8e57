//! Removal of the triple-backtick code ligature.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use warpnine_font_gsub::{LigatureRemoval, remove_triple_ligature};

use crate::io::{file_name, read_font, write_font};

pub use warpnine_font_gsub::DEFAULT_LIGATURE_GLYPH;

/// Disable the `glyph glyph glyph` ligature in place.
///
/// Returns `true` when the font was rewritten. Fonts without GSUB, without
/// the glyph or without the pattern are left untouched.
pub fn remove_ligature(path: &Path, glyph: &str) -> Result<bool> {
    let data = read_font(path)?;
    let name = file_name(path)?;

    match remove_triple_ligature(&data, glyph)
        .with_context(|| format!("Failed to edit GSUB of {}", path.display()))?
    {
        LigatureRemoval::Removed { matches, data } => {
            write_font(path, data)?;
            info!("{name}: removed {} rule(s) for '{glyph}'", matches.len());
            Ok(true)
        }
        LigatureRemoval::NoGsub => {
            info!("{name}: no GSUB table found");
            Ok(false)
        }
        LigatureRemoval::GlyphMissing => {
            info!("{name}: no '{glyph}' glyph found");
            Ok(false)
        }
        LigatureRemoval::NotFound => {
            info!("{name}: no matching patterns found");
            Ok(false)
        }
    }
}

pub fn remove_grave_ligature(path: &Path) -> Result<bool> {
    remove_ligature(path, DEFAULT_LIGATURE_GLYPH)
}
