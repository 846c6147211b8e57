//! Typed GSUB editing for the Warpnine build.
//!
//! - [`remove_triple_ligature`] disables a code ligature such as ```` ``` ````
//! - [`register_calt`] makes `calt`/`rclt` apply in every script
//! - [`copy_gsub`] reinstates a donor's GSUB with an axis-compatibility check
//!
//! Lookups are edited through the owned [`LookupView`] model in [`view`],
//! which the merger also uses to remap glyph ids across fonts.

mod calt;
mod donor;
mod error;
mod ligatures;
pub mod pattern;
pub mod view;

use read_fonts::{FontRef, TableProvider, types::GlyphId16, types::Tag};
use write_fonts::FontBuilder;

pub use calt::{CaltRegistration, register_calt};
pub use donor::{DonorReport, copy_gsub};
pub use error::{Error, Result};
pub use ligatures::{DEFAULT_LIGATURE_GLYPH, LigatureRemoval, remove_triple_ligature};
pub use pattern::{PatternMatch, TriplePattern};
pub use view::{LookupKind, LookupView, RuleView};

/// Glyph id of the glyph whose `post` name is `name`.
pub(crate) fn glyph_id(font: &FontRef, name: &str) -> Option<u16> {
    let post = font.post().ok()?;
    let num_glyphs = font.maxp().ok()?.num_glyphs();
    (0..num_glyphs).find(|&gid| post.glyph_name(GlyphId16::new(gid)) == Some(name))
}

/// Copy every table of `font` except `drop` into a builder, let `f` add or
/// override tables, and serialize.
pub(crate) fn rebuild_font(
    font: &FontRef,
    drop: &[Tag],
    f: impl FnOnce(&mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let mut builder = FontBuilder::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if drop.contains(&tag) {
            continue;
        }
        if let Some(data) = font.table_data(tag) {
            builder.add_raw(tag, data);
        }
    }
    f(&mut builder)?;
    Ok(builder.build())
}
