//! Table-level rewriting primitives shared by the Warpnine tools.

pub mod avar;
mod table;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use anyhow::{Context, Result};
use read_fonts::{
    FontRef, TableProvider,
    types::{GlyphId16, NameId, Tag},
};
use write_fonts::{
    FontBuilder,
    tables::name::{Name, NameRecord},
};

pub use table::{FontTable, FontTables, VARIATION_ONLY_TAGS};

/// Rebuild a font, letting `f` override tables.
///
/// Every table of the source is added to the builder first, so `f` only
/// needs to add the tables it changes. Tables in `drop` are left out.
pub fn rewrite_font_without(
    data: &[u8],
    drop: &[Tag],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if drop.contains(&tag) {
            continue;
        }
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Rebuild a font, letting `f` override tables. See [`rewrite_font_without`].
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    rewrite_font_without(data, &[], f)
}

/// Build a new `name` table by mapping every record.
///
/// The mapper receives `(name_id, current)` and returns `Some(new)` to
/// replace the string or `None` to keep it. Records whose string cannot be
/// decoded are dropped.
pub fn map_name_records(
    font: &FontRef,
    mut mapper: impl FnMut(u16, &str) -> Option<String>,
) -> Result<Name> {
    let name = font.name()?;
    let mut records = Vec::new();

    for record in name.name_record() {
        let name_id = record.name_id().to_u16();
        let Ok(string) = record.string(name.string_data()) else {
            continue;
        };
        let current: String = string.chars().collect();
        let value = mapper(name_id, &current).unwrap_or(current);

        records.push(NameRecord::new(
            record.platform_id(),
            record.encoding_id(),
            record.language_id(),
            NameId::new(name_id),
            value.into(),
        ));
    }

    Ok(Name::new(records))
}

/// First decodable string for `name_id`, preferring Windows English records.
pub fn name_string(font: &FontRef, name_id: u16) -> Option<String> {
    let name = font.name().ok()?;
    let mut fallback = None;
    for record in name.name_record() {
        if record.name_id().to_u16() != name_id {
            continue;
        }
        let Ok(string) = record.string(name.string_data()) else {
            continue;
        };
        let value: String = string.chars().collect();
        if record.platform_id() == 3 && record.language_id() == 0x409 {
            return Some(value);
        }
        fallback.get_or_insert(value);
    }
    fallback
}

/// Glyph names from `post`, one per glyph.
///
/// Glyphs without a name (post v3, or a missing `post`) get `glyph{N}`.
pub fn glyph_names(font: &FontRef) -> Result<Vec<String>> {
    let num_glyphs = font.maxp()?.num_glyphs();
    let post = font.post().ok();
    Ok((0..num_glyphs)
        .map(|gid| {
            post.as_ref()
                .and_then(|p| p.glyph_name(GlyphId16::new(gid)))
                .map(str::to_string)
                .unwrap_or_else(|| format!("glyph{gid}"))
        })
        .collect())
}
