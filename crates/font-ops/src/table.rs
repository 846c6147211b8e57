//! A closed view over the tables the Warpnine tools edit.

use read_fonts::{
    FontData, FontRef, ReadError, TableProvider,
    tables::{
        cff::Cff, fvar::Fvar, gdef::Gdef, glyf::Glyf, gsub::Gsub, gvar::Gvar, head::Head,
        hhea::Hhea, hmtx::Hmtx, name::Name, os2::Os2, post::Post, stat::Stat,
    },
    types::Tag,
};

/// Tables that only carry variation data and become meaningless once every
/// axis is pinned.
pub const VARIATION_ONLY_TAGS: [Tag; 8] = [
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"avar"),
    Tag::new(b"cvar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
    Tag::new(b"STAT"),
];

/// One parsed table of a font.
///
/// Tables the pipeline never inspects structurally are carried as
/// [`FontTable::Other`] and copied through byte for byte.
pub enum FontTable<'a> {
    Glyf(Glyf<'a>),
    Cff(Cff<'a>),
    Gsub(Gsub<'a>),
    Name(Name<'a>),
    Head(Head<'a>),
    Hhea(Hhea<'a>),
    Hmtx(Hmtx<'a>),
    Os2(Os2<'a>),
    Post(Post<'a>),
    Fvar(Fvar<'a>),
    Gvar(Gvar<'a>),
    Stat(Stat<'a>),
    Gdef(Gdef<'a>),
    Other(Tag, FontData<'a>),
}

impl<'a> FontTable<'a> {
    pub fn tag(&self) -> Tag {
        match self {
            FontTable::Glyf(_) => Tag::new(b"glyf"),
            FontTable::Cff(_) => Tag::new(b"CFF "),
            FontTable::Gsub(_) => Tag::new(b"GSUB"),
            FontTable::Name(_) => Tag::new(b"name"),
            FontTable::Head(_) => Tag::new(b"head"),
            FontTable::Hhea(_) => Tag::new(b"hhea"),
            FontTable::Hmtx(_) => Tag::new(b"hmtx"),
            FontTable::Os2(_) => Tag::new(b"OS/2"),
            FontTable::Post(_) => Tag::new(b"post"),
            FontTable::Fvar(_) => Tag::new(b"fvar"),
            FontTable::Gvar(_) => Tag::new(b"gvar"),
            FontTable::Stat(_) => Tag::new(b"STAT"),
            FontTable::Gdef(_) => Tag::new(b"GDEF"),
            FontTable::Other(tag, _) => *tag,
        }
    }

    /// `true` for tables listed in [`VARIATION_ONLY_TAGS`].
    pub fn is_variation_only(&self) -> bool {
        VARIATION_ONLY_TAGS.contains(&self.tag())
    }

    /// `true` when this table stores glyph outlines.
    pub fn is_outline(&self) -> bool {
        matches!(self, FontTable::Glyf(_) | FontTable::Cff(_))
            || self.tag() == Tag::new(b"loca")
            || self.tag() == Tag::new(b"CFF2")
    }
}

/// Parses tables of a font on demand into [`FontTable`] variants.
#[derive(Clone)]
pub struct FontTables<'a> {
    font: FontRef<'a>,
}

impl<'a> FontTables<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        Ok(Self { font: FontRef::new(data)? })
    }

    pub fn from_font(font: FontRef<'a>) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &FontRef<'a> {
        &self.font
    }

    /// Tags in table directory order.
    pub fn tags(&self) -> Vec<Tag> {
        self.font.table_directory.table_records().iter().map(|r| r.tag()).collect()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.font.table_data(tag).is_some()
    }

    /// Parse the table stored under `tag`, or `None` when the font lacks it.
    pub fn get(&self, tag: Tag) -> Option<Result<FontTable<'a>, ReadError>> {
        let data = self.font.table_data(tag)?;
        let font = &self.font;
        let parsed = match &tag.to_be_bytes() {
            b"glyf" => font.glyf().map(FontTable::Glyf),
            b"CFF " => font.cff().map(FontTable::Cff),
            b"GSUB" => font.gsub().map(FontTable::Gsub),
            b"name" => font.name().map(FontTable::Name),
            b"head" => font.head().map(FontTable::Head),
            b"hhea" => font.hhea().map(FontTable::Hhea),
            b"hmtx" => font.hmtx().map(FontTable::Hmtx),
            b"OS/2" => font.os2().map(FontTable::Os2),
            b"post" => font.post().map(FontTable::Post),
            b"fvar" => font.fvar().map(FontTable::Fvar),
            b"gvar" => font.gvar().map(FontTable::Gvar),
            b"STAT" => font.stat().map(FontTable::Stat),
            b"GDEF" => font.gdef().map(FontTable::Gdef),
            _ => Ok(FontTable::Other(tag, data)),
        };
        Some(parsed)
    }

    /// Every table in directory order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, Result<FontTable<'a>, ReadError>)> + '_ {
        self.tags().into_iter().filter_map(move |tag| self.get(tag).map(|t| (tag, t)))
    }

    /// Axis tags of the `fvar` table in declaration order; empty for static fonts.
    pub fn axis_tags(&self) -> Vec<Tag> {
        match self.get(Tag::new(b"fvar")) {
            Some(Ok(FontTable::Fvar(fvar))) => fvar
                .axes()
                .map(|axes| axes.iter().map(|a| a.axis_tag()).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// `true` when a `GDEF` table is present and carries an item variation store.
    pub fn gdef_has_var_store(&self) -> bool {
        match self.get(Tag::new(b"GDEF")) {
            Some(Ok(FontTable::Gdef(gdef))) => matches!(gdef.item_var_store(), Some(Ok(_))),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFont;

    #[test]
    fn static_font_has_no_axes() {
        let data = TestFont::new().simple("A", Some('A'), 600).build();
        let tables = FontTables::new(&data).unwrap();
        assert!(tables.axis_tags().is_empty());
        assert!(matches!(tables.get(Tag::new(b"glyf")), Some(Ok(FontTable::Glyf(_)))));
    }

    #[test]
    fn variable_font_lists_axes_and_variation_tables() {
        let tables = FontTables::new(font_test_data::VAZIRMATN_VAR).unwrap();
        assert_eq!(tables.axis_tags(), vec![Tag::new(b"wght")]);

        let variation: Vec<Tag> = tables
            .iter()
            .filter_map(|(tag, table)| table.ok().filter(|t| t.is_variation_only()).map(|_| tag))
            .collect();
        assert!(variation.contains(&Tag::new(b"fvar")));
        assert!(variation.contains(&Tag::new(b"gvar")));
    }

    #[test]
    fn unknown_tables_are_carried_raw() {
        let data = TestFont::new()
            .simple("A", Some('A'), 600)
            .raw_table(Tag::new(b"ZZZZ"), vec![1, 2, 3, 4])
            .build();
        let tables = FontTables::new(&data).unwrap();
        match tables.get(Tag::new(b"ZZZZ")) {
            Some(Ok(FontTable::Other(tag, data))) => {
                assert_eq!(tag, Tag::new(b"ZZZZ"));
                assert_eq!(data.as_bytes(), &[1, 2, 3, 4]);
            }
            _ => panic!("ZZZZ should be an Other table"),
        }
        assert!(matches!(tables.get(Tag::new(b"maxp")), Some(Ok(FontTable::Other(..)))));
        assert!(tables.get(Tag::new(b"YYYY")).is_none());
    }
}
