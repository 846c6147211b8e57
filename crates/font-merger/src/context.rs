//! Merge context
//!
//! - `GidRemap`: source glyph id to merged glyph id, one per font
//! - `MergeContext`: the fonts, their glyph order and options, passed to
//!   every table merger

use read_fonts::FontRef;

use crate::{
    glyph_order::GlyphOrder,
    options::Options,
    types::{FontIndex, GlyphId, MegaGlyphId},
};

/// Mapping from one font's glyph ids to merged glyph ids
#[derive(Debug, Clone)]
pub struct GidRemap(Vec<MegaGlyphId>);

impl GidRemap {
    fn new(glyph_order: &GlyphOrder, font: usize) -> Self {
        let inner = glyph_order
            .font_mapping(font)
            .values()
            .filter_map(|name| glyph_order.mega_id(name))
            .collect();
        Self(inner)
    }

    pub fn get(&self, old: GlyphId) -> Option<MegaGlyphId> {
        self.0.get(old.to_u16() as usize).copied()
    }

    pub fn get_u16(&self, old: u16) -> Option<u16> {
        self.get(GlyphId::new(old)).map(MegaGlyphId::to_u16)
    }
}

/// Central context for the merge operation
pub struct MergeContext<'a> {
    fonts: &'a [FontRef<'a>],
    glyph_order: GlyphOrder,
    remaps: Vec<GidRemap>,
    options: &'a Options,
}

impl<'a> MergeContext<'a> {
    pub fn new(fonts: &'a [FontRef<'a>], glyph_order: GlyphOrder, options: &'a Options) -> Self {
        let remaps = (0..fonts.len()).map(|i| GidRemap::new(&glyph_order, i)).collect();
        Self { fonts, glyph_order, remaps, options }
    }

    pub fn fonts(&self) -> &[FontRef<'a>] {
        self.fonts
    }

    pub fn font(&self, index: FontIndex) -> &FontRef<'a> {
        &self.fonts[index.0]
    }

    /// The base font, whose naming, cmap entries and layout win.
    pub fn base(&self) -> &FontRef<'a> {
        &self.fonts[0]
    }

    pub fn glyph_order(&self) -> &GlyphOrder {
        &self.glyph_order
    }

    pub fn total_glyphs(&self) -> u16 {
        self.glyph_order.total_glyphs()
    }

    pub fn remap(&self, font: usize) -> &GidRemap {
        &self.remaps[font]
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// Iterate over fonts with their index and remap
    pub fn fonts_with_remap(&self) -> impl Iterator<Item = (FontIndex, &FontRef<'a>, &GidRemap)> {
        self.fonts
            .iter()
            .zip(&self.remaps)
            .enumerate()
            .map(|(i, (font, remap))| (FontIndex(i), font, remap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_is_dense_over_source_ids() {
        let remap = GidRemap(vec![MegaGlyphId::new(0), MegaGlyphId::new(4)]);
        assert_eq!(remap.get(GlyphId::new(1)), Some(MegaGlyphId::new(4)));
        assert_eq!(remap.get_u16(0), Some(0));
        assert_eq!(remap.get(GlyphId::new(2)), None);
    }
}
