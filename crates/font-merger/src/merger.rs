//! Main Merger implementation

use std::collections::HashSet;

use log::{info, warn};
use read_fonts::{FontRef, types::Tag};
use warpnine_font_gsub::{CaltRegistration, register_calt};
use write_fonts::FontBuilder;

use crate::{
    MergeError, Result,
    context::MergeContext,
    glyph_order::GlyphOrder,
    options::Options,
    tables::{
        cmap::merge_cmap,
        glyf::{check_outlines, merge_glyf},
        layout::merge_gsub,
        metrics::{check_units_per_em, merge_head, merge_hhea, merge_hmtx, merge_maxp},
        os2::merge_os2,
        post::merge_post,
    },
};

/// Tables rebuilt by the merger, or deliberately left out because they
/// cannot be carried over from the base font alone.
const HANDLED_TABLES: &[[u8; 4]] = &[
    *b"head", *b"maxp", *b"cmap", *b"hmtx", *b"hhea", *b"post", *b"OS/2", *b"glyf", *b"loca",
    *b"GSUB", *b"vhea", *b"vmtx", *b"DSIG", *b"hdmx", *b"LTSH", *b"VDMX",
];

/// Font merger that combines multiple fonts into one
#[derive(Debug, Default)]
pub struct Merger {
    options: Options,
}

impl Merger {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Merge font files given as raw bytes. The first one is the base font.
    pub fn merge(&self, font_data: &[&[u8]]) -> Result<Vec<u8>> {
        if font_data.is_empty() {
            return Err(MergeError::NoFonts);
        }
        let fonts: Vec<_> = font_data
            .iter()
            .map(|data| FontRef::new(data))
            .collect::<std::result::Result<_, _>>()?;
        self.merge_fonts(&fonts)
    }

    /// Merge already parsed fonts. The first one is the base font.
    pub fn merge_fonts(&self, fonts: &[FontRef]) -> Result<Vec<u8>> {
        if fonts.is_empty() {
            return Err(MergeError::NoFonts);
        }
        let units_per_em = check_units_per_em(fonts)?;

        let glyph_order = GlyphOrder::compute(fonts, self.options.collisions)?;
        info!(
            "Merging {} fonts ({units_per_em} upem): {} glyphs, {} deduplicated, {} renamed",
            fonts.len(),
            glyph_order.total_glyphs(),
            glyph_order.deduplicated(),
            glyph_order.renamed().len()
        );

        let ctx = MergeContext::new(fonts, glyph_order, &self.options);
        check_outlines(&ctx)?;

        let cmap = merge_cmap(&ctx)?;
        let (glyf, loca, loca_format) = merge_glyf(&ctx)?;
        let (hmtx, number_of_h_metrics) = merge_hmtx(&ctx)?;
        let head = merge_head(ctx.fonts(), loca_format)?;
        let hhea = merge_hhea(ctx.fonts(), number_of_h_metrics)?;
        let maxp = merge_maxp(ctx.fonts(), ctx.total_glyphs())?;
        let os2 = merge_os2(&ctx)?;
        let post = merge_post(&ctx)?;
        let gsub = merge_gsub(&ctx)?;

        let mut builder = FontBuilder::new();
        builder.add_table(&head)?;
        builder.add_table(&maxp)?;
        builder.add_table(&hhea)?;
        builder.add_table(&hmtx)?;
        builder.add_table(&cmap)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
        builder.add_table(&post)?;
        if let Some(os2) = os2.filter(|_| !self.options.should_drop(Tag::new(b"OS/2"))) {
            builder.add_table(&os2)?;
        }
        if let Some(gsub) = gsub.filter(|_| !self.options.should_drop(Tag::new(b"GSUB"))) {
            builder.add_table(&gsub)?;
        }
        self.copy_other_tables(&mut builder, ctx.base());
        let merged = builder.build();

        if self.options.skip_calt_fix {
            return Ok(merged);
        }
        match register_calt(&merged)? {
            CaltRegistration::Registered { lang_systems, data } => {
                info!("Registered calt/rclt in {lang_systems} language systems");
                Ok(data)
            }
            _ => Ok(merged),
        }
    }

    /// Copy the base font's remaining tables (name, GPOS, GDEF, hinting
    /// programs, ...) verbatim.
    fn copy_other_tables(&self, builder: &mut FontBuilder, font: &FontRef) {
        let handled: HashSet<Tag> = HANDLED_TABLES.iter().map(Tag::new).collect();
        for record in font.table_directory.table_records() {
            let tag = record.tag();
            if tag == Tag::new(b"vhea") {
                warn!("Vertical metrics are not merged, vhea/vmtx left out");
            }
            if handled.contains(&tag) || self.options.should_drop(tag) || builder.contains(tag) {
                continue;
            }
            if let Some(data) = font.table_data(tag) {
                builder.add_raw(tag, data.as_bytes().to_vec());
            }
        }
    }
}
