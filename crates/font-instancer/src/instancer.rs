//! Variable font instantiation.

use log::{debug, info};
use read_fonts::{FontRef, TableProvider, types::{GlyphId, Tag}};
use warpnine_font_ops::VARIATION_ONLY_TAGS;
use write_fonts::{
    FontBuilder,
    tables::{
        glyf::{GlyfLocaBuilder, Glyph as WriteGlyph},
        gvar::{GlyphVariations, Gvar},
    },
};

use crate::{
    AxisLocation,
    error::{Error, Result},
    metrics::{FontBounds, MetricDeltas, build_head, build_hhea, build_hmtx, build_os2, build_post},
    outline::{HorizontalMetrics, InstancedGlyph, glyph_bbox, instance_glyph, recompute_composite_bboxes},
    pins::{Pins, Unlisted},
    variations::{LAYOUT_TAGS, layout_tables, partial_avar, partial_fvar, partial_stat},
};

const REPLACED_TABLES: [Tag; 7] = [
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
    Tag::new(b"hmtx"),
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"OS/2"),
    Tag::new(b"post"),
];

/// Dropped from partial instances; their deltas are not re-expressed.
const PARTIAL_DROPPED_TABLES: [Tag; 4] =
    [Tag::new(b"cvar"), Tag::new(b"HVAR"), Tag::new(b"MVAR"), Tag::new(b"VVAR")];

const REMOVED_TABLES: [Tag; 1] = [Tag::new(b"DSIG")];

/// Instantiate a variable font at the given axis locations.
///
/// Axes not named in `locations` stay variable. When every axis is pinned
/// the result is a static font:
/// 1. gvar deltas are applied to outlines and phantom points
/// 2. composite bounding boxes and font-wide bounds are recomputed
/// 3. MVAR deltas are applied to hhea, OS/2 and post
/// 4. variation tables (fvar, gvar, avar, STAT, etc.) are removed
///
/// # Errors
///
/// - `Error::NotVariableFont` if the font has no fvar table
/// - `Error::NoCff2Support` if the font uses CFF outlines (no glyf table)
/// - `Error::NoGvar` if the font has no gvar table
/// - `Error::AxisNotFound` / `Error::AxisOutOfRange` for invalid locations
pub fn instantiate(data: &[u8], locations: &[AxisLocation]) -> Result<Vec<u8>> {
    instantiate_with(data, locations, Unlisted::KeepVariable)
}

/// Like [`instantiate`], but axes missing from `locations` are pinned at
/// their default, so the result is always static.
pub fn instantiate_static(data: &[u8], locations: &[AxisLocation]) -> Result<Vec<u8>> {
    instantiate_with(data, locations, Unlisted::PinDefault)
}

fn instantiate_with(data: &[u8], locations: &[AxisLocation], unlisted: Unlisted) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;

    let fvar = font.fvar().map_err(|_| Error::NotVariableFont)?;
    let glyf = font.glyf().map_err(|_| Error::NoCff2Support)?;
    let loca = font.loca(None).map_err(|_| Error::NoCff2Support)?;
    let gvar = font.gvar().map_err(|_| Error::NoGvar)?;

    let pins = Pins::resolve(&font, locations, unlisted)?;
    let full = pins.is_full();
    info!(
        "Instancing at {} ({})",
        pins.describe(),
        if full { "static" } else { "partial" }
    );

    let num_glyphs = font.maxp()?.num_glyphs() as u32;
    let hmtx = font.hmtx()?;

    let mut instanced: Vec<InstancedGlyph> = (0..num_glyphs)
        .map(|glyph_id| {
            let gid = GlyphId::new(glyph_id);
            let metrics = HorizontalMetrics {
                advance: hmtx.advance(gid).unwrap_or(0),
                lsb: hmtx.side_bearing(gid).unwrap_or(0),
            };
            let glyph = loca.get_glyf(gid, &glyf).ok().flatten();
            let var_data = gvar.glyph_variation_data(gid).ok().flatten();
            instance_glyph(glyph, var_data, metrics, &pins)
        })
        .collect();

    let mut glyphs: Vec<WriteGlyph> =
        instanced.iter_mut().map(|g| std::mem::replace(&mut g.glyph, WriteGlyph::Empty)).collect();
    recompute_composite_bboxes(&mut glyphs);

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut bounds = FontBounds::new();
    let mut advances = Vec::with_capacity(glyphs.len());
    let mut lsbs = Vec::with_capacity(glyphs.len());
    for (glyph, inst) in glyphs.iter().zip(&instanced) {
        let lsb = match glyph_bbox(glyph) {
            Some(bbox) => bbox.x_min.saturating_sub(inst.origin_x),
            None => inst.lsb,
        };
        bounds.update(glyph, inst.advance, lsb);
        advances.push(inst.advance);
        lsbs.push(lsb);
        glyf_builder.add_glyph(glyph)?;
    }
    let bounds = bounds.finalize();

    let (new_glyf, new_loca, loca_format) = glyf_builder.build();
    let (new_hmtx, num_h_metrics) = build_hmtx(&advances, &lsbs);
    let deltas = MetricDeltas::new(font.mvar().ok(), pins.coords());

    let mut builder = FontBuilder::new();
    builder.add_table(&new_glyf)?;
    builder.add_table(&new_loca)?;
    builder.add_table(&new_hmtx)?;
    if let Ok(head) = font.head() {
        builder.add_table(&build_head(&head, &bounds, loca_format))?;
    }
    if let Ok(hhea) = font.hhea() {
        builder.add_table(&build_hhea(&hhea, &bounds, &deltas, num_h_metrics))?;
    }
    if let Ok(os2) = font.os2() {
        builder.add_table(&build_os2(&os2, &deltas, &pins))?;
    }
    if let Ok(post) = font.post() {
        builder.add_table(&build_post(&post, &deltas))?;
    }

    let layout = layout_tables(&font, &pins)?;
    let mut replaced: Vec<Tag> = Vec::new();
    if let Some(gsub) = &layout.gsub {
        builder.add_table(gsub)?;
        replaced.push(LAYOUT_TAGS[0]);
    }
    if let Some(gpos) = &layout.gpos {
        builder.add_table(gpos)?;
        replaced.push(LAYOUT_TAGS[1]);
    }
    if let Some(gdef) = &layout.gdef {
        builder.add_table(gdef)?;
        replaced.push(LAYOUT_TAGS[2]);
    }

    let dropped: Vec<Tag> = if full {
        VARIATION_ONLY_TAGS.to_vec()
    } else {
        let remaining = pins.variable_axes().len() as u16;
        let variations: Vec<GlyphVariations> = instanced
            .into_iter()
            .enumerate()
            .map(|(gid, inst)| GlyphVariations::new(GlyphId::new(gid as u32), inst.variations))
            .collect();
        builder.add_table(&Gvar::new(variations, remaining)?)?;
        builder.add_table(&partial_fvar(&fvar, &pins)?)?;
        if let Ok(stat) = font.stat() {
            builder.add_table(&partial_stat(&stat, &pins)?)?;
        }
        if let Some(avar) = font.table_data(Tag::new(b"avar"))
            && let Some(raw) = partial_avar(avar.as_bytes(), &pins)?
        {
            builder.add_raw(Tag::new(b"avar"), raw);
        }
        let mut dropped = PARTIAL_DROPPED_TABLES.to_vec();
        dropped.extend([Tag::new(b"fvar"), Tag::new(b"gvar"), Tag::new(b"STAT"), Tag::new(b"avar")]);
        dropped
    };
    debug!("Dropping tables {dropped:?}");

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if !dropped.contains(&tag)
            && !REPLACED_TABLES.contains(&tag)
            && !REMOVED_TABLES.contains(&tag)
            && !replaced.contains(&tag)
            && let Some(data) = font.table_data(tag)
        {
            builder.add_raw(tag, data);
        }
    }

    Ok(builder.build())
}
