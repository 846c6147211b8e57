//! glyf table merging (TrueType outlines)
//!
//! Per-glyph hinting instructions are stripped from every font except the
//! base. Instructions may call `fpgm` functions or read `cvt` entries, and
//! only the base font's `fpgm`, `prep` and `cvt ` are carried over.

use std::collections::HashSet;

use log::debug;
use read_fonts::{
    TableProvider,
    tables::glyf::{Anchor as ReadAnchor, Glyph as ReadGlyph},
    types::{GlyphId as ReadGlyphId, GlyphId16},
};
use write_fonts::tables::{
    glyf::{
        Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, Glyf, GlyfLocaBuilder,
        Glyph, SimpleGlyph, Transform,
    },
    loca::{Loca, LocaFormat},
};

use crate::{MergeError, Result, context::GidRemap, context::MergeContext};

/// Merge glyf tables from multiple fonts, in merged glyph order.
pub fn merge_glyf(ctx: &MergeContext) -> Result<(Glyf, Loca, LocaFormat)> {
    let mut glyphs = Vec::with_capacity(ctx.total_glyphs() as usize);
    for &(index, gid) in ctx.glyph_order().origins() {
        let font = ctx.font(index);
        let glyf = font.glyf()?;
        let loca = font.loca(None)?;
        let glyph = match loca.get_glyf(ReadGlyphId::new(gid.to_u32()), &glyf)? {
            Some(glyph) => convert_glyph(&glyph, ctx.remap(index.0), !index.is_base()),
            None => Glyph::Empty,
        };
        glyphs.push(glyph);
    }

    // OTS (used by Firefox) rejects composites referencing empty glyphs
    let empty: HashSet<u16> = glyphs
        .iter()
        .enumerate()
        .filter(|(_, g)| matches!(g, Glyph::Empty))
        .map(|(gid, _)| gid as u16)
        .collect();
    let mut emptied = 0usize;
    for glyph in &mut glyphs {
        if let Glyph::Composite(composite) = glyph
            && composite.components().iter().any(|c| empty.contains(&c.glyph.to_u16()))
        {
            *glyph = Glyph::Empty;
            emptied += 1;
        }
    }
    if emptied > 0 {
        debug!("Emptied {emptied} composites that referenced empty glyphs");
    }

    let mut builder = GlyfLocaBuilder::new();
    for glyph in &glyphs {
        builder.add_glyph(glyph)?;
    }
    Ok(builder.build())
}

/// Check that every font has TrueType outlines.
pub fn check_outlines(ctx: &MergeContext) -> Result<()> {
    for (index, font, _) in ctx.fonts_with_remap() {
        if font.glyf().is_err() {
            return Err(MergeError::CffNotSupported(index.0));
        }
    }
    Ok(())
}

/// Convert a read-fonts glyph to a write-fonts glyph, remapping component ids.
fn convert_glyph(glyph: &ReadGlyph, remap: &GidRemap, strip_hinting: bool) -> Glyph {
    match glyph {
        ReadGlyph::Simple(simple) => {
            let mut points = simple.points();
            let mut start = 0usize;
            let contours: Vec<Contour> = simple
                .end_pts_of_contours()
                .iter()
                .map(|end| {
                    let end = end.get() as usize;
                    let contour: Vec<_> = points.by_ref().take(end + 1 - start).collect();
                    start = end + 1;
                    contour.into()
                })
                .collect();
            let instructions = if strip_hinting { vec![] } else { simple.instructions().to_vec() };
            Glyph::Simple(SimpleGlyph { bbox: bbox(glyph), contours, instructions })
        }
        ReadGlyph::Composite(composite) => {
            let mut components = composite.components().map(|comp| {
                let new_gid = remap.get_u16(comp.glyph.to_u16()).unwrap_or(0);
                let anchor = match comp.anchor {
                    ReadAnchor::Offset { x, y } => Anchor::Offset { x, y },
                    ReadAnchor::Point { base, component } => Anchor::Point { base, component },
                };
                let t = comp.transform;
                let flags: ComponentFlags = comp.flags.into();
                Component {
                    glyph: GlyphId16::new(new_gid),
                    anchor,
                    transform: Transform { xx: t.xx, yx: t.yx, xy: t.xy, yy: t.yy },
                    flags,
                }
            });
            let bbox = bbox(glyph);
            let Some(first) = components.next() else {
                return Glyph::Empty;
            };
            let mut out = CompositeGlyph::new(first, bbox);
            for comp in components {
                out.add_component(comp, bbox);
            }
            Glyph::Composite(out)
        }
    }
}

fn bbox(glyph: &ReadGlyph) -> Bbox {
    match glyph {
        ReadGlyph::Simple(g) => {
            Bbox { x_min: g.x_min(), y_min: g.y_min(), x_max: g.x_max(), y_max: g.y_max() }
        }
        ReadGlyph::Composite(g) => {
            Bbox { x_min: g.x_min(), y_min: g.y_min(), x_max: g.x_max(), y_max: g.y_max() }
        }
    }
}
