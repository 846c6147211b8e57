//! head, hhea, maxp and hmtx merging

use font_types::{FWord, Fixed, UfWord, Version16Dot16};
use read_fonts::{
    FontRef, TableProvider,
    tables::{head::Head as ReadHead, maxp::Maxp as ReadMaxp},
    types::GlyphId as ReadGlyphId,
};
use write_fonts::tables::{
    head::{Flags, Head, MacStyle},
    hhea::Hhea,
    hmtx::{Hmtx, LongMetric},
    loca::LocaFormat,
    maxp::Maxp,
};

use crate::{
    MergeError, Result,
    context::MergeContext,
    strategies::{Bit, Strategy, merge_bits},
};

/// head.flags: OR the layout bits, keep the base font's bit 2.
const HEAD_FLAGS_BITS: [Bit; 16] = [
    Bit::Any, // baseline at y=0
    Bit::Any, // left sidebearing at x=0
    Bit::First,
    Bit::Any, // force ppem to integer
    Bit::Any, // instructions alter advance width
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::Any, // lossless font data
    Bit::Any, // font converted
    Bit::Any, // optimized for ClearType
    Bit::Any, // last resort font
    Bit::First,
];

/// head.macStyle: style bits survive only when every font has them.
const MAC_STYLE_BITS: [Bit; 16] = [
    Bit::All, // bold
    Bit::All, // italic
    Bit::Any, // underline
    Bit::Any, // outline
    Bit::Any, // shadow
    Bit::All, // condensed
    Bit::All, // extended
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
    Bit::First,
];

fn collect<T, V>(tables: &[T], f: impl Fn(&T) -> V) -> Vec<V> {
    tables.iter().map(f).collect()
}

fn tables<'a, T>(
    fonts: &[FontRef<'a>],
    get: impl Fn(&FontRef<'a>) -> std::result::Result<T, read_fonts::ReadError>,
) -> Result<Vec<T>> {
    let tables = fonts.iter().map(get).collect::<std::result::Result<Vec<_>, _>>()?;
    if tables.is_empty() {
        return Err(MergeError::NoFonts);
    }
    Ok(tables)
}

/// unitsPerEm must match across fonts.
pub fn check_units_per_em(fonts: &[FontRef]) -> Result<u16> {
    let heads = tables(fonts, |f| f.head())?;
    let expected = heads[0].units_per_em();
    match heads.iter().map(ReadHead::units_per_em).find(|&upem| upem != expected) {
        Some(actual) => Err(MergeError::IncompatibleUnitsPerEm { expected, actual }),
        None => Ok(expected),
    }
}

pub fn merge_head(fonts: &[FontRef], loca_format: LocaFormat) -> Result<Head> {
    let heads = tables(fonts, |f| f.head())?;
    let first = &heads[0];
    let flags = merge_bits(&collect(&heads, |t| t.flags().bits()), &HEAD_FLAGS_BITS)?;
    let mac_style = merge_bits(&collect(&heads, |t| t.mac_style().bits()), &MAC_STYLE_BITS)?;

    Ok(Head {
        font_revision: Fixed::from_bits(
            Strategy::Max.apply(&collect(&heads, |t| t.font_revision().to_bits()))?,
        ),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: Flags::from_bits_truncate(flags),
        units_per_em: Strategy::Equal { table: "head", field: "unitsPerEm" }
            .apply(&collect(&heads, ReadHead::units_per_em))?,
        created: first.created(),
        modified: first.modified(),
        x_min: Strategy::Min.apply(&collect(&heads, ReadHead::x_min))?,
        y_min: Strategy::Min.apply(&collect(&heads, ReadHead::y_min))?,
        x_max: Strategy::Max.apply(&collect(&heads, ReadHead::x_max))?,
        y_max: Strategy::Max.apply(&collect(&heads, ReadHead::y_max))?,
        mac_style: MacStyle::from_bits_truncate(mac_style),
        lowest_rec_ppem: Strategy::Max.apply(&collect(&heads, ReadHead::lowest_rec_ppem))?,
        font_direction_hint: first.font_direction_hint(),
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    })
}

pub fn merge_hhea(fonts: &[FontRef], number_of_h_metrics: u16) -> Result<Hhea> {
    let hheas = tables(fonts, |f| f.hhea())?;
    let first = &hheas[0];
    Ok(Hhea {
        ascender: FWord::new(Strategy::Max.apply(&collect(&hheas, |t| t.ascender().to_i16()))?),
        descender: FWord::new(Strategy::Min.apply(&collect(&hheas, |t| t.descender().to_i16()))?),
        line_gap: FWord::new(Strategy::Max.apply(&collect(&hheas, |t| t.line_gap().to_i16()))?),
        advance_width_max: UfWord::new(
            Strategy::Max.apply(&collect(&hheas, |t| t.advance_width_max().to_u16()))?,
        ),
        min_left_side_bearing: FWord::new(
            Strategy::Min.apply(&collect(&hheas, |t| t.min_left_side_bearing().to_i16()))?,
        ),
        min_right_side_bearing: FWord::new(
            Strategy::Min.apply(&collect(&hheas, |t| t.min_right_side_bearing().to_i16()))?,
        ),
        x_max_extent: FWord::new(
            Strategy::Max.apply(&collect(&hheas, |t| t.x_max_extent().to_i16()))?,
        ),
        caret_slope_rise: first.caret_slope_rise(),
        caret_slope_run: first.caret_slope_run(),
        caret_offset: first.caret_offset(),
        number_of_h_metrics,
    })
}

pub fn merge_maxp(fonts: &[FontRef], num_glyphs: u16) -> Result<Maxp> {
    let maxps = tables(fonts, |f| f.maxp())?;
    if maxps[0].version() != Version16Dot16::VERSION_1_0 {
        return Ok(Maxp {
            num_glyphs,
            max_points: None,
            max_contours: None,
            max_composite_points: None,
            max_composite_contours: None,
            max_zones: None,
            max_twilight_points: None,
            max_storage: None,
            max_function_defs: None,
            max_instruction_defs: None,
            max_stack_elements: None,
            max_size_of_instructions: None,
            max_component_elements: None,
            max_component_depth: None,
        });
    }
    // Instruction-related limits belong to the base font's fpgm/prep
    let base = &maxps[0];

    Ok(Maxp {
        num_glyphs,
        max_points: max_of(&maxps, ReadMaxp::max_points)?,
        max_contours: max_of(&maxps, ReadMaxp::max_contours)?,
        max_composite_points: max_of(&maxps, ReadMaxp::max_composite_points)?,
        max_composite_contours: max_of(&maxps, ReadMaxp::max_composite_contours)?,
        max_zones: max_of(&maxps, ReadMaxp::max_zones)?,
        max_twilight_points: max_of(&maxps, ReadMaxp::max_twilight_points)?,
        max_storage: base.max_storage().or(Some(0)),
        max_function_defs: base.max_function_defs().or(Some(0)),
        max_instruction_defs: base.max_instruction_defs().or(Some(0)),
        max_stack_elements: max_of(&maxps, ReadMaxp::max_stack_elements)?,
        max_size_of_instructions: max_of(&maxps, ReadMaxp::max_size_of_instructions)?,
        max_component_elements: max_of(&maxps, ReadMaxp::max_component_elements)?,
        max_component_depth: max_of(&maxps, ReadMaxp::max_component_depth)?,
    })
}

fn max_of<'a>(
    maxps: &[ReadMaxp<'a>],
    field: impl Fn(&ReadMaxp<'a>) -> Option<u16>,
) -> Result<Option<u16>> {
    Strategy::Max.apply(&collect(maxps, |t| field(t).unwrap_or(0))).map(Some)
}

/// hmtx in merged glyph order, each glyph keeping the metrics of the font it
/// came from. Returns the table and its numberOfHMetrics.
pub fn merge_hmtx(ctx: &MergeContext) -> Result<(Hmtx, u16)> {
    let hmtxs = tables(ctx.fonts(), |f| f.hmtx())?;
    let metrics: Vec<LongMetric> = ctx
        .glyph_order()
        .origins()
        .iter()
        .map(|&(index, gid)| {
            let hmtx = &hmtxs[index.0];
            let gid = ReadGlyphId::new(gid.to_u32());
            LongMetric {
                advance: hmtx.advance(gid).unwrap_or(0),
                side_bearing: hmtx.side_bearing(gid).unwrap_or(0),
            }
        })
        .collect();

    // Trailing glyphs sharing the last advance only store their side bearing
    let mut count = metrics.len();
    while count > 1 && metrics[count - 2].advance == metrics[count - 1].advance {
        count -= 1;
    }
    let left_side_bearings = metrics[count..].iter().map(|m| m.side_bearing).collect();
    let mut h_metrics = metrics;
    h_metrics.truncate(count);
    Ok((Hmtx::new(h_metrics, left_side_bearings), count as u16))
}
