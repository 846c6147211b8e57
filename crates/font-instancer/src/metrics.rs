//! Metrics tables of an instance: hmtx, bounds, and MVAR-adjusted hhea/OS/2/post.

use read_fonts::{
    tables::{
        head::Head, hhea::Hhea, mvar::Mvar, mvar::tags as mvar_tags, os2::Os2, post::Post,
    },
    types::{F2Dot14, Tag},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{Bbox, Glyph as WriteGlyph},
        head::Head as WriteHead,
        hhea::Hhea as WriteHhea,
        hmtx::{Hmtx as WriteHmtx, LongMetric},
        loca::LocaFormat,
        os2::Os2 as WriteOs2,
        post::Post as WritePost,
    },
};

use crate::{outline::clamp_i16, pins::Pins};

/// Build hmtx, folding the trailing run of equal advances into the
/// left-side-bearing array. Returns the table and its `numberOfHMetrics`.
pub(crate) fn build_hmtx(advances: &[u16], lsbs: &[i16]) -> (WriteHmtx, u16) {
    let mut num_h_metrics = advances.len();
    while num_h_metrics > 1 && advances[num_h_metrics - 1] == advances[num_h_metrics - 2] {
        num_h_metrics -= 1;
    }

    let mut h_metrics = Vec::with_capacity(num_h_metrics);
    let mut left_side_bearings = Vec::with_capacity(advances.len() - num_h_metrics);
    for (gid, (&advance, &side_bearing)) in advances.iter().zip(lsbs).enumerate() {
        if gid < num_h_metrics {
            h_metrics.push(LongMetric { advance, side_bearing });
        } else {
            left_side_bearings.push(side_bearing);
        }
    }

    (WriteHmtx { h_metrics, left_side_bearings }, num_h_metrics as u16)
}

/// Font-wide extremes computed from the instanced glyphs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FontBounds {
    pub x_min: i16,
    pub x_max: i16,
    pub y_min: i16,
    pub y_max: i16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub advance_width_max: u16,
}

impl FontBounds {
    pub fn new() -> Self {
        FontBounds {
            x_min: i16::MAX,
            x_max: i16::MIN,
            y_min: i16::MAX,
            y_max: i16::MIN,
            min_left_side_bearing: i16::MAX,
            min_right_side_bearing: i16::MAX,
            x_max_extent: i16::MIN,
            advance_width_max: 0,
        }
    }

    pub fn update(&mut self, glyph: &WriteGlyph, advance: u16, lsb: i16) {
        self.advance_width_max = self.advance_width_max.max(advance);

        let bbox = match glyph {
            WriteGlyph::Simple(s) => s.bbox,
            WriteGlyph::Composite(c) => c.bbox,
            WriteGlyph::Empty => return,
        };
        if bbox == Bbox::default() {
            return;
        }

        self.x_min = self.x_min.min(bbox.x_min);
        self.x_max = self.x_max.max(bbox.x_max);
        self.y_min = self.y_min.min(bbox.y_min);
        self.y_max = self.y_max.max(bbox.y_max);

        self.min_left_side_bearing = self.min_left_side_bearing.min(lsb);

        let glyph_width = i32::from(bbox.x_max) - i32::from(bbox.x_min);
        let rsb = i32::from(advance) - i32::from(lsb) - glyph_width;
        self.min_right_side_bearing = self.min_right_side_bearing.min(clamp_i16(rsb));

        let extent = i32::from(lsb) + glyph_width;
        self.x_max_extent = self.x_max_extent.max(clamp_i16(extent));
    }

    /// Replace untouched sentinels with zero (fonts without any outline).
    pub fn finalize(mut self) -> Self {
        for value in [
            &mut self.x_min,
            &mut self.y_min,
            &mut self.min_left_side_bearing,
            &mut self.min_right_side_bearing,
        ] {
            if *value == i16::MAX {
                *value = 0;
            }
        }
        for value in [&mut self.x_max, &mut self.y_max, &mut self.x_max_extent] {
            if *value == i16::MIN {
                *value = 0;
            }
        }
        self
    }
}

pub(crate) fn build_head(original: &Head, bounds: &FontBounds, loca_format: LocaFormat) -> WriteHead {
    let mut head: WriteHead = original.to_owned_table();
    head.x_min = bounds.x_min;
    head.y_min = bounds.y_min;
    head.x_max = bounds.x_max;
    head.y_max = bounds.y_max;
    head.index_to_loc_format = match loca_format {
        LocaFormat::Short => 0,
        LocaFormat::Long => 1,
    };
    head
}

/// MVAR deltas at the pinned location.
pub(crate) struct MetricDeltas<'a> {
    mvar: Option<Mvar<'a>>,
    coords: &'a [F2Dot14],
}

impl<'a> MetricDeltas<'a> {
    pub fn new(mvar: Option<Mvar<'a>>, coords: &'a [F2Dot14]) -> Self {
        Self { mvar, coords }
    }

    fn delta(&self, tag: Tag) -> i32 {
        self.mvar
            .as_ref()
            .and_then(|m| m.metric_delta(tag, self.coords).ok())
            .map(|f| f.to_f64().round() as i32)
            .unwrap_or(0)
    }

    fn apply(&self, value: i16, tag: Tag) -> i16 {
        clamp_i16(i32::from(value) + self.delta(tag))
    }
}

pub(crate) fn build_hhea(
    original: &Hhea,
    bounds: &FontBounds,
    deltas: &MetricDeltas,
    num_h_metrics: u16,
) -> WriteHhea {
    let mut hhea: WriteHhea = original.to_owned_table();
    hhea.number_of_h_metrics = num_h_metrics;
    hhea.ascender = deltas.apply(original.ascender().to_i16(), mvar_tags::HASC).into();
    hhea.descender = deltas.apply(original.descender().to_i16(), mvar_tags::HDSC).into();
    hhea.line_gap = deltas.apply(original.line_gap().to_i16(), mvar_tags::HLGP).into();
    hhea.advance_width_max = bounds.advance_width_max.into();
    hhea.min_left_side_bearing = bounds.min_left_side_bearing.into();
    hhea.min_right_side_bearing = bounds.min_right_side_bearing.into();
    hhea.x_max_extent = bounds.x_max_extent.into();
    hhea.caret_slope_rise = deltas.apply(original.caret_slope_rise(), mvar_tags::HCRS);
    hhea.caret_slope_run = deltas.apply(original.caret_slope_run(), mvar_tags::HCRN);
    hhea.caret_offset = deltas.apply(original.caret_offset(), mvar_tags::HCOF);
    hhea
}

/// Convert a `wdth` value (percentage, typically 50-200) to `usWidthClass` (1-9).
pub fn wdth_to_width_class(wdth: f32) -> u16 {
    // 1=Ultra-condensed (50%), 2=Extra-condensed (62.5%), 3=Condensed (75%),
    // 4=Semi-condensed (87.5%), 5=Normal (100%), 6=Semi-expanded (112.5%),
    // 7=Expanded (125%), 8=Extra-expanded (150%), 9=Ultra-expanded (200%)
    match wdth {
        w if w <= 56.25 => 1,
        w if w <= 68.75 => 2,
        w if w <= 81.25 => 3,
        w if w <= 93.75 => 4,
        w if w <= 106.25 => 5,
        w if w <= 118.75 => 6,
        w if w <= 137.5 => 7,
        w if w <= 175.0 => 8,
        _ => 9,
    }
}

pub(crate) fn build_os2(original: &Os2, deltas: &MetricDeltas, pins: &Pins) -> WriteOs2 {
    let mut os2: WriteOs2 = original.to_owned_table();

    if let Some(wght) = pins.value(Tag::new(b"wght")) {
        os2.us_weight_class = wght.round().clamp(1.0, 1000.0) as u16;
    }
    if let Some(wdth) = pins.value(Tag::new(b"wdth")) {
        os2.us_width_class = wdth_to_width_class(wdth);
    }

    os2.y_strikeout_size = deltas.apply(original.y_strikeout_size(), mvar_tags::STRS);
    os2.y_strikeout_position = deltas.apply(original.y_strikeout_position(), mvar_tags::STRO);
    os2.s_typo_ascender = deltas.apply(original.s_typo_ascender(), mvar_tags::HASC);
    os2.s_typo_descender = deltas.apply(original.s_typo_descender(), mvar_tags::HDSC);
    os2.s_typo_line_gap = deltas.apply(original.s_typo_line_gap(), mvar_tags::HLGP);

    os2.y_subscript_x_offset = deltas.apply(original.y_subscript_x_offset(), mvar_tags::SBXO);
    os2.y_subscript_y_offset = deltas.apply(original.y_subscript_y_offset(), mvar_tags::SBYO);
    os2.y_subscript_x_size = deltas.apply(original.y_subscript_x_size(), mvar_tags::SBXS);
    os2.y_subscript_y_size = deltas.apply(original.y_subscript_y_size(), mvar_tags::SBYS);

    os2.y_superscript_x_offset = deltas.apply(original.y_superscript_x_offset(), mvar_tags::SPXO);
    os2.y_superscript_y_offset = deltas.apply(original.y_superscript_y_offset(), mvar_tags::SPYO);
    os2.y_superscript_x_size = deltas.apply(original.y_superscript_x_size(), mvar_tags::SPXS);
    os2.y_superscript_y_size = deltas.apply(original.y_superscript_y_size(), mvar_tags::SPYS);

    os2.sx_height = original.sx_height().map(|v| deltas.apply(v, mvar_tags::XHGT));
    os2.s_cap_height = original.s_cap_height().map(|v| deltas.apply(v, mvar_tags::CPHT));
    os2
}

pub(crate) fn build_post(original: &Post, deltas: &MetricDeltas) -> WritePost {
    let mut post: WritePost = original.to_owned_table();
    post.underline_position =
        deltas.apply(original.underline_position().to_i16(), mvar_tags::UNDO).into();
    post.underline_thickness =
        deltas.apply(original.underline_thickness().to_i16(), mvar_tags::UNDS).into();
    post
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_class_follows_the_opentype_table() {
        assert_eq!(wdth_to_width_class(50.0), 1);
        assert_eq!(wdth_to_width_class(62.5), 2);
        assert_eq!(wdth_to_width_class(75.0), 3);
        assert_eq!(wdth_to_width_class(87.5), 4);
        assert_eq!(wdth_to_width_class(100.0), 5);
        assert_eq!(wdth_to_width_class(112.5), 6);
        assert_eq!(wdth_to_width_class(125.0), 7);
        assert_eq!(wdth_to_width_class(150.0), 8);
        assert_eq!(wdth_to_width_class(200.0), 9);
    }

    #[test]
    fn hmtx_folds_trailing_equal_advances() {
        let (hmtx, count) = build_hmtx(&[500, 600, 600, 600], &[10, 20, 30, 40]);
        assert_eq!(count, 2);
        assert_eq!(hmtx.h_metrics.len(), 2);
        assert_eq!(hmtx.h_metrics[1].advance, 600);
        assert_eq!(hmtx.h_metrics[1].side_bearing, 20);
        assert_eq!(hmtx.left_side_bearings, vec![30, 40]);
    }

    #[test]
    fn bounds_ignore_empty_glyphs() {
        let mut bounds = FontBounds::new();
        bounds.update(&WriteGlyph::Empty, 250, 0);
        let bounds = bounds.finalize();
        assert_eq!(bounds.advance_width_max, 250);
        assert_eq!((bounds.x_min, bounds.x_max, bounds.x_max_extent), (0, 0, 0));
    }
}
