//! Condensed-width transform: a horizontal-only scale of every outline and
//! every width-derived metric.

use anyhow::{Context, Result};
use kurbo::{Affine, Point};
use log::debug;
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{
        Anchor as ReadAnchor, CompositeGlyph as ReadCompositeGlyph, CurvePoint,
        Glyph as ReadGlyph, SimpleGlyph as ReadSimpleGlyph,
    },
    types::{F2Dot14, GlyphId, Tag},
};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        glyf::{
            Anchor, Bbox, Component, CompositeGlyph, Contour, GlyfLocaBuilder, Glyph,
            SimpleGlyph, Transform,
        },
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        os2::Os2,
    },
};

/// Scale used for Warpnine Sans Condensed.
pub const DEFAULT_SCALE: f64 = 0.85;

/// `usWidthClass` of condensed fonts.
pub const WIDTH_CLASS_CONDENSED: u16 = 3;

const REBUILT_TABLES: [Tag; 6] = [
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
    Tag::new(b"hmtx"),
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"OS/2"),
];

/// A horizontal scale together with the OS/2 classes to stamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalScale {
    pub scale_x: f64,
    pub width_class: Option<u16>,
    pub weight_class: Option<u16>,
}

impl HorizontalScale {
    /// The condensed transform: [`DEFAULT_SCALE`] and width class 3.
    pub const CONDENSED: Self = Self {
        scale_x: DEFAULT_SCALE,
        width_class: Some(WIDTH_CLASS_CONDENSED),
        weight_class: None,
    };

    pub fn new(scale_x: f64) -> Self {
        Self { scale_x, width_class: None, weight_class: None }
    }

    pub fn width_class(mut self, width_class: u16) -> Self {
        self.width_class = Some(width_class);
        self
    }

    pub fn weight_class(mut self, weight_class: u16) -> Self {
        self.weight_class = Some(weight_class);
        self
    }

    fn affine(&self) -> Affine {
        Affine::scale_non_uniform(self.scale_x, 1.0)
    }

    fn x(&self, value: i16) -> i16 {
        (f64::from(value) * self.scale_x).round() as i16
    }

    /// `S·T·S⁻¹` for `S = diag(scale_x, 1)`: the y-to-x term grows with the
    /// scale and the x-to-y term shrinks by it.
    fn transform(&self, t: &Transform) -> Transform {
        Transform {
            xx: t.xx,
            yx: F2Dot14::from_f32((f64::from(t.yx.to_f32()) / self.scale_x) as f32),
            xy: F2Dot14::from_f32((f64::from(t.xy.to_f32()) * self.scale_x) as f32),
            yy: t.yy,
        }
    }

    fn advance(&self, value: u16) -> u16 {
        (f64::from(value) * self.scale_x).round() as u16
    }

    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let font = FontRef::new(data).context("Failed to parse font")?;
        let mut builder = FontBuilder::new();
        for record in font.table_directory.table_records() {
            let tag = record.tag();
            if REBUILT_TABLES.contains(&tag) {
                continue;
            }
            if let Some(table_data) = font.table_data(tag) {
                builder.add_raw(tag, table_data);
            }
        }

        let loca_format = self.scale_glyf(&font, &mut builder)?;

        let mut head: Head = font.head()?.to_owned_table();
        head.x_min = self.x(head.x_min);
        head.x_max = self.x(head.x_max);
        if let Some(format) = loca_format {
            head.index_to_loc_format = match format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            };
        }
        builder.add_table(&head)?;

        let hhea = font.hhea()?;
        builder.add_table(&self.scale_hmtx(&font, hhea.number_of_h_metrics())?)?;

        let mut hhea: Hhea = hhea.to_owned_table();
        hhea.advance_width_max = self.advance(hhea.advance_width_max.to_u16()).into();
        hhea.min_left_side_bearing = self.x(hhea.min_left_side_bearing.to_i16()).into();
        hhea.min_right_side_bearing = self.x(hhea.min_right_side_bearing.to_i16()).into();
        hhea.x_max_extent = self.x(hhea.x_max_extent.to_i16()).into();
        builder.add_table(&hhea)?;

        if let Ok(os2) = font.os2() {
            let mut os2: Os2 = os2.to_owned_table();
            os2.x_avg_char_width = self.x(os2.x_avg_char_width);
            if let Some(width_class) = self.width_class {
                os2.us_width_class = width_class;
            }
            if let Some(weight_class) = self.weight_class {
                os2.us_weight_class = weight_class;
            }
            builder.add_table(&os2)?;
        }

        debug!("Scaled font horizontally by {:.0}%", self.scale_x * 100.0);
        Ok(builder.build())
    }

    /// Rebuild glyf/loca with scaled outlines. `None` for fonts without glyf.
    fn scale_glyf(&self, font: &FontRef, builder: &mut FontBuilder) -> Result<Option<LocaFormat>> {
        let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) else {
            return Ok(None);
        };
        let affine = self.affine();
        let mut glyf_builder = GlyfLocaBuilder::new();
        for gid in 0..loca.len() {
            let glyph = match loca.get_glyf(GlyphId::new(gid as u32), &glyf)? {
                Some(ReadGlyph::Simple(simple)) => Glyph::Simple(scale_simple(&simple, affine)),
                Some(ReadGlyph::Composite(composite)) => match self.scale_composite(&composite) {
                    Some(composite) => Glyph::Composite(composite),
                    None => Glyph::Empty,
                },
                None => Glyph::Empty,
            };
            glyf_builder.add_glyph(&glyph)?;
        }
        let (glyf, loca, format) = glyf_builder.build();
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
        Ok(Some(format))
    }

    /// Component offsets scale with the outlines and point anchors stay as
    /// they are. Transforms are conjugated by the scale so skewed or rotated
    /// components land where the scaled parent expects them.
    fn scale_composite(&self, glyph: &ReadCompositeGlyph) -> Option<CompositeGlyph> {
        let bbox = Bbox {
            x_min: self.x(glyph.x_min()),
            y_min: glyph.y_min(),
            x_max: self.x(glyph.x_max()),
            y_max: glyph.y_max(),
        };
        let mut components = glyph.components().map(|c| {
            let anchor = match c.anchor {
                ReadAnchor::Offset { x, y } => Anchor::Offset { x: self.x(x), y },
                ReadAnchor::Point { base, component } => Anchor::Point { base, component },
            };
            Component {
                glyph: c.glyph,
                anchor,
                flags: c.flags.into(),
                transform: self.transform(&c.transform),
            }
        });
        let mut composite = CompositeGlyph::new(components.next()?, bbox);
        for component in components {
            composite.add_component(component, bbox);
        }
        Some(composite)
    }

    fn scale_hmtx(&self, font: &FontRef, number_of_h_metrics: u16) -> Result<Hmtx> {
        let hmtx = font.hmtx()?;
        let num_glyphs = font.maxp()?.num_glyphs();
        let mut h_metrics = Vec::with_capacity(number_of_h_metrics as usize);
        let mut left_side_bearings = Vec::new();
        for gid in 0..num_glyphs {
            let glyph_id = GlyphId::new(u32::from(gid));
            let side_bearing = self.x(hmtx.side_bearing(glyph_id).unwrap_or(0));
            if gid < number_of_h_metrics {
                let advance = self.advance(hmtx.advance(glyph_id).unwrap_or(0));
                h_metrics.push(LongMetric { advance, side_bearing });
            } else {
                left_side_bearings.push(side_bearing);
            }
        }
        Ok(Hmtx::new(h_metrics, left_side_bearings))
    }
}

fn scale_simple(glyph: &ReadSimpleGlyph, affine: Affine) -> SimpleGlyph {
    let points: Vec<CurvePoint> = glyph
        .points()
        .map(|p| {
            let scaled = affine * Point::new(f64::from(p.x), f64::from(p.y));
            CurvePoint::new(scaled.x.round() as i16, p.y, p.on_curve)
        })
        .collect();

    let mut contours = Vec::new();
    let mut start = 0usize;
    for end in glyph.end_pts_of_contours() {
        let end = end.get() as usize + 1;
        contours.push(Contour::from(points.get(start..end).unwrap_or_default().to_vec()));
        start = end;
    }

    let bbox = points
        .iter()
        .fold(None, |acc: Option<Bbox>, p| {
            Some(match acc {
                None => Bbox { x_min: p.x, y_min: p.y, x_max: p.x, y_max: p.y },
                Some(b) => Bbox {
                    x_min: b.x_min.min(p.x),
                    y_min: b.y_min.min(p.y),
                    x_max: b.x_max.max(p.x),
                    y_max: b.y_max.max(p.y),
                },
            })
        })
        .unwrap_or(Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 });

    SimpleGlyph { bbox, contours, instructions: glyph.instructions().to_vec() }
}

/// Scale outlines and metrics horizontally by `scale_x`, stamping the given
/// OS/2 width and weight classes.
pub fn apply_horizontal_scale(
    data: &[u8],
    scale_x: f64,
    width_class: Option<u16>,
    weight_class: Option<u16>,
) -> Result<Vec<u8>> {
    HorizontalScale { scale_x, width_class, weight_class }.apply(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_transform(xx: f32, yx: f32, xy: f32, yy: f32) -> Transform {
        Transform {
            xx: F2Dot14::from_f32(xx),
            yx: F2Dot14::from_f32(yx),
            xy: F2Dot14::from_f32(xy),
            yy: F2Dot14::from_f32(yy),
        }
    }

    #[test]
    fn plain_scales_pass_through() {
        let t = HorizontalScale::new(0.85).transform(&read_transform(1.0, 0.0, 0.0, -1.0));
        assert_eq!(t.xx.to_f32(), 1.0);
        assert_eq!(t.yx.to_f32(), 0.0);
        assert_eq!(t.xy.to_f32(), 0.0);
        assert_eq!(t.yy.to_f32(), -1.0);
    }

    #[test]
    fn skew_terms_follow_the_scale() {
        let t = HorizontalScale::new(0.5).transform(&read_transform(1.0, 0.25, 0.5, 1.0));
        assert!((t.xy.to_f32() - 0.25).abs() < 1e-3);
        assert!((t.yx.to_f32() - 0.5).abs() < 1e-3);
        assert_eq!(t.xx.to_f32(), 1.0);
        assert_eq!(t.yy.to_f32(), 1.0);
    }

    #[test]
    fn scaled_component_matches_scaled_parent() {
        let scale = HorizontalScale::new(0.8);
        let original = read_transform(0.0, 1.0, -1.0, 0.0);
        let t = scale.transform(&original);

        // (x, y) -> transform -> scale must equal scale -> new transform
        let (x, y) = (100.0f32, 40.0f32);
        let expected = ((x * 0.0 + y * -1.0) * 0.8, x * 1.0 + y * 0.0);
        let (sx, sy) = (x * 0.8, y);
        let actual =
            (sx * t.xx.to_f32() + sy * t.xy.to_f32(), sx * t.yx.to_f32() + sy * t.yy.to_f32());
        assert!((actual.0 - expected.0).abs() < 0.1, "{actual:?} != {expected:?}");
        assert!((actual.1 - expected.1).abs() < 0.1, "{actual:?} != {expected:?}");
    }
}
