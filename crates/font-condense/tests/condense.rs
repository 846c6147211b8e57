use read_fonts::{FontRef, TableProvider, tables::glyf::Glyph, types::GlyphId};
use warpnine_font_condense::{HorizontalScale, WIDTH_CLASS_CONDENSED, apply_horizontal_scale};
use warpnine_font_ops::testing::TestFont;

fn sample() -> TestFont {
    TestFont::new()
        .empty("space", Some(' '), 600)
        .simple("H", Some('H'), 600)
        .simple("W", Some('W'), 1000)
        .composite("Hbar", None, 600, &[("H", 100, 0)])
}

#[test]
fn advances_and_bearings_scale_with_rounding() {
    let font = sample();
    let data = font.build();
    let out = HorizontalScale::CONDENSED.apply(&data).unwrap();
    let original = FontRef::new(&data).unwrap();
    let condensed = FontRef::new(&out).unwrap();

    let (before, after) = (original.hmtx().unwrap(), condensed.hmtx().unwrap());
    for gid in 0..font.num_glyphs() {
        let gid = GlyphId::new(u32::from(gid));
        let advance = before.advance(gid).unwrap();
        assert_eq!(after.advance(gid).unwrap(), (f64::from(advance) * 0.85).round() as u16);
        let lsb = before.side_bearing(gid).unwrap();
        assert_eq!(after.side_bearing(gid).unwrap(), (f64::from(lsb) * 0.85).round() as i16);
    }
    assert_eq!(condensed.os2().unwrap().us_width_class(), WIDTH_CLASS_CONDENSED);
}

#[test]
fn outlines_scale_horizontally_only() {
    let data = sample().build();
    let out = apply_horizontal_scale(&data, 0.5, None, Some(700)).unwrap();
    let font = FontRef::new(&out).unwrap();
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();

    // H is the rectangle 50,0 .. 550,700
    let Some(Glyph::Simple(h)) = loca.get_glyf(GlyphId::new(2), &glyf).unwrap() else {
        panic!("H should be simple");
    };
    assert_eq!((h.x_min(), h.x_max()), (25, 275));
    assert_eq!((h.y_min(), h.y_max()), (0, 700));

    let Some(Glyph::Composite(hbar)) = loca.get_glyf(GlyphId::new(4), &glyf).unwrap() else {
        panic!("Hbar should be composite");
    };
    let component = hbar.components().next().unwrap();
    assert!(matches!(
        component.anchor,
        read_fonts::tables::glyf::Anchor::Offset { x: 50, y: 0 }
    ));
    assert_eq!((hbar.x_min(), hbar.x_max()), (75, 325));

    let os2 = font.os2().unwrap();
    assert_eq!(os2.us_width_class(), 5);
    assert_eq!(os2.us_weight_class(), 700);
}

#[test]
fn width_derived_metrics_scale() {
    let data = sample().build();
    let out = HorizontalScale::new(0.5).width_class(4).apply(&data).unwrap();
    let (original, scaled) = (FontRef::new(&data).unwrap(), FontRef::new(&out).unwrap());

    let (h0, h1) = (original.head().unwrap(), scaled.head().unwrap());
    assert_eq!(h1.x_max(), (f64::from(h0.x_max()) * 0.5).round() as i16);
    assert_eq!(h1.y_max(), h0.y_max());
    let (e0, e1) = (original.hhea().unwrap(), scaled.hhea().unwrap());
    assert_eq!(e1.advance_width_max().to_u16(), e0.advance_width_max().to_u16() / 2);
    assert_eq!(e1.x_max_extent().to_i16(), e0.x_max_extent().to_i16() / 2);
    assert_eq!(scaled.os2().unwrap().us_width_class(), 4);
}
