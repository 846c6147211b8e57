use font_instancer::{AxisLocation, instantiate_static};
use kurbo::Rect;
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{Anchor, Glyph},
    types::{GlyphId, Tag},
};
use warpnine_font_ops::{avar::decode_avar, name_string, testing::TestFont};
use warpnine_font_vf_builder::{
    Axis, DesignSpace, Error, Incompatibility, Instance, Source, build_variable_font_from_masters,
};

const WEIGHTS: [(f32, &str); 8] = [
    (300.0, "Light"),
    (400.0, "Regular"),
    (500.0, "Medium"),
    (600.0, "SemiBold"),
    (700.0, "Bold"),
    (800.0, "ExtraBold"),
    (900.0, "Black"),
    (1000.0, "ExtraBlack"),
];

fn style_name(name: &str, italic: bool) -> String {
    match (name, italic) {
        (name, false) => name.to_string(),
        ("Regular", true) => "Italic".to_string(),
        (name, true) => format!("{name} Italic"),
    }
}

/// Stem of `H` grows by 10 units per 100 of weight, italics lean 40 units right.
fn stem(weight: f32, italic: bool) -> Rect {
    let grow = f64::from((weight - 400.0) / 10.0);
    let lean = if italic { 40.0 } else { 0.0 };
    Rect::new(100.0 - grow + lean, 0.0, 500.0 + grow + lean, 700.0)
}

fn master_template(weight: f32, italic: bool) -> TestFont {
    let bar_offset = ((weight - 400.0) / 20.0) as i16;
    TestFont::new()
        .names("Warpnine Mono", &style_name(&weight.to_string(), italic))
        .weight_class(weight as u16)
        .empty("space", Some(' '), 600)
        .glyph("H", Some('H'), 600, stem(weight, italic))
        .composite("Hbar", Some('Ħ'), 600, &[("H", bar_offset, 0)])
}

fn master(weight: f32, italic: bool) -> Vec<u8> {
    master_template(weight, italic).build()
}

fn axes() -> Vec<Axis> {
    vec![Axis::new("wght", "Weight", 300.0, 400.0, 1000.0), Axis::new("ital", "Italic", 0.0, 0.0, 1.0)]
}

fn grid() -> Vec<(f32, &'static str, bool)> {
    [false, true]
        .into_iter()
        .flat_map(|italic| WEIGHTS.iter().map(move |&(w, name)| (w, name, italic)))
        .collect()
}

fn designspace() -> DesignSpace {
    let sources = grid()
        .into_iter()
        .map(|(w, name, italic)| {
            Source::new(format!("{name}-{italic}.ttf"), vec![("wght", w), ("ital", f32::from(u8::from(italic)))])
                .with_style_name(&style_name(name, italic))
        })
        .collect();
    let instances = grid()
        .into_iter()
        .map(|(w, name, italic)| {
            Instance::new(&style_name(name, italic), vec![("wght", w), ("ital", f32::from(u8::from(italic)))])
        })
        .collect();
    DesignSpace::new(axes(), sources).with_instances(instances)
}

fn build_grid() -> Vec<u8> {
    let masters: Vec<Vec<u8>> = grid().into_iter().map(|(w, _, italic)| master(w, italic)).collect();
    let masters: Vec<&[u8]> = masters.iter().map(Vec::as_slice).collect();
    build_variable_font_from_masters(&designspace(), &masters).unwrap()
}

fn glyph_bounds(font: &FontRef, gid: u32) -> (i16, i16) {
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    match loca.get_glyf(GlyphId::new(gid), &glyf).unwrap().unwrap() {
        Glyph::Simple(simple) => (simple.x_min(), simple.x_max()),
        Glyph::Composite(composite) => (composite.x_min(), composite.x_max()),
    }
}

fn component_offset(font: &FontRef, gid: u32) -> (i16, i16) {
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    let Some(Glyph::Composite(composite)) = loca.get_glyf(GlyphId::new(gid), &glyf).unwrap() else {
        panic!("glyph {gid} is not a composite");
    };
    match composite.components().next().unwrap().anchor {
        Anchor::Offset { x, y } => (x, y),
        Anchor::Point { .. } => panic!("unexpected point anchor"),
    }
}

#[test]
fn sixteen_masters_make_two_axes_and_sixteen_instances() {
    let data = build_grid();
    let font = FontRef::new(&data).unwrap();

    let fvar = font.fvar().unwrap();
    assert_eq!(fvar.axis_count(), 2);
    assert_eq!(fvar.instance_count(), 16);
    let tags: Vec<Tag> = fvar.axes().unwrap().iter().map(|a| a.axis_tag()).collect();
    assert_eq!(tags, [Tag::new(b"wght"), Tag::new(b"ital")]);
    let axis_name_ids: Vec<u16> =
        fvar.axes().unwrap().iter().map(|a| a.axis_name_id().to_u16()).collect();
    assert_eq!(axis_name_ids, [256, 257]);

    assert!(font.gvar().is_ok());
    assert!(font.gsub().is_err());
    assert!(font.table_data(Tag::new(b"avar")).is_none());
    assert_eq!(name_string(&font, 256).as_deref(), Some("Weight"));
    assert_eq!(name_string(&font, 258).as_deref(), Some("Light"));
}

#[test]
fn stat_lists_weights_and_italic() {
    let data = build_grid();
    let font = FontRef::new(&data).unwrap();
    let stat = font.stat().unwrap();

    assert_eq!(stat.design_axis_count(), 2);
    assert_eq!(stat.axis_value_count(), 8 + 2);
    let fallback = stat.elided_fallback_name_id().unwrap();
    assert_eq!(name_string(&font, fallback.to_u16()).as_deref(), Some("Regular"));
}

#[test]
fn default_master_supplies_outlines_and_metrics() {
    let data = build_grid();
    let font = FontRef::new(&data).unwrap();
    let template = master_template(400.0, false);
    let h = u32::from(template.gid("H").to_u16());

    assert_eq!(glyph_bounds(&font, h), (100, 500));
    assert_eq!(font.hmtx().unwrap().advance(GlyphId::new(h)), Some(600));
    assert_eq!(font.maxp().unwrap().num_glyphs(), template.num_glyphs());
    assert_eq!(name_string(&font, 1).as_deref(), Some("Warpnine Mono"));
}

#[test]
fn instancing_at_a_master_reproduces_it() {
    let data = build_grid();
    let template = master_template(400.0, false);
    let h = u32::from(template.gid("H").to_u16());
    let hbar = u32::from(template.gid("Hbar").to_u16());

    for (weight, italic) in [(700.0, false), (300.0, true), (1000.0, true), (500.0, false)] {
        let location =
            [AxisLocation::new("wght", weight), AxisLocation::new("ital", f32::from(u8::from(italic)))];
        let static_data = instantiate_static(&data, &location).unwrap();
        let font = FontRef::new(&static_data).unwrap();

        let expected = stem(weight, italic);
        let (x_min, x_max) = glyph_bounds(&font, h);
        assert!((f64::from(x_min) - expected.x0).abs() <= 1.0, "{weight}/{italic}: x_min {x_min}");
        assert!((f64::from(x_max) - expected.x1).abs() <= 1.0, "{weight}/{italic}: x_max {x_max}");

        let expected_offset = ((weight - 400.0) / 20.0) as i16;
        let (dx, _) = component_offset(&font, hbar);
        assert!((dx - expected_offset).abs() <= 1, "{weight}/{italic}: offset {dx}");
    }
}

#[test]
fn mapped_axes_emit_avar() {
    let axes = vec![
        Axis::new("wght", "Weight", 300.0, 400.0, 700.0)
            .with_map([(300.0, 300.0), (400.0, 400.0), (550.0, 500.0), (700.0, 700.0)]),
    ];
    let sources = vec![
        Source::new("Light.ttf", vec![("wght", 300.0)]),
        Source::new("Regular.ttf", vec![("wght", 400.0)]),
        Source::new("Bold.ttf", vec![("wght", 700.0)]),
    ];
    let masters = [master(300.0, false), master(400.0, false), master(700.0, false)];
    let masters: Vec<&[u8]> = masters.iter().map(Vec::as_slice).collect();

    let data = build_variable_font_from_masters(&DesignSpace::new(axes, sources), &masters).unwrap();
    let font = FontRef::new(&data).unwrap();
    let avar = font.table_data(Tag::new(b"avar")).unwrap();
    let maps = decode_avar(avar.as_bytes()).unwrap();

    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].len(), 4);
}

#[test]
fn point_count_mismatch_is_rejected() {
    let axes = vec![Axis::new("wght", "Weight", 400.0, 400.0, 700.0)];
    let sources = vec![
        Source::new("Regular.ttf", vec![("wght", 400.0)]),
        Source::new("Bold.ttf", vec![("wght", 700.0)]).with_style_name("Bold"),
    ];
    let regular = master(400.0, false);
    let bold = TestFont::new()
        .empty("space", Some(' '), 600)
        .composite("H", Some('H'), 600, &[(".notdef", 0, 0)])
        .composite("Hbar", Some('Ħ'), 600, &[("H", 0, 0)])
        .build();

    let err = build_variable_font_from_masters(&DesignSpace::new(axes, sources), &[&regular, &bold])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::IncompatibleMasters {
            ref master,
            reason: Incompatibility::OutlineKind { expected: "simple", actual: "composite", .. },
        } if master == "Bold"
    ));
}

#[test]
fn glyph_count_mismatch_is_rejected() {
    let axes = vec![Axis::new("wght", "Weight", 400.0, 400.0, 700.0)];
    let sources =
        vec![Source::new("Regular.ttf", vec![("wght", 400.0)]), Source::new("Bold.ttf", vec![("wght", 700.0)])];
    let regular = master(400.0, false);
    let bold = master_template(700.0, false).simple("extra", None, 600).build();

    let err = build_variable_font_from_masters(&DesignSpace::new(axes, sources), &[&regular, &bold])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::IncompatibleMasters { reason: Incompatibility::GlyphCount { expected: 4, actual: 5 }, .. }
    ));
}

#[test]
fn master_count_must_match_sources() {
    let regular = master(400.0, false);
    assert!(matches!(
        build_variable_font_from_masters(&designspace(), &[&regular]),
        Err(Error::InvalidDesignspace(_))
    ));
}
