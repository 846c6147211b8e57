use font_instancer::{AxisLocation, instantiate, instantiate_static};
use read_fonts::{
    FontRef, TableProvider,
    tables::{glyf::Glyph, stat::AxisValue as ReadAxisValue},
    types::{F2Dot14, Fixed, GlyphId},
};
use warpnine_font_ops::{
    avar::{SegmentMap, decode_avar, encode_avar, identity_map},
    testing::{TestFont, gsub, single_subst, tag},
};
use write_fonts::{
    dump_table,
    tables::{
        layout::{
            Condition, ConditionFormat1, ConditionSet, Feature, FeatureTableSubstitution,
            FeatureTableSubstitutionRecord, FeatureVariationRecord, FeatureVariations,
        },
        stat::{AxisRecord, AxisValue, AxisValueRecord, AxisValueTableFlags, Stat},
    },
    types::NameId,
};

/// Two axes: `wght` 100..400..900 and `wdth` 75..100..100.
///
/// Glyph `a` is a 50..550 rectangle with advance 600 whose right edge moves
/// +100 at wght max, -100 at wdth min and a further -20 at both.
fn two_axis_font() -> TestFont {
    let right = |dx: i16| [(0, 0), (0, 0), (dx, 0), (dx, 0), (0, 0), (dx, 0)];
    TestFont::new()
        .axis("wght", 100.0, 400.0, 900.0)
        .axis("wdth", 75.0, 100.0, 100.0)
        .instance("Regular", &[400.0, 100.0])
        .instance("Bold", &[900.0, 100.0])
        .instance("Condensed", &[400.0, 75.0])
        .instance("Bold Condensed", &[900.0, 75.0])
        .simple("a", Some('a'), 600)
        .composite("b", Some('b'), 600, &[("a", 10, 0)])
        .empty("space", Some(' '), 250)
        .variation("a", &[("wght", 1.0)], &right(100))
        .variation("a", &[("wdth", -1.0)], &right(-100))
        .variation("a", &[("wght", 1.0), ("wdth", -1.0)], &right(-20))
        .variation("b", &[("wght", 1.0)], &[(30, 0)])
        .variation("space", &[("wght", 1.0)], &[(0, 0), (50, 0)])
}

fn x_extent(font: &FontRef, name: &str, template: &TestFont) -> (i16, i16) {
    let gid = GlyphId::from(template.gid(name));
    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    match loca.get_glyf(gid, &glyf).unwrap().unwrap() {
        Glyph::Simple(simple) => (simple.x_min(), simple.x_max()),
        Glyph::Composite(composite) => (composite.x_min(), composite.x_max()),
    }
}

fn advance(font: &FontRef, name: &str, template: &TestFont) -> u16 {
    font.hmtx().unwrap().advance(GlyphId::from(template.gid(name))).unwrap()
}

#[test]
fn full_pin_applies_every_tuple() {
    let template = two_axis_font();
    let data = template.build();
    let out = instantiate(
        &data,
        &[AxisLocation::new("wght", 900.0), AxisLocation::new("wdth", 75.0)],
    )
    .unwrap();
    let font = FontRef::new(&out).unwrap();

    assert!(font.fvar().is_err());
    assert!(font.gvar().is_err());
    assert_eq!(x_extent(&font, "a", &template), (50, 530));
    assert_eq!(advance(&font, "a", &template), 580);
    assert_eq!(advance(&font, "space", &template), 300);
    assert_eq!(font.maxp().unwrap().num_glyphs(), template.num_glyphs());

    let os2 = font.os2().unwrap();
    assert_eq!(os2.us_weight_class(), 900);
    assert_eq!(os2.us_width_class(), 3);
}

#[test]
fn composite_offsets_and_bounds_follow_the_pin() {
    let template = two_axis_font();
    let data = template.build();
    let out = instantiate_static(&data, &[AxisLocation::new("wght", 900.0)]).unwrap();
    let font = FontRef::new(&out).unwrap();

    // `a` grows to 50..650, `b` places it at +40.
    assert_eq!(x_extent(&font, "a", &template), (50, 650));
    assert_eq!(x_extent(&font, "b", &template), (90, 690));
    let head = font.head().unwrap();
    assert_eq!(head.x_max(), 690);
}

#[test]
fn partial_pin_keeps_the_other_axis_variable() {
    let template = two_axis_font();
    let data = template.build();
    let out = instantiate(&data, &[AxisLocation::new("wght", 900.0)]).unwrap();
    let font = FontRef::new(&out).unwrap();

    let fvar = font.fvar().unwrap();
    assert_eq!(fvar.axis_count(), 1);
    assert_eq!(fvar.axes().unwrap()[0].axis_tag(), tag("wdth"));
    let instances: Vec<Vec<Fixed>> = fvar
        .instances()
        .unwrap()
        .iter()
        .map(|i| i.unwrap().coordinates.iter().map(|c| c.get()).collect())
        .collect();
    assert_eq!(instances, vec![vec![Fixed::from_i32(100)], vec![Fixed::from_i32(75)]]);

    assert_eq!(x_extent(&font, "a", &template), (50, 650));
    assert_eq!(advance(&font, "a", &template), 700);
    assert_eq!(font.os2().unwrap().us_weight_class(), 900);

    // Pinning the remaining axis lands where the full pin does.
    let condensed = instantiate(&out, &[AxisLocation::new("wdth", 75.0)]).unwrap();
    let condensed = FontRef::new(&condensed).unwrap();
    assert!(condensed.fvar().is_err());
    assert_eq!(x_extent(&condensed, "a", &template), (50, 530));
    assert_eq!(advance(&condensed, "a", &template), 580);
}

#[test]
fn intermediate_pin_scales_kept_tuples() {
    let template = two_axis_font();
    let data = template.build();
    let half = instantiate(&data, &[AxisLocation::new("wght", 650.0)]).unwrap();
    let font = FontRef::new(&half).unwrap();
    assert_eq!(x_extent(&font, "a", &template), (50, 600));

    let condensed = instantiate(&half, &[AxisLocation::new("wdth", 75.0)]).unwrap();
    let condensed = FontRef::new(&condensed).unwrap();
    // 550 + 50 (wght, half) - 100 (wdth) - 10 (interaction, half)
    assert_eq!(x_extent(&condensed, "a", &template), (50, 490));
}

fn weight_map() -> SegmentMap {
    [(-1.0, -1.0), (0.0, 0.0), (0.5, 0.25), (1.0, 1.0)]
        .into_iter()
        .map(|(a, b)| (F2Dot14::from_f32(a), F2Dot14::from_f32(b)))
        .collect()
}

#[test]
fn pins_are_normalized_through_avar() {
    let template =
        two_axis_font().raw_table(tag("avar"), encode_avar(&[weight_map(), identity_map()]));
    let data = template.build();

    let out = instantiate_static(&data, &[AxisLocation::new("wght", 650.0)]).unwrap();
    let font = FontRef::new(&out).unwrap();
    assert_eq!(x_extent(&font, "a", &template), (50, 575));
    assert!(font.table_data(tag("avar")).is_none());
}

#[test]
fn avar_loses_the_pinned_axis_maps() {
    let template =
        two_axis_font().raw_table(tag("avar"), encode_avar(&[weight_map(), identity_map()]));
    let data = template.build();

    let wdth_pinned = instantiate(&data, &[AxisLocation::new("wdth", 100.0)]).unwrap();
    let font = FontRef::new(&wdth_pinned).unwrap();
    let avar = font.table_data(tag("avar")).unwrap();
    assert_eq!(decode_avar(avar.as_bytes()).unwrap(), vec![weight_map()]);

    let wght_pinned = instantiate(&data, &[AxisLocation::new("wght", 400.0)]).unwrap();
    let font = FontRef::new(&wght_pinned).unwrap();
    assert!(font.table_data(tag("avar")).is_none());
}

fn stat() -> Stat {
    let fixed = |v: f64| Fixed::from_f64(v);
    Stat::new(
        vec![
            AxisRecord::new(tag("wght"), NameId::new(256), 0),
            AxisRecord::new(tag("wdth"), NameId::new(257), 1),
        ],
        vec![
            AxisValue::format_1(0, AxisValueTableFlags::ELIDABLE_AXIS_VALUE_NAME, NameId::new(2), fixed(400.0)),
            AxisValue::format_1(0, AxisValueTableFlags::empty(), NameId::new(259), fixed(900.0)),
            AxisValue::format_1(1, AxisValueTableFlags::ELIDABLE_AXIS_VALUE_NAME, NameId::new(2), fixed(100.0)),
            AxisValue::format_1(1, AxisValueTableFlags::empty(), NameId::new(260), fixed(75.0)),
            AxisValue::format_4(
                AxisValueTableFlags::empty(),
                NameId::new(261),
                vec![AxisValueRecord::new(0, fixed(900.0)), AxisValueRecord::new(1, fixed(75.0))],
            ),
        ],
        NameId::new(2),
    )
}

fn stat_summary(font: &FontRef) -> (Vec<String>, Vec<(u8, Vec<u16>)>) {
    let stat = font.stat().unwrap();
    let axes = stat.design_axes().unwrap().iter().map(|a| a.axis_tag().to_string()).collect();
    let values = stat
        .offset_to_axis_values()
        .unwrap()
        .unwrap()
        .axis_values()
        .iter()
        .map(|v| match v.unwrap() {
            ReadAxisValue::Format1(v) => (1, vec![v.axis_index()]),
            ReadAxisValue::Format2(v) => (2, vec![v.axis_index()]),
            ReadAxisValue::Format3(v) => (3, vec![v.axis_index()]),
            ReadAxisValue::Format4(v) => {
                (4, v.axis_values().iter().map(|r| r.axis_index()).collect())
            }
        })
        .collect();
    (axes, values)
}

#[test]
fn stat_drops_pinned_axes() {
    let data = two_axis_font().raw_table(tag("STAT"), dump_table(&stat()).unwrap()).build();

    let bold = instantiate(&data, &[AxisLocation::new("wght", 900.0)]).unwrap();
    let (axes, values) = stat_summary(&FontRef::new(&bold).unwrap());
    assert_eq!(axes, vec!["wdth"]);
    assert_eq!(values, vec![(1, vec![0]), (1, vec![0]), (4, vec![0])]);

    let regular = instantiate(&data, &[AxisLocation::new("wght", 400.0)]).unwrap();
    let (_, values) = stat_summary(&FontRef::new(&regular).unwrap());
    assert_eq!(values, vec![(1, vec![0]), (1, vec![0])]);

    let full = instantiate_static(&data, &[]).unwrap();
    assert!(FontRef::new(&full).unwrap().stat().is_err());
}

/// `rvrn` is empty by default and gains lookup 0 when wght >= 650.
fn feature_variation_font() -> (TestFont, Vec<u8>) {
    let base = two_axis_font().simple("a.heavy", None, 600);
    let mut table = gsub(
        vec![single_subst(&[(base.gid("a"), base.gid("a.heavy"))])],
        &[("rvrn", vec![])],
        &[("DFLT", vec![0], vec![]), ("latn", vec![0], vec![])],
    );
    let condition = Condition::Format1AxisRange(ConditionFormat1::new(
        0,
        F2Dot14::from_f32(0.5),
        F2Dot14::from_f32(1.0),
    ));
    let substitution = FeatureTableSubstitution::new(vec![FeatureTableSubstitutionRecord::new(
        0,
        Feature::new(None, vec![0]),
    )]);
    table.feature_variations = Some(FeatureVariations::new(vec![FeatureVariationRecord::new(
        Some(ConditionSet::new(vec![condition])),
        Some(substitution),
    )]))
    .into();
    let font = base.gsub(table);
    let data = font.build();
    (font, data)
}

fn rvrn_lookups(data: &[u8]) -> Vec<u16> {
    let font = FontRef::new(data).unwrap();
    let gsub = font.gsub().unwrap();
    assert!(gsub.feature_variations().is_none());
    let features = gsub.feature_list().unwrap();
    let record = &features.feature_records()[0];
    let feature = record.feature(features.offset_data()).unwrap();
    feature.lookup_list_indices().iter().map(|i| i.get()).collect()
}

#[test]
fn full_pin_applies_matching_feature_variations() {
    let (_, data) = feature_variation_font();
    let heavy = instantiate_static(&data, &[AxisLocation::new("wght", 900.0)]).unwrap();
    assert_eq!(rvrn_lookups(&heavy), vec![0]);

    let regular = instantiate_static(&data, &[AxisLocation::new("wght", 400.0)]).unwrap();
    assert!(rvrn_lookups(&regular).is_empty());
}

#[test]
fn partial_pin_drops_feature_variations() {
    let (_, data) = feature_variation_font();
    let partial = instantiate(&data, &[AxisLocation::new("wdth", 100.0)]).unwrap();
    assert!(rvrn_lookups(&partial).is_empty());
}
