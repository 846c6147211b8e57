//! Merging synthetic Latin and CJK fonts

use kurbo::Rect;
use read_fonts::{
    FontRef, TableProvider,
    tables::{glyf::Glyph, layout::FeatureParams as ReadFeatureParams},
    types::{GlyphId, GlyphId16, NameId, Tag},
};
use warpnine_font_gsub::view::{RuleView, read_lookups};
use warpnine_font_merger::{
    CollisionPolicy, FontIndex, GlyphOrder, MergeError, Merger, Options, Renamed,
    merge_fonts_bytes,
};
use warpnine_font_ops::{
    name_string,
    testing::{TestFont, gsub, single_subst, tag},
};
use write_fonts::tables::layout::{FeatureParams, StylisticSetParams};

fn latin() -> TestFont {
    TestFont::new()
        .names("Warpnine Mono", "Regular")
        .empty("space", Some(' '), 600)
        .simple("a", Some('a'), 600)
        .simple("b", Some('b'), 600)
}

fn cjk() -> TestFont {
    TestFont::new()
        .names("Noto Sans Mono CJK JP", "Regular")
        .empty("space", Some(' '), 600)
        .simple("a", Some('a'), 600)
        .simple("kana", Some('あ'), 1000)
}

fn merge(fonts: &[&TestFont], options: Options) -> Result<Vec<u8>, MergeError> {
    let data: Vec<Vec<u8>> = fonts.iter().map(|f| f.build()).collect();
    let slices: Vec<&[u8]> = data.iter().map(Vec::as_slice).collect();
    Merger::new(options).merge(&slices)
}

fn post_names(font: &FontRef) -> Vec<String> {
    let post = font.post().unwrap();
    (0..font.maxp().unwrap().num_glyphs())
        .map(|gid| post.glyph_name(GlyphId16::new(gid)).unwrap_or_default().to_string())
        .collect()
}

fn default_features(font: &FontRef, script: &str) -> Vec<u16> {
    let gsub = font.gsub().unwrap();
    let list = gsub.script_list().unwrap();
    let record = list
        .script_records()
        .iter()
        .find(|r| r.script_tag() == tag(script))
        .unwrap_or_else(|| panic!("no script {script}"));
    let script = record.script(list.offset_data()).unwrap();
    let lang_sys = script.default_lang_sys().unwrap().unwrap();
    lang_sys.feature_indices().iter().map(|i| i.get()).collect()
}

#[test]
fn identical_glyphs_are_merged_once() {
    let data = merge(&[&latin(), &cjk()], Options::default()).unwrap();
    let font = FontRef::new(&data).unwrap();

    assert_eq!(post_names(&font), [".notdef", "space", "a", "b", "kana"]);
    let cmap = font.cmap().unwrap();
    assert_eq!(cmap.map_codepoint('a'), Some(GlyphId::new(2)));
    assert_eq!(cmap.map_codepoint('あ'), Some(GlyphId::new(4)));

    let hmtx = font.hmtx().unwrap();
    assert_eq!(hmtx.advance(GlyphId::new(4)), Some(1000));
    assert_eq!(hmtx.advance(GlyphId::new(3)), Some(600));
    assert_eq!(font.hhea().unwrap().advance_width_max().to_u16(), 1000);
    assert_eq!(font.head().unwrap().x_max(), 950);
}

#[test]
fn differing_glyphs_are_renamed() {
    let base = latin().simple("a.1", None, 600);
    let donor = TestFont::new().glyph("a", Some('a'), 1000, Rect::new(0.0, 0.0, 1000.0, 500.0));
    let data = merge(&[&base, &donor], Options::default()).unwrap();
    let font = FontRef::new(&data).unwrap();

    assert_eq!(post_names(&font), [".notdef", "space", "a", "b", "a.1", "a.2"]);
    // the base font's mapping wins
    assert_eq!(font.cmap().unwrap().map_codepoint('a'), Some(GlyphId::new(2)));
    assert_eq!(font.hmtx().unwrap().advance(GlyphId::new(5)), Some(1000));

    let (base, donor) = (base.build(), donor.build());
    let fonts = [FontRef::new(&base).unwrap(), FontRef::new(&donor).unwrap()];
    let order = GlyphOrder::compute(&fonts, CollisionPolicy::Rename).unwrap();
    assert_eq!(
        order.renamed(),
        [Renamed { font: FontIndex(1), from: "a".into(), to: "a.2".into() }]
    );
    assert_eq!(order.deduplicated(), 1);
}

#[test]
fn collision_policy_can_reject_renames() {
    let donor = TestFont::new().glyph("a", Some('a'), 1000, Rect::new(0.0, 0.0, 1000.0, 500.0));
    let result = merge(&[&latin(), &donor], Options::new().collisions(CollisionPolicy::Error));
    assert!(matches!(
        result,
        Err(MergeError::GlyphNameCollision { ref name, font: 1 }) if name == "a"
    ));
}

#[test]
fn units_per_em_must_match() {
    let result = merge(&[&latin(), &cjk().units_per_em(2048)], Options::default());
    assert!(matches!(
        result,
        Err(MergeError::IncompatibleUnitsPerEm { expected: 1000, actual: 2048 })
    ));
}

#[test]
fn composites_follow_their_components() {
    let donor = TestFont::new()
        .simple("ring", None, 600)
        .composite("aring", Some('å'), 600, &[("ring", 0, 100)])
        .empty("blank", None, 600)
        .composite("ghost", None, 600, &[("blank", 0, 0)]);
    let data = merge(&[&latin(), &donor], Options::default()).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert_eq!(post_names(&font)[4..], ["ring", "aring", "blank", "ghost"]);

    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    let Some(Glyph::Composite(aring)) = loca.get_glyf(GlyphId::new(5), &glyf).unwrap() else {
        panic!("aring should stay a composite");
    };
    let component = aring.components().next().unwrap();
    assert_eq!(component.glyph, GlyphId16::new(4));
    // composites that only reference empty glyphs are emptied
    assert!(loca.get_glyf(GlyphId::new(7), &glyf).unwrap().is_none());
}

fn layout_fonts() -> (TestFont, TestFont) {
    let latin = TestFont::new().simple("a", Some('a'), 600).simple("a.alt", None, 600);
    let lookup = single_subst(&[(latin.gid("a"), latin.gid("a.alt"))]);
    let latin = latin.gsub(gsub(
        vec![lookup],
        &[("calt", vec![0])],
        &[("DFLT", vec![0], vec![]), ("latn", vec![0], vec![])],
    ));

    let cjk = TestFont::new().simple("kana", Some('あ'), 1000).simple("kana.vert", None, 1000);
    let lookup = single_subst(&[(cjk.gid("kana"), cjk.gid("kana.vert"))]);
    let cjk = cjk.gsub(gsub(
        vec![lookup],
        &[("vert", vec![0])],
        &[("DFLT", vec![0], vec![]), ("kana", vec![0], vec![("JAN ", vec![0])])],
    ));
    (latin, cjk)
}

#[test]
fn gsub_lookups_and_features_are_concatenated() {
    let (latin, cjk) = layout_fonts();
    let data = merge(&[&latin, &cjk], Options::default()).unwrap();
    let font = FontRef::new(&data).unwrap();
    let gsub = font.gsub().unwrap();

    let lookups = read_lookups(&gsub).unwrap();
    assert_eq!(lookups.len(), 2);
    assert_eq!(lookups[0].rules, [RuleView::Single(vec![(1, 2)])]);
    assert_eq!(lookups[1].rules, [RuleView::Single(vec![(3, 4)])]);

    let features = gsub.feature_list().unwrap();
    let tags: Vec<Tag> = features.feature_records().iter().map(|r| r.feature_tag()).collect();
    assert_eq!(tags, [tag("calt"), tag("vert")]);
    let vert = features.feature_records()[1].feature(features.offset_data()).unwrap();
    assert_eq!(vert.lookup_list_indices()[0].get(), 1);

    assert_eq!(default_features(&font, "DFLT"), [0, 1]);
    assert_eq!(default_features(&font, "latn"), [0]);
}

#[test]
fn calt_is_registered_in_donor_scripts() {
    let (latin, cjk) = layout_fonts();
    let data = merge(&[&latin, &cjk], Options::default()).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert_eq!(default_features(&font, "kana"), [1, 0]);

    let data = merge(&[&latin, &cjk], Options::new().skip_calt_fix(true)).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert_eq!(default_features(&font, "kana"), [1]);
}

#[test]
fn features_are_sorted_by_tag_and_keep_their_params() {
    let latin = TestFont::new()
        .simple("a", Some('a'), 600)
        .simple("a.liga", None, 600)
        .simple("a.ss02", None, 600);
    let lookups = vec![
        single_subst(&[(latin.gid("a"), latin.gid("a.liga"))]),
        single_subst(&[(latin.gid("a"), latin.gid("a.ss02"))]),
    ];
    let latin = latin.gsub(gsub(
        lookups,
        &[("liga", vec![0]), ("ss02", vec![1])],
        &[("DFLT", vec![0, 1], vec![]), ("latn", vec![0, 1], vec![])],
    ));

    let cjk = TestFont::new()
        .simple("kana", Some('あ'), 1000)
        .simple("kana.calt", None, 1000)
        .simple("kana.ss01", None, 1000);
    let lookups = vec![
        single_subst(&[(cjk.gid("kana"), cjk.gid("kana.calt"))]),
        single_subst(&[(cjk.gid("kana"), cjk.gid("kana.ss01"))]),
    ];
    let mut table = gsub(
        lookups,
        &[("calt", vec![0]), ("ss01", vec![1])],
        &[("DFLT", vec![0, 1], vec![]), ("kana", vec![0, 1], vec![])],
    );
    table.feature_list.feature_records[1].feature.feature_params =
        Some(FeatureParams::StylisticSet(StylisticSetParams::new(NameId::new(256)))).into();
    let cjk = cjk.gsub(table);

    let data = merge(&[&latin, &cjk], Options::new().skip_calt_fix(true)).unwrap();
    let font = FontRef::new(&data).unwrap();
    let gsub = font.gsub().unwrap();
    let features = gsub.feature_list().unwrap();
    let records = features.feature_records();

    let tags: Vec<Tag> = records.iter().map(|r| r.feature_tag()).collect();
    assert_eq!(tags, [tag("calt"), tag("liga"), tag("ss01"), tag("ss02")]);

    let lookups: Vec<u16> = records
        .iter()
        .map(|r| r.feature(features.offset_data()).unwrap().lookup_list_indices()[0].get())
        .collect();
    assert_eq!(lookups, [2, 0, 3, 1]);

    let ss01 = records[2].feature(features.offset_data()).unwrap();
    match ss01.feature_params() {
        Some(Ok(ReadFeatureParams::StylisticSet(params))) => {
            assert_eq!(params.ui_name_id(), NameId::new(256));
        }
        _ => panic!("ss01 lost its stylistic set params"),
    }
    let ss02 = records[3].feature(features.offset_data()).unwrap();
    assert!(ss02.feature_params().is_none());

    assert_eq!(default_features(&font, "DFLT"), [0, 1, 2, 3]);
    assert_eq!(default_features(&font, "latn"), [1, 3]);
    assert_eq!(default_features(&font, "kana"), [0, 2]);
}

#[test]
fn base_font_supplies_the_remaining_tables() {
    let gpos = b"GPOS from the base".to_vec();
    let base = latin().raw_table(Tag::new(b"GPOS"), gpos.clone());
    let donor = cjk().raw_table(Tag::new(b"GPOS"), b"donor GPOS".to_vec());
    let data = merge(&[&base, &donor], Options::default()).unwrap();
    let font = FontRef::new(&data).unwrap();

    assert_eq!(name_string(&font, 1).as_deref(), Some("Warpnine Mono"));
    assert_eq!(font.table_data(Tag::new(b"GPOS")).unwrap().as_bytes(), gpos.as_slice());
}

#[test]
fn dropped_tables_are_left_out() {
    let data = merge(&[&latin(), &cjk()], Options::new().drop_tables(["OS/2", "name"])).unwrap();
    let font = FontRef::new(&data).unwrap();
    assert!(font.os2().is_err());
    assert!(font.name().is_err());
    assert!(font.glyf().is_ok());
}

#[test]
fn single_font_round_trips() {
    let data = latin().build();
    let merged = merge_fonts_bytes(&[&data]).unwrap();
    let font = FontRef::new(&merged).unwrap();
    assert_eq!(post_names(&font), [".notdef", "space", "a", "b"]);
}
