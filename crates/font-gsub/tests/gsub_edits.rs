use read_fonts::{FontRef, TableProvider, types::Tag};
use warpnine_font_gsub::{
    CaltRegistration, Error, LigatureRemoval, PatternMatch, copy_gsub, register_calt,
    remove_triple_ligature,
    view::{ChainView, RuleView, read_lookups},
};
use warpnine_font_ops::{
    FontTables,
    testing::{TestFont, gsub, single_subst, tag},
};
use write_fonts::tables::{
    gsub::{SubstitutionChainContext, SubstitutionLookup},
    layout::{
        ChainedSequenceContext, ChainedSequenceContextFormat3, CoverageTable, Lookup, LookupFlag,
        SequenceLookupRecord,
    },
};

fn code_font() -> (TestFont, Vec<u8>) {
    let base = TestFont::new()
        .simple("a", Some('a'), 600)
        .simple("grave", Some('`'), 600)
        .simple("grave_grave_grave.code", None, 600)
        .simple("a.alt", None, 600);
    let grave = base.gid("grave");

    let chain = ChainedSequenceContextFormat3::new(
        vec![],
        vec![CoverageTable::format_1(vec![grave])],
        vec![CoverageTable::format_1(vec![grave]), CoverageTable::format_1(vec![grave])],
        vec![SequenceLookupRecord::new(0, 1)],
    );
    let lookups = vec![
        SubstitutionLookup::ChainContextual(Lookup::new(
            LookupFlag::empty(),
            vec![SubstitutionChainContext::from(ChainedSequenceContext::Format3(chain))],
        )),
        single_subst(&[
            (grave, base.gid("grave_grave_grave.code")),
            (base.gid("a"), base.gid("a.alt")),
        ]),
    ];
    let font = base.gsub(gsub(
        lookups,
        &[("calt", vec![0]), ("ss01", vec![1])],
        &[("DFLT", vec![0, 1], vec![]), ("latn", vec![0, 1], vec![])],
    ));
    let data = font.build();
    (font, data)
}

#[test]
fn removes_triple_grave_ligature() {
    let (font, data) = code_font();
    let LigatureRemoval::Removed { matches, data: out } =
        remove_triple_ligature(&data, "grave").unwrap()
    else {
        panic!("expected the ligature to be removed");
    };
    assert_eq!(
        matches,
        vec![
            PatternMatch::ChainCoverages { lookup: 0, subtable: 0 },
            PatternMatch::SingleMapping { lookup: 1, subtable: 0 },
        ]
    );

    let edited = FontRef::new(&out).unwrap();
    let lookups = read_lookups(&edited.gsub().unwrap()).unwrap();
    assert_eq!(lookups.len(), 2);
    match &lookups[0].rules[0] {
        RuleView::ChainContext(ChainView::Coverages { lookahead, records, .. }) => {
            assert_eq!(lookahead.len(), 2);
            assert!(records.is_empty());
        }
        other => panic!("unexpected rule {other:?}"),
    }
    let a = font.gid("a").to_u16();
    let alt = font.gid("a.alt").to_u16();
    assert_eq!(lookups[1].rules[0], RuleView::Single(vec![(a, alt)]));
}

#[test]
fn ligature_removal_is_idempotent() {
    let (_, data) = code_font();
    let LigatureRemoval::Removed { data: once, .. } =
        remove_triple_ligature(&data, "grave").unwrap()
    else {
        panic!("expected the ligature to be removed");
    };
    assert_eq!(remove_triple_ligature(&once, "grave").unwrap(), LigatureRemoval::NotFound);
}

#[test]
fn ligature_removal_reports_missing_pieces() {
    let plain = TestFont::new().simple("a", Some('a'), 600).build();
    assert_eq!(remove_triple_ligature(&plain, "grave").unwrap(), LigatureRemoval::NoGsub);

    let (_, data) = code_font();
    assert_eq!(remove_triple_ligature(&data, "asciitilde").unwrap(), LigatureRemoval::GlyphMissing);
}

fn calt_font(scripts: &[warpnine_font_ops::testing::ScriptSpec]) -> Vec<u8> {
    let base = TestFont::new().simple("a", Some('a'), 600).simple("a.alt", None, 600);
    let lookup = single_subst(&[(base.gid("a"), base.gid("a.alt"))]);
    base.gsub(gsub(
        vec![lookup],
        &[("liga", vec![0]), ("calt", vec![0]), ("rclt", vec![0]), ("ss01", vec![0])],
        scripts,
    ))
    .build()
}

fn lang_systems(data: &[u8]) -> Vec<(Tag, Tag, Vec<u16>)> {
    let font = FontRef::new(data).unwrap();
    let gsub = font.gsub().unwrap();
    let script_list = gsub.script_list().unwrap();
    let mut out = Vec::new();
    for record in script_list.script_records() {
        let script = record.script(script_list.offset_data()).unwrap();
        if let Some(Ok(default)) = script.default_lang_sys() {
            let indices = default.feature_indices().iter().map(|i| i.get()).collect();
            out.push((record.script_tag(), tag("dflt"), indices));
        }
        for lang in script.lang_sys_records() {
            let ls = lang.lang_sys(script.offset_data()).unwrap();
            let indices = ls.feature_indices().iter().map(|i| i.get()).collect();
            out.push((record.script_tag(), lang.lang_sys_tag(), indices));
        }
    }
    out
}

#[test]
fn registers_calt_in_every_language_system() {
    let data = calt_font(&[
        ("DFLT", vec![0, 3], vec![]),
        ("kana", vec![3], vec![("JAN ", vec![])]),
        ("latn", vec![0, 1, 3], vec![("TRK ", vec![0, 3])]),
    ]);
    let CaltRegistration::Registered { lang_systems: changed, data: out } =
        register_calt(&data).unwrap()
    else {
        panic!("expected calt to be registered");
    };
    assert_eq!(changed, 5);
    assert_eq!(
        lang_systems(&out),
        vec![
            (tag("DFLT"), tag("dflt"), vec![0, 1, 3, 2]),
            (tag("kana"), tag("dflt"), vec![3, 1, 2]),
            (tag("kana"), tag("JAN "), vec![1, 2]),
            (tag("latn"), tag("dflt"), vec![0, 1, 3, 2]),
            (tag("latn"), tag("TRK "), vec![0, 1, 3, 2]),
        ]
    );
    assert_eq!(register_calt(&out).unwrap(), CaltRegistration::AlreadyRegistered);
}

#[test]
fn calt_fix_needs_a_calt_feature() {
    let base = TestFont::new().simple("a", Some('a'), 600).simple("a.alt", None, 600);
    let lookup = single_subst(&[(base.gid("a"), base.gid("a.alt"))]);
    let data = base
        .gsub(gsub(vec![lookup], &[("ss01", vec![0])], &[("latn", vec![0], vec![])]))
        .build();
    assert_eq!(register_calt(&data).unwrap(), CaltRegistration::NoCalt);
}

/// fvar with a single `wght` axis (100..900, default 400) and no instances.
fn wght_fvar() -> Vec<u8> {
    let mut fvar = Vec::new();
    for v in [1u16, 0, 16, 2, 1, 20, 0, 8] {
        fvar.extend(v.to_be_bytes());
    }
    fvar.extend(b"wght");
    for value in [100i32, 400, 900] {
        fvar.extend((value << 16).to_be_bytes());
    }
    fvar.extend(0u16.to_be_bytes());
    fvar.extend(256u16.to_be_bytes());
    fvar
}

#[test]
fn copies_gsub_verbatim_between_static_fonts() {
    let (_, donor) = code_font();
    let target = TestFont::new()
        .simple("a", Some('a'), 600)
        .simple("grave", Some('`'), 600)
        .simple("grave_grave_grave.code", None, 600)
        .simple("a.alt", None, 600)
        .simple("b", Some('b'), 600)
        .build();

    let (out, report) = copy_gsub(&donor, &target).unwrap();
    assert!(report.verbatim);
    let donor_gsub = FontRef::new(&donor).unwrap().table_data(tag("GSUB")).unwrap();
    let copied = FontRef::new(&out).unwrap().table_data(tag("GSUB")).unwrap();
    assert_eq!(donor_gsub.as_bytes(), copied.as_bytes());
    assert_eq!(FontRef::new(&out).unwrap().maxp().unwrap().num_glyphs(), 6);
}

#[test]
fn copy_between_different_axis_spaces_rebuilds_gsub() {
    let (_, plain_donor) = code_font();
    let donor_vf = with_tables(&plain_donor, &[("fvar", wght_fvar())]);
    assert_eq!(FontTables::new(&donor_vf).unwrap().axis_tags(), vec![tag("wght")]);

    let (_, target) = code_font();
    let (out, report) = copy_gsub(&donor_vf, &target).unwrap();
    assert!(!report.verbatim);
    assert!(!report.dropped_feature_variations);
    assert!(!report.dropped_gdef_var_store);

    let font = FontRef::new(&out).unwrap();
    let lookups = read_lookups(&font.gsub().unwrap()).unwrap();
    assert_eq!(lookups.len(), 2);
}

/// Rebuild `data` with `tables` added or replaced.
fn with_tables(data: &[u8], tables: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let font = FontRef::new(data).unwrap();
    let mut builder = write_fonts::FontBuilder::new();
    for record in font.table_directory.table_records() {
        builder.add_raw(record.tag(), font.table_data(record.tag()).unwrap());
    }
    for (name, table) in tables {
        builder.add_raw(tag(name), table.clone());
    }
    builder.build()
}

/// GSUB 1.1 copy of `gsub_1_0` whose FeatureVariations swap feature 0 for
/// lookup 1 when `wght` is in 0.5..1.0.
fn gsub_with_feature_variations(gsub_1_0: &[u8]) -> Vec<u8> {
    let body = &gsub_1_0[10..];
    let shift = |at: usize| u16::from_be_bytes([gsub_1_0[at], gsub_1_0[at + 1]]) + 4;
    let feature_variations_offset = (14 + body.len()) as u32;

    let mut out = Vec::new();
    out.extend(0x0001_0001u32.to_be_bytes());
    for at in [4, 6, 8] {
        out.extend(shift(at).to_be_bytes());
    }
    out.extend(feature_variations_offset.to_be_bytes());
    out.extend(body);

    // FeatureVariations: one record -> ConditionSet at 16, substitution at 30
    for v in [1u16, 0] {
        out.extend(v.to_be_bytes());
    }
    out.extend(1u32.to_be_bytes());
    out.extend(16u32.to_be_bytes());
    out.extend(30u32.to_be_bytes());
    // ConditionSet with one axis range condition
    out.extend(1u16.to_be_bytes());
    out.extend(6u32.to_be_bytes());
    for v in [1u16, 0, 0x2000, 0x4000] {
        out.extend(v.to_be_bytes());
    }
    // FeatureTableSubstitution: feature 0 -> alternate feature at 12
    for v in [1u16, 0, 1, 0] {
        out.extend(v.to_be_bytes());
    }
    out.extend(12u32.to_be_bytes());
    for v in [0u16, 1, 1] {
        out.extend(v.to_be_bytes());
    }
    out
}

/// GDEF 1.3 with nothing but an empty item variation store.
fn gdef_with_var_store() -> Vec<u8> {
    let mut gdef = Vec::new();
    gdef.extend(0x0001_0003u32.to_be_bytes());
    for _ in 0..5 {
        gdef.extend(0u16.to_be_bytes());
    }
    gdef.extend(18u32.to_be_bytes());
    gdef.extend(1u16.to_be_bytes());
    gdef.extend(8u32.to_be_bytes());
    gdef.extend(0u16.to_be_bytes());
    for v in [0u16, 0] {
        gdef.extend(v.to_be_bytes());
    }
    gdef
}

#[test]
fn mismatched_axes_drop_feature_variations_and_gdef_var_store() {
    let (_, plain) = code_font();
    let plain_gsub = FontRef::new(&plain).unwrap().table_data(tag("GSUB")).unwrap();
    let donor = with_tables(
        &plain,
        &[("GSUB", gsub_with_feature_variations(plain_gsub.as_bytes())), ("fvar", wght_fvar())],
    );
    let target = with_tables(&plain, &[("GDEF", gdef_with_var_store())]);

    let donor_font = FontRef::new(&donor).unwrap();
    assert!(matches!(donor_font.gsub().unwrap().feature_variations(), Some(Ok(_))));
    assert!(FontTables::new(&target).unwrap().gdef_has_var_store());

    let (out, report) = copy_gsub(&donor, &target).unwrap();
    assert!(!report.verbatim);
    assert!(report.dropped_feature_variations);
    assert!(report.dropped_gdef_var_store);

    let font = FontRef::new(&out).unwrap();
    let gsub = font.gsub().unwrap();
    assert!(gsub.feature_variations().is_none());
    assert_eq!(read_lookups(&gsub).unwrap().len(), 2);
    assert!(font.gdef().unwrap().item_var_store().is_none());
    assert!(!FontTables::new(&out).unwrap().gdef_has_var_store());
    assert_eq!(font.maxp().unwrap().num_glyphs(), 5);
}

#[test]
fn donor_with_more_glyphs_is_rejected() {
    let (_, donor) = code_font();
    let target = TestFont::new().simple("a", Some('a'), 600).build();
    assert!(matches!(
        copy_gsub(&donor, &target),
        Err(Error::IncompatibleMasters { donor_glyphs: 5, target_glyphs: 2 })
    ));
}
