//! Synthetic TrueType fonts for tests.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for dev-dependencies of the other workspace crates.

use std::collections::HashMap;

use font_types::{F2Dot14, FWord, Fixed, LongDateTime, NameId, Tag, UfWord};
use kurbo::Rect;
use read_fonts::{tables::glyf::CurvePoint, types::GlyphId16};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        fvar::{AxisInstanceArrays, Fvar, InstanceRecord, VariationAxisRecord},
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, GlyfLocaBuilder,
            Glyph, SimpleGlyph, Transform,
        },
        gvar::{GlyphDelta, GlyphDeltas, GlyphVariations, Gvar, Tent},
        gsub::{
            AlternateSet, AlternateSubstFormat1, Gsub, SingleSubst, SubstitutionLookup,
            SubstitutionLookupList,
        },
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        layout::{
            CoverageTable, Feature, FeatureList, FeatureRecord, LangSys, LangSysRecord, Lookup,
            LookupFlag, Script, ScriptList, ScriptRecord,
        },
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
    types::GlyphId,
};

const UPEM: u16 = 1000;

#[derive(Debug, Clone)]
enum Outline {
    Empty,
    Rect(Rect),
    Composite(Vec<(String, i16, i16)>),
}

impl Outline {
    fn point_count(&self) -> usize {
        match self {
            Outline::Empty => 0,
            Outline::Rect(_) => 4,
            Outline::Composite(parts) => parts.len(),
        }
    }
}

#[derive(Debug, Clone)]
struct TestAxis {
    tag: Tag,
    min: f32,
    default: f32,
    max: f32,
}

/// One gvar tuple: glyph, peak per axis tag, deltas for the outline points
/// followed by the four phantom points.
#[derive(Debug, Clone)]
struct TestVariation {
    glyph: String,
    peaks: Vec<(Tag, f32)>,
    deltas: Vec<(i16, i16)>,
}

#[derive(Debug, Clone)]
struct TestGlyph {
    name: String,
    codepoint: Option<char>,
    advance: u16,
    outline: Outline,
}

/// Builder for small, fully valid TrueType fonts.
///
/// Glyph 0 is always `.notdef`. Every other glyph is added in order and
/// referenced by its post name.
#[derive(Debug, Clone)]
pub struct TestFont {
    glyphs: Vec<TestGlyph>,
    family: String,
    style: String,
    weight_class: u16,
    units_per_em: u16,
    gsub: Option<Gsub>,
    raw_tables: Vec<(Tag, Vec<u8>)>,
    axes: Vec<TestAxis>,
    instances: Vec<(String, Vec<f32>)>,
    variations: Vec<TestVariation>,
}

impl Default for TestFont {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFont {
    pub fn new() -> Self {
        Self {
            glyphs: vec![TestGlyph {
                name: ".notdef".to_string(),
                codepoint: None,
                advance: 500,
                outline: Outline::Rect(Rect::new(50.0, 0.0, 450.0, 700.0)),
            }],
            family: "Test Family".to_string(),
            style: "Regular".to_string(),
            weight_class: 400,
            units_per_em: UPEM,
            gsub: None,
            raw_tables: Vec::new(),
            axes: Vec::new(),
            instances: Vec::new(),
            variations: Vec::new(),
        }
    }

    /// Declare a variation axis; the font gets `fvar` and `gvar` once any
    /// axis exists. Axis name ids start at 256.
    pub fn axis(mut self, axis_tag: &str, min: f32, default: f32, max: f32) -> Self {
        self.axes.push(TestAxis { tag: tag(axis_tag), min, default, max });
        self
    }

    /// Add a named instance; its name id follows the axis name ids.
    pub fn instance(mut self, name: &str, coordinates: &[f32]) -> Self {
        self.instances.push((name.to_string(), coordinates.to_vec()));
        self
    }

    /// Add a gvar tuple for `glyph` peaking at `peaks` (normalized, axes not
    /// listed have peak 0). Missing deltas are zero.
    pub fn variation(mut self, glyph: &str, peaks: &[(&str, f32)], deltas: &[(i16, i16)]) -> Self {
        self.variations.push(TestVariation {
            glyph: glyph.to_string(),
            peaks: peaks.iter().map(|(t, v)| (tag(t), *v)).collect(),
            deltas: deltas.to_vec(),
        });
        self
    }

    /// Add a glyph drawn as one rectangle.
    pub fn glyph(mut self, name: &str, codepoint: Option<char>, advance: u16, rect: Rect) -> Self {
        self.glyphs.push(TestGlyph {
            name: name.to_string(),
            codepoint,
            advance,
            outline: Outline::Rect(rect),
        });
        self
    }

    /// Add a glyph with a default rectangle that fills most of its advance.
    pub fn simple(self, name: &str, codepoint: Option<char>, advance: u16) -> Self {
        let rect = Rect::new(50.0, 0.0, advance.saturating_sub(50) as f64, 700.0);
        self.glyph(name, codepoint, advance, rect)
    }

    /// Add a glyph with no outline, such as `space`.
    pub fn empty(mut self, name: &str, codepoint: Option<char>, advance: u16) -> Self {
        self.glyphs.push(TestGlyph {
            name: name.to_string(),
            codepoint,
            advance,
            outline: Outline::Empty,
        });
        self
    }

    /// Add a composite glyph built from `(component name, dx, dy)` references.
    pub fn composite(
        mut self,
        name: &str,
        codepoint: Option<char>,
        advance: u16,
        components: &[(&str, i16, i16)],
    ) -> Self {
        self.glyphs.push(TestGlyph {
            name: name.to_string(),
            codepoint,
            advance,
            outline: Outline::Composite(
                components.iter().map(|(n, x, y)| (n.to_string(), *x, *y)).collect(),
            ),
        });
        self
    }

    pub fn names(mut self, family: &str, style: &str) -> Self {
        self.family = family.to_string();
        self.style = style.to_string();
        self
    }

    pub fn weight_class(mut self, weight_class: u16) -> Self {
        self.weight_class = weight_class;
        self
    }

    pub fn units_per_em(mut self, units_per_em: u16) -> Self {
        self.units_per_em = units_per_em;
        self
    }

    pub fn gsub(mut self, gsub: Gsub) -> Self {
        self.gsub = Some(gsub);
        self
    }

    /// Add an arbitrary table as raw bytes.
    pub fn raw_table(mut self, tag: Tag, data: Vec<u8>) -> Self {
        self.raw_tables.push((tag, data));
        self
    }

    /// Glyph id of `name`.
    ///
    /// # Panics
    ///
    /// Panics when no glyph with that name was added.
    pub fn gid(&self, name: &str) -> GlyphId16 {
        let index = self
            .glyphs
            .iter()
            .position(|g| g.name == name)
            .unwrap_or_else(|| panic!("no glyph named {name}"));
        GlyphId16::new(index as u16)
    }

    pub fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    /// Serialize the font.
    ///
    /// # Panics
    ///
    /// Panics when the tables fail to compile, which indicates a broken test setup.
    pub fn build(&self) -> Vec<u8> {
        let by_name: HashMap<&str, GlyphId16> = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.as_str(), GlyphId16::new(i as u16)))
            .collect();

        let mut bounds: Vec<Option<Bbox>> = Vec::with_capacity(self.glyphs.len());
        let mut glyf_builder = GlyfLocaBuilder::new();
        let mut max_points = 0u16;
        for glyph in &self.glyphs {
            let (compiled, bbox) = match &glyph.outline {
                Outline::Empty => (Glyph::Empty, None),
                Outline::Rect(rect) => {
                    let simple = rect_glyph(*rect);
                    max_points = max_points.max(4);
                    let bbox = simple.bbox;
                    (Glyph::Simple(simple), Some(bbox))
                }
                Outline::Composite(parts) => {
                    let composite = composite_glyph(parts, &by_name, &bounds);
                    let bbox = composite.bbox;
                    (Glyph::Composite(composite), Some(bbox))
                }
            };
            bounds.push(bbox);
            glyf_builder.add_glyph(&compiled).expect("glyph compiles");
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let font_bbox = bounds.iter().flatten().fold(None, |acc: Option<Bbox>, b| {
            Some(match acc {
                None => *b,
                Some(a) => Bbox {
                    x_min: a.x_min.min(b.x_min),
                    y_min: a.y_min.min(b.y_min),
                    x_max: a.x_max.max(b.x_max),
                    y_max: a.y_max.max(b.y_max),
                },
            })
        });
        let font_bbox = font_bbox.unwrap_or(Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 });

        let head = Head {
            font_revision: Fixed::from_f64(1.0),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: Flags::empty(),
            units_per_em: self.units_per_em,
            created: LongDateTime::new(0),
            modified: LongDateTime::new(0),
            x_min: font_bbox.x_min,
            y_min: font_bbox.y_min,
            x_max: font_bbox.x_max,
            y_max: font_bbox.y_max,
            mac_style: MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
        };

        let advance_max = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let hhea = Hhea {
            ascender: FWord::new(800),
            descender: FWord::new(-200),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(advance_max),
            min_left_side_bearing: FWord::new(0),
            min_right_side_bearing: FWord::new(0),
            x_max_extent: FWord::new(font_bbox.x_max),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: self.glyphs.len() as u16,
        };

        let hmtx = Hmtx::new(
            self.glyphs
                .iter()
                .zip(&bounds)
                .map(|(g, b)| LongMetric {
                    advance: g.advance,
                    side_bearing: b.map(|b| b.x_min).unwrap_or(0),
                })
                .collect(),
            Vec::new(),
        );

        let maxp = Maxp {
            num_glyphs: self.glyphs.len() as u16,
            max_points: Some(max_points),
            max_contours: Some(1),
            max_composite_points: Some(max_points * 2),
            max_composite_contours: Some(2),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(2),
            max_component_depth: Some(1),
        };

        let mappings: Vec<(char, GlyphId)> = self
            .glyphs
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.codepoint.map(|c| (c, GlyphId::new(i as u32))))
            .collect();
        let cmap = Cmap::from_mappings(mappings).expect("cmap");

        let mut post = Post::new_v2(self.glyphs.iter().map(|g| g.name.as_str()));
        post.underline_position = FWord::new(-100);
        post.underline_thickness = FWord::new(50);

        let mut builder = FontBuilder::new();
        builder.add_table(&head).expect("head");
        builder.add_table(&hhea).expect("hhea");
        builder.add_table(&hmtx).expect("hmtx");
        builder.add_table(&maxp).expect("maxp");
        builder.add_table(&cmap).expect("cmap");
        builder.add_table(&post).expect("post");
        builder.add_table(&glyf).expect("glyf");
        builder.add_table(&loca).expect("loca");
        builder.add_table(&self.os2()).expect("OS/2");
        builder.add_table(&self.name_table()).expect("name");
        if let Some(gsub) = &self.gsub {
            builder.add_table(gsub).expect("GSUB");
        }
        if !self.axes.is_empty() {
            builder.add_table(&self.fvar()).expect("fvar");
            builder.add_table(&self.gvar()).expect("gvar");
        }
        for (tag, data) in &self.raw_tables {
            builder.add_raw(*tag, data.clone());
        }
        builder.build()
    }

    fn fvar(&self) -> Fvar {
        let axes = self
            .axes
            .iter()
            .enumerate()
            .map(|(i, axis)| VariationAxisRecord {
                axis_tag: axis.tag,
                min_value: Fixed::from_f64(f64::from(axis.min)),
                default_value: Fixed::from_f64(f64::from(axis.default)),
                max_value: Fixed::from_f64(f64::from(axis.max)),
                flags: 0,
                axis_name_id: NameId::new(256 + i as u16),
            })
            .collect();
        let first_instance_id = 256 + self.axes.len() as u16;
        let instances = self
            .instances
            .iter()
            .enumerate()
            .map(|(i, (_, coords))| InstanceRecord {
                subfamily_name_id: NameId::new(first_instance_id + i as u16),
                flags: 0,
                coordinates: coords.iter().map(|c| Fixed::from_f64(f64::from(*c))).collect(),
                post_script_name_id: None,
            })
            .collect();
        Fvar { axis_instance_arrays: AxisInstanceArrays { axes, instances }.into() }
    }

    fn gvar(&self) -> Gvar {
        let variations = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(gid, glyph)| {
                let point_count = glyph.outline.point_count() + 4;
                let tuples = self
                    .variations
                    .iter()
                    .filter(|v| v.glyph == glyph.name)
                    .map(|v| {
                        let tents = self
                            .axes
                            .iter()
                            .map(|axis| {
                                let peak = v
                                    .peaks
                                    .iter()
                                    .find(|(t, _)| *t == axis.tag)
                                    .map_or(0.0, |(_, p)| *p);
                                Tent::new(F2Dot14::from_f32(peak), None)
                            })
                            .collect();
                        let mut deltas = v.deltas.clone();
                        deltas.resize(point_count, (0, 0));
                        let deltas =
                            deltas.into_iter().map(|(x, y)| GlyphDelta::required(x, y)).collect();
                        GlyphDeltas::new(tents, deltas)
                    })
                    .collect();
                GlyphVariations::new(GlyphId::new(gid as u32), tuples)
            })
            .collect();
        Gvar::new(variations, self.axes.len() as u16).expect("gvar input")
    }

    fn name_table(&self) -> Name {
        let postscript = format!("{}-{}", self.family.replace(' ', ""), self.style);
        let mut entries = vec![
            (0, "Copyright test".to_string()),
            (1, self.family.clone()),
            (2, self.style.clone()),
            (3, format!("1.000;TEST;{postscript}")),
            (4, format!("{} {}", self.family, self.style)),
            (5, "Version 1.000".to_string()),
            (6, postscript),
        ];
        let mut next_id = 256;
        for axis in &self.axes {
            entries.push((next_id, axis.tag.to_string()));
            next_id += 1;
        }
        for (name, _) in &self.instances {
            entries.push((next_id, name.clone()));
            next_id += 1;
        }
        let records = entries
            .into_iter()
            .map(|(id, value)| NameRecord::new(3, 1, 0x409, NameId::new(id), value.into()))
            .collect();
        Name::new(records)
    }

    fn os2(&self) -> Os2 {
        let avg = {
            let total: u32 = self.glyphs.iter().map(|g| g.advance as u32).sum();
            (total / self.glyphs.len().max(1) as u32) as i16
        };
        Os2 {
            x_avg_char_width: avg,
            us_weight_class: self.weight_class,
            us_width_class: 5,
            fs_type: 0,
            y_subscript_x_size: 650,
            y_subscript_y_size: 600,
            y_subscript_x_offset: 0,
            y_subscript_y_offset: 75,
            y_superscript_x_size: 650,
            y_superscript_y_size: 600,
            y_superscript_x_offset: 0,
            y_superscript_y_offset: 350,
            y_strikeout_size: 50,
            y_strikeout_position: 300,
            s_family_class: 0,
            panose_10: [0; 10],
            ul_unicode_range_1: 0,
            ul_unicode_range_2: 0,
            ul_unicode_range_3: 0,
            ul_unicode_range_4: 0,
            ach_vend_id: Tag::new(b"TEST"),
            fs_selection: SelectionFlags::REGULAR,
            us_first_char_index: 0x20,
            us_last_char_index: 0x7E,
            s_typo_ascender: 800,
            s_typo_descender: -200,
            s_typo_line_gap: 0,
            us_win_ascent: 900,
            us_win_descent: 200,
            ul_code_page_range_1: Some(0),
            ul_code_page_range_2: Some(0),
            sx_height: Some(500),
            s_cap_height: Some(700),
            us_default_char: Some(0),
            us_break_char: Some(0x20),
            us_max_context: Some(0),
            us_lower_optical_point_size: None,
            us_upper_optical_point_size: None,
        }
    }
}

/// Script entry for [`gsub`]: script tag, default feature indices and
/// `(language tag, feature indices)` pairs.
pub type ScriptSpec<'a> = (&'a str, Vec<u16>, Vec<(&'a str, Vec<u16>)>);

/// Parse a four-character tag.
///
/// # Panics
///
/// Panics on tags that are not four ASCII characters.
pub fn tag(s: &str) -> Tag {
    Tag::new_checked(s.as_bytes()).expect("four-character tag")
}

/// Assemble a GSUB table from lookups, `(feature tag, lookup indices)` pairs
/// and script entries.
pub fn gsub(
    lookups: Vec<SubstitutionLookup>,
    features: &[(&str, Vec<u16>)],
    scripts: &[ScriptSpec],
) -> Gsub {
    let script_records = scripts
        .iter()
        .map(|(script, default, langs)| {
            let lang_records = langs
                .iter()
                .map(|(lang, indices)| LangSysRecord::new(tag(lang), LangSys::new(indices.clone())))
                .collect();
            ScriptRecord::new(
                tag(script),
                Script::new(Some(LangSys::new(default.clone())), lang_records),
            )
        })
        .collect();
    let feature_records = features
        .iter()
        .map(|(feature, lookups)| FeatureRecord::new(tag(feature), Feature::new(None, lookups.clone())))
        .collect();
    Gsub::new(
        ScriptList::new(script_records),
        FeatureList::new(feature_records),
        SubstitutionLookupList::new(lookups),
    )
}

/// A single-substitution lookup with one subtable mapping `from -> to`.
pub fn single_subst(pairs: &[(GlyphId16, GlyphId16)]) -> SubstitutionLookup {
    let mut sorted = pairs.to_vec();
    sorted.sort();
    let coverage = CoverageTable::format_1(sorted.iter().map(|(from, _)| *from).collect());
    let subtable = SingleSubst::format_2(coverage, sorted.iter().map(|(_, to)| *to).collect());
    SubstitutionLookup::Single(Lookup::new(LookupFlag::empty(), vec![subtable]))
}

/// An alternate-substitution lookup with one subtable.
pub fn alternate_subst(sets: &[(GlyphId16, Vec<GlyphId16>)]) -> SubstitutionLookup {
    let mut sorted = sets.to_vec();
    sorted.sort();
    let coverage = CoverageTable::format_1(sorted.iter().map(|(from, _)| *from).collect());
    let sets = sorted.into_iter().map(|(_, alternates)| AlternateSet::new(alternates)).collect();
    let subtable = AlternateSubstFormat1::new(coverage, sets);
    SubstitutionLookup::Alternate(Lookup::new(LookupFlag::empty(), vec![subtable]))
}

fn rect_glyph(rect: Rect) -> SimpleGlyph {
    let (x0, y0, x1, y1) = (rect.x0 as i16, rect.y0 as i16, rect.x1 as i16, rect.y1 as i16);
    let points = vec![
        CurvePoint::new(x0, y0, true),
        CurvePoint::new(x0, y1, true),
        CurvePoint::new(x1, y1, true),
        CurvePoint::new(x1, y0, true),
    ];
    SimpleGlyph {
        bbox: Bbox { x_min: x0, y_min: y0, x_max: x1, y_max: y1 },
        contours: vec![Contour::from(points)],
        instructions: vec![],
    }
}

fn identity() -> Transform {
    Transform {
        xx: F2Dot14::from_f32(1.0),
        yx: F2Dot14::from_f32(0.0),
        xy: F2Dot14::from_f32(0.0),
        yy: F2Dot14::from_f32(1.0),
    }
}

fn composite_glyph(
    parts: &[(String, i16, i16)],
    by_name: &HashMap<&str, GlyphId16>,
    bounds: &[Option<Bbox>],
) -> CompositeGlyph {
    let mut bbox: Option<Bbox> = None;
    let mut components = Vec::with_capacity(parts.len());
    for (name, dx, dy) in parts {
        let gid = *by_name.get(name.as_str()).unwrap_or_else(|| panic!("no glyph named {name}"));
        if let Some(Some(b)) = bounds.get(gid.to_u16() as usize) {
            let moved = Bbox {
                x_min: b.x_min + dx,
                y_min: b.y_min + dy,
                x_max: b.x_max + dx,
                y_max: b.y_max + dy,
            };
            bbox = Some(match bbox {
                None => moved,
                Some(a) => Bbox {
                    x_min: a.x_min.min(moved.x_min),
                    y_min: a.y_min.min(moved.y_min),
                    x_max: a.x_max.max(moved.x_max),
                    y_max: a.y_max.max(moved.y_max),
                },
            });
        }
        components.push(Component::new(
            gid,
            Anchor::Offset { x: *dx, y: *dy },
            identity(),
            ComponentFlags::default(),
        ));
    }
    let bbox = bbox.unwrap_or(Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 });
    let mut iter = components.into_iter();
    let first = iter.next().expect("composite needs at least one component");
    let mut composite = CompositeGlyph::new(first, bbox);
    for component in iter {
        composite.add_component(component, bbox);
    }
    composite
}
