//! Variable font builder implementation.

use std::{collections::HashSet, fs::read, time::Instant};

use kurbo::{Point, Vec2};
use log::{debug, info, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::{
        glyf::{Anchor, Glyf as ReadGlyf, Glyph},
        hmtx::Hmtx as ReadHmtx,
        loca::Loca as ReadLoca,
    },
    types::{Fixed, GlyphId, NameId, Tag},
};
use warpnine_font_ops::{FontTables, avar::encode_avar};
use write_fonts::{
    FontBuilder,
    tables::{
        fvar::{AxisInstanceArrays, Fvar, InstanceRecord, VariationAxisRecord},
        gdef::Gdef,
        gvar::{GlyphDelta, GlyphDeltas, GlyphVariations, Gvar, iup::iup_delta_optimize},
        name::{Name, NameRecord},
        stat::{AxisRecord as StatAxisRecord, AxisValue, AxisValueTableFlags, Stat},
    },
};

use crate::{
    designspace::{Axis, DesignSpace},
    error::{Error, Incompatibility, Result},
    variation_model::VariationModel,
};

/// Tables of the default master that are rebuilt or must not survive.
const SKIP_TABLES: &[Tag] = &[
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"avar"),
    Tag::new(b"cvar"),
    Tag::new(b"STAT"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"DSIG"),
    Tag::new(b"name"),
    Tag::new(b"GDEF"),
    Tag::new(b"GSUB"),
];

/// First name ID available to fonts (axis names, then instances, then STAT values)
const FIRST_FONT_NAME_ID: u16 = 256;

/// IUP tolerance in font units.
const IUP_TOLERANCE: f64 = 0.5;

/// Build a variable font from a designspace whose sources are files on disk.
pub fn build_variable_font(designspace: &DesignSpace) -> Result<Vec<u8>> {
    let master_data: Vec<Vec<u8>> = designspace
        .sources
        .iter()
        .map(|source| {
            read(&source.path).map_err(|e| Error::ReadFont { path: source.path.clone(), source: e })
        })
        .collect::<Result<_>>()?;
    let masters: Vec<&[u8]> = master_data.iter().map(Vec::as_slice).collect();
    build_variable_font_from_masters(designspace, &masters)
}

/// Build a variable font from in-memory masters, one per designspace source.
///
/// 1. Validates the designspace and checks the masters are interpolatable
/// 2. Computes glyph deltas with the variation model (gvar)
/// 3. Builds fvar, STAT, name and, for mapped axes, avar
/// 4. Copies the remaining tables from the default master, dropping GSUB
pub fn build_variable_font_from_masters(
    designspace: &DesignSpace,
    masters: &[&[u8]],
) -> Result<Vec<u8>> {
    designspace.validate()?;
    if masters.len() != designspace.sources.len() {
        return Err(Error::InvalidDesignspace(format!(
            "{} sources but {} master fonts",
            designspace.sources.len(),
            masters.len()
        )));
    }

    info!("Building variable font from {} masters", masters.len());

    let fonts: Vec<FontRef> = masters
        .iter()
        .zip(&designspace.sources)
        .map(|(data, source)| {
            FontRef::new(data).map_err(|e| Error::ParseFont { master: source.label(), source: e })
        })
        .collect::<Result<_>>()?;

    let model = VariationModel::new(designspace).ok_or_else(|| Error::IncompatibleMasters {
        master: "designspace".to_string(),
        reason: Incompatibility::NoDefault,
    })?;
    let default_font = &fonts[model.default_idx];
    info!(
        "Default master: {}, {} regions",
        designspace.sources[model.default_idx].label(),
        model.regions.len()
    );

    let outlines = fonts
        .iter()
        .zip(&designspace.sources)
        .map(|(font, source)| MasterOutlines::new(font, &source.label()))
        .collect::<Result<Vec<_>>>()?;
    verify_masters(designspace, &outlines, model.default_idx)?;

    let gvar_start = Instant::now();
    let gvar = build_gvar(designspace, &outlines, &model)?;
    info!("Built gvar table in {:.2}s", gvar_start.elapsed().as_secs_f64());

    let mut names = NameAllocator::default();
    let fvar = build_fvar(designspace, &mut names);
    let stat = build_stat(designspace, &mut names);
    let name = build_name(default_font, names)?;
    info!(
        "Built fvar with {} axes and {} instances",
        designspace.axes.len(),
        designspace.instances.len()
    );

    let mut builder = FontBuilder::new();
    builder.add_table(&fvar)?;
    builder.add_table(&gvar)?;
    builder.add_table(&name)?;
    builder.add_table(&stat)?;

    if let Some(maps) = designspace.avar_maps() {
        debug!("Adding avar for mapped axes");
        builder.add_raw(Tag::new(b"avar"), encode_avar(&maps));
    }

    // The masters' variation store indexes axes this font does not have
    if let Ok(gdef) = default_font.gdef() {
        let tables = FontTables::from_font(default_font.clone());
        if tables.gdef_has_var_store() {
            debug!("Dropping GDEF variation store");
            builder.add_table(&build_gdef_without_varstore(&gdef))?;
        } else if let Some(data) = default_font.table_data(Tag::new(b"GDEF")) {
            builder.add_raw(Tag::new(b"GDEF"), data);
        }
    }

    let skip: HashSet<Tag> = SKIP_TABLES.iter().copied().collect();
    for record in default_font.table_directory.table_records() {
        let tag = record.tag();
        if !skip.contains(&tag)
            && let Some(data) = default_font.table_data(tag)
        {
            builder.add_raw(tag, data);
        }
    }

    Ok(builder.build())
}

/// Outline and metric tables of one master.
struct MasterOutlines<'a> {
    label: String,
    num_glyphs: u16,
    glyf: ReadGlyf<'a>,
    loca: ReadLoca<'a>,
    hmtx: ReadHmtx<'a>,
}

impl<'a> MasterOutlines<'a> {
    fn new(font: &FontRef<'a>, label: &str) -> Result<Self> {
        let missing = |table| Error::MissingTable { master: label.to_string(), table };
        Ok(Self {
            label: label.to_string(),
            num_glyphs: font.maxp()?.num_glyphs(),
            glyf: font.glyf().map_err(|_| missing("glyf"))?,
            loca: font.loca(None).map_err(|_| missing("loca"))?,
            hmtx: font.hmtx().map_err(|_| missing("hmtx"))?,
        })
    }

    fn glyph(&self, gid: GlyphId) -> Result<Option<Glyph<'a>>> {
        Ok(self.loca.get_glyf(gid, &self.glyf)?)
    }

    /// The four phantom points: origin, advance, top and bottom.
    fn phantom_points(&self, gid: GlyphId, x_min: i16) -> [Vec2; 4] {
        let advance = self.hmtx.advance(gid).unwrap_or(0);
        let lsb = self.hmtx.side_bearing(gid).unwrap_or(0);
        let origin = f64::from(x_min) - f64::from(lsb);
        [
            Vec2::new(origin, 0.0),
            Vec2::new(origin + f64::from(advance), 0.0),
            Vec2::ZERO,
            Vec2::ZERO,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Empty,
    Simple(usize),
    Composite(usize),
}

impl Shape {
    fn of(glyph: Option<&Glyph>) -> Self {
        match glyph {
            None => Shape::Empty,
            Some(Glyph::Simple(simple)) => Shape::Simple(simple.num_points()),
            Some(Glyph::Composite(composite)) => Shape::Composite(composite.components().count()),
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Shape::Empty => "empty",
            Shape::Simple(_) => "simple",
            Shape::Composite(_) => "composite",
        }
    }
}

/// Glyph counts must agree, and every glyph must have the same outline kind
/// with the same number of points or components in every master.
fn verify_masters(
    designspace: &DesignSpace,
    masters: &[MasterOutlines],
    default_idx: usize,
) -> Result<()> {
    let default = &masters[default_idx];
    for master in masters {
        if master.num_glyphs != default.num_glyphs {
            return Err(Error::IncompatibleMasters {
                master: master.label.clone(),
                reason: Incompatibility::GlyphCount {
                    expected: default.num_glyphs,
                    actual: master.num_glyphs,
                },
            });
        }
    }

    for gid in 0..default.num_glyphs {
        let gid = GlyphId::new(u32::from(gid));
        let expected = Shape::of(default.glyph(gid)?.as_ref());
        for master in masters {
            let actual = Shape::of(master.glyph(gid)?.as_ref());
            if actual == expected {
                continue;
            }
            let glyph = gid.to_u32();
            let reason = match (expected, actual) {
                (Shape::Simple(expected), Shape::Simple(actual)) => {
                    Incompatibility::PointCount { glyph, expected, actual }
                }
                (Shape::Composite(expected), Shape::Composite(actual)) => {
                    Incompatibility::ComponentCount { glyph, expected, actual }
                }
                _ => Incompatibility::OutlineKind {
                    glyph,
                    expected: expected.kind(),
                    actual: actual.kind(),
                },
            };
            return Err(Error::IncompatibleMasters { master: master.label.clone(), reason });
        }
    }

    debug!("{} masters are compatible", designspace.sources.len());
    Ok(())
}

#[derive(Debug, Default)]
struct IupStats {
    points: usize,
    required: usize,
    failures: usize,
}

fn build_gvar(
    designspace: &DesignSpace,
    masters: &[MasterOutlines],
    model: &VariationModel,
) -> Result<Gvar> {
    let num_glyphs = masters[model.default_idx].num_glyphs;
    let mut stats = IupStats::default();

    let variations = (0..num_glyphs)
        .map(|gid| build_glyph_variations(GlyphId::new(u32::from(gid)), masters, model, &mut stats))
        .collect::<Result<Vec<_>>>()?;

    if stats.points > 0 {
        info!(
            "IUP: {} of {} points required ({:.1}%)",
            stats.required,
            stats.points,
            stats.required as f64 / stats.points as f64 * 100.0
        );
    }
    if stats.failures > 0 {
        warn!("IUP optimization failed for {} glyph tuples, kept all deltas", stats.failures);
    }

    Gvar::new(variations, designspace.axes.len() as u16).map_err(Error::GvarBuild)
}

fn build_glyph_variations(
    gid: GlyphId,
    masters: &[MasterOutlines],
    model: &VariationModel,
    stats: &mut IupStats,
) -> Result<GlyphVariations> {
    let default = &masters[model.default_idx];
    let Some(default_glyph) = default.glyph(gid)? else {
        return Ok(GlyphVariations::new(gid, vec![]));
    };

    // Point values per master: outline points (or component offsets) then phantoms
    let mut master_values: Vec<Vec<Vec2>> = Vec::with_capacity(masters.len());
    for master in masters {
        let values: Vec<Vec2> = match master.glyph(gid)? {
            Some(Glyph::Simple(simple)) => {
                let mut values: Vec<Vec2> = simple
                    .points()
                    .map(|p| Vec2::new(f64::from(p.x), f64::from(p.y)))
                    .collect();
                values.extend(master.phantom_points(gid, simple.x_min()));
                values
            }
            Some(Glyph::Composite(composite)) => {
                let mut values: Vec<Vec2> = composite
                    .components()
                    .map(|c| match c.anchor {
                        Anchor::Offset { x, y } => Vec2::new(f64::from(x), f64::from(y)),
                        Anchor::Point { .. } => Vec2::ZERO,
                    })
                    .collect();
                values.extend(master.phantom_points(gid, composite.x_min()));
                values
            }
            None => Vec::new(),
        };
        master_values.push(values);
    }

    let num_points = master_values[model.default_idx].len();
    let mut region_deltas: Vec<Vec<Vec2>> =
        vec![Vec::with_capacity(num_points); model.regions.len()];
    let mut point_values = Vec::with_capacity(masters.len());
    for point_idx in 0..num_points {
        point_values.clear();
        point_values.extend(master_values.iter().map(|values| values[point_idx]));
        for (deltas, delta) in region_deltas.iter_mut().zip(model.deltas(&point_values)) {
            deltas.push(delta);
        }
    }

    let simple_outline = match &default_glyph {
        Glyph::Simple(simple) => {
            let coords: Vec<Point> = simple
                .points()
                .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                .chain(master_values[model.default_idx].iter().rev().take(4).rev().map(|v| v.to_point()))
                .collect();
            let contour_ends: Vec<usize> =
                simple.end_pts_of_contours().iter().map(|e| usize::from(e.get())).collect();
            Some((coords, contour_ends))
        }
        Glyph::Composite(_) => None,
    };

    let mut glyph_deltas = Vec::with_capacity(model.regions.len());
    for (region, deltas) in model.regions.iter().zip(region_deltas) {
        if deltas.iter().all(|d| d.x.round() == 0.0 && d.y.round() == 0.0) {
            continue;
        }
        let deltas = match &simple_outline {
            Some((coords, contour_ends)) => optimize(deltas, coords, contour_ends, stats),
            None => deltas.iter().map(|d| required(*d)).collect(),
        };
        glyph_deltas.push(GlyphDeltas::new(region.tents(), deltas));
    }

    Ok(GlyphVariations::new(gid, glyph_deltas))
}

fn required(delta: Vec2) -> GlyphDelta {
    GlyphDelta::required(delta.x.round() as i16, delta.y.round() as i16)
}

/// Drop the deltas IUP can infer; the phantom points always stay explicit.
fn optimize(
    deltas: Vec<Vec2>,
    coords: &[Point],
    contour_ends: &[usize],
    stats: &mut IupStats,
) -> Vec<GlyphDelta> {
    let num_points = deltas.len().saturating_sub(4);
    match iup_delta_optimize(deltas.clone(), coords.to_vec(), IUP_TOLERANCE, contour_ends) {
        Ok(mut optimized) => {
            stats.points += num_points;
            stats.required += optimized.iter().take(num_points).filter(|d| d.required).count();
            for delta in optimized.iter_mut().skip(num_points) {
                *delta = GlyphDelta::required(delta.x, delta.y);
            }
            optimized
        }
        Err(e) => {
            debug!("IUP optimization failed: {e:?}");
            stats.failures += 1;
            deltas.into_iter().map(required).collect()
        }
    }
}

/// Name strings for the IDs from 256 up, reusing the ID of an equal string.
#[derive(Debug, Default)]
struct NameAllocator {
    names: Vec<String>,
}

impl NameAllocator {
    fn add(&mut self, name: &str) -> NameId {
        let idx = match self.names.iter().position(|n| n == name) {
            Some(idx) => idx,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        };
        NameId::new(FIRST_FONT_NAME_ID + idx as u16)
    }

    fn records(&self) -> impl Iterator<Item = (u16, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (FIRST_FONT_NAME_ID + idx as u16, name.as_str()))
    }
}

fn build_fvar(designspace: &DesignSpace, names: &mut NameAllocator) -> Fvar {
    let axes: Vec<VariationAxisRecord> = designspace
        .axes
        .iter()
        .map(|axis| VariationAxisRecord {
            axis_tag: axis.tag(),
            min_value: Fixed::from_f64(f64::from(axis.minimum)),
            default_value: Fixed::from_f64(f64::from(axis.default)),
            max_value: Fixed::from_f64(f64::from(axis.maximum)),
            flags: 0u16,
            axis_name_id: names.add(&axis.name),
        })
        .collect();

    let instances: Vec<InstanceRecord> = designspace
        .instances
        .iter()
        .map(|instance| InstanceRecord {
            subfamily_name_id: names.add(&instance.name),
            flags: 0,
            coordinates: designspace
                .axes
                .iter()
                .map(|axis| Fixed::from_f64(f64::from(instance.axis_value(axis))))
                .collect(),
            post_script_name_id: None,
        })
        .collect();

    Fvar { axis_instance_arrays: AxisInstanceArrays { axes, instances }.into() }
}

/// Standard name of an OS/2 weight class.
fn weight_name(value: f32) -> Option<&'static str> {
    let name = match value.round() as i32 {
        100 => "Thin",
        200 => "ExtraLight",
        300 => "Light",
        400 => "Regular",
        500 => "Medium",
        600 => "SemiBold",
        700 => "Bold",
        800 => "ExtraBold",
        900 => "Black",
        1000 => "ExtraBlack",
        _ => return None,
    };
    Some(name)
}

/// Distinct master values on `axis`, ascending.
fn master_values(designspace: &DesignSpace, axis: &Axis) -> Vec<f32> {
    let mut values: Vec<f32> =
        designspace.sources.iter().map(|source| source.axis_value(axis)).collect();
    values.sort_by(f32::total_cmp);
    values.dedup();
    values
}

/// STAT: one value per master position on each axis, the default elidable.
/// `ital` gets the Upright (elidable) and Italic pair.
fn build_stat(designspace: &DesignSpace, names: &mut NameAllocator) -> Stat {
    let axis_records: Vec<StatAxisRecord> = designspace
        .axes
        .iter()
        .enumerate()
        .map(|(idx, axis)| StatAxisRecord::new(axis.tag(), names.add(&axis.name), idx as u16))
        .collect();

    let mut axis_values = Vec::new();
    for (idx, axis) in designspace.axes.iter().enumerate() {
        let values: Vec<(f32, String)> = if axis.tag == "ital" {
            vec![(axis.minimum, "Upright".to_string()), (axis.maximum, "Italic".to_string())]
        } else {
            master_values(designspace, axis)
                .into_iter()
                .map(|value| {
                    let name = match (axis.tag.as_str(), weight_name(value)) {
                        ("wght", Some(name)) => name.to_string(),
                        _ => format!("{} {value}", axis.name),
                    };
                    (value, name)
                })
                .collect()
        };

        for (value, name) in values {
            let flags = if (value - axis.default).abs() < 0.001 {
                AxisValueTableFlags::ELIDABLE_AXIS_VALUE_NAME
            } else {
                AxisValueTableFlags::empty()
            };
            axis_values.push(AxisValue::format_1(
                idx as u16,
                flags,
                names.add(&name),
                Fixed::from_f64(f64::from(value)),
            ));
        }
    }

    let elided = names.add("Regular");
    Stat::new(axis_records, axis_values, elided)
}

/// The default master's name records below 256, plus the allocated names.
fn build_name(default_font: &FontRef, names: NameAllocator) -> Result<Name> {
    let name_table = default_font.name()?;

    let mut records: Vec<NameRecord> = Vec::new();
    let mut has_mac = false;
    for record in name_table.name_record() {
        let name_id = record.name_id().to_u16();
        if name_id >= FIRST_FONT_NAME_ID {
            continue;
        }
        has_mac |= record.platform_id() == 1;
        let Ok(string) = record.string(name_table.string_data()) else {
            continue;
        };
        records.push(NameRecord::new(
            record.platform_id(),
            record.encoding_id(),
            record.language_id(),
            record.name_id(),
            string.chars().collect::<String>().into(),
        ));
    }

    for (name_id, name) in names.records() {
        records.push(NameRecord::new(3, 1, 0x409, NameId::new(name_id), name.to_string().into()));
        if has_mac {
            records.push(NameRecord::new(1, 0, 0, NameId::new(name_id), name.to_string().into()));
        }
    }

    records.sort_by_key(|r| (r.platform_id, r.encoding_id, r.language_id, r.name_id));
    Ok(Name::new(records))
}

/// GDEF with everything but the variation store.
fn build_gdef_without_varstore(gdef: &read_fonts::tables::gdef::Gdef) -> Gdef {
    use write_fonts::from_obj::ToOwnedTable;

    let mut owned: Gdef = gdef.to_owned_table();
    owned.item_var_store = None.into();
    owned
}

#[cfg(test)]
mod tests {
    use read_fonts::{FontData, FontRead};

    use super::*;
    use crate::designspace::Source;

    #[test]
    fn names_are_shared_between_tables() {
        let mut names = NameAllocator::default();
        assert_eq!(names.add("Weight"), NameId::new(256));
        assert_eq!(names.add("Regular"), NameId::new(257));
        assert_eq!(names.add("Weight"), NameId::new(256));
        assert_eq!(names.records().count(), 2);
    }

    #[test]
    fn weight_names() {
        assert_eq!(weight_name(300.0), Some("Light"));
        assert_eq!(weight_name(1000.0), Some("ExtraBlack"));
        assert_eq!(weight_name(450.0), None);
    }

    #[test]
    fn stat_values_follow_the_masters() {
        let axes = vec![
            Axis::new("wght", "Weight", 300.0, 400.0, 700.0),
            Axis::new("ital", "Italic", 0.0, 0.0, 1.0),
        ];
        let sources = [300.0, 400.0, 700.0]
            .into_iter()
            .flat_map(|w| [(w, 0.0), (w, 1.0)])
            .map(|(w, i)| Source::new("m.ttf", vec![("wght", w), ("ital", i)]))
            .collect();
        let ds = DesignSpace::new(axes, sources);

        let mut names = NameAllocator::default();
        let stat = build_stat(&ds, &mut names);
        let bytes = write_fonts::dump_table(&stat).unwrap();
        let stat = read_fonts::tables::stat::Stat::read(FontData::new(&bytes)).unwrap();

        assert_eq!(stat.design_axis_count(), 2);
        assert_eq!(stat.axis_value_count(), 5);
        let strings: Vec<&str> = names.records().map(|(_, s)| s).collect();
        assert_eq!(strings, ["Weight", "Italic", "Light", "Regular", "Bold", "Upright"]);
        assert_eq!(stat.elided_fallback_name_id(), Some(NameId::new(259)));
    }

    /// GDEF 1.3: one mark glyph set covering glyph 3 and an empty variation store.
    fn gdef_with_mark_sets_and_var_store() -> Vec<u8> {
        let mut gdef = Vec::new();
        gdef.extend(0x0001_0003u32.to_be_bytes());
        for offset in [0u16, 0, 0, 0, 18] {
            gdef.extend(offset.to_be_bytes());
        }
        gdef.extend(32u32.to_be_bytes());
        // MarkGlyphSets at 18, coverage at 26
        gdef.extend([1u16, 1].iter().flat_map(|v| v.to_be_bytes()));
        gdef.extend(8u32.to_be_bytes());
        gdef.extend([1u16, 1, 3].iter().flat_map(|v| v.to_be_bytes()));
        // ItemVariationStore at 32, region list at 40
        gdef.extend(1u16.to_be_bytes());
        gdef.extend(8u32.to_be_bytes());
        gdef.extend([0u16, 0, 0].iter().flat_map(|v| v.to_be_bytes()));
        gdef
    }

    #[test]
    fn dropping_the_var_store_keeps_mark_glyph_sets() {
        use read_fonts::tables::gdef::Gdef as ReadGdef;

        let raw = gdef_with_mark_sets_and_var_store();
        let source = ReadGdef::read(FontData::new(&raw)).unwrap();
        assert!(matches!(source.item_var_store(), Some(Ok(_))));

        let bytes = write_fonts::dump_table(&build_gdef_without_varstore(&source)).unwrap();
        let gdef = ReadGdef::read(FontData::new(&bytes)).unwrap();
        assert!(gdef.item_var_store().is_none());
        let sets = gdef.mark_glyph_sets_def().unwrap().unwrap();
        assert_eq!(sets.mark_glyph_set_count(), 1);
    }
}
