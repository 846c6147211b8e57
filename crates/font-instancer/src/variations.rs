//! Variation tables after pinning: fvar, avar and STAT for partial
//! instances, and FeatureVariations for GSUB/GPOS.

use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::{
        fvar::Fvar as ReadFvar,
        layout::{Condition, FeatureVariations},
        stat::{AxisValue as ReadAxisValue, Stat as ReadStat},
    },
    types::{F2Dot14, Fixed, Tag},
};
use warpnine_font_ops::avar::{SegmentMap, decode_avar, encode_avar, is_identity};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        fvar::{AxisInstanceArrays, Fvar, InstanceRecord, VariationAxisRecord},
        gdef::Gdef,
        gpos::Gpos,
        gsub::Gsub,
        layout::Feature,
        stat::{AxisRecord, AxisValue, AxisValueRecord, Stat},
    },
    types::NameId,
};

use crate::{error::Result, pins::Pins};

/// `fvar` without the pinned axes and without instances that lie elsewhere
/// on them.
pub(crate) fn partial_fvar(fvar: &ReadFvar, pins: &Pins) -> Result<Fvar> {
    let axes: Vec<VariationAxisRecord> = fvar
        .axes()?
        .iter()
        .enumerate()
        .filter(|(i, _)| !pins.is_pinned(*i))
        .map(|(_, axis)| VariationAxisRecord {
            axis_tag: axis.axis_tag(),
            min_value: axis.min_value(),
            default_value: axis.default_value(),
            max_value: axis.max_value(),
            flags: axis.flags(),
            axis_name_id: axis.axis_name_id(),
        })
        .collect();

    let mut instances = Vec::new();
    for instance in fvar.instances()?.iter() {
        let instance = instance?;
        let coords: Vec<Fixed> = instance.coordinates.iter().map(|c| c.get()).collect();
        let on_pin = coords.iter().enumerate().all(|(i, value)| match pins.value_at(i) {
            Some(pinned) => *value == Fixed::from_f64(f64::from(pinned)),
            None => true,
        });
        if !on_pin {
            debug!("Dropping named instance {}", instance.subfamily_name_id);
            continue;
        }
        instances.push(InstanceRecord {
            subfamily_name_id: instance.subfamily_name_id,
            flags: instance.flags,
            coordinates: coords
                .iter()
                .enumerate()
                .filter(|(i, _)| !pins.is_pinned(*i))
                .map(|(_, c)| *c)
                .collect(),
            post_script_name_id: instance.post_script_name_id,
        });
    }

    Ok(Fvar { axis_instance_arrays: AxisInstanceArrays { axes, instances }.into() })
}

/// Raw `avar` without the pinned axes' segment maps, or `None` when every
/// remaining map is the identity.
pub(crate) fn partial_avar(data: &[u8], pins: &Pins) -> Result<Option<Vec<u8>>> {
    let maps = decode_avar(data)?;
    let kept: Vec<SegmentMap> = maps
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !pins.is_pinned(*i))
        .map(|(_, map)| map)
        .collect();
    if kept.iter().all(is_identity) {
        return Ok(None);
    }
    Ok(Some(encode_avar(&kept)))
}

/// `STAT` without the pinned axes.
///
/// Format 1-3 values on a pinned axis are dropped. A format 4 value survives
/// only when its records on pinned axes equal the pin; those records are then
/// removed.
pub(crate) fn partial_stat(stat: &ReadStat, pins: &Pins) -> Result<Stat> {
    let design_axes = stat.design_axes()?;
    let pinned_value = |index: u16| -> Option<Option<f32>> {
        let tag = design_axes.get(index as usize)?.axis_tag();
        pins.tags().contains(&tag).then(|| pins.value(tag))
    };
    let is_pinned = |index: u16| matches!(pinned_value(index), Some(Some(_)));

    let mut remap: Vec<Option<u16>> = Vec::with_capacity(design_axes.len());
    let mut axes = Vec::new();
    for (i, axis) in design_axes.iter().enumerate() {
        if is_pinned(i as u16) {
            remap.push(None);
            continue;
        }
        remap.push(Some(axes.len() as u16));
        axes.push(AxisRecord::new(axis.axis_tag(), axis.axis_name_id(), axis.axis_ordering()));
    }
    let new_index = |index: u16| remap.get(index as usize).copied().flatten();

    let mut values = Vec::new();
    if let Some(array) = stat.offset_to_axis_values().transpose()? {
        for value in array.axis_values().iter() {
            let kept = match value? {
                ReadAxisValue::Format1(v) => new_index(v.axis_index()).map(|i| {
                    AxisValue::format_1(i, v.flags(), v.value_name_id(), v.value())
                }),
                ReadAxisValue::Format2(v) => new_index(v.axis_index()).map(|i| {
                    AxisValue::format_2(
                        i,
                        v.flags(),
                        v.value_name_id(),
                        v.nominal_value(),
                        v.range_min_value(),
                        v.range_max_value(),
                    )
                }),
                ReadAxisValue::Format3(v) => new_index(v.axis_index()).map(|i| {
                    AxisValue::format_3(i, v.flags(), v.value_name_id(), v.value(), v.linked_value())
                }),
                ReadAxisValue::Format4(v) => {
                    let mut records = Vec::new();
                    let mut matches = true;
                    for record in v.axis_values() {
                        let index = record.axis_index();
                        match (pinned_value(index), new_index(index)) {
                            (Some(Some(pinned)), _) => {
                                matches &= record.value() == Fixed::from_f64(f64::from(pinned));
                            }
                            (_, Some(i)) => records.push(AxisValueRecord::new(i, record.value())),
                            _ => {}
                        }
                    }
                    (matches && !records.is_empty())
                        .then(|| AxisValue::format_4(v.flags(), v.value_name_id(), records))
                }
            };
            values.extend(kept);
        }
    }

    let elided = stat.elided_fallback_name_id().unwrap_or(NameId::new(2));
    Ok(Stat::new(axes, values, elided))
}

fn condition_holds(condition: &Condition, coords: &[F2Dot14]) -> bool {
    match condition {
        Condition::Format1AxisRange(range) => {
            let coord = coords.get(range.axis_index() as usize).copied().unwrap_or_default();
            range.filter_range_min_value() <= coord && coord <= range.filter_range_max_value()
        }
        _ => false,
    }
}

/// Feature substitutions of the first FeatureVariations record whose
/// conditions hold at `coords`.
fn active_substitutions(
    variations: &FeatureVariations,
    coords: &[F2Dot14],
) -> Result<Vec<(u16, Feature)>> {
    let data = variations.offset_data();
    for record in variations.feature_variation_records() {
        let holds = match record.condition_set(data).transpose()? {
            Some(set) => {
                let mut all = true;
                for condition in set.conditions().iter() {
                    all &= condition_holds(&condition?, coords);
                }
                all
            }
            None => true,
        };
        if !holds {
            continue;
        }
        let Some(substitution) = record.feature_table_substitution(data).transpose()? else {
            return Ok(Vec::new());
        };
        let mut features = Vec::new();
        for subst in substitution.substitutions() {
            let feature = subst.alternate_feature(substitution.offset_data())?;
            features.push((subst.feature_index(), feature.to_owned_table()));
        }
        return Ok(features);
    }
    Ok(Vec::new())
}

/// Layout tables that had to be rewritten; `None` means copy unchanged.
pub(crate) struct LayoutTables {
    pub gsub: Option<Gsub>,
    pub gpos: Option<Gpos>,
    pub gdef: Option<Gdef>,
}

/// Rebuild GSUB and GPOS without FeatureVariations, and GDEF without its
/// variation store.
///
/// For a full pin the record matching the pin is applied to the FeatureList
/// first; for a partial pin the variations are dropped as they are.
pub(crate) fn layout_tables(font: &FontRef, pins: &Pins) -> Result<LayoutTables> {
    let coords = pins.coords();
    let mut tables = LayoutTables { gsub: None, gpos: None, gdef: None };

    if let Ok(gsub) = font.gsub()
        && let Some(variations) = gsub.feature_variations().transpose()?
    {
        let mut owned: Gsub = gsub.to_owned_table();
        if pins.is_full() {
            for (index, feature) in active_substitutions(&variations, coords)? {
                match owned.feature_list.feature_records.get_mut(index as usize) {
                    Some(record) => record.feature = feature.into(),
                    None => warn!("GSUB feature variation references missing feature {index}"),
                }
            }
        }
        owned.feature_variations = None.into();
        tables.gsub = Some(owned);
    }

    if let Ok(gpos) = font.gpos()
        && let Some(variations) = gpos.feature_variations().transpose()?
    {
        let mut owned: Gpos = gpos.to_owned_table();
        if pins.is_full() {
            for (index, feature) in active_substitutions(&variations, coords)? {
                match owned.feature_list.feature_records.get_mut(index as usize) {
                    Some(record) => record.feature = feature.into(),
                    None => warn!("GPOS feature variation references missing feature {index}"),
                }
            }
        }
        owned.feature_variations = None.into();
        tables.gpos = Some(owned);
    }

    if let Ok(gdef) = font.gdef()
        && matches!(gdef.item_var_store(), Some(Ok(_)))
    {
        let mut owned: Gdef = gdef.to_owned_table();
        owned.item_var_store = None.into();
        tables.gdef = Some(owned);
    }

    Ok(tables)
}

/// Tags the layout rewrite replaces.
pub(crate) const LAYOUT_TAGS: [Tag; 3] = [Tag::new(b"GSUB"), Tag::new(b"GPOS"), Tag::new(b"GDEF")];
