//! GSUB merging
//!
//! Lookups and features of every font are concatenated in font order, with
//! glyph ids remapped and lookup/feature indices shifted by the number of
//! entries contributed by earlier fonts. Scripts and language systems are
//! unioned; a language system present in several fonts lists the features
//! of all of them. The FeatureList is written in tag order, keeping each
//! feature's params, and language systems are renumbered to match.
//!
//! GPOS and GDEF are not merged: they are copied from the base font, whose
//! glyph ids the merge preserves.

use std::collections::BTreeMap;

use log::debug;
use read_fonts::{
    TableProvider,
    tables::{gsub::Gsub as ReadGsub, layout::LangSys as ReadLangSys},
    types::Tag,
};
use warpnine_font_gsub::view::{LookupView, read_lookups, write_lookup_list};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        gsub::Gsub,
        layout::{
            Feature, FeatureList, FeatureRecord, LangSys, LangSysRecord, Script, ScriptList,
            ScriptRecord,
        },
    },
};

use crate::{Result, context::MergeContext};

const NO_REQUIRED_FEATURE: u16 = 0xFFFF;

/// Feature indices of one language system, deduplicated in insertion order.
#[derive(Debug, Default)]
struct LangSysEntry {
    required: Option<u16>,
    features: Vec<u16>,
}

impl LangSysEntry {
    fn extend(&mut self, read: &ReadLangSys, feature_offset: u16) {
        let required = read.required_feature_index();
        if self.required.is_none() && required != NO_REQUIRED_FEATURE {
            self.required = Some(required + feature_offset);
        }
        for index in read.feature_indices() {
            let index = index.get() + feature_offset;
            if !self.features.contains(&index) {
                self.features.push(index);
            }
        }
    }

    /// Write the language system with feature indices mapped through `order`.
    /// Indices past the end of the FeatureList are dropped.
    fn to_write(&self, order: &[u16]) -> LangSys {
        let renumber = |i: u16| order.get(usize::from(i)).copied();
        let mut features: Vec<u16> = self.features.iter().filter_map(|&i| renumber(i)).collect();
        features.sort_unstable();
        let mut lang_sys = LangSys::new(features);
        lang_sys.required_feature_index =
            self.required.and_then(renumber).unwrap_or(NO_REQUIRED_FEATURE);
        lang_sys
    }
}

#[derive(Debug, Default)]
struct ScriptEntry {
    default: Option<LangSysEntry>,
    languages: BTreeMap<Tag, LangSysEntry>,
}

#[derive(Debug, Default)]
struct LayoutAccumulator {
    lookups: Vec<LookupView>,
    features: Vec<(Tag, Feature)>,
    scripts: BTreeMap<Tag, ScriptEntry>,
}

impl LayoutAccumulator {
    fn add(&mut self, gsub: &ReadGsub, remap: impl Fn(u16) -> Option<u16>) -> Result<()> {
        let lookup_offset = self.lookups.len() as u16;
        let feature_offset = self.features.len() as u16;

        for mut lookup in read_lookups(gsub)? {
            lookup.remap_glyphs(&remap);
            lookup.offset_lookups(lookup_offset);
            self.lookups.push(lookup);
        }

        let feature_list = gsub.feature_list()?;
        for record in feature_list.feature_records() {
            let mut feature: Feature =
                record.feature(feature_list.offset_data())?.to_owned_table();
            for index in &mut feature.lookup_list_indices {
                *index += lookup_offset;
            }
            self.features.push((record.feature_tag(), feature));
        }

        let script_list = gsub.script_list()?;
        for record in script_list.script_records() {
            let script = record.script(script_list.offset_data())?;
            let entry = self.scripts.entry(record.script_tag()).or_default();
            if let Some(default) = script.default_lang_sys().transpose()? {
                entry.default.get_or_insert_with(Default::default).extend(&default, feature_offset);
            }
            for lang_record in script.lang_sys_records() {
                let lang_sys = lang_record.lang_sys(script.offset_data())?;
                entry
                    .languages
                    .entry(lang_record.lang_sys_tag())
                    .or_default()
                    .extend(&lang_sys, feature_offset);
            }
        }
        Ok(())
    }

    fn build(self) -> Gsub {
        // Stable, so equal tags keep font order
        let mut sorted: Vec<usize> = (0..self.features.len()).collect();
        sorted.sort_by_key(|&i| self.features[i].0);
        let mut order = vec![0u16; self.features.len()];
        for (new, &old) in sorted.iter().enumerate() {
            order[old] = new as u16;
        }

        let scripts = self
            .scripts
            .into_iter()
            .map(|(tag, entry)| {
                let languages = entry
                    .languages
                    .iter()
                    .map(|(lang, ls)| LangSysRecord::new(*lang, ls.to_write(&order)))
                    .collect();
                let default = entry.default.as_ref().map(|ls| ls.to_write(&order));
                ScriptRecord::new(tag, Script::new(default, languages))
            })
            .collect();

        let mut slots: Vec<Option<(Tag, Feature)>> = self.features.into_iter().map(Some).collect();
        let features = sorted
            .iter()
            .filter_map(|&i| slots[i].take())
            .map(|(tag, feature)| FeatureRecord::new(tag, feature))
            .collect();
        Gsub::new(
            ScriptList::new(scripts),
            FeatureList::new(features),
            write_lookup_list(&self.lookups),
        )
    }
}

/// Merge the GSUB tables of every font. `None` when no font has one.
pub fn merge_gsub(ctx: &MergeContext) -> Result<Option<Gsub>> {
    let mut acc = LayoutAccumulator::default();
    let mut contributors = 0;
    for (index, font, remap) in ctx.fonts_with_remap() {
        let Ok(gsub) = font.gsub() else {
            continue;
        };
        acc.add(&gsub, |gid| remap.get_u16(gid))?;
        contributors += 1;
        debug!("{index}: GSUB merged, {} lookups so far", acc.lookups.len());
    }
    if contributors == 0 {
        return Ok(None);
    }
    Ok(Some(acc.build()))
}
