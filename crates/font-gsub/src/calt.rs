//! Registration of `calt` and `rclt` in every script and language system.
//!
//! Merged fonts can carry scripts (for example `kana` or `hani` from a CJK
//! donor) whose language systems do not list the Latin font's contextual
//! alternates, so the features silently stop applying in mixed text.

use log::debug;
use read_fonts::{
    FontRef, TableProvider,
    tables::{
        gsub::{FeatureList as ReadFeatureList, ScriptList as ReadScriptList},
        layout::LangSys as ReadLangSys,
    },
    types::Tag,
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        gsub::Gsub,
        layout::{LangSys, LangSysRecord, Script, ScriptList, ScriptRecord},
    },
};

use crate::{Result, rebuild_font};

const CALT: Tag = Tag::new(b"calt");
const RCLT: Tag = Tag::new(b"rclt");

/// Result of [`register_calt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaltRegistration {
    NoGsub,
    NoCalt,
    AlreadyRegistered,
    Registered { lang_systems: usize, data: Vec<u8> },
}

/// Make every language system reference the font's `calt` and `rclt` features.
///
/// `calt` goes to position 1 when a language system already lists more than
/// one feature and is appended otherwise; `rclt` is always appended. Indices
/// already present are left alone, so the operation is idempotent.
pub fn register_calt(data: &[u8]) -> Result<CaltRegistration> {
    let font = FontRef::new(data)?;
    let Ok(gsub) = font.gsub() else {
        return Ok(CaltRegistration::NoGsub);
    };
    let (calt, rclt) = feature_indices(&gsub.feature_list()?);
    if calt.is_empty() {
        return Ok(CaltRegistration::NoCalt);
    }

    let (script_list, lang_systems) = rebuild_script_list(&gsub.script_list()?, &calt, &rclt)?;
    if lang_systems == 0 {
        return Ok(CaltRegistration::AlreadyRegistered);
    }

    let mut owned: Gsub = gsub.to_owned_table();
    owned.script_list = script_list.into();
    let data = rebuild_font(&font, &[], |builder| {
        builder.add_table(&owned)?;
        Ok(())
    })?;
    Ok(CaltRegistration::Registered { lang_systems, data })
}

fn feature_indices(feature_list: &ReadFeatureList) -> (Vec<u16>, Vec<u16>) {
    let mut calt = Vec::new();
    let mut rclt = Vec::new();
    for (i, record) in feature_list.feature_records().iter().enumerate() {
        let tag = record.feature_tag();
        if tag == CALT {
            calt.push(i as u16);
        } else if tag == RCLT {
            rclt.push(i as u16);
        }
    }
    (calt, rclt)
}

/// Insert missing `calt`/`rclt` indices. Returns `true` when anything changed.
pub(crate) fn register_indices(indices: &mut Vec<u16>, calt: &[u16], rclt: &[u16]) -> bool {
    let mut modified = false;
    for &idx in calt {
        if !indices.contains(&idx) {
            let pos = if indices.len() > 1 { 1 } else { indices.len() };
            indices.insert(pos, idx);
            modified = true;
        }
    }
    for &idx in rclt {
        if !indices.contains(&idx) {
            indices.push(idx);
            modified = true;
        }
    }
    modified
}

fn lang_sys(read: &ReadLangSys, calt: &[u16], rclt: &[u16], modified: &mut usize) -> LangSys {
    let mut indices: Vec<u16> = read.feature_indices().iter().map(|i| i.get()).collect();
    if register_indices(&mut indices, calt, rclt) {
        *modified += 1;
    }
    let mut out = LangSys::new(indices);
    out.required_feature_index = read.required_feature_index();
    out
}

fn rebuild_script_list(
    script_list: &ReadScriptList,
    calt: &[u16],
    rclt: &[u16],
) -> Result<(ScriptList, usize)> {
    let mut modified = 0;
    let mut records = Vec::new();
    for record in script_list.script_records() {
        let script = record.script(script_list.offset_data())?;
        let default = script
            .default_lang_sys()
            .transpose()?
            .map(|ls| lang_sys(&ls, calt, rclt, &mut modified));

        let mut lang_records = Vec::new();
        for lang_record in script.lang_sys_records() {
            let ls = lang_record.lang_sys(script.offset_data())?;
            lang_records.push(LangSysRecord::new(
                lang_record.lang_sys_tag(),
                lang_sys(&ls, calt, rclt, &mut modified),
            ));
        }
        debug!("Script '{}' checked for calt/rclt", record.script_tag());
        records.push(ScriptRecord::new(record.script_tag(), Script::new(default, lang_records)));
    }
    Ok((ScriptList::new(records), modified))
}
