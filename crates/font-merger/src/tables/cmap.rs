//! cmap table merging

use std::collections::BTreeMap;

use log::debug;
use read_fonts::{
    TableProvider,
    tables::cmap::{Cmap as ReadCmap, CmapSubtable, PlatformId},
};
use write_fonts::tables::cmap::{
    Cmap, CmapSubtable as WriteCmapSubtable, EncodingRecord, PlatformId as WritePlatformId,
    SequentialMapGroup,
};

use crate::{Result, context::MergeContext};

/// Union the Unicode mappings of every font. The first font to map a
/// codepoint keeps it.
///
/// The result has one format 12 subtable shared by the (0, 4) and (3, 10)
/// encodings, which avoids format 4 overflow with large character sets.
pub fn merge_cmap(ctx: &MergeContext) -> Result<Cmap> {
    let mut mappings: BTreeMap<u32, u16> = BTreeMap::new();

    for (index, font, remap) in ctx.fonts_with_remap() {
        let cmap = font.cmap()?;
        let Some(subtable) = best_subtable(&cmap) else {
            debug!("{index}: no Unicode cmap subtable");
            continue;
        };
        let mut taken = 0usize;
        for (codepoint, gid) in subtable.iter() {
            let Some(new_gid) = remap.get_u16(gid.to_u32() as u16) else {
                continue;
            };
            if new_gid != 0 && !mappings.contains_key(&codepoint) {
                mappings.insert(codepoint, new_gid);
                taken += 1;
            }
        }
        debug!("{index}: {taken} codepoints added");
    }

    let groups = sequential_groups(&mappings);
    let subtable = WriteCmapSubtable::format_12(0, groups);
    Ok(Cmap::new(vec![
        EncodingRecord::new(WritePlatformId::Unicode, 4, subtable.clone()),
        EncodingRecord::new(WritePlatformId::Windows, 10, subtable),
    ]))
}

/// Consecutive codepoints mapped to consecutive glyphs share a group.
fn sequential_groups(mappings: &BTreeMap<u32, u16>) -> Vec<SequentialMapGroup> {
    let mut groups: Vec<SequentialMapGroup> = Vec::new();
    for (&cp, &gid) in mappings {
        let gid = gid as u32;
        if let Some(last) = groups.last_mut()
            && cp == last.end_char_code + 1
            && gid == last.start_glyph_id + (cp - last.start_char_code)
        {
            last.end_char_code = cp;
            continue;
        }
        groups.push(SequentialMapGroup::new(cp, cp, gid));
    }
    groups
}

/// Full-repertoire format 12 first, then a BMP format 4, then anything.
fn best_subtable<'a>(cmap: &ReadCmap<'a>) -> Option<CmapSubtable<'a>> {
    let subtables: Vec<(PlatformId, u16, CmapSubtable<'a>)> = cmap
        .encoding_records()
        .iter()
        .filter_map(|r| {
            let subtable = r.subtable(cmap.offset_data()).ok()?;
            Some((r.platform_id(), r.encoding_id(), subtable))
        })
        .collect();
    let is_unicode = |platform: PlatformId, encoding: u16| {
        platform == PlatformId::Unicode
            || (platform == PlatformId::Windows && matches!(encoding, 1 | 10))
    };

    let pick = |want: fn(&CmapSubtable) -> bool| {
        subtables
            .iter()
            .find(|(p, e, s)| is_unicode(*p, *e) && want(s))
            .map(|(_, _, s)| s.clone())
    };
    pick(|s| matches!(s, CmapSubtable::Format12(_)))
        .or_else(|| pick(|s| matches!(s, CmapSubtable::Format4(_))))
        .or_else(|| {
            subtables
                .into_iter()
                .find(|(_, _, s)| !matches!(s, CmapSubtable::Format14(_)))
                .map(|(_, _, s)| s)
        })
}
