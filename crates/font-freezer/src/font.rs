//! Feature resolution and the table rewrites that bake substitutions into a font.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, info, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::{cmap::CmapSubtable as ReadSubtable, gsub::Gsub},
    types::{GlyphId16, NameId, Tag},
};
use warpnine_font_gsub::view::read_lookups;
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        cmap::{Cmap, CmapSubtable, EncodingRecord, PlatformId, SequentialMapGroup},
        name::{Name, NameRecord},
        post::Post,
    },
    types::Version16Dot16,
};

use crate::{
    Result,
    error::Error,
    substitutions::GlyphSubstitutions,
    types::{FontReport, FreezeOptions, FreezeResult, FreezeStats, RVRN},
};

/// A parsed font ready for feature freezing.
#[derive(Clone)]
pub struct Font<'a> {
    data: &'a [u8],
    inner: FontRef<'a>,
}

impl std::fmt::Debug for Font<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font").field("data_len", &self.data.len()).finish_non_exhaustive()
    }
}

impl<'a> TryFrom<&'a [u8]> for Font<'a> {
    type Error = Error;

    fn try_from(data: &'a [u8]) -> Result<Self> {
        Self::new(data)
    }
}

impl<'a> Font<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Ok(Self { data, inner: FontRef::new(data)? })
    }

    /// List the font's scripts, languages and GSUB features as
    /// ready-to-use command line arguments.
    pub fn report(&self) -> Result<FontReport> {
        let gsub = self.inner.gsub().map_err(|_| Error::NoGsub)?;
        let script_list = gsub.script_list()?;

        let mut scripts_langs = Vec::new();
        for record in script_list.script_records() {
            let tag = record.script_tag();
            scripts_langs.push(format!("-s '{tag}'"));
            if let Ok(script) = record.script(script_list.offset_data()) {
                scripts_langs.extend(
                    script
                        .lang_sys_records()
                        .iter()
                        .map(|lang| format!("-s '{tag}' -l '{}'", lang.lang_sys_tag())),
                );
            }
        }

        let features: BTreeSet<String> = gsub
            .feature_list()?
            .feature_records()
            .iter()
            .map(|r| r.feature_tag().to_string())
            .collect();

        Ok(FontReport { scripts_langs, features: features.into_iter().collect() })
    }

    pub fn freeze(&self, options: &FreezeOptions) -> Result<FreezeResult> {
        let gsub = self.inner.gsub().map_err(|_| Error::NoGsub)?;

        let lookup_order = resolve_lookups(&gsub, options)?;
        if lookup_order.is_empty() {
            return Err(Error::NoMatchingFeatures(options.features.clone()));
        }
        debug!("Freezing lookups {lookup_order:?}");

        let lookups = read_lookups(&gsub)?;
        let mut subs = GlyphSubstitutions::new();
        for view in lookup_order.iter().filter_map(|&i| lookups.get(i as usize)) {
            subs.add_lookup(view);
        }
        if subs.is_empty() {
            return Err(Error::NoSubstitutions(options.features.clone()));
        }

        let (warnings, remapped_names) = if options.suffix.is_enabled() || options.warnings {
            GlyphInfo::from_font(&self.inner).analyze(&subs)
        } else {
            Default::default()
        };
        for warning in &warnings {
            warn!("{warning}");
        }

        let (mut data, codepoints_remapped) = remap_cmap(&self.inner, &subs)?;
        if options.wants_name_edits() {
            data = rename(&FontRef::new(&data)?, options)?;
        }
        if options.zapnames {
            data = zap_glyph_names(&FontRef::new(&data)?)?;
        }

        let stats = FreezeStats {
            features_requested: options.features.len(),
            lookups_processed: lookup_order.len(),
            substitutions_applied: subs.len(),
            codepoints_remapped,
        };
        info!("{stats}");
        Ok(FreezeResult { data, stats, warnings, remapped_names })
    }

    pub fn data(&self) -> &[u8] {
        self.data
    }
}

/// Lookup indices reachable from the requested features, `rvrn` lookups
/// first, the rest in lookup-list order.
fn resolve_lookups(gsub: &Gsub, options: &FreezeOptions) -> Result<Vec<u16>> {
    let allowed = allowed_feature_indices(gsub, options)?;
    let wanted = options.resolution_order();
    let rvrn = Tag::new_checked(RVRN.as_bytes()).ok();
    let feature_list = gsub.feature_list()?;

    let (mut first, mut rest) = (BTreeSet::new(), BTreeSet::new());
    for (i, record) in feature_list.feature_records().iter().enumerate() {
        let tag = record.feature_tag();
        if !wanted.contains(&tag) || allowed.as_ref().is_some_and(|a| !a.contains(&(i as u16))) {
            continue;
        }
        let feature = record.feature(feature_list.offset_data())?;
        let indices = feature.lookup_list_indices().iter().map(|i| i.get());
        if Some(tag) == rvrn { first.extend(indices) } else { rest.extend(indices) }
    }

    let tail: Vec<u16> = rest.difference(&first).copied().collect();
    Ok(first.into_iter().chain(tail).collect())
}

/// Feature indices registered for the filtered script/language, or `None`
/// when no filter is set.
fn allowed_feature_indices(gsub: &Gsub, options: &FreezeOptions) -> Result<Option<HashSet<u16>>> {
    let filter = &options.filter;
    if !filter.is_active() {
        return Ok(None);
    }

    let script_list = gsub.script_list()?;
    let mut indices = HashSet::new();
    for record in script_list.script_records() {
        if !filter.matches_script(record.script_tag()) {
            continue;
        }
        let script = record.script(script_list.offset_data())?;
        if filter.lang.is_some() {
            for lang in script.lang_sys_records() {
                if filter.matches_lang(lang.lang_sys_tag()) {
                    let lang_sys = lang.lang_sys(script.offset_data())?;
                    indices.extend(lang_sys.feature_indices().iter().map(|i| i.get()));
                }
            }
        } else if let Some(lang_sys) = script.default_lang_sys().transpose()? {
            indices.extend(lang_sys.feature_indices().iter().map(|i| i.get()));
        }
    }
    Ok(Some(indices))
}

struct GlyphInfo {
    names: HashMap<u16, String>,
    has_unicode: HashSet<u16>,
}

impl GlyphInfo {
    fn from_font(font: &FontRef) -> Self {
        let names = font
            .post()
            .ok()
            .zip(font.maxp().ok())
            .map(|(post, maxp)| {
                (0..maxp.num_glyphs())
                    .filter_map(|gid| {
                        post.glyph_name(GlyphId16::new(gid)).map(|n| (gid, n.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let has_unicode = font
            .cmap()
            .ok()
            .map(|cmap| {
                cmap.encoding_records()
                    .iter()
                    .filter_map(|r| r.subtable(cmap.offset_data()).ok())
                    .flat_map(|st| st.iter().map(|(_, gid)| gid.to_u32() as u16).collect::<Vec<_>>())
                    .collect()
            })
            .unwrap_or_default();

        Self { names, has_unicode }
    }

    fn name(&self, gid: u16) -> String {
        self.names.get(&gid).cloned().unwrap_or_else(|| format!("gid{gid}"))
    }

    /// Warnings for substitutions cmap cannot express, plus the names of the
    /// glyphs that become reachable.
    fn analyze(&self, subs: &GlyphSubstitutions) -> (Vec<String>, Vec<String>) {
        let (mut warnings, mut names) = (Vec::new(), Vec::new());
        for (from, to) in subs.iter().filter(|(f, t)| f != t) {
            if self.has_unicode.contains(&from) || self.has_unicode.contains(&to) {
                names.push(self.name(to));
            } else {
                warnings.push(format!(
                    "Cannot remap '{}' -> '{}' because neither has a Unicode value assigned in any of the cmap tables.",
                    self.name(from),
                    self.name(to)
                ));
            }
        }
        (warnings, names)
    }
}

/// Point every codepoint at its substituted glyph. Mapping subtables are
/// rebuilt as format 12; variation-sequence subtables are carried over.
fn remap_cmap(font: &FontRef, subs: &GlyphSubstitutions) -> Result<(Vec<u8>, usize)> {
    let cmap = font.cmap().map_err(|_| Error::NoCmap)?;
    let mut remapped = BTreeSet::new();
    let mut records = Vec::new();

    for record in cmap.encoding_records() {
        let subtable = record.subtable(cmap.offset_data())?;
        let platform = PlatformId::new(record.platform_id() as u16);
        if let ReadSubtable::Format14(_) = subtable {
            let owned: CmapSubtable = subtable.to_owned_table();
            records.push(EncodingRecord::new(platform, record.encoding_id(), owned));
            continue;
        }

        let mut mappings: Vec<(u32, u16)> = subtable
            .iter()
            .map(|(cp, gid)| {
                let old = gid.to_u32() as u16;
                let new = subs.remap(old);
                if new != old {
                    remapped.insert(cp);
                }
                (cp, new)
            })
            .collect();
        mappings.sort_by_key(|&(cp, _)| cp);
        mappings.dedup_by_key(|&mut (cp, _)| cp);

        records.push(EncodingRecord::new(
            platform,
            record.encoding_id(),
            CmapSubtable::format_12(0, sequential_groups(&mappings)),
        ));
    }

    let data = rebuild(font, |builder| builder.add_table(&Cmap::new(records)).map(drop))?;
    Ok((data, remapped.len()))
}

fn sequential_groups(mappings: &[(u32, u16)]) -> Vec<SequentialMapGroup> {
    let mut groups: Vec<SequentialMapGroup> = Vec::with_capacity(mappings.len());
    for &(cp, gid) in mappings {
        let gid = gid as u32;
        if let Some(last) = groups.last_mut()
            && cp == last.end_char_code + 1
            && gid == last.start_glyph_id + (cp - last.start_char_code)
        {
            last.end_char_code = cp;
            continue;
        }
        groups.push(SequentialMapGroup {
            start_char_code: cp,
            end_char_code: cp,
            start_glyph_id: gid,
        });
    }
    groups
}

/// Apply the suffix and `replacenames` pairs to the family names and record
/// the frozen features in the unique ID (and version string with `info`).
fn rename(font: &FontRef, options: &FreezeOptions) -> Result<Vec<u8>> {
    let name = font.name()?;
    let string_data = name.string_data();
    let family_old = name
        .name_record()
        .iter()
        .filter(|r| {
            r.name_id() == NameId::TYPOGRAPHIC_FAMILY_NAME || r.name_id() == NameId::FAMILY_NAME
        })
        .find_map(|r| r.string(string_data).ok().map(|s| s.to_string()))
        .unwrap_or_else(|| "UnknownFamily".to_string());

    let mut family = family_old.clone();
    if let Some(replacements) = &options.replacenames {
        for (from, to) in replacements.split(',').filter_map(|s| s.split_once('/')) {
            family = family.replace(from, to);
        }
    }
    let family_new = format!("{family}{}", options.suffix_string());
    let (ps_old, ps_new) = (family_old.replace(' ', ""), family_new.replace(' ', ""));
    let features = options.features.join(",");
    info!("Renaming family '{family_old}' to '{family_new}'");

    let records = name
        .name_record()
        .iter()
        .map(|r| {
            let old = r.string(string_data).map(|s| s.to_string()).unwrap_or_default();
            let new = match r.name_id().to_u16() {
                1 | 4 | 16 | 18 | 21 => old.replace(&family_old, &family_new),
                3 => format!("{old};featfreeze:{features}"),
                5 if options.info => format!("{old}; featfreeze: {features}"),
                6 | 20 => old.replace(&ps_old, &ps_new),
                _ => old,
            };
            NameRecord::new(r.platform_id(), r.encoding_id(), r.language_id(), r.name_id(), new.into())
        })
        .collect();

    rebuild(font, |builder| builder.add_table(&Name::new(records)).map(drop))
}

fn zap_glyph_names(font: &FontRef) -> Result<Vec<u8>> {
    let post = font.post()?;
    let mut zapped = Post::new(
        post.italic_angle(),
        post.underline_position(),
        post.underline_thickness(),
        post.is_fixed_pitch(),
        post.min_mem_type42(),
        post.max_mem_type42(),
        post.min_mem_type1(),
        post.max_mem_type1(),
    );
    zapped.version = Version16Dot16::VERSION_3_0;
    rebuild(font, |builder| builder.add_table(&zapped).map(drop))
}

fn rebuild(
    font: &FontRef,
    add: impl FnOnce(&mut FontBuilder) -> std::result::Result<(), write_fonts::BuilderError>,
) -> Result<Vec<u8>> {
    let mut builder = FontBuilder::new();
    for record in font.table_directory.table_records() {
        if let Some(data) = font.table_data(record.tag()) {
            builder.add_raw(record.tag(), data);
        }
    }
    add(&mut builder)?;
    Ok(builder.build())
}
