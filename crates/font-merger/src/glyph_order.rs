//! Merged glyph order
//!
//! Glyph names are the merge key. The base font keeps its glyph ids. Every
//! glyph of a later font either lands on an existing glyph with the same
//! name and outline, or is appended; when its name is already taken by a
//! different outline it is renamed to `name.N` (or rejected, depending on the
//! [`CollisionPolicy`]).

use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
};

use indexmap::IndexMap;
use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{Anchor, Glyph},
    types::{GlyphId as ReadGlyphId, GlyphId16},
};

use crate::{
    MergeError, Result,
    options::CollisionPolicy,
    types::{FontIndex, GlyphId, MegaGlyphId},
};

/// A glyph name in the merged font
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphName(String);

impl GlyphName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for GlyphName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// A glyph that was appended under a new name because its own name was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    pub font: FontIndex,
    pub from: String,
    pub to: String,
}

/// Unified glyph ordering across all fonts being merged
#[derive(Debug, Clone)]
pub struct GlyphOrder {
    mega: Vec<GlyphName>,
    /// Font and source glyph each merged glyph is taken from.
    origins: Vec<(FontIndex, GlyphId)>,
    per_font: Vec<IndexMap<GlyphId, GlyphName>>,
    name_to_mega: HashMap<GlyphName, MegaGlyphId>,
    renamed: Vec<Renamed>,
    deduplicated: usize,
}

impl GlyphOrder {
    /// Compute the merged glyph order of `fonts`, the first being the base.
    pub fn compute(fonts: &[FontRef], policy: CollisionPolicy) -> Result<Self> {
        let names: Vec<Vec<GlyphName>> = fonts.iter().map(glyph_names).collect();
        let mut order = Self {
            mega: Vec::new(),
            origins: Vec::new(),
            per_font: Vec::with_capacity(fonts.len()),
            name_to_mega: HashMap::new(),
            renamed: Vec::new(),
            deduplicated: 0,
        };

        for (i, font) in fonts.iter().enumerate() {
            let index = FontIndex(i);
            let mut mapping = IndexMap::new();

            for (gid, name) in names[i].iter().enumerate() {
                let gid = GlyphId::new(gid as u16);
                let Some(&existing) = order.name_to_mega.get(name) else {
                    order.push(name.clone(), index, gid);
                    mapping.insert(gid, name.clone());
                    continue;
                };

                let (origin_font, origin_gid) = order.origins[existing.to_u16() as usize];
                let cross_font = origin_font != index;
                if cross_font && !index.is_base() {
                    let theirs = outline_key(&fonts[origin_font.0], &names[origin_font.0], origin_gid);
                    if theirs == outline_key(font, &names[i], gid) {
                        debug!("{index}: '{name}' is identical to {existing}");
                        order.deduplicated += 1;
                        mapping.insert(gid, name.clone());
                        continue;
                    }
                }
                if cross_font && policy == CollisionPolicy::Error {
                    return Err(MergeError::GlyphNameCollision { name: name.to_string(), font: i });
                }

                let renamed = order.free_name(name);
                warn!("{index}: glyph '{name}' collides with a different glyph, renamed to '{renamed}'");
                order.renamed.push(Renamed {
                    font: index,
                    from: name.to_string(),
                    to: renamed.to_string(),
                });
                order.push(renamed.clone(), index, gid);
                mapping.insert(gid, renamed);
            }

            order.per_font.push(mapping);
        }

        if order.mega.len() > u16::MAX as usize {
            return Err(MergeError::TooManyGlyphs(order.mega.len()));
        }
        Ok(order)
    }

    fn push(&mut self, name: GlyphName, font: FontIndex, gid: GlyphId) {
        let id = MegaGlyphId::new(self.mega.len() as u16);
        self.name_to_mega.insert(name.clone(), id);
        self.mega.push(name);
        self.origins.push((font, gid));
    }

    /// `name.N` with the first `N` not yet in use.
    fn free_name(&self, name: &GlyphName) -> GlyphName {
        (1..)
            .map(|n| GlyphName::new(format!("{name}.{n}")))
            .find(|candidate| !self.name_to_mega.contains_key(candidate))
            .unwrap_or_else(|| name.clone())
    }

    /// Get the mega glyph order (all unique names)
    pub fn mega(&self) -> &[GlyphName] {
        &self.mega
    }

    pub fn total_glyphs(&self) -> u16 {
        self.mega.len() as u16
    }

    /// Font and source glyph id of every merged glyph, in merged order.
    pub fn origins(&self) -> &[(FontIndex, GlyphId)] {
        &self.origins
    }

    /// Source glyph id to merged name for one font.
    pub fn font_mapping(&self, font: usize) -> &IndexMap<GlyphId, GlyphName> {
        &self.per_font[font]
    }

    pub fn mega_id(&self, name: &str) -> Option<MegaGlyphId> {
        self.name_to_mega.get(name).copied()
    }

    pub fn renamed(&self) -> &[Renamed] {
        &self.renamed
    }

    /// Number of later-font glyphs folded onto an identical existing glyph.
    pub fn deduplicated(&self) -> usize {
        self.deduplicated
    }
}

/// Glyph names from `post`, with `glyphNNNNN` for glyphs it does not name.
fn glyph_names(font: &FontRef) -> Vec<GlyphName> {
    let num_glyphs = font.maxp().map(|m| m.num_glyphs()).unwrap_or_default();
    let post = font.post().ok();
    (0..num_glyphs)
        .map(|gid| {
            let name = post
                .as_ref()
                .and_then(|p| p.glyph_name(GlyphId16::new(gid)).map(|s| s.to_string()))
                .unwrap_or_else(|| format!("glyph{gid:05}"));
            GlyphName::new(name)
        })
        .collect()
}

/// Outline data two same-named glyphs must share to count as one glyph.
/// Components are compared by name since their ids differ between fonts.
#[derive(Debug, PartialEq, Eq)]
enum OutlineKey {
    Missing,
    Empty,
    Simple { end_points: Vec<u16>, points: Vec<(i16, i16, bool)> },
    Composite(Vec<(Option<String>, (bool, i32, i32), [i16; 4])>),
}

fn outline_key(font: &FontRef, names: &[GlyphName], gid: GlyphId) -> OutlineKey {
    let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) else {
        return OutlineKey::Missing;
    };
    match loca.get_glyf(ReadGlyphId::new(gid.to_u32()), &glyf) {
        Ok(None) => OutlineKey::Empty,
        Ok(Some(Glyph::Simple(simple))) => OutlineKey::Simple {
            end_points: simple.end_pts_of_contours().iter().map(|e| e.get()).collect(),
            points: simple.points().map(|p| (p.x, p.y, p.on_curve)).collect(),
        },
        Ok(Some(Glyph::Composite(composite))) => OutlineKey::Composite(
            composite
                .components()
                .map(|c| {
                    let name = names.get(c.glyph.to_u16() as usize).map(|n| n.to_string());
                    let t = c.transform;
                    let transform =
                        [t.xx.to_bits(), t.yx.to_bits(), t.xy.to_bits(), t.yy.to_bits()];
                    let anchor = match c.anchor {
                        Anchor::Offset { x, y } => (true, i32::from(x), i32::from(y)),
                        Anchor::Point { base, component } => {
                            (false, i32::from(base), i32::from(component))
                        }
                    };
                    (name, anchor, transform)
                })
                .collect(),
        ),
        Err(_) => OutlineKey::Missing,
    }
}
