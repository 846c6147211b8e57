//! Checks run against the finished fonts in the dist directory.
//!
//! Each check collects human-readable problems per font; a font with any
//! problem fails its batch.

use std::path::Path;

use anyhow::{Result, bail};
use log::{info, warn};
use read_fonts::{
    FontRef, TableProvider,
    types::{GlyphId, Tag},
};
use warpnine_font_condense::WIDTH_CLASS_CONDENSED;
use warpnine_font_ops::{glyph_names, name_string};

use crate::{
    BuildContext, Error,
    config::{CONDENSED_FAMILY, Family, MONO_FAMILY, SANS_FAMILY},
    io::FontFile,
};

/// `(tag, min, default, max)` of every axis the WarpnineMono VF exposes.
pub const EXPECTED_AXES: [(Tag, f64, f64, f64); 2] =
    [(Tag::new(b"wght"), 300.0, 400.0, 1000.0), (Tag::new(b"ital"), 0.0, 0.0, 1.0)];

/// Characters whose cmap entry must point at a frozen alternate, with the
/// acceptable glyph names and the feature responsible.
pub const FROZEN_GLYPHS: [(char, &[&str], &str); 11] = [
    ('a', &["a.simple"], "ss01"),
    ('g', &["g.simple"], "ss02"),
    ('f', &["f.simple"], "ss03"),
    ('i', &["i.mono", "i.italic"], "ss04"),
    ('l', &["l.simple"], "ss05"),
    ('r', &["r.simple"], "ss06"),
    ('L', &["L.sans"], "ss08"),
    ('Z', &["Z.sans"], "ss08"),
    ('0', &["zero.dotted_pnum"], "ss10+pnum"),
    ('1', &["one.simple"], "ss11"),
    ('@', &["at.alt"], "ss12"),
];

pub const REQUIRED_TABLES: [Tag; 11] = [
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"hmtx"),
    Tag::new(b"maxp"),
    Tag::new(b"name"),
    Tag::new(b"OS/2"),
    Tag::new(b"post"),
    Tag::new(b"cmap"),
    Tag::new(b"glyf"),
    Tag::new(b"GSUB"),
    Tag::new(b"fvar"),
];

const SAMPLE_CHARS: [char; 4] = ['あ', 'ア', '漢', 'A'];
const CJK_SAMPLES: [char; 4] = ['あ', 'ア', '漢', 'Ａ'];
const CJK_ADVANCE: u16 = 1000;
const COPYRIGHT_PARTS: [&str; 2] =
    ["Copyright 2020 The Recursive Project Authors", "Copyright 2014-2021 Adobe"];

const WIDTH_CLASS_NORMAL: u16 = 5;

/// A group of checks selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Structure, metrics, metadata and tables of the WarpnineMono VF.
    Vf,
    /// Frozen stylistic sets in the VF and static WarpnineMono fonts.
    Frozen,
    /// Width class and family name of the Sans families.
    Sans,
}

impl Check {
    pub const ALL: [Check; 3] = [Check::Vf, Check::Frozen, Check::Sans];
}

/// Run `checks` in order, stopping at the first group that fails.
pub fn validate(ctx: &BuildContext, checks: &[Check]) -> Result<()> {
    for check in checks {
        match check {
            Check::Vf => validate_vf(ctx)?,
            Check::Frozen => validate_frozen(ctx)?,
            Check::Sans => validate_sans(ctx)?,
        }
    }
    Ok(())
}

fn validate_vf(ctx: &BuildContext) -> Result<()> {
    ctx.reporter.banner("Validating WarpnineMono VF");
    let vf = ctx.vf_output();
    if !vf.exists() {
        return Err(Error::InputNotFound(vf).into());
    }
    ctx.reporter.run_batch("Validate VF", &[vf], |path| check_file(path, vf_problems)).map(drop)
}

fn validate_frozen(ctx: &BuildContext) -> Result<()> {
    ctx.reporter.banner("Validating frozen features");
    let vf = ctx.vf_output();
    let mut fonts = ctx.static_mono_fonts()?;
    if vf.exists() {
        fonts.insert(0, vf);
    }
    if fonts.is_empty() {
        bail!("No WarpnineMono fonts found in {}", ctx.dist_dir.display());
    }
    ctx.reporter.run_batch("Validate frozen features", &fonts, |path| {
        check_file(path, frozen_problems)
    })?;
    info!("All {} fonts have correctly frozen features", fonts.len());
    Ok(())
}

fn validate_sans(ctx: &BuildContext) -> Result<()> {
    ctx.reporter.banner("Validating Sans fonts");
    let mut checked = 0;
    for (family, width_class) in
        [(SANS_FAMILY, WIDTH_CLASS_NORMAL), (CONDENSED_FAMILY, WIDTH_CLASS_CONDENSED)]
    {
        let fonts = ctx.dist_fonts(&format!("{}*.ttf", family.file_prefix()))?;
        if fonts.is_empty() {
            warn!("No {} fonts found", family.postscript);
            continue;
        }
        ctx.reporter.run_batch(&format!("Validate {}", family.name), &fonts, |path| {
            check_file(path, |font| sans_problems(font, &family, width_class))
        })?;
        checked += fonts.len();
    }
    if checked == 0 {
        bail!("No Sans fonts found in {}", ctx.dist_dir.display());
    }
    Ok(())
}

fn check_file(path: &Path, problems_of: impl Fn(&FontRef) -> Vec<String>) -> Result<()> {
    let data = FontFile::new(path).read()?;
    let font = FontRef::new(&data)?;
    let problems = problems_of(&font);
    if !problems.is_empty() {
        bail!("{}", problems.join("; "));
    }
    info!("  ✓ {}", path.display());
    Ok(())
}

/// Problems with the assembled WarpnineMono variable font.
pub fn vf_problems(font: &FontRef) -> Vec<String> {
    let mut problems = Vec::new();
    axis_problems(font, &mut problems);
    coverage_problems(font, &mut problems);
    advance_problems(font, &mut problems);
    metadata_problems(font, &mut problems);
    for tag in REQUIRED_TABLES {
        if font.table_data(tag).is_none() {
            problems.push(format!("required table '{tag}' is missing"));
        }
    }
    problems
}

fn axis_problems(font: &FontRef, problems: &mut Vec<String>) {
    let Ok(fvar) = font.fvar() else {
        problems.push("not a variable font: no usable fvar".to_string());
        return;
    };
    let Ok(axes) = fvar.axes() else {
        problems.push("fvar axes are unreadable".to_string());
        return;
    };
    for (tag, min, default, max) in EXPECTED_AXES {
        let Some(axis) = axes.iter().find(|a| a.axis_tag() == tag) else {
            problems.push(format!("missing axis {tag}"));
            continue;
        };
        let actual =
            (axis.min_value().to_f64(), axis.default_value().to_f64(), axis.max_value().to_f64());
        if actual != (min, default, max) {
            problems.push(format!(
                "axis {tag} is {}..{} (default {}), expected {min}..{max} (default {default})",
                actual.0, actual.2, actual.1
            ));
        }
    }
}

fn coverage_problems(font: &FontRef, problems: &mut Vec<String>) {
    let Ok(cmap) = font.cmap() else {
        return;
    };
    for c in SAMPLE_CHARS {
        if cmap.map_codepoint(c).is_none() {
            problems.push(format!("character '{c}' (U+{:04X}) is missing", c as u32));
        }
    }
}

fn advance_problems(font: &FontRef, problems: &mut Vec<String>) {
    let (Ok(cmap), Ok(hmtx)) = (font.cmap(), font.hmtx()) else {
        return;
    };
    let advance = |c: char| cmap.map_codepoint(c).and_then(|gid: GlyphId| hmtx.advance(gid));

    if let Some(expected) = advance(' ') {
        let odd: Vec<String> = (' '..='~')
            .filter_map(|c| advance(c).filter(|&w| w != expected).map(|w| format!("'{c}'={w}")))
            .collect();
        if !odd.is_empty() {
            problems.push(format!(
                "ASCII advances differ from space ({expected}): {}",
                odd.join(", ")
            ));
        }
    }
    for c in CJK_SAMPLES {
        if let Some(width) = advance(c).filter(|&w| w != CJK_ADVANCE) {
            problems.push(format!(
                "CJK U+{:04X} advance is {width}, expected {CJK_ADVANCE}",
                c as u32
            ));
        }
    }
}

fn metadata_problems(font: &FontRef, problems: &mut Vec<String>) {
    match name_string(font, 0) {
        Some(copyright) if COPYRIGHT_PARTS.iter().all(|p| copyright.contains(p)) => {}
        Some(_) => problems.push("copyright notice is incomplete".to_string()),
        None => problems.push("copyright notice not found".to_string()),
    }
    if let Some(family) = typographic_family(font)
        && family != MONO_FAMILY.name
    {
        problems.push(format!("family name is '{family}', expected '{}'", MONO_FAMILY.name));
    }
    if !font.post().is_ok_and(|post| post.is_fixed_pitch() != 0) {
        problems.push("post.isFixedPitch is not set".to_string());
    }
}

fn typographic_family(font: &FontRef) -> Option<String> {
    name_string(font, 16).or_else(|| name_string(font, 1))
}

/// Problems with the stylistic sets frozen into the cmap of a WarpnineMono font.
pub fn frozen_problems(font: &FontRef) -> Vec<String> {
    let (Ok(cmap), Ok(names)) = (font.cmap(), glyph_names(font)) else {
        return vec!["cmap or glyph names are unreadable".to_string()];
    };
    FROZEN_GLYPHS
        .iter()
        .filter_map(|(c, expected, feature)| {
            let actual = cmap
                .map_codepoint(*c)
                .and_then(|gid| names.get(gid.to_u32() as usize))
                .map(String::as_str);
            if actual.is_some_and(|name| expected.contains(&name)) {
                return None;
            }
            Some(format!(
                "'{c}' [{feature}]: expected {}, got {}",
                expected.join(" or "),
                actual.unwrap_or("nothing")
            ))
        })
        .collect()
}

/// Problems with one static font of a Sans family.
pub fn sans_problems(font: &FontRef, family: &Family, width_class: u16) -> Vec<String> {
    let mut problems = Vec::new();
    match font.os2() {
        Ok(os2) if os2.us_width_class() == width_class => {}
        Ok(os2) => problems.push(format!(
            "usWidthClass is {}, expected {width_class}",
            os2.us_width_class()
        )),
        Err(_) => problems.push("OS/2 table is missing".to_string()),
    }
    match typographic_family(font) {
        Some(name) if name == family.name => {}
        name => problems.push(format!(
            "typographic family is {}, expected '{}'",
            name.map_or_else(|| "missing".to_string(), |n| format!("'{n}'")),
            family.name
        )),
    }
    problems
}
