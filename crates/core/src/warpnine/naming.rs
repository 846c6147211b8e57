//! Family and style naming of output fonts.

use std::path::Path;

use anyhow::Result;
use log::info;
use warpnine_font_metadata::FontNaming;

use crate::{
    config::Family,
    io::{file_name, glob_fonts, transform_font_in_place},
    report::Reporter,
};

pub fn set_name(path: &Path, naming: &FontNaming) -> Result<()> {
    transform_font_in_place(path, |data| naming.apply(data))?;
    info!(
        "{}: set name to '{}' ({})",
        file_name(path)?,
        naming.full_name(),
        naming.postscript_name()
    );
    Ok(())
}

/// Names for the static font at `path`, whose stem is `{prefix}{Style}`.
pub fn family_naming(family: &Family, path: &Path) -> FontNaming {
    let prefix = family.file_prefix();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let style = stem.strip_prefix(prefix.as_str()).unwrap_or(stem);

    FontNaming::new(family.name, style_display_name(style))
        .postscript_family(family.postscript)
        .copyright_extra(family.copyright_extra)
}

/// `"SemiBoldItalic"` becomes `"SemiBold Italic"`.
fn style_display_name(style: &str) -> String {
    match style.strip_suffix("Italic") {
        Some(base) if !base.is_empty() && !base.ends_with(' ') => format!("{base} Italic"),
        _ => style.to_string(),
    }
}

/// Name every `{prefix}*.ttf` font of `family` in `dir`.
///
/// Returns the number of fonts renamed; none matching is not an error.
pub fn set_names_for_family(reporter: &Reporter, dir: &Path, family: &Family) -> Result<usize> {
    let pattern = format!("{}*.ttf", family.file_prefix());
    let fonts = glob_fonts(dir, &pattern)?;
    if fonts.is_empty() {
        return Ok(0);
    }

    info!("  Setting names for {} fonts ({pattern})...", fonts.len());
    reporter.run_batch(&format!("Set names ({pattern})"), &fonts, |path| {
        set_name(path, &family_naming(family, path))
    })
}
