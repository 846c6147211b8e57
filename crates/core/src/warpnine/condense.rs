//! Warpnine Sans Condensed: Warpnine Sans scaled horizontally.

use std::path::Path;

use anyhow::Result;
use log::info;
use warpnine_font_condense::{WIDTH_CLASS_CONDENSED, apply_horizontal_scale};
use warpnine_font_metadata::FontNaming;

use crate::{
    config::CONDENSED_FAMILY,
    report::Reporter,
    styles::{Casual, SANS_STYLES, Style, StyleInstances, build_style_instances},
};

/// Scale and name one static style.
pub fn condense_style(data: &[u8], style: &Style, scale: f64) -> Result<Vec<u8>> {
    let scaled = apply_horizontal_scale(
        data,
        scale,
        Some(WIDTH_CLASS_CONDENSED),
        Some(style.weight.class()),
    )?;
    FontNaming::new(CONDENSED_FAMILY.name, style.display_name())
        .postscript_family(CONDENSED_FAMILY.postscript)
        .copyright_extra(CONDENSED_FAMILY.copyright_extra)
        .apply(&scaled)
}

pub fn create_condensed(
    reporter: &Reporter,
    input: &Path,
    output_dir: &Path,
    scale: f64,
) -> Result<usize> {
    info!("Applying {:.0}% horizontal scale", scale * 100.0);
    let prefix = CONDENSED_FAMILY.file_prefix();
    let family = StyleInstances { styles: SANS_STYLES, mono: 0.0, casual: Casual::Fixed(0.0), prefix: &prefix };

    let count = build_style_instances(reporter, input, output_dir, &family, |data, style| {
        condense_style(data, style, scale)
    })?;
    info!("Created {count} condensed fonts in {}/", output_dir.display());
    Ok(count)
}
