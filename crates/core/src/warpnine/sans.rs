//! Warpnine Sans: proportional, linear static cuts of Recursive.

use std::path::Path;

use anyhow::Result;
use log::info;
use warpnine_font_metadata::FontNaming;

use crate::{
    config::SANS_FAMILY,
    report::Reporter,
    styles::{Casual, SANS_STYLES, Style, StyleInstances, build_style_instances},
};

fn sans_naming(style: &Style) -> FontNaming {
    FontNaming::new(SANS_FAMILY.name, style.display_name())
        .postscript_family(SANS_FAMILY.postscript)
        .copyright_extra(SANS_FAMILY.copyright_extra)
}

pub fn create_sans(reporter: &Reporter, input: &Path, output_dir: &Path) -> Result<usize> {
    let prefix = SANS_FAMILY.file_prefix();
    let family = StyleInstances { styles: SANS_STYLES, mono: 0.0, casual: Casual::Fixed(0.0), prefix: &prefix };

    let count = build_style_instances(reporter, input, output_dir, &family, |data, style| {
        sans_naming(style).apply(data)
    })?;
    info!("Created {count} sans fonts in {}/", output_dir.display());
    Ok(count)
}
