//! Instance building helper.

use std::path::Path;

use anyhow::{Context, Result};
use font_instancer::instantiate_static;
use log::info;

use super::design::{Casual, Style};
use crate::{
    io::{read_font, write_font},
    report::Reporter,
};

/// Recipe for the static instances of one family cut from Recursive.
#[derive(Debug, Clone, Copy)]
pub struct StyleInstances<'a> {
    pub styles: &'a [Style],
    pub mono: f32,
    pub casual: Casual,
    /// Output file prefix, e.g. `WarpnineSans-`.
    pub prefix: &'a str,
}

/// Instantiate every style of `family` from `input` into `output_dir`.
///
/// `transform` post-processes each static font before it is written.
pub fn build_style_instances<F>(
    reporter: &Reporter,
    input: &Path,
    output_dir: &Path,
    family: &StyleInstances,
    transform: F,
) -> Result<usize>
where
    F: Fn(&[u8], &Style) -> Result<Vec<u8>> + Sync,
{
    let data = read_font(input)?;
    let output_of = |style: &Style| output_dir.join(format!("{}{}.ttf", family.prefix, style.name));

    reporter.run_batch_with(&format!("Instantiate {}*", family.prefix), family.styles, output_of, |style| {
        let locations = style.axis_locations(family.mono, family.casual);
        let static_data = instantiate_static(&data, &locations)
            .with_context(|| format!("Failed to instantiate {}", style.name))?;
        let output = output_of(style);
        write_font(&output, transform(&static_data, style)?)?;
        info!("  Created: {}", output.display());
        Ok(())
    })
}
