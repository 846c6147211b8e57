//! Font subsetting with HarfBuzz.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use warpnine_font_subsetter::Subsetter;

use crate::io::{file_name, read_font, write_font};

/// Subset the font at `input` into `output` using `subsetter`.
pub fn subset_file(subsetter: &Subsetter, input: &Path, output: &Path) -> Result<()> {
    let data = read_font(input)?;
    let subset_data = subsetter
        .subset(&data)
        .with_context(|| format!("Failed to subset {}", input.display()))?;
    write_font(output, &subset_data)?;

    let input_size = data.len() as f64 / 1024.0 / 1024.0;
    let output_size = subset_data.len() as f64 / 1024.0 / 1024.0;
    info!(
        "Subset {} -> {} ({input_size:.2} MB -> {output_size:.2} MB, {:.1}% reduction)",
        file_name(input)?,
        file_name(output)?,
        (1.0 - output_size / input_size) * 100.0
    );
    Ok(())
}

/// Subset to the Japanese Unicode ranges.
pub fn subset_japanese(input: &Path, output: &Path) -> Result<()> {
    subset_file(&Subsetter::japanese(), input, output)
}
