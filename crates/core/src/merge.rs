//! Font merging operations.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use warpnine_font_merger::{Merger, Options};

use crate::{
    io::{file_name, read_font, write_font},
    report::Reporter,
};

#[derive(Default)]
pub struct FontMerger {
    fonts: Vec<Vec<u8>>,
    options: Options,
}

impl FontMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn add_font(&mut self, data: Vec<u8>) -> &mut Self {
        self.fonts.push(data);
        self
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let data = read_font(path.as_ref())?;
        self.fonts.push(data);
        Ok(self)
    }

    /// Merge the fonts in the order they were added; the first is the base.
    pub fn merge(&self) -> Result<Vec<u8>> {
        let font_refs: Vec<&[u8]> = self.fonts.iter().map(Vec::as_slice).collect();
        Merger::new(self.options.clone()).merge(&font_refs).context("Failed to merge fonts")
    }

    pub fn merge_to_file(&self, output: &Path) -> Result<()> {
        let merged_data = self.merge()?;
        write_font(output, &merged_data)?;

        let output_size = merged_data.len() as f64 / 1024.0 / 1024.0;
        info!("Merged font: {} ({output_size:.2} MB)", output.display());
        Ok(())
    }
}

/// Merges many base fonts with one shared fallback.
pub struct BatchMerger {
    fallback_data: Vec<u8>,
    options: Options,
}

impl BatchMerger {
    pub fn new(fallback_data: Vec<u8>) -> Self {
        Self { fallback_data, options: Options::default() }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(read_font(path)?))
    }

    pub fn merge_with_fallback(&self, base_data: &[u8]) -> Result<Vec<u8>> {
        Merger::new(self.options.clone())
            .merge(&[base_data, &self.fallback_data])
            .context("Failed to merge fonts")
    }

    /// Merge every base font into `output_dir`, keeping its file name.
    pub fn merge_batch(
        &self,
        reporter: &Reporter,
        base_fonts: &[impl AsRef<Path> + Sync],
        output_dir: &Path,
    ) -> Result<usize> {
        info!("Merging {} fonts with fallback", base_fonts.len());

        reporter.run_batch("Merge", base_fonts, |base_path| {
            let base_data = read_font(base_path)?;
            let merged_data = self.merge_with_fallback(&base_data)?;
            let output = output_dir.join(file_name(base_path)?);
            write_font(&output, &merged_data)?;
            info!("Merged: {}", output.display());
            Ok(())
        })
    }
}

pub fn merge_fonts(inputs: &[impl AsRef<Path>], output: &Path, options: Options) -> Result<()> {
    info!("Merging {} fonts:", inputs.len());
    let mut merger = FontMerger::new().with_options(options);
    for input in inputs {
        info!("  - {}", input.as_ref().display());
        merger.add_file(input)?;
    }
    merger.merge_to_file(output)
}

pub fn merge_batch(
    reporter: &Reporter,
    base_fonts: &[impl AsRef<Path> + Sync],
    fallback: &Path,
    output_dir: &Path,
    options: Options,
) -> Result<usize> {
    info!("Merging {} fonts with {}", base_fonts.len(), fallback.display());
    BatchMerger::from_file(fallback)?.with_options(options).merge_batch(
        reporter,
        base_fonts,
        output_dir,
    )
}
