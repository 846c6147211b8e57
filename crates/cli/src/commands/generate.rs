//! Commands that produce new font files from existing ones.

use std::path::Path;

use anyhow::Result;
use font_instancer::AxisLocation;
use log::info;
use warpnine_core::{
    FontVersion, Reporter,
    instance::create_instance,
    merge::{merge_batch as merge_each, merge_fonts},
    pipeline::build_warpnine_mono_vf,
    subset::subset_japanese as subset_to_japanese,
    warpnine::{condense::create_condensed as condense, sans::create_sans as sans},
};
use warpnine_font_merger::{CollisionPolicy, Options};

/// Parse a `TAG=VALUE` axis pin.
pub fn parse_axis(s: &str) -> Result<AxisLocation, String> {
    let (tag, value_str) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid axis format '{s}', expected TAG=VALUE"))?;
    if tag.is_empty() || tag.len() > 4 {
        return Err(format!("Invalid axis tag '{tag}'"));
    }
    let value: f32 = value_str
        .parse()
        .map_err(|_| format!("Invalid value '{value_str}' for axis '{tag}'"))?;
    Ok(AxisLocation::new(tag, value))
}

fn merge_options(strict: bool) -> Options {
    let policy = if strict { CollisionPolicy::Error } else { CollisionPolicy::Rename };
    Options::new().collisions(policy)
}

pub fn instance(input: &Path, output: &Path, axes: &[AxisLocation]) -> Result<()> {
    create_instance(input, output, axes)?;
    info!("Wrote {}", output.display());
    Ok(())
}

pub fn merge(inputs: &[impl AsRef<Path>], output: &Path, strict: bool) -> Result<()> {
    merge_fonts(inputs, output, merge_options(strict))?;
    info!("Wrote {}", output.display());
    Ok(())
}

pub fn merge_batch(
    base_fonts: &[impl AsRef<Path> + Sync],
    fallback: &Path,
    output_dir: &Path,
    strict: bool,
) -> Result<()> {
    merge_each(&Reporter::new(), base_fonts, fallback, output_dir, merge_options(strict))?;
    Ok(())
}

pub fn build_vf(
    dist_dir: &Path,
    output: &Path,
    gsub_donor: Option<&Path>,
    version: Option<&str>,
) -> Result<()> {
    let version = version.map(|v| FontVersion::parse(Some(v))).transpose()?;
    build_warpnine_mono_vf(dist_dir, output, gsub_donor, version.as_ref())
}

pub fn create_sans(input: &Path, output_dir: &Path) -> Result<()> {
    sans(&Reporter::new(), input, output_dir)?;
    Ok(())
}

pub fn create_condensed(input: &Path, output_dir: &Path, scale: f64) -> Result<()> {
    anyhow::ensure!(scale > 0.0 && scale <= 1.0, "Scale must be in (0, 1], got {scale}");
    condense(&Reporter::new(), input, output_dir, scale)?;
    Ok(())
}

pub fn subset_japanese(input: &Path, output: &Path) -> Result<()> {
    subset_to_japanese(input, output)
}
