//! Variable font assembly and its post-processing.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use warpnine_font_gsub::{CaltRegistration, copy_gsub, register_calt};
use warpnine_font_metadata::{FontVersion, VariableNaming};
use warpnine_font_vf_builder::{Axis, DesignSpace, Instance, Source, build_variable_font};

use crate::{
    config::MONO_FAMILY,
    io::{read_font, write_font},
    styles::MONO_STYLES,
};

/// WarpnineMono designspace: 16 masters on `wght` 300..1000 × `ital` 0..1.
pub fn warpnine_mono_designspace(dist_dir: &Path) -> DesignSpace {
    let axes = vec![
        Axis::new("wght", "Weight", 300.0, 400.0, 1000.0),
        Axis::new("ital", "Italic", 0.0, 0.0, 1.0),
    ];

    let sources: Vec<Source> = MONO_STYLES
        .iter()
        .map(|style| {
            Source::new(
                dist_dir.join(format!("{}{}.ttf", MONO_FAMILY.file_prefix(), style.name)),
                style.mono_location(),
            )
            .with_style_name(&style.display_name())
        })
        .collect();

    let instances: Vec<Instance> = MONO_STYLES
        .iter()
        .map(|style| Instance::new(&style.display_name(), style.mono_location()))
        .collect();

    DesignSpace::new(axes, sources).with_instances(instances)
}

/// Steps applied to a freshly assembled VF.
#[derive(Debug, Clone, Copy)]
pub struct VfFinish<'a> {
    /// Font whose GSUB replaces the (absent) merged GSUB.
    pub gsub_donor: Option<&'a [u8]>,
    pub version: Option<&'a FontVersion>,
}

/// Reinstate GSUB from the donor, name the family, stamp the version and
/// register calt/rclt everywhere.
pub fn finish_variable_font(data: Vec<u8>, finish: &VfFinish) -> Result<Vec<u8>> {
    let mut data = data;

    if let Some(donor) = finish.gsub_donor {
        let (copied, report) = copy_gsub(donor, &data).context("Failed to copy GSUB from donor")?;
        if !report.verbatim {
            warn!(
                "Donor axes differ: dropped FeatureVariations ({}) and GDEF var store ({})",
                report.dropped_feature_variations, report.dropped_gdef_var_store
            );
        }
        data = copied;
    }

    let naming = VariableNaming::new(MONO_FAMILY.name, format!("{}-VF", MONO_FAMILY.postscript))
        .copyright_extra(MONO_FAMILY.copyright_extra);
    data = naming.apply(&data)?;

    if let Some(version) = finish.version {
        data = version.apply(&data)?;
    }

    match register_calt(&data).context("Failed to register calt")? {
        CaltRegistration::Registered { lang_systems, data: registered } => {
            info!("  Registered calt/rclt in {lang_systems} language systems");
            Ok(registered)
        }
        _ => Ok(data),
    }
}

/// Assemble the WarpnineMono VF from the static masters in `dist_dir`.
pub fn build_warpnine_mono_vf(
    dist_dir: &Path,
    output: &Path,
    gsub_donor: Option<&Path>,
    version: Option<&FontVersion>,
) -> Result<()> {
    info!("Building WarpnineMono variable font...");

    let designspace = warpnine_mono_designspace(dist_dir);
    for source in &designspace.sources {
        if !source.path.exists() {
            return Err(crate::Error::InputNotFound(source.path.clone()).into());
        }
    }

    info!("  Sources: {} masters", designspace.sources.len());
    info!("  Axes: wght (300-1000), ital (0-1)");

    let vf_data = build_variable_font(&designspace).context("Failed to build variable font")?;

    let donor = gsub_donor.map(read_font).transpose()?;
    let finish = VfFinish { gsub_donor: donor.as_deref(), version };
    let vf_data = finish_variable_font(vf_data, &finish)?;

    write_font(output, &vf_data)?;

    let size_mb = vf_data.len() as f64 / 1024.0 / 1024.0;
    info!("  Output: {} ({size_mb:.2} MB)", output.display());
    Ok(())
}
