//! Pipeline step definitions.

use std::{fs::rename, path::PathBuf};

use anyhow::Result;
use font_instancer::AxisLocation;
use log::info;
use warpnine_font_merger::Options;
use warpnine_font_metadata::MonospaceSettings;

use super::{build_warpnine_mono_vf, clean::clean, download::download};
use crate::{
    BuildContext,
    config::{CONDENSED_FAMILY, CONDENSED_SCALE, MONO_FAMILY, SANS_FAMILY},
    freeze::freeze_fonts,
    instance::{InstanceDef, create_instances_batch},
    io::{file_name, transform_font_in_place},
    merge::merge_batch,
    styles::{Casual, MONO_FEATURES, MONO_STYLES, SANS_FEATURES, freeze_options},
    subset::subset_japanese,
    warpnine::{
        condense::create_condensed, ligatures::remove_grave_ligature,
        naming::set_names_for_family, sans::create_sans,
    },
};

pub type PipelineStep = (&'static str, fn(&BuildContext) -> Result<()>);

/// Intermediate static cuts of Recursive Mono Duotone.
const DUOTONE_PREFIX: &str = "RecMonoDuotone-";

pub const MONO_STEPS: &[PipelineStep] = &[
    ("clean", step_clean),
    ("download", step_download),
    ("extract-duotone", step_extract_duotone),
    ("remove-ligatures", step_remove_ligatures),
    ("extract-noto-weights", step_extract_noto_weights),
    ("subset-noto", step_subset_noto),
    ("merge", step_merge),
    ("set-names-mono", step_set_names_mono),
    ("freeze-static-mono", step_freeze_static_mono),
    ("build-vf", step_build_vf),
    ("set-monospace", step_set_monospace),
];

pub const SANS_STEPS: &[PipelineStep] = &[
    ("create-condensed", step_create_condensed),
    ("create-sans", step_create_sans),
    ("freeze-vf-and-sans", step_freeze_vf_and_sans),
];

pub const FINAL_STEPS: &[PipelineStep] = &[("set-version", step_set_version)];

pub const SANS_ONLY_STEPS: &[PipelineStep] = &[
    ("download", step_download),
    ("create-sans", step_create_sans),
    ("freeze-sans", step_freeze_sans),
    ("set-version", step_set_version),
];

pub const CONDENSED_ONLY_STEPS: &[PipelineStep] = &[
    ("download", step_download),
    ("create-condensed", step_create_condensed),
    ("freeze-condensed", step_freeze_condensed),
    ("set-version", step_set_version),
];

fn step_clean(ctx: &BuildContext) -> Result<()> {
    clean(&ctx.build_dir, &ctx.dist_dir).map(drop)
}

fn step_download(ctx: &BuildContext) -> Result<()> {
    download(&ctx.reporter, &ctx.build_dir).map(drop)
}

fn step_extract_duotone(ctx: &BuildContext) -> Result<()> {
    info!("  Extracting {} Duotone instances from Recursive VF...", MONO_STYLES.len());

    let instances: Vec<InstanceDef> = MONO_STYLES
        .iter()
        .map(|style| {
            InstanceDef::new(
                format!("{DUOTONE_PREFIX}{}", style.name),
                style.axis_locations(1.0, Casual::Duotone).to_vec(),
            )
        })
        .collect();

    create_instances_batch(&ctx.reporter, &ctx.recursive_vf, &ctx.build_dir, &instances).map(drop)
}

fn step_remove_ligatures(ctx: &BuildContext) -> Result<()> {
    let fonts = ctx.build_fonts(&format!("{DUOTONE_PREFIX}*.ttf"))?;
    info!("  Removing triple-backtick ligature from {} fonts...", fonts.len());
    ctx.reporter
        .run_batch("Remove ligatures", &fonts, |path| remove_grave_ligature(path).map(drop))
        .map(drop)
}

fn step_extract_noto_weights(ctx: &BuildContext) -> Result<()> {
    info!("  Extracting Regular (400) and Bold (700) from Noto CJK VF...");

    let instances = [
        InstanceDef::new("Noto-400", vec![AxisLocation::new("wght", 400.0)]),
        InstanceDef::new("Noto-700", vec![AxisLocation::new("wght", 700.0)]),
    ];
    create_instances_batch(&ctx.reporter, &ctx.noto_vf, &ctx.build_dir, &instances).map(drop)
}

fn step_subset_noto(ctx: &BuildContext) -> Result<()> {
    info!("  Subsetting Noto fonts to Japanese Unicode ranges...");

    let inputs = [ctx.build_dir.join("Noto-400.ttf"), ctx.build_dir.join("Noto-700.ttf")];
    ctx.reporter
        .run_batch("Subset", &inputs, |input| {
            let stem = file_name(input)?.trim_end_matches(".ttf");
            subset_japanese(input, &input.with_file_name(format!("{stem}-subset.ttf")))
        })
        .map(drop)
}

fn step_merge(ctx: &BuildContext) -> Result<()> {
    info!("  Merging Duotone + Noto CJK into WarpnineMono...");

    for cjk_weight in [400, 700] {
        let bases: Vec<PathBuf> = MONO_STYLES
            .iter()
            .filter(|style| style.weight.cjk_weight() == cjk_weight)
            .map(|style| ctx.build_dir.join(format!("{DUOTONE_PREFIX}{}.ttf", style.name)))
            .collect();
        let fallback = ctx.build_dir.join(format!("Noto-{cjk_weight}-subset.ttf"));
        merge_batch(&ctx.reporter, &bases, &fallback, &ctx.dist_dir, Options::default())?;
    }

    for font in ctx.dist_fonts(&format!("{DUOTONE_PREFIX}*.ttf"))? {
        let new_name = file_name(&font)?.replace(DUOTONE_PREFIX, &MONO_FAMILY.file_prefix());
        rename(&font, ctx.dist_dir.join(new_name))?;
    }
    Ok(())
}

fn step_set_names_mono(ctx: &BuildContext) -> Result<()> {
    set_names_for_family(&ctx.reporter, &ctx.dist_dir, &MONO_FAMILY).map(drop)
}

fn step_freeze_static_mono(ctx: &BuildContext) -> Result<()> {
    let fonts = ctx.static_mono_fonts()?;
    info!("  Freezing features in {} static mono fonts...", fonts.len());
    freeze_fonts(&ctx.reporter, &fonts, &freeze_options(MONO_FEATURES)).map(drop)
}

fn step_build_vf(ctx: &BuildContext) -> Result<()> {
    build_warpnine_mono_vf(
        &ctx.dist_dir,
        &ctx.vf_output(),
        Some(ctx.recursive_vf.as_path()),
        Some(&ctx.version),
    )
}

fn step_set_monospace(ctx: &BuildContext) -> Result<()> {
    let fonts = ctx.dist_fonts(&format!("{}*.ttf", MONO_FAMILY.file_prefix()))?;
    info!("  Setting monospace flags on {} fonts...", fonts.len());
    ctx.reporter
        .run_batch("Set monospace", &fonts, |path| {
            transform_font_in_place(path, |data| MonospaceSettings::DEFAULT.apply(data))
        })
        .map(drop)
}

fn step_create_condensed(ctx: &BuildContext) -> Result<()> {
    create_condensed(&ctx.reporter, &ctx.recursive_vf, &ctx.dist_dir, CONDENSED_SCALE).map(drop)
}

fn step_create_sans(ctx: &BuildContext) -> Result<()> {
    create_sans(&ctx.reporter, &ctx.recursive_vf, &ctx.dist_dir).map(drop)
}

/// Freeze features in the fonts of `prefix`; no matching fonts is a silent skip.
fn freeze_matching(ctx: &BuildContext, prefix: &str, features: &[&str]) -> Result<()> {
    let fonts = ctx.dist_fonts(&format!("{prefix}*.ttf"))?;
    if !fonts.is_empty() {
        info!("  Freezing features in {} {prefix}* fonts...", fonts.len());
        freeze_fonts(&ctx.reporter, &fonts, &freeze_options(features))?;
    }
    Ok(())
}

fn step_freeze_sans(ctx: &BuildContext) -> Result<()> {
    freeze_matching(ctx, &SANS_FAMILY.file_prefix(), SANS_FEATURES)
}

fn step_freeze_condensed(ctx: &BuildContext) -> Result<()> {
    freeze_matching(ctx, &CONDENSED_FAMILY.file_prefix(), SANS_FEATURES)
}

fn step_freeze_vf_and_sans(ctx: &BuildContext) -> Result<()> {
    let vf = ctx.vf_output();
    if vf.exists() {
        info!("  Freezing features in VF...");
        freeze_fonts(&ctx.reporter, &[vf], &freeze_options(MONO_FEATURES))?;
    }
    step_freeze_sans(ctx)?;
    step_freeze_condensed(ctx)
}

fn step_set_version(ctx: &BuildContext) -> Result<()> {
    let fonts = ctx.dist_fonts("*.ttf")?;
    info!("  Setting version {} on {} fonts...", ctx.version.tag, fonts.len());
    ctx.reporter
        .run_batch("Set version", &fonts, |path| {
            transform_font_in_place(path, |data| ctx.version.apply(data))
        })
        .map(drop)
}
