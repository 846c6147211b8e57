//! Build pipeline logic for Warpnine fonts.

mod clean;
mod download;
mod steps;
mod vf;

use std::{path::Path, time::Instant};

use anyhow::Result;
use log::info;

pub use clean::clean;
pub use download::download;
pub use steps::{
    CONDENSED_ONLY_STEPS, FINAL_STEPS, MONO_STEPS, PipelineStep, SANS_ONLY_STEPS, SANS_STEPS,
};
pub use vf::{VfFinish, build_warpnine_mono_vf, finish_variable_font, warpnine_mono_designspace};

use crate::{
    BuildContext,
    config::{CONDENSED_FAMILY, Family, MONO_FAMILY, SANS_FAMILY},
};

/// A named sequence of step lists and the families it produces.
struct Pipeline {
    title: &'static str,
    phases: &'static [&'static [PipelineStep]],
    families: &'static [Family],
}

const ALL: Pipeline = Pipeline {
    title: "Warpnine Fonts Build Pipeline",
    phases: &[MONO_STEPS, SANS_STEPS, FINAL_STEPS],
    families: &[MONO_FAMILY, SANS_FAMILY, CONDENSED_FAMILY],
};

const MONO: Pipeline = Pipeline {
    title: "Warpnine Mono Build Pipeline",
    phases: &[MONO_STEPS, FINAL_STEPS],
    families: &[MONO_FAMILY],
};

const SANS: Pipeline = Pipeline {
    title: "Warpnine Sans Build Pipeline",
    phases: &[SANS_ONLY_STEPS],
    families: &[SANS_FAMILY],
};

const CONDENSED: Pipeline = Pipeline {
    title: "Warpnine Sans Condensed Build Pipeline",
    phases: &[CONDENSED_ONLY_STEPS],
    families: &[CONDENSED_FAMILY],
};

pub fn run_steps(steps: &[PipelineStep], ctx: &BuildContext, offset: usize, total: usize) -> Result<()> {
    for (i, (name, step_fn)) in steps.iter().enumerate() {
        ctx.reporter.stage(name, offset + i + 1, total, || step_fn(ctx))?;
    }
    Ok(())
}

fn run_pipeline(pipeline: &Pipeline, ctx: &BuildContext) -> Result<()> {
    let start = Instant::now();
    ctx.reporter.banner(pipeline.title);

    let total = pipeline.phases.iter().map(|p| p.len()).sum();
    let mut offset = 0;
    for phase in pipeline.phases {
        run_steps(phase, ctx, offset, total)?;
        offset += phase.len();
    }

    ctx.reporter.banner(&format!("✨ Build complete in {:.2}s", start.elapsed().as_secs_f64()));
    info!("   Output: {}", ctx.dist_dir.display());
    for family in pipeline.families {
        let count = ctx.dist_fonts(&format!("{}*.ttf", family.file_prefix()))?.len();
        info!("   {}: {count} fonts", family.name);
    }
    info!("   Files processed: {} succeeded, {} failed", ctx.reporter.succeeded(), ctx.reporter.failed());
    Ok(())
}

pub fn build_all(build_dir: &Path, dist_dir: &Path, version: Option<&str>) -> Result<()> {
    run_pipeline(&ALL, &BuildContext::new(build_dir, dist_dir, version)?)
}

pub fn build_mono(build_dir: &Path, dist_dir: &Path, version: Option<&str>) -> Result<()> {
    run_pipeline(&MONO, &BuildContext::new(build_dir, dist_dir, version)?)
}

pub fn build_sans(build_dir: &Path, dist_dir: &Path, version: Option<&str>) -> Result<()> {
    run_pipeline(&SANS, &BuildContext::new(build_dir, dist_dir, version)?)
}

pub fn build_condensed(build_dir: &Path, dist_dir: &Path, version: Option<&str>) -> Result<()> {
    run_pipeline(&CONDENSED, &BuildContext::new(build_dir, dist_dir, version)?)
}
