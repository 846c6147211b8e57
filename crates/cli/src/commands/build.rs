//! Full build pipelines, the source download/clean steps and output validation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::info;
use warpnine_core::{
    BuildContext, Check, Reporter, build_all, build_condensed, build_mono, build_sans,
    pipeline::{clean as clean_outputs, download as download_sources},
    validate as validate_outputs,
};

#[derive(Args)]
pub struct BuildArgs {
    #[arg(long, default_value = "build")]
    pub build_dir: PathBuf,
    #[arg(long, default_value = "dist")]
    pub dist_dir: PathBuf,
    /// Release date `YYYY-MM-DD` or `YYYY-MM-DD.N`; defaults to today
    #[arg(short, long)]
    pub version: Option<String>,
}

impl BuildArgs {
    pub fn build_all(&self) -> Result<()> {
        build_all(&self.build_dir, &self.dist_dir, self.version.as_deref())
    }

    pub fn build_mono(&self) -> Result<()> {
        build_mono(&self.build_dir, &self.dist_dir, self.version.as_deref())
    }

    pub fn build_sans(&self) -> Result<()> {
        build_sans(&self.build_dir, &self.dist_dir, self.version.as_deref())
    }

    pub fn build_condensed(&self) -> Result<()> {
        build_condensed(&self.build_dir, &self.dist_dir, self.version.as_deref())
    }
}

pub fn download(build_dir: &Path) -> Result<()> {
    let count = download_sources(&Reporter::new(), build_dir)?;
    info!("Downloaded {count} files into {}/", build_dir.display());
    Ok(())
}

pub fn clean(build_dir: &Path, dist_dir: &Path) -> Result<()> {
    clean_outputs(build_dir, dist_dir).map(drop)
}

/// Font group checked by `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateTarget {
    /// The WarpnineMono variable font
    Vf,
    /// Frozen features in the VF and static WarpnineMono fonts
    Frozen,
    /// WarpnineSans and WarpnineSansCondensed
    Sans,
    All,
}

impl ValidateTarget {
    pub fn checks(self) -> &'static [Check] {
        match self {
            Self::Vf => &[Check::Vf],
            Self::Frozen => &[Check::Frozen],
            Self::Sans => &[Check::Sans],
            Self::All => &Check::ALL,
        }
    }
}

pub fn validate(dist_dir: &Path, target: ValidateTarget) -> Result<()> {
    let ctx = BuildContext::new(Path::new("build"), dist_dir, None)?;
    validate_outputs(&ctx, target.checks())?;
    info!("All checks passed");
    Ok(())
}
