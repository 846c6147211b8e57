//! Commands that rewrite fonts in place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use font_feature_freezer::{FreezeOptions, SuffixConfig, report};
use log::{info, warn};
use warpnine_core::{
    FontNaming, FontVersion, MonospaceSettings, Reporter,
    freeze::freeze_fonts,
    io::{read_font, transform_font_in_place, write_font},
    warpnine::{calt::fix_calt_registration, ligatures::remove_ligature, naming},
};

#[derive(Args)]
pub struct FreezeArgs {
    /// Comma-separated feature tags, e.g. `ss01,zero`
    #[arg(short, long, value_delimiter = ',')]
    pub features: Vec<String>,
    /// Also apply `rvrn` lookups before the requested features
    #[arg(long)]
    pub auto_rvrn: bool,
    /// Only use lookups reachable from this script
    #[arg(short, long)]
    pub script: Option<String>,
    /// Only use lookups reachable from this language system
    #[arg(short, long)]
    pub lang: Option<String>,
    /// Append this suffix to the family name
    #[arg(long, conflicts_with = "usesuffix")]
    pub suffix: Option<String>,
    /// Append the sorted feature tags to the family name
    #[arg(long)]
    pub usesuffix: bool,
    /// `search/replace` pairs applied to name strings, separated by commas
    #[arg(short = 'R', long)]
    pub replacenames: Option<String>,
    /// Record the frozen features in the version string
    #[arg(short, long)]
    pub info: bool,
    /// Drop glyph names from the post table
    #[arg(short, long)]
    pub zapnames: bool,
    /// Print scripts, languages and features instead of freezing
    #[arg(long)]
    pub report: bool,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl FreezeArgs {
    fn options(&self) -> FreezeOptions {
        let suffix = match (&self.suffix, self.usesuffix) {
            (Some(custom), _) => SuffixConfig::Custom(custom.clone()),
            (None, true) => SuffixConfig::Auto,
            (None, false) => SuffixConfig::None,
        };
        FreezeOptions::new(&self.features)
            .with_auto_rvrn(self.auto_rvrn)
            .with_script(self.script.clone())
            .with_lang(self.lang.clone())
            .with_suffix(suffix)
            .with_replacenames(self.replacenames.clone())
            .with_info(self.info)
            .with_zapnames(self.zapnames)
            .with_warnings(true)
    }

    pub fn run(self) -> Result<()> {
        if self.report {
            for path in &self.files {
                let data = read_font(path)?;
                let font_report = report(&data)
                    .with_context(|| format!("Failed to inspect {}", path.display()))?;
                println!("{font_report}");
            }
            return Ok(());
        }
        freeze_fonts(&Reporter::new(), &self.files, &self.options())?;
        Ok(())
    }
}

#[derive(Args)]
pub struct NameArgs {
    #[arg(long)]
    pub family: String,
    #[arg(long, default_value = "Regular")]
    pub style: String,
    /// PostScript family; defaults to the family without spaces
    #[arg(long)]
    pub postscript_family: Option<String>,
    /// Appended to the Recursive copyright notice
    #[arg(long)]
    pub copyright_extra: Option<String>,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl NameArgs {
    fn naming(&self) -> FontNaming {
        let mut naming = FontNaming::new(&self.family, &self.style);
        if let Some(ps) = &self.postscript_family {
            naming = naming.postscript_family(ps);
        }
        if let Some(extra) = &self.copyright_extra {
            naming = naming.copyright_extra(extra);
        }
        naming
    }

    pub fn run(self) -> Result<()> {
        let names = self.naming();
        info!("Naming: {} / {}", names.full_name(), names.postscript_name());
        Reporter::new().run_batch("Set names", &self.files, |path| naming::set_name(path, &names))?;
        Ok(())
    }
}

pub fn remove_ligatures(glyph: &str, files: &[PathBuf]) -> Result<()> {
    Reporter::new().run_batch("Remove ligatures", files, |path| {
        remove_ligature(path, glyph).map(drop)
    })?;
    Ok(())
}

pub fn set_monospace(files: &[PathBuf]) -> Result<()> {
    Reporter::new().run_batch("Set monospace", files, |path| {
        transform_font_in_place(path, |data| MonospaceSettings::DEFAULT.apply(data))
    })?;
    Ok(())
}

pub fn set_version(version: Option<&str>, files: &[PathBuf]) -> Result<()> {
    let version = FontVersion::parse(version)?;
    info!("Setting version to {}", version.version_string());
    Reporter::new().run_batch("Set version", files, |path| {
        transform_font_in_place(path, |data| version.apply(data))
    })?;
    Ok(())
}

pub fn fix_calt(files: &[PathBuf]) -> Result<()> {
    Reporter::new().run_batch("Fix calt", files, |path| fix_calt_registration(path).map(drop))?;
    Ok(())
}

pub fn copy_gsub(from: &Path, to: &Path) -> Result<()> {
    let donor = read_font(from)?;
    let target = read_font(to)?;
    let (data, donor_report) = warpnine_font_gsub::copy_gsub(&donor, &target)
        .with_context(|| format!("Failed to copy GSUB from {}", from.display()))?;
    if !donor_report.verbatim {
        warn!("Axes differ from the donor; GSUB was rebuilt without variation data");
    }
    write_font(to, data)?;
    info!("Copied GSUB from {} to {}", from.display(), to.display());
    Ok(())
}
