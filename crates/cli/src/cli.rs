//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use font_instancer::AxisLocation;
use warpnine_core::config::CONDENSED_SCALE;

use crate::commands::{self, BuildArgs, FreezeArgs, NameArgs, ValidateTarget};

#[derive(Parser)]
#[command(name = "warpnine-fonts")]
#[command(about = "Build Warpnine fonts from Recursive and Noto CJK sources")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every family: Mono (static and VF), Sans and Sans Condensed
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    BuildMono {
        #[command(flatten)]
        args: BuildArgs,
    },
    BuildSans {
        #[command(flatten)]
        args: BuildArgs,
    },
    BuildCondensed {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Fetch the Recursive and Noto CJK sources
    Download {
        #[arg(long, default_value = "build")]
        build_dir: PathBuf,
    },
    /// Check the fonts in the dist directory
    Validate {
        #[arg(value_enum, default_value_t = ValidateTarget::All)]
        target: ValidateTarget,
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
    },
    /// Remove build outputs
    Clean {
        #[arg(long, default_value = "build")]
        build_dir: PathBuf,
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
    },
    /// Pin axes of a variable font; unlisted axes stay variable
    Instance {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long = "axis", value_name = "TAG=VALUE", value_parser = commands::parse_axis, required = true)]
        axes: Vec<AxisLocation>,
    },
    /// Permanently apply GSUB features by remapping cmap
    Freeze(FreezeArgs),
    /// Merge fonts; the first one wins naming and cmap conflicts
    Merge {
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        /// Fail on same-named glyphs with different outlines instead of renaming them
        #[arg(long)]
        strict: bool,
    },
    /// Merge each base font with one fallback font
    MergeBatch {
        #[arg(required = true)]
        base_fonts: Vec<PathBuf>,
        #[arg(short, long)]
        fallback: PathBuf,
        #[arg(short, long = "output-dir", default_value = "dist")]
        output_dir: PathBuf,
        #[arg(long)]
        strict: bool,
    },
    /// Disable the ligature of three `--glyph` glyphs in a row (grave by default)
    RemoveLigatures {
        #[arg(long, default_value = warpnine_font_gsub::DEFAULT_LIGATURE_GLYPH)]
        glyph: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    SetMonospace {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Stamp `YYYY-MM-DD` (default: today) into head and name
    SetVersion {
        #[arg(short, long)]
        version: Option<String>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    SetName(NameArgs),
    /// Assemble the WarpnineMono VF from the static masters
    BuildVf {
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
        #[arg(long, default_value = "dist/WarpnineMono-VF.ttf")]
        output: PathBuf,
        /// Variable font whose GSUB is copied into the result
        #[arg(long)]
        gsub_donor: Option<PathBuf>,
        #[arg(short, long)]
        version: Option<String>,
    },
    /// Replace the GSUB table of a font with another font's
    CopyGsub {
        #[arg(long)]
        from: PathBuf,
        #[arg(long)]
        to: PathBuf,
    },
    /// Register calt/rclt in every script and language system
    FixCalt {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    CreateSans {
        #[arg(long)]
        input: PathBuf,
        #[arg(short, long = "output-dir", default_value = "dist")]
        output_dir: PathBuf,
    },
    CreateCondensed {
        #[arg(long)]
        input: PathBuf,
        #[arg(short, long = "output-dir", default_value = "dist")]
        output_dir: PathBuf,
        #[arg(long, default_value_t = CONDENSED_SCALE)]
        scale: f64,
    },
    /// Subset a font to the Japanese Unicode ranges
    SubsetJapanese { input: PathBuf, output: PathBuf },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { args } => args.build_all(),
            Commands::BuildMono { args } => args.build_mono(),
            Commands::BuildSans { args } => args.build_sans(),
            Commands::BuildCondensed { args } => args.build_condensed(),
            Commands::Download { build_dir } => commands::download(&build_dir),
            Commands::Validate { target, dist_dir } => commands::validate(&dist_dir, target),
            Commands::Clean { build_dir, dist_dir } => commands::clean(&build_dir, &dist_dir),
            Commands::Instance { input, output, axes } => {
                commands::instance(&input, &output, &axes)
            }
            Commands::Freeze(args) => args.run(),
            Commands::Merge { inputs, output, strict } => commands::merge(&inputs, &output, strict),
            Commands::MergeBatch { base_fonts, fallback, output_dir, strict } => {
                commands::merge_batch(&base_fonts, &fallback, &output_dir, strict)
            }
            Commands::RemoveLigatures { glyph, files } => commands::remove_ligatures(&glyph, &files),
            Commands::SetMonospace { files } => commands::set_monospace(&files),
            Commands::SetVersion { version, files } => {
                commands::set_version(version.as_deref(), &files)
            }
            Commands::SetName(args) => args.run(),
            Commands::BuildVf { dist_dir, output, gsub_donor, version } => {
                commands::build_vf(&dist_dir, &output, gsub_donor.as_deref(), version.as_deref())
            }
            Commands::CopyGsub { from, to } => commands::copy_gsub(&from, &to),
            Commands::FixCalt { files } => commands::fix_calt(&files),
            Commands::CreateSans { input, output_dir } => {
                commands::create_sans(&input, &output_dir)
            }
            Commands::CreateCondensed { input, output_dir, scale } => {
                commands::create_condensed(&input, &output_dir, scale)
            }
            Commands::SubsetJapanese { input, output } => {
                commands::subset_japanese(&input, &output)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use warpnine_core::Check;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_instance_pins() {
        let cli = Cli::parse_from([
            "warpnine-fonts",
            "instance",
            "in.ttf",
            "out.ttf",
            "-a",
            "wght=700",
            "--axis",
            "MONO=1",
        ]);
        let Commands::Instance { axes, .. } = cli.command else {
            panic!("expected instance");
        };
        assert_eq!(axes, vec![AxisLocation::new("wght", 700.0), AxisLocation::new("MONO", 1.0)]);
    }

    #[test]
    fn condensed_scale_defaults_to_085() {
        let cli = Cli::parse_from(["warpnine-fonts", "create-condensed", "--input", "vf.ttf"]);
        let Commands::CreateCondensed { scale, output_dir, .. } = cli.command else {
            panic!("expected create-condensed");
        };
        assert_eq!(scale, 0.85);
        assert_eq!(output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn validate_defaults_to_every_check() {
        let cli = Cli::parse_from(["warpnine-fonts", "validate"]);
        let Commands::Validate { target, dist_dir } = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(target.checks(), Check::ALL);
        assert_eq!(dist_dir, PathBuf::from("dist"));

        let cli = Cli::parse_from(["warpnine-fonts", "validate", "frozen", "--dist-dir", "out"]);
        let Commands::Validate { target, .. } = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(target, ValidateTarget::Frozen);
    }

    #[test]
    fn freeze_takes_a_feature_list() {
        let cli = Cli::parse_from([
            "warpnine-fonts",
            "freeze",
            "-f",
            "ss01,zero",
            "--auto-rvrn",
            "a.ttf",
            "b.ttf",
        ]);
        let Commands::Freeze(args) = cli.command else {
            panic!("expected freeze");
        };
        assert_eq!(args.features, ["ss01", "zero"]);
        assert!(args.auto_rvrn);
        assert_eq!(args.files.len(), 2);
    }
}
