//! Build context threaded through every pipeline stage.

use std::path::{Path, PathBuf};

use anyhow::Result;
use warpnine_font_metadata::FontVersion;

use crate::{
    config::{NOTO_CJK_VF_FILENAME, RECURSIVE_VF_FILENAME, VF_FILENAME},
    io::glob_fonts,
    report::Reporter,
};

/// Paths, version stamp and reporter for one build.
#[derive(Debug)]
pub struct BuildContext {
    pub build_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub recursive_vf: PathBuf,
    pub noto_vf: PathBuf,
    pub version: FontVersion,
    pub reporter: Reporter,
}

impl BuildContext {
    /// `version` is parsed with [`FontVersion::parse`]; `None` means today.
    pub fn new(build_dir: &Path, dist_dir: &Path, version: Option<&str>) -> Result<Self> {
        let version = FontVersion::parse(version)?;
        Ok(Self {
            build_dir: build_dir.to_path_buf(),
            dist_dir: dist_dir.to_path_buf(),
            recursive_vf: build_dir.join(RECURSIVE_VF_FILENAME),
            noto_vf: build_dir.join(NOTO_CJK_VF_FILENAME),
            version,
            reporter: Reporter::new(),
        })
    }

    pub fn build_fonts(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        glob_fonts(&self.build_dir, pattern)
    }

    pub fn dist_fonts(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        glob_fonts(&self.dist_dir, pattern)
    }

    /// Static WarpnineMono fonts in the dist directory, excluding the VF.
    pub fn static_mono_fonts(&self) -> Result<Vec<PathBuf>> {
        let vf = self.vf_output();
        Ok(self.dist_fonts("WarpnineMono-*.ttf")?.into_iter().filter(|p| *p != vf).collect())
    }

    pub fn vf_output(&self) -> PathBuf {
        self.dist_dir.join(VF_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_source_paths_from_the_build_dir() {
        let ctx = BuildContext::new(Path::new("b"), Path::new("d"), Some("2025-01-02")).unwrap();
        assert_eq!(ctx.recursive_vf, Path::new("b").join(RECURSIVE_VF_FILENAME));
        assert_eq!(ctx.noto_vf, Path::new("b").join(NOTO_CJK_VF_FILENAME));
        assert_eq!(ctx.vf_output(), Path::new("d/WarpnineMono-VF.ttf"));
        assert_eq!(ctx.version.version_string(), "Version 2025-01-02");
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!(BuildContext::new(Path::new("b"), Path::new("d"), Some("yesterday")).is_err());
    }
}
