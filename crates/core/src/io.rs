//! Shared font I/O utilities.
//!
//! Writes go to a hidden sibling (`.{name}.tmp`) that is renamed over the
//! destination, so a failed step never leaves a truncated font behind.

use std::{
    fs::{create_dir_all, read, remove_file, rename, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::glob;

use crate::Error;

#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        if !self.path.exists() {
            return Err(Error::InputNotFound(self.path.clone()).into());
        }
        read(&self.path).with_context(|| format!("Failed to read font: {}", self.path.display()))
    }

    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        let temp = self.temp_path()?;

        let result = write(&temp, data).and_then(|()| rename(&temp, &self.path));
        if let Err(e) = result {
            // The temporary may not exist if the first write failed.
            let _ = remove_file(&temp);
            return Err(e)
                .with_context(|| format!("Failed to write font: {}", self.path.display()));
        }
        Ok(())
    }

    pub fn transform(&self, f: impl FnOnce(&[u8]) -> Result<Vec<u8>>) -> Result<()> {
        let data = self.read()?;
        let new_data = f(&data)?;
        self.write(new_data)
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    /// File name as UTF-8, for log lines and derived output names.
    pub fn file_name(&self) -> Result<&str> {
        file_name(&self.path)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let name = self.file_name()?;
        Ok(self.path.with_file_name(format!(".{name}.tmp")))
    }
}

impl AsRef<Path> for FontFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Fonts in `dir` matching `pattern`, sorted by path.
pub fn glob_fonts(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(pattern);
    let pattern_str = pattern.to_str().context("Invalid pattern path")?;
    let mut fonts: Vec<PathBuf> = glob(pattern_str)
        .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
        .filter_map(Result::ok)
        .collect();
    fonts.sort();
    Ok(fonts)
}

pub fn read_font(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    FontFile::new(path.as_ref()).read()
}

pub fn write_font(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Result<()> {
    FontFile::new(path.as_ref()).write(data)
}

pub fn transform_font_in_place(
    path: impl AsRef<Path>,
    f: impl FnOnce(&[u8]) -> Result<Vec<u8>>,
) -> Result<()> {
    FontFile::new(path.as_ref()).transform(f)
}

/// File name of `path` as UTF-8.
pub fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid filename: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::{env::temp_dir, fs::remove_dir_all, process::id};

    use anyhow::bail;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = temp_dir().join(format!("warpnine-core-io-{name}-{}", id()));
        let _ = remove_dir_all(&dir);
        dir
    }

    #[test]
    fn write_replaces_without_leaving_temporaries() {
        let dir = scratch("write");
        let path = dir.join("nested/Font.ttf");

        write_font(&path, b"first").unwrap();
        write_font(&path, b"second").unwrap();

        assert_eq!(read(&path).unwrap(), b"second");
        assert!(!dir.join("nested/.Font.ttf.tmp").exists());
        remove_dir_all(dir).unwrap();
    }

    #[test]
    fn failed_transform_keeps_the_original() {
        let dir = scratch("transform");
        let path = dir.join("Font.ttf");
        write_font(&path, b"original").unwrap();

        let result = transform_font_in_place(&path, |_| bail!("broken"));

        assert!(result.is_err());
        assert_eq!(read(&path).unwrap(), b"original");
        remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_input_is_reported_as_such() {
        let err = read_font(scratch("missing").join("Nope.ttf")).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InputNotFound(_))));
    }

    #[test]
    fn glob_is_sorted() {
        let dir = scratch("glob");
        for name in ["B.ttf", "A.ttf", "C.otf"] {
            write_font(dir.join(name), b"x").unwrap();
        }

        let fonts = glob_fonts(&dir, "*.ttf").unwrap();

        assert_eq!(fonts, vec![dir.join("A.ttf"), dir.join("B.ttf")]);
        remove_dir_all(dir).unwrap();
    }
}
