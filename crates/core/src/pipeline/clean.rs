use std::{fs::remove_dir_all, path::Path};

use anyhow::{Context, Result};
use log::info;

/// Remove the build and dist directories; missing ones are skipped.
pub fn clean(build_dir: &Path, dist_dir: &Path) -> Result<usize> {
    let mut removed = 0;

    for dir in [build_dir, dist_dir] {
        if dir.exists() {
            remove_dir_all(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
            info!("Removed {}", dir.display());
            removed += 1;
        } else {
            info!("Skipped {} (not found)", dir.display());
        }
    }

    info!("Cleaned {removed} directories");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use std::{env::temp_dir, fs::create_dir_all, process::id};

    use super::*;

    #[test]
    fn removes_existing_directories_only() {
        let root = temp_dir().join(format!("warpnine-core-clean-{}", id()));
        let build = root.join("build");
        create_dir_all(build.join("frozen")).unwrap();

        assert_eq!(clean(&build, &root.join("dist")).unwrap(), 1);
        assert!(!build.exists());
        assert_eq!(clean(&build, &root.join("dist")).unwrap(), 0);
        remove_dir_all(root).unwrap();
    }
}
