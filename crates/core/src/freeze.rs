//! Batch feature freezing.

use std::path::Path;

use anyhow::{Context, Result};
use font_feature_freezer::{FreezeOptions, freeze};
use log::{info, warn};

use crate::{
    io::{file_name, transform_font_in_place},
    report::Reporter,
};

/// Freeze `options.features` into every file in place.
///
/// An empty feature list is a no-op.
pub fn freeze_fonts(
    reporter: &Reporter,
    files: &[impl AsRef<Path> + Sync],
    options: &FreezeOptions,
) -> Result<usize> {
    if options.features.is_empty() {
        info!("No features specified");
        return Ok(0);
    }

    let order: Vec<String> = options.resolution_order().iter().map(ToString::to_string).collect();
    info!("Freezing features: {}", order.join(","));

    reporter.run_batch("Freeze", files, |path| freeze_single(path, options))
}

fn freeze_single(path: &Path, options: &FreezeOptions) -> Result<()> {
    transform_font_in_place(path, |data| {
        let result = freeze(data, options)
            .with_context(|| format!("Failed to freeze features in {}", path.display()))?;
        for warning in &result.warnings {
            warn!("{}: {warning}", file_name(path)?);
        }
        info!("{}: {}", file_name(path)?, result.stats);
        Ok(result.data)
    })
}
