//! calt/rclt registration for every script and language system.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use warpnine_font_gsub::{CaltRegistration, register_calt};

use crate::io::{file_name, read_font, write_font};

/// Register `calt`/`rclt` in every language system of the font at `path`.
///
/// Returns `true` when the font was rewritten.
pub fn fix_calt_registration(path: &Path) -> Result<bool> {
    let data = read_font(path)?;
    let name = file_name(path)?;

    match register_calt(&data)
        .with_context(|| format!("Failed to register calt in {}", path.display()))?
    {
        CaltRegistration::Registered { lang_systems, data } => {
            write_font(path, data)?;
            info!("{name}: registered calt/rclt in {lang_systems} language systems");
            Ok(true)
        }
        CaltRegistration::NoGsub => {
            info!("{name}: no GSUB table found");
            Ok(false)
        }
        CaltRegistration::NoCalt => {
            info!("{name}: no calt feature found");
            Ok(false)
        }
        CaltRegistration::AlreadyRegistered => {
            info!("{name}: calt already registered everywhere");
            Ok(false)
        }
    }
}
