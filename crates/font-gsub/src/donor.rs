//! Copying a GSUB table from a donor font.

use log::{info, warn};
use read_fonts::{TableProvider, types::Tag};
use warpnine_font_ops::FontTables;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{gdef::Gdef, gsub::Gsub},
};

use crate::{Error, Result, rebuild_font};

const GSUB: Tag = Tag::new(b"GSUB");

/// What [`copy_gsub`] had to discard to keep the copy consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DonorReport {
    /// `true` when donor and target axes agree and the table was copied byte for byte.
    pub verbatim: bool,
    pub dropped_feature_variations: bool,
    pub dropped_gdef_var_store: bool,
}

/// Replace the target's GSUB with the donor's.
///
/// The donor may not reference glyphs the target lacks. When the `fvar`
/// axis tags of the two fonts differ (in order), the donor's
/// FeatureVariations no longer point at the right axes and are dropped,
/// together with the target's GDEF variation store.
pub fn copy_gsub(donor: &[u8], target: &[u8]) -> Result<(Vec<u8>, DonorReport)> {
    let donor_tables = FontTables::new(donor)?;
    let target_tables = FontTables::new(target)?;
    let donor_font = donor_tables.font();
    let target_font = target_tables.font();

    let donor_glyphs = donor_font.maxp()?.num_glyphs();
    let target_glyphs = target_font.maxp()?.num_glyphs();
    if donor_glyphs > target_glyphs {
        return Err(Error::IncompatibleMasters { donor_glyphs, target_glyphs });
    }

    let gsub = donor_font.gsub().map_err(|_| Error::NoGsub("donor"))?;
    let mut report = DonorReport::default();

    if donor_tables.axis_tags() == target_tables.axis_tags() {
        let Some(raw) = donor_font.table_data(GSUB) else {
            return Err(Error::NoGsub("donor"));
        };
        let data = rebuild_font(target_font, &[GSUB], |builder| {
            builder.add_raw(GSUB, raw.as_bytes().to_vec());
            Ok(())
        })?;
        report.verbatim = true;
        info!("Copied GSUB verbatim ({} bytes)", raw.len());
        return Ok((data, report));
    }

    warn!(
        "Donor axes {:?} differ from target axes {:?}",
        donor_tables.axis_tags(),
        target_tables.axis_tags()
    );
    let mut owned: Gsub = gsub.to_owned_table();
    if gsub.feature_variations().is_some() {
        owned.feature_variations = None.into();
        report.dropped_feature_variations = true;
    }

    let gdef = if target_tables.gdef_has_var_store() {
        let mut gdef: Gdef = target_font.gdef()?.to_owned_table();
        gdef.item_var_store = None.into();
        report.dropped_gdef_var_store = true;
        Some(gdef)
    } else {
        None
    };

    let data = rebuild_font(target_font, &[GSUB], |builder| {
        builder.add_table(&owned)?;
        if let Some(gdef) = &gdef {
            builder.add_table(gdef)?;
        }
        Ok(())
    })?;
    info!(
        "Copied GSUB (feature variations dropped: {}, GDEF var store dropped: {})",
        report.dropped_feature_variations, report.dropped_gdef_var_store
    );
    Ok((data, report))
}
