//! OS/2 table merging
//!
//! The base font's OS/2 is kept; coverage fields are widened to the union
//! of every font.

use read_fonts::{TableProvider, tables::os2::Os2 as ReadOs2};
use write_fonts::{from_obj::ToOwnedTable, tables::os2::Os2};

use crate::{Result, context::MergeContext, strategies::Strategy};

pub fn merge_os2(ctx: &MergeContext) -> Result<Option<Os2>> {
    let Ok(base) = ctx.base().os2() else {
        return Ok(None);
    };
    let tables: Vec<ReadOs2> = ctx.fonts().iter().filter_map(|f| f.os2().ok()).collect();
    let union = |f: fn(&ReadOs2) -> u32| tables.iter().fold(0, |acc, t| acc | f(t));
    let union_opt = |f: fn(&ReadOs2) -> Option<u32>| {
        tables.iter().filter_map(f).reduce(|a, b| a | b)
    };

    let mut os2: Os2 = base.to_owned_table();
    os2.ul_unicode_range_1 = union(|t| t.ul_unicode_range_1());
    os2.ul_unicode_range_2 = union(|t| t.ul_unicode_range_2());
    os2.ul_unicode_range_3 = union(|t| t.ul_unicode_range_3());
    os2.ul_unicode_range_4 = union(|t| t.ul_unicode_range_4());
    if os2.ul_code_page_range_1.is_some() {
        os2.ul_code_page_range_1 = union_opt(|t| t.ul_code_page_range_1());
        os2.ul_code_page_range_2 = union_opt(|t| t.ul_code_page_range_2());
    }
    let firsts: Vec<u16> = tables.iter().map(|t| t.us_first_char_index()).collect();
    let lasts: Vec<u16> = tables.iter().map(|t| t.us_last_char_index()).collect();
    os2.us_first_char_index = Strategy::Min.apply(&firsts)?;
    os2.us_last_char_index = Strategy::Max.apply(&lasts)?;
    if os2.us_max_context.is_some() {
        let contexts: Vec<u16> =
            tables.iter().map(|t| t.us_max_context().unwrap_or(0)).collect();
        os2.us_max_context = Some(Strategy::Max.apply(&contexts)?);
    }
    Ok(Some(os2))
}
