//! Removal of triple-glyph code ligatures.

use log::{debug, info};
use read_fonts::{FontRef, TableProvider};
use write_fonts::{from_obj::ToOwnedTable, tables::gsub::Gsub};

use crate::{
    Result, glyph_id, rebuild_font,
    pattern::{PatternMatch, TriplePattern},
    view::{ChainView, LookupView, RuleView, read_lookups, write_lookup_list},
};

/// Glyph whose triple ligature is removed by default (the ```` ``` ```` fence).
pub const DEFAULT_LIGATURE_GLYPH: &str = "grave";

/// Result of [`remove_triple_ligature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LigatureRemoval {
    NoGsub,
    GlyphMissing,
    NotFound,
    Removed { matches: Vec<PatternMatch>, data: Vec<u8> },
}

/// Disable the `X X X` ligature for the glyph named `glyph_name`.
///
/// Coverage-based chaining rules on the pattern keep their context but lose
/// their nested lookup records, and the single substitution
/// `X -> X_X_X.code` is deleted. Other lookups are written back unchanged.
pub fn remove_triple_ligature(data: &[u8], glyph_name: &str) -> Result<LigatureRemoval> {
    let font = FontRef::new(data)?;
    let Ok(gsub) = font.gsub() else {
        return Ok(LigatureRemoval::NoGsub);
    };
    let Some(glyph) = glyph_id(&font, glyph_name) else {
        return Ok(LigatureRemoval::GlyphMissing);
    };
    let code_name = format!("{glyph_name}_{glyph_name}_{glyph_name}.code");
    let pattern = TriplePattern::new(glyph, glyph_id(&font, &code_name));

    let mut lookups = read_lookups(&gsub)?;
    let matches = pattern.find(&lookups);
    if matches.is_empty() {
        return Ok(LigatureRemoval::NotFound);
    }

    for m in &matches {
        debug!("Clearing {m:?}");
        apply(&mut lookups, &pattern, m);
    }
    info!("Removed {} triple-ligature rule(s) for '{glyph_name}'", matches.len());

    let mut owned: Gsub = gsub.to_owned_table();
    owned.lookup_list = write_lookup_list(&lookups).into();
    let data = rebuild_font(&font, &[], |builder| {
        builder.add_table(&owned)?;
        Ok(())
    })?;
    Ok(LigatureRemoval::Removed { matches, data })
}

fn apply(lookups: &mut [LookupView], pattern: &TriplePattern, m: &PatternMatch) {
    match *m {
        PatternMatch::ChainCoverages { lookup, subtable } => {
            if let Some(RuleView::ChainContext(ChainView::Coverages { records, .. })) =
                rule_mut(lookups, lookup, subtable)
            {
                records.clear();
            }
        }
        PatternMatch::ChainGlyphRule { lookup, subtable, entry, rule } => {
            if let Some(RuleView::ChainContext(ChainView::Glyphs(pairs))) =
                rule_mut(lookups, lookup, subtable)
                && let Some(r) = pairs.get_mut(entry).and_then(|(_, rules)| rules.get_mut(rule))
            {
                r.records.clear();
            }
        }
        PatternMatch::SingleMapping { lookup, subtable } => {
            if let Some(RuleView::Single(pairs)) = rule_mut(lookups, lookup, subtable)
                && let Some(code) = pattern.code_glyph
            {
                pairs.retain(|&(from, to)| !(from == pattern.glyph && to == code));
            }
        }
    }
}

fn rule_mut(lookups: &mut [LookupView], lookup: usize, subtable: usize) -> Option<&mut RuleView> {
    lookups.get_mut(lookup)?.rules.get_mut(subtable)
}
