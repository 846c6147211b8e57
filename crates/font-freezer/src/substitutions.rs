//! Collecting one-to-one glyph substitutions from GSUB lookups.

use std::collections::BTreeMap;

use warpnine_font_gsub::{LookupView, RuleView};

/// Accumulated `default glyph -> alternate glyph` pairs.
///
/// Lookups are applied in the order they are fed in. A later substitution of
/// an already-produced glyph is followed through, so `a -> b` then `b -> c`
/// leaves `a -> c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphSubstitutions(BTreeMap<u16, u16>);

impl GlyphSubstitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the single and alternate rules of `lookup` into the map.
    /// Alternate sets contribute their first alternate. Every other lookup
    /// kind is ignored.
    pub fn add_lookup(&mut self, lookup: &LookupView) {
        for rule in &lookup.rules {
            match rule {
                RuleView::Single(pairs) => {
                    for &(from, to) in pairs {
                        self.apply(from, to);
                    }
                }
                RuleView::Alternate(sets) => {
                    for (from, alternates) in sets {
                        if let Some(&to) = alternates.first() {
                            self.apply(*from, to);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    pub fn apply(&mut self, from: u16, to: u16) {
        for target in self.0.values_mut().filter(|v| **v == from) {
            *target = to;
        }
        self.0.entry(from).or_insert(to);
    }

    pub fn remap(&self, gid: u16) -> u16 {
        self.0.get(&gid).copied().unwrap_or(gid)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.0.iter().map(|(&from, &to)| (from, to))
    }
}

#[cfg(test)]
mod tests {
    use read_fonts::tables::layout::LookupFlag;
    use warpnine_font_gsub::LookupKind;

    use super::*;

    fn lookup(kind: LookupKind, rules: Vec<RuleView>) -> LookupView {
        LookupView { kind, flag: LookupFlag::empty(), mark_filtering_set: None, rules }
    }

    #[test]
    fn follows_chained_substitutions() {
        let mut subs = GlyphSubstitutions::new();
        subs.apply(1, 2);
        subs.apply(2, 3);
        assert_eq!(subs.remap(1), 3);
        assert_eq!(subs.remap(2), 3);
        assert_eq!(subs.remap(99), 99);
    }

    #[test]
    fn first_substitution_of_a_glyph_wins() {
        let mut subs = GlyphSubstitutions::new();
        subs.apply(1, 2);
        subs.apply(1, 5);
        assert_eq!(subs.remap(1), 2);
    }

    #[test]
    fn takes_first_alternate_and_skips_ligatures() {
        let mut subs = GlyphSubstitutions::new();
        subs.add_lookup(&lookup(
            LookupKind::Alternate,
            vec![RuleView::Alternate(vec![(4, vec![7, 8]), (5, vec![])])],
        ));
        subs.add_lookup(&lookup(LookupKind::Ligature, vec![RuleView::Ligature(vec![])]));
        assert_eq!(subs.iter().collect::<Vec<_>>(), vec![(4, 7)]);
    }
}
