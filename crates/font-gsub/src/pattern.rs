//! Matcher for triple-glyph ligature rules such as the ```` ``` ```` code fence.
//!
//! A triple ligature on glyph X is built from a chaining rule that fires on
//! `X` followed by two more `X` (either as coverage lookaheads or as a
//! glyph-keyed input sequence), plus a single substitution `X -> X_X_X.code`
//! that the chaining rule invokes.

use crate::view::{ChainView, LookupView, RuleView};

/// The glyphs that make up one triple ligature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriplePattern {
    /// Glyph id of X.
    pub glyph: u16,
    /// Glyph id of `X_X_X.code`, when the font has it.
    pub code_glyph: Option<u16>,
}

/// A location in the lookup list where the pattern fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch {
    /// Coverage-based chaining subtable (format 3) whose first input covers X
    /// and whose two lookaheads both cover X.
    ChainCoverages { lookup: usize, subtable: usize },
    /// Glyph-keyed chaining rule (format 1) filed under X with input `[X, X]`.
    ChainGlyphRule { lookup: usize, subtable: usize, entry: usize, rule: usize },
    /// Single substitution of X to the code ligature glyph.
    SingleMapping { lookup: usize, subtable: usize },
}

impl TriplePattern {
    pub fn new(glyph: u16, code_glyph: Option<u16>) -> Self {
        Self { glyph, code_glyph }
    }

    /// Every location that still substitutes the pattern. Rules that no
    /// longer invoke any lookup are not reported, so a second pass over an
    /// edited lookup list finds nothing.
    pub fn find(&self, lookups: &[LookupView]) -> Vec<PatternMatch> {
        let mut found = Vec::new();
        for (lookup, view) in lookups.iter().enumerate() {
            for (subtable, rule) in view.rules.iter().enumerate() {
                match rule {
                    RuleView::ChainContext(chain) => {
                        self.match_chain(chain, lookup, subtable, &mut found)
                    }
                    RuleView::Single(pairs) => {
                        if let Some(code) = self.code_glyph
                            && pairs.iter().any(|&(from, to)| from == self.glyph && to == code)
                        {
                            found.push(PatternMatch::SingleMapping { lookup, subtable });
                        }
                    }
                    _ => {}
                }
            }
        }
        found
    }

    fn match_chain(
        &self,
        chain: &ChainView,
        lookup: usize,
        subtable: usize,
        found: &mut Vec<PatternMatch>,
    ) {
        let x = self.glyph;
        match chain {
            ChainView::Coverages { input, lookahead, records, .. } => {
                let first_covers = input.first().is_some_and(|c| c.contains(&x));
                let lookahead_covers = lookahead.len() == 2 && lookahead.iter().all(|c| c.contains(&x));
                if first_covers && lookahead_covers && !records.is_empty() {
                    found.push(PatternMatch::ChainCoverages { lookup, subtable });
                }
            }
            ChainView::Glyphs(pairs) => {
                for (entry, (gid, rules)) in pairs.iter().enumerate() {
                    if *gid != x {
                        continue;
                    }
                    for (rule, r) in rules.iter().enumerate() {
                        if r.input == [x, x] && !r.records.is_empty() {
                            found.push(PatternMatch::ChainGlyphRule { lookup, subtable, entry, rule });
                        }
                    }
                }
            }
            ChainView::Classes { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use read_fonts::tables::layout::LookupFlag;

    use super::*;
    use crate::view::{LookupKind, LookupRecord, SequenceRuleView};

    const GRAVE: u16 = 3;
    const CODE: u16 = 9;

    fn lookup(kind: LookupKind, rules: Vec<RuleView>) -> LookupView {
        LookupView { kind, flag: LookupFlag::empty(), mark_filtering_set: None, rules }
    }

    fn record() -> Vec<LookupRecord> {
        vec![LookupRecord { sequence_index: 0, lookup_index: 1 }]
    }

    #[test]
    fn finds_coverage_chain_with_two_lookaheads() {
        let lookups = vec![lookup(
            LookupKind::ChainContext,
            vec![
                RuleView::ChainContext(ChainView::Coverages {
                    backtrack: vec![],
                    input: vec![vec![GRAVE, 4]],
                    lookahead: vec![vec![GRAVE], vec![GRAVE]],
                    records: record(),
                }),
                RuleView::ChainContext(ChainView::Coverages {
                    backtrack: vec![],
                    input: vec![vec![GRAVE]],
                    lookahead: vec![vec![GRAVE]],
                    records: record(),
                }),
            ],
        )];
        let found = TriplePattern::new(GRAVE, None).find(&lookups);
        assert_eq!(found, vec![PatternMatch::ChainCoverages { lookup: 0, subtable: 0 }]);
    }

    #[test]
    fn ignores_cleared_rules() {
        let lookups = vec![lookup(
            LookupKind::ChainContext,
            vec![RuleView::ChainContext(ChainView::Coverages {
                backtrack: vec![],
                input: vec![vec![GRAVE]],
                lookahead: vec![vec![GRAVE], vec![GRAVE]],
                records: vec![],
            })],
        )];
        assert!(TriplePattern::new(GRAVE, None).find(&lookups).is_empty());
    }

    #[test]
    fn finds_glyph_rule_and_code_mapping() {
        let lookups = vec![
            lookup(
                LookupKind::ChainContext,
                vec![RuleView::ChainContext(ChainView::Glyphs(vec![
                    (2, vec![SequenceRuleView { input: vec![GRAVE, GRAVE], records: record(), ..Default::default() }]),
                    (
                        GRAVE,
                        vec![
                            SequenceRuleView { input: vec![GRAVE], records: record(), ..Default::default() },
                            SequenceRuleView {
                                input: vec![GRAVE, GRAVE],
                                records: record(),
                                ..Default::default()
                            },
                        ],
                    ),
                ]))],
            ),
            lookup(LookupKind::Single, vec![RuleView::Single(vec![(GRAVE, CODE), (4, 5)])]),
        ];
        let found = TriplePattern::new(GRAVE, Some(CODE)).find(&lookups);
        assert_eq!(
            found,
            vec![
                PatternMatch::ChainGlyphRule { lookup: 0, subtable: 0, entry: 1, rule: 1 },
                PatternMatch::SingleMapping { lookup: 1, subtable: 0 },
            ]
        );
    }

    #[test]
    fn mapping_to_other_glyph_is_kept() {
        let lookups =
            vec![lookup(LookupKind::Single, vec![RuleView::Single(vec![(GRAVE, CODE + 1)])])];
        assert!(TriplePattern::new(GRAVE, Some(CODE)).find(&lookups).is_empty());
    }
}
