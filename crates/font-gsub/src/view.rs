//! Owned, typed view of GSUB lookups.
//!
//! Lookups are lifted out of the binary table into plain vectors of glyph ids
//! so they can be inspected, edited, remapped and written back with
//! `write-fonts` constructors. Extension lookups are unwrapped on read; the
//! writer promotes lookups to extensions again when offsets overflow.

use std::collections::{BTreeMap, BTreeSet};

use font_types::{BigEndian, GlyphId16};
use read_fonts::{
    ReadError,
    tables::{
        gsub::{
            Gsub as ReadGsub, SingleSubst as ReadSingleSubst, SubstitutionLookup as ReadLookup,
            SubstitutionSubtables,
        },
        layout::{
            ChainedSequenceContext as ReadChainContext, ClassDef as ReadClassDef,
            CoverageTable as ReadCoverage, LookupFlag, SequenceContext as ReadContext,
            SequenceLookupRecord as ReadLookupRecord,
        },
    },
};
use write_fonts::tables::{
    gsub::{
        AlternateSet, AlternateSubstFormat1, Ligature, LigatureSet, LigatureSubstFormat1,
        MultipleSubstFormat1, ReverseChainSingleSubstFormat1, Sequence, SingleSubst,
        SubstitutionChainContext, SubstitutionLookup, SubstitutionLookupList,
        SubstitutionSequenceContext,
    },
    layout::{
        ChainedClassSequenceRule, ChainedClassSequenceRuleSet, ChainedSequenceContext,
        ChainedSequenceContextFormat1, ChainedSequenceContextFormat2,
        ChainedSequenceContextFormat3, ChainedSequenceRule, ChainedSequenceRuleSet, ClassDef,
        ClassSequenceRule, ClassSequenceRuleSet, CoverageTable, Lookup, SequenceContext,
        SequenceContextFormat1, SequenceContextFormat2, SequenceContextFormat3,
        SequenceLookupRecord, SequenceRule, SequenceRuleSet,
    },
};

use crate::Result;

/// GSUB lookup types, with extension lookups folded into the type they wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Single,
    Multiple,
    Alternate,
    Ligature,
    Context,
    ChainContext,
    Reverse,
}

/// A nested lookup invocation inside a contextual rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupRecord {
    pub sequence_index: u16,
    pub lookup_index: u16,
}

/// One glyph- or class-keyed contextual rule.
///
/// `input` excludes the first position, which is implied by the coverage
/// entry (or class) the rule is filed under. Values are glyph ids for
/// glyph-keyed subtables and class ids for class-keyed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceRuleView {
    pub backtrack: Vec<u16>,
    pub input: Vec<u16>,
    pub lookahead: Vec<u16>,
    pub records: Vec<LookupRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigatureView {
    pub glyph: u16,
    pub components: Vec<u16>,
}

/// A contextual (type 5) subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextView {
    Glyphs(Vec<(u16, Vec<SequenceRuleView>)>),
    Classes {
        coverage: Vec<u16>,
        input_classes: Vec<(u16, u16)>,
        rule_sets: Vec<Option<Vec<SequenceRuleView>>>,
    },
    Coverages {
        input: Vec<Vec<u16>>,
        records: Vec<LookupRecord>,
    },
}

/// A chaining contextual (type 6) subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainView {
    Glyphs(Vec<(u16, Vec<SequenceRuleView>)>),
    Classes {
        coverage: Vec<u16>,
        backtrack_classes: Vec<(u16, u16)>,
        input_classes: Vec<(u16, u16)>,
        lookahead_classes: Vec<(u16, u16)>,
        rule_sets: Vec<Option<Vec<SequenceRuleView>>>,
    },
    Coverages {
        backtrack: Vec<Vec<u16>>,
        input: Vec<Vec<u16>>,
        lookahead: Vec<Vec<u16>>,
        records: Vec<LookupRecord>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseView {
    pub substitutions: Vec<(u16, u16)>,
    pub backtrack: Vec<Vec<u16>>,
    pub lookahead: Vec<Vec<u16>>,
}

/// One subtable of a lookup. Glyph-keyed data is stored as `(glyph, value)`
/// pairs in coverage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleView {
    Single(Vec<(u16, u16)>),
    Multiple(Vec<(u16, Vec<u16>)>),
    Alternate(Vec<(u16, Vec<u16>)>),
    Ligature(Vec<(u16, Vec<LigatureView>)>),
    Context(ContextView),
    ChainContext(ChainView),
    Reverse(ReverseView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupView {
    pub kind: LookupKind,
    pub flag: LookupFlag,
    pub mark_filtering_set: Option<u16>,
    pub rules: Vec<RuleView>,
}

/// Read every lookup of `gsub` in lookup-list order.
pub fn read_lookups(gsub: &ReadGsub) -> Result<Vec<LookupView>> {
    let lookup_list = gsub.lookup_list()?;
    lookup_list.lookups().iter().map(|lookup| LookupView::from_read(&lookup?)).collect()
}

/// Compile views into a lookup list. Every view produces exactly one lookup,
/// so lookup indices are preserved even for lookups left without rules.
pub fn write_lookup_list(lookups: &[LookupView]) -> SubstitutionLookupList {
    SubstitutionLookupList::new(lookups.iter().map(LookupView::to_write).collect())
}

impl LookupView {
    pub fn from_read(lookup: &ReadLookup) -> Result<Self> {
        let flag = lookup.lookup_flag();
        let mark_filtering_set = lookup.mark_filtering_set();
        let (kind, rules) = match lookup.subtables()? {
            SubstitutionSubtables::Single(tables) => (
                LookupKind::Single,
                tables.iter().map(|t| read_single(&t?)).collect::<Result<_>>()?,
            ),
            SubstitutionSubtables::Multiple(tables) => {
                let mut rules = Vec::new();
                for table in tables.iter() {
                    let table = table?;
                    let mut pairs = Vec::new();
                    for (gid, seq) in coverage_glyphs(&table.coverage()?)
                        .into_iter()
                        .zip(table.sequences().iter())
                    {
                        pairs.push((gid, glyphs(seq?.substitute_glyph_ids())));
                    }
                    rules.push(RuleView::Multiple(pairs));
                }
                (LookupKind::Multiple, rules)
            }
            SubstitutionSubtables::Alternate(tables) => {
                let mut rules = Vec::new();
                for table in tables.iter() {
                    let table = table?;
                    let mut pairs = Vec::new();
                    for (gid, set) in coverage_glyphs(&table.coverage()?)
                        .into_iter()
                        .zip(table.alternate_sets().iter())
                    {
                        pairs.push((gid, glyphs(set?.alternate_glyph_ids())));
                    }
                    rules.push(RuleView::Alternate(pairs));
                }
                (LookupKind::Alternate, rules)
            }
            SubstitutionSubtables::Ligature(tables) => {
                let mut rules = Vec::new();
                for table in tables.iter() {
                    let table = table?;
                    let mut pairs = Vec::new();
                    for (gid, set) in coverage_glyphs(&table.coverage()?)
                        .into_iter()
                        .zip(table.ligature_sets().iter())
                    {
                        let mut ligatures = Vec::new();
                        for lig in set?.ligatures().iter() {
                            let lig = lig?;
                            ligatures.push(LigatureView {
                                glyph: lig.ligature_glyph().to_u16(),
                                components: glyphs(lig.component_glyph_ids()),
                            });
                        }
                        pairs.push((gid, ligatures));
                    }
                    rules.push(RuleView::Ligature(pairs));
                }
                (LookupKind::Ligature, rules)
            }
            SubstitutionSubtables::Contextual(tables) => (
                LookupKind::Context,
                tables
                    .iter()
                    .map(|t| Ok(RuleView::Context(read_context(&t?)?)))
                    .collect::<Result<_>>()?,
            ),
            SubstitutionSubtables::ChainContextual(tables) => (
                LookupKind::ChainContext,
                tables
                    .iter()
                    .map(|t| Ok(RuleView::ChainContext(read_chain(&t?)?)))
                    .collect::<Result<_>>()?,
            ),
            SubstitutionSubtables::Reverse(tables) => {
                let mut rules = Vec::new();
                for table in tables.iter() {
                    let table = table?;
                    let substitutions = coverage_glyphs(&table.coverage()?)
                        .into_iter()
                        .zip(table.substitute_glyph_ids().iter().map(|g| g.get().to_u16()))
                        .collect();
                    let backtrack = read_coverages(table.backtrack_coverages().iter())?;
                    let lookahead = read_coverages(table.lookahead_coverages().iter())?;
                    rules.push(RuleView::Reverse(ReverseView { substitutions, backtrack, lookahead }));
                }
                (LookupKind::Reverse, rules)
            }
        };
        Ok(Self { kind, flag, mark_filtering_set, rules })
    }

    /// Compile back into a `write-fonts` lookup.
    pub fn to_write(&self) -> SubstitutionLookup {
        match self.kind {
            LookupKind::Single => SubstitutionLookup::Single(self.lookup(|rule| match rule {
                RuleView::Single(pairs) => {
                    let (coverage, targets) = sorted_pairs(pairs.clone());
                    Some(SingleSubst::format_2(coverage, gids(&targets)))
                }
                _ => None,
            })),
            LookupKind::Multiple => SubstitutionLookup::Multiple(self.lookup(|rule| match rule {
                RuleView::Multiple(pairs) => {
                    let (coverage, seqs) = sorted_pairs(pairs.clone());
                    let seqs = seqs.iter().map(|s| Sequence::new(gids(s))).collect();
                    Some(MultipleSubstFormat1::new(coverage, seqs))
                }
                _ => None,
            })),
            LookupKind::Alternate => SubstitutionLookup::Alternate(self.lookup(|rule| match rule {
                RuleView::Alternate(pairs) => {
                    let (coverage, sets) = sorted_pairs(pairs.clone());
                    let sets = sets.iter().map(|s| AlternateSet::new(gids(s))).collect();
                    Some(AlternateSubstFormat1::new(coverage, sets))
                }
                _ => None,
            })),
            LookupKind::Ligature => SubstitutionLookup::Ligature(self.lookup(|rule| match rule {
                RuleView::Ligature(pairs) => {
                    let (coverage, sets) = sorted_pairs(pairs.clone());
                    let sets = sets
                        .iter()
                        .map(|ligs| {
                            LigatureSet::new(
                                ligs.iter()
                                    .map(|l| {
                                        Ligature::new(GlyphId16::new(l.glyph), gids(&l.components))
                                    })
                                    .collect(),
                            )
                        })
                        .collect();
                    Some(LigatureSubstFormat1::new(coverage, sets))
                }
                _ => None,
            })),
            LookupKind::Context => SubstitutionLookup::Contextual(self.lookup(|rule| match rule {
                RuleView::Context(ctx) => Some(write_context(ctx)),
                _ => None,
            })),
            LookupKind::ChainContext => {
                SubstitutionLookup::ChainContextual(self.lookup(|rule| match rule {
                    RuleView::ChainContext(chain) => Some(write_chain(chain)),
                    _ => None,
                }))
            }
            LookupKind::Reverse => SubstitutionLookup::Reverse(self.lookup(|rule| match rule {
                RuleView::Reverse(rev) => {
                    let (coverage, substitutes) = sorted_pairs(rev.substitutions.clone());
                    Some(ReverseChainSingleSubstFormat1::new(
                        coverage,
                        rev.backtrack.iter().map(|c| coverage_table(c.iter().copied())).collect(),
                        rev.lookahead.iter().map(|c| coverage_table(c.iter().copied())).collect(),
                        gids(&substitutes),
                    ))
                }
                _ => None,
            })),
        }
    }

    fn lookup<T: Default>(&self, convert: impl Fn(&RuleView) -> Option<T>) -> Lookup<T> {
        let mut lookup = Lookup::new(self.flag, self.rules.iter().filter_map(convert).collect());
        lookup.mark_filtering_set = self.mark_filtering_set;
        lookup
    }

    /// Rewrite every glyph id through `map`. Entries that reference a glyph
    /// without a mapping are dropped.
    pub fn remap_glyphs(&mut self, map: &impl Fn(u16) -> Option<u16>) {
        for rule in &mut self.rules {
            rule.remap_glyphs(map);
        }
    }

    /// Add `offset` to every nested lookup index.
    pub fn offset_lookups(&mut self, offset: u16) {
        for rule in &mut self.rules {
            for record in rule.records_mut() {
                record.lookup_index += offset;
            }
        }
    }

    /// `true` when no subtable carries any data.
    pub fn is_empty(&self) -> bool {
        self.rules.iter().all(RuleView::is_empty)
    }
}

impl RuleView {
    fn is_empty(&self) -> bool {
        match self {
            RuleView::Single(p) => p.is_empty(),
            RuleView::Multiple(p) | RuleView::Alternate(p) => p.is_empty(),
            RuleView::Ligature(p) => p.is_empty(),
            RuleView::Context(ContextView::Glyphs(p)) | RuleView::ChainContext(ChainView::Glyphs(p)) => {
                p.is_empty()
            }
            RuleView::Context(ContextView::Classes { coverage, .. })
            | RuleView::ChainContext(ChainView::Classes { coverage, .. }) => coverage.is_empty(),
            RuleView::Context(ContextView::Coverages { input, .. })
            | RuleView::ChainContext(ChainView::Coverages { input, .. }) => {
                input.iter().any(Vec::is_empty)
            }
            RuleView::Reverse(r) => r.substitutions.is_empty(),
        }
    }

    fn records_mut(&mut self) -> Vec<&mut LookupRecord> {
        let mut out = Vec::new();
        match self {
            RuleView::Context(ContextView::Glyphs(pairs))
            | RuleView::ChainContext(ChainView::Glyphs(pairs)) => {
                for (_, rules) in pairs {
                    for rule in rules {
                        out.extend(rule.records.iter_mut());
                    }
                }
            }
            RuleView::Context(ContextView::Classes { rule_sets, .. })
            | RuleView::ChainContext(ChainView::Classes { rule_sets, .. }) => {
                for rule in rule_sets.iter_mut().flatten().flatten() {
                    out.extend(rule.records.iter_mut());
                }
            }
            RuleView::Context(ContextView::Coverages { records, .. })
            | RuleView::ChainContext(ChainView::Coverages { records, .. }) => {
                out.extend(records.iter_mut());
            }
            _ => {}
        }
        out
    }

    fn remap_glyphs(&mut self, map: &impl Fn(u16) -> Option<u16>) {
        match self {
            RuleView::Single(pairs) => {
                *pairs = pairs.iter().filter_map(|(g, t)| Some((map(*g)?, map(*t)?))).collect();
            }
            RuleView::Multiple(pairs) | RuleView::Alternate(pairs) => {
                *pairs = pairs
                    .iter()
                    .filter_map(|(g, seq)| Some((map(*g)?, remap_all(seq, map)?)))
                    .collect();
            }
            RuleView::Ligature(pairs) => {
                *pairs = pairs
                    .iter()
                    .filter_map(|(g, ligs)| {
                        let ligs = ligs
                            .iter()
                            .filter_map(|l| {
                                Some(LigatureView {
                                    glyph: map(l.glyph)?,
                                    components: remap_all(&l.components, map)?,
                                })
                            })
                            .collect();
                        Some((map(*g)?, ligs))
                    })
                    .collect();
            }
            RuleView::Context(ContextView::Glyphs(pairs))
            | RuleView::ChainContext(ChainView::Glyphs(pairs)) => {
                *pairs = pairs
                    .iter()
                    .filter_map(|(g, rules)| {
                        let rules = rules
                            .iter()
                            .filter_map(|r| {
                                Some(SequenceRuleView {
                                    backtrack: remap_all(&r.backtrack, map)?,
                                    input: remap_all(&r.input, map)?,
                                    lookahead: remap_all(&r.lookahead, map)?,
                                    records: r.records.clone(),
                                })
                            })
                            .collect();
                        Some((map(*g)?, rules))
                    })
                    .collect();
            }
            RuleView::Context(ContextView::Classes { coverage, input_classes, .. }) => {
                remap_set(coverage, map);
                remap_classes(input_classes, map);
            }
            RuleView::ChainContext(ChainView::Classes {
                coverage,
                backtrack_classes,
                input_classes,
                lookahead_classes,
                ..
            }) => {
                remap_set(coverage, map);
                remap_classes(backtrack_classes, map);
                remap_classes(input_classes, map);
                remap_classes(lookahead_classes, map);
            }
            RuleView::Context(ContextView::Coverages { input, .. }) => {
                input.iter_mut().for_each(|c| remap_set(c, map));
            }
            RuleView::ChainContext(ChainView::Coverages { backtrack, input, lookahead, .. }) => {
                for cov in backtrack.iter_mut().chain(input.iter_mut()).chain(lookahead.iter_mut()) {
                    remap_set(cov, map);
                }
            }
            RuleView::Reverse(rev) => {
                rev.substitutions = rev
                    .substitutions
                    .iter()
                    .filter_map(|(g, t)| Some((map(*g)?, map(*t)?)))
                    .collect();
                for cov in rev.backtrack.iter_mut().chain(rev.lookahead.iter_mut()) {
                    remap_set(cov, map);
                }
            }
        }
    }
}

fn remap_all(glyphs: &[u16], map: &impl Fn(u16) -> Option<u16>) -> Option<Vec<u16>> {
    glyphs.iter().map(|g| map(*g)).collect()
}

fn remap_set(glyphs: &mut Vec<u16>, map: &impl Fn(u16) -> Option<u16>) {
    *glyphs = glyphs.iter().filter_map(|g| map(*g)).collect();
}

fn remap_classes(classes: &mut Vec<(u16, u16)>, map: &impl Fn(u16) -> Option<u16>) {
    *classes = classes.iter().filter_map(|(g, c)| Some((map(*g)?, *c))).collect();
}

pub(crate) fn coverage_glyphs(coverage: &ReadCoverage) -> Vec<u16> {
    coverage.iter().map(|gid| gid.to_u32() as u16).collect()
}

fn read_coverages<'a>(
    coverages: impl Iterator<Item = std::result::Result<ReadCoverage<'a>, ReadError>>,
) -> Result<Vec<Vec<u16>>> {
    coverages.map(|c| Ok(coverage_glyphs(&c?))).collect()
}

fn glyphs(array: &[BigEndian<GlyphId16>]) -> Vec<u16> {
    array.iter().map(|g| g.get().to_u16()).collect()
}

fn classes(array: &[BigEndian<u16>]) -> Vec<u16> {
    array.iter().map(|c| c.get()).collect()
}

fn read_records(records: &[ReadLookupRecord]) -> Vec<LookupRecord> {
    records
        .iter()
        .map(|r| LookupRecord {
            sequence_index: r.sequence_index(),
            lookup_index: r.lookup_list_index(),
        })
        .collect()
}

fn read_class_def(class_def: &ReadClassDef) -> Vec<(u16, u16)> {
    class_def.iter().map(|(gid, class)| (gid.to_u32() as u16, class)).collect()
}

fn read_single(table: &ReadSingleSubst) -> Result<RuleView> {
    let pairs = match table {
        ReadSingleSubst::Format1(f1) => {
            let delta = f1.delta_glyph_id() as i32;
            coverage_glyphs(&f1.coverage()?)
                .into_iter()
                .map(|gid| (gid, ((gid as i32 + delta) & 0xFFFF) as u16))
                .collect()
        }
        ReadSingleSubst::Format2(f2) => coverage_glyphs(&f2.coverage()?)
            .into_iter()
            .zip(f2.substitute_glyph_ids().iter().map(|g| g.get().to_u16()))
            .collect(),
    };
    Ok(RuleView::Single(pairs))
}

fn read_context(table: &ReadContext) -> Result<ContextView> {
    Ok(match table {
        ReadContext::Format1(f1) => {
            let mut pairs = Vec::new();
            for (gid, set) in coverage_glyphs(&f1.coverage()?).into_iter().zip(f1.seq_rule_sets().iter())
            {
                let mut rules = Vec::new();
                if let Some(set) = set.transpose()? {
                    for rule in set.seq_rules().iter() {
                        let rule = rule?;
                        rules.push(SequenceRuleView {
                            input: glyphs(rule.input_sequence()),
                            records: read_records(rule.seq_lookup_records()),
                            ..Default::default()
                        });
                    }
                }
                pairs.push((gid, rules));
            }
            ContextView::Glyphs(pairs)
        }
        ReadContext::Format2(f2) => {
            let mut rule_sets = Vec::new();
            for set in f2.class_seq_rule_sets().iter() {
                let Some(set) = set.transpose()? else {
                    rule_sets.push(None);
                    continue;
                };
                let mut rules = Vec::new();
                for rule in set.class_seq_rules().iter() {
                    let rule = rule?;
                    rules.push(SequenceRuleView {
                        input: classes(rule.input_sequence()),
                        records: read_records(rule.seq_lookup_records()),
                        ..Default::default()
                    });
                }
                rule_sets.push(Some(rules));
            }
            ContextView::Classes {
                coverage: coverage_glyphs(&f2.coverage()?),
                input_classes: read_class_def(&f2.class_def()?),
                rule_sets,
            }
        }
        ReadContext::Format3(f3) => ContextView::Coverages {
            input: read_coverages(f3.coverages().iter())?,
            records: read_records(f3.seq_lookup_records()),
        },
    })
}

fn read_chain(table: &ReadChainContext) -> Result<ChainView> {
    Ok(match table {
        ReadChainContext::Format1(f1) => {
            let mut pairs = Vec::new();
            for (gid, set) in coverage_glyphs(&f1.coverage()?)
                .into_iter()
                .zip(f1.chained_seq_rule_sets().iter())
            {
                let mut rules = Vec::new();
                if let Some(set) = set.transpose()? {
                    for rule in set.chained_seq_rules().iter() {
                        let rule = rule?;
                        rules.push(SequenceRuleView {
                            backtrack: glyphs(rule.backtrack_sequence()),
                            input: glyphs(rule.input_sequence()),
                            lookahead: glyphs(rule.lookahead_sequence()),
                            records: read_records(rule.seq_lookup_records()),
                        });
                    }
                }
                pairs.push((gid, rules));
            }
            ChainView::Glyphs(pairs)
        }
        ReadChainContext::Format2(f2) => {
            let mut rule_sets = Vec::new();
            for set in f2.chained_class_seq_rule_sets().iter() {
                let Some(set) = set.transpose()? else {
                    rule_sets.push(None);
                    continue;
                };
                let mut rules = Vec::new();
                for rule in set.chained_class_seq_rules().iter() {
                    let rule = rule?;
                    rules.push(SequenceRuleView {
                        backtrack: classes(rule.backtrack_sequence()),
                        input: classes(rule.input_sequence()),
                        lookahead: classes(rule.lookahead_sequence()),
                        records: read_records(rule.seq_lookup_records()),
                    });
                }
                rule_sets.push(Some(rules));
            }
            ChainView::Classes {
                coverage: coverage_glyphs(&f2.coverage()?),
                backtrack_classes: read_class_def(&f2.backtrack_class_def()?),
                input_classes: read_class_def(&f2.input_class_def()?),
                lookahead_classes: read_class_def(&f2.lookahead_class_def()?),
                rule_sets,
            }
        }
        ReadChainContext::Format3(f3) => ChainView::Coverages {
            backtrack: read_coverages(f3.backtrack_coverages().iter())?,
            input: read_coverages(f3.input_coverages().iter())?,
            lookahead: read_coverages(f3.lookahead_coverages().iter())?,
            records: read_records(f3.seq_lookup_records()),
        },
    })
}

fn gids(glyphs: &[u16]) -> Vec<GlyphId16> {
    glyphs.iter().copied().map(GlyphId16::new).collect()
}

/// Format 1 coverage over the sorted, deduplicated glyph set.
pub(crate) fn coverage_table(glyphs: impl IntoIterator<Item = u16>) -> CoverageTable {
    let set: BTreeSet<u16> = glyphs.into_iter().collect();
    CoverageTable::format_1(set.into_iter().map(GlyphId16::new).collect())
}

/// Sort glyph-keyed pairs into coverage order. The first entry wins when a
/// glyph appears twice.
fn sorted_pairs<T>(pairs: Vec<(u16, T)>) -> (CoverageTable, Vec<T>) {
    let mut sorted = BTreeMap::new();
    for (gid, value) in pairs {
        sorted.entry(gid).or_insert(value);
    }
    let (glyphs, values): (Vec<u16>, Vec<T>) = sorted.into_iter().unzip();
    (CoverageTable::format_1(gids(&glyphs)), values)
}

fn write_records(records: &[LookupRecord]) -> Vec<SequenceLookupRecord> {
    records
        .iter()
        .map(|r| SequenceLookupRecord::new(r.sequence_index, r.lookup_index))
        .collect()
}

fn write_class_def(classes: &[(u16, u16)]) -> ClassDef {
    ClassDef::from_iter(classes.iter().map(|(g, c)| (GlyphId16::new(*g), *c)))
}

fn write_context(ctx: &ContextView) -> SubstitutionSequenceContext {
    let table = match ctx {
        ContextView::Glyphs(pairs) => {
            let (coverage, sets) = sorted_pairs(pairs.clone());
            let sets = sets
                .into_iter()
                .map(|rules| {
                    (!rules.is_empty()).then(|| {
                        SequenceRuleSet::new(
                            rules
                                .iter()
                                .map(|r| SequenceRule::new(gids(&r.input), write_records(&r.records)))
                                .collect(),
                        )
                    })
                })
                .collect();
            SequenceContext::Format1(SequenceContextFormat1::new(coverage, sets))
        }
        ContextView::Classes { coverage, input_classes, rule_sets } => {
            let sets = rule_sets
                .iter()
                .map(|set| {
                    set.as_ref().map(|rules| {
                        ClassSequenceRuleSet::new(
                            rules
                                .iter()
                                .map(|r| {
                                    ClassSequenceRule::new(r.input.clone(), write_records(&r.records))
                                })
                                .collect(),
                        )
                    })
                })
                .collect();
            SequenceContext::Format2(SequenceContextFormat2::new(
                coverage_table(coverage.iter().copied()),
                write_class_def(input_classes),
                sets,
            ))
        }
        ContextView::Coverages { input, records } => {
            SequenceContext::Format3(SequenceContextFormat3::new(
                input.iter().map(|c| coverage_table(c.iter().copied())).collect(),
                write_records(records),
            ))
        }
    };
    SubstitutionSequenceContext::from(table)
}

fn write_chain(chain: &ChainView) -> SubstitutionChainContext {
    let table = match chain {
        ChainView::Glyphs(pairs) => {
            let (coverage, sets) = sorted_pairs(pairs.clone());
            let sets = sets
                .into_iter()
                .map(|rules| {
                    (!rules.is_empty()).then(|| {
                        ChainedSequenceRuleSet::new(
                            rules
                                .iter()
                                .map(|r| {
                                    ChainedSequenceRule::new(
                                        gids(&r.backtrack),
                                        gids(&r.input),
                                        gids(&r.lookahead),
                                        write_records(&r.records),
                                    )
                                })
                                .collect(),
                        )
                    })
                })
                .collect();
            ChainedSequenceContext::Format1(ChainedSequenceContextFormat1::new(coverage, sets))
        }
        ChainView::Classes {
            coverage,
            backtrack_classes,
            input_classes,
            lookahead_classes,
            rule_sets,
        } => {
            let sets = rule_sets
                .iter()
                .map(|set| {
                    set.as_ref().map(|rules| {
                        ChainedClassSequenceRuleSet::new(
                            rules
                                .iter()
                                .map(|r| {
                                    ChainedClassSequenceRule::new(
                                        r.backtrack.clone(),
                                        r.input.clone(),
                                        r.lookahead.clone(),
                                        write_records(&r.records),
                                    )
                                })
                                .collect(),
                        )
                    })
                })
                .collect();
            ChainedSequenceContext::Format2(ChainedSequenceContextFormat2::new(
                coverage_table(coverage.iter().copied()),
                write_class_def(backtrack_classes),
                write_class_def(input_classes),
                write_class_def(lookahead_classes),
                sets,
            ))
        }
        ChainView::Coverages { backtrack, input, lookahead, records } => {
            let covs = |list: &[Vec<u16>]| -> Vec<CoverageTable> {
                list.iter().map(|c| coverage_table(c.iter().copied())).collect()
            };
            ChainedSequenceContext::Format3(ChainedSequenceContextFormat3::new(
                covs(backtrack),
                covs(input),
                covs(lookahead),
                write_records(records),
            ))
        }
    };
    SubstitutionChainContext::from(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_lookup() -> LookupView {
        LookupView {
            kind: LookupKind::ChainContext,
            flag: LookupFlag::empty(),
            mark_filtering_set: None,
            rules: vec![RuleView::ChainContext(ChainView::Coverages {
                backtrack: vec![],
                input: vec![vec![5]],
                lookahead: vec![vec![5], vec![5]],
                records: vec![LookupRecord { sequence_index: 0, lookup_index: 2 }],
            })],
        }
    }

    #[test]
    fn offsets_nested_lookup_indices() {
        let mut lookup = chain_lookup();
        lookup.offset_lookups(10);
        let RuleView::ChainContext(ChainView::Coverages { records, .. }) = &lookup.rules[0] else {
            panic!("unexpected rule shape");
        };
        assert_eq!(records[0].lookup_index, 12);
    }

    #[test]
    fn remap_drops_unmapped_entries() {
        let mut lookup = LookupView {
            kind: LookupKind::Single,
            flag: LookupFlag::empty(),
            mark_filtering_set: None,
            rules: vec![RuleView::Single(vec![(1, 2), (3, 4)])],
        };
        lookup.remap_glyphs(&|g| (g != 4).then_some(g + 100));
        assert_eq!(lookup.rules[0], RuleView::Single(vec![(101, 102)]));
    }

    #[test]
    fn emptiness_tracks_rule_data() {
        let lookup = LookupView {
            kind: LookupKind::Single,
            flag: LookupFlag::empty(),
            mark_filtering_set: None,
            rules: vec![RuleView::Single(vec![])],
        };
        assert!(lookup.is_empty());
        assert!(!chain_lookup().is_empty());
    }
}
