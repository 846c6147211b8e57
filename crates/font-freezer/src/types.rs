//! Freeze configuration and results.

use std::{
    collections::BTreeSet,
    fmt::{self, Formatter},
};

use read_fonts::types::Tag;

pub(crate) const RVRN: &str = "rvrn";

/// Options controlling how features are frozen into the font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreezeOptions {
    pub features: Vec<String>,
    /// Freeze `rvrn` ahead of the requested features even when it is not listed.
    pub auto_rvrn: bool,
    pub filter: ScriptLangFilter,
    pub suffix: SuffixConfig,
    /// Comma-separated `search/replace` pairs applied to the family name.
    pub replacenames: Option<String>,
    /// Record the frozen features in name ID 5 as well as ID 3.
    pub info: bool,
    /// Drop glyph names by switching `post` to version 3.
    pub zapnames: bool,
    /// Report substitutions between glyphs that have no Unicode value.
    pub warnings: bool,
}

/// Restricts feature resolution to one OpenType script and, optionally, language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptLangFilter {
    pub script: Option<String>,
    pub lang: Option<String>,
}

impl ScriptLangFilter {
    pub fn is_active(&self) -> bool {
        self.script.is_some() || self.lang.is_some()
    }

    pub(crate) fn matches_script(&self, tag: Tag) -> bool {
        self.script.as_deref().is_none_or(|s| tag_matches(tag, s))
    }

    pub(crate) fn matches_lang(&self, tag: Tag) -> bool {
        self.lang.as_deref().is_some_and(|l| tag_matches(tag, l))
    }
}

/// Tags are compared with trailing padding ignored, so `"JAN"` selects `JAN `.
fn tag_matches(tag: Tag, wanted: &str) -> bool {
    tag.to_string().trim_end() == wanted.trim_end()
}

/// How to modify the family name of a frozen font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SuffixConfig {
    #[default]
    None,
    /// Append the sorted feature tags, e.g. `" ss01 zero"`.
    Auto,
    Custom(String),
}

impl SuffixConfig {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn as_string(&self, features: &[String]) -> String {
        match self {
            Self::None => String::new(),
            Self::Custom(s) => format!(" {s}"),
            Self::Auto => {
                let sorted: BTreeSet<_> = features.iter().map(String::as_str).collect();
                format!(" {}", sorted.into_iter().collect::<Vec<_>>().join(" "))
            }
        }
    }
}

impl FreezeOptions {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { features: features.into_iter().map(Into::into).collect(), ..Default::default() }
    }

    pub fn with_auto_rvrn(mut self, on: bool) -> Self {
        self.auto_rvrn = on;
        self
    }

    pub fn with_script(mut self, script: Option<String>) -> Self {
        self.filter.script = script;
        self
    }

    pub fn with_lang(mut self, lang: Option<String>) -> Self {
        self.filter.lang = lang;
        self
    }

    pub fn with_suffix(mut self, suffix: SuffixConfig) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn with_replacenames(mut self, replacements: Option<String>) -> Self {
        self.replacenames = replacements;
        self
    }

    pub fn with_info(mut self, on: bool) -> Self {
        self.info = on;
        self
    }

    pub fn with_zapnames(mut self, on: bool) -> Self {
        self.zapnames = on;
        self
    }

    pub fn with_warnings(mut self, on: bool) -> Self {
        self.warnings = on;
        self
    }

    pub fn wants_name_edits(&self) -> bool {
        self.suffix.is_enabled() || self.replacenames.is_some() || self.info
    }

    pub fn suffix_string(&self) -> String {
        self.suffix.as_string(&self.features)
    }

    /// Requested tags in resolution order: `rvrn` first when it is requested
    /// or `auto_rvrn` is set, then the rest as given. Strings that are not
    /// valid tags are skipped.
    pub fn resolution_order(&self) -> Vec<Tag> {
        let wants_rvrn = self.auto_rvrn || self.features.iter().any(|f| f == RVRN);
        let rest = self.features.iter().filter(|f| f.as_str() != RVRN);
        let ordered: Vec<&str> = wants_rvrn
            .then_some(RVRN)
            .into_iter()
            .chain(rest.map(String::as_str))
            .collect();

        let mut tags = Vec::with_capacity(ordered.len());
        for tag in ordered.into_iter().filter_map(|f| Tag::new_checked(f.as_bytes()).ok()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

/// Result of freezing features into a font.
#[derive(Debug, Clone)]
pub struct FreezeResult {
    pub data: Vec<u8>,
    pub stats: FreezeStats,
    pub warnings: Vec<String>,
    pub remapped_names: Vec<String>,
}

/// Statistics about one freeze.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreezeStats {
    pub features_requested: usize,
    pub lookups_processed: usize,
    pub substitutions_applied: usize,
    /// Codepoints whose cmap entry now points at a different glyph.
    pub codepoints_remapped: usize,
}

impl fmt::Display for FreezeStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frozen {} features from {} lookups, {} substitutions, {} codepoints remapped",
            self.features_requested,
            self.lookups_processed,
            self.substitutions_applied,
            self.codepoints_remapped
        )
    }
}

/// Scripts, languages and features available in a font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontReport {
    pub scripts_langs: Vec<String>,
    pub features: Vec<String>,
}

impl fmt::Display for FontReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Scripts and languages:")?;
        for sl in &self.scripts_langs {
            writeln!(f, "{sl}")?;
        }
        writeln!(f, "# Features:")?;
        write!(f, "-f {}", self.features.join(","))
    }
}
