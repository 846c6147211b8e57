//! Japanese subsetting of CJK fonts through HarfBuzz's hb-subset.
//!
//! Operates purely on byte slices.
//!
//! ```no_run
//! use warpnine_font_subsetter::{Subsetter, subset_japanese};
//!
//! let font_data = std::fs::read("NotoSansMonoCJKjp-Regular.ttf").unwrap();
//! let subset = Subsetter::new()
//!     .with_unicode_ranges([(0x3000, 0x303F)])
//!     .drop_vf_tables(true)
//!     .subset(&font_data)
//!     .unwrap();
//! let japanese = subset_japanese(&font_data).unwrap();
//! ```

use std::fmt::Display;

use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubsetError {
    /// hb-subset rejected the input or failed; `message` is its diagnostic.
    #[error("hb-subset failed to {operation}: {message}")]
    ExternalToolFailure { operation: &'static str, message: String },
}

impl SubsetError {
    fn external(operation: &'static str, err: impl Display) -> Self {
        Self::ExternalToolFailure { operation, message: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, SubsetError>;

/// Variable font tables to drop during subsetting.
///
/// These tables are specific to variable fonts and can be safely removed
/// when creating a static font subset.
pub const VF_TABLES_TO_DROP: &[&[u8; 4]] = &[
    b"HVAR", b"MVAR", b"STAT", b"avar", b"fvar", b"gvar", b"cvar",
];

/// Japanese Unicode ranges for subsetting.
///
/// Includes:
/// - CJK Symbols and Punctuation (U+3000-U+303F)
/// - Hiragana (U+3041-U+3096, U+3099-U+309F)
/// - Katakana (U+30A0-U+30FF)
/// - CJK Unified Ideographs (U+4E00-U+9FFF)
/// - Halfwidth and Fullwidth Forms (U+FF00-U+FFEF)
/// - Kana Extended/Supplement blocks
/// - CJK Extension blocks (A-I)
/// - CJK Compatibility Ideographs
pub const JAPANESE_RANGES: &[(u32, u32)] = &[
    (0x3000, 0x303F),
    (0x3041, 0x3096),
    (0x3099, 0x309F),
    (0x30A0, 0x30FF),
    (0x4E00, 0x9FFF),
    (0xFF00, 0xFFEF),
    (0x1B100, 0x1B12F),
    (0x1AFF0, 0x1AFFF),
    (0x1B000, 0x1B0FF),
    (0x1B130, 0x1B16F),
    (0x3400, 0x4DBF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B739),
    (0x2B740, 0x2B81D),
    (0x2B820, 0x2CEA1),
    (0x2CEB0, 0x2EBE0),
    (0x30000, 0x3134A),
    (0x31350, 0x323AF),
    (0x2EBF0, 0x2EE5D),
    (0xF900, 0xFAFF),
    (0x2F800, 0x2FA1F),
];

/// Layout features to retain during subsetting.
///
/// These OpenType features are commonly used for proper text rendering
/// and should be preserved in the subset font.
pub const LAYOUT_FEATURES: &[&[u8; 4]] = &[
    b"aalt", b"ccmp", b"dlig", b"fwid", b"hwid", b"jp78", b"jp83", b"jp90", b"liga", b"locl",
    b"nlck", b"pwid", b"vert", b"vjmo", b"vrt2", b"halt", b"vhal", b"kern", b"mark", b"mkmk",
];

/// Subsetting options, configured builder-style.
#[derive(Debug, Clone, Default)]
pub struct Subsetter {
    unicode_ranges: Vec<(u32, u32)>,
    drop_vf_tables: bool,
    retain_glyph_names: bool,
    layout_features: Vec<[u8; 4]>,
}

impl Subsetter {
    /// No code points, the standard [`LAYOUT_FEATURES`], variation tables kept.
    pub fn new() -> Self {
        Self {
            layout_features: LAYOUT_FEATURES.iter().map(|f| **f).collect(),
            ..Default::default()
        }
    }

    /// Creates a subsetter pre-configured for Japanese font subsetting.
    ///
    /// This preset:
    /// - Uses [`JAPANESE_RANGES`] for Unicode coverage
    /// - Drops variable font tables
    /// - Retains glyph names
    /// - Uses standard [`LAYOUT_FEATURES`]
    pub fn japanese() -> Self {
        Self {
            unicode_ranges: JAPANESE_RANGES.to_vec(),
            drop_vf_tables: true,
            retain_glyph_names: true,
            layout_features: LAYOUT_FEATURES.iter().map(|f| **f).collect(),
        }
    }

    /// Adds Unicode ranges to include in the subset.
    ///
    /// Each range is a tuple of (start, end) Unicode code points, inclusive.
    pub fn with_unicode_ranges(mut self, ranges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        self.unicode_ranges.extend(ranges);
        self
    }

    /// Sets whether to drop variable font tables.
    ///
    /// When `true`, tables like `fvar`, `gvar`, `avar`, etc. are removed,
    /// converting a variable font to a static font.
    pub fn drop_vf_tables(mut self, drop: bool) -> Self {
        self.drop_vf_tables = drop;
        self
    }

    /// Keep `post` glyph names, which the merger relies on.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    /// Replace the retained layout features.
    pub fn with_layout_features(
        mut self,
        features: impl IntoIterator<Item = [u8; 4]>,
    ) -> Self {
        self.layout_features = features.into_iter().collect();
        self
    }

    /// Subset `data` to the configured code points and features.
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input =
            SubsetInput::new().map_err(|e| SubsetError::external("allocate input", e))?;

        if self.retain_glyph_names {
            input.flags().retain_glyph_names();
        }

        {
            let mut feature_set = input.layout_feature_tag_set();
            for tag in &self.layout_features {
                feature_set.insert(Tag::new(tag));
            }
        }

        {
            let mut unicode_set = input.unicode_set();
            for c in self.code_points() {
                unicode_set.insert(c);
            }
        }

        if self.drop_vf_tables {
            let mut drop_tables = input.drop_table_tag_set();
            for table in VF_TABLES_TO_DROP {
                drop_tables.insert(Tag::new(*table));
            }
        }

        let blob = Blob::from_bytes(data).map_err(|e| SubsetError::external("load font", e))?;
        let font = FontFace::new(blob).map_err(|e| SubsetError::external("parse font", e))?;
        let subset_font =
            input.subset_font(&font).map_err(|e| SubsetError::external("subset font", e))?;
        let out = subset_font.underlying_blob().to_vec();
        debug!("Subset {} bytes to {} bytes", data.len(), out.len());
        Ok(out)
    }

    /// Every valid scalar value in the configured ranges.
    fn code_points(&self) -> impl Iterator<Item = char> + '_ {
        self.unicode_ranges
            .iter()
            .flat_map(|&(start, end)| (start..=end).filter_map(char::from_u32))
    }
}

/// Subset to [`JAPANESE_RANGES`] with the [`Subsetter::japanese`] preset.
pub fn subset_japanese(data: &[u8]) -> Result<Vec<u8>> {
    Subsetter::japanese().subset(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_ordered_pairs() {
        assert_eq!(JAPANESE_RANGES.len(), 21);
        assert!(JAPANESE_RANGES.iter().all(|(start, end)| start <= end));
    }

    #[test]
    fn code_points_skip_surrogates() {
        let subsetter = Subsetter::new().with_unicode_ranges([(0xD7FF, 0xE000)]);
        let code_points: Vec<char> = subsetter.code_points().collect();
        assert_eq!(code_points, ['\u{D7FF}', '\u{E000}']);
    }

    #[test]
    fn builder_chain() {
        let subsetter = Subsetter::new()
            .with_unicode_ranges([(0x0000, 0x007F)])
            .drop_vf_tables(true)
            .retain_glyph_names(true)
            .with_layout_features([*b"kern", *b"liga"]);

        assert!(subsetter.drop_vf_tables);
        assert!(subsetter.retain_glyph_names);
        assert_eq!(subsetter.code_points().count(), 128);
        assert_eq!(subsetter.layout_features.len(), 2);
    }

    #[test]
    fn japanese_preset() {
        let subsetter = Subsetter::japanese();
        assert!(subsetter.drop_vf_tables);
        assert!(subsetter.retain_glyph_names);
        assert_eq!(subsetter.unicode_ranges, JAPANESE_RANGES);
        assert_eq!(subsetter.layout_features.len(), LAYOUT_FEATURES.len());
    }

    #[test]
    fn garbage_input_is_an_external_failure() {
        let result = Subsetter::japanese().subset(b"not a font");
        assert!(matches!(result, Err(SubsetError::ExternalToolFailure { .. })));
    }
}
