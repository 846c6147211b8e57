//! # Font Feature Freezer
//!
//! Permanently apply OpenType GSUB features by remapping the cmap table, so
//! that applications without feature support still get the alternates.
//!
//! Only single and alternate substitutions reachable from the requested
//! features are followed; contextual lookups never are. The GSUB table itself
//! is left untouched, which makes freezing the same features twice a no-op
//! for cmap.
//!
//! ## Example
//!
//! ```no_run
//! use font_feature_freezer::{FreezeOptions, freeze};
//!
//! let data = std::fs::read("input.ttf").unwrap();
//! let options = FreezeOptions::new(["ss01", "zero"]).with_auto_rvrn(true);
//! let frozen = freeze(&data, &options).unwrap();
//! std::fs::write("output.ttf", frozen.data).unwrap();
//! ```

mod error;
mod font;
mod substitutions;
mod types;

pub use error::{Error, Result};
pub use font::Font;
pub use substitutions::GlyphSubstitutions;
pub use types::{
    FontReport, FreezeOptions, FreezeResult, FreezeStats, ScriptLangFilter, SuffixConfig,
};

/// Generate a report of available scripts, languages, and features.
pub fn report(data: &[u8]) -> Result<FontReport> {
    Font::new(data)?.report()
}

/// Freeze OpenType features into font data.
pub fn freeze(data: &[u8], options: &FreezeOptions) -> Result<FreezeResult> {
    Font::new(data)?.freeze(options)
}

/// Freeze features with default options, returning the font and statistics.
///
/// Accepts any iterable of string-like items (e.g., `["smcp", "onum"]`, `vec!["ss01"]`).
pub fn freeze_features<I, S>(data: &[u8], features: I) -> Result<(Vec<u8>, FreezeStats)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let options = FreezeOptions::new(features.into_iter().map(|s| s.as_ref().to_owned()));
    freeze(data, &options).map(|r| (r.data, r.stats))
}
