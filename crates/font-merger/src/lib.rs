//! Merge TrueType fonts into one.
//!
//! The first font is the base: it keeps its glyph ids, wins `cmap`
//! conflicts and contributes `name`, `GPOS`, `GDEF` and the hinting
//! programs. Later fonts add the glyphs it lacks.
//!
//! ```no_run
//! use warpnine_font_merger::{CollisionPolicy, Merger, Options};
//!
//! let latin = std::fs::read("WarpnineMono-Regular.ttf").unwrap();
//! let cjk = std::fs::read("NotoSansMonoCJKjp-Regular.ttf").unwrap();
//! let merger = Merger::new(Options::new().collisions(CollisionPolicy::Rename));
//! let merged = merger.merge(&[&latin, &cjk]).unwrap();
//! ```

mod context;
mod error;
mod glyph_order;
mod merger;
mod options;
mod strategies;
mod tables;
mod types;

pub use context::{GidRemap, MergeContext};
pub use error::{MergeError, Result};
pub use glyph_order::{GlyphName, GlyphOrder, Renamed};
pub use merger::Merger;
pub use options::{CollisionPolicy, Options};
pub use types::{FontIndex, GlyphId, MegaGlyphId};

/// Merge fonts with default options.
pub fn merge_fonts_bytes(fonts: &[&[u8]]) -> Result<Vec<u8>> {
    Merger::default().merge(fonts)
}
