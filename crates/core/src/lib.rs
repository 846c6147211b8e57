//! Warpnine Core - reusable build pipeline logic for Warpnine fonts.
//!
//! Library crates do the font work; this crate wires them into batch
//! operations and the build pipelines. Every stage takes a [`BuildContext`].

pub mod config;
pub mod context;
pub mod error;
pub mod freeze;
pub mod instance;
pub mod io;
pub mod merge;
pub mod pipeline;
pub mod report;
pub mod styles;
pub mod subset;
pub mod validate;
pub mod warpnine;

pub use context::BuildContext;
pub use error::Error;
pub use pipeline::{
    build_all, build_condensed, build_mono, build_sans, build_warpnine_mono_vf,
    warpnine_mono_designspace,
};
pub use report::{BatchResult, Reporter};
pub use validate::{Check, validate};
pub use styles::{MONO_STYLES, SANS_STYLES, Slant, Style, Weight};
pub use warpnine_font_metadata::{FontNaming, FontVersion, MonospaceSettings};
pub use warpnine_font_subsetter::{JAPANESE_RANGES, Subsetter};
