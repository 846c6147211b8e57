//! Unified style definitions for font generation.

mod design;
mod features;
mod instances;

pub use design::{Casual, MONO_STYLES, SANS_STYLES, Slant, Style, Weight, duotone_casl};
pub use features::{MONO_FEATURES, SANS_FEATURES, freeze_options};
pub use instances::{StyleInstances, build_style_instances};
