//! CLI command implementations.

mod build;
mod edit;
mod generate;

pub use build::{BuildArgs, ValidateTarget, clean, download, validate};
pub use edit::{
    FreezeArgs, NameArgs, copy_gsub, fix_calt, remove_ligatures, set_monospace, set_version,
};
pub use generate::{
    build_vf, create_condensed, create_sans, instance, merge, merge_batch, parse_axis,
    subset_japanese,
};
