//! Warpnine-specific font operations.

pub mod calt;
pub mod condense;
pub mod ligatures;
pub mod naming;
pub mod sans;
