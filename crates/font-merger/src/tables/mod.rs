//! Table-specific merge implementations

pub mod cmap;
pub mod glyf;
pub mod layout;
pub mod metrics;
pub mod os2;
pub mod post;
