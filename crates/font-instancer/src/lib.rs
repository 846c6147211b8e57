//! # Font Instancer
//!
//! Pin the axes of a TrueType variable font.
//!
//! Pinning every axis yields a static font with no variation tables.
//! Pinning a subset keeps the remaining axes variable: `gvar` tuples are
//! scaled by their scalar on the pinned axes, and `fvar`, `avar` and `STAT`
//! lose the pinned axes.
//!
//! ## Example
//!
//! ```no_run
//! use font_instancer::{instantiate, AxisLocation};
//!
//! let vf_data = std::fs::read("variable.ttf").unwrap();
//! let location = [
//!     AxisLocation::new("wght", 700.0),
//!     AxisLocation::new("wdth", 100.0),
//! ];
//! let instance = instantiate(&vf_data, &location).unwrap();
//! std::fs::write("instance.ttf", instance).unwrap();
//! ```
//!
//! Axes missing from the location stay variable. Use [`instantiate_static`]
//! to pin them at their defaults instead.

mod error;
mod instancer;
mod metrics;
mod outline;
mod pins;
mod variations;

pub use error::{Error, Result};
pub use instancer::{instantiate, instantiate_static};
pub use metrics::wdth_to_width_class;
pub use pins::{Pins, Unlisted};
use read_fonts::types::Tag;

/// Axis location specification (tag + user-space value).
///
/// The value is in user-space coordinates, matching what you'd see in font
/// variation settings. For example, `wght=700` for Bold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLocation {
    pub tag: Tag,
    pub value: f32,
}

impl AxisLocation {
    /// Create a new axis location. Tags shorter than four bytes are padded
    /// with spaces.
    ///
    /// # Example
    ///
    /// ```
    /// use font_instancer::AxisLocation;
    /// let loc = AxisLocation::new("wght", 700.0);
    /// ```
    pub fn new(tag: &str, value: f32) -> Self {
        let mut tag_bytes = [b' '; 4];
        for (dst, src) in tag_bytes.iter_mut().zip(tag.as_bytes().iter()) {
            *dst = *src;
        }
        Self { tag: Tag::new(&tag_bytes), value }
    }
}

impl From<(&str, f32)> for AxisLocation {
    fn from((tag, value): (&str, f32)) -> Self {
        Self::new(tag, value)
    }
}

impl From<(Tag, f32)> for AxisLocation {
    fn from((tag, value): (Tag, f32)) -> Self {
        Self { tag, value }
    }
}
