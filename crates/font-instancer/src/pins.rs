//! Resolution of user-space axis locations against the font's axes.

use log::debug;
use read_fonts::{
    FontRef,
    types::{F2Dot14, Tag},
};
use skrifa::MetadataProvider;

use crate::{
    AxisLocation,
    error::{Error, Result},
};

/// What happens to axes that the requested location does not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unlisted {
    /// The axis stays variable (partial instancing).
    #[default]
    KeepVariable,
    /// The axis is pinned at its default value.
    PinDefault,
}

/// Pinned axes of one instancing request, indexed like `fvar`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pins {
    tags: Vec<Tag>,
    user: Vec<Option<f32>>,
    coords: Vec<F2Dot14>,
}

impl Pins {
    /// Validate `locations` against the font's axes and normalize them.
    ///
    /// Normalization goes through `avar` when the font has one. Values outside
    /// an axis' `[min, max]` are rejected rather than clamped.
    pub fn resolve(font: &FontRef, locations: &[AxisLocation], unlisted: Unlisted) -> Result<Self> {
        let axes = font.axes();
        if axes.is_empty() {
            return Err(Error::NotVariableFont);
        }

        let tags: Vec<Tag> = axes.iter().map(|axis| axis.tag()).collect();
        let mut user: Vec<Option<f32>> = vec![None; tags.len()];

        for loc in locations {
            let Some(index) = tags.iter().position(|t| *t == loc.tag) else {
                return Err(Error::AxisNotFound(loc.tag.to_string()));
            };
            let Some(axis) = axes.get(index) else {
                return Err(Error::AxisNotFound(loc.tag.to_string()));
            };
            if loc.value < axis.min_value() || loc.value > axis.max_value() {
                return Err(Error::AxisOutOfRange {
                    tag: loc.tag.to_string(),
                    value: loc.value,
                    min: axis.min_value(),
                    max: axis.max_value(),
                });
            }
            user[index] = Some(loc.value);
        }

        if unlisted == Unlisted::PinDefault {
            for (slot, axis) in user.iter_mut().zip(axes.iter()) {
                slot.get_or_insert(axis.default_value());
            }
        }

        let settings: Vec<(Tag, f32)> = tags
            .iter()
            .zip(&user)
            .filter_map(|(tag, value)| value.map(|v| (*tag, v)))
            .collect();
        let location = axes.location(settings);
        let coords = location.coords().to_vec();
        debug!("Normalized pins: {:?}", coords.iter().map(|c| c.to_f32()).collect::<Vec<_>>());

        Ok(Self { tags, user, coords })
    }

    pub fn axis_count(&self) -> usize {
        self.tags.len()
    }

    /// Axis tags in `fvar` order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Normalized coordinates with `avar` applied; zero on unpinned axes.
    pub fn coords(&self) -> &[F2Dot14] {
        &self.coords
    }

    pub fn is_pinned(&self, axis: usize) -> bool {
        self.user.get(axis).is_some_and(Option::is_some)
    }

    /// `true` when no axis stays variable.
    pub fn is_full(&self) -> bool {
        self.user.iter().all(Option::is_some)
    }

    /// Pinned user value for `tag`.
    pub fn value(&self, tag: Tag) -> Option<f32> {
        let index = self.tags.iter().position(|t| *t == tag)?;
        self.user[index]
    }

    /// Pinned user value by axis index.
    pub fn value_at(&self, axis: usize) -> Option<f32> {
        self.user.get(axis).copied().flatten()
    }

    /// Indices of the axes that stay variable, in `fvar` order.
    pub fn variable_axes(&self) -> Vec<usize> {
        (0..self.tags.len()).filter(|&i| !self.is_pinned(i)).collect()
    }

    /// Tags of the pinned axes, for log output.
    pub fn describe(&self) -> String {
        self.tags
            .iter()
            .zip(&self.user)
            .filter_map(|(tag, value)| value.map(|v| format!("{tag}={v}")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
