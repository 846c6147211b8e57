//! Designspace model for variable font building.
//!
//! Every location (source, instance, axis bounds) is given in user
//! coordinates. An axis `map` sends user coordinates to design coordinates;
//! masters are placed by their design coordinates and the map itself ends up
//! in `avar`.

use std::{collections::HashMap, path::PathBuf};

use read_fonts::types::{F2Dot14, Tag};
use warpnine_font_ops::avar::SegmentMap;

use crate::error::{Error, Incompatibility, Result};

/// A variation axis in the designspace.
#[derive(Debug, Clone)]
pub struct Axis {
    /// Four-character axis tag (e.g., "wght", "ital")
    pub tag: String,
    /// Human-readable axis name
    pub name: String,
    pub minimum: f32,
    pub default: f32,
    pub maximum: f32,
    /// `(user, design)` pairs, sorted by user value. Empty means identity.
    pub map: Vec<(f32, f32)>,
}

impl Axis {
    pub fn new(tag: &str, name: &str, minimum: f32, default: f32, maximum: f32) -> Self {
        Self {
            tag: tag.to_string(),
            name: name.to_string(),
            minimum,
            default,
            maximum,
            map: Vec::new(),
        }
    }

    /// Standard weight axis (wght: 100-900, default 400).
    pub fn weight() -> Self {
        Self::new("wght", "Weight", 100.0, 400.0, 900.0)
    }

    /// Standard italic axis (ital: 0-1, default 0).
    pub fn italic() -> Self {
        Self::new("ital", "Italic", 0.0, 0.0, 1.0)
    }

    /// Attach a user to design coordinate map.
    pub fn with_map(mut self, map: impl IntoIterator<Item = (f32, f32)>) -> Self {
        self.map = map.into_iter().collect();
        self.map.sort_by(|a, b| a.0.total_cmp(&b.0));
        self
    }

    pub fn tag(&self) -> Tag {
        let mut bytes = [b' '; 4];
        for (slot, b) in bytes.iter_mut().zip(self.tag.bytes()) {
            *slot = b;
        }
        Tag::new(&bytes)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.minimum..=self.maximum).contains(&value)
    }

    /// Map a user coordinate to design space, piecewise linearly.
    pub fn map_forward(&self, value: f32) -> f32 {
        let Some((&first, rest)) = self.map.split_first() else {
            return value;
        };
        if value <= first.0 {
            return first.1;
        }
        let mut prev = first;
        for &next in rest {
            if value <= next.0 {
                let span = next.0 - prev.0;
                if span == 0.0 {
                    return next.1;
                }
                return prev.1 + (value - prev.0) / span * (next.1 - prev.1);
            }
            prev = next;
        }
        prev.1
    }

    /// Normalize a user-space value to the range [-1, 1].
    ///
    /// Values below the default normalize to [-1, 0], values above to [0, 1].
    pub fn normalize(&self, value: f32) -> f32 {
        normalize(value, self.minimum, self.default, self.maximum)
    }

    /// Normalize a user-space value by its design coordinate.
    ///
    /// This is where a master sits in the variation space; without a map it
    /// equals [`Axis::normalize`].
    pub fn normalize_design(&self, value: f32) -> f32 {
        normalize(
            self.map_forward(value),
            self.map_forward(self.minimum),
            self.map_forward(self.default),
            self.map_forward(self.maximum),
        )
    }

    /// `true` when the map changes some coordinate.
    pub fn has_map(&self) -> bool {
        self.map.iter().any(|(user, design)| (user - design).abs() > f32::EPSILON)
    }

    /// The `avar` segment map for this axis: normalized user coordinates to
    /// normalized design coordinates, always including -1, 0 and 1.
    pub fn segment_map(&self) -> SegmentMap {
        let mut pairs: Vec<(f32, f32)> = [self.minimum, self.default, self.maximum]
            .into_iter()
            .chain(self.map.iter().map(|(user, _)| *user))
            .filter(|user| self.contains(*user))
            .map(|user| (self.normalize(user), self.normalize_design(user)))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|a, b| (a.0 - b.0).abs() < f32::EPSILON);
        pairs.into_iter().map(|(from, to)| (F2Dot14::from_f32(from), F2Dot14::from_f32(to))).collect()
    }
}

fn normalize(value: f32, minimum: f32, default: f32, maximum: f32) -> f32 {
    let value = value.clamp(minimum, maximum);
    if value < default {
        if default == minimum { 0.0 } else { -((default - value) / (default - minimum)) }
    } else if value > default {
        if default == maximum { 0.0 } else { (value - default) / (maximum - default) }
    } else {
        0.0
    }
}

/// A source (master) font in the designspace.
#[derive(Debug, Clone)]
pub struct Source {
    pub path: PathBuf,
    /// Location as (axis_tag, value) pairs
    pub location: HashMap<String, f32>,
    pub style_name: Option<String>,
}

impl Source {
    pub fn new(
        path: impl Into<PathBuf>,
        location: impl IntoIterator<Item = (&'static str, f32)>,
    ) -> Self {
        Self {
            path: path.into(),
            location: location.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            style_name: None,
        }
    }

    pub fn with_style_name(mut self, name: &str) -> Self {
        self.style_name = Some(name.to_string());
        self
    }

    /// Name used in diagnostics: the style name, or the file name.
    pub fn label(&self) -> String {
        self.style_name.clone().unwrap_or_else(|| self.path.display().to_string())
    }

    /// Value on `axis`, or the axis default when not specified.
    pub fn axis_value(&self, axis: &Axis) -> f32 {
        self.location.get(&axis.tag).copied().unwrap_or(axis.default)
    }

    pub fn normalized_location(&self, axes: &[Axis]) -> Vec<f32> {
        axes.iter().map(|axis| axis.normalize_design(self.axis_value(axis))).collect()
    }
}

/// A named instance in the designspace.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Instance name (e.g., "Bold", "Light Italic")
    pub name: String,
    pub location: HashMap<String, f32>,
}

impl Instance {
    pub fn new(name: &str, location: impl IntoIterator<Item = (&'static str, f32)>) -> Self {
        Self {
            name: name.to_string(),
            location: location.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn axis_value(&self, axis: &Axis) -> f32 {
        self.location.get(&axis.tag).copied().unwrap_or(axis.default)
    }
}

/// Axes, masters and named instances of one variable font.
#[derive(Debug, Clone)]
pub struct DesignSpace {
    pub axes: Vec<Axis>,
    pub sources: Vec<Source>,
    pub instances: Vec<Instance>,
}

impl DesignSpace {
    pub fn new(axes: Vec<Axis>, sources: Vec<Source>) -> Self {
        Self { axes, sources, instances: Vec::new() }
    }

    pub fn with_instances(mut self, instances: Vec<Instance>) -> Self {
        self.instances = instances;
        self
    }

    /// Index of the source sitting at the default location on every axis.
    pub fn default_source_index(&self) -> Option<usize> {
        self.sources.iter().position(|source| {
            self.axes
                .iter()
                .all(|axis| (source.axis_value(axis) - axis.default).abs() < 0.001)
        })
    }

    pub fn default_source(&self) -> Option<&Source> {
        self.default_source_index().map(|idx| &self.sources[idx])
    }

    /// Normalized design location of every source, in source order.
    pub fn master_locations(&self) -> Vec<Vec<f32>> {
        self.sources.iter().map(|source| source.normalized_location(&self.axes)).collect()
    }

    /// Segment maps for `avar`, or `None` when every axis is linear.
    pub fn avar_maps(&self) -> Option<Vec<SegmentMap>> {
        self.axes
            .iter()
            .any(Axis::has_map)
            .then(|| self.axes.iter().map(Axis::segment_map).collect())
    }

    /// Check the axes and the placement of every source.
    pub fn validate(&self) -> Result<()> {
        if self.axes.is_empty() {
            return Err(Error::InvalidDesignspace("at least one axis is required".to_string()));
        }
        if self.sources.is_empty() {
            return Err(Error::InvalidDesignspace("at least one source is required".to_string()));
        }
        for axis in &self.axes {
            if axis.tag.is_empty() || axis.tag.len() > 4 {
                return Err(Error::InvalidDesignspace(format!(
                    "axis tag '{}' must be 1 to 4 characters",
                    axis.tag
                )));
            }
            if !(axis.minimum <= axis.default && axis.default <= axis.maximum) {
                return Err(Error::InvalidDesignspace(format!(
                    "axis '{}' needs min <= default <= max, got {}/{}/{}",
                    axis.tag, axis.minimum, axis.default, axis.maximum
                )));
            }
        }
        for source in &self.sources {
            for axis in &self.axes {
                let value = source.axis_value(axis);
                if !axis.contains(value) {
                    return Err(Error::IncompatibleMasters {
                        master: source.label(),
                        reason: Incompatibility::OutOfRange { axis: axis.tag.clone(), value },
                    });
                }
            }
        }
        if self.default_source_index().is_none() {
            return Err(Error::IncompatibleMasters {
                master: "designspace".to_string(),
                reason: Incompatibility::NoDefault,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_axes() -> Vec<Axis> {
        vec![
            Axis::new("wght", "Weight", 300.0, 400.0, 900.0),
            Axis::new("ital", "Italic", 0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn axis_normalize() {
        let axis = Axis::new("wght", "Weight", 300.0, 400.0, 900.0);

        assert_eq!(axis.normalize(400.0), 0.0);
        assert_eq!(axis.normalize(300.0), -1.0);
        assert_eq!(axis.normalize(900.0), 1.0);
        assert!((axis.normalize(350.0) - (-0.5)).abs() < 0.001);
        assert!((axis.normalize(650.0) - 0.5).abs() < 0.001);
        assert_eq!(axis.normalize(2000.0), 1.0);
    }

    #[test]
    fn mapped_axis_places_masters_by_design_value() {
        let axis = Axis::new("wght", "Weight", 300.0, 400.0, 900.0).with_map([
            (300.0, 300.0),
            (400.0, 400.0),
            (650.0, 500.0),
            (900.0, 900.0),
        ]);

        assert!(axis.has_map());
        assert_eq!(axis.map_forward(650.0), 500.0);
        assert!((axis.map_forward(525.0) - 450.0).abs() < 0.001);
        assert!((axis.normalize_design(650.0) - 0.2).abs() < 0.001);

        let map = axis.segment_map();
        assert_eq!(map.len(), 4);
        assert_eq!(map[0], (F2Dot14::from_f32(-1.0), F2Dot14::from_f32(-1.0)));
        assert_eq!(map[2], (F2Dot14::from_f32(0.5), F2Dot14::from_f32(0.2)));
    }

    #[test]
    fn identity_axes_need_no_avar() {
        let ds = DesignSpace::new(two_axes(), vec![Source::new("a.ttf", [("wght", 400.0)])]);
        assert!(ds.avar_maps().is_none());

        let mapped = Axis::new("wght", "Weight", 300.0, 400.0, 900.0)
            .with_map([(300.0, 300.0), (900.0, 900.0)]);
        assert!(!mapped.has_map());
    }

    #[test]
    fn source_normalized_location() {
        let source = Source::new("test.ttf", vec![("wght", 900.0), ("ital", 1.0)]);
        assert_eq!(source.normalized_location(&two_axes()), vec![1.0, 1.0]);
    }

    #[test]
    fn designspace_default_source() {
        let sources = vec![
            Source::new("Bold.ttf", vec![("wght", 700.0), ("ital", 0.0)]),
            Source::new("Regular.ttf", vec![("wght", 400.0), ("ital", 0.0)]),
        ];

        let ds = DesignSpace::new(two_axes(), sources);

        assert_eq!(ds.default_source_index(), Some(1));
        assert_eq!(ds.default_source().unwrap().path, PathBuf::from("Regular.ttf"));
        assert!(ds.validate().is_ok());
    }

    #[test]
    fn validate_rejects_sources_outside_the_axes() {
        let sources = vec![
            Source::new("Regular.ttf", vec![("wght", 400.0)]),
            Source::new("Heavy.ttf", vec![("wght", 1000.0)]).with_style_name("Heavy"),
        ];
        let err = DesignSpace::new(two_axes(), sources).validate().unwrap_err();

        assert!(matches!(
            err,
            Error::IncompatibleMasters { ref master, reason: Incompatibility::OutOfRange { .. } }
                if master == "Heavy"
        ));
    }

    #[test]
    fn validate_requires_a_default_master() {
        let sources = vec![Source::new("Bold.ttf", vec![("wght", 700.0)])];
        let err = DesignSpace::new(two_axes(), sources).validate().unwrap_err();

        assert!(matches!(
            err,
            Error::IncompatibleMasters { reason: Incompatibility::NoDefault, .. }
        ));
    }

    #[test]
    fn validate_rejects_long_tags() {
        let axes = vec![Axis::new("weight", "Weight", 100.0, 400.0, 900.0)];
        let sources = vec![Source::new("a.ttf", vec![])];
        assert!(matches!(
            DesignSpace::new(axes, sources).validate(),
            Err(Error::InvalidDesignspace(_))
        ));
    }
}
