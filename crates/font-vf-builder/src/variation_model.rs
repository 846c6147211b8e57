//! Variation model for computing glyph deltas.
//!
//! Each non-default master owns one region. Regions are ordered by support
//! (masters on fewer axes first) and a master's delta is its offset from the
//! default minus what the earlier regions already contribute at its peak.

use std::iter::once;

use kurbo::Vec2;
use read_fonts::types::F2Dot14;
use write_fonts::tables::gvar::Tent;

use crate::designspace::DesignSpace;

/// A region in the variation space, defined by (start, peak, end) tuples.
///
/// The contribution on one axis is 0 at start, 1 at peak and 0 at end.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// (min, peak, max) for each axis in normalized coordinates
    pub axes: Vec<(f32, f32, f32)>,
}

impl Region {
    /// Region of the master at `peak`, bounded by its neighbours.
    ///
    /// On each axis the tent starts at the previous master position toward
    /// the default and runs out to the end of the axis, as in fontTools'
    /// VariationModel.
    pub fn for_master(peak: &[f32], all_locations: &[Vec<f32>]) -> Self {
        let axes = peak
            .iter()
            .enumerate()
            .map(|(axis_idx, &p)| {
                if p == 0.0 {
                    return (0.0, 0.0, 0.0);
                }
                let mut positions: Vec<f32> = all_locations
                    .iter()
                    .map(|loc| loc.get(axis_idx).copied().unwrap_or(0.0))
                    .chain(once(0.0))
                    .collect();
                positions.sort_by(f32::total_cmp);
                positions.dedup();

                if p > 0.0 {
                    let below = positions.iter().copied().filter(|&x| x >= 0.0 && x < p).last();
                    (below.unwrap_or(0.0), p, 1.0)
                } else {
                    let above = positions.iter().copied().find(|&x| x <= 0.0 && x > p);
                    (-1.0, p, above.unwrap_or(0.0))
                }
            })
            .collect();
        Self { axes }
    }

    /// Scalar contribution of this region at `location`, between 0 and 1.
    pub fn scalar_at(&self, location: &[f32]) -> f32 {
        let mut scalar = 1.0f32;

        for (i, &(min, peak, max)) in self.axes.iter().enumerate() {
            let loc = location.get(i).copied().unwrap_or(0.0);

            if peak == 0.0 || loc == peak {
                continue;
            }
            if loc < min || loc > max {
                return 0.0;
            }
            if loc < peak {
                scalar *= (loc - min) / (peak - min);
            } else {
                scalar *= (max - loc) / (max - peak);
            }
        }

        scalar
    }

    pub fn peak(&self) -> Vec<f32> {
        self.axes.iter().map(|(_, peak, _)| *peak).collect()
    }

    /// Number of axes the region varies on.
    pub fn support(&self) -> usize {
        self.axes.iter().filter(|(_, peak, _)| *peak != 0.0).count()
    }

    /// Processing order: fewer axes first, then by which axes are active,
    /// then nearer the default, then by position so opposite sides stay
    /// deterministic.
    fn order_key(&self) -> (usize, Vec<usize>, Vec<u32>, Vec<i32>) {
        let peak = self.peak();
        let active = peak.iter().enumerate().filter(|(_, p)| **p != 0.0).map(|(i, _)| i).collect();
        let distance = peak.iter().map(|p| (p.abs() * 16384.0).round() as u32).collect();
        let position = peak.iter().map(|p| (p * 16384.0).round() as i32).collect();
        (self.support(), active, distance, position)
    }

    /// gvar tuple for this region, one tent per axis.
    pub fn tents(&self) -> Vec<Tent> {
        self.axes
            .iter()
            .map(|&(min, peak, max)| {
                Tent::new(
                    F2Dot14::from_f32(peak),
                    Some((F2Dot14::from_f32(min), F2Dot14::from_f32(max))),
                )
            })
            .collect()
    }
}

/// Variation model for computing deltas from master values.
#[derive(Debug)]
pub struct VariationModel {
    /// One region per non-default master, in processing order
    pub regions: Vec<Region>,
    /// Index of the default master in the source list
    pub default_idx: usize,
    /// Source index of the default followed by the master of each region
    pub master_order: Vec<usize>,
    /// `region_scalars[i][j]`: scalar of region `j` at region `i`'s peak, for `j < i`
    region_scalars: Vec<Vec<f32>>,
}

impl VariationModel {
    /// Build the model, or `None` when the designspace has no default master.
    pub fn new(designspace: &DesignSpace) -> Option<Self> {
        let default_idx = designspace.default_source_index()?;
        let locations = designspace.master_locations();

        let mut regions_with_idx: Vec<(usize, Region)> = locations
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != default_idx)
            .map(|(idx, loc)| (idx, Region::for_master(loc, &locations)))
            .collect();
        regions_with_idx.sort_by(|(_, a), (_, b)| a.order_key().cmp(&b.order_key()));

        let master_order = once(default_idx).chain(regions_with_idx.iter().map(|(idx, _)| *idx)).collect();
        let regions: Vec<Region> = regions_with_idx.into_iter().map(|(_, r)| r).collect();

        let region_scalars = regions
            .iter()
            .enumerate()
            .map(|(i, region_i)| {
                let peak = region_i.peak();
                regions[..i].iter().map(|region_j| region_j.scalar_at(&peak)).collect()
            })
            .collect();

        Some(Self { regions, default_idx, master_order, region_scalars })
    }

    /// Per-region deltas reproducing `master_values` (indexed by source).
    ///
    /// Deltas stay unrounded so later regions subtract the exact
    /// contribution of earlier ones.
    pub fn deltas(&self, master_values: &[Vec2]) -> Vec<Vec2> {
        let default_value = master_values[self.default_idx];
        let mut deltas: Vec<Vec2> = Vec::with_capacity(self.regions.len());

        for (region_idx, scalars) in self.region_scalars.iter().enumerate() {
            let master_value = master_values[self.master_order[region_idx + 1]];
            let mut delta = master_value - default_value;
            for (prev, &scalar) in deltas.iter().zip(scalars) {
                if scalar != 0.0 {
                    delta -= *prev * f64::from(scalar);
                }
            }
            deltas.push(delta);
        }

        deltas
    }

    /// Interpolated value at a normalized location, the inverse of [`Self::deltas`].
    pub fn interpolate(&self, default_value: Vec2, deltas: &[Vec2], location: &[f32]) -> Vec2 {
        self.regions
            .iter()
            .zip(deltas)
            .fold(default_value, |acc, (region, delta)| {
                acc + *delta * f64::from(region.scalar_at(location))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designspace::{Axis, Source};

    fn corners() -> DesignSpace {
        let axes = vec![
            Axis::new("wght", "Weight", 300.0, 400.0, 900.0),
            Axis::new("ital", "Italic", 0.0, 0.0, 1.0),
        ];
        let sources = vec![
            Source::new("Regular.ttf", vec![("wght", 400.0), ("ital", 0.0)]),
            Source::new("BoldItalic.ttf", vec![("wght", 900.0), ("ital", 1.0)]),
            Source::new("Bold.ttf", vec![("wght", 900.0), ("ital", 0.0)]),
            Source::new("Italic.ttf", vec![("wght", 400.0), ("ital", 1.0)]),
        ];
        DesignSpace::new(axes, sources)
    }

    fn weights() -> DesignSpace {
        let axes = vec![Axis::new("wght", "Weight", 300.0, 400.0, 1000.0)];
        let sources = [300.0, 400.0, 500.0, 700.0, 1000.0]
            .into_iter()
            .map(|w| Source::new(format!("{w}.ttf"), vec![("wght", w)]))
            .collect();
        DesignSpace::new(axes, sources)
    }

    #[test]
    fn region_scalar() {
        let region = Region { axes: vec![(0.0, 1.0, 1.0), (0.0, 0.0, 0.0)] };
        assert_eq!(region.scalar_at(&[1.0, 0.0]), 1.0);
        assert!((region.scalar_at(&[0.5, 0.3]) - 0.5).abs() < 0.001);
        assert_eq!(region.scalar_at(&[-0.5, 0.0]), 0.0);
    }

    #[test]
    fn intermediate_masters_start_at_their_neighbour() {
        let locations = vec![vec![-1.0], vec![0.0], vec![0.5], vec![1.0]];
        assert_eq!(Region::for_master(&[0.5], &locations).axes, vec![(0.0, 0.5, 1.0)]);
        assert_eq!(Region::for_master(&[1.0], &locations).axes, vec![(0.5, 1.0, 1.0)]);
        assert_eq!(Region::for_master(&[-1.0], &locations).axes, vec![(-1.0, -1.0, 0.0)]);
    }

    #[test]
    fn single_axis_masters_come_first() {
        let model = VariationModel::new(&corners()).unwrap();

        assert_eq!(model.default_idx, 0);
        assert_eq!(model.master_order, vec![0, 2, 3, 1]);
        assert_eq!(model.regions[2].support(), 2);
    }

    /// Weights listed out of order, so the nearest master is not first.
    fn shuffled_weights() -> DesignSpace {
        let axes = vec![Axis::new("wght", "Weight", 300.0, 400.0, 1000.0)];
        let sources = [400.0, 1000.0, 800.0, 700.0]
            .into_iter()
            .map(|w| Source::new(format!("{w}.ttf"), vec![("wght", w)]))
            .collect();
        DesignSpace::new(axes, sources)
    }

    #[test]
    fn nearer_masters_are_processed_first() {
        let model = VariationModel::new(&shuffled_weights()).unwrap();
        assert_eq!(model.master_order, vec![0, 3, 2, 1]);
    }

    #[test]
    fn shuffled_masters_still_interpolate_to_themselves() {
        let ds = shuffled_weights();
        let model = VariationModel::new(&ds).unwrap();
        let values: Vec<Vec2> =
            [0.0, 100.0, 60.0, 30.0].into_iter().map(|x| Vec2::new(x, 0.0)).collect();
        let deltas = model.deltas(&values);

        for (location, expected) in ds.master_locations().iter().zip(&values) {
            let value = model.interpolate(values[0], &deltas, location);
            assert!((value - *expected).hypot() < 1e-3, "{value:?} != {expected:?}");
        }
    }

    #[test]
    fn deltas_reproduce_every_master() {
        for ds in [corners(), weights(), shuffled_weights()] {
            let model = VariationModel::new(&ds).unwrap();
            let values: Vec<Vec2> = (0..ds.sources.len())
                .map(|i| Vec2::new(100.0 + 37.0 * i as f64, -20.0 * i as f64))
                .collect();
            let deltas = model.deltas(&values);
            assert_eq!(deltas.len(), ds.sources.len() - 1);

            let default = values[model.default_idx];
            for (location, expected) in ds.master_locations().iter().zip(&values) {
                let value = model.interpolate(default, &deltas, location);
                assert!((value - *expected).hypot() < 1e-3, "{value:?} != {expected:?}");
            }
        }
    }
}
