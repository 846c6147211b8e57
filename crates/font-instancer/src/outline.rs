//! Gvar delta application for one glyph.
//!
//! Every tuple of a glyph is split at the pinned axes: its scalar on those
//! axes scales the deltas, and the tuple is either baked into the default
//! outline (no variable axis left in its region) or kept with a region
//! restricted to the variable axes.

use kurbo::{Point, Vec2};
use read_fonts::{
    tables::{
        glyf::{
            Anchor as ReadAnchor, CompositeGlyph as ReadCompositeGlyph, CurvePoint, Glyph,
            SimpleGlyph as ReadSimpleGlyph,
        },
        gvar::GlyphVariationData,
    },
    types::F2Dot14,
};
use write_fonts::tables::{
    glyf::{
        Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, Glyph as WriteGlyph,
        SimpleGlyph, Transform,
    },
    gvar::{GlyphDelta, GlyphDeltas, Tent},
};

use crate::pins::Pins;

pub(crate) const PHANTOM_POINTS: usize = 4;

pub(crate) fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn round_i16(value: f64) -> i16 {
    clamp_i16(value.round() as i32)
}

/// Horizontal metrics of a glyph before instancing.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HorizontalMetrics {
    pub advance: u16,
    pub lsb: i16,
}

/// A glyph after pinning.
#[derive(Debug)]
pub(crate) struct InstancedGlyph {
    pub glyph: WriteGlyph,
    pub advance: u16,
    /// Side bearing for empty glyphs; outlined glyphs derive theirs from the
    /// final bounding box and [`InstancedGlyph::origin_x`].
    pub lsb: i16,
    /// Left phantom point after pinning; the LSB is measured from here.
    pub origin_x: i16,
    /// Tuples that still depend on a variable axis.
    pub variations: Vec<GlyphDeltas>,
}

/// One tuple variation, decoded into plain numbers.
#[derive(Debug, Clone)]
struct RawTuple {
    /// `(start, peak, end)` per `fvar` axis.
    regions: Vec<(f64, f64, f64)>,
    explicit_region: bool,
    deltas: Vec<Option<Vec2>>,
    all_points: bool,
}

/// Scalar contributed by one axis region at `coord`.
fn tent_scalar(coord: f64, (start, peak, end): (f64, f64, f64)) -> f64 {
    if peak == 0.0 || coord == peak {
        return 1.0;
    }
    if start > peak || peak > end || (start < 0.0 && end > 0.0) {
        return 1.0;
    }
    if coord < start || coord > end {
        return 0.0;
    }
    if coord < peak {
        (coord - start) / (peak - start)
    } else {
        (end - coord) / (end - peak)
    }
}

fn read_tuples(var_data: &GlyphVariationData, axis_count: usize, point_count: usize) -> Vec<RawTuple> {
    let to_f64 = |value: Option<F2Dot14>| value.map(|v| f64::from(v.to_f32())).unwrap_or(0.0);
    var_data
        .tuples()
        .map(|tuple| {
            let peak = tuple.peak();
            let start = tuple.intermediate_start();
            let end = tuple.intermediate_end();
            let explicit_region = start.is_some() && end.is_some();
            let regions = (0..axis_count)
                .map(|axis| {
                    let p = to_f64(peak.get(axis));
                    match (&start, &end) {
                        (Some(s), Some(e)) => (to_f64(s.get(axis)), p, to_f64(e.get(axis))),
                        _ => (p.min(0.0), p, p.max(0.0)),
                    }
                })
                .collect();

            let mut deltas = vec![None; point_count];
            for delta in tuple.deltas() {
                if let Some(slot) = deltas.get_mut(delta.position as usize) {
                    *slot = Some(Vec2::new(f64::from(delta.x_delta), f64::from(delta.y_delta)));
                }
            }
            RawTuple { regions, explicit_region, deltas, all_points: tuple.has_deltas_for_all_points() }
        })
        .collect()
}

/// Deltas of one tuple for every point, interpolating untouched outline
/// points of simple glyphs.
fn dense_deltas(tuple: &RawTuple, coords: &[Point], contour_ends: &[usize]) -> Vec<Vec2> {
    let mut dense: Vec<Vec2> = tuple.deltas.iter().map(|d| d.unwrap_or(Vec2::ZERO)).collect();
    if tuple.all_points || contour_ends.is_empty() {
        return dense;
    }
    let touched: Vec<bool> = tuple.deltas.iter().map(Option::is_some).collect();
    let mut start = 0;
    for &end in contour_ends {
        iup_contour(&mut dense, &touched, coords, start, end);
        start = end + 1;
    }
    dense
}

fn iup_contour(deltas: &mut [Vec2], touched: &[bool], coords: &[Point], start: usize, end: usize) {
    if start > end || end >= deltas.len() {
        return;
    }
    let len = end - start + 1;
    let touched_points: Vec<usize> = (0..len).filter(|&i| touched[start + i]).collect();
    let (Some(&first), Some(&last)) = (touched_points.first(), touched_points.last()) else {
        return;
    };

    if touched_points.len() == 1 {
        let d = deltas[start + first];
        for i in (0..len).filter(|&i| i != first) {
            deltas[start + i] = d;
        }
        return;
    }

    for window in touched_points.windows(2) {
        interpolate_between(deltas, coords, start, len, window[0], window[1]);
    }
    interpolate_between(deltas, coords, start, len, last, first);
}

fn interpolate_between(
    deltas: &mut [Vec2],
    coords: &[Point],
    start: usize,
    len: usize,
    touch1: usize,
    touch2: usize,
) {
    let (p1, p2) = (coords[start + touch1], coords[start + touch2]);
    let (d1, d2) = (deltas[start + touch1], deltas[start + touch2]);

    let mut i = (touch1 + 1) % len;
    while i != touch2 {
        let p = coords[start + i];
        deltas[start + i] = Vec2::new(
            iup_single(p1.x, p2.x, p.x, d1.x, d2.x),
            iup_single(p1.y, p2.y, p.y, d1.y, d2.y),
        );
        i = (i + 1) % len;
    }
}

fn iup_single(c1: f64, c2: f64, c: f64, d1: f64, d2: f64) -> f64 {
    if c1 == c2 {
        return if d1 == d2 { d1 } else { 0.0 };
    }
    let (c1, c2, d1, d2) = if c1 > c2 { (c2, c1, d2, d1) } else { (c1, c2, d1, d2) };
    if c <= c1 {
        d1
    } else if c >= c2 {
        d2
    } else {
        d1 + (c - c1) / (c2 - c1) * (d2 - d1)
    }
}

/// Split every tuple of the glyph at the pinned axes.
///
/// Returns the deltas baked into the default outline and the kept tuples,
/// already scaled and restricted to the variable axes.
fn split_tuples(
    tuples: &[RawTuple],
    pins: &Pins,
    coords: &[Point],
    contour_ends: &[usize],
) -> (Vec<Vec2>, Vec<GlyphDeltas>) {
    let variable_axes = pins.variable_axes();
    let pinned: Vec<f64> = pins.coords().iter().map(|c| f64::from(c.to_f32())).collect();
    let mut baked = vec![Vec2::ZERO; coords.len()];
    let mut kept = Vec::new();

    for tuple in tuples {
        let factor: f64 = tuple
            .regions
            .iter()
            .enumerate()
            .filter(|(axis, _)| pins.is_pinned(*axis))
            .map(|(axis, region)| tent_scalar(pinned[axis], *region))
            .product();
        if factor == 0.0 {
            continue;
        }

        let deltas = dense_deltas(tuple, coords, contour_ends);
        let still_variable = variable_axes.iter().any(|&axis| tuple.regions[axis].1 != 0.0);
        if !still_variable {
            for (sum, d) in baked.iter_mut().zip(&deltas) {
                *sum += *d * factor;
            }
            continue;
        }

        let tents = variable_axes
            .iter()
            .map(|&axis| {
                let (start, peak, end) = tuple.regions[axis];
                let intermediate = tuple
                    .explicit_region
                    .then(|| (F2Dot14::from_f32(start as f32), F2Dot14::from_f32(end as f32)));
                Tent::new(F2Dot14::from_f32(peak as f32), intermediate)
            })
            .collect();
        let scaled = deltas
            .iter()
            .map(|d| GlyphDelta::required(round_i16(d.x * factor), round_i16(d.y * factor)))
            .collect();
        kept.push(GlyphDeltas::new(tents, scaled));
    }
    (baked, kept)
}

fn phantom_points(x_min: i16, metrics: HorizontalMetrics) -> [Point; PHANTOM_POINTS] {
    let left = f64::from(x_min) - f64::from(metrics.lsb);
    [
        Point::new(left, 0.0),
        Point::new(left + f64::from(metrics.advance), 0.0),
        Point::ZERO,
        Point::ZERO,
    ]
}

/// Advance and left phantom point after adding `baked` to the phantom points.
fn apply_phantoms(phantoms: &[Point], baked: &[Vec2]) -> (u16, i16) {
    let left = phantoms[0] + baked[0];
    let right = phantoms[1] + baked[1];
    let advance = (right.x - left.x).round().max(0.0).min(f64::from(u16::MAX)) as u16;
    (advance, round_i16(left.x))
}

/// Pin one glyph.
///
/// `var_data` is the glyph's gvar entry, if any. Composite glyphs keep a
/// placeholder bounding box; the caller resolves it once every component
/// is known.
pub(crate) fn instance_glyph(
    glyph: Option<Glyph>,
    var_data: Option<GlyphVariationData>,
    metrics: HorizontalMetrics,
    pins: &Pins,
) -> InstancedGlyph {
    let (x_min, mut coords, contour_ends) = match &glyph {
        Some(Glyph::Simple(simple)) => {
            let coords: Vec<Point> =
                simple.points().map(|p| Point::new(f64::from(p.x), f64::from(p.y))).collect();
            let ends = simple.end_pts_of_contours().iter().map(|e| e.get() as usize).collect();
            (simple.x_min(), coords, ends)
        }
        Some(Glyph::Composite(composite)) => {
            let coords = composite
                .components()
                .map(|c| match c.anchor {
                    ReadAnchor::Offset { x, y } => Point::new(f64::from(x), f64::from(y)),
                    ReadAnchor::Point { .. } => Point::ZERO,
                })
                .collect();
            (composite.x_min(), coords, Vec::new())
        }
        None => (0, Vec::new(), Vec::new()),
    };
    let outline_points = coords.len();
    coords.extend(phantom_points(x_min, metrics));

    let tuples = var_data
        .map(|data| read_tuples(&data, pins.axis_count(), coords.len()))
        .unwrap_or_default();
    let (baked, variations) = split_tuples(&tuples, pins, &coords, &contour_ends);

    let (advance, origin_x) = apply_phantoms(&coords[outline_points..], &baked[outline_points..]);
    let moved: Vec<Point> = coords.iter().zip(&baked).map(|(p, d)| *p + *d).collect();

    let glyph = match glyph {
        Some(Glyph::Simple(simple)) => simple_glyph(&simple, &moved[..outline_points], &contour_ends),
        Some(Glyph::Composite(composite)) => composite_glyph(&composite, &moved[..outline_points]),
        None => WriteGlyph::Empty,
    };

    InstancedGlyph { glyph, advance, lsb: metrics.lsb, origin_x, variations }
}

fn simple_glyph(simple: &ReadSimpleGlyph, points: &[Point], contour_ends: &[usize]) -> WriteGlyph {
    if points.is_empty() {
        return WriteGlyph::Empty;
    }
    let on_curve: Vec<bool> = simple.points().map(|p| p.on_curve).collect();
    let mut contours = Vec::with_capacity(contour_ends.len());
    let mut start = 0;
    for &end in contour_ends {
        let contour: Vec<CurvePoint> = (start..=end)
            .filter_map(|i| {
                let p = points.get(i)?;
                Some(CurvePoint::new(round_i16(p.x), round_i16(p.y), on_curve[i]))
            })
            .collect();
        contours.push(Contour::from(contour));
        start = end + 1;
    }

    let mut glyph = SimpleGlyph {
        bbox: Bbox::default(),
        contours,
        instructions: simple.instructions().to_vec(),
    };
    glyph.recompute_bounding_box();
    WriteGlyph::Simple(glyph)
}

fn composite_glyph(composite: &ReadCompositeGlyph, offsets: &[Point]) -> WriteGlyph {
    let mut components = composite.components().enumerate().map(|(i, comp)| {
        let anchor = match comp.anchor {
            ReadAnchor::Offset { .. } => {
                let p = offsets.get(i).copied().unwrap_or(Point::ZERO);
                Anchor::Offset { x: round_i16(p.x), y: round_i16(p.y) }
            }
            ReadAnchor::Point { base, component } => Anchor::Point { base, component },
        };
        let t = comp.transform;
        let transform = Transform { xx: t.xx, yx: t.yx, xy: t.xy, yy: t.yy };
        let flags: ComponentFlags = comp.flags.into();
        Component::new(comp.glyph, anchor, transform, flags)
    });

    let Some(first) = components.next() else {
        return WriteGlyph::Empty;
    };
    let mut glyph = CompositeGlyph::new(first, Bbox::default());
    for component in components {
        glyph.add_component(component, Bbox::default());
    }
    WriteGlyph::Composite(glyph)
}

/// Resolve composite bounding boxes from their (possibly nested) components.
pub(crate) fn recompute_composite_bboxes(glyphs: &mut [WriteGlyph]) {
    let mut bboxes: Vec<Option<Bbox>> = glyphs
        .iter()
        .map(|g| match g {
            WriteGlyph::Simple(s) => Some(s.bbox),
            WriteGlyph::Composite(_) => None,
            WriteGlyph::Empty => Some(Bbox::default()),
        })
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for gid in 0..glyphs.len() {
            if bboxes[gid].is_some() {
                continue;
            }
            let WriteGlyph::Composite(composite) = &glyphs[gid] else {
                continue;
            };
            if let Some(bbox) = composite_bbox(composite, &bboxes) {
                bboxes[gid] = Some(bbox);
                if let WriteGlyph::Composite(c) = &mut glyphs[gid] {
                    c.bbox = bbox;
                }
                changed = true;
            }
        }
    }
}

/// Union of the transformed component boxes, or `None` while a component is
/// still unresolved.
fn composite_bbox(composite: &CompositeGlyph, bboxes: &[Option<Bbox>]) -> Option<Bbox> {
    let mut rect: Option<kurbo::Rect> = None;

    for comp in composite.components() {
        let component = match bboxes.get(comp.glyph.to_u16() as usize) {
            Some(Some(bbox)) => *bbox,
            Some(None) => return None,
            None => continue,
        };
        if component == Bbox::default() {
            continue;
        }

        let (dx, dy) = match comp.anchor {
            Anchor::Offset { x, y } => (f64::from(x), f64::from(y)),
            Anchor::Point { .. } => (0.0, 0.0),
        };
        let t = &comp.transform;
        let affine = kurbo::Affine::new([
            f64::from(t.xx.to_f32()),
            f64::from(t.yx.to_f32()),
            f64::from(t.xy.to_f32()),
            f64::from(t.yy.to_f32()),
            dx,
            dy,
        ]);
        let corners = [
            (component.x_min, component.y_min),
            (component.x_min, component.y_max),
            (component.x_max, component.y_min),
            (component.x_max, component.y_max),
        ];
        for (x, y) in corners {
            let p = affine * Point::new(f64::from(x), f64::from(y));
            let p = Point::new(p.x.round(), p.y.round());
            rect = Some(match rect {
                None => kurbo::Rect::from_points(p, p),
                Some(r) => r.union_pt(p),
            });
        }
    }

    Some(rect.map_or_else(Bbox::default, |r| Bbox {
        x_min: round_i16(r.x0),
        y_min: round_i16(r.y0),
        x_max: round_i16(r.x1),
        y_max: round_i16(r.y1),
    }))
}

/// Bounding box of a built glyph, or `None` for empty glyphs.
pub(crate) fn glyph_bbox(glyph: &WriteGlyph) -> Option<Bbox> {
    match glyph {
        WriteGlyph::Simple(s) => Some(s.bbox),
        WriteGlyph::Composite(c) => Some(c.bbox),
        WriteGlyph::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tent_scalars() {
        assert_eq!(tent_scalar(0.5, (0.0, 1.0, 1.0)), 0.5);
        assert_eq!(tent_scalar(1.0, (0.0, 1.0, 1.0)), 1.0);
        assert_eq!(tent_scalar(-0.5, (0.0, 1.0, 1.0)), 0.0);
        assert_eq!(tent_scalar(0.75, (0.0, 0.5, 1.0)), 0.5);
        assert_eq!(tent_scalar(0.3, (0.0, 0.0, 0.0)), 1.0);
        assert_eq!(tent_scalar(-1.0, (-1.0, -1.0, 0.0)), 1.0);
    }

    #[test]
    fn iup_interpolates_between_touched_points() {
        let coords = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        let mut deltas = vec![Vec2::new(0.0, 0.0), Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::ZERO];
        let touched = [true, false, true, false];
        iup_contour(&mut deltas, &touched, &coords, 0, 3);
        assert_eq!(deltas[1], Vec2::new(5.0, 0.0));
        // (100, 100) lies at the x of the right touched point and outside on y.
        assert_eq!(deltas[3], Vec2::new(10.0, 0.0));
    }

    #[test]
    fn single_touched_point_shifts_whole_contour() {
        let coords = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let mut deltas = vec![Vec2::ZERO, Vec2::new(3.0, -2.0), Vec2::ZERO];
        iup_contour(&mut deltas, &[false, true, false], &coords, 0, 2);
        assert!(deltas.iter().all(|d| *d == Vec2::new(3.0, -2.0)));
    }

    #[test]
    fn phantom_points_give_the_new_advance() {
        let metrics = HorizontalMetrics { advance: 600, lsb: 50 };
        let phantoms = phantom_points(50, metrics);
        assert_eq!(phantoms[0], Point::ZERO);
        let (advance, origin) =
            apply_phantoms(&phantoms, &[Vec2::ZERO, Vec2::new(40.4, 0.0), Vec2::ZERO, Vec2::ZERO]);
        assert_eq!((advance, origin), (640, 0));
    }
}
