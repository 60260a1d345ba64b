//! Precision models and the fixed-precision retry ladder.

use geo::coords_iter::CoordsIter;
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};

use crate::error::{OverlayError, Result};

/// Grid that coordinates are rounded to.
///
/// `Floating` keeps full double precision. `Fixed` rounds every ordinate to
/// the nearest multiple of `1 / scale`, so a scale of `1000.0` keeps three
/// decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum PrecisionModel {
    #[default]
    Floating,
    Fixed { scale: f64 },
}

impl PrecisionModel {
    pub fn fixed(scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(OverlayError::InvalidArgument(format!(
                "precision scale must be finite and positive, got {scale}"
            )));
        }
        Ok(PrecisionModel::Fixed { scale })
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, PrecisionModel::Floating)
    }

    pub fn scale(&self) -> Option<f64> {
        match self {
            PrecisionModel::Floating => None,
            PrecisionModel::Fixed { scale } => Some(*scale),
        }
    }

    /// Rounds a single ordinate, half-way cases towards positive infinity.
    #[inline]
    pub fn make_precise_value(&self, v: f64) -> f64 {
        match self {
            PrecisionModel::Floating => v,
            PrecisionModel::Fixed { scale } => {
                if !v.is_finite() {
                    return v;
                }
                round_half_up(v * scale) / scale
            }
        }
    }

    #[inline]
    pub fn make_precise(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.make_precise_value(c.x),
            y: self.make_precise_value(c.y),
        }
    }

    /// Number of significant decimal digits the model can represent.
    pub fn maximum_significant_digits(&self) -> i32 {
        match self {
            PrecisionModel::Floating => 16,
            PrecisionModel::Fixed { scale } => 1 + scale.log10().ceil() as i32,
        }
    }
}

#[inline]
pub(crate) fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Descending sequence of fixed precisions used when an operation fails at
/// its requested precision.
///
/// Each rung keeps `digits` significant decimal digits of the largest
/// input ordinate, from `max_digits` down to `min_digits`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrecisionLadder {
    pub max_digits: u32,
    pub min_digits: u32,
}

impl Default for PrecisionLadder {
    fn default() -> Self {
        Self {
            max_digits: 12,
            min_digits: 6,
        }
    }
}

impl PrecisionLadder {
    /// A ladder with no rungs: failures are reported immediately.
    pub fn disabled() -> Self {
        Self {
            max_digits: 0,
            min_digits: 1,
        }
    }

    pub fn len(&self) -> usize {
        if self.max_digits < self.min_digits {
            0
        } else {
            (self.max_digits - self.min_digits + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed precision models for inputs whose largest absolute ordinate is
    /// `magnitude`, finest first.
    pub fn rungs(&self, magnitude: f64) -> Vec<PrecisionModel> {
        if self.is_empty() {
            return Vec::new();
        }
        // integer digits of the magnitude; 1000 has four
        let mag_digits = if magnitude > 0.0 && magnitude.is_finite() {
            magnitude.log10().floor() as i32 + 1
        } else {
            0
        };
        (self.min_digits..=self.max_digits)
            .rev()
            .map(|digits| PrecisionModel::Fixed {
                scale: 10f64.powi(digits as i32 - mag_digits),
            })
            .collect()
    }
}

/// Largest absolute ordinate of the given geometries.
pub fn magnitude<'a>(geometries: impl IntoIterator<Item = &'a Geometry<f64>>) -> f64 {
    geometries
        .into_iter()
        .flat_map(|g| g.coords_iter())
        .fold(0.0_f64, |acc, c| acc.max(c.x.abs()).max(c.y.abs()))
}

/// Rounds a geometry to `pm`, dropping components that collapse.
///
/// Rings that end up with fewer than four distinct-consecutive points and
/// lines with fewer than two are removed; a polygon whose shell collapses
/// disappears with its holes.
pub fn reduce_precision(geom: &Geometry<f64>, pm: &PrecisionModel) -> Geometry<f64> {
    if pm.is_floating() {
        return geom.clone();
    }
    match geom {
        Geometry::Point(p) => Geometry::Point(Point(pm.make_precise(p.0))),
        Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint(
            mp.0.iter().map(|p| Point(pm.make_precise(p.0))).collect(),
        )),
        Geometry::Line(l) => {
            let ls = LineString::new(vec![l.start, l.end]);
            match reduce_line(&ls, pm) {
                Some(r) => Geometry::LineString(r),
                None => Geometry::MultiLineString(MultiLineString(vec![])),
            }
        }
        Geometry::LineString(ls) => match reduce_line(ls, pm) {
            Some(r) => Geometry::LineString(r),
            None => Geometry::MultiLineString(MultiLineString(vec![])),
        },
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString(
            mls.0.iter().filter_map(|ls| reduce_line(ls, pm)).collect(),
        )),
        Geometry::Polygon(poly) => match reduce_polygon(poly, pm) {
            Some(p) => Geometry::Polygon(p),
            None => Geometry::MultiPolygon(MultiPolygon(vec![])),
        },
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon(
            mp.0.iter().filter_map(|p| reduce_polygon(p, pm)).collect(),
        )),
        Geometry::Rect(r) => reduce_precision(&Geometry::Polygon(r.to_polygon()), pm),
        Geometry::Triangle(t) => reduce_precision(&Geometry::Polygon(t.to_polygon()), pm),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter().map(|g| reduce_precision(g, pm)).collect(),
        )),
    }
}

fn reduce_coords(coords: &[Coord<f64>], pm: &PrecisionModel) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = coords.iter().map(|c| pm.make_precise(*c)).collect();
    out.dedup();
    out
}

fn reduce_line(ls: &LineString<f64>, pm: &PrecisionModel) -> Option<LineString<f64>> {
    let coords = reduce_coords(&ls.0, pm);
    if coords.len() < 2 {
        return None;
    }
    Some(LineString::new(coords))
}

fn reduce_ring(ring: &LineString<f64>, pm: &PrecisionModel) -> Option<LineString<f64>> {
    let coords = reduce_coords(&ring.0, pm);
    if coords.len() < 4 {
        return None;
    }
    Some(LineString::new(coords))
}

fn reduce_polygon(poly: &Polygon<f64>, pm: &PrecisionModel) -> Option<Polygon<f64>> {
    let shell = reduce_ring(poly.exterior(), pm)?;
    let holes = poly
        .interiors()
        .iter()
        .filter_map(|h| reduce_ring(h, pm))
        .collect();
    Some(Polygon::new(shell, holes))
}
