//! Robust intersection of two line segments.

use geo::EuclideanDistance;
use geo_types::{Coord, Line, Point};

use super::dd::DD;
use super::orientation::orientation_index;
use crate::index::Envelope;
use crate::precision::PrecisionModel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IntersectionKind {
    #[default]
    NoIntersection,
    /// A single point, either proper or at an endpoint.
    Point,
    /// Collinear overlap, described by its two extreme points.
    Collinear,
}

/// Computes and holds the intersection of two segments `p1-p2` and `q1-q2`.
///
/// Decisions are taken with [`orientation_index`], so the classification
/// (none / endpoint / proper / collinear) is exact. Only the coordinates of
/// a proper intersection are computed; they are conditioned, refined with
/// double-double arithmetic when they stray outside the segment envelopes,
/// and finally clamped to the nearest endpoint.
#[derive(Clone, Debug, Default)]
pub struct LineIntersector {
    precision: PrecisionModel,
    kind: IntersectionKind,
    input: [[Coord<f64>; 2]; 2],
    points: [Coord<f64>; 2],
    proper: bool,
}

impl LineIntersector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intersection points of proper intersections are rounded to `precision`.
    pub fn with_precision(precision: PrecisionModel) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    pub fn precision(&self) -> PrecisionModel {
        self.precision
    }

    pub fn kind(&self) -> IntersectionKind {
        self.kind
    }

    pub fn has_intersection(&self) -> bool {
        self.kind != IntersectionKind::NoIntersection
    }

    /// Number of intersection points: 0, 1 or 2.
    pub fn intersection_num(&self) -> usize {
        match self.kind {
            IntersectionKind::NoIntersection => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    pub fn intersection(&self, i: usize) -> Coord<f64> {
        self.points[i]
    }

    /// A proper intersection is a single point interior to both segments.
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.proper
    }

    /// Whether some intersection point is not an endpoint of segment
    /// `input_index` (0 for `p`, 1 for `q`).
    pub fn is_interior_intersection_of(&self, input_index: usize) -> bool {
        let [s0, s1] = self.input[input_index];
        (0..self.intersection_num()).any(|i| {
            let pt = self.points[i];
            pt != s0 && pt != s1
        })
    }

    /// Whether some intersection point is interior to either segment.
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_of(0) || self.is_interior_intersection_of(1)
    }

    /// Distance of intersection `int_index` along segment `segment_index`
    /// of the last computation, see [`edge_distance`].
    pub fn edge_distance(&self, segment_index: usize, int_index: usize) -> f64 {
        let [p0, p1] = self.input[segment_index];
        edge_distance(self.points[int_index], p0, p1)
    }

    /// Tests whether the point `p` lies on the segment `p1-p2`.
    pub fn compute_point_intersection(&mut self, p: Coord<f64>, p1: Coord<f64>, p2: Coord<f64>) {
        self.proper = false;
        self.kind = IntersectionKind::NoIntersection;
        if Envelope::segment_intersects_point(p1, p2, p)
            && orientation_index(p1, p2, p) == 0
            && orientation_index(p2, p1, p) == 0
        {
            self.proper = p != p1 && p != p2;
            self.points[0] = p;
            self.kind = IntersectionKind::Point;
        }
    }

    pub fn compute_intersection(
        &mut self,
        p1: Coord<f64>,
        p2: Coord<f64>,
        q1: Coord<f64>,
        q2: Coord<f64>,
    ) -> IntersectionKind {
        self.input = [[p1, p2], [q1, q2]];
        self.kind = self.compute_intersect(p1, p2, q1, q2);
        self.kind
    }

    fn compute_intersect(
        &mut self,
        p1: Coord<f64>,
        p2: Coord<f64>,
        q1: Coord<f64>,
        q2: Coord<f64>,
    ) -> IntersectionKind {
        self.proper = false;

        if !Envelope::segments_intersect(p1, p2, q1, q2) {
            return IntersectionKind::NoIntersection;
        }

        let pq1 = orientation_index(p1, p2, q1);
        let pq2 = orientation_index(p1, p2, q2);
        if (pq1 > 0 && pq2 > 0) || (pq1 < 0 && pq2 < 0) {
            return IntersectionKind::NoIntersection;
        }

        let qp1 = orientation_index(q1, q2, p1);
        let qp2 = orientation_index(q1, q2, p2);
        if (qp1 > 0 && qp2 > 0) || (qp1 < 0 && qp2 < 0) {
            return IntersectionKind::NoIntersection;
        }

        if pq1 == 0 && pq2 == 0 && qp1 == 0 && qp2 == 0 {
            return self.compute_collinear_intersection(p1, p2, q1, q2);
        }

        // An endpoint lies on the other segment. Prefer a shared endpoint,
        // then whichever endpoint the orientation test put on the line, so
        // the result is always an exact input coordinate.
        if pq1 == 0 || pq2 == 0 || qp1 == 0 || qp2 == 0 {
            self.points[0] = if p1 == q1 || p1 == q2 {
                p1
            } else if p2 == q1 || p2 == q2 {
                p2
            } else if pq1 == 0 {
                q1
            } else if pq2 == 0 {
                q2
            } else if qp1 == 0 {
                p1
            } else {
                p2
            };
        } else {
            self.proper = true;
            self.points[0] = self.proper_intersection(p1, p2, q1, q2);
        }
        IntersectionKind::Point
    }

    fn compute_collinear_intersection(
        &mut self,
        p1: Coord<f64>,
        p2: Coord<f64>,
        q1: Coord<f64>,
        q2: Coord<f64>,
    ) -> IntersectionKind {
        let q1_in_p = Envelope::segment_intersects_point(p1, p2, q1);
        let q2_in_p = Envelope::segment_intersects_point(p1, p2, q2);
        let p1_in_q = Envelope::segment_intersects_point(q1, q2, p1);
        let p2_in_q = Envelope::segment_intersects_point(q1, q2, p2);

        let (a, b, single) = if q1_in_p && q2_in_p {
            (q1, q2, false)
        } else if p1_in_q && p2_in_q {
            (p1, p2, false)
        } else if q1_in_p && p1_in_q {
            (q1, p1, q1 == p1 && !q2_in_p && !p2_in_q)
        } else if q1_in_p && p2_in_q {
            (q1, p2, q1 == p2 && !q2_in_p && !p1_in_q)
        } else if q2_in_p && p1_in_q {
            (q2, p1, q2 == p1 && !q1_in_p && !p2_in_q)
        } else if q2_in_p && p2_in_q {
            (q2, p2, q2 == p2 && !q1_in_p && !p1_in_q)
        } else {
            return IntersectionKind::NoIntersection;
        };
        self.points = [a, b];
        if single {
            IntersectionKind::Point
        } else {
            IntersectionKind::Collinear
        }
    }

    fn proper_intersection(
        &self,
        p1: Coord<f64>,
        p2: Coord<f64>,
        q1: Coord<f64>,
        q2: Coord<f64>,
    ) -> Coord<f64> {
        let mut pt = intersection_conditioned(p1, p2, q1, q2)
            .filter(|pt| self.is_in_segment_envelopes(*pt))
            .or_else(|| intersection_dd(p1, p2, q1, q2))
            .filter(|pt| self.is_in_segment_envelopes(*pt))
            .unwrap_or_else(|| nearest_endpoint(p1, p2, q1, q2));
        if !self.precision.is_floating() {
            pt = self.precision.make_precise(pt);
        }
        pt
    }

    fn is_in_segment_envelopes(&self, pt: Coord<f64>) -> bool {
        let [[p1, p2], [q1, q2]] = self.input;
        Envelope::segment_intersects_point(p1, p2, pt) && Envelope::segment_intersects_point(q1, q2, pt)
    }
}

/// Homogeneous line intersection, computed relative to the centre of the
/// segments' common envelope to keep the products small.
fn intersection_conditioned(
    p1: Coord<f64>,
    p2: Coord<f64>,
    q1: Coord<f64>,
    q2: Coord<f64>,
) -> Option<Coord<f64>> {
    let int_min_x = p1.x.min(p2.x).max(q1.x.min(q2.x));
    let int_max_x = p1.x.max(p2.x).min(q1.x.max(q2.x));
    let int_min_y = p1.y.min(p2.y).max(q1.y.min(q2.y));
    let int_max_y = p1.y.max(p2.y).min(q1.y.max(q2.y));
    let mid_x = (int_min_x + int_max_x) / 2.0;
    let mid_y = (int_min_y + int_max_y) / 2.0;

    let p1x = p1.x - mid_x;
    let p1y = p1.y - mid_y;
    let p2x = p2.x - mid_x;
    let p2y = p2.y - mid_y;
    let q1x = q1.x - mid_x;
    let q1y = q1.y - mid_y;
    let q2x = q2.x - mid_x;
    let q2y = q2.y - mid_y;

    let px = p1y - p2y;
    let py = p2x - p1x;
    let pw = p1x * p2y - p2x * p1y;

    let qx = q1y - q2y;
    let qy = q2x - q1x;
    let qw = q1x * q2y - q2x * q1y;

    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let x_int = x / w;
    let y_int = y / w;
    if !x_int.is_finite() || !y_int.is_finite() {
        return None;
    }
    Some(Coord {
        x: x_int + mid_x,
        y: y_int + mid_y,
    })
}

/// The same formula evaluated in double-double arithmetic.
pub(crate) fn intersection_dd(
    p1: Coord<f64>,
    p2: Coord<f64>,
    q1: Coord<f64>,
    q2: Coord<f64>,
) -> Option<Coord<f64>> {
    let px = DD::from(p1.y) - p2.y;
    let py = DD::from(p2.x) - p1.x;
    let pw = DD::from(p1.x) * p2.y - DD::from(p2.x) * p1.y;

    let qx = DD::from(q1.y) - q2.y;
    let qy = DD::from(q2.x) - q1.x;
    let qw = DD::from(q1.x) * q2.y - DD::from(q2.x) * q1.y;

    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let x_int = (x / w).to_f64();
    let y_int = (y / w).to_f64();
    if !x_int.is_finite() || !y_int.is_finite() {
        return None;
    }
    Some(Coord { x: x_int, y: y_int })
}

/// The endpoint of either segment closest to the other segment.
fn nearest_endpoint(p1: Coord<f64>, p2: Coord<f64>, q1: Coord<f64>, q2: Coord<f64>) -> Coord<f64> {
    let p_line = Line::new(p1, p2);
    let q_line = Line::new(q1, q2);
    let candidates = [
        (p1, Point::from(p1).euclidean_distance(&q_line)),
        (p2, Point::from(p2).euclidean_distance(&q_line)),
        (q1, Point::from(q1).euclidean_distance(&p_line)),
        (q2, Point::from(q2).euclidean_distance(&p_line)),
    ];
    let mut best = candidates[0];
    for cand in &candidates[1..] {
        if cand.1 < best.1 {
            best = *cand;
        }
    }
    best.0
}

/// A monotone stand-in for the distance of `p` along `p0-p1`: the larger of
/// the axis offsets from `p0`. Exact for ordering points on one segment,
/// which is all it is used for.
pub fn edge_distance(p: Coord<f64>, p0: Coord<f64>, p1: Coord<f64>) -> f64 {
    let dx = (p1.x - p0.x).abs();
    let dy = (p1.y - p0.y).abs();

    if p == p0 {
        return 0.0;
    }
    if p == p1 {
        return dx.max(dy);
    }
    let pdx = (p.x - p0.x).abs();
    let pdy = (p.y - p0.y).abs();
    let mut dist = if dx > dy { pdx } else { pdy };
    // a non-endpoint must never report zero
    if dist == 0.0 {
        dist = pdx.max(pdy);
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_proper_crossing() {
        let mut li = LineIntersector::new();
        let kind = li.compute_intersection(c(0.0, 0.0), c(10.0, 10.0), c(0.0, 10.0), c(10.0, 0.0));
        assert_eq!(kind, IntersectionKind::Point);
        assert!(li.is_proper());
        assert!(li.is_interior_intersection());
        assert_eq!(li.intersection(0), c(5.0, 5.0));
    }

    #[test]
    fn test_disjoint_and_parallel() {
        let mut li = LineIntersector::new();
        li.compute_intersection(c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0), c(1.0, 1.0));
        assert!(!li.has_intersection());
        li.compute_intersection(c(0.0, 0.0), c(1.0, 1.0), c(2.0, 0.0), c(3.0, -5.0));
        assert!(!li.has_intersection());
    }

    #[test]
    fn test_endpoint_touch_is_not_proper() {
        let mut li = LineIntersector::new();
        li.compute_intersection(c(0.0, 0.0), c(10.0, 0.0), c(5.0, 0.0), c(5.0, 5.0));
        assert_eq!(li.kind(), IntersectionKind::Point);
        assert!(!li.is_proper());
        assert_eq!(li.intersection(0), c(5.0, 0.0));
        // interior to p, endpoint of q
        assert!(li.is_interior_intersection_of(0));
        assert!(!li.is_interior_intersection_of(1));

        li.compute_intersection(c(0.0, 0.0), c(10.0, 0.0), c(10.0, 0.0), c(10.0, 5.0));
        assert!(!li.is_interior_intersection());
    }

    #[test]
    fn test_collinear_overlap() {
        let mut li = LineIntersector::new();
        let kind = li.compute_intersection(c(0.0, 0.0), c(10.0, 0.0), c(5.0, 0.0), c(15.0, 0.0));
        assert_eq!(kind, IntersectionKind::Collinear);
        assert_eq!(li.intersection_num(), 2);
        let pts = [li.intersection(0), li.intersection(1)];
        assert!(pts.contains(&c(5.0, 0.0)));
        assert!(pts.contains(&c(10.0, 0.0)));

        // collinear, touching only at an endpoint
        let kind = li.compute_intersection(c(0.0, 0.0), c(10.0, 0.0), c(10.0, 0.0), c(20.0, 0.0));
        assert_eq!(kind, IntersectionKind::Point);
        assert_eq!(li.intersection(0), c(10.0, 0.0));
    }

    #[test]
    fn test_fixed_precision_rounds_proper_point() {
        let mut li = LineIntersector::with_precision(PrecisionModel::fixed(1.0).unwrap());
        li.compute_intersection(c(0.0, 0.0), c(3.0, 1.0), c(0.0, 1.0), c(3.0, 0.0));
        assert!(li.is_proper());
        assert_eq!(li.intersection(0), c(2.0, 1.0));
    }

    #[test]
    fn test_result_stays_inside_envelopes() {
        let mut li = LineIntersector::new();
        let p1 = c(2089426.5233462777, 1180182.3877339689);
        let p2 = c(2085646.6891757075, 1195618.7333999649);
        let q1 = c(1889281.8148903656, 1997547.0560044837);
        let q2 = c(2259977.3672235999, 483675.17050843034);
        li.compute_intersection(p1, p2, q1, q2);
        assert!(li.has_intersection());
        let pt = li.intersection(0);
        assert!(Envelope::segment_intersects_point(p1, p2, pt));
        assert!(Envelope::segment_intersects_point(q1, q2, pt));
    }

    #[test]
    fn test_point_on_segment() {
        let mut li = LineIntersector::new();
        li.compute_point_intersection(c(5.0, 5.0), c(0.0, 0.0), c(10.0, 10.0));
        assert!(li.has_intersection());
        assert!(li.is_proper());
        li.compute_point_intersection(c(5.0, 5.1), c(0.0, 0.0), c(10.0, 10.0));
        assert!(!li.has_intersection());
    }

    #[test]
    fn test_edge_distance_orders_points() {
        let p0 = c(0.0, 0.0);
        let p1 = c(10.0, 2.0);
        assert_eq!(edge_distance(p0, p0, p1), 0.0);
        assert_eq!(edge_distance(p1, p0, p1), 10.0);
        assert!(edge_distance(c(2.0, 0.4), p0, p1) < edge_distance(c(7.0, 1.4), p0, p1));
    }
}
