use geo_types::Coord;

use crate::algorithm::line_intersector::LineIntersector;
use crate::error::Result;
use crate::index::Envelope;
use crate::noding::segment_string::NodedSegmentString;
use crate::precision::round_half_up;

/// The tolerance square around a grid point that segments are snapped to.
///
/// All tests run in scaled coordinates, where the square has half-width
/// `0.5` around the rounded centre. Its top and right edges are open, so
/// every point of the plane belongs to exactly one pixel.
#[derive(Clone, Debug)]
pub struct HotPixel {
    original: Coord<f64>,
    scale: f64,
    centre: Coord<f64>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    /// Corners counter-clockwise from top right.
    corners: [Coord<f64>; 4],
}

impl HotPixel {
    pub fn new(pt: Coord<f64>, scale: f64) -> Self {
        let centre = if scale != 1.0 {
            Coord {
                x: round_half_up(pt.x * scale),
                y: round_half_up(pt.y * scale),
            }
        } else {
            pt
        };
        let tolerance = 0.5;
        let min_x = centre.x - tolerance;
        let max_x = centre.x + tolerance;
        let min_y = centre.y - tolerance;
        let max_y = centre.y + tolerance;
        Self {
            original: pt,
            scale,
            centre,
            min_x,
            max_x,
            min_y,
            max_y,
            corners: [
                Coord { x: max_x, y: max_y },
                Coord { x: min_x, y: max_y },
                Coord { x: min_x, y: min_y },
                Coord { x: max_x, y: min_y },
            ],
        }
    }

    /// The point segments are snapped to, in input coordinates.
    pub fn coordinate(&self) -> Coord<f64> {
        self.original
    }

    /// An envelope in input coordinates that certainly contains every
    /// segment touching the pixel, for index queries.
    pub fn safe_envelope(&self) -> Envelope {
        let tolerance = 0.75 / self.scale;
        Envelope {
            min_x: self.original.x - tolerance,
            min_y: self.original.y - tolerance,
            max_x: self.original.x + tolerance,
            max_y: self.original.y + tolerance,
        }
    }

    fn scaled(&self, p: Coord<f64>) -> Coord<f64> {
        if self.scale == 1.0 {
            return p;
        }
        Coord {
            x: round_half_up(p.x * self.scale),
            y: round_half_up(p.y * self.scale),
        }
    }

    /// Whether the segment `p0-p1` passes through the pixel.
    pub fn intersects(&self, li: &mut LineIntersector, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        self.intersects_scaled(li, self.scaled(p0), self.scaled(p1))
    }

    fn intersects_scaled(&self, li: &mut LineIntersector, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        let seg_min_x = p0.x.min(p1.x);
        let seg_max_x = p0.x.max(p1.x);
        let seg_min_y = p0.y.min(p1.y);
        let seg_max_y = p0.y.max(p1.y);
        let outside = self.max_x < seg_min_x
            || self.min_x > seg_max_x
            || self.max_y < seg_min_y
            || self.min_y > seg_max_y;
        if outside {
            return false;
        }
        self.intersects_tolerance_square(li, p0, p1)
    }

    /// A segment intersects the half-open square when it crosses any edge
    /// properly, touches both the left and bottom edges (passing through the
    /// closed corner), or has an endpoint at the centre.
    fn intersects_tolerance_square(&self, li: &mut LineIntersector, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        let c = &self.corners;

        li.compute_intersection(p0, p1, c[0], c[1]);
        if li.is_proper() {
            return true;
        }

        li.compute_intersection(p0, p1, c[1], c[2]);
        if li.is_proper() {
            return true;
        }
        let intersects_left = li.has_intersection();

        li.compute_intersection(p0, p1, c[2], c[3]);
        if li.is_proper() {
            return true;
        }
        let intersects_bottom = li.has_intersection();

        li.compute_intersection(p0, p1, c[3], c[0]);
        if li.is_proper() {
            return true;
        }

        if intersects_left && intersects_bottom {
            return true;
        }
        p0 == self.centre || p1 == self.centre
    }

    /// Adds the pixel's coordinate as a node of segment `segment_index` when
    /// that segment passes through the pixel.
    pub fn add_snapped_node<C: Clone>(
        &self,
        li: &mut LineIntersector,
        string: &mut NodedSegmentString<C>,
        segment_index: usize,
    ) -> Result<bool> {
        let coords = string.coords();
        let (p0, p1) = (coords[segment_index], coords[segment_index + 1]);
        if self.intersects(li, p0, p1) {
            string.add_intersection(self.coordinate(), segment_index)?;
            return Ok(true);
        }
        Ok(false)
    }
}
