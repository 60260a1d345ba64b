//! Robust orientation predicate and the ring measures built on it.
//!
//! The predicate evaluates the sign of the determinant
//!
//! ```text
//! | ax - cx   ay - cy |
//! | bx - cx   by - cy |
//! ```
//!
//! in double precision first. The result is trusted when its magnitude
//! exceeds an error bound derived from the worst-case rounding of the
//! products; otherwise the determinant is recomputed in double-double
//! arithmetic, whose sign is exact for any double inputs.

use std::cmp::Ordering;

use geo_types::Coord;

use super::dd::DD;

/// Relative error bound of the double-precision determinant filter.
pub const DP_SAFE_EPSILON: f64 = 1e-15;

pub const CLOCKWISE: i32 = -1;
pub const COLLINEAR: i32 = 0;
pub const COUNTERCLOCKWISE: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Clockwise,
    Collinear,
    CounterClockwise,
}

impl Orientation {
    pub fn from_index(index: i32) -> Self {
        match index.signum() {
            1 => Orientation::CounterClockwise,
            -1 => Orientation::Clockwise,
            _ => Orientation::Collinear,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Orientation::CounterClockwise => COUNTERCLOCKWISE,
            Orientation::Clockwise => CLOCKWISE,
            Orientation::Collinear => COLLINEAR,
        }
    }
}

/// Orientation of `q` relative to the directed line `p1 -> p2`:
/// `1` when `q` lies to the left (counter-clockwise turn), `-1` to the
/// right, `0` when collinear.
pub fn orientation_index(p1: Coord<f64>, p2: Coord<f64>, q: Coord<f64>) -> i32 {
    if let Some(index) = orientation_index_filter(p1, p2, q) {
        return index;
    }
    orientation_index_dd(p1, p2, q)
}

pub fn orientation(p1: Coord<f64>, p2: Coord<f64>, q: Coord<f64>) -> Orientation {
    Orientation::from_index(orientation_index(p1, p2, q))
}

/// Fast filter: returns `None` when double precision cannot decide.
pub(crate) fn orientation_index_filter(pa: Coord<f64>, pb: Coord<f64>, pc: Coord<f64>) -> Option<i32> {
    let detleft = (pa.x - pc.x) * (pb.y - pc.y);
    let detright = (pa.y - pc.y) * (pb.x - pc.x);
    let det = detleft - detright;

    let detsum = if detleft > 0.0 {
        if detright <= 0.0 {
            return Some(signum(det));
        }
        detleft + detright
    } else if detleft < 0.0 {
        if detright >= 0.0 {
            return Some(signum(det));
        }
        -detleft - detright
    } else {
        return Some(signum(det));
    };

    let errbound = DP_SAFE_EPSILON * detsum;
    if det >= errbound || -det >= errbound {
        return Some(signum(det));
    }
    None
}

/// Exact sign via double-double evaluation.
pub(crate) fn orientation_index_dd(p1: Coord<f64>, p2: Coord<f64>, q: Coord<f64>) -> i32 {
    let dx1 = DD::from(p2.x) - p1.x;
    let dy1 = DD::from(p2.y) - p1.y;
    let dx2 = DD::from(q.x) - p2.x;
    let dy2 = DD::from(q.y) - p2.y;
    (dx1 * dy2 - dy1 * dx2).signum()
}

#[inline]
fn signum(x: f64) -> i32 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Whether a closed ring is oriented counter-clockwise.
///
/// Uses the highest vertex and its neighbours, so it is robust to repeated
/// and collinear vertices. Flat or degenerate rings are not CCW.
pub fn is_ccw(ring: &[Coord<f64>]) -> bool {
    if ring.len() < 4 {
        return false;
    }
    let n_pts = ring.len() - 1;

    // first highest point reached by a rising segment
    let mut up_hi = ring[0];
    let mut up_low = ring[0];
    let mut i_up_hi = 0;
    let mut prev_y = up_hi.y;
    for i in 1..=n_pts {
        let py = ring[i].y;
        if py > prev_y && py >= up_hi.y {
            up_hi = ring[i];
            i_up_hi = i;
            up_low = ring[i - 1];
        }
        prev_y = py;
    }
    if i_up_hi == 0 {
        return false;
    }

    let mut i_down_low = i_up_hi;
    loop {
        i_down_low = (i_down_low + 1) % n_pts;
        if i_down_low == i_up_hi || ring[i_down_low].y != up_hi.y {
            break;
        }
    }
    let down_low = ring[i_down_low];
    let i_down_hi = if i_down_low > 0 { i_down_low - 1 } else { n_pts - 1 };
    let down_hi = ring[i_down_hi];

    if up_hi == down_hi {
        // a single peak vertex: the turn there decides
        if up_low == up_hi || down_low == up_hi || up_low == down_low {
            return false;
        }
        orientation_index(up_low, up_hi, down_low) == COUNTERCLOCKWISE
    } else {
        // a flat top: its direction decides
        down_hi.x - up_hi.x < 0.0
    }
}

/// Shoelace area, positive for counter-clockwise rings.
pub fn signed_area(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let x0 = ring[0].x;
    let mut sum = 0.0;
    for i in 1..ring.len() - 1 {
        let x = ring[i].x - x0;
        let y1 = ring[i + 1].y;
        let y2 = ring[i - 1].y;
        sum += x * (y2 - y1);
    }
    -sum / 2.0
}

/// Total order of two edge ends leaving the same origin, counter-clockwise
/// from the positive x-axis. Quadrants are compared first; within a
/// quadrant the orientation of one direction point against the other
/// decides, so no angles are ever computed.
pub fn compare_direction(
    origin: Coord<f64>,
    a_dir: Coord<f64>,
    a_quadrant: u8,
    b_dir: Coord<f64>,
    b_quadrant: u8,
) -> Ordering {
    let adx = a_dir.x - origin.x;
    let ady = a_dir.y - origin.y;
    let bdx = b_dir.x - origin.x;
    let bdy = b_dir.y - origin.y;
    if adx == bdx && ady == bdy {
        return Ordering::Equal;
    }
    match a_quadrant.cmp(&b_quadrant) {
        Ordering::Equal => {}
        ord => return ord,
    }
    orientation_index(origin, b_dir, a_dir).cmp(&0)
}
