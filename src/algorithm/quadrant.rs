//! Quadrant and octant classification of direction vectors.
//!
//! Quadrants are numbered counter-clockwise from the positive x-axis:
//!
//! ```text
//!  1 | 0
//!  --+--
//!  2 | 3
//! ```

use geo_types::Coord;

use crate::error::{OverlayError, Result};

pub const NE: u8 = 0;
pub const NW: u8 = 1;
pub const SW: u8 = 2;
pub const SE: u8 = 3;

/// Quadrant of the direction `(dx, dy)`. Axis-aligned directions belong to
/// the quadrant counter-clockwise of the axis' positive side.
pub fn quadrant(dx: f64, dy: f64) -> Result<u8> {
    if dx == 0.0 && dy == 0.0 {
        return Err(OverlayError::InvalidArgument(format!(
            "cannot compute the quadrant of a zero-length vector ({dx}, {dy})"
        )));
    }
    Ok(quadrant_unchecked(dx, dy))
}

#[inline]
pub(crate) fn quadrant_unchecked(dx: f64, dy: f64) -> u8 {
    if dx >= 0.0 {
        if dy >= 0.0 {
            NE
        } else {
            SE
        }
    } else if dy >= 0.0 {
        NW
    } else {
        SW
    }
}

/// Quadrant of the direction from `p0` to `p1`.
pub fn quadrant_of(p0: Coord<f64>, p1: Coord<f64>) -> Result<u8> {
    quadrant(p1.x - p0.x, p1.y - p0.y)
}

#[inline]
pub fn is_northern(quad: u8) -> bool {
    quad == NE || quad == NW
}

/// Octant of the direction `(dx, dy)`, numbered counter-clockwise from the
/// positive x-axis. Octants split each quadrant along the diagonal.
pub fn octant(dx: f64, dy: f64) -> Result<u8> {
    if dx == 0.0 && dy == 0.0 {
        return Err(OverlayError::InvalidArgument(format!(
            "cannot compute the octant of a zero-length vector ({dx}, {dy})"
        )));
    }
    let adx = dx.abs();
    let ady = dy.abs();
    let oct = if dx >= 0.0 {
        if dy >= 0.0 {
            if adx >= ady {
                0
            } else {
                1
            }
        } else if adx >= ady {
            7
        } else {
            6
        }
    } else if dy >= 0.0 {
        if adx >= ady {
            3
        } else {
            2
        }
    } else if adx >= ady {
        4
    } else {
        5
    };
    Ok(oct)
}

/// Octant of a segment, `0` for a zero-length segment.
pub fn safe_octant(p0: Coord<f64>, p1: Coord<f64>) -> u8 {
    octant(p1.x - p0.x, p1.y - p0.y).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrants_ccw() {
        assert_eq!(quadrant(1.0, 1.0).unwrap(), NE);
        assert_eq!(quadrant(-1.0, 1.0).unwrap(), NW);
        assert_eq!(quadrant(-1.0, -1.0).unwrap(), SW);
        assert_eq!(quadrant(1.0, -1.0).unwrap(), SE);
        // axes
        assert_eq!(quadrant(1.0, 0.0).unwrap(), NE);
        assert_eq!(quadrant(0.0, 1.0).unwrap(), NE);
        assert_eq!(quadrant(-1.0, 0.0).unwrap(), NW);
        assert_eq!(quadrant(0.0, -1.0).unwrap(), SE);
        assert!(quadrant(0.0, 0.0).is_err());
    }

    #[test]
    fn test_octants() {
        assert_eq!(octant(2.0, 1.0).unwrap(), 0);
        assert_eq!(octant(1.0, 2.0).unwrap(), 1);
        assert_eq!(octant(-1.0, 2.0).unwrap(), 2);
        assert_eq!(octant(-2.0, 1.0).unwrap(), 3);
        assert_eq!(octant(-2.0, -1.0).unwrap(), 4);
        assert_eq!(octant(-1.0, -2.0).unwrap(), 5);
        assert_eq!(octant(1.0, -2.0).unwrap(), 6);
        assert_eq!(octant(2.0, -1.0).unwrap(), 7);
        assert_eq!(safe_octant(Coord { x: 1.0, y: 1.0 }, Coord { x: 1.0, y: 1.0 }), 0);
    }
}
