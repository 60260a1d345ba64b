pub mod monotone_chain;

use geo_types::Coord;
use rstar::AABB;

pub use monotone_chain::{build_chains, MonotoneChain};

/// Axis-aligned bounding box. All tests are closed: touching envelopes
/// intersect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(a: Coord<f64>, b: Coord<f64>) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn of_point(p: Coord<f64>) -> Self {
        Self::new(p, p)
    }

    /// Envelope of a coordinate sequence, `None` when it is empty.
    pub fn of_coords(coords: &[Coord<f64>]) -> Option<Self> {
        let (first, rest) = coords.split_first()?;
        let mut env = Self::of_point(*first);
        for c in rest {
            env.expand_to_include(*c);
        }
        Some(env)
    }

    pub fn expand_to_include(&mut self, c: Coord<f64>) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    pub fn expand_to_include_envelope(&mut self, other: &Envelope) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn expand_by(&self, d: f64) -> Self {
        Self {
            min_x: self.min_x - d,
            min_y: self.min_y - d,
            max_x: self.max_x + d,
            max_y: self.max_y + d,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }

    pub fn intersects_coord(&self, p: Coord<f64>) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether the segment envelope of `p0-p1` meets this envelope.
    pub fn intersects_segment(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        self.intersects(&Envelope::new(p0, p1))
    }

    /// Whether `other` lies inside this envelope, boundaries included.
    pub fn contains(&self, other: &Envelope) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Whether `q` lies in the envelope of the segment `p1-p2`.
    #[inline]
    pub fn segment_intersects_point(p1: Coord<f64>, p2: Coord<f64>, q: Coord<f64>) -> bool {
        q.x >= p1.x.min(p2.x) && q.x <= p1.x.max(p2.x) && q.y >= p1.y.min(p2.y) && q.y <= p1.y.max(p2.y)
    }

    /// Whether the envelopes of segments `p1-p2` and `q1-q2` intersect.
    #[inline]
    pub fn segments_intersect(p1: Coord<f64>, p2: Coord<f64>, q1: Coord<f64>, q2: Coord<f64>) -> bool {
        let min_q = q1.x.min(q2.x);
        let max_q = q1.x.max(q2.x);
        let min_p = p1.x.min(p2.x);
        let max_p = p1.x.max(p2.x);
        if min_p > max_q || max_p < min_q {
            return false;
        }
        let min_q = q1.y.min(q2.y);
        let max_q = q1.y.max(q2.y);
        let min_p = p1.y.min(p2.y);
        let max_p = p1.y.max(p2.y);
        !(min_p > max_q || max_p < min_q)
    }

    pub fn to_aabb(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_closed_intersection() {
        let a = Envelope::new(c(0.0, 0.0), c(1.0, 1.0));
        let b = Envelope::new(c(1.0, 1.0), c(2.0, 2.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&Envelope::of_point(c(1.0, 1.5))));
        assert!(Envelope::segments_intersect(c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(1.0, 5.0)));
        assert!(!Envelope::segments_intersect(c(0.0, 0.0), c(1.0, 0.0), c(1.5, -1.0), c(2.0, 5.0)));
    }

    #[test]
    fn test_contains_and_of_coords() {
        let env = Envelope::of_coords(&[c(3.0, 1.0), c(-1.0, 4.0), c(2.0, 2.0)]).unwrap();
        assert_eq!(env, Envelope { min_x: -1.0, min_y: 1.0, max_x: 3.0, max_y: 4.0 });
        assert!(env.contains(&env));
        assert!(env.contains(&Envelope::of_point(c(0.0, 2.0))));
        assert!(!env.contains(&env.expand_by(0.1)));
        assert!(Envelope::of_coords(&[]).is_none());
    }
}
