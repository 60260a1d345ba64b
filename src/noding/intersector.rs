//! Actions applied to candidate segment pairs found by a noder.

use geo_types::Coord;

use super::segment_string::NodedSegmentString;
use crate::algorithm::line_intersector::LineIntersector;
use crate::error::Result;

/// Processes a pair of segments `(string0, segment0)`, `(string1, segment1)`
/// reported by a noder. Implementations may add nodes to the strings.
pub trait SegmentIntersector<C> {
    fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString<C>],
        string0: usize,
        segment0: usize,
        string1: usize,
        segment1: usize,
    ) -> Result<()>;

    /// Lets a noder stop early once the intersector has what it needs.
    fn is_done(&self) -> bool {
        false
    }
}

#[inline]
fn segment<C: Clone>(strings: &[NodedSegmentString<C>], s: usize, i: usize) -> (Coord<f64>, Coord<f64>) {
    let coords = strings[s].coords();
    (coords[i], coords[i + 1])
}

/// Adds every non-trivial intersection to both strings' node lists.
///
/// An intersection is trivial when it is the shared vertex of two adjacent
/// segments of one string, or the closing vertex of a closed string.
#[derive(Debug, Default)]
pub struct IntersectionAdder {
    li: LineIntersector,
    pub num_tests: usize,
    pub num_intersections: usize,
    pub num_interior_intersections: usize,
    pub num_proper_intersections: usize,
}

impl IntersectionAdder {
    pub fn new(li: LineIntersector) -> Self {
        Self {
            li,
            ..Self::default()
        }
    }

    pub fn has_proper_intersection(&self) -> bool {
        self.num_proper_intersections > 0
    }

    pub fn has_interior_intersection(&self) -> bool {
        self.num_interior_intersections > 0
    }

    fn is_trivial_intersection<C: Clone>(
        &self,
        strings: &[NodedSegmentString<C>],
        s0: usize,
        i0: usize,
        s1: usize,
        i1: usize,
    ) -> bool {
        if s0 != s1 || self.li.intersection_num() != 1 {
            return false;
        }
        if i0.abs_diff(i1) == 1 {
            return true;
        }
        let ss = &strings[s0];
        if ss.is_closed() {
            let max_seg = ss.len() - 2;
            if (i0 == 0 && i1 == max_seg) || (i1 == 0 && i0 == max_seg) {
                return true;
            }
        }
        false
    }
}

impl<C: Clone> SegmentIntersector<C> for IntersectionAdder {
    fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString<C>],
        s0: usize,
        i0: usize,
        s1: usize,
        i1: usize,
    ) -> Result<()> {
        if s0 == s1 && i0 == i1 {
            return Ok(());
        }
        self.num_tests += 1;
        let (p00, p01) = segment(strings, s0, i0);
        let (p10, p11) = segment(strings, s1, i1);
        self.li.compute_intersection(p00, p01, p10, p11);
        if !self.li.has_intersection() {
            return Ok(());
        }
        self.num_intersections += 1;
        if self.li.is_interior_intersection() {
            self.num_interior_intersections += 1;
        }
        if !self.is_trivial_intersection(strings, s0, i0, s1, i1) {
            strings[s0].add_intersections(&self.li, i0)?;
            strings[s1].add_intersections(&self.li, i1)?;
            if self.li.is_proper() {
                self.num_proper_intersections += 1;
            }
        }
        Ok(())
    }
}

/// Finds interior intersections, adds them as nodes and remembers their
/// coordinates. Drives the first phase of snap rounding.
#[derive(Debug, Default)]
pub struct InteriorIntersectionFinderAdder {
    li: LineIntersector,
    interior_intersections: Vec<Coord<f64>>,
}

impl InteriorIntersectionFinderAdder {
    pub fn new(li: LineIntersector) -> Self {
        Self {
            li,
            interior_intersections: Vec::new(),
        }
    }

    pub fn interior_intersections(&self) -> &[Coord<f64>] {
        &self.interior_intersections
    }

    pub fn into_interior_intersections(self) -> Vec<Coord<f64>> {
        self.interior_intersections
    }
}

impl<C: Clone> SegmentIntersector<C> for InteriorIntersectionFinderAdder {
    fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString<C>],
        s0: usize,
        i0: usize,
        s1: usize,
        i1: usize,
    ) -> Result<()> {
        if s0 == s1 && i0 == i1 {
            return Ok(());
        }
        let (p00, p01) = segment(strings, s0, i0);
        let (p10, p11) = segment(strings, s1, i1);
        self.li.compute_intersection(p00, p01, p10, p11);
        if self.li.has_intersection() && self.li.is_interior_intersection() {
            for k in 0..self.li.intersection_num() {
                self.interior_intersections.push(self.li.intersection(k));
            }
            strings[s0].add_intersections(&self.li, i0)?;
            strings[s1].add_intersections(&self.li, i1)?;
        }
        Ok(())
    }
}

/// Looks for an intersection that is interior to one of the two segments,
/// which a correctly noded set of strings never contains.
#[derive(Debug, Default)]
pub struct NodingIntersectionFinder {
    li: LineIntersector,
    find_all: bool,
    found: Vec<(Coord<f64>, [Coord<f64>; 4])>,
}

impl NodingIntersectionFinder {
    pub fn new(find_all: bool) -> Self {
        Self {
            li: LineIntersector::new(),
            find_all,
            found: Vec::new(),
        }
    }

    pub fn has_intersection(&self) -> bool {
        !self.found.is_empty()
    }

    /// The first offending point with the two segments it lies on.
    pub fn first(&self) -> Option<&(Coord<f64>, [Coord<f64>; 4])> {
        self.found.first()
    }

    pub fn count(&self) -> usize {
        self.found.len()
    }

    /// Checks a single pair of segments; shared by the noder-driven and the
    /// direct validation paths.
    pub fn check(&mut self, p00: Coord<f64>, p01: Coord<f64>, p10: Coord<f64>, p11: Coord<f64>) {
        if self.is_done_finding() {
            return;
        }
        self.li.compute_intersection(p00, p01, p10, p11);
        if self.li.has_intersection() && (self.li.is_proper() || self.li.is_interior_intersection()) {
            let pt = (0..self.li.intersection_num())
                .map(|k| self.li.intersection(k))
                .find(|pt| (*pt != p00 && *pt != p01) || (*pt != p10 && *pt != p11))
                .unwrap_or_else(|| self.li.intersection(0));
            self.found.push((pt, [p00, p01, p10, p11]));
        }
    }

    fn is_done_finding(&self) -> bool {
        !self.find_all && !self.found.is_empty()
    }
}

impl<C: Clone> SegmentIntersector<C> for NodingIntersectionFinder {
    fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString<C>],
        s0: usize,
        i0: usize,
        s1: usize,
        i1: usize,
    ) -> Result<()> {
        if s0 == s1 && i0 == i1 {
            return Ok(());
        }
        let (p00, p01) = segment(strings, s0, i0);
        let (p10, p11) = segment(strings, s1, i1);
        self.check(p00, p01, p10, p11);
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.is_done_finding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_adder_records_crossing_on_both() {
        let mut strings = vec![
            NodedSegmentString::new(vec![c(0.0, 0.0), c(10.0, 10.0)], 0),
            NodedSegmentString::new(vec![c(0.0, 10.0), c(10.0, 0.0)], 1),
        ];
        let mut adder = IntersectionAdder::new(LineIntersector::new());
        adder.process_intersections(&mut strings, 0, 0, 1, 0).unwrap();
        assert!(adder.has_proper_intersection());
        assert_eq!(strings[0].node_count(), 1);
        assert_eq!(strings[1].nodes().next().unwrap().coord, c(5.0, 5.0));
    }

    #[test]
    fn test_adjacent_segments_are_trivial() {
        let mut strings = vec![NodedSegmentString::new(
            vec![c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0), c(0.0, 0.0)],
            (),
        )];
        let mut adder = IntersectionAdder::new(LineIntersector::new());
        adder.process_intersections(&mut strings, 0, 0, 0, 1).unwrap();
        adder.process_intersections(&mut strings, 0, 0, 0, 2).unwrap();
        assert_eq!(adder.num_intersections, 2);
        assert_eq!(strings[0].node_count(), 0);
    }

    #[test]
    fn test_noding_finder_accepts_shared_endpoints() {
        let mut finder = NodingIntersectionFinder::new(true);
        finder.check(c(0.0, 0.0), c(5.0, 5.0), c(5.0, 5.0), c(10.0, 0.0));
        assert!(!finder.has_intersection());
        finder.check(c(0.0, 0.0), c(10.0, 0.0), c(5.0, 0.0), c(5.0, 5.0));
        assert!(finder.has_intersection());
        assert_eq!(finder.first().unwrap().0, c(5.0, 0.0));
    }
}
