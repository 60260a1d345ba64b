use std::cmp::Ordering;
use std::collections::BTreeSet;

use geo_types::Coord;
use log::trace;

use crate::algorithm::line_intersector::LineIntersector;
use crate::algorithm::quadrant::safe_octant;
use crate::error::{OverlayError, Result};

/// A node inserted into a segment string: a coordinate on segment
/// `segment_index`, or equal to vertex `segment_index`.
#[derive(Clone, Copy, Debug)]
pub struct SegmentNode {
    pub coord: Coord<f64>,
    pub segment_index: usize,
    segment_octant: u8,
    /// `false` when the node coincides with the segment's start vertex.
    is_interior: bool,
}

impl SegmentNode {
    pub fn is_interior(&self) -> bool {
        self.is_interior
    }
}

impl PartialEq for SegmentNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SegmentNode {}

impl PartialOrd for SegmentNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentNode {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.segment_index.cmp(&other.segment_index) {
            Ordering::Equal => {}
            ord => return ord,
        }
        if self.coord == other.coord {
            return Ordering::Equal;
        }
        // a node at the segment start sorts first
        if !self.is_interior {
            return Ordering::Less;
        }
        if !other.is_interior {
            return Ordering::Greater;
        }
        compare_along_segment(self.segment_octant, self.coord, other.coord)
    }
}

/// Orders two points lying on one segment by their position along it, using
/// only the segment's octant and exact coordinate comparisons.
pub fn compare_along_segment(octant: u8, p0: Coord<f64>, p1: Coord<f64>) -> Ordering {
    if p0 == p1 {
        return Ordering::Equal;
    }
    let x = relative_sign(p0.x, p1.x);
    let y = relative_sign(p0.y, p1.y);
    match octant {
        0 => compare_value(x, y),
        1 => compare_value(y, x),
        2 => compare_value(y, -x),
        3 => compare_value(-x, y),
        4 => compare_value(-x, -y),
        5 => compare_value(-y, -x),
        6 => compare_value(-y, x),
        _ => compare_value(x, -y),
    }
}

#[inline]
fn relative_sign(a: f64, b: f64) -> i32 {
    if a < b {
        -1
    } else if a > b {
        1
    } else {
        0
    }
}

#[inline]
fn compare_value(primary: i32, secondary: i32) -> Ordering {
    match primary.cmp(&0) {
        Ordering::Equal => secondary.cmp(&0),
        ord => ord,
    }
}

/// A coordinate sequence with the nodes computed for it so far, carrying an
/// opaque context that is copied onto every split piece.
#[derive(Clone, Debug)]
pub struct NodedSegmentString<C> {
    coords: Vec<Coord<f64>>,
    context: C,
    nodes: BTreeSet<SegmentNode>,
}

impl<C: Clone> NodedSegmentString<C> {
    pub fn new(coords: Vec<Coord<f64>>, context: C) -> Self {
        Self {
            coords,
            context,
            nodes: BTreeSet::new(),
        }
    }

    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<Coord<f64>> {
        self.coords
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.coords.len() > 1 && self.coords[0] == self.coords[self.coords.len() - 1]
    }

    /// Nodes in order along the string.
    pub fn nodes(&self) -> impl Iterator<Item = &SegmentNode> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn segment_octant(&self, index: usize) -> u8 {
        if index + 1 >= self.coords.len() {
            return 0;
        }
        safe_octant(self.coords[index], self.coords[index + 1])
    }

    /// Records a node at `pt` on segment `segment_index`. A point equal to
    /// the segment's end vertex is recorded against the next segment.
    pub fn add_intersection(&mut self, pt: Coord<f64>, segment_index: usize) -> Result<()> {
        if segment_index >= self.coords.len() {
            return Err(OverlayError::InvalidArgument(format!(
                "segment index {segment_index} out of range for a string of {} points",
                self.coords.len()
            )));
        }
        let mut normalized = segment_index;
        let next = normalized + 1;
        if next < self.coords.len() && pt == self.coords[next] {
            normalized = next;
        }
        self.add_node(pt, normalized);
        Ok(())
    }

    /// Records every intersection point of the last computation of `li`.
    pub fn add_intersections(&mut self, li: &LineIntersector, segment_index: usize) -> Result<()> {
        for i in 0..li.intersection_num() {
            self.add_intersection(li.intersection(i), segment_index)?;
        }
        Ok(())
    }

    fn add_node(&mut self, coord: Coord<f64>, segment_index: usize) {
        let node = SegmentNode {
            coord,
            segment_index,
            segment_octant: self.segment_octant(segment_index),
            is_interior: coord != self.coords[segment_index],
        };
        self.nodes.insert(node);
    }

    fn add_endpoints(&mut self) {
        let max = self.coords.len() - 1;
        self.add_node(self.coords[0], 0);
        self.add_node(self.coords[max], max);
    }

    /// Adds nodes at vertices where the string folds back onto itself
    /// (`A-B-A`), so that splitting never produces such a collapse.
    fn add_collapsed_nodes(&mut self) {
        let mut collapsed = Vec::new();

        let mut prev: Option<&SegmentNode> = None;
        for node in &self.nodes {
            if let Some(p) = prev {
                if p.coord == node.coord {
                    let mut between = node.segment_index - p.segment_index;
                    if !node.is_interior {
                        between = between.saturating_sub(1);
                    }
                    if between == 1 {
                        collapsed.push(p.segment_index + 1);
                    }
                }
            }
            prev = Some(node);
        }

        for i in 0..self.coords.len().saturating_sub(2) {
            if self.coords[i] == self.coords[i + 2] {
                collapsed.push(i + 1);
            }
        }

        for index in collapsed {
            self.add_node(self.coords[index], index);
        }
    }

    fn create_split_edge(&self, n0: &SegmentNode, n1: &SegmentNode) -> Option<NodedSegmentString<C>> {
        let last_seg_start = self.coords[n1.segment_index];
        let use_int_pt1 = n1.is_interior || n1.coord != last_seg_start;

        let mut pts = Vec::with_capacity(n1.segment_index - n0.segment_index + 2);
        pts.push(n0.coord);
        for i in (n0.segment_index + 1)..=n1.segment_index {
            pts.push(self.coords[i]);
        }
        if use_int_pt1 {
            pts.push(n1.coord);
        }
        pts.dedup();
        if pts.len() < 2 {
            trace!("dropping zero-length split edge at ({} {})", n0.coord.x, n0.coord.y);
            return None;
        }
        Some(NodedSegmentString::new(pts, self.context.clone()))
    }

    /// Splits the string at its nodes (plus its endpoints and collapse
    /// vertices). Pieces share their end coordinates and together cover the
    /// original string; zero-length pieces are dropped.
    pub fn split(mut self) -> Vec<NodedSegmentString<C>> {
        if self.coords.len() < 2 {
            return Vec::new();
        }
        self.add_endpoints();
        self.add_collapsed_nodes();

        let nodes: Vec<SegmentNode> = self.nodes.iter().copied().collect();
        nodes
            .windows(2)
            .filter_map(|w| self.create_split_edge(&w[0], &w[1]))
            .collect()
    }
}

/// Splits every string at its nodes.
pub fn noded_substrings<C: Clone>(strings: Vec<NodedSegmentString<C>>) -> Vec<NodedSegmentString<C>> {
    strings.into_iter().flat_map(|s| s.split()).collect()
}
