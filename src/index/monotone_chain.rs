//! Monotone chains: runs of consecutive segments that all point into the
//! same quadrant.
//!
//! Within a chain the coordinates are monotone in both x and y, so the
//! envelope of any sub-range is the envelope of its two end coordinates.
//! That makes overlap search between two chains a simple bisection with
//! exact pruning.

use geo_types::Coord;
use rstar::{RTreeObject, AABB};

use super::Envelope;
use crate::algorithm::quadrant::quadrant_unchecked;

#[derive(Clone, Debug, PartialEq)]
pub struct MonotoneChain {
    /// Index of the parent string in the caller's collection.
    pub string_index: usize,
    /// Index of the first coordinate of the chain.
    pub start: usize,
    /// Index of the last coordinate of the chain.
    pub end: usize,
    pub envelope: Envelope,
    /// Unique id, used to report each pair of chains once.
    pub id: usize,
}

impl RTreeObject for MonotoneChain {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope.to_aabb()
    }
}

/// Partitions `coords` into the minimal number of monotone chains.
///
/// Zero-length segments never break a chain. Chains are returned in order
/// and together cover every segment index exactly once. Ids are assigned
/// consecutively starting at `first_id`.
pub fn build_chains(coords: &[Coord<f64>], string_index: usize, first_id: usize) -> Vec<MonotoneChain> {
    let mut chains = Vec::new();
    if coords.len() < 2 {
        return chains;
    }
    let mut chain_start = 0;
    loop {
        let chain_end = find_chain_end(coords, chain_start);
        chains.push(MonotoneChain {
            string_index,
            start: chain_start,
            end: chain_end,
            envelope: Envelope::new(coords[chain_start], coords[chain_end]),
            id: first_id + chains.len(),
        });
        chain_start = chain_end;
        if chain_start >= coords.len() - 1 {
            break;
        }
    }
    chains
}

fn find_chain_end(coords: &[Coord<f64>], start: usize) -> usize {
    let mut safe_start = start;
    // skip leading zero-length segments
    while safe_start < coords.len() - 1 && coords[safe_start] == coords[safe_start + 1] {
        safe_start += 1;
    }
    if safe_start >= coords.len() - 1 {
        return coords.len() - 1;
    }
    let chain_quad = quadrant_of_segment(coords[safe_start], coords[safe_start + 1]);
    let mut last = start + 1;
    while last < coords.len() {
        if coords[last - 1] != coords[last] {
            let quad = quadrant_of_segment(coords[last - 1], coords[last]);
            if quad != chain_quad {
                break;
            }
        }
        last += 1;
    }
    last - 1
}

#[inline]
fn quadrant_of_segment(p0: Coord<f64>, p1: Coord<f64>) -> u8 {
    quadrant_unchecked(p1.x - p0.x, p1.y - p0.y)
}

impl MonotoneChain {
    pub fn segment_count(&self) -> usize {
        self.end - self.start
    }

    /// Reports every pair of segments `(i, j)`, `i` from this chain and `j`
    /// from `other`, whose envelopes intersect. `coords` and `other_coords`
    /// are the parent strings of the two chains.
    pub fn compute_overlaps<F>(
        &self,
        coords: &[Coord<f64>],
        other: &MonotoneChain,
        other_coords: &[Coord<f64>],
        action: &mut F,
    ) where
        F: FnMut(usize, usize),
    {
        overlaps_between(coords, self.start, self.end, other_coords, other.start, other.end, action);
    }

    /// Reports every segment of the chain whose envelope meets `search`.
    pub fn select<F>(&self, coords: &[Coord<f64>], search: &Envelope, action: &mut F)
    where
        F: FnMut(usize),
    {
        select_between(coords, search, self.start, self.end, action);
    }
}

fn overlaps_between<F>(
    pts0: &[Coord<f64>],
    start0: usize,
    end0: usize,
    pts1: &[Coord<f64>],
    start1: usize,
    end1: usize,
    action: &mut F,
) where
    F: FnMut(usize, usize),
{
    if !Envelope::segments_intersect(pts0[start0], pts0[end0], pts1[start1], pts1[end1]) {
        return;
    }
    if end0 - start0 == 1 && end1 - start1 == 1 {
        action(start0, start1);
        return;
    }
    let mid0 = (start0 + end0) / 2;
    let mid1 = (start1 + end1) / 2;

    if start0 < mid0 {
        if start1 < mid1 {
            overlaps_between(pts0, start0, mid0, pts1, start1, mid1, action);
        }
        if mid1 < end1 {
            overlaps_between(pts0, start0, mid0, pts1, mid1, end1, action);
        }
    }
    if mid0 < end0 {
        if start1 < mid1 {
            overlaps_between(pts0, mid0, end0, pts1, start1, mid1, action);
        }
        if mid1 < end1 {
            overlaps_between(pts0, mid0, end0, pts1, mid1, end1, action);
        }
    }
}

fn select_between<F>(pts: &[Coord<f64>], search: &Envelope, start: usize, end: usize, action: &mut F)
where
    F: FnMut(usize),
{
    if !search.intersects_segment(pts[start], pts[end]) {
        return;
    }
    if end - start == 1 {
        action(start);
        return;
    }
    let mid = (start + end) / 2;
    if start < mid {
        select_between(pts, search, start, mid, action);
    }
    if mid < end {
        select_between(pts, search, mid, end, action);
    }
}
