use log::debug;
use rstar::RTree;
use smallvec::SmallVec;

use super::intersector::{IntersectionAdder, SegmentIntersector};
use super::segment_string::{noded_substrings, NodedSegmentString};
use super::Noder;
use crate::algorithm::line_intersector::LineIntersector;
use crate::error::Result;
use crate::index::{build_chains, Envelope, MonotoneChain};
use crate::precision::PrecisionModel;

/// Candidate segment pair: `(string0, segment0, string1, segment1)`.
pub(crate) type SegmentPair = (usize, usize, usize, usize);

/// Monotone chains of a string collection, indexed by envelope.
pub(crate) struct ChainIndex {
    chains: Vec<MonotoneChain>,
    tree: RTree<MonotoneChain>,
}

impl ChainIndex {
    pub(crate) fn build<C: Clone>(strings: &[NodedSegmentString<C>]) -> Self {
        let mut chains = Vec::new();
        for (i, ss) in strings.iter().enumerate() {
            let first_id = chains.len();
            chains.extend(build_chains(ss.coords(), i, first_id));
        }
        let tree = RTree::bulk_load(chains.clone());
        Self { chains, tree }
    }

    pub(crate) fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Segment pairs from overlapping chains, where the other chain has a
    /// greater id than chain `query`. Over all `query` values each pair of
    /// chains is visited once.
    pub(crate) fn overlaps_of<C: Clone>(
        &self,
        query: usize,
        strings: &[NodedSegmentString<C>],
        out: &mut SmallVec<[SegmentPair; 16]>,
    ) {
        let q = &self.chains[query];
        let q_coords = strings[q.string_index].coords();
        for test in self.tree.locate_in_envelope_intersecting(&q.envelope.to_aabb()) {
            if test.id <= q.id {
                continue;
            }
            let t_coords = strings[test.string_index].coords();
            q.compute_overlaps(q_coords, test, t_coords, &mut |i, j| {
                out.push((q.string_index, i, test.string_index, j))
            });
        }
    }

    /// Segments whose envelope meets `env`, as `(string, segment)`.
    pub(crate) fn select<C: Clone>(
        &self,
        strings: &[NodedSegmentString<C>],
        env: &Envelope,
        out: &mut Vec<(usize, usize)>,
    ) {
        for chain in self.tree.locate_in_envelope_intersecting(&env.to_aabb()) {
            let coords = strings[chain.string_index].coords();
            chain.select(coords, env, &mut |i| out.push((chain.string_index, i)));
        }
    }
}

/// Noder driven by a monotone chain index.
///
/// Overlapping chain pairs are found through an `rstar` tree and their
/// candidate segment pairs handed to the segment intersector, which records
/// nodes. The nodes are only as accurate as floating-point intersection
/// allows; use [`SnapRoundingNoder`](super::SnapRoundingNoder) when a
/// guaranteed fully-noded result is needed.
pub struct MCIndexNoder<I = IntersectionAdder> {
    intersector: I,
}

impl MCIndexNoder<IntersectionAdder> {
    pub fn with_precision(precision: PrecisionModel) -> Self {
        Self::new(IntersectionAdder::new(LineIntersector::with_precision(precision)))
    }
}

impl Default for MCIndexNoder<IntersectionAdder> {
    fn default() -> Self {
        Self::with_precision(PrecisionModel::Floating)
    }
}

impl<I> MCIndexNoder<I> {
    pub fn new(intersector: I) -> Self {
        Self { intersector }
    }

    pub fn intersector(&self) -> &I {
        &self.intersector
    }

    pub fn into_intersector(self) -> I {
        self.intersector
    }

    /// Adds nodes to `strings` without splitting them.
    pub fn compute_intersections<C: Clone>(&mut self, strings: &mut [NodedSegmentString<C>]) -> Result<()>
    where
        I: SegmentIntersector<C>,
    {
        let index = ChainIndex::build(strings);
        let mut pairs: SmallVec<[SegmentPair; 16]> = SmallVec::new();
        let mut overlaps = 0usize;
        for query in 0..index.chain_count() {
            pairs.clear();
            index.overlaps_of(query, strings, &mut pairs);
            overlaps += pairs.len();
            for &(s0, i0, s1, i1) in &pairs {
                self.intersector.process_intersections(strings, s0, i0, s1, i1)?;
                if self.intersector.is_done() {
                    return Ok(());
                }
            }
        }
        debug!(
            "monotone chain noding: {} strings, {} chains, {} candidate segment pairs",
            strings.len(),
            index.chain_count(),
            overlaps
        );
        Ok(())
    }
}

impl<C: Clone, I: SegmentIntersector<C>> Noder<C> for MCIndexNoder<I> {
    fn compute_nodes(&mut self, mut strings: Vec<NodedSegmentString<C>>) -> Result<Vec<NodedSegmentString<C>>> {
        strings.retain(|s| s.len() >= 2);
        self.compute_intersections(&mut strings)?;
        Ok(noded_substrings(strings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Coord;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_crossing_segments_are_split() {
        let strings = vec![
            NodedSegmentString::new(vec![c(0.0, 0.0), c(10.0, 10.0)], 'a'),
            NodedSegmentString::new(vec![c(0.0, 10.0), c(10.0, 0.0)], 'b'),
        ];
        let mut noder = MCIndexNoder::default();
        let noded = noder.compute_nodes(strings).unwrap();
        assert_eq!(noded.len(), 4);
        for ss in &noded {
            assert!(ss.coords().contains(&c(5.0, 5.0)));
        }
        assert_eq!(noded.iter().filter(|s| *s.context() == 'a').count(), 2);
    }

    #[test]
    fn test_self_intersection_is_noded() {
        // a bow tie drawn as one string
        let strings = vec![NodedSegmentString::new(
            vec![c(0.0, 0.0), c(10.0, 10.0), c(10.0, 0.0), c(0.0, 10.0), c(0.0, 0.0)],
            (),
        )];
        let mut noder = MCIndexNoder::default();
        let noded = noder.compute_nodes(strings).unwrap();
        assert_eq!(noded.len(), 3);
        let ends: Vec<_> = noded.iter().map(|s| (s.coords()[0], *s.coords().last().unwrap())).collect();
        assert!(ends.iter().any(|(a, _)| *a == c(5.0, 5.0)));
        assert!(ends.iter().any(|(_, b)| *b == c(5.0, 5.0)));
    }

    #[test]
    fn test_disjoint_strings_untouched() {
        let strings = vec![
            NodedSegmentString::new(vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)], 0),
            NodedSegmentString::new(vec![c(0.0, 1.0), c(1.0, 1.0), c(2.0, 1.0)], 1),
        ];
        let noded = MCIndexNoder::default().compute_nodes(strings).unwrap();
        assert_eq!(noded.len(), 2);
        assert_eq!(noded[0].len(), 3);
    }
}
