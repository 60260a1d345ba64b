use std::collections::HashSet;

use log::debug;
use smallvec::SmallVec;

use super::intersector::NodingIntersectionFinder;
use super::mcindex_noder::{ChainIndex, SegmentPair};
use super::segment_string::NodedSegmentString;
use crate::error::{OverlayError, Result};
use crate::graph::NodeKey;

/// Checks that a set of strings is fully noded: no segment crosses or
/// touches another except at shared endpoints, no string endpoint lies on
/// an interior vertex of another string, and no string folds back on
/// itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodingValidator;

impl NodingValidator {
    pub fn new() -> Self {
        NodingValidator
    }

    pub fn check_valid<C: Clone>(&self, strings: &[NodedSegmentString<C>]) -> Result<()> {
        check_collapses(strings)?;
        check_interior_intersections(strings)?;
        check_endpoint_vertex_intersections(strings)?;
        debug!("noding validated for {} strings", strings.len());
        Ok(())
    }

    pub fn is_valid<C: Clone>(&self, strings: &[NodedSegmentString<C>]) -> bool {
        self.check_valid(strings).is_ok()
    }

    /// Only the crossing check: strings may touch at vertices and end on
    /// each other's vertices, but no segment may pass through the interior
    /// of another.
    pub fn check_no_crossings<C: Clone>(&self, strings: &[NodedSegmentString<C>]) -> Result<()> {
        check_interior_intersections(strings)
    }
}

fn check_collapses<C: Clone>(strings: &[NodedSegmentString<C>]) -> Result<()> {
    for ss in strings {
        for w in ss.coords().windows(3) {
            if w[0] == w[2] {
                return Err(OverlayError::noding(
                    format!(
                        "found non-noded collapse at ({} {}) - ({} {}) - ({} {})",
                        w[0].x, w[0].y, w[1].x, w[1].y, w[2].x, w[2].y
                    ),
                    w[0],
                ));
            }
        }
    }
    Ok(())
}

fn check_interior_intersections<C: Clone>(strings: &[NodedSegmentString<C>]) -> Result<()> {
    let index = ChainIndex::build(strings);
    let mut finder = NodingIntersectionFinder::new(false);
    let mut pairs: SmallVec<[SegmentPair; 16]> = SmallVec::new();
    for query in 0..index.chain_count() {
        pairs.clear();
        index.overlaps_of(query, strings, &mut pairs);
        for &(s0, i0, s1, i1) in &pairs {
            if s0 == s1 && i0 == i1 {
                continue;
            }
            let a = strings[s0].coords();
            let b = strings[s1].coords();
            finder.check(a[i0], a[i0 + 1], b[i1], b[i1 + 1]);
            if let Some((pt, segs)) = finder.first() {
                return Err(OverlayError::noding(
                    format!(
                        "found non-noded intersection between ({} {}, {} {}) and ({} {}, {} {})",
                        segs[0].x, segs[0].y, segs[1].x, segs[1].y, segs[2].x, segs[2].y, segs[3].x, segs[3].y
                    ),
                    *pt,
                ));
            }
        }
    }
    Ok(())
}

/// A string endpoint touching another string's interior vertex is an
/// endpoint intersection for both segments, so it is found by hashing.
fn check_endpoint_vertex_intersections<C: Clone>(strings: &[NodedSegmentString<C>]) -> Result<()> {
    let mut endpoints: HashSet<NodeKey> = HashSet::new();
    for ss in strings {
        let pts = ss.coords();
        if let (Some(first), Some(last)) = (pts.first(), pts.last()) {
            endpoints.insert(NodeKey::from(*first));
            endpoints.insert(NodeKey::from(*last));
        }
    }
    for ss in strings {
        let pts = ss.coords();
        if pts.len() < 3 {
            continue;
        }
        for (j, p) in pts.iter().enumerate().take(pts.len() - 1).skip(1) {
            if endpoints.contains(&NodeKey::from(*p)) {
                return Err(OverlayError::noding(
                    format!("found endpoint/interior vertex intersection at index {j}"),
                    *p,
                ));
            }
        }
    }
    Ok(())
}
