//! Noding: rewriting a set of segment strings so that they meet only at
//! shared endpoints.

pub mod intersector;
pub mod mcindex_noder;
pub mod segment_string;
pub mod snapround;
pub mod validator;

use log::debug;

use crate::error::Result;
use crate::precision::PrecisionModel;

pub use intersector::{IntersectionAdder, InteriorIntersectionFinderAdder, NodingIntersectionFinder, SegmentIntersector};
pub use mcindex_noder::MCIndexNoder;
pub use segment_string::{noded_substrings, NodedSegmentString, SegmentNode};
pub use snapround::SnapRoundingNoder;
pub use validator::NodingValidator;

/// Computes all intersections between a set of strings and returns the
/// strings split at them.
///
/// The output covers exactly the same point set as the input, and every
/// output string carries the context of the input string it came from.
pub trait Noder<C> {
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<C>>) -> Result<Vec<NodedSegmentString<C>>>;
}

/// Convenience wrapper for running any noder.
pub fn compute_nodes<C, N: Noder<C> + ?Sized>(
    noder: &mut N,
    strings: Vec<NodedSegmentString<C>>,
) -> Result<Vec<NodedSegmentString<C>>> {
    noder.compute_nodes(strings)
}

/// Nodes `strings` with the noder suited to `precision`: monotone chain
/// noding for floating precision (checked afterwards when `validate` is
/// set), snap rounding for a fixed scale.
pub fn node_with_precision<C: Clone>(
    strings: Vec<NodedSegmentString<C>>,
    precision: PrecisionModel,
    validate: bool,
) -> Result<Vec<NodedSegmentString<C>>> {
    if precision.is_floating() {
        let mut noder = MCIndexNoder::with_precision(precision);
        let noded = compute_nodes(&mut noder, strings)?;
        if validate {
            NodingValidator::new().check_valid(&noded)?;
        }
        debug!("floating noding produced {} strings", noded.len());
        Ok(noded)
    } else {
        let mut noder = SnapRoundingNoder::new(precision)?;
        noder.validate = validate;
        compute_nodes(&mut noder, strings)
    }
}
