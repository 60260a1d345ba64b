//! Independent operations over many inputs.
//!
//! Each operation owns its own graph, so the only parallelism is across
//! inputs. Results come back in input order, one per input, so a failure
//! in one pair does not hide the others.

use geo_types::Geometry;
use log::debug;

use crate::error::Result;
use crate::overlay::{dissolve, OpCode, OverlayOp, OverlayOptions, OverlayResult};
use crate::utils::parallel;

// Overlays are heavy enough that small batches already pay off.
const BATCH_THRESHOLD: usize = 4;

/// Runs `op` on every pair.
pub fn overlay_all(
    pairs: &[(Geometry<f64>, Geometry<f64>)],
    op: OpCode,
    options: &OverlayOptions,
) -> Vec<Result<OverlayResult>> {
    debug!("running {} over {} pairs", op, pairs.len());
    parallel::map_with_threshold(pairs, BATCH_THRESHOLD, |(a, b)| {
        OverlayOp::with_options(a, b, *options).compute(op)
    })
}

/// Dissolves every geometry on its own.
pub fn dissolve_all(geometries: &[Geometry<f64>], options: &OverlayOptions) -> Vec<Result<OverlayResult>> {
    debug!("dissolving {} geometries", geometries.len());
    parallel::map_with_threshold(geometries, BATCH_THRESHOLD, |g| dissolve(g, options))
}
