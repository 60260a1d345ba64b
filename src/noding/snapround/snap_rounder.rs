use geo_types::Coord;
use log::{debug, trace};

use super::hot_pixel::HotPixel;
use crate::algorithm::line_intersector::LineIntersector;
use crate::error::{OverlayError, Result};
use crate::noding::intersector::InteriorIntersectionFinderAdder;
use crate::noding::mcindex_noder::{ChainIndex, MCIndexNoder};
use crate::noding::segment_string::{noded_substrings, NodedSegmentString};
use crate::noding::validator::NodingValidator;
use crate::noding::Noder;
use crate::precision::PrecisionModel;

/// Snap-rounding noder for a fixed precision model.
///
/// Every output vertex lies on the precision grid and the output is fully
/// noded. Input vertices are rounded first; interior intersections are then
/// found (and rounded) with a monotone chain pass, every segment passing
/// through an intersection pixel is snapped to it, and finally every segment
/// passing through a vertex pixel is snapped to that vertex.
#[derive(Clone, Debug)]
pub struct SnapRoundingNoder {
    precision: PrecisionModel,
    scale: f64,
    pub validate: bool,
}

impl SnapRoundingNoder {
    pub fn new(precision: PrecisionModel) -> Result<Self> {
        let scale = precision.scale().ok_or_else(|| {
            OverlayError::InvalidArgument("snap rounding requires a fixed precision model".to_string())
        })?;
        Ok(Self {
            precision,
            scale,
            validate: true,
        })
    }

    pub fn precision(&self) -> PrecisionModel {
        self.precision
    }

    fn round_strings<C: Clone>(&self, strings: Vec<NodedSegmentString<C>>) -> Vec<NodedSegmentString<C>> {
        let total = strings.len();
        let rounded: Vec<_> = strings
            .into_iter()
            .filter_map(|ss| {
                let context = ss.context().clone();
                let mut coords: Vec<Coord<f64>> =
                    ss.into_coords().into_iter().map(|c| self.precision.make_precise(c)).collect();
                coords.dedup();
                if coords.len() < 2 {
                    return None;
                }
                Some(NodedSegmentString::new(coords, context))
            })
            .collect();
        if rounded.len() < total {
            trace!("{} strings collapsed to a point when rounded", total - rounded.len());
        }
        rounded
    }

    /// Snaps every segment passing through `pixel` to it. With a parent
    /// vertex `(string, vertex)`, the segments adjacent to that vertex are
    /// skipped.
    fn snap<C: Clone>(
        &self,
        li: &mut LineIntersector,
        index: &ChainIndex,
        strings: &mut [NodedSegmentString<C>],
        pixel: &HotPixel,
        parent: Option<(usize, usize)>,
        candidates: &mut Vec<(usize, usize)>,
    ) -> Result<bool> {
        candidates.clear();
        index.select(strings, &pixel.safe_envelope(), candidates);
        let mut added = false;
        for &(s, seg) in candidates.iter() {
            if let Some((ps, vertex)) = parent {
                if s == ps && (seg == vertex || seg + 1 == vertex) {
                    continue;
                }
            }
            added |= pixel.add_snapped_node(li, &mut strings[s], seg)?;
        }
        Ok(added)
    }
}

impl<C: Clone> Noder<C> for SnapRoundingNoder {
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<C>>) -> Result<Vec<NodedSegmentString<C>>> {
        let mut strings = self.round_strings(strings);
        let mut li = LineIntersector::with_precision(self.precision);

        // interior intersections, rounded to the grid
        let mut finder = MCIndexNoder::new(InteriorIntersectionFinderAdder::new(li.clone()));
        finder.compute_intersections(&mut strings)?;
        let intersections = finder.into_intersector().into_interior_intersections();

        let index = ChainIndex::build(&strings);
        let mut candidates = Vec::new();

        for pt in &intersections {
            let pixel = HotPixel::new(*pt, self.scale);
            self.snap(&mut li, &index, &mut strings, &pixel, None, &mut candidates)?;
        }

        let mut vertex_snaps = 0usize;
        for s in 0..strings.len() {
            for v in 0..strings[s].len() {
                let pt = strings[s].coords()[v];
                let pixel = HotPixel::new(pt, self.scale);
                if self.snap(&mut li, &index, &mut strings, &pixel, Some((s, v)), &mut candidates)? {
                    strings[s].add_intersection(pt, v)?;
                    vertex_snaps += 1;
                }
            }
        }
        debug!(
            "snap rounding at scale {}: {} strings, {} interior intersections, {} vertex snaps",
            self.scale,
            strings.len(),
            intersections.len(),
            vertex_snaps
        );

        let noded = noded_substrings(strings);
        if self.validate {
            NodingValidator::new().check_valid(&noded)?;
        }
        Ok(noded)
    }
}
