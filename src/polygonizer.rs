use crate::algorithm::locate::is_in_ring;
use crate::algorithm::orientation::{is_ccw, signed_area};
use crate::error::Result;
use crate::graph::PlanarGraph;
use crate::index::Envelope;
use crate::noding::{node_with_precision, NodedSegmentString, NodingValidator};
use crate::precision::PrecisionModel;
use crate::utils::parallel;
use geo::algorithm::winding_order::Winding;
use geo_types::{Coord, Geometry, LineString, Polygon};
use log::{debug, trace};
use rstar::{RTree, RTreeObject, AABB};

// Wrapper for a shell ring to be indexable by rstar
struct IndexedShell {
    envelope: Envelope,
    index: usize,
}

impl RTreeObject for IndexedShell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope.to_aabb()
    }
}

/// A closed face ring traced from the graph.
#[derive(Clone, Debug)]
struct FaceRing {
    coords: Vec<Coord<f64>>,
    envelope: Envelope,
}

impl FaceRing {
    fn new(coords: Vec<Coord<f64>>) -> Option<Self> {
        let envelope = Envelope::of_coords(&coords)?;
        Some(Self { coords, envelope })
    }

    /// A face ring is usable as a polygon ring when it has an area and
    /// does not cross itself. Touching itself at a vertex is allowed.
    fn is_valid(&self) -> bool {
        if self.coords.len() < 4 || signed_area(&self.coords) == 0.0 {
            return false;
        }
        let ring = [NodedSegmentString::new(self.coords.clone(), ())];
        match NodingValidator::new().check_no_crossings(&ring) {
            Ok(()) => true,
            Err(e) => {
                trace!("face ring is not simple: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, Default)]
struct PolygonizeResult {
    polygons: Vec<Polygon<f64>>,
    dangles: Vec<LineString<f64>>,
    cut_edges: Vec<LineString<f64>>,
    invalid_rings: Vec<LineString<f64>>,
}

/// Forms polygons from the faces of a set of lines.
///
/// The lines should be correctly noded (touching only at endpoints) unless
/// `node_input` is set. Dangles and cut edges cannot bound a face and are
/// reported separately.
pub struct Polygonizer {
    // Configuration
    pub check_valid_rings: bool,
    pub node_input: bool,
    /// Snap-round the input to this scale when noding it.
    pub snap_scale: Option<f64>,

    lines: Vec<LineString<f64>>,
    result: Option<PolygonizeResult>,
}

impl Default for Polygonizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygonizer {
    pub fn new() -> Self {
        Self {
            check_valid_rings: true,
            node_input: false,
            snap_scale: None,
            lines: Vec::new(),
            result: None,
        }
    }

    /// Adds the linear components of a geometry, including polygon rings.
    pub fn add_geometry(&mut self, geom: Geometry<f64>) {
        extract_lines(&geom, &mut self.lines);
        self.result = None;
    }

    /// Computes the polygons.
    /// This is the main entry point.
    pub fn polygonize(&mut self) -> Result<Vec<Polygon<f64>>> {
        Ok(self.compute()?.polygons.clone())
    }

    /// Edges with an endpoint not connected to any other edge.
    pub fn dangles(&mut self) -> Result<&[LineString<f64>]> {
        Ok(&self.compute()?.dangles)
    }

    /// Edges with the same face on both sides.
    pub fn cut_edges(&mut self) -> Result<&[LineString<f64>]> {
        Ok(&self.compute()?.cut_edges)
    }

    /// Face rings rejected as polygon rings.
    pub fn invalid_rings(&mut self) -> Result<&[LineString<f64>]> {
        Ok(&self.compute()?.invalid_rings)
    }

    fn compute(&mut self) -> Result<&PolygonizeResult> {
        if self.result.is_none() {
            let result = self.run()?;
            self.result = Some(result);
        }
        Ok(&*self.result.get_or_insert_with(PolygonizeResult::default))
    }

    fn build_graph(&self) -> Result<PlanarGraph> {
        let mut graph = PlanarGraph::new();
        if self.node_input {
            let precision = match self.snap_scale {
                Some(scale) => PrecisionModel::fixed(scale)?,
                None => PrecisionModel::Floating,
            };
            let strings = self
                .lines
                .iter()
                .map(|ls| NodedSegmentString::new(ls.0.clone(), ()))
                .collect();
            for ss in node_with_precision(strings, precision, true)? {
                graph.add_line_string(&LineString::new(ss.into_coords()))?;
            }
        } else {
            for ls in &self.lines {
                graph.add_line_string(ls)?;
            }
        }
        Ok(graph)
    }

    fn run(&self) -> Result<PolygonizeResult> {
        let mut graph = self.build_graph()?;

        // 1. Sort edges (Geometry Graph operation)
        graph.sort_edges();

        // 2. Remove edges that cannot bound a face
        let dangles = graph.prune_dangles();
        let cut_edges = graph.delete_cut_edges()?;

        // 3. Find rings
        let edge_rings = graph.get_edge_rings()?;

        let mut shells = Vec::new();
        let mut holes = Vec::new();
        let mut invalid_rings = Vec::new();
        for ring in &edge_rings {
            let Some(face) = FaceRing::new(graph.ring_coords(ring)) else {
                continue;
            };
            if self.check_valid_rings && !face.is_valid() {
                invalid_rings.push(LineString::new(face.coords));
                continue;
            }
            // faces are traced clockwise; counter-clockwise rings surround holes
            if is_ccw(&face.coords) {
                holes.push(face);
            } else {
                shells.push(face);
            }
        }

        // 4. Assign holes
        let assignments = assign_holes_to_shells(&shells, &holes);
        let mut shell_holes: Vec<Vec<LineString<f64>>> = vec![vec![]; shells.len()];
        for (hole, shell) in assignments.into_iter().enumerate() {
            match shell {
                Some(idx) => {
                    let mut ring = LineString::new(holes[hole].coords.clone());
                    ring.make_cw_winding();
                    shell_holes[idx].push(ring);
                }
                None => trace!("dropping hole without a shell"),
            }
        }

        let polygons: Vec<Polygon<f64>> = shells
            .into_iter()
            .zip(shell_holes)
            .map(|(shell, holes)| {
                let mut exterior = LineString::new(shell.coords);
                exterior.make_ccw_winding();
                Polygon::new(exterior, holes)
            })
            .collect();
        debug!(
            "polygonized {} polygons ({} dangles, {} cut edges, {} invalid rings)",
            polygons.len(),
            dangles.len(),
            cut_edges.len(),
            invalid_rings.len()
        );
        Ok(PolygonizeResult {
            polygons,
            dangles,
            cut_edges,
            invalid_rings,
        })
    }
}

/// For each hole, the smallest shell containing it. A shell with the same
/// envelope as the hole is the other side of the same face and is skipped.
fn assign_holes_to_shells(shells: &[FaceRing], holes: &[FaceRing]) -> Vec<Option<usize>> {
    let tree = RTree::bulk_load(
        shells
            .iter()
            .enumerate()
            .map(|(index, s)| IndexedShell {
                envelope: s.envelope,
                index,
            })
            .collect(),
    );

    parallel::map(holes, |hole| {
        let mut best: Option<usize> = None;
        for cand in tree.locate_in_envelope_intersecting(&hole.envelope.to_aabb()) {
            let shell = &shells[cand.index];
            if shell.envelope == hole.envelope || !shell.envelope.contains(&hole.envelope) {
                continue;
            }
            let test_pt = hole
                .coords
                .iter()
                .copied()
                .find(|p| !shell.coords.contains(p))
                .unwrap_or(hole.coords[0]);
            if !is_in_ring(test_pt, &shell.coords) {
                continue;
            }
            if best.map_or(true, |b| shells[b].envelope.contains(&shell.envelope)) {
                best = Some(cand.index);
            }
        }
        best
    })
}

fn extract_lines(geom: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geom {
        Geometry::Line(l) => out.push(LineString::new(vec![l.start, l.end])),
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => {
            out.extend(mls.0.clone());
        }
        Geometry::Polygon(poly) => {
            out.push(poly.exterior().clone());
            out.extend(poly.interiors().iter().cloned());
        }
        Geometry::MultiPolygon(mpoly) => {
            for poly in mpoly {
                out.push(poly.exterior().clone());
                out.extend(poly.interiors().iter().cloned());
            }
        }
        Geometry::Rect(r) => extract_lines(&Geometry::Polygon(r.to_polygon()), out),
        Geometry::Triangle(t) => extract_lines(&Geometry::Polygon(t.to_polygon()), out),
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                extract_lines(g, out);
            }
        }
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
    }
}
