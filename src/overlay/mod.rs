//! Boolean overlay of two geometries.
//!
//! Both operands are noded together into one labelled topology graph. The
//! operation then selects directed edges by the locations on either side
//! of them, and the builders turn the selection back into polygons, lines
//! and points.

pub mod dissolve;
pub mod input;
pub mod line_builder;
pub mod point_builder;
pub mod polygon_builder;

use std::fmt;
use std::str::FromStr;

use geo_types::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use log::{debug, info, warn};

use crate::error::{OverlayError, Result};
use crate::graph::{Edge, EdgeList, Label, Location, Position, TopologyGraph};
use crate::noding::node_with_precision;
use crate::precision::{magnitude, reduce_precision, PrecisionLadder, PrecisionModel};

pub use dissolve::dissolve;
pub use input::OverlayInput;
pub use line_builder::LineBuilder;
pub use point_builder::PointBuilder;
pub use polygon_builder::PolygonBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    Intersection,
    Union,
    Difference,
    SymDifference,
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpCode::Intersection => "intersection",
            OpCode::Union => "union",
            OpCode::Difference => "difference",
            OpCode::SymDifference => "symdifference",
        };
        f.write_str(name)
    }
}

impl FromStr for OpCode {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "intersection" => Ok(OpCode::Intersection),
            "union" => Ok(OpCode::Union),
            "difference" => Ok(OpCode::Difference),
            "symdifference" | "sym_difference" | "symmetric_difference" => Ok(OpCode::SymDifference),
            other => Err(OverlayError::InvalidArgument(format!("unknown overlay operation '{other}'"))),
        }
    }
}

/// Whether a point with locations `loc0` and `loc1` in the two operands
/// belongs to the result of `op`. Boundary counts as interior.
pub fn is_result_of_op(loc0: Location, loc1: Location, op: OpCode) -> bool {
    let in0 = matches!(loc0, Location::Interior | Location::Boundary);
    let in1 = matches!(loc1, Location::Interior | Location::Boundary);
    match op {
        OpCode::Intersection => in0 && in1,
        OpCode::Union => in0 || in1,
        OpCode::Difference => in0 && !in1,
        OpCode::SymDifference => in0 != in1,
    }
}

pub(crate) fn is_label_result_of_op(label: &Label, op: OpCode) -> bool {
    is_result_of_op(label.on_location(0), label.on_location(1), op)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayOptions {
    /// Precision of the first attempt.
    pub precision: PrecisionModel,
    /// Coarser precisions retried after a topology or noding failure.
    pub ladder: PrecisionLadder,
    /// Check floating-precision noding output before building the graph.
    pub validate_noding: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            precision: PrecisionModel::Floating,
            ladder: PrecisionLadder::default(),
            validate_noding: true,
        }
    }
}

/// Components of an overlay result, with the precision that produced
/// them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayResult {
    pub polygons: Vec<Polygon<f64>>,
    pub lines: Vec<LineString<f64>>,
    pub points: Vec<Point<f64>>,
    pub precision: PrecisionModel,
}

impl OverlayResult {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty() && self.points.is_empty()
    }

    /// The narrowest geometry holding every component: a single component
    /// as itself, one kind as its multi type, mixed kinds as a collection.
    pub fn into_geometry(self) -> Geometry<f64> {
        let OverlayResult {
            mut polygons,
            mut lines,
            mut points,
            ..
        } = self;
        match (polygons.len(), lines.len(), points.len()) {
            (0, 0, 0) => Geometry::GeometryCollection(GeometryCollection::default()),
            (1, 0, 0) => Geometry::Polygon(polygons.remove(0)),
            (_, 0, 0) => Geometry::MultiPolygon(MultiPolygon(polygons)),
            (0, 1, 0) => Geometry::LineString(lines.remove(0)),
            (0, _, 0) => Geometry::MultiLineString(MultiLineString(lines)),
            (0, 0, 1) => Geometry::Point(points.remove(0)),
            (0, 0, _) => Geometry::MultiPoint(MultiPoint(points)),
            _ => {
                let parts = polygons
                    .into_iter()
                    .map(Geometry::Polygon)
                    .chain(lines.into_iter().map(Geometry::LineString))
                    .chain(points.into_iter().map(Geometry::Point))
                    .collect();
                Geometry::GeometryCollection(GeometryCollection(parts))
            }
        }
    }
}

/// A boolean operation between two geometries.
///
/// ```
/// use geo_overlay::overlay::{OpCode, OverlayOp};
/// use geo_types::{polygon, Geometry};
///
/// let a = Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)]);
/// let b = Geometry::Polygon(polygon![(x: 1.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 3.0), (x: 1.0, y: 3.0)]);
/// let result = OverlayOp::new(&a, &b).compute(OpCode::Intersection).unwrap();
/// assert_eq!(result.polygons.len(), 1);
/// ```
#[derive(Debug)]
pub struct OverlayOp<'a> {
    a: &'a Geometry<f64>,
    b: &'a Geometry<f64>,
    options: OverlayOptions,
}

impl<'a> OverlayOp<'a> {
    pub fn new(a: &'a Geometry<f64>, b: &'a Geometry<f64>) -> Self {
        Self::with_options(a, b, OverlayOptions::default())
    }

    pub fn with_options(a: &'a Geometry<f64>, b: &'a Geometry<f64>, options: OverlayOptions) -> Self {
        Self { a, b, options }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Runs `op`, retrying at coarser precision when the first attempt
    /// fails on robustness grounds.
    pub fn compute(&self, op: OpCode) -> Result<OverlayResult> {
        let validate = self.options.validate_noding;
        let (result, precision) = run_with_ladder(op, &self.options, &[self.a, self.b], |geoms, pm| {
            overlay_at(&geoms[0], &geoms[1], op, pm, validate)
        })?;
        Ok(OverlayResult { precision, ..result })
    }
}

pub fn union(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<OverlayResult> {
    OverlayOp::new(a, b).compute(OpCode::Union)
}

pub fn intersection(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<OverlayResult> {
    OverlayOp::new(a, b).compute(OpCode::Intersection)
}

pub fn difference(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<OverlayResult> {
    OverlayOp::new(a, b).compute(OpCode::Difference)
}

pub fn sym_difference(a: &Geometry<f64>, b: &Geometry<f64>) -> Result<OverlayResult> {
    OverlayOp::new(a, b).compute(OpCode::SymDifference)
}

/// One overlay attempt at a fixed precision model.
fn overlay_at(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    op: OpCode,
    precision: PrecisionModel,
    validate: bool,
) -> Result<OverlayResult> {
    let mut inputs = [OverlayInput::extract(a, 0)?, OverlayInput::extract(b, 1)?];
    let strings = inputs.iter_mut().flat_map(|input| input.take_strings()).collect();
    let noded = node_with_precision(strings, precision, validate)?;
    let mut graph = build_topology_graph(&inputs, noded.into_iter().map(|ss| {
        let label = *ss.context();
        Edge::new(ss.into_coords(), label)
    }))?;

    find_result_area_edges(&mut graph, op);
    graph.cancel_duplicate_result_edges();
    let builder = extract_rings(&mut graph)?;
    let polygons = build_polygons(&builder);
    let lines = LineBuilder::new(op).build(&mut graph, &polygons);
    let points = PointBuilder::new(op).build(&graph, &lines, &polygons);
    debug!(
        "{}: {} polygons, {} lines, {} points",
        op,
        polygons.len(),
        lines.len(),
        points.len()
    );
    Ok(OverlayResult {
        polygons,
        lines,
        points,
        precision,
    })
}

/// Builds and labels the graph of both operands from noded edges.
pub fn build_topology_graph(
    inputs: &[OverlayInput; 2],
    noded: impl IntoIterator<Item = Edge>,
) -> Result<TopologyGraph> {
    for (i, input) in inputs.iter().enumerate() {
        if input.index() != i {
            return Err(OverlayError::InvalidArgument(format!(
                "operand {} passed in position {}",
                input.index(),
                i
            )));
        }
    }
    let mut graph = TopologyGraph::new();
    for input in inputs {
        for &(coord, loc) in input.nodes() {
            let node = graph.add_node(coord);
            graph.node_mut(node).label.set_on_location(input.index(), loc);
        }
    }

    let mut edge_list = EdgeList::new();
    for edge in noded {
        edge_list.insert_unique(edge);
    }
    edge_list.compute_labels_from_depths();
    edge_list.replace_collapsed_edges();
    graph.add_edges(edge_list.into_edges())?;

    let geoms = [inputs[0].geometry(), inputs[1].geometry()];
    graph.compute_labelling(geoms)?;
    graph.label_incomplete_nodes(geoms);
    Ok(graph)
}

/// Flags the area directed edges whose right side is in the result.
pub fn find_result_area_edges(graph: &mut TopologyGraph, op: OpCode) {
    for de in 0..graph.dir_edges().len() {
        let d = graph.dir_edge(de);
        let label = d.label;
        if label.is_area()
            && !d.is_interior_area_edge()
            && is_result_of_op(
                label.location(0, Position::Right),
                label.location(1, Position::Right),
                op,
            )
        {
            graph.dir_edge_mut(de).in_result = true;
        }
    }
}

/// Traces result rings over the whole graph.
pub fn extract_rings(graph: &mut TopologyGraph) -> Result<PolygonBuilder> {
    let dir_edges: Vec<_> = (0..graph.dir_edges().len()).collect();
    let nodes: Vec<_> = (0..graph.nodes().len()).collect();
    let mut builder = PolygonBuilder::new();
    builder.add(graph, &dir_edges, &nodes)?;
    Ok(builder)
}

pub fn build_polygons(builder: &PolygonBuilder) -> Vec<Polygon<f64>> {
    builder.build()
}

/// Runs `attempt` at the requested precision, then down the ladder while
/// it fails with a recoverable error. Only rungs coarser than a fixed
/// requested precision are tried.
pub(crate) fn run_with_ladder<T>(
    op: OpCode,
    options: &OverlayOptions,
    inputs: &[&Geometry<f64>],
    mut attempt: impl FnMut(&[Geometry<f64>], PrecisionModel) -> Result<T>,
) -> Result<(T, PrecisionModel)> {
    let requested = options.precision;
    let reduce = |pm: &PrecisionModel| -> Vec<Geometry<f64>> { inputs.iter().map(|g| reduce_precision(g, pm)).collect() };

    let mut last_err = match attempt(&reduce(&requested), requested) {
        Ok(v) => return Ok((v, requested)),
        Err(e) if !e.is_recoverable() => return Err(e),
        Err(e) => e,
    };
    if options.ladder.is_empty() {
        return Err(last_err);
    }

    let rungs: Vec<PrecisionModel> = ladder_rungs(&options.ladder, requested, magnitude(inputs.iter().copied()));
    let mut attempts = 1;
    for pm in rungs {
        warn!("{} failed ({}); retrying with {:?}", op, last_err, pm);
        attempts += 1;
        match attempt(&reduce(&pm), pm) {
            Ok(v) => {
                info!("{} succeeded with {:?} after {} attempts", op, pm, attempts);
                return Ok((v, pm));
            }
            Err(e) if e.is_recoverable() => last_err = e,
            Err(e) => return Err(e),
        }
    }
    Err(OverlayError::PrecisionExhausted {
        op,
        attempts,
        source: Box::new(last_err),
    })
}

fn ladder_rungs(ladder: &PrecisionLadder, requested: PrecisionModel, magnitude: f64) -> Vec<PrecisionModel> {
    ladder
        .rungs(magnitude)
        .into_iter()
        .filter(|pm| match (requested.scale(), pm.scale()) {
            (Some(req), Some(rung)) => rung < req,
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use geo_types::{line_string, point, polygon};

    fn square(x0: f64, y0: f64, size: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ])
    }

    fn area(result: &OverlayResult) -> f64 {
        result.polygons.iter().map(|p| p.unsigned_area()).sum()
    }

    #[test]
    fn test_is_result_of_op_table() {
        use Location::*;
        assert!(is_result_of_op(Interior, Boundary, OpCode::Intersection));
        assert!(!is_result_of_op(Interior, Exterior, OpCode::Intersection));
        assert!(is_result_of_op(Exterior, Interior, OpCode::Union));
        assert!(!is_result_of_op(Exterior, Exterior, OpCode::Union));
        assert!(is_result_of_op(Boundary, Exterior, OpCode::Difference));
        assert!(!is_result_of_op(Interior, Interior, OpCode::Difference));
        assert!(is_result_of_op(Exterior, Interior, OpCode::SymDifference));
        assert!(!is_result_of_op(Interior, Boundary, OpCode::SymDifference));
    }

    #[test]
    fn test_op_code_parse() {
        assert_eq!("UNION".parse::<OpCode>().unwrap(), OpCode::Union);
        assert_eq!("sym_difference".parse::<OpCode>().unwrap(), OpCode::SymDifference);
        assert!("buffer".parse::<OpCode>().is_err());
        assert_eq!(OpCode::Difference.to_string(), "difference");
    }

    #[test]
    fn test_overlapping_squares() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);
        let inter = intersection(&a, &b).unwrap();
        assert_eq!(inter.polygons.len(), 1);
        assert!((area(&inter) - 1.0).abs() < 1e-9);

        let uni = union(&a, &b).unwrap();
        assert_eq!(uni.polygons.len(), 1);
        assert!((area(&uni) - 7.0).abs() < 1e-9);

        let diff = difference(&a, &b).unwrap();
        assert!((area(&diff) - 3.0).abs() < 1e-9);

        let sym = sym_difference(&a, &b).unwrap();
        assert_eq!(sym.polygons.len(), 2);
        assert!((area(&sym) - 6.0).abs() < 1e-9);
        assert!(sym.lines.is_empty() && sym.points.is_empty());
    }

    #[test]
    fn test_touching_squares_intersect_in_a_line() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 0.0, 1.0);
        let inter = intersection(&a, &b).unwrap();
        assert!(inter.polygons.is_empty());
        assert_eq!(inter.lines.len(), 1);
        let line = &inter.lines[0];
        assert_eq!(line.0.len(), 2);
        assert!(line.0.iter().all(|c| c.x == 1.0));
    }

    #[test]
    fn test_corner_touch_gives_point() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 1.0, 1.0);
        let inter = intersection(&a, &b).unwrap();
        assert!(inter.polygons.is_empty() && inter.lines.is_empty());
        assert_eq!(inter.points, vec![point!(x: 1.0, y: 1.0)]);
    }

    #[test]
    fn test_line_clipped_by_polygon() {
        let a = square(0.0, 0.0, 4.0);
        let line = Geometry::LineString(line_string![(x: -2.0, y: 2.0), (x: 6.0, y: 2.0)]);
        let inter = intersection(&a, &line).unwrap();
        assert!(inter.polygons.is_empty());
        assert_eq!(inter.lines.len(), 1);
        let mut xs: Vec<f64> = inter.lines[0].0.iter().map(|c| c.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_eq!(xs, vec![0.0, 4.0]);

        let diff = difference(&line, &a).unwrap();
        assert_eq!(diff.lines.len(), 2);

        // the covered part of the line disappears into the union area
        let uni = union(&a, &line).unwrap();
        assert_eq!(uni.polygons.len(), 1);
        assert_eq!(uni.lines.len(), 2);
    }

    #[test]
    fn test_point_overlay() {
        let a = square(0.0, 0.0, 4.0);
        let inside = Geometry::Point(point!(x: 1.0, y: 1.0));
        let outside = Geometry::Point(point!(x: 9.0, y: 9.0));
        assert_eq!(intersection(&a, &inside).unwrap().points.len(), 1);
        assert!(intersection(&a, &outside).unwrap().is_empty());
        let uni = union(&a, &outside).unwrap();
        assert_eq!(uni.polygons.len(), 1);
        assert_eq!(uni.points, vec![point!(x: 9.0, y: 9.0)]);
    }

    #[test]
    fn test_into_geometry_shapes() {
        let empty = OverlayResult::default();
        assert_eq!(
            empty.into_geometry(),
            Geometry::GeometryCollection(GeometryCollection::default())
        );
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 5.0, 1.0);
        assert!(matches!(union(&a, &a).unwrap().into_geometry(), Geometry::Polygon(_)));
        assert!(matches!(union(&a, &b).unwrap().into_geometry(), Geometry::MultiPolygon(_)));
        let mixed = union(&a, &Geometry::Point(point!(x: 9.0, y: 9.0))).unwrap();
        assert!(matches!(mixed.into_geometry(), Geometry::GeometryCollection(_)));
    }

    #[test]
    fn test_result_winding() {
        use geo::algorithm::winding_order::Winding;
        let a = Geometry::Polygon(polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 2.0, y: 8.0), (x: 8.0, y: 8.0), (x: 8.0, y: 2.0)]],
        ));
        let result = union(&a, &square(20.0, 0.0, 1.0)).unwrap();
        for poly in &result.polygons {
            assert!(poly.exterior().is_ccw());
            for hole in poly.interiors() {
                assert!(hole.is_cw());
            }
        }
        assert!((area(&result) - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_precision_is_reported() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);
        let options = OverlayOptions {
            precision: PrecisionModel::fixed(10.0).unwrap(),
            ..OverlayOptions::default()
        };
        let result = OverlayOp::with_options(&a, &b, options)
            .compute(OpCode::Union)
            .unwrap();
        assert_eq!(result.precision, PrecisionModel::Fixed { scale: 10.0 });
        assert!((area(&result) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_ladder_skips_finer_rungs() {
        let requested = PrecisionModel::fixed(1000.0).unwrap();
        let rungs = ladder_rungs(&PrecisionLadder::default(), requested, 50.0);
        assert!(!rungs.is_empty());
        assert!(rungs.iter().all(|pm| pm.scale().unwrap() < 1000.0));
    }

    #[test]
    fn test_ladder_reports_exhaustion() {
        let a = square(0.0, 0.0, 1.0);
        let options = OverlayOptions::default();
        let mut calls = 0;
        let err = run_with_ladder(OpCode::Union, &options, &[&a], |_, _| -> Result<()> {
            calls += 1;
            Err(OverlayError::Topology {
                message: "forced".into(),
                coord: None,
            })
        })
        .unwrap_err();
        assert_eq!(calls, 8);
        match err {
            OverlayError::PrecisionExhausted { op, attempts, source } => {
                assert_eq!(op, OpCode::Union);
                assert_eq!(attempts, 8);
                assert!(source.is_recoverable());
            }
            other => panic!("unexpected error {other:?}"),
        }

        let disabled = OverlayOptions {
            ladder: PrecisionLadder::disabled(),
            ..OverlayOptions::default()
        };
        let err = run_with_ladder(OpCode::Union, &disabled, &[&a], |_, _| -> Result<()> {
            Err(OverlayError::Noding {
                message: "forced".into(),
                coord: None,
            })
        })
        .unwrap_err();
        assert!(matches!(err, OverlayError::Noding { .. }));
    }

    #[test]
    fn test_non_recoverable_errors_skip_ladder() {
        let a = square(0.0, 0.0, 1.0);
        let mut calls = 0;
        let err = run_with_ladder(OpCode::Intersection, &OverlayOptions::default(), &[&a], |_, _| -> Result<()> {
            calls += 1;
            Err(OverlayError::InvalidGeometry("bad ring".into()))
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, OverlayError::InvalidGeometry(_)));
    }
}
