use geo_types::{Coord, LineString, Point, Polygon};

use super::{is_label_result_of_op, OpCode};
use crate::algorithm::locate::{is_on_line, locate_point_in_polygon};
use crate::graph::{Location, TopologyGraph};

/// Collects isolated result points: nodes selected by the operation that
/// no result edge touches and no result line or area covers.
#[derive(Debug)]
pub struct PointBuilder {
    op: OpCode,
}

impl PointBuilder {
    pub fn new(op: OpCode) -> Self {
        Self { op }
    }

    pub fn build(
        &self,
        graph: &TopologyGraph,
        lines: &[LineString<f64>],
        polygons: &[Polygon<f64>],
    ) -> Vec<Point<f64>> {
        let mut points = Vec::new();
        for (id, node) in graph.nodes().iter().enumerate() {
            if graph.is_incident_edge_in_result(id) {
                continue;
            }
            // intersection may keep nodes where edges cross; the other
            // operations only keep edge-free nodes
            if node.degree() != 0 && self.op != OpCode::Intersection {
                continue;
            }
            if is_label_result_of_op(&node.label, self.op) && !is_covered(node.coord, lines, polygons) {
                points.push(Point(node.coord));
            }
        }
        points
    }
}

fn is_covered(p: Coord<f64>, lines: &[LineString<f64>], polygons: &[Polygon<f64>]) -> bool {
    lines.iter().any(|l| is_on_line(p, &l.0))
        || polygons
            .iter()
            .any(|poly| locate_point_in_polygon(p, poly) != Location::Exterior)
}
