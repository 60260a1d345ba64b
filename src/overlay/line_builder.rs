use geo_types::{Coord, LineString, Polygon};
use log::trace;

use super::{is_label_result_of_op, OpCode};
use crate::algorithm::locate::locate_point_in_polygon;
use crate::graph::{DirEdgeId, EdgeId, Location, TopologyGraph};

/// Collects the linear part of an overlay result: line edges selected by
/// the operation and not covered by a result area, plus (for intersection)
/// area boundaries where the two inputs only touch.
#[derive(Debug)]
pub struct LineBuilder {
    op: OpCode,
}

impl LineBuilder {
    pub fn new(op: OpCode) -> Self {
        Self { op }
    }

    /// Must run after the result polygons were built, so that edges in a
    /// result ring are flagged.
    pub fn build(&self, graph: &mut TopologyGraph, polygons: &[Polygon<f64>]) -> Vec<LineString<f64>> {
        self.find_covered_line_edges(graph, polygons);
        let edges = self.collect_lines(graph);
        trace!("line builder selected {} edges", edges.len());
        edges
            .into_iter()
            .map(|e| {
                graph.edge_mut(e).in_result = true;
                LineString::new(graph.edge(e).coords.clone())
            })
            .collect()
    }

    fn find_covered_line_edges(&self, graph: &mut TopologyGraph, polygons: &[Polygon<f64>]) {
        for node in 0..graph.nodes().len() {
            graph.find_covered_line_edges(node);
        }
        // line edges whose nodes touch no result area are located directly
        for de in 0..graph.dir_edges().len() {
            let d = graph.dir_edge(de);
            let (edge, coord) = (d.edge, d.coord);
            if d.is_line_edge() && !graph.edge(edge).is_covered_set() {
                let covered = is_covered_by_area(coord, polygons);
                graph.edge_mut(edge).set_covered(covered);
            }
        }
    }

    fn collect_lines(&self, graph: &mut TopologyGraph) -> Vec<EdgeId> {
        let mut edges = Vec::new();
        for de in 0..graph.dir_edges().len() {
            self.collect_line_edge(graph, de, &mut edges);
            self.collect_boundary_touch_edge(graph, de, &mut edges);
        }
        edges
    }

    fn collect_line_edge(&self, graph: &mut TopologyGraph, de: DirEdgeId, edges: &mut Vec<EdgeId>) {
        let d = graph.dir_edge(de);
        if !d.is_line_edge() || d.visited {
            return;
        }
        if is_label_result_of_op(&d.label, self.op) && !graph.edge(d.edge).is_covered() {
            edges.push(d.edge);
            graph.set_visited_edge(de, true);
        }
    }

    /// Area boundary edges that end up in an intersection result as lines
    /// because the inputs touch along them.
    fn collect_boundary_touch_edge(&self, graph: &mut TopologyGraph, de: DirEdgeId, edges: &mut Vec<EdgeId>) {
        let d = graph.dir_edge(de);
        if d.is_line_edge() || d.visited || d.is_interior_area_edge() || graph.edge(d.edge).in_result {
            return;
        }
        if self.op == OpCode::Intersection && is_label_result_of_op(&d.label, self.op) {
            edges.push(d.edge);
            graph.set_visited_edge(de, true);
        }
    }
}

fn is_covered_by_area(p: Coord<f64>, polygons: &[Polygon<f64>]) -> bool {
    polygons
        .iter()
        .any(|poly| locate_point_in_polygon(p, poly) != Location::Exterior)
}
