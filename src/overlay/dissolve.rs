//! Union of all areal components of a single geometry.
//!
//! Overlapping and adjacent polygons are merged by side depths rather than
//! by labels: the graph is split into connected subgraphs, each subgraph
//! gets the depth of the region outside it from the subgraphs already
//! processed to its right, and depths are then propagated edge by edge.
//! An edge is a result boundary where the depth steps from 0 to at least 1.

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use geo_types::{Coord, Geometry, Polygon};
use log::debug;

use super::input::OverlayInput;
use super::polygon_builder::PolygonBuilder;
use super::{run_with_ladder, OpCode, OverlayOptions, OverlayResult};
use crate::algorithm::orientation::{orientation_index, CLOCKWISE, COUNTERCLOCKWISE};
use crate::error::{OverlayError, Result};
use crate::graph::topology_graph::sym;
use crate::graph::{DirEdgeId, Edge, EdgeList, NodeId, Position, TopologyGraph};
use crate::index::Envelope;
use crate::noding::node_with_precision;

/// Merges every polygon in `geometry` into a set of non-overlapping
/// polygons. Points and lines are ignored.
pub fn dissolve(geometry: &Geometry<f64>, options: &OverlayOptions) -> Result<OverlayResult> {
    let validate = options.validate_noding;
    let (polygons, precision) = run_with_ladder(OpCode::Union, options, &[geometry], |geoms, pm| {
        dissolve_at(&geoms[0], pm, validate)
    })?;
    Ok(OverlayResult {
        polygons,
        precision,
        ..OverlayResult::default()
    })
}

fn dissolve_at(
    geometry: &Geometry<f64>,
    precision: crate::precision::PrecisionModel,
    validate: bool,
) -> Result<Vec<Polygon<f64>>> {
    let mut input = OverlayInput::extract(geometry, 0)?;
    let strings = input
        .take_strings()
        .into_iter()
        .filter(|ss| ss.context().is_area())
        .collect();
    let noded = node_with_precision(strings, precision, validate)?;

    let mut edge_list = EdgeList::new();
    for ss in noded {
        let label = *ss.context();
        let coords = ss.into_coords();
        // collapsed to a point by rounding
        if coords.len() == 2 && coords[0] == coords[1] {
            continue;
        }
        edge_list.insert_unique(Edge::new(coords, label));
    }
    let mut graph = TopologyGraph::new();
    graph.add_edges(edge_list.into_edges())?;

    let mut subgraphs = create_subgraphs(&mut graph)?;
    // rightmost first, so the region outside each subgraph is known
    subgraphs.sort_by(|a, b| b.rightmost_coord.x.total_cmp(&a.rightmost_coord.x));

    let mut builder = PolygonBuilder::new();
    let mut processed: Vec<Subgraph> = Vec::with_capacity(subgraphs.len());
    for subgraph in subgraphs {
        let outside_depth = depth_at(&graph, &processed, subgraph.rightmost_coord);
        subgraph.compute_depth(&mut graph, outside_depth)?;
        subgraph.find_result_edges(&mut graph);
        builder.add(&mut graph, &subgraph.dir_edges, &subgraph.nodes)?;
        processed.push(subgraph);
    }
    debug!("dissolve: {} subgraphs, {} shells", processed.len(), builder.shell_count());
    Ok(builder.build())
}

/// A connected component of the graph.
#[derive(Debug)]
struct Subgraph {
    dir_edges: Vec<DirEdgeId>,
    nodes: Vec<NodeId>,
    /// Rightmost edge, oriented so its right side faces outwards.
    rightmost_edge: DirEdgeId,
    rightmost_coord: Coord<f64>,
    envelope: Envelope,
}

fn create_subgraphs(graph: &mut TopologyGraph) -> Result<Vec<Subgraph>> {
    let mut subgraphs = Vec::new();
    for node in 0..graph.nodes().len() {
        if !graph.node(node).visited {
            subgraphs.push(Subgraph::create(graph, node)?);
        }
    }
    Ok(subgraphs)
}

impl Subgraph {
    fn create(graph: &mut TopologyGraph, start: NodeId) -> Result<Self> {
        let mut dir_edges = Vec::new();
        let mut nodes = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if graph.node(node).visited {
                continue;
            }
            graph.node_mut(node).visited = true;
            nodes.push(node);
            for &de in graph.node(node).star() {
                dir_edges.push(de);
                let next = graph.dir_edge(sym(de)).origin;
                if !graph.node(next).visited {
                    stack.push(next);
                }
            }
        }

        let mut envelope = Envelope::of_point(graph.node(start).coord);
        for &de in &dir_edges {
            for c in &graph.edge(graph.dir_edge(de).edge).coords {
                envelope.expand_to_include(*c);
            }
        }
        let (rightmost_edge, rightmost_coord) = find_rightmost_edge(graph, &dir_edges)?;
        Ok(Self {
            dir_edges,
            nodes,
            rightmost_edge,
            rightmost_coord,
            envelope,
        })
    }

    /// Assigns side depths to every directed edge, starting from
    /// `outside_depth` on the outer side of the rightmost edge.
    fn compute_depth(&self, graph: &mut TopologyGraph, outside_depth: i32) -> Result<()> {
        for &de in &self.dir_edges {
            graph.dir_edge_mut(de).visited = false;
        }
        let start = self.rightmost_edge;
        graph.set_edge_depths(start, Position::Right, outside_depth)?;
        graph.copy_sym_depths(start)?;
        graph.dir_edge_mut(start).visited = true;

        let start_node = graph.dir_edge(start).origin;
        let mut seen: HashSet<NodeId> = HashSet::from([start_node]);
        let mut queue = VecDeque::from([start_node]);
        while let Some(node) = queue.pop_front() {
            compute_node_depth(graph, node)?;
            let star = graph.node(node).star().to_vec();
            for de in star {
                let s = sym(de);
                if graph.dir_edge(s).visited {
                    continue;
                }
                let adjacent = graph.dir_edge(s).origin;
                if seen.insert(adjacent) {
                    queue.push_back(adjacent);
                }
            }
        }
        Ok(())
    }

    /// Directed edges with the area on their right and nothing on their
    /// left.
    fn find_result_edges(&self, graph: &mut TopologyGraph) {
        for &de in &self.dir_edges {
            let d = graph.dir_edge(de);
            if d.depth(Position::Right) >= 1 && d.depth(Position::Left) <= 0 && !d.is_interior_area_edge() {
                graph.dir_edge_mut(de).in_result = true;
            }
        }
    }
}

fn compute_node_depth(graph: &mut TopologyGraph, node: NodeId) -> Result<()> {
    let star = graph.node(node).star().to_vec();
    let start = star
        .iter()
        .copied()
        .find(|&de| graph.dir_edge(de).visited || graph.dir_edge(sym(de)).visited)
        .ok_or_else(|| OverlayError::topology("unable to find edge to compute depths", graph.node(node).coord))?;
    graph.compute_star_depths(node, start)?;
    for de in star {
        graph.dir_edge_mut(de).visited = true;
        graph.copy_sym_depths(de)?;
    }
    Ok(())
}

/// Finds the directed edge of the subgraph at its rightmost coordinate,
/// oriented so that its right side faces out of the subgraph.
fn find_rightmost_edge(graph: &TopologyGraph, dir_edges: &[DirEdgeId]) -> Result<(DirEdgeId, Coord<f64>)> {
    let mut found: Option<(DirEdgeId, usize, Coord<f64>)> = None;
    for &de in dir_edges {
        let d = graph.dir_edge(de);
        if !d.forward {
            continue;
        }
        let coords = &graph.edge(d.edge).coords;
        for (i, c) in coords.iter().enumerate().take(coords.len() - 1) {
            if found.map_or(true, |(_, _, m)| c.x > m.x) {
                found = Some((de, i, *c));
            }
        }
    }
    let (mut min_de, mut min_index, min_coord) =
        found.ok_or_else(|| OverlayError::InvalidArgument("subgraph has no edges".into()))?;

    if min_index == 0 {
        // at a node: pick the rightmost edge of the star
        let node = graph.dir_edge(min_de).origin;
        min_de = graph
            .rightmost_edge(node)?
            .ok_or_else(|| OverlayError::topology("node has no edges", min_coord))?;
        if !graph.dir_edge(min_de).forward {
            min_de = sym(min_de);
            min_index = graph.edge(graph.dir_edge(min_de).edge).coords.len() - 1;
        }
    } else {
        // at an interior vertex: use the segment that is not hidden
        let pts = &graph.edge(graph.dir_edge(min_de).edge).coords;
        let prev = pts[min_index - 1];
        let next = pts[min_index + 1];
        let orient = orientation_index(min_coord, next, prev);
        let use_prev = (prev.y < min_coord.y && next.y < min_coord.y && orient == COUNTERCLOCKWISE)
            || (prev.y > min_coord.y && next.y > min_coord.y && orient == CLOCKWISE);
        if use_prev {
            min_index -= 1;
        }
    }

    let side = rightmost_side_of_segment(graph, min_de, min_index)
        .or_else(|| min_index.checked_sub(1).and_then(|i| rightmost_side_of_segment(graph, min_de, i)));
    let oriented = if side == Some(Position::Left) { sym(min_de) } else { min_de };
    Ok((oriented, min_coord))
}

/// Side of segment `i` of the edge that faces right; `None` for a
/// horizontal or missing segment.
fn rightmost_side_of_segment(graph: &TopologyGraph, de: DirEdgeId, i: usize) -> Option<Position> {
    let coords = &graph.edge(graph.dir_edge(de).edge).coords;
    if i + 1 >= coords.len() || coords[i].y == coords[i + 1].y {
        return None;
    }
    if coords[i].y < coords[i + 1].y {
        Some(Position::Right)
    } else {
        Some(Position::Left)
    }
}

/// Upward segment of a processed edge and the depth on its left.
#[derive(Clone, Copy, Debug)]
struct DepthSegment {
    p0: Coord<f64>,
    p1: Coord<f64>,
    left_depth: i32,
}

impl DepthSegment {
    fn min_x(&self) -> f64 {
        self.p0.x.min(self.p1.x)
    }

    fn max_x(&self) -> f64 {
        self.p0.x.max(self.p1.x)
    }

    fn orientation_of(&self, other: &DepthSegment) -> i32 {
        let o0 = orientation_index(self.p0, self.p1, other.p0);
        let o1 = orientation_index(self.p0, self.p1, other.p1);
        if o0 >= 0 && o1 >= 0 {
            return o0.max(o1);
        }
        if o0 <= 0 && o1 <= 0 {
            return o0.min(o1);
        }
        0
    }

    /// Orders segments left to right where their x ranges overlap.
    fn compare(&self, other: &DepthSegment) -> Ordering {
        if self.min_x() >= other.max_x() {
            return Ordering::Greater;
        }
        if self.max_x() <= other.min_x() {
            return Ordering::Less;
        }
        let o = self.orientation_of(other);
        if o != 0 {
            return o.cmp(&0);
        }
        let o = -other.orientation_of(self);
        if o != 0 {
            return o.cmp(&0);
        }
        compare_coords(self.p0, other.p0).then_with(|| compare_coords(self.p1, other.p1))
    }
}

fn compare_coords(a: Coord<f64>, b: Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// Depth of the region containing `p` relative to the processed
/// subgraphs: the left depth of the nearest segment to the right of `p`
/// that a horizontal ray from `p` crosses.
fn depth_at(graph: &TopologyGraph, processed: &[Subgraph], p: Coord<f64>) -> i32 {
    let mut stabbed = Vec::new();
    for subgraph in processed {
        let env = &subgraph.envelope;
        if p.y < env.min_y || p.y > env.max_y {
            continue;
        }
        for &de in &subgraph.dir_edges {
            if graph.dir_edge(de).forward {
                find_stabbed_segments(graph, p, de, &mut stabbed);
            }
        }
    }
    stabbed
        .iter()
        .min_by(|a, b| a.compare(b))
        .map_or(0, |ds| ds.left_depth)
}

fn find_stabbed_segments(graph: &TopologyGraph, p: Coord<f64>, de: DirEdgeId, stabbed: &mut Vec<DepthSegment>) {
    let d = graph.dir_edge(de);
    let pts = &graph.edge(d.edge).coords;
    for w in pts.windows(2) {
        let (mut p0, mut p1) = (w[0], w[1]);
        let reversed = p0.y > p1.y;
        if reversed {
            std::mem::swap(&mut p0, &mut p1);
        }
        if p0.x.max(p1.x) < p.x {
            continue;
        }
        if p0.y == p1.y {
            continue;
        }
        if p.y < p0.y || p.y > p1.y {
            continue;
        }
        if orientation_index(p0, p1, p) == CLOCKWISE {
            continue;
        }
        let left_depth = if reversed {
            d.depth(Position::Right)
        } else {
            d.depth(Position::Left)
        };
        stabbed.push(DepthSegment { p0, p1, left_depth });
    }
}
