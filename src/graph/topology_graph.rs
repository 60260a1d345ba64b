use std::collections::HashMap;

use geo_types::{Coord, Geometry};
use log::{debug, trace};

use super::depth::Depth;
use super::label::{Label, Location, Position};
use super::{DirEdgeId, EdgeId, NodeId, NodeKey};
use crate::algorithm::locate::{locate_point, locate_point_in_area};
use crate::algorithm::orientation::compare_direction;
use crate::algorithm::quadrant::{is_northern, quadrant_of};
use crate::error::{OverlayError, Result};
use crate::utils::parallel;

/// Depth value of a directed edge side that has not been assigned yet.
const UNSET_DEPTH: i32 = -999;

/// The opposite directed edge. Edge `e` owns directed edges `2e` (forward)
/// and `2e + 1` (reverse).
#[inline]
pub fn sym(de: DirEdgeId) -> DirEdgeId {
    de ^ 1
}

/// Depth change from the right side of an edge to its left side, for the
/// first geometry.
pub fn depth_delta(label: &Label) -> i32 {
    let left = label.location(0, Position::Left);
    let right = label.location(0, Position::Right);
    match (left, right) {
        (Location::Interior, Location::Exterior) => 1,
        (Location::Exterior, Location::Interior) => -1,
        _ => 0,
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub coords: Vec<Coord<f64>>,
    pub label: Label,
    pub depth: Depth,
    pub depth_delta: i32,
    covered: Option<bool>,
    pub in_result: bool,
}

impl Edge {
    pub fn new(coords: Vec<Coord<f64>>, label: Label) -> Self {
        Self {
            coords,
            label,
            depth: Depth::new(),
            depth_delta: 0,
            covered: None,
            in_result: false,
        }
    }

    pub fn coordinate(&self) -> Coord<f64> {
        self.coords[0]
    }

    /// An area edge that folds back onto itself.
    pub fn is_collapsed(&self) -> bool {
        self.label.is_area() && self.coords.len() == 3 && self.coords[0] == self.coords[2]
    }

    /// The line edge a collapsed edge is replaced with.
    pub fn collapsed_edge(&self) -> Edge {
        Edge::new(vec![self.coords[0], self.coords[1]], Label::to_line_label(&self.label))
    }

    pub fn is_covered(&self) -> bool {
        self.covered == Some(true)
    }

    pub fn is_covered_set(&self) -> bool {
        self.covered.is_some()
    }

    pub fn set_covered(&mut self, covered: bool) {
        self.covered = Some(covered);
    }
}

fn canonical_key(coords: &[Coord<f64>]) -> Vec<NodeKey> {
    let forward: Vec<NodeKey> = coords.iter().map(|c| NodeKey::from(*c)).collect();
    let mut reverse = forward.clone();
    reverse.reverse();
    if reverse < forward {
        reverse
    } else {
        forward
    }
}

/// Edges awaiting insertion into a graph, with coincident edges merged.
#[derive(Debug, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
    index: HashMap<Vec<NodeKey>, EdgeId>,
}

impl EdgeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }

    /// Index of an edge with the same coordinates in either direction.
    pub fn find_equal_edge(&self, coords: &[Coord<f64>]) -> Option<EdgeId> {
        self.index.get(&canonical_key(coords)).copied()
    }

    /// Adds `edge`, or merges it into an existing coincident edge. Merging
    /// combines labels (flipped when the edges run opposite ways) and sums
    /// depths and depth deltas.
    pub fn insert_unique(&mut self, mut edge: Edge) {
        let key = canonical_key(&edge.coords);
        if let Some(&id) = self.index.get(&key) {
            let existing = &mut self.edges[id];
            let to_merge = if existing.coords == edge.coords {
                edge.label
            } else {
                edge.label.flipped()
            };
            if existing.depth.is_null() {
                let own = existing.label;
                existing.depth.add(&own);
            }
            existing.depth.add(&to_merge);
            existing.label.merge(&to_merge);
            existing.depth_delta += depth_delta(&to_merge);
            trace!("merged coincident edge {} -> {}", id, existing.label);
        } else {
            edge.depth_delta = depth_delta(&edge.label);
            self.index.insert(key, self.edges.len());
            self.edges.push(edge);
        }
    }

    /// Updates area labels of merged edges from their accumulated depths.
    /// An edge whose depth does not change across it has collapsed to a
    /// line for that geometry.
    pub fn compute_labels_from_depths(&mut self) {
        for e in &mut self.edges {
            if e.depth.is_null() {
                continue;
            }
            e.depth.normalize();
            for geom in 0..2 {
                if e.label.is_null(geom) || !e.label.is_area() || e.depth.is_null_geom(geom) {
                    continue;
                }
                if e.depth.delta(geom) == 0 {
                    e.label.to_line(geom);
                } else {
                    e.label
                        .set_location(geom, Position::Left, e.depth.location(geom, Position::Left));
                    e.label
                        .set_location(geom, Position::Right, e.depth.location(geom, Position::Right));
                }
            }
        }
    }

    pub fn replace_collapsed_edges(&mut self) {
        for e in &mut self.edges {
            if e.is_collapsed() {
                *e = e.collapsed_edge();
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct DirectedEdge {
    pub edge: EdgeId,
    pub forward: bool,
    pub origin: NodeId,
    pub dest: NodeId,
    /// Origin coordinate.
    pub coord: Coord<f64>,
    /// Second vertex along the direction of travel.
    pub direction_pt: Coord<f64>,
    pub quadrant: u8,
    pub label: Label,
    depth: [i32; 3],
    pub next: Option<DirEdgeId>,
    pub next_min: Option<DirEdgeId>,
    pub edge_ring: Option<usize>,
    pub min_edge_ring: Option<usize>,
    pub in_result: bool,
    pub visited: bool,
}

impl DirectedEdge {
    pub fn depth(&self, pos: Position) -> i32 {
        self.depth[pos.index()]
    }

    pub fn dy(&self) -> f64 {
        self.direction_pt.y - self.coord.y
    }

    /// A line edge, or an area edge lying in the exterior of both areas.
    pub fn is_line_edge(&self) -> bool {
        let is_line = self.label.is_line(0) || self.label.is_line(1);
        let exterior_if_area =
            |g: usize| !self.label.is_area_of(g) || self.label.all_positions_equal(g, Location::Exterior);
        is_line && exterior_if_area(0) && exterior_if_area(1)
    }

    /// An area edge with the interior of both areas on both sides.
    pub fn is_interior_area_edge(&self) -> bool {
        (0..2).all(|g| {
            self.label.is_area_of(g)
                && self.label.location(g, Position::Left) == Location::Interior
                && self.label.location(g, Position::Right) == Location::Interior
        })
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub coord: Coord<f64>,
    pub label: Label,
    /// Outgoing directed edges, counter-clockwise from the positive x-axis.
    star: Vec<DirEdgeId>,
    star_label: Label,
    result_area_edges: Option<Vec<DirEdgeId>>,
    pub visited: bool,
}

impl Node {
    fn new(coord: Coord<f64>) -> Self {
        Self {
            coord,
            label: Label::line(Location::None),
            star: Vec::new(),
            star_label: Label::line(Location::None),
            result_area_edges: None,
            visited: false,
        }
    }

    pub fn star(&self) -> &[DirEdgeId] {
        &self.star
    }

    pub fn degree(&self) -> usize {
        self.star.len()
    }

    /// Labelled by exactly one input geometry.
    pub fn is_isolated(&self) -> bool {
        self.label.geometry_count() == 1
    }
}

/// Planar graph of noded, labelled edges.
///
/// Nodes, edges and directed edges live in arenas addressed by integer
/// handles; every node keeps its outgoing directed edges sorted by
/// [`compare_direction`].
#[derive(Debug, Default)]
pub struct TopologyGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    dir_edges: Vec<DirectedEdge>,
    node_map: HashMap<NodeKey, NodeId>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn dir_edges(&self) -> &[DirectedEdge] {
        &self.dir_edges
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    pub fn dir_edge(&self, id: DirEdgeId) -> &DirectedEdge {
        &self.dir_edges[id]
    }

    pub fn dir_edge_mut(&mut self, id: DirEdgeId) -> &mut DirectedEdge {
        &mut self.dir_edges[id]
    }

    pub fn find_node(&self, coord: Coord<f64>) -> Option<NodeId> {
        self.node_map.get(&NodeKey::from(coord)).copied()
    }

    pub fn add_node(&mut self, coord: Coord<f64>) -> NodeId {
        let key = NodeKey::from(coord);
        if let Some(&id) = self.node_map.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node::new(coord));
        self.node_map.insert(key, id);
        id
    }

    /// Adds edges with their two directed edges and re-sorts every star.
    pub fn add_edges(&mut self, edges: Vec<Edge>) -> Result<()> {
        for edge in edges {
            let n = edge.coords.len();
            if n < 2 {
                return Err(OverlayError::InvalidArgument(format!(
                    "graph edge must have at least 2 points, found {n}"
                )));
            }
            let id = self.edges.len();
            let (p0, p1) = (edge.coords[0], edge.coords[1]);
            let (q0, q1) = (edge.coords[n - 1], edge.coords[n - 2]);
            let origin = self.add_node(p0);
            let dest = self.add_node(q0);
            let forward_quadrant = quadrant_of(p0, p1)?;
            let reverse_quadrant = quadrant_of(q0, q1)?;

            let fwd = 2 * id;
            self.dir_edges.push(DirectedEdge {
                edge: id,
                forward: true,
                origin,
                dest,
                coord: p0,
                direction_pt: p1,
                quadrant: forward_quadrant,
                label: edge.label,
                depth: [0, UNSET_DEPTH, UNSET_DEPTH],
                next: None,
                next_min: None,
                edge_ring: None,
                min_edge_ring: None,
                in_result: false,
                visited: false,
            });
            self.dir_edges.push(DirectedEdge {
                edge: id,
                forward: false,
                origin: dest,
                dest: origin,
                coord: q0,
                direction_pt: q1,
                quadrant: reverse_quadrant,
                label: edge.label.flipped(),
                depth: [0, UNSET_DEPTH, UNSET_DEPTH],
                next: None,
                next_min: None,
                edge_ring: None,
                min_edge_ring: None,
                in_result: false,
                visited: false,
            });
            self.nodes[origin].star.push(fwd);
            self.nodes[dest].star.push(sym(fwd));
            self.edges.push(edge);
        }
        self.sort_stars();
        debug!(
            "topology graph: {} nodes, {} edges",
            self.nodes.len(),
            self.edges.len()
        );
        Ok(())
    }

    fn sort_stars(&mut self) {
        let dir_edges = &self.dir_edges;
        parallel::iterate_mut(&mut self.nodes, |node| {
            node.star.sort_by(|&a, &b| {
                let a = &dir_edges[a];
                let b = &dir_edges[b];
                compare_direction(a.coord, a.direction_pt, a.quadrant, b.direction_pt, b.quadrant)
            });
        });
    }

    /// Completes directed edge labels at every node, then merges labels
    /// across symmetric edges and into the nodes.
    pub fn compute_labelling(&mut self, geoms: [&Geometry<f64>; 2]) -> Result<()> {
        for node in 0..self.nodes.len() {
            self.compute_star_labelling(node, geoms)?;
        }
        self.merge_sym_labels();
        for node in &mut self.nodes {
            let star_label = node.star_label;
            node.label.merge(&star_label);
        }
        Ok(())
    }

    fn compute_star_labelling(&mut self, node: NodeId, geoms: [&Geometry<f64>; 2]) -> Result<()> {
        self.propagate_side_labels(node, 0)?;
        self.propagate_side_labels(node, 1)?;

        // a line edge on a boundary means an area collapsed here
        let mut has_collapse = [false; 2];
        for &de in &self.nodes[node].star {
            let label = &self.dir_edges[de].label;
            for (g, collapsed) in has_collapse.iter_mut().enumerate() {
                if label.is_line(g) && label.on_location(g) == Location::Boundary {
                    *collapsed = true;
                }
            }
        }
        for &de in &self.nodes[node].star {
            let d = &mut self.dir_edges[de];
            for g in 0..2 {
                if d.label.is_any_null(g) {
                    let loc = if has_collapse[g] {
                        Location::Exterior
                    } else {
                        locate_point_in_area(d.coord, geoms[g])
                    };
                    d.label.set_all_locations_if_null(g, loc);
                }
            }
        }

        let mut star_label = Label::line(Location::None);
        for &de in &self.nodes[node].star {
            let edge_label = &self.edges[self.dir_edges[de].edge].label;
            for g in 0..2 {
                if matches!(edge_label.on_location(g), Location::Interior | Location::Boundary) {
                    star_label.set_on_location(g, Location::Interior);
                }
            }
        }
        self.nodes[node].star_label = star_label;
        Ok(())
    }

    /// Walks the star counter-clockwise carrying the current side location
    /// of geometry `geom` across edges, filling null sides and checking
    /// known ones.
    fn propagate_side_labels(&mut self, node: NodeId, geom: usize) -> Result<()> {
        let star = &self.nodes[node].star;
        let mut start_loc = Location::None;
        for &de in star {
            let label = &self.dir_edges[de].label;
            if label.is_area_of(geom) && label.location(geom, Position::Left) != Location::None {
                start_loc = label.location(geom, Position::Left);
            }
        }
        if start_loc == Location::None {
            return Ok(());
        }

        let mut curr = start_loc;
        for &de in star {
            let d = &mut self.dir_edges[de];
            if d.label.on_location(geom) == Location::None {
                d.label.set_on_location(geom, curr);
            }
            if !d.label.is_area_of(geom) {
                continue;
            }
            let left = d.label.location(geom, Position::Left);
            let right = d.label.location(geom, Position::Right);
            if right != Location::None {
                if right != curr {
                    return Err(OverlayError::topology("side location conflict", d.coord));
                }
                if left == Location::None {
                    return Err(OverlayError::topology("found single null side", d.coord));
                }
                curr = left;
            } else {
                if left != Location::None {
                    return Err(OverlayError::topology("found single null side", d.coord));
                }
                d.label.set_location(geom, Position::Right, curr);
                d.label.set_location(geom, Position::Left, curr);
            }
        }
        Ok(())
    }

    fn merge_sym_labels(&mut self) {
        for node in &self.nodes {
            for &de in &node.star {
                let sym_label = self.dir_edges[sym(de)].label;
                self.dir_edges[de].label.merge(&sym_label);
            }
        }
    }

    /// Locates nodes known to only one geometry against the other one, then
    /// fills remaining null directed edge labels from their node.
    pub fn label_incomplete_nodes(&mut self, geoms: [&Geometry<f64>; 2]) {
        for node in &mut self.nodes {
            if node.is_isolated() {
                let target = if node.label.is_null(0) { 0 } else { 1 };
                let loc = locate_point(node.coord, geoms[target]);
                node.label.set_on_location(target, loc);
            }
            let node_label = node.label;
            for &de in &node.star {
                let label = &mut self.dir_edges[de].label;
                label.set_all_locations_if_null(0, node_label.on_location(0));
                label.set_all_locations_if_null(1, node_label.on_location(1));
            }
        }
    }

    /// Removes both directions of an edge from the result when both were
    /// selected.
    pub fn cancel_duplicate_result_edges(&mut self) {
        for de in 0..self.dir_edges.len() {
            let s = sym(de);
            if self.dir_edges[de].in_result && self.dir_edges[s].in_result {
                self.dir_edges[de].in_result = false;
                self.dir_edges[s].in_result = false;
            }
        }
    }

    pub fn set_visited_edge(&mut self, de: DirEdgeId, visited: bool) {
        self.dir_edges[de].visited = visited;
        self.dir_edges[sym(de)].visited = visited;
    }

    pub fn is_incident_edge_in_result(&self, node: NodeId) -> bool {
        self.nodes[node]
            .star
            .iter()
            .any(|&de| self.edges[self.dir_edges[de].edge].in_result)
    }

    /// Star edges where either direction is in the result, computed once.
    fn result_area_edges(&mut self, node: NodeId) -> Vec<DirEdgeId> {
        if let Some(list) = &self.nodes[node].result_area_edges {
            return list.clone();
        }
        let list: Vec<DirEdgeId> = self.nodes[node]
            .star
            .iter()
            .copied()
            .filter(|&de| self.dir_edges[de].in_result || self.dir_edges[sym(de)].in_result)
            .collect();
        self.nodes[node].result_area_edges = Some(list.clone());
        list
    }

    /// Links each incoming result edge at the given nodes to the next
    /// outgoing result edge counter-clockwise.
    pub fn link_result_directed_edges(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> Result<()> {
        for node in nodes {
            self.link_result_star(node)?;
        }
        Ok(())
    }

    fn link_result_star(&mut self, node: NodeId) -> Result<()> {
        let list = self.result_area_edges(node);
        let mut first_out = None;
        let mut incoming: Option<DirEdgeId> = None;
        for &next_out in &list {
            let next_in = sym(next_out);
            if !self.dir_edges[next_out].label.is_area() {
                continue;
            }
            if first_out.is_none() && self.dir_edges[next_out].in_result {
                first_out = Some(next_out);
            }
            match incoming {
                None => {
                    if self.dir_edges[next_in].in_result {
                        incoming = Some(next_in);
                    }
                }
                Some(inc) => {
                    if self.dir_edges[next_out].in_result {
                        self.dir_edges[inc].next = Some(next_out);
                        incoming = None;
                    }
                }
            }
        }
        if let Some(inc) = incoming {
            let first = first_out.ok_or_else(|| {
                OverlayError::topology("no outgoing directed edge found", self.nodes[node].coord)
            })?;
            self.dir_edges[inc].next = Some(first);
        }
        Ok(())
    }

    /// Links the edges of maximal ring `ring` at `node` for minimal ring
    /// traversal, scanning the star clockwise.
    pub fn link_minimal_directed_edges(&mut self, node: NodeId, ring: usize) -> Result<()> {
        let list = self.result_area_edges(node);
        let mut first_out = None;
        let mut incoming: Option<DirEdgeId> = None;
        for &next_out in list.iter().rev() {
            let next_in = sym(next_out);
            if first_out.is_none() && self.dir_edges[next_out].edge_ring == Some(ring) {
                first_out = Some(next_out);
            }
            match incoming {
                None => {
                    if self.dir_edges[next_in].edge_ring == Some(ring) {
                        incoming = Some(next_in);
                    }
                }
                Some(inc) => {
                    if self.dir_edges[next_out].edge_ring == Some(ring) {
                        self.dir_edges[inc].next_min = Some(next_out);
                        incoming = None;
                    }
                }
            }
        }
        if let Some(inc) = incoming {
            let first = first_out.ok_or_else(|| {
                OverlayError::topology("found no outgoing edge for minimal ring", self.nodes[node].coord)
            })?;
            self.dir_edges[inc].next_min = Some(first);
        }
        Ok(())
    }

    /// Number of star edges at `node` belonging to maximal ring `ring`.
    pub fn outgoing_degree(&self, node: NodeId, ring: usize) -> usize {
        self.nodes[node]
            .star
            .iter()
            .filter(|&&de| self.dir_edges[de].edge_ring == Some(ring))
            .count()
    }

    /// Marks line edges at `node` as covered when they run through the
    /// interior of the result area around the node.
    pub fn find_covered_line_edges(&mut self, node: NodeId) {
        let star = &self.nodes[node].star;
        let mut start_loc = Location::None;
        for &out in star {
            let d = &self.dir_edges[out];
            if d.is_line_edge() {
                continue;
            }
            if d.in_result {
                start_loc = Location::Interior;
                break;
            }
            if self.dir_edges[sym(out)].in_result {
                start_loc = Location::Exterior;
                break;
            }
        }
        if start_loc == Location::None {
            return;
        }
        let mut curr = start_loc;
        for &out in star {
            let d = &self.dir_edges[out];
            if d.is_line_edge() {
                self.edges[d.edge].set_covered(curr == Location::Interior);
            } else {
                if d.in_result {
                    curr = Location::Exterior;
                }
                if self.dir_edges[sym(out)].in_result {
                    curr = Location::Interior;
                }
            }
        }
    }

    pub fn set_depth(&mut self, de: DirEdgeId, pos: Position, depth: i32) -> Result<()> {
        let d = &mut self.dir_edges[de];
        let current = d.depth[pos.index()];
        if current != UNSET_DEPTH && current != depth {
            return Err(OverlayError::topology("assigned depths do not match", d.coord));
        }
        d.depth[pos.index()] = depth;
        Ok(())
    }

    /// Sets the depth on side `pos` and derives the opposite side from the
    /// edge's depth delta.
    pub fn set_edge_depths(&mut self, de: DirEdgeId, pos: Position, depth: i32) -> Result<()> {
        let d = &self.dir_edges[de];
        let mut delta = self.edges[d.edge].depth_delta;
        if !d.forward {
            delta = -delta;
        }
        let direction_factor = if pos == Position::Left { -1 } else { 1 };
        let opposite_depth = depth + delta * direction_factor;
        self.set_depth(de, pos, depth)?;
        self.set_depth(de, pos.opposite(), opposite_depth)
    }

    pub fn copy_sym_depths(&mut self, de: DirEdgeId) -> Result<()> {
        let left = self.dir_edges[de].depth(Position::Left);
        let right = self.dir_edges[de].depth(Position::Right);
        let s = sym(de);
        self.set_depth(s, Position::Left, right)?;
        self.set_depth(s, Position::Right, left)
    }

    /// Propagates depths counter-clockwise around the star of `node`,
    /// starting from the already-assigned `start`. Arriving back at `start`
    /// with a different depth is an error.
    pub fn compute_star_depths(&mut self, node: NodeId, start: DirEdgeId) -> Result<()> {
        let star = self.nodes[node].star.clone();
        let index = star.iter().position(|&de| de == start).ok_or_else(|| {
            OverlayError::topology("start edge is not in the node star", self.nodes[node].coord)
        })?;
        let start_depth = self.dir_edges[start].depth(Position::Left);
        let target_last_depth = self.dir_edges[start].depth(Position::Right);
        let next_depth = self.compute_depths_along(&star[index + 1..], start_depth)?;
        let last_depth = self.compute_depths_along(&star[..index], next_depth)?;
        if last_depth != target_last_depth {
            return Err(OverlayError::topology("depth mismatch", self.dir_edges[start].coord));
        }
        Ok(())
    }

    fn compute_depths_along(&mut self, des: &[DirEdgeId], start_depth: i32) -> Result<i32> {
        let mut curr = start_depth;
        for &de in des {
            self.set_edge_depths(de, Position::Right, curr)?;
            curr = self.dir_edges[de].depth(Position::Left);
        }
        Ok(curr)
    }

    /// The star edge with the rightmost extent around `node`.
    pub fn rightmost_edge(&self, node: NodeId) -> Result<Option<DirEdgeId>> {
        let star = &self.nodes[node].star;
        let (de0, de_last) = match star.len() {
            0 => return Ok(None),
            1 => return Ok(Some(star[0])),
            n => (star[0], star[n - 1]),
        };
        let north0 = is_northern(self.dir_edges[de0].quadrant);
        let north_last = is_northern(self.dir_edges[de_last].quadrant);
        if north0 && north_last {
            Ok(Some(de0))
        } else if !north0 && !north_last {
            Ok(Some(de_last))
        } else if self.dir_edges[de0].dy() != 0.0 {
            Ok(Some(de0))
        } else if self.dir_edges[de_last].dy() != 0.0 {
            Ok(Some(de_last))
        } else {
            Err(OverlayError::topology(
                "found two horizontal edges incident on node",
                self.nodes[node].coord,
            ))
        }
    }
}
