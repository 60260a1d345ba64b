use std::collections::{HashMap, HashSet};

use geo_types::{Coord, LineString};
use log::{debug, trace};

use super::{DirEdgeId, EdgeId, NodeId, NodeKey};
use crate::algorithm::orientation::compare_direction;
use crate::algorithm::quadrant::quadrant_of;
use crate::error::{OverlayError, Result};
use crate::utils::parallel;

#[derive(Clone, Debug)]
pub struct Node {
    pub coordinate: Coord<f64>,
    /// Indices of outgoing DirectedEdges.
    /// Sorted counter-clockwise by [`compare_direction`] once `sort_edges` ran.
    pub outgoing_edges: Vec<DirEdgeId>,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub line: LineString<f64>,
    pub is_marked: bool,
}

#[derive(Clone, Debug)]
pub struct DirectedEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub edge_idx: EdgeId,
    pub sym_idx: DirEdgeId,
    /// Second vertex along the direction of travel.
    pub direction_pt: Coord<f64>,
    pub quadrant: u8,
    /// Orientation in the parent LineString (true: same direction, false: opposite)
    pub edge_direction: bool,
    /// Deleted as part of a dangle or cut edge.
    pub is_marked: bool,
    pub next: Option<DirEdgeId>,
    /// Id of the maximal face ring this edge was traced into.
    label: Option<usize>,
    /// Index of the minimal ring this edge belongs to.
    pub ring_idx: Option<usize>,
}

/// Graph of linework for polygon assembly.
///
/// Each added line string becomes one edge between its endpoint nodes;
/// the input is expected to be noded. Face rings are traced by leaving
/// every node on the edge clockwise of the one arrived on.
#[derive(Debug, Default)]
pub struct PlanarGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub directed_edges: Vec<DirectedEdge>,
    pub node_map: HashMap<NodeKey, NodeId>,
    edge_keys: HashSet<Vec<NodeKey>>,
}

impl PlanarGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, coord: Coord<f64>) -> NodeId {
        let key = NodeKey::from(coord);
        if let Some(&id) = self.node_map.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            coordinate: coord,
            outgoing_edges: Vec::new(),
        });
        self.node_map.insert(key, id);
        id
    }

    /// Adds a line string as one edge. Repeated points are removed; lines
    /// that collapse to a point and duplicates of an existing edge (in
    /// either direction) are skipped. Returns whether an edge was added.
    pub fn add_line_string(&mut self, line: &LineString<f64>) -> Result<bool> {
        let mut coords = line.0.clone();
        coords.dedup();
        if coords.len() < 2 {
            return Ok(false);
        }
        let forward: Vec<NodeKey> = coords.iter().map(|c| NodeKey::from(*c)).collect();
        let mut reverse = forward.clone();
        reverse.reverse();
        let key = if reverse < forward { reverse } else { forward };
        if !self.edge_keys.insert(key) {
            trace!("skipping duplicate edge starting at ({} {})", coords[0].x, coords[0].y);
            return Ok(false);
        }

        let n = coords.len();
        let (p0, p1) = (coords[0], coords[1]);
        let (q0, q1) = (coords[n - 1], coords[n - 2]);
        let u = self.add_node(p0);
        let v = self.add_node(q0);
        let quad_u = quadrant_of(p0, p1)?;
        let quad_v = quadrant_of(q0, q1)?;

        let edge_idx = self.edges.len();
        let de_u_v_idx = self.directed_edges.len();
        let de_v_u_idx = de_u_v_idx + 1;

        self.directed_edges.push(DirectedEdge {
            src: u,
            dst: v,
            edge_idx,
            sym_idx: de_v_u_idx,
            direction_pt: p1,
            quadrant: quad_u,
            edge_direction: true,
            is_marked: false,
            next: None,
            label: None,
            ring_idx: None,
        });
        self.directed_edges.push(DirectedEdge {
            src: v,
            dst: u,
            edge_idx,
            sym_idx: de_u_v_idx,
            direction_pt: q1,
            quadrant: quad_v,
            edge_direction: false,
            is_marked: false,
            next: None,
            label: None,
            ring_idx: None,
        });
        self.edges.push(Edge {
            line: LineString::new(coords),
            is_marked: false,
        });
        self.nodes[u].outgoing_edges.push(de_u_v_idx);
        self.nodes[v].outgoing_edges.push(de_v_u_idx);
        Ok(true)
    }

    /// Sorts all outgoing edges of all nodes counter-clockwise.
    pub fn sort_edges(&mut self) {
        let directed_edges = &self.directed_edges;
        parallel::iterate_mut(&mut self.nodes, |node| {
            let origin = node.coordinate;
            node.outgoing_edges.sort_by(|&a_idx, &b_idx| {
                let a = &directed_edges[a_idx];
                let b = &directed_edges[b_idx];
                compare_direction(origin, a.direction_pt, a.quadrant, b.direction_pt, b.quadrant)
            });
        });
    }

    fn degree_non_deleted(&self, node: NodeId) -> usize {
        self.nodes[node]
            .outgoing_edges
            .iter()
            .filter(|&&de| !self.directed_edges[de].is_marked)
            .count()
    }

    fn mark_edge(&mut self, de: DirEdgeId) {
        let sym = self.directed_edges[de].sym_idx;
        self.directed_edges[de].is_marked = true;
        self.directed_edges[sym].is_marked = true;
        self.edges[self.directed_edges[de].edge_idx].is_marked = true;
    }

    /// Deletes dangles (edges with a degree-1 endpoint) iteratively and
    /// returns their lines.
    pub fn prune_dangles(&mut self) -> Vec<LineString<f64>> {
        let mut dangles = Vec::new();
        let mut to_process: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&n| self.degree_non_deleted(n) == 1)
            .collect();

        while let Some(node_idx) = to_process.pop() {
            for i in 0..self.nodes[node_idx].outgoing_edges.len() {
                let de = self.nodes[node_idx].outgoing_edges[i];
                if self.directed_edges[de].is_marked {
                    continue;
                }
                self.mark_edge(de);
                dangles.push(self.edges[self.directed_edges[de].edge_idx].line.clone());
                let neighbor = self.directed_edges[de].dst;
                if self.degree_non_deleted(neighbor) == 1 {
                    to_process.push(neighbor);
                }
            }
        }
        debug!("pruned {} dangles", dangles.len());
        dangles
    }

    /// Sets `next` on every incoming edge to the outgoing edge following
    /// it clockwise, ignoring deleted edges.
    fn compute_next_cw_edges(&mut self) {
        for node in &self.nodes {
            let mut start = None;
            let mut prev: Option<DirEdgeId> = None;
            for &out in &node.outgoing_edges {
                if self.directed_edges[out].is_marked {
                    continue;
                }
                if start.is_none() {
                    start = Some(out);
                }
                if let Some(p) = prev {
                    let sym = self.directed_edges[p].sym_idx;
                    self.directed_edges[sym].next = Some(out);
                }
                prev = Some(out);
            }
            if let Some(p) = prev {
                let sym = self.directed_edges[p].sym_idx;
                self.directed_edges[sym].next = start;
            }
        }
    }

    fn dir_edges_in_ring(&self, start: DirEdgeId) -> Result<Vec<DirEdgeId>> {
        let mut edges = Vec::new();
        let mut de = start;
        loop {
            edges.push(de);
            de = self.directed_edges[de].next.ok_or_else(|| self.ring_error("found unlinked edge in ring", de))?;
            if de == start {
                return Ok(edges);
            }
            if edges.len() > self.directed_edges.len() {
                return Err(self.ring_error("ring does not close", start));
            }
        }
    }

    fn ring_error(&self, message: &str, de: DirEdgeId) -> OverlayError {
        let node = self.directed_edges[de].src;
        OverlayError::topology(message, self.nodes[node].coordinate)
    }

    /// Labels the maximal ring of every unmarked edge and returns one start
    /// edge per ring.
    fn find_labeled_edge_rings(&mut self) -> Result<Vec<DirEdgeId>> {
        let mut starts = Vec::new();
        let mut label = 0;
        for de in 0..self.directed_edges.len() {
            if self.directed_edges[de].is_marked || self.directed_edges[de].label.is_some() {
                continue;
            }
            starts.push(de);
            for e in self.dir_edges_in_ring(de)? {
                self.directed_edges[e].label = Some(label);
            }
            label += 1;
        }
        Ok(starts)
    }

    /// Deletes cut edges (edges with the same face on both sides) and
    /// returns their lines.
    pub fn delete_cut_edges(&mut self) -> Result<Vec<LineString<f64>>> {
        self.compute_next_cw_edges();
        self.find_labeled_edge_rings()?;
        let mut cut_lines = Vec::new();
        for de in 0..self.directed_edges.len() {
            if self.directed_edges[de].is_marked {
                continue;
            }
            let sym = self.directed_edges[de].sym_idx;
            if self.directed_edges[de].label == self.directed_edges[sym].label {
                self.mark_edge(de);
                cut_lines.push(self.edges[self.directed_edges[de].edge_idx].line.clone());
            }
        }
        debug!("deleted {} cut edges", cut_lines.len());
        Ok(cut_lines)
    }

    fn label_degree(&self, node: NodeId, label: Option<usize>) -> usize {
        self.nodes[node]
            .outgoing_edges
            .iter()
            .filter(|&&de| self.directed_edges[de].label == label)
            .count()
    }

    /// Re-links edges of ring `label` at `node` so each pass through the
    /// node turns into the nearest counter-clockwise ring edge.
    fn compute_next_ccw_edges(&mut self, node: NodeId, label: Option<usize>) -> Result<()> {
        let mut first_out = None;
        let mut prev_in: Option<DirEdgeId> = None;
        for i in (0..self.nodes[node].outgoing_edges.len()).rev() {
            let de = self.nodes[node].outgoing_edges[i];
            let sym = self.directed_edges[de].sym_idx;
            let out = (self.directed_edges[de].label == label).then_some(de);
            let inc = (self.directed_edges[sym].label == label).then_some(sym);
            if out.is_none() && inc.is_none() {
                continue;
            }
            if inc.is_some() {
                prev_in = inc;
            }
            if let Some(out) = out {
                if let Some(p) = prev_in.take() {
                    self.directed_edges[p].next = Some(out);
                }
                if first_out.is_none() {
                    first_out = Some(out);
                }
            }
        }
        if let Some(p) = prev_in {
            let first = first_out.ok_or_else(|| self.ring_error("no outgoing edge to close ring", p))?;
            self.directed_edges[p].next = Some(first);
        }
        Ok(())
    }

    fn convert_maximal_to_minimal_rings(&mut self, starts: &[DirEdgeId]) -> Result<()> {
        for &start in starts {
            let label = self.directed_edges[start].label;
            let mut int_nodes = Vec::new();
            for de in self.dir_edges_in_ring(start)? {
                let node = self.directed_edges[de].src;
                if self.label_degree(node, label) > 1 && !int_nodes.contains(&node) {
                    int_nodes.push(node);
                }
            }
            for node in int_nodes {
                self.compute_next_ccw_edges(node, label)?;
            }
        }
        Ok(())
    }

    /// Traces the minimal face rings of the remaining (unmarked) edges, as
    /// lists of directed edges.
    pub fn get_edge_rings(&mut self) -> Result<Vec<Vec<DirEdgeId>>> {
        self.compute_next_cw_edges();
        for de in &mut self.directed_edges {
            de.label = None;
            de.ring_idx = None;
        }
        let starts = self.find_labeled_edge_rings()?;
        self.convert_maximal_to_minimal_rings(&starts)?;

        let mut rings = Vec::new();
        for start in 0..self.directed_edges.len() {
            if self.directed_edges[start].is_marked || self.directed_edges[start].ring_idx.is_some() {
                continue;
            }
            let ring = self.dir_edges_in_ring(start)?;
            for &de in &ring {
                if self.directed_edges[de].ring_idx.is_some() {
                    return Err(self.ring_error("found directed edge already in ring", de));
                }
                self.directed_edges[de].ring_idx = Some(rings.len());
            }
            rings.push(ring);
        }
        debug!("traced {} edge rings", rings.len());
        Ok(rings)
    }

    /// Closed coordinate sequence of a ring of directed edges.
    pub fn ring_coords(&self, ring: &[DirEdgeId]) -> Vec<Coord<f64>> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for &de in ring {
            let d = &self.directed_edges[de];
            let line = &self.edges[d.edge_idx].line.0;
            let pts: Box<dyn Iterator<Item = &Coord<f64>>> = if d.edge_direction {
                Box::new(line.iter())
            } else {
                Box::new(line.iter().rev())
            };
            for p in pts {
                if coords.last() != Some(p) {
                    coords.push(*p);
                }
            }
        }
        if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
            if first != last {
                coords.push(first);
            }
        }
        coords
    }
}
