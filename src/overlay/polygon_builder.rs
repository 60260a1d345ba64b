use geo::algorithm::winding_order::Winding;
use geo_types::{Coord, LineString, Polygon};
use log::{debug, warn};

use crate::algorithm::locate::is_in_ring;
use crate::algorithm::orientation::is_ccw;
use crate::error::{OverlayError, Result};
use crate::graph::{DirEdgeId, NodeId, TopologyGraph};
use crate::index::Envelope;

pub type RingId = usize;

/// A closed ring of result directed edges.
///
/// Shells run clockwise (interior on the right); holes run
/// counter-clockwise.
#[derive(Clone, Debug)]
struct EdgeRing {
    edges: Vec<DirEdgeId>,
    coords: Vec<Coord<f64>>,
    envelope: Envelope,
    is_hole: bool,
    shell: Option<RingId>,
    holes: Vec<RingId>,
}

/// Assembles polygons from the result-area directed edges of a topology
/// graph.
///
/// Rings are first traced as maximal rings. A maximal ring touching itself
/// at a node is split into minimal rings, of which at most one is a shell;
/// holes not placed that way are matched to the smallest shell that
/// contains them.
#[derive(Debug, Default)]
pub struct PolygonBuilder {
    rings: Vec<EdgeRing>,
    shells: Vec<RingId>,
    maximal_count: usize,
    minimal_count: usize,
}

impl PolygonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds rings from `dir_edges` (whose result flags are already set)
    /// and links them at `nodes`. Shells accumulate across calls.
    pub fn add(&mut self, graph: &mut TopologyGraph, dir_edges: &[DirEdgeId], nodes: &[NodeId]) -> Result<()> {
        graph.link_result_directed_edges(nodes.iter().copied())?;
        let max_rings = self.build_maximal_rings(graph, dir_edges)?;
        let mut free_holes = Vec::new();
        let edge_rings = self.build_minimal_rings(graph, &max_rings, &mut free_holes)?;
        for ring in edge_rings {
            if self.rings[ring].is_hole {
                free_holes.push(ring);
            } else {
                self.shells.push(ring);
            }
        }
        self.place_free_holes(free_holes);
        debug!(
            "polygon builder: {} maximal rings, {} minimal rings, {} shells",
            self.maximal_count,
            self.minimal_count,
            self.shells.len()
        );
        Ok(())
    }

    pub fn maximal_ring_count(&self) -> usize {
        self.maximal_count
    }

    pub fn minimal_ring_count(&self) -> usize {
        self.minimal_count
    }

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    /// The assembled polygons, exteriors counter-clockwise and interiors
    /// clockwise.
    pub fn build(&self) -> Vec<Polygon<f64>> {
        self.shells
            .iter()
            .map(|&s| {
                let shell = &self.rings[s];
                let mut exterior = LineString::new(shell.coords.clone());
                exterior.make_ccw_winding();
                let interiors = shell
                    .holes
                    .iter()
                    .map(|&h| {
                        let mut hole = LineString::new(self.rings[h].coords.clone());
                        hole.make_cw_winding();
                        hole
                    })
                    .collect();
                Polygon::new(exterior, interiors)
            })
            .collect()
    }

    fn build_maximal_rings(&mut self, graph: &mut TopologyGraph, dir_edges: &[DirEdgeId]) -> Result<Vec<RingId>> {
        let mut rings = Vec::new();
        for &de in dir_edges {
            let d = graph.dir_edge(de);
            if d.in_result && d.label.is_area() && d.edge_ring.is_none() {
                let ring = self.build_ring(graph, de, false)?;
                for &e in &self.rings[ring].edges {
                    let edge = graph.dir_edge(e).edge;
                    graph.edge_mut(edge).in_result = true;
                }
                rings.push(ring);
            }
        }
        self.maximal_count += rings.len();
        Ok(rings)
    }

    fn max_node_degree(&self, graph: &TopologyGraph, ring: RingId) -> usize {
        self.rings[ring]
            .edges
            .iter()
            .map(|&de| graph.outgoing_degree(graph.dir_edge(de).origin, ring))
            .max()
            .unwrap_or(0)
            * 2
    }

    /// Splits maximal rings that touch themselves into minimal rings.
    /// Returns the maximal rings that need no splitting.
    fn build_minimal_rings(
        &mut self,
        graph: &mut TopologyGraph,
        max_rings: &[RingId],
        free_holes: &mut Vec<RingId>,
    ) -> Result<Vec<RingId>> {
        let mut edge_rings = Vec::new();
        for &er in max_rings {
            if self.max_node_degree(graph, er) <= 2 {
                edge_rings.push(er);
                continue;
            }
            let edges = self.rings[er].edges.clone();
            let mut linked: Vec<NodeId> = Vec::new();
            for &de in &edges {
                let node = graph.dir_edge(de).origin;
                if !linked.contains(&node) {
                    graph.link_minimal_directed_edges(node, er)?;
                    linked.push(node);
                }
            }
            let mut min_rings = Vec::new();
            for &de in &edges {
                if graph.dir_edge(de).min_edge_ring.is_none() {
                    min_rings.push(self.build_ring(graph, de, true)?);
                }
            }
            self.minimal_count += min_rings.len();

            match self.find_shell(&min_rings)? {
                Some(shell) => {
                    for &r in &min_rings {
                        if self.rings[r].is_hole {
                            self.set_shell(r, shell);
                        }
                    }
                    self.shells.push(shell);
                }
                None => free_holes.extend(min_rings),
            }
        }
        Ok(edge_rings)
    }

    fn find_shell(&self, min_rings: &[RingId]) -> Result<Option<RingId>> {
        let mut shell = None;
        for &r in min_rings {
            if self.rings[r].is_hole {
                continue;
            }
            if shell.is_some() {
                return Err(OverlayError::topology(
                    "found two shells in minimal ring list",
                    self.rings[r].coords[0],
                ));
            }
            shell = Some(r);
        }
        Ok(shell)
    }

    fn set_shell(&mut self, hole: RingId, shell: RingId) {
        self.rings[hole].shell = Some(shell);
        self.rings[shell].holes.push(hole);
    }

    /// Traces the ring starting at `start`, following `next_min` for
    /// minimal rings and `next` otherwise.
    fn build_ring(&mut self, graph: &mut TopologyGraph, start: DirEdgeId, minimal: bool) -> Result<RingId> {
        let id = self.rings.len();
        let mut edges = Vec::new();
        let mut coords: Vec<Coord<f64>> = Vec::new();
        let mut de = start;
        loop {
            let d = graph.dir_edge(de);
            let ring_of = if minimal { d.min_edge_ring } else { d.edge_ring };
            if ring_of == Some(id) {
                return Err(OverlayError::topology(
                    "directed edge visited twice during ring-building",
                    d.coord,
                ));
            }
            if !d.label.is_area() {
                return Err(OverlayError::topology("ring edge is not an area edge", d.coord));
            }
            let (coord, forward, next) = (d.coord, d.forward, if minimal { d.next_min } else { d.next });
            add_points(&mut coords, &graph.edge(d.edge).coords, forward, edges.is_empty());
            edges.push(de);

            let d = graph.dir_edge_mut(de);
            if minimal {
                d.min_edge_ring = Some(id);
            } else {
                d.edge_ring = Some(id);
            }
            de = next.ok_or_else(|| OverlayError::topology("found null directed edge", coord))?;
            if de == start {
                break;
            }
        }

        let envelope = Envelope::of_coords(&coords).unwrap_or_else(|| Envelope::of_point(graph.dir_edge(start).coord));
        let is_hole = is_ccw(&coords);
        self.rings.push(EdgeRing {
            edges,
            coords,
            envelope,
            is_hole,
            shell: None,
            holes: Vec::new(),
        });
        Ok(id)
    }

    /// Gives each hole without a shell the smallest shell containing it.
    /// A hole not enclosed by any other ring is an island traced the wrong
    /// way round and becomes a shell.
    ///
    /// All islands are promoted before any hole is placed, so placement
    /// does not depend on ring order.
    fn place_free_holes(&mut self, free_holes: Vec<RingId>) {
        let islands: Vec<RingId> = free_holes
            .iter()
            .copied()
            .filter(|&h| self.rings[h].shell.is_none() && !self.is_enclosed(h, &free_holes))
            .collect();
        for &island in &islands {
            let ring = &mut self.rings[island];
            ring.coords.reverse();
            ring.is_hole = false;
            self.shells.push(island);
        }

        for &hole in &free_holes {
            if self.rings[hole].shell.is_some() || !self.rings[hole].is_hole {
                continue;
            }
            match self.find_ring_containing(hole) {
                Some(shell) => self.set_shell(hole, shell),
                None => {
                    let c = self.rings[hole].coords[0];
                    warn!("discarding hole at ({} {}) with no containing shell", c.x, c.y);
                }
            }
        }
    }

    fn is_enclosed(&self, hole: RingId, free_holes: &[RingId]) -> bool {
        let env = &self.rings[hole].envelope;
        self.shells
            .iter()
            .chain(free_holes)
            .any(|&r| r != hole && self.rings[r].envelope.contains(env))
    }

    fn find_ring_containing(&self, hole: RingId) -> Option<RingId> {
        let test = &self.rings[hole];
        let mut min_shell: Option<RingId> = None;
        for &s in &self.shells {
            let shell = &self.rings[s];
            if !shell.envelope.contains(&test.envelope) {
                continue;
            }
            let pt = point_not_in_list(&test.coords, &shell.coords).unwrap_or(test.coords[0]);
            if !is_in_ring(pt, &shell.coords) {
                continue;
            }
            if min_shell.map_or(true, |m| self.rings[m].envelope.contains(&shell.envelope)) {
                min_shell = Some(s);
            }
        }
        min_shell
    }
}

/// Appends the coordinates of an edge in travel direction, skipping the
/// first one unless this is the first edge of the ring.
fn add_points(coords: &mut Vec<Coord<f64>>, edge: &[Coord<f64>], forward: bool, is_first: bool) {
    let skip = if is_first { 0 } else { 1 };
    if forward {
        coords.extend(edge.iter().skip(skip));
    } else {
        coords.extend(edge.iter().rev().skip(skip));
    }
}

fn point_not_in_list(points: &[Coord<f64>], list: &[Coord<f64>]) -> Option<Coord<f64>> {
    points.iter().copied().find(|p| !list.contains(p))
}
