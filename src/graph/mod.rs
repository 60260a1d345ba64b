//! Graph structures built from noded linework: the labelled topology graph
//! used by overlay and dissolve, and the plain planar graph used by the
//! polygonizer.

pub mod depth;
pub mod label;
pub mod planar_graph;
pub mod topology_graph;


use geo_types::Coord;

pub use depth::Depth;
pub use label::{Label, Location, Position, TopologyLocation};
pub use planar_graph::PlanarGraph;
pub use topology_graph::{DirectedEdge, Edge, EdgeList, Node, TopologyGraph};

// Type aliases for indices to ensure we don't mix them up
pub type NodeId = usize;
pub type EdgeId = usize;
pub type DirEdgeId = usize;

/// Hashable exact key for a coordinate (f64 is not Hash).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct NodeKey(i64, i64);

impl From<Coord<f64>> for NodeKey {
    fn from(c: Coord<f64>) -> Self {
        // adding 0.0 folds -0.0 into 0.0 so equal coordinates share a key
        NodeKey((c.x + 0.0).to_bits() as i64, (c.y + 0.0).to_bits() as i64)
    }
}
