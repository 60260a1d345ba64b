//! Planar overlay for `geo-types` geometries: robust noding, a labelled
//! topology graph, and polygon, line and point builders on top of it.
//!
//! ```
//! use geo_types::{polygon, Geometry};
//!
//! let a = Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)]);
//! let b = Geometry::Polygon(polygon![(x: 1.0, y: 0.0), (x: 3.0, y: 0.0), (x: 3.0, y: 2.0), (x: 1.0, y: 2.0)]);
//! let merged = geo_overlay::union(&a, &b).unwrap();
//! assert_eq!(merged.polygons.len(), 1);
//! ```

pub mod algorithm;
pub mod batch;
pub mod error;
pub mod graph;
pub mod index;
pub mod noding;
pub mod overlay;
pub mod polygonizer;
pub mod precision;
pub mod utils;
pub mod wasm;


pub use error::{OverlayError, Result};
pub use overlay::{
    difference, dissolve, intersection, sym_difference, union, OpCode, OverlayOp, OverlayOptions, OverlayResult,
};
pub use polygonizer::Polygonizer;
pub use precision::{PrecisionLadder, PrecisionModel};
