pub mod dd;
pub mod line_intersector;
pub mod locate;
pub mod orientation;
pub mod quadrant;

pub use dd::DD;
pub use line_intersector::{IntersectionKind, LineIntersector};
pub use locate::{locate_point, locate_point_in_area, locate_point_in_ring, RayCrossingCounter};
pub use orientation::{is_ccw, orientation, orientation_index, signed_area, Orientation};
