//! Point location against rings, lines and areas.

use geo_types::{Coord, Geometry, LineString, Polygon};

use super::line_intersector::LineIntersector;
use super::orientation::{orientation_index, COLLINEAR, COUNTERCLOCKWISE};
use crate::graph::Location;
use crate::index::Envelope;

/// Counts crossings of a rightward horizontal ray from a point with a set of
/// segments, detecting when the point lies on one of them.
///
/// Horizontal segments and vertices lying exactly on the ray are handled by
/// the half-open rule: a segment is counted when one endpoint is strictly
/// above the ray and the other on or below it.
#[derive(Clone, Debug)]
pub struct RayCrossingCounter {
    p: Coord<f64>,
    crossing_count: usize,
    point_on_segment: bool,
}

impl RayCrossingCounter {
    pub fn new(p: Coord<f64>) -> Self {
        Self {
            p,
            crossing_count: 0,
            point_on_segment: false,
        }
    }

    pub fn count_segment(&mut self, p1: Coord<f64>, p2: Coord<f64>) {
        let p = self.p;
        // entirely to the left
        if p1.x < p.x && p2.x < p.x {
            return;
        }
        if p == p2 {
            self.point_on_segment = true;
            return;
        }
        if p1.y == p.y && p2.y == p.y {
            let (min_x, max_x) = if p1.x <= p2.x { (p1.x, p2.x) } else { (p2.x, p1.x) };
            if p.x >= min_x && p.x <= max_x {
                self.point_on_segment = true;
            }
            return;
        }
        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut orient = orientation_index(p1, p2, p);
            if orient == COLLINEAR {
                self.point_on_segment = true;
                return;
            }
            if p2.y < p1.y {
                orient = -orient;
            }
            if orient == COUNTERCLOCKWISE {
                self.crossing_count += 1;
            }
        }
    }

    pub fn is_on_segment(&self) -> bool {
        self.point_on_segment
    }

    pub fn location(&self) -> Location {
        if self.point_on_segment {
            Location::Boundary
        } else if self.crossing_count % 2 == 1 {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

/// Location of `p` relative to a closed ring.
pub fn locate_point_in_ring(p: Coord<f64>, ring: &[Coord<f64>]) -> Location {
    let mut counter = RayCrossingCounter::new(p);
    for i in 1..ring.len() {
        counter.count_segment(ring[i], ring[i - 1]);
        if counter.is_on_segment() {
            return counter.location();
        }
    }
    counter.location()
}

/// Whether `p` is inside or on the boundary of a ring.
pub fn is_in_ring(p: Coord<f64>, ring: &[Coord<f64>]) -> bool {
    locate_point_in_ring(p, ring) != Location::Exterior
}

/// Whether `p` lies on any segment of the line.
pub fn is_on_line(p: Coord<f64>, line: &[Coord<f64>]) -> bool {
    let mut li = LineIntersector::new();
    line.windows(2).any(|w| {
        li.compute_point_intersection(p, w[0], w[1]);
        li.has_intersection()
    })
}

fn locate_in_polygon_ring(p: Coord<f64>, ring: &LineString<f64>) -> Location {
    match Envelope::of_coords(&ring.0) {
        Some(env) if env.intersects_coord(p) => locate_point_in_ring(p, &ring.0),
        _ => Location::Exterior,
    }
}

pub fn locate_point_in_polygon(p: Coord<f64>, poly: &Polygon<f64>) -> Location {
    if poly.exterior().0.is_empty() {
        return Location::Exterior;
    }
    match locate_in_polygon_ring(p, poly.exterior()) {
        Location::Exterior => return Location::Exterior,
        Location::Boundary => return Location::Boundary,
        _ => {}
    }
    for hole in poly.interiors() {
        match locate_in_polygon_ring(p, hole) {
            Location::Interior => return Location::Exterior,
            Location::Boundary => return Location::Boundary,
            _ => {}
        }
    }
    Location::Interior
}

/// Location of `p` relative to the areal components of a geometry; points
/// and lines are ignored. The first non-exterior component decides.
pub fn locate_point_in_area(p: Coord<f64>, geom: &Geometry<f64>) -> Location {
    match geom {
        Geometry::Polygon(poly) => locate_point_in_polygon(p, poly),
        Geometry::MultiPolygon(mp) => mp
            .0
            .iter()
            .map(|poly| locate_point_in_polygon(p, poly))
            .find(|loc| *loc != Location::Exterior)
            .unwrap_or(Location::Exterior),
        Geometry::Rect(r) => locate_point_in_polygon(p, &r.to_polygon()),
        Geometry::Triangle(t) => locate_point_in_polygon(p, &t.to_polygon()),
        Geometry::GeometryCollection(gc) => gc
            .0
            .iter()
            .map(|g| locate_point_in_area(p, g))
            .find(|loc| *loc != Location::Exterior)
            .unwrap_or(Location::Exterior),
        _ => Location::Exterior,
    }
}

/// Accumulates component locations with the mod-2 boundary rule.
#[derive(Default)]
struct LocationTally {
    is_in: bool,
    boundaries: usize,
}

impl LocationTally {
    fn update(&mut self, loc: Location) {
        match loc {
            Location::Interior => self.is_in = true,
            Location::Boundary => self.boundaries += 1,
            _ => {}
        }
    }

    fn location(&self) -> Location {
        if self.boundaries % 2 == 1 {
            Location::Boundary
        } else if self.boundaries > 0 || self.is_in {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

fn locate_on_line(p: Coord<f64>, ls: &LineString<f64>) -> Location {
    let pts = &ls.0;
    let env = match Envelope::of_coords(pts) {
        Some(env) => env,
        None => return Location::Exterior,
    };
    if !env.intersects_coord(p) {
        return Location::Exterior;
    }
    if !ls.is_closed() && (p == pts[0] || p == pts[pts.len() - 1]) {
        return Location::Boundary;
    }
    if is_on_line(p, pts) {
        Location::Interior
    } else {
        Location::Exterior
    }
}

fn tally_components(p: Coord<f64>, geom: &Geometry<f64>, tally: &mut LocationTally) {
    match geom {
        Geometry::Point(pt) => {
            if pt.0 == p {
                tally.update(Location::Interior);
            }
        }
        Geometry::MultiPoint(mp) => {
            if mp.0.iter().any(|pt| pt.0 == p) {
                tally.update(Location::Interior);
            }
        }
        Geometry::Line(l) => tally.update(locate_on_line(p, &LineString::new(vec![l.start, l.end]))),
        Geometry::LineString(ls) => tally.update(locate_on_line(p, ls)),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                tally.update(locate_on_line(p, ls));
            }
        }
        Geometry::Polygon(poly) => tally.update(locate_point_in_polygon(p, poly)),
        Geometry::MultiPolygon(mp) => {
            for poly in &mp.0 {
                tally.update(locate_point_in_polygon(p, poly));
            }
        }
        Geometry::Rect(r) => tally.update(locate_point_in_polygon(p, &r.to_polygon())),
        Geometry::Triangle(t) => tally.update(locate_point_in_polygon(p, &t.to_polygon())),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                tally_components(p, g, tally);
            }
        }
    }
}

/// Full topological location of `p` relative to any geometry, combining
/// boundaries of multiple components with the mod-2 rule.
pub fn locate_point(p: Coord<f64>, geom: &Geometry<f64>) -> Location {
    match geom {
        Geometry::Point(pt) => {
            if pt.0 == p {
                Location::Interior
            } else {
                Location::Exterior
            }
        }
        Geometry::LineString(ls) => locate_on_line(p, ls),
        Geometry::Polygon(poly) => locate_point_in_polygon(p, poly),
        _ => {
            let mut tally = LocationTally::default();
            tally_components(p, geom, &mut tally);
            tally.location()
        }
    }
}
