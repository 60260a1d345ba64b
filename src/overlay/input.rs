use std::collections::HashMap;

use geo_types::{Coord, Geometry, LineString, Polygon};
use log::trace;

use crate::algorithm::orientation::is_ccw;
use crate::error::{OverlayError, Result};
use crate::graph::{Label, Location, NodeKey};
use crate::noding::NodedSegmentString;

/// Linework and nodes extracted from one overlay operand.
///
/// Every ring and line becomes a labelled segment string. Rings are
/// labelled so the area interior lies on the right of a clockwise shell.
/// Points and line endpoints become nodes; line endpoints follow the mod-2
/// boundary rule.
#[derive(Debug)]
pub struct OverlayInput {
    index: usize,
    geometry: Geometry<f64>,
    strings: Vec<NodedSegmentString<Label>>,
    nodes: Vec<(Coord<f64>, Location)>,
    node_index: HashMap<NodeKey, usize>,
}

impl OverlayInput {
    /// Extracts operand `index` (0 or 1).
    pub fn extract(geometry: &Geometry<f64>, index: usize) -> Result<Self> {
        if index > 1 {
            return Err(OverlayError::InvalidArgument(format!(
                "operand index must be 0 or 1, got {index}"
            )));
        }
        let mut input = Self {
            index,
            geometry: geometry.clone(),
            strings: Vec::new(),
            nodes: Vec::new(),
            node_index: HashMap::new(),
        };
        input.add(geometry)?;
        trace!(
            "operand {}: {} strings, {} nodes",
            index,
            input.strings.len(),
            input.nodes.len()
        );
        Ok(input)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    pub fn strings(&self) -> &[NodedSegmentString<Label>] {
        &self.strings
    }

    /// Moves the segment strings out, leaving the nodes in place.
    pub fn take_strings(&mut self) -> Vec<NodedSegmentString<Label>> {
        std::mem::take(&mut self.strings)
    }

    pub fn nodes(&self) -> &[(Coord<f64>, Location)] {
        &self.nodes
    }

    fn add(&mut self, geom: &Geometry<f64>) -> Result<()> {
        match geom {
            Geometry::Point(p) => self.insert_point(p.0, Location::Interior),
            Geometry::MultiPoint(mp) => {
                for p in &mp.0 {
                    self.insert_point(p.0, Location::Interior);
                }
            }
            Geometry::Line(l) => self.add_line_string(&LineString::new(vec![l.start, l.end]))?,
            Geometry::LineString(ls) => self.add_line_string(ls)?,
            Geometry::MultiLineString(mls) => {
                for ls in &mls.0 {
                    self.add_line_string(ls)?;
                }
            }
            Geometry::Polygon(poly) => self.add_polygon(poly)?,
            Geometry::MultiPolygon(mp) => {
                for poly in &mp.0 {
                    self.add_polygon(poly)?;
                }
            }
            Geometry::Rect(r) => self.add_polygon(&r.to_polygon())?,
            Geometry::Triangle(t) => self.add_polygon(&t.to_polygon())?,
            Geometry::GeometryCollection(gc) => {
                for g in &gc.0 {
                    self.add(g)?;
                }
            }
        }
        Ok(())
    }

    fn add_polygon(&mut self, poly: &Polygon<f64>) -> Result<()> {
        if poly.exterior().0.is_empty() {
            return Ok(());
        }
        self.add_polygon_ring(poly.exterior(), Location::Exterior, Location::Interior)?;
        for hole in poly.interiors() {
            // holes run the other way round the interior
            self.add_polygon_ring(hole, Location::Interior, Location::Exterior)?;
        }
        Ok(())
    }

    /// Adds a ring whose left side is `cw_left` when it runs clockwise.
    fn add_polygon_ring(&mut self, ring: &LineString<f64>, cw_left: Location, cw_right: Location) -> Result<()> {
        if ring.0.is_empty() {
            return Ok(());
        }
        let mut coords = ring.0.clone();
        coords.dedup();
        if coords.first() != coords.last() {
            coords.push(coords[0]);
        }
        if coords.len() < 4 {
            return Err(OverlayError::InvalidGeometry(format!(
                "ring at ({} {}) has fewer than 4 distinct-consecutive points",
                coords[0].x, coords[0].y
            )));
        }
        let (left, right) = if is_ccw(&coords) {
            (cw_right, cw_left)
        } else {
            (cw_left, cw_right)
        };
        let label = Label::for_area(self.index, Location::Boundary, left, right);
        self.insert_point(coords[0], Location::Boundary);
        self.strings.push(NodedSegmentString::new(coords, label));
        Ok(())
    }

    fn add_line_string(&mut self, ls: &LineString<f64>) -> Result<()> {
        if ls.0.is_empty() {
            return Ok(());
        }
        let mut coords = ls.0.clone();
        coords.dedup();
        if coords.len() < 2 {
            return Err(OverlayError::InvalidGeometry(format!(
                "line at ({} {}) has fewer than 2 distinct points",
                coords[0].x, coords[0].y
            )));
        }
        let first = coords[0];
        let last = coords[coords.len() - 1];
        self.insert_boundary_point(first);
        self.insert_boundary_point(last);
        let label = Label::for_line(self.index, Location::Interior);
        self.strings.push(NodedSegmentString::new(coords, label));
        Ok(())
    }

    fn insert_point(&mut self, coord: Coord<f64>, loc: Location) {
        match self.node_index.get(&NodeKey::from(coord)) {
            Some(&i) => self.nodes[i].1 = loc,
            None => {
                self.node_index.insert(NodeKey::from(coord), self.nodes.len());
                self.nodes.push((coord, loc));
            }
        }
    }

    /// An endpoint shared by an even number of lines is interior.
    fn insert_boundary_point(&mut self, coord: Coord<f64>) {
        let loc = match self.node_index.get(&NodeKey::from(coord)) {
            Some(&i) if self.nodes[i].1 == Location::Boundary => Location::Interior,
            _ => Location::Boundary,
        };
        self.insert_point(coord, loc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;
    use geo_types::{line_string, polygon, GeometryCollection, MultiLineString};

    #[test]
    fn test_ring_labels_follow_orientation() {
        let ccw = Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)]);
        let input = OverlayInput::extract(&ccw, 0).unwrap();
        assert_eq!(input.strings().len(), 1);
        let label = input.strings()[0].context();
        // counter-clockwise shell: interior on the left
        assert_eq!(label.location(0, Position::Left), Location::Interior);
        assert_eq!(label.location(0, Position::Right), Location::Exterior);
        assert!(label.is_null(1));
        assert_eq!(input.nodes(), &[(Coord { x: 0.0, y: 0.0 }, Location::Boundary)]);
    }

    #[test]
    fn test_hole_labels() {
        let poly = Geometry::Polygon(polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 2.0, y: 8.0), (x: 8.0, y: 8.0), (x: 8.0, y: 2.0)]],
        ));
        let input = OverlayInput::extract(&poly, 1).unwrap();
        let hole = input.strings()[1].context();
        // clockwise hole: area interior on the left
        assert_eq!(hole.location(1, Position::Left), Location::Interior);
        assert_eq!(hole.location(1, Position::Right), Location::Exterior);
    }

    #[test]
    fn test_mod2_boundary_rule() {
        let lines = Geometry::MultiLineString(MultiLineString(vec![
            line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 0.0)],
            line_string![(x: 5.0, y: 0.0), (x: 5.0, y: 5.0)],
        ]));
        let input = OverlayInput::extract(&lines, 0).unwrap();
        let loc = |x: f64, y: f64| {
            input
                .nodes()
                .iter()
                .find(|(c, _)| *c == Coord { x, y })
                .map(|(_, l)| *l)
        };
        assert_eq!(loc(0.0, 0.0), Some(Location::Boundary));
        assert_eq!(loc(5.0, 0.0), Some(Location::Interior));
        assert_eq!(loc(5.0, 5.0), Some(Location::Boundary));
    }

    #[test]
    fn test_invalid_components() {
        let short_ring = Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 0.0)]);
        assert!(matches!(
            OverlayInput::extract(&short_ring, 0),
            Err(OverlayError::InvalidGeometry(_))
        ));
        let point_line = Geometry::LineString(line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)]);
        assert!(matches!(
            OverlayInput::extract(&point_line, 0),
            Err(OverlayError::InvalidGeometry(_))
        ));
        let empty = Geometry::GeometryCollection(GeometryCollection::default());
        assert!(matches!(
            OverlayInput::extract(&empty, 2),
            Err(OverlayError::InvalidArgument(_))
        ));
        assert!(OverlayInput::extract(&empty, 0).unwrap().strings().is_empty());
    }
}
