use float_next_after::NextAfter;
use geo::Area;
use geo_overlay::algorithm::orientation::{orientation_index, CLOCKWISE, COLLINEAR, COUNTERCLOCKWISE};
use geo_overlay::{OpCode, OverlayOp, Polygonizer};
use geo_types::{coord, polygon, Coord, Geometry, LineString};
use rand::{rngs::StdRng, Rng, SeedableRng};

// every coordinate used below is a multiple of 2^-18
const GRID: f64 = (1u64 << 18) as f64;

/// Orientation computed exactly in integer arithmetic.
fn exact_orientation(p: Coord<f64>, q: Coord<f64>, r: Coord<f64>) -> i32 {
    let to_int = |v: f64| -> i128 {
        let scaled = v * GRID;
        assert_eq!(scaled.fract(), 0.0, "{v} is not on the test grid");
        scaled as i128
    };
    let (px, py) = (to_int(p.x), to_int(p.y));
    let (qx, qy) = (to_int(q.x), to_int(q.y));
    let (rx, ry) = (to_int(r.x), to_int(r.y));
    ((qx - px) * (ry - py) - (qy - py) * (rx - px)).signum() as i32
}

#[test]
fn test_near_collinear_triple() {
    let p = coord! { x: 0.0, y: 0.0 };
    let q = coord! { x: 1e10, y: 1.0 };
    let r = coord! { x: 2e10, y: 2.0 };
    assert_eq!(orientation_index(p, q, r), COLLINEAR);
    assert_eq!(exact_orientation(p, q, r), COLLINEAR);

    let right = coord! { x: 2e10f64.next_after(f64::INFINITY), y: 2.0 };
    let left = coord! { x: 2e10f64.next_after(f64::NEG_INFINITY), y: 2.0 };
    assert_eq!(orientation_index(p, q, right), exact_orientation(p, q, right));
    assert_eq!(orientation_index(p, q, right), CLOCKWISE);
    assert_eq!(orientation_index(p, q, left), exact_orientation(p, q, left));
    assert_eq!(orientation_index(p, q, left), COUNTERCLOCKWISE);
}

#[test]
fn test_orientation_matches_exact_near_line() {
    let mut rng = StdRng::seed_from_u64(7);
    let p = coord! { x: 0.0, y: 0.0 };
    let q = coord! { x: 1e10, y: 1.0 };
    for _ in 0..2000 {
        // (m * 1e10, m) / GRID lies exactly on the line through p and q
        let m: i64 = rng.gen_range(1..500_000);
        let nudge: i64 = rng.gen_range(-64..=64);
        let r = coord! {
            x: (m as f64 * 1e10 + nudge as f64) / GRID,
            y: m as f64 / GRID,
        };
        assert_eq!(orientation_index(p, q, r), exact_orientation(p, q, r), "r = {:?}", r);
    }
}

#[test]
fn test_bowtie_noding() {
    // (0,0) -> (10,10) -> (10,0) -> (0,10) -> (0,0), crossing at (5,5)
    let ls = LineString(vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 10.0, y: 10.0 },
        coord! { x: 10.0, y: 0.0 },
        coord! { x: 0.0, y: 10.0 },
        coord! { x: 0.0, y: 0.0 },
    ]);

    let mut poly = Polygonizer::new();
    poly.node_input = true;
    poly.snap_scale = Some(1e6);
    poly.add_geometry(Geometry::LineString(ls));

    let results = poly.polygonize().expect("Polygonization failed");
    assert_eq!(results.len(), 2, "Expected 2 polygons from bowtie");
}

#[test]
fn test_duplicate_edge_removal() {
    let mut poly = Polygonizer::new();
    poly.node_input = true;
    poly.snap_scale = Some(1e6);

    let edge = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
    poly.add_geometry(Geometry::LineString(edge.clone()));
    poly.add_geometry(Geometry::LineString(edge));
    poly.add_geometry(LineString::from(vec![(10.0, 0.0), (5.0, 5.0)]).into());
    poly.add_geometry(LineString::from(vec![(5.0, 5.0), (0.0, 0.0)]).into());

    let results = poly.polygonize().expect("Polygonization failed");
    assert_eq!(results.len(), 1);
    assert!(poly.cut_edges().unwrap().is_empty());
}

#[test]
fn test_sliver_intersection_is_stable() {
    // b's left edge is one ulp off a's right edge
    let eps = 1.0f64.next_after(f64::INFINITY) - 1.0;
    let a = Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)]);
    let b = Geometry::Polygon(polygon![
        (x: 1.0 - eps, y: 0.25),
        (x: 2.0, y: 0.25),
        (x: 2.0, y: 0.75),
        (x: 1.0 - eps, y: 0.75),
    ]);

    for op in [OpCode::Union, OpCode::Intersection, OpCode::Difference, OpCode::SymDifference] {
        let result = OverlayOp::new(&a, &b).compute(op).unwrap_or_else(|e| panic!("{op} failed: {e}"));
        let area: f64 = result.polygons.iter().map(|p| p.unsigned_area()).sum();
        let expected = match op {
            OpCode::Union => 1.5,
            OpCode::Intersection => 0.0,
            OpCode::Difference => 1.0,
            OpCode::SymDifference => 1.5,
        };
        assert!((area - expected).abs() < 1e-9, "{op}: area {area}, expected {expected}");
    }
}
