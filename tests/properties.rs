use geo::Area;
use geo_overlay::algorithm::orientation::orientation_index;
use geo_overlay::noding::{NodedSegmentString, Noder, NodingValidator, SnapRoundingNoder};
use geo_overlay::{union, OpCode, OverlayOp, PrecisionModel};
use geo_types::{coord, Coord, Geometry, LineString, Polygon};
use proptest::prelude::*;

fn arb_coord() -> impl Strategy<Value = Coord<f64>> {
    (-1000.0..1000.0f64, -1000.0..1000.0f64).prop_map(|(x, y)| coord! { x: x, y: y })
}

// a small extent keeps crossings and near misses frequent
fn arb_small_coord() -> impl Strategy<Value = Coord<f64>> {
    (-20.0..20.0f64, -20.0..20.0f64).prop_map(|(x, y)| coord! { x: x, y: y })
}

fn arb_rect() -> impl Strategy<Value = Polygon<f64>> {
    (-20i32..20, -20i32..20, 1i32..15, 1i32..15).prop_map(|(x, y, w, h)| {
        let (x, y, w, h) = (x as f64, y as f64, w as f64, h as f64);
        Polygon::new(
            LineString::from(vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)]),
            vec![],
        )
    })
}

fn total_area(polygons: &[Polygon<f64>]) -> f64 {
    polygons.iter().map(|p| p.unsigned_area()).sum()
}

proptest! {
    #[test]
    fn orientation_is_consistent(p in arb_coord(), q in arb_coord(), r in arb_coord()) {
        let o = orientation_index(p, q, r);
        prop_assert_eq!(orientation_index(q, r, p), o);
        prop_assert_eq!(orientation_index(r, p, q), o);
        prop_assert_eq!(orientation_index(q, p, r), -o);
        prop_assert_eq!(orientation_index(p, r, q), -o);
        prop_assert_eq!(orientation_index(r, q, p), -o);
    }

    #[test]
    fn snap_rounded_output_is_fully_noded(
        segments in prop::collection::vec((arb_small_coord(), arb_small_coord()), 1..8)
    ) {
        let strings = segments
            .into_iter()
            .enumerate()
            .map(|(i, (p, q))| NodedSegmentString::new(vec![p, q], i))
            .collect();
        let mut noder = SnapRoundingNoder::new(PrecisionModel::fixed(1.0).unwrap()).unwrap();
        noder.validate = false;
        let noded = noder.compute_nodes(strings).unwrap();
        let check = NodingValidator::new().check_valid(&noded);
        prop_assert!(check.is_ok(), "{:?}", check);
    }

    #[test]
    fn ring_extraction_is_repeatable(a in arb_rect(), b in arb_rect()) {
        let (ga, gb) = (Geometry::Polygon(a), Geometry::Polygon(b));
        for op in [OpCode::Union, OpCode::Intersection, OpCode::Difference, OpCode::SymDifference] {
            let first = OverlayOp::new(&ga, &gb).compute(op).unwrap();
            let second = OverlayOp::new(&ga, &gb).compute(op).unwrap();
            prop_assert_eq!(total_area(&first.polygons), total_area(&second.polygons));
            let holes = |r: &geo_overlay::OverlayResult| r.polygons.iter().map(|p| p.interiors().len()).sum::<usize>();
            prop_assert_eq!(holes(&first), holes(&second));
        }
    }

    #[test]
    fn overlay_areas_add_up(a in arb_rect(), b in arb_rect()) {
        let (ga, gb) = (Geometry::Polygon(a.clone()), Geometry::Polygon(b.clone()));
        let area = |op| total_area(&OverlayOp::new(&ga, &gb).compute(op).unwrap().polygons);
        let (u, i, d, s) = (
            area(OpCode::Union),
            area(OpCode::Intersection),
            area(OpCode::Difference),
            area(OpCode::SymDifference),
        );
        prop_assert!((u - (a.unsigned_area() + b.unsigned_area() - i)).abs() < 1e-9);
        prop_assert!((d - (a.unsigned_area() - i)).abs() < 1e-9);
        prop_assert!((s - (u - i)).abs() < 1e-9);
    }

    #[test]
    fn union_with_itself_is_identity(a in arb_rect()) {
        let g = Geometry::Polygon(a.clone());
        let result = union(&g, &g).unwrap();
        prop_assert_eq!(result.polygons.len(), 1);
        prop_assert!((result.polygons[0].unsigned_area() - a.unsigned_area()).abs() < 1e-9);
    }
}
