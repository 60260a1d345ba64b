use approx::assert_relative_eq;
use geo::{Area, BoundingRect};
use geo_overlay::graph::{Edge, TopologyGraph};
use geo_overlay::noding::{MCIndexNoder, NodedSegmentString, Noder, NodingValidator, SnapRoundingNoder};
use geo_overlay::overlay::{
    build_polygons, build_topology_graph, extract_rings, find_result_area_edges, OverlayInput, PolygonBuilder,
};
use geo_overlay::{dissolve, OpCode, OverlayOp, OverlayOptions, Polygonizer, PrecisionModel};
use geo_types::{coord, polygon, Coord, Geometry, GeometryCollection, LineString, MultiPolygon, Polygon};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn empty() -> Geometry<f64> {
    Geometry::GeometryCollection(GeometryCollection::default())
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
}

/// Runs noding, graph construction and ring extraction step by step.
fn build_graph(a: &Geometry<f64>, b: &Geometry<f64>) -> TopologyGraph {
    let mut inputs = [OverlayInput::extract(a, 0).unwrap(), OverlayInput::extract(b, 1).unwrap()];
    let strings = inputs.iter_mut().flat_map(|input| input.take_strings()).collect();
    let noded = geo_overlay::noding::node_with_precision(strings, PrecisionModel::Floating, true).unwrap();
    build_topology_graph(
        &inputs,
        noded.into_iter().map(|ss| {
            let label = *ss.context();
            Edge::new(ss.into_coords(), label)
        }),
    )
    .unwrap()
}

fn rings_of(graph: &mut TopologyGraph, op: OpCode) -> PolygonBuilder {
    find_result_area_edges(graph, op);
    graph.cancel_duplicate_result_edges();
    extract_rings(graph).unwrap()
}

fn sorted_ring(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    let mut pts: Vec<(f64, f64)> = ring.0[..ring.0.len() - 1].iter().map(|c| (c.x, c.y)).collect();
    pts.sort_by(|a, b| a.partial_cmp(b).unwrap());
    pts
}

#[test]
fn test_shared_edge_union() {
    init();
    let a = Geometry::Polygon(rect(0.0, 0.0, 1.0, 1.0));
    let b = Geometry::Polygon(rect(1.0, 0.0, 2.0, 1.0));

    let mut graph = build_graph(&a, &b);
    let shared: Vec<&Edge> = graph
        .edges()
        .iter()
        .filter(|e| {
            let ends = (e.coords[0], e.coords[e.coords.len() - 1]);
            ends == (coord! { x: 1.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 })
                || ends == (coord! { x: 1.0, y: 1.0 }, coord! { x: 1.0, y: 0.0 })
        })
        .collect();
    assert_eq!(shared.len(), 1, "shared edge should be merged");
    assert!(shared[0].label.is_area_of(0) && shared[0].label.is_area_of(1));

    let builder = rings_of(&mut graph, OpCode::Union);
    let polygons = build_polygons(&builder);
    assert_eq!(polygons.len(), 1);
    assert_relative_eq!(polygons[0].unsigned_area(), 2.0);
    let bbox = polygons[0].bounding_rect().unwrap();
    assert_eq!(bbox.min(), coord! { x: 0.0, y: 0.0 });
    assert_eq!(bbox.max(), coord! { x: 2.0, y: 1.0 });
}

#[test]
fn test_square_with_hole() {
    init();
    let outer = rect(0.0, 0.0, 10.0, 10.0);
    let inner = rect(3.0, 3.0, 6.0, 6.0);
    let holed = Geometry::Polygon(Polygon::new(outer.exterior().clone(), vec![inner.exterior().clone()]));

    let mut graph = build_graph(&holed, &empty());
    let builder = rings_of(&mut graph, OpCode::Union);
    assert_eq!(builder.shell_count(), 1);

    let polygons = build_polygons(&builder);
    assert_eq!(polygons.len(), 1);
    assert_eq!(polygons[0].interiors().len(), 1);
    assert_relative_eq!(polygons[0].unsigned_area(), 100.0 - 9.0);
    assert_eq!(sorted_ring(&polygons[0].interiors()[0]), sorted_ring(inner.exterior()));
}

#[test]
fn test_crossing_segments_split() {
    init();
    let strings = vec![
        NodedSegmentString::new(vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 10.0 }], 0usize),
        NodedSegmentString::new(vec![coord! { x: 0.0, y: 10.0 }, coord! { x: 10.0, y: 0.0 }], 1usize),
    ];
    let noded = MCIndexNoder::default().compute_nodes(strings).unwrap();

    assert_eq!(noded.len(), 4);
    let mid = coord! { x: 5.0, y: 5.0 };
    for ss in &noded {
        assert_eq!(ss.len(), 2);
        assert!(ss.coords().contains(&mid), "split piece should end at the crossing");
    }
    assert_eq!(noded.iter().filter(|ss| *ss.context() == 0).count(), 2);
    assert!(NodingValidator::new().is_valid(&noded));
}

#[test]
fn test_touching_hole_splits_maximal_ring() {
    init();
    // hole touches the shell at its first vertex
    let shell = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]);
    let hole = LineString::from(vec![(0.0, 0.0), (2.0, 1.0), (1.0, 3.0), (0.0, 0.0)]);
    let poly = Geometry::Polygon(Polygon::new(shell, vec![hole]));

    let mut graph = build_graph(&poly, &empty());
    let builder = rings_of(&mut graph, OpCode::Union);
    assert_eq!(builder.maximal_ring_count(), 1);
    assert_eq!(builder.minimal_ring_count(), 2);

    let polygons = build_polygons(&builder);
    assert_eq!(polygons.len(), 1);
    assert_eq!(polygons[0].interiors().len(), 1);
    assert_relative_eq!(polygons[0].unsigned_area(), 47.5);
}

#[test]
fn test_bowtie_ring_gives_two_triangles() {
    init();
    // one ring visiting (2,2) twice
    let bowtie = Geometry::Polygon(Polygon::new(
        LineString::from(vec![(2.0, 2.0), (0.0, 4.0), (0.0, 0.0), (2.0, 2.0), (4.0, 0.0), (4.0, 4.0), (2.0, 2.0)]),
        vec![],
    ));

    let mut graph = build_graph(&bowtie, &empty());
    assert!(graph.find_node(coord! { x: 2.0, y: 2.0 }).is_some());
    let builder = rings_of(&mut graph, OpCode::Union);
    // each lobe links back to itself at the shared vertex
    assert_eq!(builder.maximal_ring_count(), 2);
    assert_eq!(builder.shell_count(), 2);

    let polygons = build_polygons(&builder);
    assert_eq!(polygons.len(), 2);
    for p in &polygons {
        assert_eq!(p.exterior().0.len(), 4, "expected a simple triangle");
        assert_relative_eq!(p.unsigned_area(), 4.0);
    }
}

#[test]
fn test_snap_rounding_near_miss() {
    init();
    // the second segment stops just short of the first
    let strings = vec![
        NodedSegmentString::new(vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }], ()),
        NodedSegmentString::new(
            vec![coord! { x: 1.0, y: 0.0 }, coord! { x: 0.5 + 5e-10, y: 0.5 - 5e-10 }],
            (),
        ),
    ];
    let mut noder = SnapRoundingNoder::new(PrecisionModel::fixed(1e6).unwrap()).unwrap();
    let noded = noder.compute_nodes(strings).unwrap();

    let grid_pt = coord! { x: 0.5, y: 0.5 };
    assert_eq!(noded.len(), 3);
    assert!(noded.iter().all(|ss| ss.coords().contains(&grid_pt)));
    NodingValidator::new().check_valid(&noded).unwrap();
}

#[test]
fn test_round_trip_of_noded_polygon() {
    init();
    let outer = rect(0.0, 0.0, 20.0, 10.0);
    let inner = rect(2.0, 2.0, 5.0, 5.0);
    let x = Polygon::new(outer.exterior().clone(), vec![inner.exterior().clone()]);

    let mut graph = build_graph(&Geometry::Polygon(x.clone()), &empty());
    let polygons = build_polygons(&rings_of(&mut graph, OpCode::Union));

    assert_eq!(polygons.len(), 1);
    let out = &polygons[0];
    assert_eq!(sorted_ring(out.exterior()), sorted_ring(x.exterior()));
    assert_eq!(out.interiors().len(), 1);
    assert_eq!(sorted_ring(&out.interiors()[0]), sorted_ring(&x.interiors()[0]));
    assert_relative_eq!(out.unsigned_area(), x.unsigned_area());
}

#[test]
fn test_ring_extraction_is_repeatable() {
    init();
    let a = Geometry::Polygon(rect(0.0, 0.0, 4.0, 4.0));
    let b = Geometry::Polygon(Polygon::new(
        rect(2.0, 2.0, 8.0, 8.0).exterior().clone(),
        vec![rect(5.0, 5.0, 6.0, 6.0).exterior().clone()],
    ));

    let summary = |op| {
        let mut graph = build_graph(&a, &b);
        let polygons = build_polygons(&rings_of(&mut graph, op));
        let area: f64 = polygons.iter().map(|p| p.unsigned_area()).sum();
        let holes: usize = polygons.iter().map(|p| p.interiors().len()).sum();
        (area, holes)
    };
    for op in [OpCode::Union, OpCode::Intersection, OpCode::Difference, OpCode::SymDifference] {
        assert_eq!(summary(op), summary(op), "{op} differs between runs");
    }
    assert_eq!(summary(OpCode::Union), (16.0 + 35.0 - 4.0, 1));
}

#[test]
fn test_difference_punches_hole() {
    init();
    let a = Geometry::Polygon(rect(0.0, 0.0, 10.0, 10.0));
    let b = Geometry::Polygon(rect(4.0, 4.0, 6.0, 6.0));
    let result = OverlayOp::new(&a, &b).compute(OpCode::Difference).unwrap();

    assert_eq!(result.polygons.len(), 1);
    assert_eq!(result.polygons[0].interiors().len(), 1);
    assert_relative_eq!(result.polygons[0].unsigned_area(), 96.0);
    assert!(result.precision.is_floating());
}

#[test]
fn test_fixed_precision_overlay() {
    init();
    let a = Geometry::Polygon(rect(0.0, 0.0, 1.0, 1.0));
    let b = Geometry::Polygon(rect(0.5004, 0.0, 2.0, 1.0));
    let options = OverlayOptions {
        precision: PrecisionModel::fixed(100.0).unwrap(),
        ..OverlayOptions::default()
    };
    let result = OverlayOp::with_options(&a, &b, options).compute(OpCode::Intersection).unwrap();

    assert_eq!(result.polygons.len(), 1);
    assert_relative_eq!(result.polygons[0].unsigned_area(), 0.5, epsilon = 1e-12);
    assert_eq!(result.precision, PrecisionModel::fixed(100.0).unwrap());
}

#[test]
fn test_dissolve_grid_of_squares() {
    init();
    let squares: Vec<Polygon<f64>> = (0..3)
        .flat_map(|i| (0..3).map(move |j| rect(i as f64, j as f64, i as f64 + 1.0, j as f64 + 1.0)))
        .filter(|p| p.exterior().0[0] != coord! { x: 1.0, y: 1.0 })
        .collect();
    let result = dissolve(&Geometry::MultiPolygon(MultiPolygon(squares)), &OverlayOptions::default()).unwrap();

    // ring of eight squares around an empty centre
    assert_eq!(result.polygons.len(), 1);
    assert_eq!(result.polygons[0].interiors().len(), 1);
    assert_relative_eq!(result.polygons[0].unsigned_area(), 8.0);
}

#[test]
fn test_nested_holes_polygonized() {
    init();
    let mut poly = Polygonizer::new();
    poly.add_geometry(LineString::from(vec![
        (0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)
    ]).into());
    poly.add_geometry(LineString::from(vec![
        (20.0, 20.0), (20.0, 80.0), (80.0, 80.0), (80.0, 20.0), (20.0, 20.0)
    ]).into());
    poly.add_geometry(LineString::from(vec![
        (40.0, 40.0), (60.0, 40.0), (60.0, 60.0), (40.0, 60.0), (40.0, 40.0)
    ]).into());

    let polygons = poly.polygonize().unwrap();

    // donut, filled hole with the island cut out, island
    assert_eq!(polygons.len(), 3);
    for area in [6400.0, 3200.0, 400.0] {
        assert!(
            polygons.iter().any(|p| (p.unsigned_area() - area).abs() < 1e-6),
            "polygon with area {area} not found"
        );
    }
}

#[test]
fn test_touching_polygons_polygonized() {
    init();
    let mut poly = Polygonizer::new();
    poly.node_input = true;
    poly.add_geometry(Geometry::Polygon(rect(0.0, 0.0, 50.0, 50.0)));
    poly.add_geometry(Geometry::Polygon(rect(50.0, 0.0, 100.0, 50.0)));

    let polygons = poly.polygonize().unwrap();
    assert_eq!(polygons.len(), 2);
    assert!(polygons.iter().all(|p| (p.unsigned_area() - 2500.0).abs() < 1e-6));
}

#[test]
fn test_polygonized_faces_union_back() {
    init();
    let mut poly = Polygonizer::new();
    poly.node_input = true;
    poly.add_geometry(LineString::from(vec![
        (0.0, 0.0), (10.0, 10.0), (0.0, 10.0), (10.0, 0.0), (0.0, 0.0)
    ]).into());
    let faces = poly.polygonize().unwrap();
    assert_eq!(faces.len(), 2);

    let merged = dissolve(&Geometry::MultiPolygon(MultiPolygon(faces)), &OverlayOptions::default()).unwrap();
    assert_eq!(merged.polygons.len(), 2, "bowtie lobes only touch at a point");
    assert_relative_eq!(merged.polygons.iter().map(|p| p.unsigned_area()).sum::<f64>(), 50.0);
}

#[test]
fn test_result_holes_inside_shells() {
    init();
    let a = Geometry::Polygon(rect(0.0, 0.0, 10.0, 10.0));
    let b = Geometry::Polygon(rect(12.0, 0.0, 14.0, 2.0));
    let c = Geometry::Polygon(rect(2.0, 2.0, 4.0, 4.0));
    let ab = OverlayOp::new(&a, &b).compute(OpCode::Union).unwrap().into_geometry();
    let result = OverlayOp::new(&ab, &c).compute(OpCode::SymDifference).unwrap();

    assert_eq!(result.polygons.len(), 2);
    let holed: Vec<&Polygon<f64>> = result.polygons.iter().filter(|p| !p.interiors().is_empty()).collect();
    assert_eq!(holed.len(), 1);
    let hole_pts: Vec<Coord<f64>> = holed[0].interiors()[0].0.clone();
    let outer = holed[0].bounding_rect().unwrap();
    assert!(hole_pts
        .iter()
        .all(|p| p.x > outer.min().x && p.x < outer.max().x && p.y > outer.min().y && p.y < outer.max().y));
}

fn polygon_summary(polygons: &[Polygon<f64>]) -> (usize, f64, usize) {
    let area = polygons.iter().map(|p| p.unsigned_area()).sum();
    let holes = polygons.iter().map(|p| p.interiors().len()).sum();
    (polygons.len(), area, holes)
}

#[test]
fn test_hole_outside_shell_becomes_polygon_in_any_order() {
    init();
    let shell = rect(0.0, 0.0, 10.0, 10.0).exterior().clone();
    let outer_hole = rect(20.0, 20.0, 30.0, 30.0).exterior().clone();
    let inner_hole = rect(22.0, 22.0, 28.0, 28.0).exterior().clone();
    let clip = Geometry::Polygon(rect(-100.0, -100.0, 100.0, 100.0));

    for holes in [
        vec![outer_hole.clone(), inner_hole.clone()],
        vec![inner_hole.clone(), outer_hole.clone()],
    ] {
        let a = Geometry::Polygon(Polygon::new(shell.clone(), holes));
        let result = OverlayOp::new(&a, &clip).compute(OpCode::Intersection).unwrap();
        let (count, area, holes) = polygon_summary(&result.polygons);
        assert_eq!(count, 2);
        assert_relative_eq!(area, 100.0 + 100.0 - 36.0);
        assert_eq!(holes, 1);

        let island = result
            .polygons
            .iter()
            .find(|p| !p.interiors().is_empty())
            .unwrap();
        assert_eq!(sorted_ring(island.exterior()), sorted_ring(&outer_hole));
        assert_eq!(sorted_ring(&island.interiors()[0]), sorted_ring(&inner_hole));
    }
}

#[test]
fn test_hole_with_no_containing_shell_is_discarded() {
    init();
    let shell = rect(0.0, 0.0, 10.0, 10.0).exterior().clone();
    // L-shaped ring whose notch holds a small square
    let l_ring = LineString::from(vec![
        (20.0, 20.0), (30.0, 20.0), (30.0, 22.0), (22.0, 22.0), (22.0, 30.0), (20.0, 30.0), (20.0, 20.0)
    ]);
    let in_notch = rect(25.0, 25.0, 28.0, 28.0).exterior().clone();
    let clip = Geometry::Polygon(rect(-100.0, -100.0, 100.0, 100.0));

    for holes in [vec![l_ring.clone(), in_notch.clone()], vec![in_notch.clone(), l_ring.clone()]] {
        let a = Geometry::Polygon(Polygon::new(shell.clone(), holes));
        let result = OverlayOp::new(&a, &clip).compute(OpCode::Intersection).unwrap();
        let (count, area, holes) = polygon_summary(&result.polygons);
        assert_eq!(count, 2);
        assert_relative_eq!(area, 100.0 + 36.0);
        assert_eq!(holes, 0, "the notch square lies in no shell");
    }
}
