use wasm_bindgen::prelude::*;
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use geo_types::{Geometry as GeoGeometry, GeometryCollection};
use std::str::FromStr;

use crate::error::{OverlayError, Result};
use crate::overlay::{OpCode, OverlayOp};
use crate::Polygonizer;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Overlays two GeoJSON inputs and returns the result components as a
/// GeoJSON FeatureCollection string.
#[wasm_bindgen]
pub fn overlay_geojson(a: &str, b: &str, op: &str) -> std::result::Result<String, JsValue> {
    let fc = overlay_features(a, b, op).map_err(to_js_error)?;
    to_json(&fc)
}

/// Same as [`overlay_geojson`], returning a plain JS object.
#[wasm_bindgen]
pub fn overlay_geojson_value(a: &str, b: &str, op: &str) -> std::result::Result<JsValue, JsValue> {
    let fc = overlay_features(a, b, op).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&fc).map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Nodes and polygonizes the linework of a GeoJSON input.
#[wasm_bindgen]
pub fn polygonize_geojson(input: &str) -> std::result::Result<String, JsValue> {
    let fc = polygonize_features(input).map_err(to_js_error)?;
    to_json(&fc)
}

fn to_js_error(e: OverlayError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json(fc: &FeatureCollection) -> std::result::Result<String, JsValue> {
    serde_json::to_string(fc).map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

fn overlay_features(a: &str, b: &str, op: &str) -> Result<FeatureCollection> {
    let op = OpCode::from_str(op)?;
    let a = read_geometry(a)?;
    let b = read_geometry(b)?;
    let result = OverlayOp::new(&a, &b).compute(op)?;

    let parts = result
        .polygons
        .into_iter()
        .map(GeoGeometry::Polygon)
        .chain(result.lines.into_iter().map(GeoGeometry::LineString))
        .chain(result.points.into_iter().map(GeoGeometry::Point));
    Ok(to_feature_collection(parts))
}

fn polygonize_features(input: &str) -> Result<FeatureCollection> {
    let mut polygonizer = Polygonizer::new();
    // user input is rarely noded
    polygonizer.node_input = true;
    polygonizer.add_geometry(read_geometry(input)?);

    let polygons = polygonizer.polygonize()?;
    Ok(to_feature_collection(polygons.into_iter().map(GeoGeometry::Polygon)))
}

/// Parses any GeoJSON object. Features without a geometry are skipped; a
/// single geometry is returned as itself, several as a collection.
fn read_geometry(input: &str) -> Result<GeoGeometry<f64>> {
    let geojson = GeoJson::from_str(input)
        .map_err(|e| OverlayError::InvalidArgument(format!("Failed to parse GeoJSON: {}", e)))?;

    let geometries: Vec<geojson::Geometry> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.into_iter().filter_map(|f| f.geometry).collect(),
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    };

    let mut converted = geometries
        .into_iter()
        .map(|g| {
            GeoGeometry::<f64>::try_from(g)
                .map_err(|e| OverlayError::InvalidGeometry(format!("Unsupported GeoJSON geometry: {}", e)))
        })
        .collect::<Result<Vec<_>>>()?;

    if converted.len() == 1 {
        Ok(converted.remove(0))
    } else {
        Ok(GeoGeometry::GeometryCollection(GeometryCollection(converted)))
    }
}

fn to_feature_collection(geometries: impl Iterator<Item = GeoGeometry<f64>>) -> FeatureCollection {
    let features = geometries
        .map(|geom| Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(Value::from(&geom))),
            id: None,
            properties: None,
            foreign_members: None,
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    const SQUARE_A: &str = r#"{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}"#;
    const SQUARE_B: &str = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[1,1],[3,1],[3,3],[1,3],[1,1]]]}}"#;

    fn polygons_of(fc: &FeatureCollection) -> Vec<geo_types::Polygon<f64>> {
        fc.features
            .iter()
            .filter_map(|f| f.geometry.clone())
            .filter_map(|g| match GeoGeometry::<f64>::try_from(g) {
                Ok(GeoGeometry::Polygon(p)) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn overlay_reads_geometry_and_feature_input() {
        let fc = overlay_features(SQUARE_A, SQUARE_B, "union").unwrap();
        let polygons = polygons_of(&fc);
        assert_eq!(polygons.len(), 1);
        assert!((polygons[0].unsigned_area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn overlay_output_parses_back() {
        let fc = overlay_features(SQUARE_A, SQUARE_B, "Intersection").unwrap();
        let text = serde_json::to_string(&fc).unwrap();
        let parsed = match text.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            other => panic!("expected a feature collection, got {other}"),
        };
        assert_eq!(parsed.features.len(), 1);
        assert!((polygons_of(&parsed)[0].unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn overlay_rejects_bad_input() {
        assert!(matches!(
            overlay_features("not json", SQUARE_B, "union"),
            Err(OverlayError::InvalidArgument(_))
        ));
        assert!(matches!(
            overlay_features(SQUARE_A, SQUARE_B, "xor"),
            Err(OverlayError::InvalidArgument(_))
        ));
    }

    #[test]
    fn polygonize_noded_feature_collection() {
        let input = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":null,"geometry":{"type":"LineString","coordinates":[[0,0],[10,0],[10,10],[0,10],[0,0]]}},
            {"type":"Feature","properties":null,"geometry":{"type":"LineString","coordinates":[[0,0],[10,10]]}},
            {"type":"Feature","properties":null,"geometry":null}
        ]}"#;
        let fc = polygonize_features(input).unwrap();
        let polygons = polygons_of(&fc);
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| (p.unsigned_area() - 50.0).abs() < 1e-9));
    }
}
