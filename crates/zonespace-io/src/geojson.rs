//! GeoJSON parsing into the core feature model.

use std::fs;
use std::path::Path;

use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use tracing::warn;
use zonespace_core::{AttrRow, AttrValue, Feature};

use crate::GeoIoError;

/// Reads a GeoJSON FeatureCollection file.
///
/// Features without geometry are dropped with a warning rather than
/// failing the load (real municipal layers contain them).
pub fn read_features(path: impl AsRef<Path>) -> Result<Vec<Feature>, GeoIoError> {
    let contents = fs::read_to_string(path)?;
    parse_features(&contents)
}

/// Parses a GeoJSON FeatureCollection from text.
pub fn parse_features(contents: &str) -> Result<Vec<Feature>, GeoIoError> {
    let root: Value = serde_json::from_str(contents)?;
    if root["type"] != "FeatureCollection" {
        return Err(GeoIoError::Shape(
            "expected a GeoJSON FeatureCollection".to_string(),
        ));
    }
    let raw_features = root["features"]
        .as_array()
        .ok_or_else(|| GeoIoError::Shape("FeatureCollection has no features array".to_string()))?;

    let mut features = Vec::with_capacity(raw_features.len());
    let mut no_geometry = 0usize;
    for raw in raw_features {
        match parse_geometry(&raw["geometry"])? {
            None => no_geometry += 1,
            Some(geometry) => {
                features.push(Feature::new(geometry, parse_properties(&raw["properties"])))
            }
        }
    }
    if no_geometry > 0 {
        warn!(
            event = "features_without_geometry_dropped",
            dropped = no_geometry,
            kept = features.len(),
        );
    }
    Ok(features)
}

fn parse_properties(raw: &Value) -> AttrRow {
    let mut row = AttrRow::new();
    if let Some(map) = raw.as_object() {
        for (name, value) in map {
            let attr = match value {
                Value::Null => continue,
                Value::Number(n) => match n.as_f64() {
                    Some(n) => AttrValue::Num(n),
                    None => continue,
                },
                Value::String(s) => AttrValue::Text(s.clone()),
                Value::Bool(b) => AttrValue::Num(if *b { 1.0 } else { 0.0 }),
                // nested structures have no attribute representation
                Value::Array(_) | Value::Object(_) => continue,
            };
            row.insert(name.clone(), attr);
        }
    }
    row
}

/// Parses a GeoJSON geometry member. `Ok(None)` for a null geometry.
fn parse_geometry(raw: &Value) -> Result<Option<Geometry<f64>>, GeoIoError> {
    if raw.is_null() {
        return Ok(None);
    }
    let kind = raw["type"].as_str().unwrap_or("");
    let coordinates = &raw["coordinates"];
    match kind {
        "Polygon" => Ok(Some(Geometry::Polygon(parse_polygon(coordinates)?))),
        "MultiPolygon" => {
            let parts = coordinates
                .as_array()
                .ok_or_else(|| GeoIoError::Shape("MultiPolygon without coordinates".to_string()))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Geometry::MultiPolygon(MultiPolygon(parts))))
        }
        other => Err(GeoIoError::Shape(format!(
            "unsupported geometry type {other}"
        ))),
    }
}

fn parse_polygon(raw: &Value) -> Result<Polygon<f64>, GeoIoError> {
    let rings = raw
        .as_array()
        .ok_or_else(|| GeoIoError::Shape("Polygon without rings".to_string()))?
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>, _>>()?;
    let mut rings = rings.into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| GeoIoError::Shape("Polygon with no exterior ring".to_string()))?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn parse_ring(raw: &Value) -> Result<LineString<f64>, GeoIoError> {
    let coords = raw
        .as_array()
        .ok_or_else(|| GeoIoError::Shape("ring is not an array".to_string()))?
        .iter()
        .map(|position| {
            let pair = position.as_array().filter(|p| p.len() >= 2).ok_or_else(|| {
                GeoIoError::Shape("position is not an [x, y] array".to_string())
            })?;
            let x = pair[0].as_f64();
            let y = pair[1].as_f64();
            match (x, y) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err(GeoIoError::Shape("non-numeric coordinate".to_string())),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString(coords))
}

/// Serializes a geometry to its GeoJSON representation.
pub(crate) fn geometry_to_json(geometry: &Geometry<f64>) -> Result<Value, GeoIoError> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(serde_json::json!({
            "type": "Polygon",
            "coordinates": polygon_coordinates(polygon),
        })),
        Geometry::MultiPolygon(multi) => Ok(serde_json::json!({
            "type": "MultiPolygon",
            "coordinates": multi.0.iter().map(polygon_coordinates).collect::<Vec<_>>(),
        })),
        other => Err(GeoIoError::Shape(format!(
            "cannot serialize geometry {other:?}"
        ))),
    }
}

fn polygon_coordinates(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}
