//! The collating writer.
//!
//! A `Collater` is opened once for a whole run and receives one batch of
//! joined features per jurisdiction, writing them all into a single GeoJSON
//! FeatureCollection. Output properties are exactly the canonical schema
//! fields in schema order; raw source columns are dropped here.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;
use zonespace_core::{AttrValue, Feature, FieldKind, Schema};

use crate::geojson::geometry_to_json;
use crate::GeoIoError;

/// Written in place of infinite values: the most common target formats
/// cannot represent IEEE infinities or NaNs, so NaN becomes null and an
/// infinity becomes this documented large-but-finite sentinel (the largest
/// 32-bit integer).
pub const INFINITY_SENTINEL: i64 = i32::MAX as i64;

/// Streams batches of features into one GeoJSON FeatureCollection.
///
/// Call [`Collater::finish`] when every batch has been collated; dropping
/// the collater without finishing leaves a truncated file.
pub struct Collater<W: Write> {
    out: W,
    started: bool,
    written: usize,
}

impl Collater<BufWriter<File>> {
    /// Creates a collater writing to a file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, GeoIoError> {
        Ok(Collater::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> Collater<W> {
    pub fn new(out: W) -> Self {
        Collater {
            out,
            started: false,
            written: 0,
        }
    }

    /// Appends a batch of features to the output collection.
    pub fn collate(&mut self, features: &[Feature]) -> Result<(), GeoIoError> {
        for feature in features {
            if self.started {
                self.out.write_all(b",\n")?;
            } else {
                self.out
                    .write_all(b"{\"type\":\"FeatureCollection\",\"features\":[\n")?;
                self.started = true;
            }
            let record = to_record(feature)?;
            serde_json::to_writer(&mut self.out, &record)?;
            self.written += 1;
        }
        Ok(())
    }

    /// Closes the collection and flushes the writer.
    pub fn finish(mut self) -> Result<(), GeoIoError> {
        if !self.started {
            self.out
                .write_all(b"{\"type\":\"FeatureCollection\",\"features\":[\n")?;
        }
        self.out.write_all(b"\n]}\n")?;
        self.out.flush()?;
        info!(event = "collation_finished", features = self.written);
        Ok(())
    }

    /// Features written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

/// Converts a feature to its output record: canonical properties only, in
/// schema order, with non-representable floats mapped per the output policy.
fn to_record(feature: &Feature) -> Result<Value, GeoIoError> {
    let schema = Schema::canonical();
    let mut properties = Map::with_capacity(schema.len());
    for (name, kind) in schema.fields() {
        properties.insert(name.to_string(), to_json(feature.attr(name), kind));
    }
    Ok(serde_json::json!({
        "type": "Feature",
        "properties": properties,
        "geometry": geometry_to_json(&feature.geometry)?,
    }))
}

fn to_json(value: Option<&AttrValue>, kind: FieldKind) -> Value {
    match value {
        None => Value::Null,
        Some(AttrValue::Text(s)) => Value::String(s.clone()),
        Some(AttrValue::Num(n)) => {
            if n.is_nan() {
                Value::Null
            } else if n.is_infinite() {
                Value::from(INFINITY_SENTINEL)
            } else if kind == FieldKind::Int {
                Value::from(*n as i64)
            } else {
                Value::from(*n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use geo_types::{polygon, Geometry};
    use zonespace_core::AttrRow;

    use super::*;
    use crate::parse_features;

    fn square_feature() -> Feature {
        Feature::new(
            Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 10.0, y: 0.0),
                (x: 10.0, y: 10.0),
                (x: 0.0, y: 10.0),
            ]),
            AttrRow::new(),
        )
    }

    fn collect(features: &[Feature]) -> Value {
        let mut buffer = Vec::new();
        let mut collater = Collater::new(&mut buffer);
        collater.collate(features).unwrap();
        collater.finish().unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    #[test]
    fn test_unset_attributes_become_null() {
        let out = collect(&[square_feature()]);
        let properties = &out["features"][0]["properties"];
        assert_eq!(properties["loMaxHeightMeters"], Value::Null);
        assert_eq!(properties["jurisdiction"], Value::Null);
    }

    #[test]
    fn test_nan_and_infinity_policy() {
        let mut feature = square_feature();
        feature.set("loMaxHeightMeters", f64::NAN);
        feature.set("hiMaxHeightMeters", f64::INFINITY);
        feature.set("loMaxUnitsPerHectare", f64::INFINITY);

        let out = collect(&[feature]);
        let properties = &out["features"][0]["properties"];
        assert_eq!(properties["loMaxHeightMeters"], Value::Null);
        assert_eq!(properties["hiMaxHeightMeters"], Value::from(2147483647i64));
        assert_eq!(properties["loMaxUnitsPerHectare"], Value::from(2147483647i64));
    }

    #[test]
    fn test_raw_columns_are_dropped() {
        let mut feature = square_feature();
        feature.set("ZONINGABBR", "R-1");
        feature.set("zone", "R-1");

        let out = collect(&[feature]);
        let properties = out["features"][0]["properties"].as_object().unwrap();
        assert!(!properties.contains_key("ZONINGABBR"));
        assert_eq!(properties["zone"], Value::from("R-1"));
        assert_eq!(properties.len(), Schema::canonical().len());
    }

    #[test]
    fn test_int_fields_written_as_integers() {
        let mut feature = square_feature();
        feature.set("demoControls", 1.0);

        let out = collect(&[feature]);
        assert_eq!(out["features"][0]["properties"]["demoControls"], Value::from(1i64));
    }

    #[test]
    fn test_batches_accumulate_into_one_collection() {
        let mut buffer = Vec::new();
        let mut collater = Collater::new(&mut buffer);
        collater.collate(&[square_feature()]).unwrap();
        collater.collate(&[square_feature(), square_feature()]).unwrap();
        assert_eq!(collater.written(), 3);
        collater.finish().unwrap();

        let out: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(out["features"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_run_is_valid_geojson() {
        let mut buffer = Vec::new();
        Collater::new(&mut buffer).finish().unwrap();
        let out: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(out["type"], "FeatureCollection");
        assert_eq!(out["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.geojson");

        let mut feature = square_feature();
        feature.set("zone", "R-1");
        feature.set("jurisdiction", "Springfield");

        let mut collater = Collater::create(&path).unwrap();
        collater.collate(&[feature]).unwrap();
        collater.finish().unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        let features = parse_features(&contents).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].text("zone"), Some("R-1"));
        assert_eq!(features[0].text("jurisdiction"), Some("Springfield"));
    }
}
