//! Tests for ruleset parsing, resolution, and the spatial join.

use geo_types::{polygon, Geometry};
use zonespace_core::units::{ACRE_TO_HECTARE, FOOT_TO_METER};
use zonespace_core::{AttrRow, AttrValue, Feature};

use crate::{spatial_join, Ruleset};

const DEFINITION: &str = r#"jurisdiction,Springfield
year,2017
column,code
column,overlay
// residential base zoning

code,maxHeightFeet,multiFamily,minLotSizePerUnitAcres
R-1,35,no,0.25
R-2,35-45,yes,0.1
C-1,60,cup,

// downtown overlay tightens heights
code,overlay,maxHeightFeet,note
R-2,DT,30,"height reduced, see sec. 4"
"#;

fn ruleset() -> Ruleset {
    Ruleset::parse(DEFINITION).unwrap()
}

fn key2(a: &str, b: &str) -> Vec<String> {
    vec![a.to_string(), b.to_string()]
}

#[test]
fn test_header_metadata() {
    let ruleset = ruleset();
    assert_eq!(ruleset.jurisdiction.as_deref(), Some("Springfield"));
    assert_eq!(ruleset.year, Some(2017));
    assert_eq!(ruleset.zone_columns, vec!["code", "overlay"]);
}

#[test]
fn test_tables_in_file_order() {
    let ruleset = ruleset();
    assert_eq!(ruleset.tables.len(), 2);
    assert_eq!(ruleset.tables[0].key_columns(), ["code"]);
    assert_eq!(ruleset.tables[0].len(), 3);
    // trailing table is flushed without a terminating blank line
    assert_eq!(ruleset.tables[1].key_columns(), ["code", "overlay"]);
    assert_eq!(ruleset.tables[1].len(), 1);
}

#[test]
fn test_blank_cells_do_not_specify() {
    let ruleset = ruleset();
    let row = ruleset.tables[0].get(&["C-1".to_string()]).unwrap();
    assert!(row.contains_key("loMaxHeightMeters"));
    assert!(!row.contains_key("loMinLotSizePerUnitHectares"));
}

#[test]
fn test_commented_cell_is_blank() {
    let ruleset = Ruleset::parse(
        "column,code\n\n\
         code,maxFar\n\
         R-1,#2.0\n",
    )
    .unwrap();
    let row = ruleset.tables[0].get(&["R-1".to_string()]).unwrap();
    assert!(row.is_empty());
}

#[test]
fn test_comment_rows_ignored_inside_tables() {
    let ruleset = Ruleset::parse(
        "column,code\n\n\
         code,maxFar\n\
         // this row is a comment\n\
         R-1,2.0\n",
    )
    .unwrap();
    assert_eq!(ruleset.tables.len(), 1);
    assert_eq!(ruleset.tables[0].len(), 1);
}

#[test]
fn test_unknown_attribute_column_aborts_load() {
    let result = Ruleset::parse(
        "column,code\n\n\
         code,maxWidgets\n\
         R-1,5\n",
    );
    assert!(result.is_err());
}

#[test]
fn test_later_table_overrides_specified_attributes_only() {
    let resolved = ruleset().resolve([key2("R-2", "DT"), key2("R-2", "")]);

    // the overlay table matched and overrode the height bounds
    let downtown = &resolved[&key2("R-2", "DT")];
    let expected = 30.0 * FOOT_TO_METER;
    assert!((downtown["loMaxHeightMeters"].as_num().unwrap() - expected).abs() < 1e-9);
    assert!((downtown["hiMaxHeightMeters"].as_num().unwrap() - expected).abs() < 1e-9);
    // attributes the overlay table does not specify are untouched
    assert_eq!(downtown["multiFamily"], AttrValue::from("yes"));
    assert_eq!(downtown["note"].as_text(), Some("height reduced, see sec. 4"));

    // a key the overlay table does not match keeps the base values
    let base = &resolved[&key2("R-2", "")];
    assert!((base["loMaxHeightMeters"].as_num().unwrap() - 35.0 * FOOT_TO_METER).abs() < 1e-9);
    assert!((base["hiMaxHeightMeters"].as_num().unwrap() - 45.0 * FOOT_TO_METER).abs() < 1e-9);
    assert!(!base.contains_key("note"));
}

#[test]
fn test_zone_label_joins_key_values() {
    let resolved = ruleset().resolve([key2("R-2", "DT")]);
    assert_eq!(resolved[&key2("R-2", "DT")]["zone"].as_text(), Some("R-2-DT"));
}

#[test]
fn test_unmatched_key_resolves_to_unset_row() {
    let resolved = ruleset().resolve([key2("X-9", "")]);
    let row = &resolved[&key2("X-9", "")];
    assert_eq!(row["zone"].as_text(), Some("X-9-"));
    assert!(!row.contains_key("loMaxHeightMeters"));
}

#[test]
fn test_density_from_lot_size_per_unit() {
    let ruleset = Ruleset::parse(
        "column,code\n\n\
         code,minLotSizePerUnitHectares\n\
         R-1,0.1\n",
    )
    .unwrap();
    let resolved = ruleset.resolve([vec!["R-1".to_string()]]);
    let row = &resolved[&vec!["R-1".to_string()]];
    assert!((row["loMaxUnitsPerHectare"].as_num().unwrap() - 10.0).abs() < 1e-9);
    assert!((row["hiMaxUnitsPerHectare"].as_num().unwrap() - 10.0).abs() < 1e-9);
}

#[test]
fn test_density_takes_most_conservative_limit() {
    let ruleset = Ruleset::parse(
        "column,code\n\n\
         code,minLotSizePerUnitHectares,maxUnitsPerHectare\n\
         R-1,0.1,5\n",
    )
    .unwrap();
    let resolved = ruleset.resolve([vec!["R-1".to_string()]]);
    let row = &resolved[&vec!["R-1".to_string()]];
    // 0.1 ha/unit implies 10/ha; the stated 5/ha is tighter and wins
    assert!((row["loMaxUnitsPerHectare"].as_num().unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn test_density_from_units_per_lot() {
    let ruleset = Ruleset::parse(
        "column,code\n\n\
         code,maxUnitsPerLot,minLotSizeHectares\n\
         R-1,4,0.2\n",
    )
    .unwrap();
    let resolved = ruleset.resolve([vec!["R-1".to_string()]]);
    let row = &resolved[&vec!["R-1".to_string()]];
    assert!((row["loMaxUnitsPerHectare"].as_num().unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn test_density_unset_when_no_mechanism_present() {
    let resolved = ruleset().resolve([key2("R-1", "")]);
    let row = &resolved[&key2("R-1", "")];
    // R-1 specifies lot size per unit, so density is derived
    let expected = 1.0 / (0.25 * ACRE_TO_HECTARE);
    assert!((row["loMaxUnitsPerHectare"].as_num().unwrap() - expected).abs() < 1e-9);

    let resolved = ruleset().resolve([key2("C-1", "")]);
    assert!(!resolved[&key2("C-1", "")].contains_key("loMaxUnitsPerHectare"));
}

fn square() -> Geometry<f64> {
    Geometry::Polygon(polygon![
        (x: 0.0, y: 0.0),
        (x: 10.0, y: 0.0),
        (x: 10.0, y: 10.0),
        (x: 0.0, y: 10.0),
    ])
}

#[test]
fn test_spatial_join_merges_resolved_attributes() {
    let mut props = AttrRow::new();
    props.insert("code".to_string(), AttrValue::from("R-1"));
    props.insert("overlay".to_string(), AttrValue::from(""));
    let features = vec![Feature::new(square(), props)];

    let joined = spatial_join(features, &ruleset());
    assert_eq!(joined.len(), 1);
    let out = &joined[0];
    assert_eq!(out.text("jurisdiction"), Some("Springfield"));
    assert_eq!(out.text("zone"), Some("R-1-"));
    assert_eq!(out.text("multiFamily"), Some("no"));
    assert!((out.num("loMaxHeightMeters").unwrap() - 35.0 * FOOT_TO_METER).abs() < 1e-9);
    // raw attributes survive the merge for downstream hooks
    assert_eq!(out.text("code"), Some("R-1"));
}

#[test]
fn test_spatial_join_missing_key_keeps_geometry() {
    // no zone columns set at all
    let features = vec![Feature::new(square(), AttrRow::new())];
    let joined = spatial_join(features, &ruleset());

    assert_eq!(joined.len(), 1);
    let out = &joined[0];
    assert_eq!(out.text("jurisdiction"), Some("Springfield"));
    assert_eq!(out.text("zone"), Some("-"));
    assert_eq!(out.num("loMaxHeightMeters"), None);
    assert_eq!(out.text("multiFamily"), None);
}
