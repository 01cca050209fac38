//! Unit conversion and raw value normalization.
//!
//! Rule tables are authored in whatever units the ordinance uses (feet,
//! acres, square feet); the canonical schema is metric. This module converts
//! a raw `(column, value)` cell into its canonical field(s): unit suffixes
//! are rewritten, imperial values converted, ranges like `10-12` expanded
//! into independent `lo`/`hi` bounds.

use crate::error::{Result, ZonespaceError};
use crate::schema::{range_field, Schema};
use crate::value::{parse_flag, Allowance, AttrValue};

/// A foot is exactly 0.3048 meters by international standard. Zoning codes
/// are assumed to use international rather than survey feet; the difference
/// is under 0.0001% and irrelevant at these distances.
pub const FOOT_TO_METER: f64 = 0.3048;

/// Derived from the exact foot definition to minimize roundoff error.
pub const SQFOOT_TO_SQMETER: f64 = FOOT_TO_METER * FOOT_TO_METER;

/// A hectare is 10,000 square meters.
pub const SQFOOT_TO_HECTARE: f64 = SQFOOT_TO_SQMETER / 10_000.0;

/// An acre is 660 x 66 feet, the area one man and one horse plow in a day.
pub const ACRE_TO_HECTARE: f64 = SQFOOT_TO_HECTARE * 660.0 * 66.0;

/// Normalizes one raw cell into canonical `(field, value)` pairs.
///
/// Numeric columns expand to a `lo`/`hi` pair: a raw value `a-b` populates
/// the bounds independently, a bare number populates both. Unit suffixes in
/// the column name select the conversion; area suffixes are checked before
/// length suffixes because `SqFeet` ends in `Feet`.
///
/// Fails with a schema violation on an unparseable token, a malformed range,
/// or a canonical name that is not part of the schema, so authoring errors
/// surface early rather than silently dropping data.
///
/// # Example
///
/// ```
/// use zonespace_core::units::{normalize_value, FOOT_TO_METER};
/// use zonespace_core::AttrValue;
///
/// let fields = normalize_value("maxHeightFeet", "35").unwrap();
/// assert_eq!(fields[0].0, "loMaxHeightMeters");
/// assert_eq!(fields[0].1, AttrValue::Num(35.0 * FOOT_TO_METER));
/// ```
pub fn normalize_value(raw_col: &str, raw_val: &str) -> Result<Vec<(String, AttrValue)>> {
    let schema = Schema::canonical();

    // Ranges only make sense for numeric columns.
    let expands = !matches!(raw_col, "note" | "singleFamily" | "multiFamily" | "demoControls");

    let bounds: Vec<(String, &str)> = if expands {
        if raw_val.contains('-') {
            let parts: Vec<&str> = raw_val.split('-').collect();
            if parts.len() != 2 {
                return Err(ZonespaceError::Schema(format!(
                    "cannot parse range {raw_val} for column {raw_col}"
                )));
            }
            vec![
                (range_field("lo", raw_col), parts[0]),
                (range_field("hi", raw_col), parts[1]),
            ]
        } else {
            vec![
                (range_field("lo", raw_col), raw_val),
                (range_field("hi", raw_col), raw_val),
            ]
        }
    } else {
        vec![(raw_col.to_string(), raw_val)]
    };

    let mut out = Vec::with_capacity(bounds.len());
    for (col, val) in bounds {
        let (col, value) = convert(raw_col, col, val)?;
        if !schema.contains(&col) {
            return Err(ZonespaceError::Schema(format!(
                "unrecognized column {col} (was {raw_col})"
            )));
        }
        out.push((col, value));
    }
    Ok(out)
}

/// Applies the unit conversion chain to a single bound.
///
/// `raw_col` drives suffix matching; `col` is the (possibly `lo`/`hi`
/// prefixed) name being rewritten.
fn convert(raw_col: &str, col: String, val: &str) -> Result<(String, AttrValue)> {
    // Areas first, so SqFeet is matched before Feet
    if raw_col.ends_with("Acres") {
        Ok((
            col.replace("Acres", "Hectares"),
            AttrValue::Num(parse_number(raw_col, val)? * ACRE_TO_HECTARE),
        ))
    } else if raw_col.ends_with("PerAcre") {
        // divide since the unit is in the denominator
        Ok((
            col.replace("PerAcre", "PerHectare"),
            AttrValue::Num(parse_number(raw_col, val)? / ACRE_TO_HECTARE),
        ))
    } else if raw_col.ends_with("SqFeet") || raw_col.ends_with("SqFt") {
        let as_hectares = col.replace("SqFeet", "Hectares").replace("SqFt", "Hectares");
        // Some quantities (notably per-unit floor areas) are unnatural in
        // hectares; those fall through to square meters.
        if Schema::canonical().contains(&as_hectares) {
            Ok((
                as_hectares,
                AttrValue::Num(parse_number(raw_col, val)? * SQFOOT_TO_HECTARE),
            ))
        } else {
            Ok((
                as_hectares.replace("Hectares", "SqMeters"),
                AttrValue::Num(parse_number(raw_col, val)? * SQFOOT_TO_SQMETER),
            ))
        }
    } else if raw_col.ends_with("Feet") {
        Ok((
            col.replace("Feet", "Meters"),
            AttrValue::Num(parse_number(raw_col, val)? * FOOT_TO_METER),
        ))
    } else if col == "singleFamily" || col == "multiFamily" {
        Ok((col, AttrValue::Text(Allowance::from_token(val)?.to_string())))
    } else if col == "demoControls" {
        Ok((col, AttrValue::Num(parse_flag(val)?)))
    } else if col == "note" {
        Ok((col, AttrValue::Text(val.to_string())))
    } else {
        Ok((col, AttrValue::Num(parse_number(raw_col, val)?)))
    }
}

fn parse_number(raw_col: &str, val: &str) -> Result<f64> {
    val.trim().parse::<f64>().map_err(|_| {
        ZonespaceError::Schema(format!("cannot parse number {val} for column {raw_col}"))
    })
}
