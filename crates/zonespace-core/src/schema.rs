//! The canonical attribute schema.
//!
//! Every resolved zone record conforms to a fixed set of normalized attribute
//! names: density limits, height limits, setbacks, parking requirements, and
//! so on, always in metric units. Numeric variables carry legal uncertainty
//! ("anywhere from 10-12 m depending on frontage") and are therefore stored as
//! independent `lo`/`hi` bounds; categorical and free-text variables are
//! scalar.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Shape of a canonical variable before range expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Numeric, expands to a `lo`/`hi` field pair.
    Float,
    /// Scalar integer flag (no range representation).
    Int,
    /// Scalar text (no range representation).
    Str,
}

/// Type of a single output field after range expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Int,
    Str,
}

/// The canonical variables, in declaration order.
///
/// Anything ending in `Meters` can also be authored in feet, `Hectares` in
/// acres or square feet; `minLotSizePerUnitHectares` and friends are collapsed
/// into `maxUnitsPerHectare` by the resolver's density normalization.
pub const VARIABLES: &[(&str, VarKind)] = &[
    ("singleFamily", VarKind::Str),
    ("multiFamily", VarKind::Str),
    ("maxHeightMeters", VarKind::Float),
    ("maxHeightStories", VarKind::Float),
    ("minLotSizePerUnitHectares", VarKind::Float),
    ("maxUnitsPerLot", VarKind::Float),
    ("minUnitsPerLot", VarKind::Float),
    ("minLotSizeHectares", VarKind::Float),
    ("maxLotSizeHectares", VarKind::Float),
    ("minLotWidthMeters", VarKind::Float),
    ("maxLotWidthMeters", VarKind::Float),
    ("minLotDepthMeters", VarKind::Float),
    ("minFloorAreaPerUnitSqMeters", VarKind::Float),
    ("minParkingPerUnit", VarKind::Float),
    ("maxParkingPerUnit", VarKind::Float),
    ("maxUnitsPerHectare", VarKind::Float),
    ("maxLotCoverage", VarKind::Float),
    ("maxFar", VarKind::Float),
    ("setbackFrontMeters", VarKind::Float),
    ("setbackFrontPercent", VarKind::Float),
    ("setbackSideMeters", VarKind::Float),
    ("setbackSidePercent", VarKind::Float),
    ("setbackRearMeters", VarKind::Float),
    ("setbackRearPercent", VarKind::Float),
    ("demoControls", VarKind::Int),
    ("zone", VarKind::Str),
    ("note", VarKind::Str),
];

/// The fixed set of output fields every resolved zone record conforms to.
///
/// # Example
///
/// ```
/// use zonespace_core::schema::Schema;
///
/// let schema = Schema::canonical();
/// assert!(schema.contains("loMaxHeightMeters"));
/// assert!(schema.contains("jurisdiction"));
/// assert!(!schema.contains("maxHeightFeet"));
/// ```
#[derive(Debug)]
pub struct Schema {
    fields: Vec<(String, FieldKind)>,
    index: HashMap<String, usize>,
}

impl Schema {
    fn build() -> Self {
        let mut fields = Vec::new();
        for (name, kind) in VARIABLES {
            match kind {
                // lo and hi up front so they survive output formats that
                // truncate trailing columns
                VarKind::Float => {
                    fields.push((range_field("lo", name), FieldKind::Float));
                    fields.push((range_field("hi", name), FieldKind::Float));
                }
                VarKind::Int => fields.push((name.to_string(), FieldKind::Int)),
                VarKind::Str => fields.push((name.to_string(), FieldKind::Str)),
            }
        }
        fields.push(("jurisdiction".to_string(), FieldKind::Str));

        let index = fields
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Schema { fields, index }
    }

    /// Returns the process-wide canonical schema.
    pub fn canonical() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(Schema::build)
    }

    /// Whether `name` is a canonical output field.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Type of the named field, if it exists.
    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.index.get(name).map(|&i| self.fields[i].1)
    }

    /// Field names in output order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Fields and their types in output order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Number of output fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields (never true for the canonical schema).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builds a range bound field name: `range_field("lo", "maxHeightMeters")`
/// is `"loMaxHeightMeters"`.
pub fn range_field(prefix: &str, base: &str) -> String {
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => format!("{prefix}{}{}", first.to_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_field() {
        assert_eq!(range_field("lo", "maxHeightMeters"), "loMaxHeightMeters");
        assert_eq!(range_field("hi", "maxFar"), "hiMaxFar");
    }

    #[test]
    fn test_float_variables_expand() {
        let schema = Schema::canonical();
        assert!(schema.contains("loMaxUnitsPerHectare"));
        assert!(schema.contains("hiMaxUnitsPerHectare"));
        assert!(!schema.contains("maxUnitsPerHectare"));
    }

    #[test]
    fn test_scalar_variables_do_not_expand() {
        let schema = Schema::canonical();
        assert!(schema.contains("singleFamily"));
        assert!(schema.contains("demoControls"));
        assert!(schema.contains("note"));
        assert!(!schema.contains("loSingleFamily"));
    }

    #[test]
    fn test_field_kinds() {
        let schema = Schema::canonical();
        assert_eq!(schema.kind("loMaxFar"), Some(FieldKind::Float));
        assert_eq!(schema.kind("demoControls"), Some(FieldKind::Int));
        assert_eq!(schema.kind("zone"), Some(FieldKind::Str));
        assert_eq!(schema.kind("jurisdiction"), Some(FieldKind::Str));
        assert_eq!(schema.kind("bogus"), None);
    }

    #[test]
    fn test_jurisdiction_is_last() {
        let schema = Schema::canonical();
        assert_eq!(schema.field_names().last(), Some("jurisdiction"));
    }
}
