//! The cascading zone resolver.
//!
//! Given the distinct zone keys observed in a spatial layer, the resolver
//! folds the ordered rule tables over an accumulator row per key: each table
//! that matches a key's projection onto its key columns overwrites exactly
//! the attributes it specifies. Specificity increases with table order, so a
//! later, narrower table wins for the attributes it names and leaves the rest
//! alone.

use std::collections::HashMap;

use tracing::debug;
use zonespace_core::schema::range_field;
use zonespace_core::{AttrRow, AttrValue};

use crate::parse::Ruleset;

/// Resolved attribute rows per distinct zone key.
pub type ResolvedZones = HashMap<Vec<String>, AttrRow>;

impl Ruleset {
    /// Resolves one attribute row per distinct zone key.
    ///
    /// A key that matches no table resolves to an all-unset row rather than
    /// an error: incomplete spatial layers are the common case at the edges
    /// of a jurisdiction, and missing data must not drop geometry.
    pub fn resolve(&self, keys: impl IntoIterator<Item = Vec<String>>) -> ResolvedZones {
        let positions: HashMap<&str, usize> = self
            .zone_columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut resolved: ResolvedZones =
            keys.into_iter().map(|key| (key, AttrRow::new())).collect();

        // apply each table in turn; later tables override per attribute
        for table in &self.tables {
            let projection: Vec<usize> = table
                .key_columns()
                .iter()
                .filter_map(|c| positions.get(c.as_str()).copied())
                .collect();

            for (key, attrs) in resolved.iter_mut() {
                let sub: Vec<String> = projection.iter().map(|&i| key[i].clone()).collect();
                if let Some(row) = table.get(&sub) {
                    for (field, value) in row {
                        attrs.insert(field.clone(), value.clone());
                    }
                }
            }
        }

        for (key, attrs) in resolved.iter_mut() {
            // stable human-readable identifier for downstream hooks
            attrs.insert("zone".to_string(), AttrValue::Text(key.join("-")));
            apply_density_limits(attrs);
        }

        debug!(
            event = "zones_resolved",
            zones = resolved.len(),
            tables = self.tables.len(),
        );
        resolved
    }
}

/// Collapses the density mechanisms into canonical units per hectare.
///
/// Cities cap density through lot size per unit, an explicit per-hectare
/// limit, or units per lot over a minimum lot size; the binding constraint is
/// the tightest one. Each of the `lo`/`hi` bounds is collapsed independently.
fn apply_density_limits(attrs: &mut AttrRow) {
    for prefix in ["hi", "lo"] {
        let bound = |name: &str| {
            attrs
                .get(&range_field(prefix, name))
                .and_then(AttrValue::as_num)
                .filter(|n| !n.is_nan())
        };

        let mut max_density = f64::INFINITY;

        if let Some(lot_per_unit) = bound("minLotSizePerUnitHectares") {
            max_density = max_density.min(1.0 / lot_per_unit);
        }
        if let Some(per_hectare) = bound("maxUnitsPerHectare") {
            max_density = max_density.min(per_hectare);
        }
        if let (Some(units), Some(lot)) = (bound("maxUnitsPerLot"), bound("minLotSizeHectares")) {
            max_density = max_density.min(units / lot);
        }

        if max_density.is_finite() {
            attrs.insert(
                range_field(prefix, "maxUnitsPerHectare"),
                AttrValue::Num(max_density),
            );
        }
    }
}
