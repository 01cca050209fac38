//! Merging resolved zone attributes back onto the polygon collection.

use std::collections::HashSet;

use tracing::debug;
use zonespace_core::{AttrValue, Feature};

use crate::parse::Ruleset;

/// Merges resolved zone records onto the original features by zone key.
///
/// Every input feature produces exactly one output feature: geometry
/// unchanged, the matching record's canonical attributes merged over the raw
/// attributes, and a constant `jurisdiction` field. A feature with a missing
/// or unmatched zone key keeps an all-unset canonical row; geometry is never
/// dropped for attribute reasons.
pub fn spatial_join(features: Vec<Feature>, ruleset: &Ruleset) -> Vec<Feature> {
    let keys: HashSet<Vec<String>> = features
        .iter()
        .map(|f| zone_key(f, &ruleset.zone_columns))
        .collect();
    debug!(event = "spatial_join", features = features.len(), distinct_keys = keys.len());

    let resolved = ruleset.resolve(keys);

    features
        .into_iter()
        .map(|mut feature| {
            let key = zone_key(&feature, &ruleset.zone_columns);
            if let Some(attrs) = resolved.get(&key) {
                for (field, value) in attrs {
                    feature.properties.insert(field.clone(), value.clone());
                }
            }
            if let Some(jurisdiction) = &ruleset.jurisdiction {
                feature.set("jurisdiction", jurisdiction.as_str());
            }
            feature
        })
        .collect()
}

/// Reads a feature's zone key: the declared zone columns' values in order,
/// with missing values as empty strings for ease of matching against the
/// ruleset tables.
pub fn zone_key(feature: &Feature, zone_columns: &[String]) -> Vec<String> {
    zone_columns
        .iter()
        .map(|column| match feature.attr(column) {
            Some(AttrValue::Text(s)) => s.clone(),
            // spatial layers sometimes carry zone codes as numbers
            Some(AttrValue::Num(n)) if n.fract() == 0.0 => format!("{}", *n as i64),
            Some(AttrValue::Num(n)) => format!("{n}"),
            None => String::new(),
        })
        .collect()
}
