//! San José: planned-development density and specific height districts.
//!
//! Planned developments carry their permitted density on the parcel itself
//! (`PDDENSITY`, in units per acre) rather than in the zoning tables. Title
//! 20.85.020 additionally defines *specific* height restrictions by downtown
//! section; where a specific restriction exists it overrides the base height
//! limit. Section areas arrive on the features as a `sec` attribute from an
//! upstream overlay against the specific-height-district layer.

use zonespace_core::units::{ACRE_TO_HECTARE, FOOT_TO_METER};
use zonespace_core::{AttrValue, Feature};

use crate::{HookContext, HookError};

/// Specific height restrictions by downtown section: (section, height ft,
/// max height ft). Applied in order, least specific first.
///
/// Sections C.1.a and C.1.b are capped by FAA rules near the airport; at any
/// reasonable distance the limits are high enough that a 90 ft floor is a
/// fair reading for this analysis.
const SECTION_HEIGHTS: &[(&str, f64, f64)] = &[
    ("C.1.e", 120.0, 120.0),
    ("B", 120.0, 120.0),
    ("C.1.a", 90.0, 250.0),
    ("C.1.b", 90.0, 310.0),
    ("C.1.c", 210.0, 210.0),
    ("C.1.d", 35.0, 35.0),
    ("C.3", 120.0, 120.0),
    ("C.4", 120.0, 120.0),
];

pub(crate) fn after(
    mut features: Vec<Feature>,
    _context: &HookContext,
) -> Result<Vec<Feature>, HookError> {
    for feature in &mut features {
        apply_pd_density(feature)?;
        apply_specific_heights(feature);
        merge_specific_heights(feature);
    }
    Ok(features)
}

/// Copies the parcel's planned-development density into the canonical
/// density fields.
fn apply_pd_density(feature: &mut Feature) -> Result<(), HookError> {
    let abbr = feature.text("ZONINGABBR").unwrap_or("").to_string();
    if !abbr.contains("(PD)") {
        return Ok(());
    }
    let Some(raw) = feature.attr("PDDENSITY") else {
        return Ok(());
    };
    let per_acre = match raw {
        AttrValue::Num(n) => *n,
        AttrValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            HookError::Data(format!("cannot parse PDDENSITY {s} for zone {abbr}"))
        })?,
    };
    let per_hectare = per_acre / ACRE_TO_HECTARE;
    feature.set("loMaxUnitsPerHectare", per_hectare);
    feature.set("hiMaxUnitsPerHectare", per_hectare);
    Ok(())
}

/// Seeds the specific height fields from the downtown core designations and
/// the overlaid section areas.
fn apply_specific_heights(feature: &mut Feature) {
    let abbr = feature.text("ZONINGABBR").unwrap_or("");
    if abbr == "DC" || abbr == "DC-NT1" {
        // downtown core is governed by FAA surfaces; 90 ft is a safe floor
        // and anything over 499 ft is a hazard regardless of location
        feature.set("loSpecificHeightMeters", 90.0 * FOOT_TO_METER);
        feature.set("hiSpecificHeightMeters", 499.0 * FOOT_TO_METER);
    }

    // single family areas are not affected by specific height districts
    if feature.text("multiFamily") != Some("yes") {
        return;
    }
    let section = feature.text("sec").unwrap_or("").to_string();
    for (name, height, max_height) in SECTION_HEIGHTS {
        if section == *name {
            feature.set("loSpecificHeightMeters", height * FOOT_TO_METER);
            feature.set("hiSpecificHeightMeters", max_height * FOOT_TO_METER);
        }
    }
}

/// Where a specific height restriction exists, it overrides the base height.
fn merge_specific_heights(feature: &mut Feature) {
    for (specific, base) in [
        ("loSpecificHeightMeters", "loMaxHeightMeters"),
        ("hiSpecificHeightMeters", "hiMaxHeightMeters"),
    ] {
        if let Some(height) = feature.num(specific).filter(|h| !h.is_nan()) {
            feature.set(base, height);
        }
    }
}
