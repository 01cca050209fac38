//! San Francisco: special-use district overlays and special height limits.
//!
//! The city's published zoning layer does not carry height districts or
//! special-use districts; both come as separate layers. The `before` hook
//! fragments the raw parcels at those layers' boundaries so each fragment
//! picks up its district attributes before zone resolution. The `after` hook
//! applies the planning code's special height limits: sec. 261 lowers the
//! height limit in RH-1 districts to 35 feet regardless of the mapped height
//! district, and sec. 242 lowers it further to 30 feet on Bernal Heights.
//! The zone label carries the special-use district names after the overlay
//! step, so both rules key off it.

use zonespace_core::units::FOOT_TO_METER;
use zonespace_core::Feature;
use zonespace_io::read_features;
use zonespace_overlay::fast_overlay;

use crate::{cap_attr, HookContext, HookError};

/// Curated auxiliary layer of the special-use districts relevant to
/// residential capacity, pre-dissolved to one non-overlapping polygon per
/// district combination.
const SPECIAL_USE_DISTRICTS: &str = "sanfrancisco-special-use-districts.geojson";

/// Height and bulk districts layer.
const HEIGHT_DISTRICTS: &str = "sanfrancisco-heightbulk.geojson";

pub(crate) fn before(
    features: Vec<Feature>,
    context: &HookContext,
) -> Result<Vec<Feature>, HookError> {
    let districts = read_features(context.data_dir.join(SPECIAL_USE_DISTRICTS))?;
    let features = fast_overlay(&features, &districts, &context.overlay);

    let heights = read_features(context.data_dir.join(HEIGHT_DISTRICTS))?;
    Ok(fast_overlay(&features, &heights, &context.overlay))
}

pub(crate) fn after(
    mut features: Vec<Feature>,
    _context: &HookContext,
) -> Result<Vec<Feature>, HookError> {
    for feature in &mut features {
        let zone = feature.text("zone").unwrap_or("").to_string();

        if zone.starts_with("RH-1") {
            cap_attr(feature, "loMaxHeightMeters", 35.0 * FOOT_TO_METER);
            cap_attr(feature, "hiMaxHeightMeters", 35.0 * FOOT_TO_METER);
        }

        if zone.contains("Bernal") {
            cap_attr(feature, "loMaxHeightMeters", 30.0 * FOOT_TO_METER);
            cap_attr(feature, "hiMaxHeightMeters", 30.0 * FOOT_TO_METER);
        }
    }
    Ok(features)
}
