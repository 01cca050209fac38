//! Zonespace Overlay - fast fragmentation of one polygon layer by another
//!
//! Generic overlay operators compute a full pairwise arrangement and are far
//! too slow for jurisdiction-scale parcel layers. This overlay exploits a
//! disjointness guarantee (no feature overlaps another feature *within the
//! same* layer) to fragment the base layer feature by feature: intersection
//! fragments carry both layers' attributes, remainders carry only the base
//! layer's. An R-tree over the overlay layer's bounding boxes cuts the
//! per-feature candidate set.
//!
//! The guarantee does not extend across layers; base and overlay features may
//! overlap freely.

use geo::{Area, BooleanOps, BoundingRect, Buffer, Intersects};
use geo_types::{Geometry, MultiPolygon};
use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, info, warn};
use zonespace_core::Feature;


/// Tuning knobs for the overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayOptions {
    /// Fragments with area at or below this threshold (in squared working
    /// units) are discarded as slivers.
    pub min_area: f64,
    /// Retained intersections are buffered by this epsilon before being
    /// subtracted from the base geometry, absorbing the thin floating-point
    /// slivers the intersection step leaves along shared boundaries. The
    /// cost is a bounded loss of area along those boundaries, acceptable for
    /// shapes much larger than the epsilon.
    pub sliver_buffer: f64,
}

impl Default for OverlayOptions {
    /// The empirical defaults, tuned for layers in meters.
    fn default() -> Self {
        OverlayOptions {
            min_area: 100.0,
            sliver_buffer: 1e-2,
        }
    }
}

impl OverlayOptions {
    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_sliver_buffer(mut self, sliver_buffer: f64) -> Self {
        self.sliver_buffer = sliver_buffer;
        self
    }
}

/// Entry in the overlay layer's bounding-box index.
struct IndexedEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Fragments `base` at the boundaries of `overlay`.
///
/// Per base feature: every overlapping overlay feature contributes one
/// fragment per polygonal intersection part, carrying the base feature's
/// attributes with the overlay feature's merged over them (the overlay wins
/// on conflicting names). The uncovered remainder is emitted with the base
/// attributes alone. Fragments at or below the sliver threshold are dropped;
/// point and line intersection parts (layers that merely touch) never
/// materialize because the boolean kernel returns polygons only.
///
/// Both collections must be internally non-overlapping; this precondition is
/// not checked.
pub fn fast_overlay(base: &[Feature], overlay: &[Feature], options: &OverlayOptions) -> Vec<Feature> {
    let overlay_polys: Vec<Option<MultiPolygon<f64>>> = overlay
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let multi = to_multi(&feature.geometry);
            if multi.is_none() {
                warn!(event = "overlay_feature_not_polygonal", index = i);
            }
            multi
        })
        .collect();

    let tree = RTree::bulk_load(
        overlay_polys
            .iter()
            .enumerate()
            .filter_map(|(index, multi)| {
                let rect = multi.as_ref()?.bounding_rect()?;
                Some(IndexedEnvelope {
                    index,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect(),
    );

    info!(
        event = "overlay_start",
        base_features = base.len(),
        overlay_features = overlay.len(),
    );

    let mut out = Vec::new();
    for feature in base {
        let Some(geom) = to_multi(&feature.geometry) else {
            // never drop geometry: pass non-polygonal features through intact
            warn!(event = "base_feature_not_polygonal_passed_through");
            out.push(feature.clone());
            continue;
        };
        let Some(rect) = geom.bounding_rect() else {
            out.push(feature.clone());
            continue;
        };

        let envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut candidates: Vec<usize> = tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.index)
            .collect();
        candidates.sort_unstable();

        // intersections above the sliver threshold, per overlay feature
        let mut retained: Vec<(usize, MultiPolygon<f64>)> = Vec::new();
        for index in candidates {
            let Some(other) = overlay_polys[index].as_ref() else {
                continue;
            };
            if !geom.intersects(other) {
                continue;
            }
            let intersection = geom.intersection(other);
            if intersection.unsigned_area() <= options.min_area {
                continue;
            }
            retained.push((index, intersection));
        }

        for (index, intersection) in &retained {
            for part in &intersection.0 {
                let mut fragment = feature.clone();
                // overlay attributes take precedence on conflicting names
                fragment
                    .properties
                    .extend(overlay[*index].properties.clone());
                fragment.geometry = Geometry::Polygon(part.clone());
                out.push(fragment);
            }
        }

        let remainder = if retained.is_empty() {
            geom
        } else {
            let mut covered = retained[0].1.clone();
            for (_, intersection) in &retained[1..] {
                covered = covered.union(intersection);
            }
            if options.sliver_buffer > 0.0 {
                covered = covered.buffer(options.sliver_buffer);
            }
            geom.difference(&covered)
        };

        let mut remainder_parts = 0usize;
        for part in remainder.0 {
            if part.unsigned_area() > options.min_area {
                let mut fragment = feature.clone();
                fragment.geometry = Geometry::Polygon(part);
                out.push(fragment);
                remainder_parts += 1;
            }
        }
        debug!(
            event = "base_feature_fragmented",
            intersections = retained.len(),
            remainder_parts,
        );
    }

    info!(event = "overlay_done", fragments = out.len());
    out
}

/// Polygonal view of a geometry; `None` for anything that is not a polygon
/// or multi-polygon.
fn to_multi(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        _ => None,
    }
}
