//! Zonespace - normalized municipal zoning data
//!
//! Ingests municipal zoning regulations (cascading CSV rule tables plus GIS
//! polygon layers) and produces a single normalized layer where every
//! polygon carries the canonical land-use attributes in metric units.
//!
//! # Example
//!
//! ```
//! use zonespace::prelude::*;
//!
//! let ruleset = Ruleset::parse(
//!     "jurisdiction,Springfield\n\
//!      column,code\n\
//!      \n\
//!      code,maxHeightFeet\n\
//!      R-1,35\n",
//! )
//! .unwrap();
//!
//! let zones = ruleset.resolve([vec!["R-1".to_string()]]);
//! let record = &zones[&vec!["R-1".to_string()]];
//! assert!(record["loMaxHeightMeters"].as_num().is_some());
//! ```

// Core schema and feature model
pub use zonespace_core::{
    units, AttrRow, AttrValue, Allowance, Feature, FieldKind, Result, Schema, ZonespaceError,
};

// Rule tables, resolution, and the spatial join
pub use zonespace_ruleset::{spatial_join, zone_key, ResolvedZones, RuleTable, Ruleset};

// The fast disjoint-layer overlay
pub use zonespace_overlay::{fast_overlay, OverlayOptions};

// Run configuration
pub use zonespace_config::{ConfigError, IngestConfig, OverlayConfig};

// Per-jurisdiction hooks
pub use zonespace_hooks::{run_after, run_before, HookContext, HookError, JurisdictionHooks};

// Concrete GeoJSON provider and collated output
pub use zonespace_io::{parse_features, read_features, Collater, GeoIoError, INFINITY_SENTINEL};

pub mod prelude {
    pub use super::{
        fast_overlay, spatial_join, AttrRow, AttrValue, Feature, IngestConfig, OverlayOptions,
        Ruleset, Schema,
    };
}
