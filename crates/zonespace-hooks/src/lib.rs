//! Zonespace Hooks - per-jurisdiction business rules
//!
//! Generic zoning ingestion only goes so far; most cities have a handful of
//! ordinance quirks (special height districts, planned-development density
//! grants) that have to be layered on top of the resolved attributes. Each
//! jurisdiction may register a `before` transform, run on the raw features
//! immediately after load, and an `after` transform, run immediately after
//! the spatial join. Both receive and return a feature collection of the
//! same shape.
//!
//! Hooks are a static registry resolved at compile time: a jurisdiction
//! slug maps to plain transformation functions. Jurisdictions without hooks
//! pass data through unchanged.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use zonespace_core::Feature;
use zonespace_overlay::OverlayOptions;

mod sanfrancisco;
mod sanjose;

/// Hook failure
#[derive(Debug, Error)]
pub enum HookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Geo(#[from] zonespace_io::GeoIoError),

    #[error("hook data error: {0}")]
    Data(String),
}

/// Context passed to every hook invocation.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// The configured spatial data directory, for hooks that need an
    /// auxiliary layer.
    pub data_dir: PathBuf,
    /// Overlay tuning for hooks that fragment against auxiliary layers.
    pub overlay: OverlayOptions,
}

/// A single hook: a pure transform over the feature collection.
pub type HookFn = fn(Vec<Feature>, &HookContext) -> Result<Vec<Feature>, HookError>;

/// The registered transforms for one jurisdiction.
#[derive(Debug, Clone, Copy, Default)]
pub struct JurisdictionHooks {
    pub before: Option<HookFn>,
    pub after: Option<HookFn>,
}

/// Looks up the hooks registered for a jurisdiction slug.
pub fn registered(slug: &str) -> JurisdictionHooks {
    match slug {
        "sanfrancisco" => JurisdictionHooks {
            before: Some(sanfrancisco::before),
            after: Some(sanfrancisco::after),
        },
        "sanjose" => JurisdictionHooks {
            before: None,
            after: Some(sanjose::after),
        },
        _ => JurisdictionHooks::default(),
    }
}

/// Runs the `before` hook for `slug`, if any; otherwise passes `features`
/// through unchanged.
pub fn run_before(
    slug: &str,
    features: Vec<Feature>,
    context: &HookContext,
) -> Result<Vec<Feature>, HookError> {
    match registered(slug).before {
        Some(hook) => {
            info!(event = "before_hook", slug);
            hook(features, context)
        }
        None => {
            info!(event = "no_before_hook", slug);
            Ok(features)
        }
    }
}

/// Runs the `after` hook for `slug`, if any; otherwise passes `features`
/// through unchanged.
pub fn run_after(
    slug: &str,
    features: Vec<Feature>,
    context: &HookContext,
) -> Result<Vec<Feature>, HookError> {
    match registered(slug).after {
        Some(hook) => {
            info!(event = "after_hook", slug);
            hook(features, context)
        }
        None => {
            info!(event = "no_after_hook", slug);
            Ok(features)
        }
    }
}

/// Lowers (or sets, when unset) a numeric bound to `cap`.
pub(crate) fn cap_attr(feature: &mut Feature, field: &str, cap: f64) {
    let capped = match feature.num(field) {
        Some(current) if !current.is_nan() => current.min(cap),
        _ => cap,
    };
    feature.set(field, capped);
}
