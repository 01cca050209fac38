//! Zonespace IO - GeoJSON feature reading and collated output writing
//!
//! The engine itself is storage-agnostic; this crate is the concrete
//! provider. [`read_features`] loads a GeoJSON FeatureCollection into the
//! core feature model, and [`Collater`] receives per-jurisdiction batches and
//! writes them into a single output FeatureCollection conforming to the
//! canonical schema.

pub mod collate;
pub mod geojson;

pub use collate::{Collater, INFINITY_SENTINEL};
pub use geojson::{parse_features, read_features};

use thiserror::Error;

/// Feature I/O error
#[derive(Debug, Error)]
pub enum GeoIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input or output does not have the shape of a polygon feature
    /// collection.
    #[error("unsupported shape: {0}")]
    Shape(String),
}
