//! Zonespace Core - schema, normalization, and feature model
//!
//! This crate provides the fundamental pieces of the zoning ingest engine:
//! - The canonical attribute schema every resolved zone conforms to
//! - Unit conversion and raw value normalization (imperial to metric,
//!   range expansion, categorical token parsing)
//! - The feature model shared by the resolver, spatial join, and overlay

pub mod error;
pub mod feature;
pub mod schema;
pub mod units;
pub mod value;

pub use error::{Result, ZonespaceError};
pub use feature::{AttrRow, Feature};
pub use schema::{FieldKind, Schema, VarKind};
pub use value::{Allowance, AttrValue};
