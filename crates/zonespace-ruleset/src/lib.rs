//! Zonespace Ruleset - cascading rule tables and zone resolution
//!
//! This crate turns a CSV ruleset description into resolved zoning
//! attributes:
//! - Parse the header directives and blank-line-separated rule tables
//! - Cascade the tables over every distinct zone key, later tables winning
//!   per attribute
//! - Join the resolved records back onto the polygon collection

pub mod join;
pub mod parse;
pub mod resolve;
pub mod table;

#[cfg(test)]
mod tests;

pub use join::{spatial_join, zone_key};
pub use parse::Ruleset;
pub use resolve::ResolvedZones;
pub use table::RuleTable;
