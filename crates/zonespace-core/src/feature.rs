//! The feature model: one polygon plus its attribute row.
//!
//! The engine is agnostic to the underlying storage format; an external
//! provider supplies features as (geometry, attribute-row) pairs and a
//! collaborating writer serializes them back out.

use std::collections::BTreeMap;

use geo_types::Geometry;

use crate::value::AttrValue;

/// An attribute row, keyed by field name. Absent keys are unset.
pub type AttrRow = BTreeMap<String, AttrValue>;

/// One input or output feature: a geometry and its attributes.
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: AttrRow,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>, properties: AttrRow) -> Self {
        Feature { geometry, properties }
    }

    /// Attribute value by name, if set.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.properties.get(name)
    }

    /// Numeric attribute by name, if set and numeric.
    pub fn num(&self, name: &str) -> Option<f64> {
        self.properties.get(name).and_then(AttrValue::as_num)
    }

    /// Text attribute by name, if set and textual.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(AttrValue::as_text)
    }

    /// Sets an attribute, replacing any prior value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.properties.insert(name.into(), value.into());
    }
}
