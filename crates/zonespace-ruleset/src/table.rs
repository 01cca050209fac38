//! A single rule table: a composite key over zone columns mapping to partial
//! attribute rows.

use std::collections::HashMap;

use zonespace_core::AttrRow;

/// One table of a ruleset.
///
/// Rows are keyed by the values of the table's key columns, in column order.
/// A row's attribute map is partial: attributes the table does not specify
/// are simply absent and leave earlier tables' values untouched during the
/// cascade.
///
/// Key tuples are unique within a table; a later duplicate definition for the
/// same key is an authoring error and is not defended against.
#[derive(Debug, Clone)]
pub struct RuleTable {
    key_columns: Vec<String>,
    rows: HashMap<Vec<String>, AttrRow>,
}

impl RuleTable {
    pub fn new(key_columns: Vec<String>) -> Self {
        RuleTable {
            key_columns,
            rows: HashMap::new(),
        }
    }

    /// The zone columns forming this table's composite key, in lookup order.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn insert(&mut self, key: Vec<String>, row: AttrRow) {
        self.rows.insert(key, row);
    }

    /// Exact-match lookup on this table's key-column subset. No partial or
    /// fuzzy matching.
    pub fn get(&self, key: &[String]) -> Option<&AttrRow> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
