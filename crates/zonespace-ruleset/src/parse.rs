//! Ruleset definition parser.
//!
//! A ruleset is a line-oriented CSV description of a jurisdiction's zoning
//! codes: a header of `directive,value` lines, then blank-line-separated rule
//! tables. Each table's leading columns that match a declared zone column form
//! its composite key; the remaining columns are attribute columns run through
//! the unit normalizer. Tables apply in file order, later tables overriding
//! earlier ones per attribute.

use std::io::Read;

use tracing::debug;
use zonespace_core::units::normalize_value;
use zonespace_core::{AttrRow, Result, ZonespaceError};

use crate::table::RuleTable;

/// A parsed ruleset: jurisdiction metadata plus the ordered rule tables.
#[derive(Debug, Clone)]
pub struct Ruleset {
    /// Jurisdiction name from the header, if declared.
    pub jurisdiction: Option<String>,
    /// Ordinance year from the header, if declared.
    pub year: Option<i32>,
    /// The attribute names identifying a zone, in declaration order.
    pub zone_columns: Vec<String>,
    /// Rule tables in file order; this order is the cascade order.
    pub tables: Vec<RuleTable>,
}

impl Ruleset {
    /// Parses a ruleset definition from text.
    ///
    /// Fails on the first schema violation (unknown attribute column,
    /// malformed range, unparseable token); no partial ruleset is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use zonespace_ruleset::Ruleset;
    ///
    /// let ruleset = Ruleset::parse(
    ///     "jurisdiction,Springfield\n\
    ///      column,code\n\
    ///      \n\
    ///      code,maxHeightFeet\n\
    ///      R-1,35\n",
    /// )
    /// .unwrap();
    /// assert_eq!(ruleset.jurisdiction.as_deref(), Some("Springfield"));
    /// assert_eq!(ruleset.tables.len(), 1);
    /// ```
    pub fn parse(definition: &str) -> Result<Self> {
        Parser::default().run(definition)
    }

    /// Parses a ruleset definition from a reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut definition = String::new();
        reader.read_to_string(&mut definition)?;
        Self::parse(&definition)
    }
}

#[derive(Default)]
struct Parser {
    jurisdiction: Option<String>,
    year: Option<i32>,
    zone_columns: Vec<String>,
    tables: Vec<RuleTable>,
    current: Option<TableBuilder>,
}

struct TableBuilder {
    columns: Vec<String>,
    /// Index of the first attribute column.
    data_offset: usize,
    table: RuleTable,
}

impl TableBuilder {
    fn push_row(&mut self, cells: &[String]) -> Result<()> {
        let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

        let key: Vec<String> = (0..self.data_offset).map(|i| cell(i).to_string()).collect();

        let mut row = AttrRow::new();
        for i in self.data_offset..self.columns.len() {
            let raw_val = cell(i);
            if raw_val.is_empty() {
                // blank cell: not specified by this table, do not override
                continue;
            }
            for (field, value) in normalize_value(&self.columns[i], raw_val)? {
                row.insert(field, value);
            }
        }
        self.table.insert(key, row);
        Ok(())
    }
}

impl Parser {
    fn run(mut self, definition: &str) -> Result<Ruleset> {
        let mut lines = definition.lines();

        // Header: directives until the first blank line.
        for line in lines.by_ref() {
            let cells = split_cells(line)?;
            if is_comment(&cells) {
                continue;
            }
            if is_blank(&cells) {
                break;
            }
            self.header_directive(&cells)?;
        }

        // Body: blank-line-separated tables.
        for line in lines {
            let cells = split_cells(line)?;
            if is_comment(&cells) {
                continue;
            }
            if is_blank(&cells) {
                self.flush_table();
                continue;
            }
            match self.current.as_mut() {
                None => self.start_table(cells),
                Some(builder) => builder.push_row(&cells)?,
            }
        }
        // the last table has no trailing blank line
        self.flush_table();

        debug!(
            event = "ruleset_parsed",
            jurisdiction = self.jurisdiction.as_deref().unwrap_or(""),
            tables = self.tables.len(),
        );

        Ok(Ruleset {
            jurisdiction: self.jurisdiction,
            year: self.year,
            zone_columns: self.zone_columns,
            tables: self.tables,
        })
    }

    fn header_directive(&mut self, cells: &[String]) -> Result<()> {
        let value = |name: &str| -> Result<String> {
            cells.get(1).cloned().ok_or_else(|| {
                ZonespaceError::Ruleset(format!("header directive {name} is missing its value"))
            })
        };
        match cells[0].as_str() {
            "jurisdiction" => self.jurisdiction = Some(value("jurisdiction")?),
            "year" => {
                let raw = value("year")?;
                if !raw.is_empty() {
                    self.year = Some(raw.parse().map_err(|_| {
                        ZonespaceError::Ruleset(format!("cannot parse year {raw}"))
                    })?);
                }
            }
            "column" => self.zone_columns.push(value("column")?),
            // unrecognized directives are ignored
            _ => {}
        }
        Ok(())
    }

    fn start_table(&mut self, columns: Vec<String>) {
        // Leading columns matching a declared zone column are the key; the
        // first non-key column ends the scan and starts the attribute data.
        let mut key_columns = Vec::new();
        let mut data_offset = columns.len();
        for (i, column) in columns.iter().enumerate() {
            if self.zone_columns.contains(column) {
                key_columns.push(column.clone());
            } else {
                data_offset = i;
                break;
            }
        }
        self.current = Some(TableBuilder {
            columns,
            data_offset,
            table: RuleTable::new(key_columns),
        });
    }

    fn flush_table(&mut self) {
        if let Some(builder) = self.current.take() {
            debug!(
                event = "table_parsed",
                keys = ?builder.table.key_columns(),
                rows = builder.table.len(),
            );
            self.tables.push(builder.table);
        }
    }
}

/// Splits one line into trimmed cells; a cell starting with `#` is blanked
/// (the comment-out mechanism for individual values).
fn split_cells(line: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        None => Ok(Vec::new()),
        Some(record) => {
            let record =
                record.map_err(|e| ZonespaceError::Ruleset(format!("bad CSV line: {e}")))?;
            Ok(record
                .iter()
                .map(|cell| {
                    let cell = cell.trim();
                    if cell.starts_with('#') {
                        String::new()
                    } else {
                        cell.to_string()
                    }
                })
                .collect())
        }
    }
}

fn is_blank(cells: &[String]) -> bool {
    cells.is_empty() || cells.iter().all(String::is_empty)
}

fn is_comment(cells: &[String]) -> bool {
    cells.first().is_some_and(|c| c.starts_with("//"))
}
