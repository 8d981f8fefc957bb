//! Entity lookup inside a table.

use crate::models::{IndicatorTable, KeyColumn, Row};
use ahash::AHashMap;

/// First row whose `column` equals `key` exactly (case-sensitive).
///
/// Absence is an ordinary result: callers render "no data" for that series.
pub fn select_row<'t>(table: &'t IndicatorTable, key: &str, column: KeyColumn) -> Option<&'t Row> {
    let col = column.as_str();
    table.rows().iter().find(|r| r.get(col) == Some(key))
}

/// Shorthand for a lookup by `"Country Name"`.
pub fn select_by_name<'t>(table: &'t IndicatorTable, name: &str) -> Option<&'t Row> {
    select_row(table, name, KeyColumn::CountryName)
}

/// Hash index over one key column, for joining whole tables.
///
/// Duplicate keys resolve to the first row, matching [`select_row`].
#[derive(Debug)]
pub struct RowIndex<'t> {
    rows: AHashMap<&'t str, &'t Row>,
}

impl<'t> RowIndex<'t> {
    pub fn build(table: &'t IndicatorTable, column: KeyColumn) -> Self {
        let col = column.as_str();
        let mut rows = AHashMap::with_capacity(table.len());
        for row in table.rows() {
            if let Some(k) = row.get(col) {
                rows.entry(k).or_insert(row);
            }
        }
        Self { rows }
    }

    pub fn get(&self, key: &str) -> Option<&'t Row> {
        self.rows.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
