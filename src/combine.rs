//! Averaging paired demographic tables (e.g. male and female shares of an age
//! bracket) into one combined table.

use crate::extract::parse_cell;
use crate::models::{IndicatorTable, KeyColumn, Row};
use crate::select::RowIndex;
use log::debug;

/// How rows of the two tables are paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Match rows by the value of a key column.
    ByKey(KeyColumn),
    /// Match row `i` with row `i`. Only valid when both tables are known to
    /// list entities in the same order.
    Positional,
}

impl Default for Pairing {
    fn default() -> Self {
        Pairing::ByKey(KeyColumn::CountryCode)
    }
}

/// Average two rows column by column.
///
/// A column of `a` that is also in `b` with both cells finite numbers becomes
/// their mean; every other cell of `a` is kept as is.
pub fn combine_rows(a: &Row, b: &Row) -> Row {
    let values = a
        .iter()
        .map(|(column, raw)| {
            match (parse_cell(raw), b.get(column).and_then(parse_cell)) {
                (Some(x), Some(y)) => ((x + y) / 2.0).to_string(),
                _ => raw.to_string(),
            }
        })
        .collect();
    Row::new(a.shared_columns(), values)
}

/// Combine two tables row by row.
///
/// With [`Pairing::ByKey`], rows of `a` without a partner in `b` are dropped.
/// With [`Pairing::Positional`], the result has as many rows as the shorter table.
pub fn combine(a: &IndicatorTable, b: &IndicatorTable, pairing: Pairing) -> IndicatorTable {
    let rows = match pairing {
        Pairing::Positional => a
            .rows()
            .iter()
            .zip(b.rows())
            .map(|(ra, rb)| combine_rows(ra, rb))
            .collect(),
        Pairing::ByKey(column) => {
            let index = RowIndex::build(b, column);
            a.rows()
                .iter()
                .filter_map(|ra| {
                    let key = ra.get(column.as_str())?;
                    match index.get(key) {
                        Some(rb) => Some(combine_rows(ra, rb)),
                        None => {
                            debug!("combine: no partner row for {key:?}");
                            None
                        }
                    }
                })
                .collect()
        }
    };
    IndicatorTable::from_rows(rows)
}
