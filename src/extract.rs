//! Wide row to ordered `(year, value)` series.

use crate::models::{Row, SeriesSet, YearValue};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

fn year_pattern() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"^\d{4}$").expect("static regex"))
}

/// True for 4-digit year headers such as `"1960"`.
pub fn is_year_column(column: &str) -> bool {
    year_pattern().is_match(column)
}

/// Parse a raw cell as a finite number. Empty, non-numeric, NaN and infinite
/// cells yield `None`.
pub fn parse_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric value of a single year column, if present and finite.
pub fn value_at(row: &Row, year: i32) -> Option<f64> {
    row.get(&year.to_string()).and_then(parse_cell)
}

/// Collect the year columns of `row` that hold finite numbers, sorted by year.
pub fn extract(row: &Row) -> SeriesSet {
    let mut points = Vec::new();
    for (column, raw) in row.iter() {
        if !is_year_column(column) {
            continue;
        }
        let Ok(year) = column.parse::<i32>() else {
            continue;
        };
        match parse_cell(raw) {
            Some(value) => points.push(YearValue::new(year, value)),
            None if !raw.trim().is_empty() => {
                debug!("skipping non-numeric cell {column}={raw:?}");
            }
            None => {}
        }
    }
    SeriesSet::from_points(points)
}

/// Like [`extract`] but for an optional row: no row means an empty series.
pub fn extract_opt(row: Option<&Row>) -> SeriesSet {
    row.map(extract).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_empty_and_garbage_cells() {
        let row = Row::from_pairs([
            ("Country Name", "X"),
            ("1990", "5"),
            ("1991", ""),
            ("1992", "abc"),
            ("1993", "7.5"),
        ]);
        let s = extract(&row);
        assert_eq!(
            s.points(),
            &[YearValue::new(1990, 5.0), YearValue::new(1993, 7.5)]
        );
    }

    #[test]
    fn non_finite_values_are_excluded() {
        let row = Row::from_pairs([("2000", "NaN"), ("2001", "inf"), ("2002", "-1e400"), ("2003", "2")]);
        let s = extract(&row);
        assert_eq!(s.points(), &[YearValue::new(2003, 2.0)]);
    }

    #[test]
    fn output_is_sorted_and_ignores_non_year_columns() {
        let row = Row::from_pairs([
            ("2001", "2"),
            ("Indicator Code", "1234x"),
            ("1999", "1"),
            ("12345", "9"),
            ("", "8"),
        ]);
        let years: Vec<i32> = extract(&row).iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1999, 2001]);
    }

    #[test]
    fn missing_row_gives_empty_series() {
        assert!(extract_opt(None).is_empty());
    }
}
