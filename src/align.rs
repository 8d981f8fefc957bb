//! Folding several single-indicator series onto one year axis.

use crate::extract::{extract, value_at};
use crate::models::{AlignedRecord, IndicatorTable, KeyColumn, SeriesSet};
use crate::select::select_row;
use std::collections::BTreeMap;

/// What to do with a series that has no value for a year present elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Leave the series key out of the record.
    #[default]
    Sparse,
    /// Insert `0.0` for every named series absent from a year.
    ZeroFill,
}

/// Merge already-extracted series into year-sorted records.
pub fn align_series<'a, I>(series: I, policy: MissingPolicy) -> Vec<AlignedRecord>
where
    I: IntoIterator<Item = (&'a str, &'a SeriesSet)>,
{
    let mut by_year: BTreeMap<i32, AlignedRecord> = BTreeMap::new();
    let mut names = Vec::new();
    for (name, set) in series {
        names.push(name);
        for p in set {
            by_year
                .entry(p.year)
                .or_insert_with(|| AlignedRecord::new(p.year))
                .values
                .insert(name.to_string(), p.value);
        }
    }
    if policy == MissingPolicy::ZeroFill {
        for rec in by_year.values_mut() {
            for name in &names {
                rec.values.entry(name.to_string()).or_insert(0.0);
            }
        }
    }
    by_year.into_values().collect()
}

/// Select `entity` in every named table, extract and align the results.
///
/// A table without the entity contributes nothing; the others still align.
pub fn align<T>(
    tables: &[(&str, T)],
    entity: &str,
    column: KeyColumn,
    policy: MissingPolicy,
) -> Vec<AlignedRecord>
where
    T: AsRef<IndicatorTable>,
{
    let extracted: Vec<(&str, SeriesSet)> = tables
        .iter()
        .map(|(name, table)| {
            let set = select_row(table.as_ref(), entity, column)
                .map(extract)
                .unwrap_or_default();
            (*name, set)
        })
        .collect();
    align_series(extracted.iter().map(|(n, s)| (*n, s)), policy)
}

/// Largest value over all records and the given series, counting a missing
/// series as `0`. Used for a shared y-axis over stacked or multi-line views.
pub fn combined_max(records: &[AlignedRecord], series: &[&str]) -> f64 {
    records
        .iter()
        .flat_map(|r| series.iter().map(move |s| r.get(s).unwrap_or(0.0)))
        .fold(0.0, f64::max)
}

/// Value of `entity` in each named table at `year`, with a missing row or cell
/// counted as `0`. Feeds part-of-whole views such as pies.
pub fn values_at_year<T>(
    tables: &[(&str, T)],
    entity: &str,
    column: KeyColumn,
    year: i32,
) -> Vec<(String, f64)>
where
    T: AsRef<IndicatorTable>,
{
    tables
        .iter()
        .map(|(name, table)| {
            let v = select_row(table.as_ref(), entity, column)
                .and_then(|r| value_at(r, year))
                .unwrap_or(0.0);
            (name.to_string(), v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearValue;

    fn set(points: &[(i32, f64)]) -> SeriesSet {
        SeriesSet::from_points(points.iter().map(|&(y, v)| YearValue::new(y, v)).collect())
    }

    #[test]
    fn sparse_alignment_does_not_zero_fill() {
        let a = set(&[(1990, 5.0)]);
        let b = set(&[(1991, 3.0)]);
        let out = align_series([("A", &a), ("B", &b)], MissingPolicy::Sparse);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].year, 1990);
        assert_eq!(out[0].get("A"), Some(5.0));
        assert_eq!(out[0].get("B"), None);
        assert_eq!(out[1].year, 1991);
        assert_eq!(out[1].get("B"), Some(3.0));
        assert_eq!(out[1].values.len(), 1);
    }

    #[test]
    fn zero_fill_is_opt_in() {
        let a = set(&[(1990, 5.0)]);
        let b = set(&[(1991, 3.0)]);
        let out = align_series([("A", &a), ("B", &b)], MissingPolicy::ZeroFill);
        assert_eq!(out[0].get("B"), Some(0.0));
        assert_eq!(out[1].get("A"), Some(0.0));
    }

    #[test]
    fn records_come_out_year_sorted() {
        let a = set(&[(2005, 1.0), (1990, 2.0)]);
        let b = set(&[(1999, 3.0)]);
        let years: Vec<i32> = align_series([("A", &a), ("B", &b)], MissingPolicy::Sparse)
            .iter()
            .map(|r| r.year)
            .collect();
        assert_eq!(years, vec![1990, 1999, 2005]);
    }

    #[test]
    fn combined_max_counts_missing_as_zero() {
        let a = set(&[(1990, -5.0)]);
        let b = set(&[(1991, 3.0)]);
        let out = align_series([("A", &a), ("B", &b)], MissingPolicy::Sparse);
        assert_eq!(combined_max(&out, &["A", "B"]), 3.0);
        assert_eq!(combined_max(&out, &["A"]), 0.0);
    }
}
