//! Shared-scale normalization for comparing entities on several axes.

use crate::extract::value_at;
use crate::models::{AxisValue, ComparisonFrame, IndicatorTable, KeyColumn};
use crate::select::select_row;

/// Express every `(entity, axis)` value at `year` as a fraction of the largest
/// value across all entities and axes.
///
/// Missing values count as `0`. When the maximum is not positive the divisor
/// is `1`, so an all-zero year yields zeros instead of NaN. Results are clamped
/// to `[0, 1]`: a negative value (e.g. shrinking GDP) maps to `0`.
pub fn normalize<F>(entities: &[&str], axes: &[&str], year: i32, lookup: F) -> Vec<ComparisonFrame>
where
    F: Fn(&str, &str, i32) -> Option<f64>,
{
    let raw: Vec<Vec<f64>> = entities
        .iter()
        .map(|e| {
            axes.iter()
                .map(|a| lookup(e, a, year).filter(|v| v.is_finite()).unwrap_or(0.0))
                .collect()
        })
        .collect();

    let max = raw.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
    let divisor = if max > 0.0 { max } else { 1.0 };

    entities
        .iter()
        .zip(raw)
        .map(|(entity, vals)| ComparisonFrame {
            entity: entity.to_string(),
            values: axes
                .iter()
                .zip(vals)
                .map(|(axis, v)| AxisValue {
                    axis: axis.to_string(),
                    value: (v / divisor).clamp(0.0, 1.0),
                })
                .collect(),
        })
        .collect()
}

/// [`normalize`] over one table per axis, looking entities up in `column`.
pub fn normalize_tables<T>(
    entities: &[&str],
    axes: &[(&str, T)],
    column: KeyColumn,
    year: i32,
) -> Vec<ComparisonFrame>
where
    T: AsRef<IndicatorTable>,
{
    let names: Vec<&str> = axes.iter().map(|(n, _)| *n).collect();
    normalize(entities, &names, year, |entity, axis, y| {
        let (_, table) = axes.iter().find(|(n, _)| *n == axis)?;
        select_row(table.as_ref(), entity, column).and_then(|r| value_at(r, y))
    })
}
