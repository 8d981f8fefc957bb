use crate::models::SeriesSet;
use serde::{Deserialize, Serialize};

/// Summary statistics for one series, used for axis domains and tooltips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

fn summarize_values(mut vals: Vec<f64>) -> Summary {
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().copied();
    let max = vals.last().copied();
    let mean = if count > 0 {
        Some(vals.iter().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary { count, min, max, mean, median }
}

/// Summarize the values of a series.
pub fn summarize(series: &SeriesSet) -> Summary {
    summarize_values(series.iter().map(|p| p.value).collect())
}

/// Smallest and largest of `values`, ignoring non-finite entries.
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearValue;

    #[test]
    fn median_even_and_odd() {
        let s = SeriesSet::from_points(
            [1.0, 4.0, 2.0, 3.0]
                .iter()
                .enumerate()
                .map(|(i, v)| YearValue::new(2000 + i as i32, *v))
                .collect(),
        );
        let sum = summarize(&s);
        assert_eq!(sum.count, 4);
        assert_eq!(sum.min, Some(1.0));
        assert_eq!(sum.max, Some(4.0));
        assert!((sum.median.unwrap() - 2.5).abs() < 1e-9);

        let odd = SeriesSet::from_points(vec![
            YearValue::new(1, 10.0),
            YearValue::new(2, 30.0),
            YearValue::new(3, 20.0),
        ]);
        assert_eq!(summarize(&odd).median, Some(20.0));
    }

    #[test]
    fn empty_series_has_no_stats() {
        let sum = summarize(&SeriesSet::default());
        assert_eq!(sum.count, 0);
        assert_eq!(sum.mean, None);
        assert_eq!(sum.median, None);
    }

    #[test]
    fn extent_skips_nan() {
        assert_eq!(extent([3.0, f64::NAN, -1.0]), Some((-1.0, 3.0)));
        assert_eq!(extent(std::iter::empty()), None);
    }
}
