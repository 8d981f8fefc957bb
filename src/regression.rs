//! Least-squares trend fitting.
//!
//! Every fit returns `None` when the input cannot define a curve; callers
//! simply skip the trend overlay.

use crate::models::{SeriesSet, YearValue};
use serde::{Deserialize, Serialize};

/// `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// `value = a * exp(b * year)`.
///
/// On calendar years `a` is `level * exp(-b * origin)`, which leaves the f64
/// range for steep series (|b| above roughly 0.36 around year 2000). The curve
/// is therefore evaluated from `level`, the fitted value at the mean year
/// `origin`, and `a` is informational only. It may be 0 or infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialModel {
    pub a: f64,
    pub b: f64,
    pub origin: f64,
    pub level: f64,
}

impl ExponentialModel {
    pub fn predict(&self, year: f64) -> f64 {
        self.level * (self.b * (year - self.origin)).exp()
    }

    /// Evaluate the curve at every year of `domain`, inclusive.
    pub fn curve(&self, domain: (i32, i32)) -> Vec<YearValue> {
        (domain.0..=domain.1)
            .map(|y| YearValue::new(y, self.predict(f64::from(y))))
            .filter(|p| p.value.is_finite())
            .collect()
    }
}

/// Ordinary least squares over `(x, y)` points.
///
/// Needs at least two points and two distinct x values. Sums are taken around
/// the means, which is the textbook `(nΣxy − ΣxΣy) / (nΣx² − (Σx)²)` without
/// the cancellation on year-sized x values.
pub fn fit_linear(points: &[(f64, f64)]) -> Option<LinearModel> {
    let Some(&(x0, _)) = points.first() else {
        return None;
    };
    // a rounded mean can make sxx non-zero for identical x values
    if points.iter().all(|p| p.0 == x0) {
        return None;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for &(x, y) in points {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
    }
    if sxx == 0.0 || !sxx.is_finite() {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    (slope.is_finite() && intercept.is_finite()).then_some(LinearModel { slope, intercept })
}

/// Fit `value = a * exp(b * year)` by regressing `ln(value)` on the year.
///
/// Points with a non-positive or non-finite value are left out before the
/// fit; the rest must still satisfy [`fit_linear`].
pub fn fit_exponential(points: &[YearValue]) -> Option<ExponentialModel> {
    let logged: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.value > 0.0 && p.value.is_finite())
        .map(|p| (f64::from(p.year), p.value.ln()))
        .collect();
    let line = fit_linear(&logged)?;
    let origin = logged.iter().map(|p| p.0).sum::<f64>() / logged.len() as f64;
    let level = line.predict(origin).exp();
    if !(level.is_finite() && level > 0.0) {
        return None;
    }
    Some(ExponentialModel {
        a: line.intercept.exp(),
        b: line.slope,
        origin,
        level,
    })
}

/// [`fit_exponential`] over a whole series.
pub fn fit_series_exponential(series: &SeriesSet) -> Option<ExponentialModel> {
    fit_exponential(series.points())
}

/// Regress `y` on `log10(x)`, as used for scatter plots with a log x-axis.
/// Points with `x <= 0` are left out.
pub fn fit_log10_linear(points: &[(f64, f64)]) -> Option<LinearModel> {
    let logged: Vec<(f64, f64)> = points
        .iter()
        .filter(|(x, y)| *x > 0.0 && x.is_finite() && y.is_finite())
        .map(|&(x, y)| (x.log10(), y))
        .collect();
    fit_linear(&logged)
}
