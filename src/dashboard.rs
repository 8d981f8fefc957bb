//! Chart-ready data for every dashboard view.
//!
//! Each builder loads its own batch of tables, runs the transforms and returns
//! a [`ChartContent`]. Load failures and empty results become a `NoData`
//! placeholder for that chart only.

use crate::align::{MissingPolicy, align, combined_max, values_at_year};
use crate::batch::load_batch;
use crate::catalog::{AGE_GROUPS, Catalog, Gas, Gender, ScatterSection, Sector};
use crate::combine::{Pairing, combine};
use crate::error::DataLoadError;
use crate::extract::{extract, value_at};
use crate::loader::{TableCache, TableSource};
use crate::models::{AlignedRecord, ComparisonFrame, IndicatorTable, KeyColumn, SeriesSet, YearValue};
use crate::normalize::normalize_tables;
use crate::regression::{ExponentialModel, LinearModel, fit_log10_linear, fit_series_exponential};
use crate::select::{RowIndex, select_row};
use crate::stats::{Summary, extent, summarize};
use log::warn;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// What a chart area shows: data, or a placeholder message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ChartContent<T> {
    Ready(T),
    NoData(String),
}

impl<T> ChartContent<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartContent::Ready(t) => Some(t),
            ChartContent::NoData(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ChartContent::Ready(_))
    }

    /// Placeholder text, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ChartContent::Ready(_) => None,
            ChartContent::NoData(m) => Some(m.as_str()),
        }
    }

    fn resolve(result: Result<Option<T>, DataLoadError>, what: &str) -> Self {
        match result {
            Ok(Some(t)) => ChartContent::Ready(t),
            Ok(None) => ChartContent::NoData(format!("No {what} data found for this selection.")),
            Err(e) => {
                warn!("{what} chart unavailable: {e}");
                ChartContent::NoData(format!("Failed to load {what} data."))
            }
        }
    }
}

/// One indicator over time with an optional exponential trend.
///
/// `y_domain` starts at 0 for level indicators and at the series minimum for
/// rates, which can go negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub entity: String,
    pub indicator: String,
    pub series: SeriesSet,
    pub summary: Summary,
    pub y_domain: (f64, f64),
    pub trend: Option<ExponentialModel>,
    pub trend_curve: Vec<YearValue>,
}

/// Sector emissions of one gas, aligned on years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionChart {
    pub entity: String,
    pub gas: String,
    pub series: Vec<String>,
    pub records: Vec<AlignedRecord>,
    /// Shared y-axis maximum, missing series counted as 0.
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: String,
    pub value: f64,
}

/// Gas split of one sector at one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub sector: String,
    pub year: i32,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidBar {
    pub age_group: String,
    pub male: f64,
    pub female: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PyramidChart {
    pub entity: String,
    pub year: i32,
    pub bars: Vec<PyramidBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub year: i32,
    pub age_group: String,
    pub value: f64,
}

/// Combined (male/female averaged) age-bracket shares over the years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapChart {
    pub entity: String,
    pub years: Vec<i32>,
    pub age_groups: Vec<String>,
    pub cells: Vec<HeatCell>,
    pub extent: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub code: String,
    pub x: f64,
    pub y: f64,
}

/// Two indicators for every country at one year, with a log-x trend line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub year: i32,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    pub regression: Option<LinearModel>,
    /// Trend endpoints at the smallest and largest x.
    pub trend: Option<[(f64, f64); 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingNode {
    pub name: String,
    pub code: String,
    pub value: f64,
}

/// Countries sized by total population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingChart {
    pub year: i32,
    pub nodes: Vec<PackingNode>,
    pub max: f64,
}

/// Entities on shared-scale axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub year: i32,
    pub axes: Vec<String>,
    pub frames: Vec<ComparisonFrame>,
}

/// Male and female tables of one age bracket.
struct AgeBracket {
    age_group: &'static str,
    male: Arc<IndicatorTable>,
    female: Arc<IndicatorTable>,
}

/// Data side of one page view: a table source, its file layout, and the
/// tables fetched so far.
#[derive(Debug)]
pub struct Dashboard<S> {
    source: S,
    catalog: Catalog,
    key: KeyColumn,
    cache: TableCache,
}

impl<S: TableSource> Dashboard<S> {
    pub fn new(source: S, catalog: Catalog) -> Self {
        Self {
            source,
            catalog,
            key: KeyColumn::CountryName,
            cache: TableCache::new(),
        }
    }

    /// Identify countries by another column (default `"Country Name"`).
    pub fn with_key_column(mut self, key: KeyColumn) -> Self {
        self.key = key;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn key_column(&self) -> KeyColumn {
        self.key
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    /// One table, through the cache.
    pub fn table(&self, locator: &str) -> Result<Arc<IndicatorTable>, DataLoadError> {
        self.cache.get_or_load(&self.source, locator)
    }

    /// A whole batch, fetched concurrently.
    pub fn tables<L: AsRef<str> + Sync>(
        &self,
        locators: &[L],
    ) -> Result<Vec<Arc<IndicatorTable>>, DataLoadError> {
        load_batch(&self.cache, &self.source, locators)
    }

    /// Time series of one indicator with an exponential trend overlay, on a
    /// `0..max` y-domain.
    pub fn trend(&self, locator: &str, indicator: &str, entity: &str) -> ChartContent<TrendChart> {
        self.series_chart(locator, indicator, entity, true)
    }

    /// Time series of a rate such as annual growth: `min..max` y-domain and no
    /// trend overlay.
    pub fn rate(&self, locator: &str, indicator: &str, entity: &str) -> ChartContent<TrendChart> {
        self.series_chart(locator, indicator, entity, false)
    }

    fn series_chart(
        &self,
        locator: &str,
        indicator: &str,
        entity: &str,
        level: bool,
    ) -> ChartContent<TrendChart> {
        let result = self.table(locator).map(|table| {
            let series = extract(select_row(&table, entity, self.key)?);
            let (min, max) = extent(series.iter().map(|p| p.value))?;
            let trend = if level { fit_series_exponential(&series) } else { None };
            let trend_curve = match (trend, series.year_range()) {
                (Some(m), Some(domain)) => m.curve(domain),
                _ => Vec::new(),
            };
            Some(TrendChart {
                entity: entity.to_string(),
                indicator: indicator.to_string(),
                summary: summarize(&series),
                y_domain: if level { (0.0, max) } else { (min, max) },
                series,
                trend,
                trend_curve,
            })
        });
        ChartContent::resolve(result, indicator)
    }

    /// Per-sector emissions of `gas`, one record per year.
    pub fn emissions(&self, entity: &str, gas: Gas) -> ChartContent<EmissionChart> {
        let locators: Vec<String> = Sector::ALL
            .iter()
            .map(|s| self.catalog.emission_file(gas, *s))
            .collect();
        let result = self.tables(&locators).map(|tables| {
            let named: Vec<(&str, Arc<IndicatorTable>)> = Sector::ALL
                .iter()
                .map(|s| s.label())
                .zip(tables)
                .collect();
            let records = align(&named, entity, self.key, MissingPolicy::Sparse);
            if records.is_empty() {
                return None;
            }
            let series: Vec<&str> = named.iter().map(|(n, _)| *n).collect();
            Some(EmissionChart {
                entity: entity.to_string(),
                gas: gas.to_string(),
                y_max: combined_max(&records, &series),
                series: series.iter().map(|s| s.to_string()).collect(),
                records,
            })
        });
        ChartContent::resolve(result, "emission")
    }

    /// For each sector, the share of each gas at `year`. Missing values count as 0.
    pub fn emission_pies(&self, entity: &str, year: i32) -> ChartContent<Vec<PieChart>> {
        let locators: Vec<String> = Sector::ALL
            .iter()
            .flat_map(|s| Gas::ALL.iter().map(|g| self.catalog.emission_file(*g, *s)))
            .collect();
        let result = self.tables(&locators).map(|tables| {
            let pies = Sector::ALL
                .iter()
                .zip(tables.chunks(Gas::ALL.len()))
                .map(|(sector, chunk)| {
                    let named: Vec<(&str, &Arc<IndicatorTable>)> =
                        Gas::ALL.iter().map(|g| g.as_str()).zip(chunk).collect();
                    PieChart {
                        sector: sector.label().to_string(),
                        year,
                        slices: values_at_year(&named, entity, self.key, year)
                            .into_iter()
                            .map(|(category, value)| PieSlice { category, value })
                            .collect(),
                    }
                })
                .collect();
            Some(pies)
        });
        ChartContent::resolve(result, "emission")
    }

    /// All 34 age-bracket tables, fetched as one batch.
    fn age_brackets(&self) -> Result<Vec<AgeBracket>, DataLoadError> {
        let locators: Vec<String> = AGE_GROUPS
            .iter()
            .flat_map(|g| {
                [
                    self.catalog.age_group_file(g, Gender::Male),
                    self.catalog.age_group_file(g, Gender::Female),
                ]
            })
            .collect();
        let tables = self.tables(&locators)?;
        Ok(AGE_GROUPS
            .iter()
            .zip(tables.chunks(2))
            .map(|(g, pair)| AgeBracket {
                age_group: *g,
                male: Arc::clone(&pair[0]),
                female: Arc::clone(&pair[1]),
            })
            .collect())
    }

    /// Male and female shares per age bracket at `year`.
    pub fn pyramid(&self, entity: &str, year: i32) -> ChartContent<PyramidChart> {
        let result = self.age_brackets().map(|brackets| {
            let bars: Vec<PyramidBar> = brackets
                .iter()
                .filter_map(|b| {
                    let male = value_at(select_row(&b.male, entity, self.key)?, year)?;
                    let female = value_at(select_row(&b.female, entity, self.key)?, year)?;
                    Some(PyramidBar {
                        age_group: b.age_group.to_string(),
                        male,
                        female,
                    })
                })
                .collect();
            (!bars.is_empty()).then(|| PyramidChart {
                entity: entity.to_string(),
                year,
                bars,
            })
        });
        ChartContent::resolve(result, "population")
    }

    /// Combined share of every age bracket over all years.
    pub fn heatmap(&self, entity: &str) -> ChartContent<HeatmapChart> {
        let result = self.age_brackets().map(|brackets| {
            let mut cells = Vec::new();
            let mut years = BTreeSet::new();
            let mut age_groups = Vec::new();
            for b in &brackets {
                let total = combine(&b.male, &b.female, Pairing::default());
                let Some(row) = select_row(&total, entity, self.key) else {
                    continue;
                };
                let series = extract(row);
                if series.is_empty() {
                    continue;
                }
                age_groups.push(b.age_group.to_string());
                for p in &series {
                    years.insert(p.year);
                    cells.push(HeatCell {
                        year: p.year,
                        age_group: b.age_group.to_string(),
                        value: p.value,
                    });
                }
            }
            let extent = extent(cells.iter().map(|c| c.value))?;
            Some(HeatmapChart {
                entity: entity.to_string(),
                years: years.into_iter().collect(),
                age_groups,
                cells,
                extent,
            })
        });
        ChartContent::resolve(result, "population")
    }

    /// Every country present in both tables of `section` at `year`.
    ///
    /// Pairs with `x <= 0` or a missing value are dropped; the trend regresses
    /// `y` on `log10(x)`.
    pub fn scatter(&self, section: ScatterSection, year: i32) -> ChartContent<ScatterChart> {
        let ((x_loc, x_label), (y_loc, y_label)) = self.catalog.scatter_pair(section);
        let result = self.tables(&[x_loc, y_loc]).map(|tables| {
            let (xs, ys) = (&tables[0], &tables[1]);
            let index = RowIndex::build(ys, KeyColumn::CountryCode);
            let points: Vec<ScatterPoint> = xs
                .rows()
                .iter()
                .filter_map(|rx| {
                    let code = rx.country_code()?;
                    let ry = index.get(code)?;
                    let x = value_at(rx, year).filter(|x| *x > 0.0)?;
                    let y = value_at(ry, year)?;
                    Some(ScatterPoint {
                        name: rx.country_name().unwrap_or(code).to_string(),
                        code: code.to_string(),
                        x,
                        y,
                    })
                })
                .collect();
            if points.is_empty() {
                return None;
            }
            let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
            let regression = fit_log10_linear(&pairs);
            let trend = match (regression, extent(pairs.iter().map(|p| p.0))) {
                (Some(m), Some((lo, hi))) => Some([
                    (lo, m.predict(lo.log10())),
                    (hi, m.predict(hi.log10())),
                ]),
                _ => None,
            };
            Some(ScatterChart {
                year,
                x_label: x_label.to_string(),
                y_label: y_label.to_string(),
                points,
                regression,
                trend,
            })
        });
        ChartContent::resolve(result, x_label)
    }

    /// Countries with a positive total population at `year`.
    pub fn packing(&self, year: i32) -> ChartContent<PackingChart> {
        let result = self.table(&self.catalog.total_population).map(|table| {
            let nodes: Vec<PackingNode> = table
                .rows()
                .iter()
                .filter_map(|r| {
                    let value = value_at(r, year).filter(|v| *v > 0.0)?;
                    Some(PackingNode {
                        name: r.country_name()?.to_string(),
                        code: r.country_code()?.to_string(),
                        value,
                    })
                })
                .collect();
            let max = nodes.iter().map(|n| n.value).fold(0.0, f64::max);
            (!nodes.is_empty()).then(|| PackingChart { year, nodes, max })
        });
        ChartContent::resolve(result, "population")
    }

    /// Entities compared on shared-scale axes at `year`.
    ///
    /// `axes` pairs a display name with a table locator.
    pub fn radar(&self, entities: &[&str], axes: &[(&str, &str)], year: i32) -> ChartContent<RadarChart> {
        let locators: Vec<&str> = axes.iter().map(|(_, l)| *l).collect();
        let result = self.tables(&locators).map(|tables| {
            let named: Vec<(&str, Arc<IndicatorTable>)> =
                axes.iter().map(|(n, _)| *n).zip(tables).collect();
            let present = entities.iter().any(|e| {
                named
                    .iter()
                    .any(|(_, t)| select_row(t, e, self.key).is_some())
            });
            present.then(|| RadarChart {
                year,
                axes: named.iter().map(|(n, _)| n.to_string()).collect(),
                frames: normalize_tables(entities, &named, self.key, year),
            })
        });
        ChartContent::resolve(result, "comparison")
    }

    /// Default radar axes: GDP, population, and the two production indices.
    pub fn default_radar_axes(&self) -> Vec<(&str, &str)> {
        vec![
            ("GDP", self.catalog.gdp_current.as_str()),
            ("Population", self.catalog.total_population.as_str()),
            ("Crop production", self.catalog.crop_index.as_str()),
            ("Food production", self.catalog.food_index.as_str()),
        ]
    }
}

/// Every chart tied to one selected country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCharts {
    pub gdp: ChartContent<TrendChart>,
    pub gdp_growth: ChartContent<TrendChart>,
    pub co2_intensity: ChartContent<TrendChart>,
    pub emissions: ChartContent<EmissionChart>,
    pub pies: ChartContent<Vec<PieChart>>,
    pub pyramid: ChartContent<PyramidChart>,
    pub heatmap: ChartContent<HeatmapChart>,
}

impl<S: TableSource> Dashboard<S> {
    /// Build all country charts. Each chart succeeds or degrades on its own.
    pub fn country_charts(&self, entity: &str, gas: Gas, year: i32) -> CountryCharts {
        CountryCharts {
            gdp: self.trend(&self.catalog.gdp_current, "GDP", entity),
            gdp_growth: self.rate(&self.catalog.gdp_growth, "GDP growth", entity),
            co2_intensity: self.trend(&self.catalog.co2_intensity, "CO2 intensity", entity),
            emissions: self.emissions(entity, gas),
            pies: self.emission_pies(entity, year),
            pyramid: self.pyramid(entity, year),
            heatmap: self.heatmap(entity),
        }
    }
}
