use log::debug;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Header of the entity name column in every indicator table.
pub const COUNTRY_NAME: &str = "Country Name";
/// Header of the ISO alpha-3 code column.
pub const COUNTRY_CODE: &str = "Country Code";

/// Column used to identify an entity inside a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyColumn {
    #[default]
    CountryName,
    CountryCode,
}

impl KeyColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyColumn::CountryName => COUNTRY_NAME,
            KeyColumn::CountryCode => COUNTRY_CODE,
        }
    }
}

/// One parsed row: raw string cells in header order.
///
/// Columns are shared between all rows of a table, so cloning a row is cheap
/// apart from its own values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Build a row against a shared header. Short records are padded with
    /// empty cells, long records are truncated to the header width.
    pub fn new(columns: Arc<[String]>, mut values: Vec<String>) -> Self {
        if values.len() > columns.len() {
            debug!(
                "dropping {} cell(s) beyond the {}-column header: {:?}",
                values.len() - columns.len(),
                columns.len(),
                &values[columns.len()..]
            );
        }
        values.resize(columns.len(), String::new());
        Self { columns, values }
    }

    /// Build a standalone row from `(column, value)` pairs, keeping their order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Raw cell for `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Shared header handle, for building sibling rows.
    pub fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn country_name(&self) -> Option<&str> {
        self.get(COUNTRY_NAME)
    }

    pub fn country_code(&self) -> Option<&str> {
        self.get(COUNTRY_CODE)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Wide-format table for one indicator: one row per entity, one column per year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorTable {
    #[serde(skip)]
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl IndicatorTable {
    /// Build a table from a header and raw records.
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let shared: Arc<[String]> = columns.clone().into();
        let rows = records
            .into_iter()
            .map(|r| Row::new(Arc::clone(&shared), r))
            .collect();
        Self { columns, rows }
    }

    /// Build a table from prepared rows. The header is taken from the first row.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.columns().to_vec())
            .unwrap_or_default();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl AsRef<IndicatorTable> for IndicatorTable {
    fn as_ref(&self) -> &IndicatorTable {
        self
    }
}

/// One observation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

impl YearValue {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Values of one (entity, indicator) pair, ascending by year, no duplicate years.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesSet {
    points: Vec<YearValue>,
}

impl SeriesSet {
    /// Sort by year and keep the first value seen for each year.
    pub fn from_points(mut points: Vec<YearValue>) -> Self {
        points.sort_by_key(|p| p.year);
        points.dedup_by_key(|p| p.year);
        Self { points }
    }

    pub fn points(&self) -> &[YearValue] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &YearValue> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn value_at(&self, year: i32) -> Option<f64> {
        self.points
            .binary_search_by_key(&year, |p| p.year)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// First and last year, if any.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((self.points.first()?.year, self.points.last()?.year))
    }
}

impl<'a> IntoIterator for &'a SeriesSet {
    type Item = &'a YearValue;
    type IntoIter = std::slice::Iter<'a, YearValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Several series folded onto one year. Serializes flat: `{"year":1990,"A":5.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub year: i32,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl AlignedRecord {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, series: &str) -> Option<f64> {
        self.values.get(series).copied()
    }
}

/// One axis of a comparison view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisValue {
    pub axis: String,
    pub value: f64,
}

/// Values of one entity expressed as fractions of a maximum shared with the
/// other entities of the same comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFrame {
    pub entity: String,
    pub values: Vec<AxisValue>,
}

/// Tidy observation used for export: one row per (entity, indicator, year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub entity: String,
    pub indicator: String,
    pub year: i32,
    pub value: f64,
}

impl Observation {
    /// Flatten a series into tidy observations.
    pub fn from_series(entity: &str, indicator: &str, series: &SeriesSet) -> Vec<Self> {
        series
            .iter()
            .map(|p| Self {
                entity: entity.to_string(),
                indicator: indicator.to_string(),
                year: p.year,
                value: p.value,
            })
            .collect()
    }
}
