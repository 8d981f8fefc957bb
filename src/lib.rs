//! wdi_dash
//!
//! Data core of an exploratory dashboard for World Bank country indicators
//! (population, GDP, emissions, agriculture). Pairs with the `wdi` CLI.
//!
//! ### Features
//! - Load wide-format WDI CSV downloads, skipping their metadata banner
//! - Select a country row and extract its `(year, value)` series
//! - Align several indicators on one year axis, sparse or zero-filled
//! - Average paired male/female tables, normalize entities to a shared scale
//! - Linear, log-x and exponential least-squares trends
//! - Chart-ready JSON for every dashboard view, with stale-result rejection
//!
//! ### Example
//! ```no_run
//! use wdi_dash::{Catalog, Dashboard, FsSource};
//! use wdi_dash::catalog::Gas;
//!
//! let dash = Dashboard::new(FsSource::new("data"), Catalog::default());
//! let emissions = dash.emissions("Germany", Gas::CO2);
//! if let Some(chart) = emissions.ready() {
//!     println!("{} years, y max {}", chart.records.len(), chart.y_max);
//! }
//! ```

pub mod align;
pub mod batch;
pub mod catalog;
pub mod combine;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod regression;
pub mod select;
pub mod session;
pub mod stats;
pub mod storage;

pub use catalog::Catalog;
pub use dashboard::{ChartContent, Dashboard};
pub use error::DataLoadError;
pub use loader::{FsSource, HttpSource, TableSource};
pub use models::{AlignedRecord, ComparisonFrame, IndicatorTable, KeyColumn, Row, SeriesSet, YearValue};
pub use regression::{ExponentialModel, LinearModel};
pub use session::Session;
