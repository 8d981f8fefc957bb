//! Loading of wide-format indicator tables.
//!
//! World Bank CSV downloads start with a few metadata lines (data source,
//! last-updated date, blank lines) before the real header. The true header is
//! the first line whose first field is `Country Name`; everything above it is
//! discarded and the rest is parsed with standard quoted-CSV rules.
//!
//! Tables are fetched through a [`TableSource`]: [`FsSource`] reads from a data
//! directory, [`HttpSource`] from a static file server.
//!
//! ```no_run
//! # use wdi_dash::loader::{FsSource, load_table};
//! let source = FsSource::new("data");
//! let table = load_table(&source, "Economy/Economy_GDP (current US$).csv")?;
//! println!("{} rows", table.len());
//! # Ok::<(), wdi_dash::DataLoadError>(())
//! ```

use crate::error::DataLoadError;
use crate::models::{COUNTRY_NAME, IndicatorTable};
use ahash::AHashMap;
use csv::ReaderBuilder;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Anything that can hand out the raw text of a table by locator.
pub trait TableSource: Send + Sync {
    fn fetch_text(&self, locator: &str) -> Result<String, DataLoadError>;
}

impl<T: TableSource + ?Sized> TableSource for &T {
    fn fetch_text(&self, locator: &str) -> Result<String, DataLoadError> {
        (**self).fetch_text(locator)
    }
}

impl<T: TableSource + ?Sized> TableSource for Box<T> {
    fn fetch_text(&self, locator: &str) -> Result<String, DataLoadError> {
        (**self).fetch_text(locator)
    }
}

/// Reads tables relative to a data directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TableSource for FsSource {
    fn fetch_text(&self, locator: &str) -> Result<String, DataLoadError> {
        let path = self.root.join(locator);
        std::fs::read_to_string(&path).map_err(|source| DataLoadError::Read {
            locator: locator.to_string(),
            source,
        })
    }
}

// Keep path separators and the usual unreserved characters readable.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_path(locator: &str) -> String {
    locator
        .split('/')
        .map(|s| percent_encoding::utf8_percent_encode(s, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Fetches tables from a static file server.
#[derive(Debug, Clone)]
pub struct HttpSource {
    pub base_url: String,
    http: HttpClient,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataLoadError> {
        let base_url = base_url.into();
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("wdi_dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataLoadError::Network {
                locator: base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { base_url, http })
    }

    /// Full URL for a locator.
    pub fn url_for(&self, locator: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_path(locator.trim_start_matches('/'))
        )
    }
}

impl TableSource for HttpSource {
    fn fetch_text(&self, locator: &str) -> Result<String, DataLoadError> {
        let url = self.url_for(locator);
        // Small retry for transient failures (5xx / network errors)
        let mut last_err = String::from("no attempt made");
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(&url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.text().map_err(|e| DataLoadError::Network {
                        locator: locator.to_string(),
                        message: e.to_string(),
                    });
                }
                Ok(r) if r.status().is_server_error() => {
                    last_err = format!("HTTP {}", r.status());
                }
                Ok(r) => {
                    return Err(DataLoadError::Http {
                        locator: locator.to_string(),
                        status: r.status().as_u16(),
                    });
                }
                Err(e) => last_err = e.to_string(),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(DataLoadError::Network {
            locator: locator.to_string(),
            message: last_err,
        })
    }
}

/// Byte offset of the first line whose first field is `Country Name`.
fn header_offset(text: &str) -> Option<usize> {
    let quoted = format!("\"{COUNTRY_NAME}\"");
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let head = line.trim_start_matches('\u{feff}');
        let skipped = line.len() - head.len();
        if head.starts_with(&quoted) || head.starts_with(&format!("{COUNTRY_NAME},")) {
            return Some(offset + skipped);
        }
        offset += line.len();
    }
    None
}

/// Parse the text of an indicator file, discarding the banner above the header.
pub fn parse_table(locator: &str, text: &str) -> Result<IndicatorTable, DataLoadError> {
    let start = header_offset(text).ok_or_else(|| DataLoadError::MissingHeader {
        locator: locator.to_string(),
    })?;
    let csv_err = |source| DataLoadError::Csv {
        locator: locator.to_string(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text[start..].as_bytes());
    let columns: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(csv_err)?;
        if rec.iter().all(|c| c.is_empty()) {
            continue;
        }
        records.push(rec.iter().map(str::to_string).collect());
    }
    Ok(IndicatorTable::new(columns, records))
}

/// Fetch and parse one table.
pub fn load_table<S: TableSource + ?Sized>(
    source: &S,
    locator: &str,
) -> Result<IndicatorTable, DataLoadError> {
    let text = source.fetch_text(locator)?;
    parse_table(locator, &text)
}

/// Tables already fetched during one page view, keyed by locator.
///
/// Failed loads are not remembered, so a later request retries them.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: Mutex<AHashMap<String, Arc<IndicatorTable>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table or load it through `source`.
    pub fn get_or_load<S: TableSource + ?Sized>(
        &self,
        source: &S,
        locator: &str,
    ) -> Result<Arc<IndicatorTable>, DataLoadError> {
        if let Some(t) = self.lock().get(locator) {
            return Ok(Arc::clone(t));
        }
        // Loaded outside the lock so concurrent fetches of different files overlap.
        let table = Arc::new(load_table(source, locator)?);
        let mut guard = self.lock();
        let entry = guard
            .entry(locator.to_string())
            .or_insert_with(|| Arc::clone(&table));
        Ok(Arc::clone(entry))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AHashMap<String, Arc<IndicatorTable>>> {
        // A poisoned map still holds complete tables.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}
