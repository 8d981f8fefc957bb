//! Error types for loading indicator tables.
//!
//! Only resource-level failures are errors. An entity missing from a table or a
//! regression that cannot be fitted are ordinary `None` results.

use thiserror::Error;

/// Failure to fetch or parse an indicator table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// The resource could not be read from disk.
    #[error("failed to read {locator}: {source}")]
    Read {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    /// The server answered with a non-success status.
    #[error("request for {locator} failed with HTTP {status}")]
    Http { locator: String, status: u16 },

    /// Transport failure after all retries.
    #[error("network error fetching {locator}: {message}")]
    Network { locator: String, message: String },

    /// No line starting with the `"Country Name"` column was found.
    #[error("no \"Country Name\" header row found in {locator}")]
    MissingHeader { locator: String },

    /// The CSV body after the header marker is malformed.
    #[error("malformed CSV in {locator}: {source}")]
    Csv {
        locator: String,
        #[source]
        source: csv::Error,
    },
}

impl DataLoadError {
    /// Resource locator the error refers to.
    pub fn locator(&self) -> &str {
        match self {
            DataLoadError::Read { locator, .. }
            | DataLoadError::Http { locator, .. }
            | DataLoadError::Network { locator, .. }
            | DataLoadError::MissingHeader { locator }
            | DataLoadError::Csv { locator, .. } => locator,
        }
    }
}
