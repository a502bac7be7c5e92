//! Error type shared by every retrieval pipeline.

use thiserror::Error;

/// Errors raised while loading, reshaping, or fetching data.
///
/// Every variant is a hard failure: the pipeline that raised it returns no partial
/// result. Soft issues (non-numeric years in IDMC/GIDD data, unknown metric codes)
/// are turned into `Cell::Null` instead and never reach this type.
#[derive(Debug, Error)]
pub enum Error {
    /// A filter, indicator, or identity column is not present in the table.
    #[error("column '{column}' not found")]
    MissingColumn { column: String },

    /// A wide-format column's suffix after the last underscore is not a year.
    #[error("column '{column}' does not end in an integer year")]
    YearSuffix { column: String },

    /// A World Bank record carries a `date` that is not an integer year.
    #[error("invalid year '{value}' in record for indicator {indicator}")]
    YearValue { indicator: String, value: String },

    /// A CSV source holds bytes that are not valid in its declared encoding.
    #[error("{origin} is not valid {encoding}")]
    Encoding {
        origin: String,
        encoding: &'static str,
    },

    /// Server answered with a non-success status.
    #[error("GET {url} failed with HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Response decoded, but its shape or payload signals an API-level problem.
    #[error("api error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing(column: impl Into<String>) -> Self {
        Error::MissingColumn {
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
