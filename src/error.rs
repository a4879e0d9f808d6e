use chrono::NaiveDate;
use thiserror::Error;

/// Failure conditions for a collection run.
///
/// Nothing here is retried internally; errors surface to the entry point and
/// the external scheduler owns recovery.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("rates request for {date} failed: {source}")]
    Request {
        date: NaiveDate,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error {status} for {date}: {description}")]
    Api {
        date: NaiveDate,
        status: u16,
        description: String,
    },

    #[error("malformed rates response for {date}: {source}")]
    Parse {
        date: NaiveDate,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("storage credentials error: {0}")]
    Auth(String),

    #[error("upload of {path} failed: {source}")]
    Upload {
        path: String,
        #[source]
        source: object_store::Error,
    },

    #[error("could not serialize snapshot for {date}: {source}")]
    Serialize {
        date: NaiveDate,
        #[source]
        source: csv::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}
