// src/error.rs

use thiserror::Error;

/// Failures of the fetch → extract → clean core.
///
/// Every variant is terminal for the run that raised it; nothing in the core
/// retries or returns a partially populated dataset.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL was rejected before any request was made.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport failure, timeout, or a non-success status.
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no <table> element found in document")]
    TableNotFound,

    /// A data row lacks one of the required cells.
    #[error("row {row}: missing `{field}` cell")]
    Parse { row: usize, field: &'static str },

    /// A required cell is present but empty.
    #[error("row {row}: `{field}` is blank")]
    BlankField { row: usize, field: &'static str },

    #[error("row {row}: column `{column}` value {value:?} is not a valid {target}")]
    TypeCoercion {
        row: usize,
        column: &'static str,
        value: String,
        target: &'static str,
    },

    #[error("row {row}: score {value:?} is not two non-negative integers split by {separator:?}")]
    ScoreFormat {
        row: usize,
        value: String,
        separator: char,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
