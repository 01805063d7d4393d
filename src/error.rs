/// Error types for the data source engine.
///
/// Only configuration mistakes surface as errors. Operations on absent keys
/// (removing a sort key or filter that was never added) are silent no-ops.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSourceError {
    /// `search_by_field` was called without field names on object records.
    #[error("search by field requires field names when records are objects")]
    MissingSearchFields,

    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),

    /// A filter clause carried neither `symbol` nor `filterClause.symbol`.
    #[error("filter clause has no comparison symbol")]
    MissingOperator,

    #[error("unknown logical connector '{0}'; use 'and' or 'or'")]
    UnknownConnector(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DataSourceError>;
