use thiserror::Error;

/// Errors raised at the I/O boundary (loading snapshots, writing reports,
/// reading configuration). The metrics core itself never fails.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported data file format: {0}")]
    UnsupportedFormat(String),

    #[error("payload has no rows array (expected an array, `data` or `rows`)")]
    MissingRows,

    #[error("invalid field map: {0}")]
    InvalidFieldMap(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
