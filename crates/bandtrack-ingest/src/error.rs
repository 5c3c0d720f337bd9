use thiserror::Error;

/// Errors returned while reading a banding/encounter CSV.
///
/// Only whole-file problems are errors. A bad row is counted and skipped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column missing from CSV header: {0}")]
    MissingColumn(String),
}
