use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

/// Raised only at the import boundary; tree functions never fail.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Payload is neither a component array nor an object with a `components` array")]
    NotAForest,

    #[error("Invalid component at index {index}: {source}")]
    InvalidComponent {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
