use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not readable: {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog contains no entries")]
    Empty,

    #[error("catalog entry with empty code")]
    EmptyCode,

    #[error("duplicate catalog code: {0}")]
    DuplicateCode(String),

    #[error("negative tariff for catalog code {0}")]
    NegativeTariff(String),
}
