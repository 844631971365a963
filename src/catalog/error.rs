use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("source returned status {0}")]
    BadStatus(u16),
    #[error("source returned an empty or truncated body")]
    EmptyBody,
    #[error("all sources failed for group {0}")]
    AllSourcesFailed(String),
    #[error("catalog state poisoned: {0}")]
    StatePoisoned(String),
    #[error("cache IO error: {0}")]
    CacheIo(#[from] std::io::Error),
    #[error("cache envelope error: {0}")]
    CacheFormat(#[from] serde_json::Error),
}
