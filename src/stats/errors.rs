use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
