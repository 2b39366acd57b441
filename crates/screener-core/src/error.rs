use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("Invalid lens: {0}")]
    InvalidLens(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
