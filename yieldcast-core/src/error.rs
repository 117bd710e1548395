//! Error types for the yieldcast-core crate.
//!
//! The prediction pipeline and the regional summary pipeline share this enum
//! but never a failure path: a `DataLoad` raised while reading historical
//! observations or region geometry only ever surfaces from summary calls.

use thiserror::Error;

/// Top-level error type for yield estimation and summary operations.
#[derive(Debug, Error)]
pub enum YieldError {
    /// Feature columns (names or order) disagree with what the predictor expects.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Historical observations or region geometry could not be read.
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// A crop identifier outside the closed crop set.
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl YieldError {
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    pub fn data_load(msg: impl Into<String>) -> Self {
        Self::DataLoad(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error only affects the regional summary view.
    pub fn is_data_load(&self) -> bool {
        matches!(self, Self::DataLoad(_))
    }

    /// An equivalent error of the same variant, for failures that are cached
    /// and reported more than once. Wrapped library errors keep their message.
    pub fn replay(&self) -> Self {
        match self {
            Self::SchemaMismatch(msg) => Self::SchemaMismatch(msg.clone()),
            Self::DataLoad(msg) => Self::DataLoad(msg.clone()),
            Self::Encoding(msg) => Self::Encoding(msg.clone()),
            Self::Model(msg) => Self::Model(msg.clone()),
            Self::InvalidInput(msg) => Self::InvalidInput(msg.clone()),
            Self::Config(msg) => Self::Config(msg.clone()),
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
            Self::Serde(e) => Self::Serde(serde_json::Error::io(std::io::Error::other(
                e.to_string(),
            ))),
            Self::Csv(e) => Self::Csv(csv::Error::from(std::io::Error::other(e.to_string()))),
        }
    }
}
