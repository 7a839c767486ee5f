use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Cancelled")]
    Cancelled,

    /// Ctrl+C. Unlike `Cancelled` this ends the whole session.
    #[error("Interrupted")]
    Interrupted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        BatchError::Validation(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BatchError::Network(e) if e.is_timeout())
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, BatchError::Network(e) if e.is_connect() || e.is_request())
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
