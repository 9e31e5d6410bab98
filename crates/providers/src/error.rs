use thiserror::Error;
use typeahead_search::SearchError;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Backend answered {status}")]
    Status { status: u16 },

    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Unexpected payload shape: {0}")]
    Shape(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ProviderError> for SearchError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::HttpError(inner) if inner.is_decode() => {
                Self::MalformedResponse(inner.to_string())
            }
            ProviderError::DecodeError(_) | ProviderError::Shape(_) => {
                Self::MalformedResponse(err.to_string())
            }
            ProviderError::InvalidEndpoint(msg) => Self::InvalidConfig(msg),
            ProviderError::IoError(inner) => Self::IoError(inner),
            other => Self::ProviderFailure(other.to_string()),
        }
    }
}
