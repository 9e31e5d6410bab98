use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Transport-level failure talking to a suggestion backend
    #[error("Provider failure: {0}")]
    ProviderFailure(String),

    /// Backend answered, but the payload could not be understood
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),

    #[error("Nothing to select while session is {0}")]
    SelectionUnavailable(&'static str),

    #[error("Search session is closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl SearchError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::ProviderFailure(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Failures a lookup can end with; both surface as the `Error` phase.
    pub const fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::ProviderFailure(_) | Self::MalformedResponse(_))
    }
}
