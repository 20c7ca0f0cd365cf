use thiserror::Error;

/// Error types for translation backends and the comment pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Provider or settings are unusable as given
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport failure, including timeouts
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The backend answered but produced nothing usable
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// Language tag could not be parsed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Ignore-prefix regular expression failed to compile
    #[error("Invalid ignore pattern: {0}")]
    InvalidPattern(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MtError::NetworkError(format!("request timed out: {}", err))
        } else {
            MtError::NetworkError(err.to_string())
        }
    }
}

/// Result type for translation operations
pub type MtResult<T> = Result<T, MtError>;
