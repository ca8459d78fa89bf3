//! Error types shared by the store, catalog and coordinator.

use thiserror::Error;

/// Errors surfaced by the review store and translation operations.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The review data could not be decoded. Nothing was loaded.
    #[error("failed to decode reviews: {0}")]
    Decode(String),

    /// A write targeted a position outside the store.
    #[error("index {index} out of range for {len} reviews")]
    IndexOutOfRange { index: usize, len: usize },

    /// The translation provider failed mid-operation.
    #[error("translation provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// The provider reported a support status outside the known set.
    #[error("unknown language support status: {0}")]
    UnknownStatus(String),

    /// A language tag did not look like `ll` or `ll-RR`.
    #[error("invalid language tag: '{0}'")]
    InvalidLanguageTag(String),

    /// The review file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for TranslationError {
    fn from(err: serde_json::Error) -> Self {
        TranslationError::Decode(err.to_string())
    }
}

/// Errors raised by a [`TranslationProvider`](crate::provider::TranslationProvider)
/// implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (network, timeout, decoding).
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The backend answered but returned no translation.
    #[error("response contained no translation")]
    EmptyResponse,

    /// The requested language pair cannot be translated.
    #[error("language pair {0} is not supported")]
    Unsupported(String),
}

impl ProviderError {
    /// Whether retrying the same request could succeed.
    ///
    /// Rate limits, server errors and transport failures are transient;
    /// other client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Request(_) | ProviderError::EmptyResponse => true,
            ProviderError::Unsupported(_) => false,
        }
    }
}

pub type Result<T, E = TranslationError> = std::result::Result<T, E>;
