//! The translation provider seam.
//!
//! Everything that actually translates text lives behind
//! [`TranslationProvider`]. The rest of the crate only builds requests,
//! consumes responses and writes results back into the review store.

use crate::error::ProviderError;
use crate::i18n::LanguageTag;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// One string to translate, optionally tagged by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub source_text: String,
    /// Opaque tag echoed back on the matching response.
    pub client_identifier: Option<String>,
}

impl TranslationRequest {
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            client_identifier: None,
        }
    }

    pub fn with_identifier(source_text: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            client_identifier: Some(identifier.into()),
        }
    }
}

/// A translated string and the identifier of the request it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResponse {
    pub source_text: String,
    pub target_text: String,
    pub client_identifier: Option<String>,
}

/// Availability of a language pair as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageStatus {
    /// Translation works without further downloads.
    Installed,
    /// Translation works once resources are fetched.
    Supported,
    /// The pair cannot be translated.
    Unsupported,
    /// A status this crate does not know how to interpret.
    Other(String),
}

/// A backend that can translate text between a fixed pair of languages.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Languages this provider can translate from or to. May be empty.
    async fn supported_languages(&self) -> Result<Vec<LanguageTag>, ProviderError>;

    /// Availability of translation from `source` to `target`.
    async fn status(
        &self,
        source: &LanguageTag,
        target: &LanguageTag,
    ) -> Result<LanguageStatus, ProviderError>;

    /// Translate a single string.
    async fn translate(&self, text: &str) -> Result<String, ProviderError>;

    /// Translate a fixed list. Responses come back in request order.
    async fn translations(
        &self,
        requests: Vec<TranslationRequest>,
    ) -> Result<Vec<TranslationResponse>, ProviderError>;

    /// Translate a batch lazily.
    ///
    /// Responses may arrive in any order. An `Err` item ends the stream.
    fn translate_batch(
        &self,
        requests: Vec<TranslationRequest>,
    ) -> BoxStream<'_, Result<TranslationResponse, ProviderError>>;
}
