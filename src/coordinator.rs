//! Batch translation: send review text to a provider and route each
//! translated string back to the review it came from.
//!
//! Three strategies are offered, and they correlate differently:
//!
//! - [`translate_sequence`](BatchTranslationCoordinator::translate_sequence)
//!   tags every request with its index and routes responses by that tag,
//!   so responses may arrive in any order.
//! - [`translate_all_at_once`](BatchTranslationCoordinator::translate_all_at_once)
//!   sends a review's description and highlights together and routes by
//!   position in the returned list. It relies on the provider keeping the
//!   order of a small fixed list.
//! - [`translate`](BatchTranslationCoordinator::translate) handles one string.

use crate::error::{Result, TranslationError};
use crate::i18n::TranslationMetrics;
use crate::provider::{TranslationProvider, TranslationRequest, TranslationResponse};
use crate::review::{ReviewField, ReviewRecord, ReviewStore};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Client identifier attached to a batch request: the request's position in
/// the submitted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(usize);

impl ClientId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Parse the decimal form produced by `Display`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok().map(Self)
    }

    /// Resolve an echoed identifier to a slot in a batch of `len` requests.
    ///
    /// Missing, non-numeric and out-of-range identifiers resolve to `None`.
    pub fn resolve(raw: Option<&str>, len: usize) -> Option<Self> {
        Self::parse(raw?).filter(|id| id.0 < len)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an identifier-correlated batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Requests handed to the provider
    pub submitted: usize,
    /// Responses written into the store
    pub applied: usize,
    /// Responses dropped because their identifier did not resolve
    pub discarded: usize,
}

/// Drives translation operations against one provider.
pub struct BatchTranslationCoordinator {
    provider: Arc<dyn TranslationProvider>,
    metrics: Arc<TranslationMetrics>,
}

impl BatchTranslationCoordinator {
    /// Coordinator reporting into the process-wide metrics.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self::with_metrics(provider, TranslationMetrics::global())
    }

    pub fn with_metrics(
        provider: Arc<dyn TranslationProvider>,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self { provider, metrics }
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    /// Build the tagged requests for a batch.
    pub fn build_requests(texts: &[String]) -> Vec<TranslationRequest> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                TranslationRequest::with_identifier(text.clone(), ClientId::new(index).to_string())
            })
            .collect()
    }

    /// Translate `field` of every review as one batch.
    ///
    /// Each response is routed to the review whose index it carries as its
    /// identifier. Responses with an unusable identifier are logged and
    /// skipped. A provider error stops the operation and is returned;
    /// responses applied before it stay applied. Reviews that never receive
    /// a response keep their text.
    ///
    /// Callers must not run two operations against the same store at once.
    pub async fn translate_sequence(
        &self,
        store: &ReviewStore,
        field: ReviewField,
    ) -> Result<BatchOutcome> {
        let texts = store.field_texts(field);
        if texts.is_empty() {
            debug!("No reviews to translate, skipping batch");
            return Ok(BatchOutcome::default());
        }

        let requests = Self::build_requests(&texts);
        let mut outcome = BatchOutcome {
            submitted: requests.len(),
            ..BatchOutcome::default()
        };

        info!(
            "Submitting batch of {} {} strings to {}",
            outcome.submitted,
            field,
            self.provider.name()
        );
        self.metrics.record_batch();

        let mut responses = self.provider.translate_batch(requests);
        while let Some(item) = responses.next().await {
            match item {
                Ok(response) => {
                    if self.apply_response(store, field, outcome.submitted, &response) {
                        outcome.applied += 1;
                    } else {
                        outcome.discarded += 1;
                    }
                }
                Err(e) => {
                    self.metrics.record_provider_failure();
                    error!(
                        "Batch translation aborted after {} of {} responses: {}",
                        outcome.applied, outcome.submitted, e
                    );
                    return Err(e.into());
                }
            }
        }

        info!(
            "Batch finished: {} applied, {} discarded, {} submitted",
            outcome.applied, outcome.discarded, outcome.submitted
        );
        Ok(outcome)
    }

    /// Route one response into the store. Returns whether it was applied.
    fn apply_response(
        &self,
        store: &ReviewStore,
        field: ReviewField,
        batch_len: usize,
        response: &TranslationResponse,
    ) -> bool {
        let raw = response.client_identifier.as_deref();
        let Some(id) = ClientId::resolve(raw, batch_len) else {
            warn!(
                "Discarding response with unusable identifier {:?} (batch of {})",
                raw, batch_len
            );
            self.metrics.record_discarded();
            return false;
        };

        match store.apply_translation(id.index(), field, &response.target_text) {
            Ok(()) => {
                self.metrics.record_applied();
                true
            }
            Err(e) => {
                warn!("Discarding response {}: {}", id, e);
                self.metrics.record_discarded();
                false
            }
        }
    }

    /// Translate a review's description and highlights in one request.
    ///
    /// The first response becomes the description and the last the
    /// highlights. With a single response only the description changes;
    /// with none, both keep their original text. A provider error is
    /// returned and the review is left as it was.
    pub async fn translate_all_at_once(&self, review: &ReviewRecord) -> Result<ReviewRecord> {
        let requests = vec![
            TranslationRequest::new(review.description.clone()),
            TranslationRequest::new(review.highlights.clone()),
        ];
        self.metrics.record_batch();

        let responses = match self.provider.translations(requests).await {
            Ok(responses) => responses,
            Err(e) => {
                self.metrics.record_provider_failure();
                warn!("Translating review '{}' failed: {}", review.name, e);
                return Err(e.into());
            }
        };

        let description = responses.first();
        let highlights = if responses.len() >= 2 {
            responses.last()
        } else {
            None
        };
        if responses.len() != 2 {
            warn!(
                "Expected 2 translations for review '{}', got {}",
                review.name,
                responses.len()
            );
        }

        let mut translated = review.clone();
        if let Some(response) = description {
            translated.description = response.target_text.clone();
            self.metrics.record_applied();
        }
        if let Some(response) = highlights {
            translated.highlights = response.target_text.clone();
            self.metrics.record_applied();
        }
        Ok(translated)
    }

    /// Translate a single string.
    pub async fn translate(&self, text: &str) -> Result<String> {
        self.metrics.record_single_request();
        self.provider.translate(text).await.map_err(|e| {
            self.metrics.record_provider_failure();
            warn!("Single translation failed: {}", e);
            TranslationError::from(e)
        })
    }

    /// Translate one field of one review in place.
    ///
    /// On failure the field keeps its text and the error is returned.
    pub async fn translate_field(
        &self,
        store: &ReviewStore,
        index: usize,
        field: ReviewField,
    ) -> Result<()> {
        let review = store.get(index).ok_or(TranslationError::IndexOutOfRange {
            index,
            len: store.len(),
        })?;
        let translated = self.translate(review.field(field)).await?;
        store.apply_translation(index, field, &translated)?;
        self.metrics.record_applied();
        Ok(())
    }
}
