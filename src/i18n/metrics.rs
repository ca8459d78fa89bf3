//! Translation metrics and observability module.
//!
//! Counts what happened to each translation response: applied to the
//! store, discarded during correlation, or lost to a provider failure.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Counters for translation operations.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Number of batches handed to a provider
    batches_submitted: AtomicUsize,

    /// Number of single-string translations requested
    single_requests: AtomicUsize,

    /// Number of responses written into the review store
    responses_applied: AtomicUsize,

    /// Number of responses dropped because their identifier did not resolve
    responses_discarded: AtomicUsize,

    /// Number of operations aborted by a provider error
    provider_failures: AtomicUsize,
}

/// Process-wide metrics instance (initialized lazily)
static METRICS: OnceLock<Arc<TranslationMetrics>> = OnceLock::new();

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the shared process-wide metrics instance.
    pub fn global() -> Arc<TranslationMetrics> {
        Arc::clone(METRICS.get_or_init(|| Arc::new(TranslationMetrics::new())))
    }

    pub fn record_batch(&self) {
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_single_request(&self) {
        self.single_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        self.responses_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.responses_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batches_submitted(&self) -> usize {
        self.batches_submitted.load(Ordering::Relaxed)
    }

    pub fn single_requests(&self) -> usize {
        self.single_requests.load(Ordering::Relaxed)
    }

    pub fn responses_applied(&self) -> usize {
        self.responses_applied.load(Ordering::Relaxed)
    }

    pub fn responses_discarded(&self) -> usize {
        self.responses_discarded.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let applied = self.responses_applied();
        let discarded = self.responses_discarded();
        let total_responses = applied + discarded;
        let apply_rate = if total_responses > 0 {
            (applied as f64 / total_responses as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            batches_submitted: self.batches_submitted(),
            single_requests: self.single_requests(),
            responses_applied: applied,
            responses_discarded: discarded,
            apply_rate,
            provider_failures: self.provider_failures(),
        }
    }

    /// Reset all metrics to zero (useful for testing).
    #[cfg(test)]
    pub fn reset(&self) {
        self.batches_submitted.store(0, Ordering::Relaxed);
        self.single_requests.store(0, Ordering::Relaxed);
        self.responses_applied.store(0, Ordering::Relaxed);
        self.responses_discarded.store(0, Ordering::Relaxed);
        self.provider_failures.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of translation metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub batches_submitted: usize,
    pub single_requests: usize,
    pub responses_applied: usize,
    pub responses_discarded: usize,
    /// Percentage of received responses that were applied (0-100)
    pub apply_rate: f64,
    pub provider_failures: usize,
}

impl MetricsReport {
    /// One-line summary suitable for logging.
    pub fn format_log(&self) -> String {
        format!(
            "batches={} singles={} applied={} discarded={} ({:.1}% applied) provider_failures={}",
            self.batches_submitted,
            self.single_requests,
            self.responses_applied,
            self.responses_discarded,
            self.apply_rate,
            self.provider_failures
        )
    }
}
