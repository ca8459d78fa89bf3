//! Language catalog: which languages a provider offers and whether a given
//! pair can be translated.

use crate::error::TranslationError;
use crate::i18n::LanguageTag;
use crate::provider::{LanguageStatus, TranslationProvider};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A source/target selection. Either side may still be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    pub source: Option<LanguageTag>,
    pub target: Option<LanguageTag>,
}

impl LanguagePair {
    pub fn new(source: Option<LanguageTag>, target: Option<LanguageTag>) -> Self {
        Self { source, target }
    }

    /// Both sides, if both are set.
    pub fn resolved(&self) -> Option<(&LanguageTag, &LanguageTag)> {
        Some((self.source.as_ref()?, self.target.as_ref()?))
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = |tag: &Option<LanguageTag>| {
            tag.as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "?".to_string())
        };
        write!(f, "{} -> {}", side(&self.source), side(&self.target))
    }
}

/// Whether a pair can be translated, as consumed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    Supported,
    Unsupported,
    /// Not checked, not checkable, or the provider gave no usable answer.
    Unknown,
}

impl SupportStatus {
    /// Collapse a provider status.
    ///
    /// `Other` maps to [`SupportStatus::Unknown`]; it is never treated as a
    /// yes or a no.
    pub fn from_provider(status: &LanguageStatus) -> Self {
        match status {
            LanguageStatus::Installed | LanguageStatus::Supported => SupportStatus::Supported,
            LanguageStatus::Unsupported => SupportStatus::Unsupported,
            LanguageStatus::Other(_) => SupportStatus::Unknown,
        }
    }
}

/// The result of checking one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportCheck {
    pub pair: LanguagePair,
    pub status: SupportStatus,
}

/// Queries a provider for language availability.
///
/// Every check returns its own [`SupportCheck`]. The catalog also remembers
/// the most recently *completed* check, for the pair it was made for only.
/// Concurrent checks race: the last one to finish replaces the remembered
/// result, whichever was started first.
pub struct LanguageCatalog {
    provider: Arc<dyn TranslationProvider>,
    display_language: LanguageTag,
    last_check: watch::Sender<Option<SupportCheck>>,
}

impl LanguageCatalog {
    /// `display_language` controls how language names are rendered and
    /// therefore how [`available_languages`](Self::available_languages) sorts.
    pub fn new(provider: Arc<dyn TranslationProvider>, display_language: LanguageTag) -> Self {
        let (last_check, _) = watch::channel(None);
        Self {
            provider,
            display_language,
            last_check,
        }
    }

    pub fn display_language(&self) -> &LanguageTag {
        &self.display_language
    }

    /// Languages the provider supports, sorted by localized display name.
    pub async fn available_languages(&self) -> Result<Vec<LanguageTag>, TranslationError> {
        let mut languages = self.provider.supported_languages().await?;
        languages.sort_by_cached_key(|tag| tag.localized_name(&self.display_language));
        debug!(
            "{} offers {} languages",
            self.provider.name(),
            languages.len()
        );
        Ok(languages)
    }

    /// Check whether `pair` can be translated.
    ///
    /// An incomplete pair is `Unknown` and the provider is not consulted.
    /// A provider error is logged and also reported as `Unknown`.
    pub async fn check_support(&self, pair: &LanguagePair) -> SupportCheck {
        let status = match pair.resolved() {
            None => SupportStatus::Unknown,
            Some((source, target)) => match self.provider.status(source, target).await {
                Ok(LanguageStatus::Other(raw)) => {
                    info!(
                        "{} for {}; treating as unknown",
                        TranslationError::UnknownStatus(raw),
                        pair
                    );
                    SupportStatus::Unknown
                }
                Ok(status) => SupportStatus::from_provider(&status),
                Err(e) => {
                    warn!("Language support check for {} failed: {}", pair, e);
                    SupportStatus::Unknown
                }
            },
        };

        let check = SupportCheck {
            pair: pair.clone(),
            status,
        };
        debug!("Support for {}: {:?}", pair, status);
        self.last_check.send_replace(Some(check.clone()));
        check
    }

    /// Status of the last completed check, if it was for `pair`.
    pub fn cached_status(&self, pair: &LanguagePair) -> Option<SupportStatus> {
        self.last_check
            .borrow()
            .as_ref()
            .filter(|check| &check.pair == pair)
            .map(|check| check.status)
    }

    /// The last completed check, whatever pair it was for.
    pub fn last_check(&self) -> Option<SupportCheck> {
        self.last_check.borrow().clone()
    }

    /// Watch completed checks.
    pub fn subscribe(&self) -> watch::Receiver<Option<SupportCheck>> {
        self.last_check.subscribe()
    }

    /// Forget the last check.
    pub fn reset(&self) {
        self.last_check.send_replace(None);
    }
}
