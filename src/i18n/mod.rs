//! Language handling: tags, display names, provider availability and
//! translation metrics.
//!
//! # Architecture
//!
//! - `language`: validated `LanguageTag` (language code plus optional region)
//! - `registry`: static table of localized language names
//! - `catalog`: provider-backed language list and pair support checks
//! - `metrics`: counters for translation operations
//!
//! # Example
//!
//! ```rust,ignore
//! use cafe_reviews::i18n::{LanguageCatalog, LanguagePair, LanguageTag};
//!
//! let catalog = LanguageCatalog::new(provider, "en".parse()?);
//! let languages = catalog.available_languages().await?;
//! let pair = LanguagePair::new(Some("en".parse()?), Some("es".parse()?));
//! let check = catalog.check_support(&pair).await;
//! ```

mod catalog;
mod language;
mod metrics;
mod registry;

pub use catalog::{LanguageCatalog, LanguagePair, SupportCheck, SupportStatus};
pub use language::LanguageTag;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
