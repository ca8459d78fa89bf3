use crate::i18n::{LanguagePair, LanguageTag};
use anyhow::{Context, Result};

pub const DEFAULT_REVIEWS_FILE: &str = "data/cafe_reviews.json";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SUPPORTED_LANGUAGES: &str = "en-US,es-ES,fr-FR,de-DE,ja-JP";

#[derive(Debug, Clone)]
pub struct Config {
    // Reviews
    pub reviews_file: String,

    // Language selection
    pub source_language: Option<LanguageTag>,
    pub target_language: Option<LanguageTag>,
    pub display_language: LanguageTag,

    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,

    // Languages the provider offers
    pub supported_languages: Vec<LanguageTag>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            reviews_file: std::env::var("REVIEWS_FILE")
                .unwrap_or_else(|_| DEFAULT_REVIEWS_FILE.to_string()),

            source_language: optional_tag("SOURCE_LANGUAGE")?,
            target_language: optional_tag("TARGET_LANGUAGE")?,
            display_language: match optional_tag("DISPLAY_LANGUAGE")? {
                Some(tag) => tag,
                None => LanguageTag::new("en", None)?,
            },

            openai_api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string()),

            supported_languages: parse_language_list(
                &std::env::var("SUPPORTED_LANGUAGES")
                    .unwrap_or_else(|_| DEFAULT_SUPPORTED_LANGUAGES.to_string()),
            )
            .context("Invalid SUPPORTED_LANGUAGES")?,
        })
    }

    /// The configured source/target selection.
    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language.clone(), self.target_language.clone())
    }
}

/// Read an optional language tag. Unset or blank means `None`.
fn optional_tag(var: &str) -> Result<Option<LanguageTag>> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            let tag = value
                .parse::<LanguageTag>()
                .with_context(|| format!("Invalid {}: '{}'", var, value))?;
            Ok(Some(tag))
        }
        _ => Ok(None),
    }
}

/// Parse a comma-separated list of language tags, skipping blanks.
pub fn parse_language_list(raw: &str) -> Result<Vec<LanguageTag>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<LanguageTag>()
                .with_context(|| format!("Invalid language tag '{}'", s))
        })
        .collect()
}
