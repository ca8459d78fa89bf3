//! Language tags: a language code with an optional script and region.

use crate::error::TranslationError;
use crate::i18n::LanguageRegistry;
use std::fmt;
use std::str::FromStr;

/// A validated language identifier such as `en`, `es-ES` or `zh-Hant-TW`.
///
/// The language subtag is stored lowercase, the script titlecase and the
/// region uppercase, so two tags compare equal regardless of how they were
/// written. Variants and extensions are not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageTag {
    language: String,
    script: Option<String>,
    region: Option<String>,
}

impl LanguageTag {
    /// Create a tag from its parts.
    ///
    /// # Returns
    /// * `Ok(LanguageTag)` if the language is 2-3 ASCII letters and the region,
    ///   when present, is 2 ASCII letters or 3 digits
    /// * `Err(TranslationError::InvalidLanguageTag)` otherwise
    pub fn new(language: &str, region: Option<&str>) -> Result<Self, TranslationError> {
        let invalid = || {
            let raw = match region {
                Some(region) => format!("{}-{}", language, region),
                None => language.to_string(),
            };
            TranslationError::InvalidLanguageTag(raw)
        };

        let language_ok = (2..=3).contains(&language.len())
            && language.chars().all(|c| c.is_ascii_alphabetic());
        if !language_ok {
            return Err(invalid());
        }

        let region = match region {
            Some(region) => {
                let alpha = region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic());
                let numeric = region.len() == 3 && region.chars().all(|c| c.is_ascii_digit());
                if !alpha && !numeric {
                    return Err(invalid());
                }
                Some(region.to_ascii_uppercase())
            }
            None => None,
        };

        Ok(Self {
            language: language.to_ascii_lowercase(),
            script: None,
            region,
        })
    }

    /// Add a four-letter script subtag such as `Hans`.
    pub fn with_script(mut self, script: &str) -> Result<Self, TranslationError> {
        if script.len() != 4 || !script.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TranslationError::InvalidLanguageTag(format!(
                "{}-{}",
                self, script
            )));
        }
        let mut normalized = script.to_ascii_lowercase();
        normalized[..1].make_ascii_uppercase();
        self.script = Some(normalized);
        Ok(self)
    }

    /// The language subtag (e.g., "es").
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The script subtag, if any (e.g., "Hans").
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// The region subtag, if any (e.g., "ES").
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Whether both tags name the same language, ignoring region.
    ///
    /// Two different scripts count as different languages; a missing script
    /// matches any.
    pub fn same_language(&self, other: &LanguageTag) -> bool {
        self.language == other.language
            && match (&self.script, &other.script) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }

    /// Human-readable name for a reader whose display language is `display`.
    ///
    /// Renders as `"<name> (<tag>)"`, e.g. `"Spanish (es-ES)"`. Codes the
    /// registry does not know render as `"Unknown language code"`.
    pub fn localized_name(&self, display: &LanguageTag) -> String {
        match LanguageRegistry::get().display_name(&self.language, &display.language) {
            Some(name) => format!("{} ({})", name, self),
            None => "Unknown language code".to_string(),
        }
    }

    /// English name of the language, or the raw code if unknown.
    pub fn english_name(&self) -> String {
        LanguageRegistry::get()
            .display_name(&self.language, "en")
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(script) = &self.script {
            write!(f, "-{}", script)?;
        }
        if let Some(region) = &self.region {
            write!(f, "-{}", region)?;
        }
        Ok(())
    }
}

impl FromStr for LanguageTag {
    type Err = TranslationError;

    /// Parse `ll`, `ll-RR`, `ll-Ssss` or `ll-Ssss-RR`, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |_| TranslationError::InvalidLanguageTag(s.to_string());

        let mut parts = s.split(|c: char| c == '-' || c == '_');
        let language = parts.next().unwrap_or_default();
        let mut next = parts.next();
        let script = match next {
            Some(part) if part.len() == 4 => {
                next = parts.next();
                Some(part)
            }
            _ => None,
        };
        let region = next;
        if parts.next().is_some() {
            return Err(TranslationError::InvalidLanguageTag(s.to_string()));
        }

        let tag = Self::new(language, region).map_err(invalid)?;
        match script {
            Some(script) => tag.with_script(script).map_err(invalid),
            None => Ok(tag),
        }
    }
}
