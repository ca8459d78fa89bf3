//! Language registry: display names for known language codes.
//!
//! The registry is a static table initialised once behind a `OnceLock`. Each
//! entry carries the language's name as written in a handful of display
//! languages, which is what the catalog sorts and renders by.

use std::sync::OnceLock;

/// Display metadata for one language code.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es")
    pub code: &'static str,

    /// The language's name keyed by display language code.
    ///
    /// The entry for the language itself is its native name.
    pub names: &'static [(&'static str, &'static str)],
}

impl LanguageConfig {
    /// Name of this language as shown to a reader of `display_code`.
    pub fn name_in(&self, display_code: &str) -> Option<&'static str> {
        self.names
            .iter()
            .find(|(code, _)| *code == display_code)
            .map(|(_, name)| *name)
    }

    /// English name, used when the display language has no entry.
    pub fn english_name(&self) -> &'static str {
        self.name_in("en").unwrap_or(self.code)
    }
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// Localized name of `code` for a reader of `display_code`.
    ///
    /// Falls back to the English name when the display language is not in
    /// the table. Returns `None` for codes the registry does not know.
    pub fn display_name(&self, code: &str, display_code: &str) -> Option<&'static str> {
        let config = self.get_by_code(code)?;
        Some(
            config
                .name_in(&display_code.to_ascii_lowercase())
                .unwrap_or_else(|| config.english_name()),
        )
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            names: &[
                ("en", "English"),
                ("es", "inglés"),
                ("fr", "anglais"),
                ("de", "Englisch"),
                ("ja", "英語"),
            ],
        },
        LanguageConfig {
            code: "es",
            names: &[
                ("en", "Spanish"),
                ("es", "español"),
                ("fr", "espagnol"),
                ("de", "Spanisch"),
                ("ja", "スペイン語"),
            ],
        },
        LanguageConfig {
            code: "fr",
            names: &[
                ("en", "French"),
                ("es", "francés"),
                ("fr", "français"),
                ("de", "Französisch"),
                ("ja", "フランス語"),
            ],
        },
        LanguageConfig {
            code: "de",
            names: &[
                ("en", "German"),
                ("es", "alemán"),
                ("fr", "allemand"),
                ("de", "Deutsch"),
                ("ja", "ドイツ語"),
            ],
        },
        LanguageConfig {
            code: "ja",
            names: &[
                ("en", "Japanese"),
                ("es", "japonés"),
                ("fr", "japonais"),
                ("de", "Japanisch"),
                ("ja", "日本語"),
            ],
        },
        LanguageConfig {
            code: "it",
            names: &[
                ("en", "Italian"),
                ("es", "italiano"),
                ("fr", "italien"),
                ("de", "Italienisch"),
                ("ja", "イタリア語"),
            ],
        },
        LanguageConfig {
            code: "pt",
            names: &[
                ("en", "Portuguese"),
                ("es", "portugués"),
                ("fr", "portugais"),
                ("de", "Portugiesisch"),
                ("ja", "ポルトガル語"),
                ("pt", "português"),
            ],
        },
        LanguageConfig {
            code: "zh",
            names: &[
                ("en", "Chinese"),
                ("es", "chino"),
                ("fr", "chinois"),
                ("de", "Chinesisch"),
                ("ja", "中国語"),
                ("zh", "中文"),
            ],
        },
        LanguageConfig {
            code: "ko",
            names: &[
                ("en", "Korean"),
                ("es", "coreano"),
                ("fr", "coréen"),
                ("de", "Koreanisch"),
                ("ja", "韓国語"),
                ("ko", "한국어"),
            ],
        },
    ]
}
