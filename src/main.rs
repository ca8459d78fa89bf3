use anyhow::Result;
use cafe_reviews::config::Config;
use cafe_reviews::coordinator::BatchTranslationCoordinator;
use cafe_reviews::i18n::{LanguageCatalog, SupportStatus};
use cafe_reviews::openai::{OpenAiProvider, OpenAiSettings};
use cafe_reviews::provider::TranslationProvider;
use cafe_reviews::review::{ReviewField, ReviewStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cafe_reviews=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting cafe review translation");

    let config = Config::from_env()?;

    // Step 1: Build the provider and list the languages it offers
    let pair = config.language_pair();
    let provider: Arc<dyn TranslationProvider> = Arc::new(OpenAiProvider::new(
        reqwest::Client::new(),
        OpenAiSettings::from_config(&config),
        config.supported_languages.clone(),
        pair.clone(),
    ));

    let catalog = LanguageCatalog::new(provider.clone(), config.display_language.clone());
    let languages = catalog.available_languages().await?;
    info!("{} languages available:", languages.len());
    for language in &languages {
        info!("  {}", language.localized_name(catalog.display_language()));
    }

    // Step 2: Load reviews
    let store = ReviewStore::load_or_empty(&config.reviews_file);
    if store.is_empty() {
        info!("No reviews loaded from {}, nothing to do", config.reviews_file);
        return Ok(());
    }
    info!("Loaded {} reviews", store.len());

    // Step 3: Check the language pair
    let check = catalog.check_support(&pair).await;
    if check.status != SupportStatus::Supported {
        warn!("Translation {} is {:?}, skipping", check.pair, check.status);
        return Ok(());
    }

    // Step 4: Translate names as one correlated batch
    let coordinator = BatchTranslationCoordinator::new(provider);
    match coordinator
        .translate_sequence(&store, ReviewField::Name)
        .await
    {
        Ok(outcome) => info!(
            "Names: {} submitted, {} applied, {} discarded",
            outcome.submitted, outcome.applied, outcome.discarded
        ),
        Err(e) => warn!("Name translation stopped early, keeping remaining names: {}", e),
    }

    // Step 5: Translate description and highlights per review
    for (index, review) in store.snapshot().iter().enumerate() {
        match coordinator.translate_all_at_once(review).await {
            Ok(translated) => store.replace(index, translated)?,
            Err(e) => warn!("Keeping original text for '{}': {}", review.name, e),
        }
    }

    // Translated reviews go to stdout, logs to stderr
    println!("{}", serde_json::to_string_pretty(&*store.snapshot())?);

    info!("{}", coordinator.metrics().report().format_log());
    info!("Translation finished");
    Ok(())
}
