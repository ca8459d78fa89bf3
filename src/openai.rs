//! Translation provider backed by an OpenAI-compatible chat completions API.

use crate::config::Config;
use crate::error::ProviderError;
use crate::i18n::{LanguagePair, LanguageTag};
use crate::provider::{
    LanguageStatus, TranslationProvider, TranslationRequest, TranslationResponse,
};
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use futures::future::{self, try_join_all};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// Build the system prompt for translating review text
fn build_system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        r#"You are a professional translator. Translate the user's text from {} to {}.

## Translation Rules

### DO NOT translate:
- Street addresses and postal codes
- Price symbols (e.g., $, $$, $$$)
- Brand and product names

### Output:
- Reply with the translation only, no quotes or commentary
- Preserve line breaks and punctuation style
- Keep the tone of a casual cafe review"#,
        source_language, target_language
    )
}

/// Connection and model settings for [`OpenAiProvider`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_completion_tokens: u32,
    /// Requests in flight at once during a streamed batch
    pub batch_concurrency: usize,
    pub retry: RetryConfig,
}

impl OpenAiSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            max_completion_tokens: 1000,
            batch_concurrency: 4,
            retry: RetryConfig::provider_call(),
        }
    }
}

/// Translates between one source and one target language over HTTP.
///
/// Text is only translated once both sides of the pair are set and name
/// different languages.
pub struct OpenAiProvider {
    client: reqwest::Client,
    settings: OpenAiSettings,
    languages: Vec<LanguageTag>,
    pair: LanguagePair,
}

impl OpenAiProvider {
    /// `languages` is the set this provider reports as supported.
    pub fn new(
        client: reqwest::Client,
        settings: OpenAiSettings,
        languages: Vec<LanguageTag>,
        pair: LanguagePair,
    ) -> Self {
        Self {
            client,
            settings,
            languages,
            pair,
        }
    }

    fn offers(&self, tag: &LanguageTag) -> bool {
        self.languages.iter().any(|known| known.same_language(tag))
    }

    fn build_request(&self, source: &LanguageTag, target: &LanguageTag, text: &str) -> ChatRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.settings.model);
        let max_completion_tokens = if is_reasoning {
            16000
        } else {
            self.settings.max_completion_tokens
        };

        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_system_prompt(&source.english_name(), &target.english_name()),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_completion_tokens,
            temperature: if is_reasoning { None } else { Some(0.3) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        }
    }

    /// One HTTP round trip, no retries.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.settings.api_url)
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Request(format!("Failed to send translation request: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::Request(format!("Failed to parse translation response: {}", e))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn translate_text(&self, text: &str) -> Result<String, ProviderError> {
        let (source, target) = match self.pair.resolved() {
            Some((source, target)) if !source.same_language(target) => (source, target),
            _ => return Err(ProviderError::Unsupported(self.pair.to_string())),
        };

        let request = self.build_request(source, target, text);
        with_retry_if(
            &self.settings.retry,
            &format!("Translation to {}", target),
            || self.complete(&request),
            ProviderError::is_retryable,
        )
        .await
    }

    async fn translate_request(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, ProviderError> {
        let target_text = self.translate_text(&request.source_text).await?;
        Ok(TranslationResponse {
            source_text: request.source_text,
            target_text,
            client_identifier: request.client_identifier,
        })
    }
}

#[async_trait]
impl TranslationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn supported_languages(&self) -> Result<Vec<LanguageTag>, ProviderError> {
        Ok(self.languages.clone())
    }

    async fn status(
        &self,
        source: &LanguageTag,
        target: &LanguageTag,
    ) -> Result<LanguageStatus, ProviderError> {
        // Nothing is installed locally; every offered pair needs the API
        if source.same_language(target) || !self.offers(source) || !self.offers(target) {
            Ok(LanguageStatus::Unsupported)
        } else {
            Ok(LanguageStatus::Supported)
        }
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        self.translate_text(text).await
    }

    async fn translations(
        &self,
        requests: Vec<TranslationRequest>,
    ) -> Result<Vec<TranslationResponse>, ProviderError> {
        debug!("Translating {} strings as a list", requests.len());
        try_join_all(
            requests
                .into_iter()
                .map(|request| self.translate_request(request)),
        )
        .await
    }

    fn translate_batch(
        &self,
        requests: Vec<TranslationRequest>,
    ) -> BoxStream<'_, Result<TranslationResponse, ProviderError>> {
        debug!("Streaming batch of {} strings", requests.len());
        let mut failed = false;
        stream::iter(requests)
            .map(move |request| self.translate_request(request))
            .buffer_unordered(self.settings.batch_concurrency.max(1))
            .take_while(move |item| {
                let keep = !failed;
                failed |= item.is_err();
                future::ready(keep)
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn tag(s: &str) -> LanguageTag {
        s.parse().unwrap()
    }

    fn pair(source: &str, target: &str) -> LanguagePair {
        LanguagePair::new(Some(tag(source)), Some(tag(target)))
    }

    fn create_test_settings(api_url: &str) -> OpenAiSettings {
        OpenAiSettings {
            api_url: api_url.to_string(),
            api_key: "test-openai-key".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_completion_tokens: 500,
            batch_concurrency: 4,
            retry: RetryConfig::new(3, Duration::from_millis(10)),
        }
    }

    fn create_provider(api_url: &str) -> OpenAiProvider {
        OpenAiProvider::new(
            reqwest::Client::new(),
            create_test_settings(api_url),
            vec![tag("en-US"), tag("es-ES"), tag("fr-FR")],
            pair("en-US", "es-ES"),
        )
    }

    fn create_openai_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    // ==================== Prompt Tests ====================

    #[test]
    fn test_build_system_prompt_names_languages() {
        let prompt = build_system_prompt("English", "Spanish");
        assert!(prompt.contains("from English to Spanish"));
        assert!(prompt.contains("DO NOT translate"));
        assert!(prompt.contains("translation only"));
    }

    #[test]
    fn test_build_request_uses_english_names() {
        let provider = create_provider("http://unused.test");
        let request = provider.build_request(&tag("en-US"), &tag("es-ES"), "Cozy corner");

        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0].content.contains("from English to Spanish"));
        assert_eq!(request.messages[1].content, "Cozy corner");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_completion_tokens, 500);
    }

    #[test]
    fn test_chat_request_serialization_reasoning_model() {
        let mut settings = create_test_settings("http://unused.test");
        settings.model = "gpt-5-mini".to_string();
        let provider = OpenAiProvider::new(
            reqwest::Client::new(),
            settings,
            Vec::new(),
            pair("en", "es"),
        );

        let json = serde_json::to_string(&provider.build_request(&tag("en"), &tag("es"), "Test")).unwrap();
        assert!(json.contains("gpt-5-mini"));
        assert!(json.contains("16000"));
        assert!(json.contains("reasoning_effort"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_is_reasoning_model() {
        assert!(is_reasoning_model("gpt-5-mini"));
        assert!(is_reasoning_model("o1-preview"));
        assert!(is_reasoning_model("o3"));
        assert!(is_reasoning_model("o4-mini"));
        assert!(!is_reasoning_model("gpt-4o-mini"));
        assert!(!is_reasoning_model("gpt-4-turbo"));
    }

    // ==================== Language Status Tests ====================

    #[tokio::test]
    async fn test_status_offered_pair_is_supported() {
        let provider = create_provider("http://unused.test");
        let status = provider.status(&tag("en"), &tag("fr-CA")).await.unwrap();
        assert_eq!(status, LanguageStatus::Supported);
    }

    #[tokio::test]
    async fn test_status_same_language_is_unsupported() {
        let provider = create_provider("http://unused.test");
        let status = provider.status(&tag("en-US"), &tag("en-GB")).await.unwrap();
        assert_eq!(status, LanguageStatus::Unsupported);
    }

    #[tokio::test]
    async fn test_status_unknown_language_is_unsupported() {
        let provider = create_provider("http://unused.test");
        let status = provider.status(&tag("en"), &tag("ko")).await.unwrap();
        assert_eq!(status, LanguageStatus::Unsupported);
    }

    #[tokio::test]
    async fn test_supported_languages_returns_configured_set() {
        let provider = create_provider("http://unused.test");
        let languages = provider.supported_languages().await.unwrap();
        assert_eq!(languages.len(), 3);
    }

    // ==================== Single Translation Tests ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_openai_response("  Rincón acogedor \n")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&format!("{}/v1/chat/completions", mock_server.uri()));
        let translated = provider.translate("Cozy corner").await.unwrap();

        assert_eq!(translated, "Rincón acogedor");
    }

    #[tokio::test]
    async fn test_translate_same_language_skips_api() {
        // Invalid URL: any request would fail
        let provider = OpenAiProvider::new(
            reqwest::Client::new(),
            create_test_settings("http://invalid-url-should-not-be-called.test"),
            Vec::new(),
            pair("en-US", "en-GB"),
        );

        let result = provider.translate("Hello").await;
        assert!(matches!(result, Err(ProviderError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_translate_without_target_skips_api() {
        let provider = OpenAiProvider::new(
            reqwest::Client::new(),
            create_test_settings("http://invalid-url-should-not-be-called.test"),
            vec![tag("en"), tag("es")],
            LanguagePair::new(Some(tag("en")), None),
        );

        let result = provider.translate("Hello").await;
        match result {
            Err(ProviderError::Unsupported(raw)) => assert_eq!(raw, "en -> ?"),
            other => panic!("expected unsupported pair, got {:?}", other),
        }

        // The language list does not depend on the pair
        assert_eq!(provider.supported_languages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_translate_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let provider = create_provider(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = provider.translate("Hello").await;
        assert!(matches!(result, Err(ProviderError::EmptyResponse)));
    }

    // ==================== Retry Tests ====================

    #[tokio::test]
    async fn test_translate_retries_on_500_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_openai_response("Hola")),
            )
            .mount(&mock_server)
            .await;

        let provider = create_provider(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = provider.translate("Hello").await;
        assert_eq!(result.unwrap(), "Hola");
    }

    #[tokio::test]
    async fn test_translate_no_retry_on_400_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": {"message": "Bad request"}}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = provider.translate("Hello").await;

        match result {
            Err(ProviderError::Api { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("Bad request"));
            }
            other => panic!("expected 400 API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_exhausts_retries_on_persistent_503() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(3)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = provider.translate("Hello").await;
        assert!(matches!(result, Err(ProviderError::Api { status: 503, .. })));
    }

    // ==================== Batch Tests ====================

    async fn mount_echo(mock_server: &MockServer, source: &str, target: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains(source))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(target)))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_translations_preserve_order() {
        let mock_server = MockServer::start().await;
        mount_echo(&mock_server, "Cozy corner", "Rincón acogedor").await;
        mount_echo(&mock_server, "Flat white", "Café con leche").await;

        let provider = create_provider(&format!("{}/v1/chat/completions", mock_server.uri()));
        let responses = provider
            .translations(vec![
                TranslationRequest::new("Cozy corner"),
                TranslationRequest::new("Flat white"),
            ])
            .await
            .unwrap();

        let texts: Vec<_> = responses.iter().map(|r| r.target_text.as_str()).collect();
        assert_eq!(texts, vec!["Rincón acogedor", "Café con leche"]);
    }

    #[tokio::test]
    async fn test_translate_batch_echoes_identifiers() {
        let mock_server = MockServer::start().await;
        mount_echo(&mock_server, "Cafe A", "Café A").await;
        mount_echo(&mock_server, "Cafe B", "Café B").await;
        mount_echo(&mock_server, "Cafe C", "Café C").await;

        let provider = create_provider(&format!("{}/v1/chat/completions", mock_server.uri()));
        let requests = vec![
            TranslationRequest::with_identifier("Cafe A", "0"),
            TranslationRequest::with_identifier("Cafe B", "1"),
            TranslationRequest::with_identifier("Cafe C", "2"),
        ];

        let mut responses: Vec<_> = provider
            .translate_batch(requests)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .map(|item| item.unwrap())
            .collect();
        responses.sort_by(|a, b| a.client_identifier.cmp(&b.client_identifier));

        let pairs: Vec<_> = responses
            .iter()
            .map(|r| (r.client_identifier.as_deref().unwrap(), r.target_text.as_str()))
            .collect();
        assert_eq!(pairs, vec![("0", "Café A"), ("1", "Café B"), ("2", "Café C")]);
    }

    #[tokio::test]
    async fn test_translate_batch_stops_after_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&mock_server)
            .await;

        let mut settings =
            create_test_settings(&format!("{}/v1/chat/completions", mock_server.uri()));
        settings.batch_concurrency = 1;
        let provider = OpenAiProvider::new(
            reqwest::Client::new(),
            settings,
            Vec::new(),
            pair("en", "es"),
        );

        let items: Vec<_> = provider
            .translate_batch(vec![
                TranslationRequest::with_identifier("a", "0"),
                TranslationRequest::with_identifier("b", "1"),
            ])
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(ProviderError::Api { status: 401, .. })));
    }
}
