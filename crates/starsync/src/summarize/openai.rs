//! OpenAI-compatible chat-completions summarizer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::SummarizeError;
use super::types::{SummaryRequest, Summarizer};
use crate::platform::short_error_message;
use crate::retry::{RetryConfig, with_retry_config};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 8192;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const USER_INSTRUCTIONS: &str = "\
Summarize this repository covering:
1. Core purpose and functionality
2. Main tech stack
3. Use cases and target users
4. Distinctive strengths or highlights

Keep the summary within 200-300 characters. Be precise and informative.

---
";

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model name.
    pub model: String,
}

impl OpenAiConfig {
    /// Settings for the public OpenAI endpoint with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Use a different base URL (any OpenAI-compatible server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

/// Summarizer that calls `{base_url}/chat/completions`.
///
/// Retries on 429 and 5xx gateway errors with exponential backoff. Cloning
/// shares the HTTP connection pool.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    config: Arc<OpenAiConfig>,
    retry: RetryConfig,
}

impl OpenAiSummarizer {
    /// Create a summarizer.
    ///
    /// # Errors
    /// Returns `SummarizeError::Config` if the API key is empty or the HTTP
    /// client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, SummarizeError> {
        if config.api_key.trim().is_empty() {
            return Err(SummarizeError::config("API key is empty"));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("starsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SummarizeError::config(e.to_string()))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete_once(&self, request: &SummaryRequest) -> Result<String, SummarizeError> {
        let system = system_prompt(&request.target_language);
        let user = format!("{}{}", USER_INSTRUCTIONS, request.text);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizeError::request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                message: text.lines().next().unwrap_or_default().to_string(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::invalid_response(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            tracing::info!(
                identity = %request.identity,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Token usage"
            );
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SummarizeError::invalid_response("no choices in response"))?;

        let summary = choice.message.content.unwrap_or_default().trim().to_string();
        if summary.is_empty() {
            tracing::warn!(identity = %request.identity, "Model returned empty content");
        }
        Ok(summary)
    }
}

impl std::fmt::Debug for OpenAiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSummarizer")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizeError> {
        with_retry_config(
            self.retry.clone(),
            || self.complete_once(request),
            SummarizeError::is_retryable,
            short_error_message,
            &request.identity,
            None,
        )
        .await
    }
}

/// System prompt asking for a summary in `language`.
pub fn system_prompt(language: &str) -> String {
    format!(
        "You are a technical project analyst. Given a GitHub repository's information, \
         write a concise summary in {}. Output the summary directly without any preamble or labels.",
        language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::{Canned, serve};

    fn request() -> SummaryRequest {
        SummaryRequest {
            identity: "octocat/hello".to_string(),
            text: "Repository: octocat/hello".to_string(),
            target_language: "French".to_string(),
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig::new(Duration::from_millis(1), Duration::from_millis(5), 2).with_jitter(false)
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = OpenAiSummarizer::new(OpenAiConfig::new("  ")).unwrap_err();
        assert!(matches!(err, SummarizeError::Config { .. }));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = OpenAiConfig::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_system_prompt_mentions_language() {
        assert!(system_prompt("Japanese").contains("in Japanese."));
    }

    #[test]
    fn test_is_retryable_statuses() {
        for status in [429, 500, 502, 503, 504] {
            let err = SummarizeError::Status {
                status,
                message: String::new(),
            };
            assert!(err.is_retryable(), "{status} should retry");
        }
        let err = SummarizeError::Status {
            status: 401,
            message: String::new(),
        };
        assert!(!err.is_retryable());
        assert!(!SummarizeError::request("timeout").is_retryable());
    }

    #[tokio::test]
    async fn summarize_retries_then_returns_trimmed_content() {
        let (base_url, server) = serve(vec![
            Canned::json(503, r#"{"error":"overloaded"}"#),
            Canned::json(
                200,
                r#"{"choices":[{"message":{"content":"  A friendly greeter.  "}}],"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#,
            ),
        ])
        .await;

        let summarizer = OpenAiSummarizer::new(OpenAiConfig::new("sk-test").with_base_url(base_url))
            .unwrap()
            .with_retry_config(fast_retry());

        let summary = summarizer.summarize(&request()).await.unwrap();
        assert_eq!(summary, "A friendly greeter.");

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].starts_with("POST /chat/completions"));
        assert!(requests[1].to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(requests[1].contains("in French."));
        assert!(requests[1].contains("\"max_tokens\":8192"));
    }

    #[tokio::test]
    async fn summarize_does_not_retry_client_errors() {
        let (base_url, server) = serve(vec![Canned::json(401, r#"{"error":"bad key"}"#)]).await;

        let summarizer = OpenAiSummarizer::new(OpenAiConfig::new("sk-test").with_base_url(base_url))
            .unwrap()
            .with_retry_config(fast_retry());

        let err = summarizer.summarize(&request()).await.unwrap_err();
        assert!(matches!(err, SummarizeError::Status { status: 401, .. }));
        assert_eq!(server.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn summarize_empty_content_is_ok_empty() {
        let (base_url, _server) =
            serve(vec![Canned::json(200, r#"{"choices":[{"message":{"content":null}}]}"#)]).await;

        let summarizer =
            OpenAiSummarizer::new(OpenAiConfig::new("sk-test").with_base_url(base_url)).unwrap();

        assert_eq!(summarizer.summarize(&request()).await.unwrap(), "");
    }
}
