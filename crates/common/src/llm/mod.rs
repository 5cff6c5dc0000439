//! Chat completion clients
//!
//! `OpenAIChatModel` talks to any OpenAI-compatible `/chat/completions`
//! endpoint. Completions are not retried; a failed call surfaces as
//! `CompletionError` and the caller decides what to tell the user.
//!
//! `EchoChatModel` answers locally without a network call and is what the
//! gateway runs with when no provider is configured.

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use crate::models::{ChatMessage, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Sampling options for a completion
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

impl From<&LlmConfig> for CompletionOptions {
    fn from(config: &LlmConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// A model answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    pub model: String,
    #[serde(default)]
    pub prompt_tokens: Option<u32>,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
}

/// Trait for chat completion
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a conversation
    async fn complete(&self, messages: &[ChatMessage], options: CompletionOptions) -> Result<Completion>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat completion client
pub struct OpenAIChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

impl OpenAIChatModel {
    /// Create a new client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
            message: "llm.api_key is required for the openai provider".to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let base = config
            .api_base
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(&self, messages: &[ChatMessage], options: CompletionOptions) -> Result<Completion> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::CompletionError {
                message: format!("Chat completion request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::CompletionError {
                message: format!("Chat completion API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| AppError::CompletionError {
                message: format!("Failed to parse chat completion response: {}", e),
            })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::CompletionError {
                message: "Empty response from chat completion API".to_string(),
            })?;

        Ok(Completion {
            content,
            model: chat_response.model.unwrap_or_else(|| self.model.clone()),
            prompt_tokens: chat_response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: chat_response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Offline model that restates the question and the excerpts it was given
#[derive(Debug, Default, Clone)]
pub struct EchoChatModel;

impl EchoChatModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatModel for EchoChatModel {
    async fn complete(&self, messages: &[ChatMessage], _options: CompletionOptions) -> Result<Completion> {
        let question = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.trim())
            .unwrap_or_default();

        let excerpts: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .flat_map(|m| m.content.lines())
            .filter(|line| line.starts_with('['))
            .collect();

        let content = if excerpts.is_empty() {
            format!(
                "You asked: \"{}\". No document excerpts matched this question. \
                 [Offline response - no language model configured]",
                question
            )
        } else {
            format!(
                "You asked: \"{}\". Relevant excerpts: {}. \
                 [Offline response - no language model configured]",
                question,
                excerpts.join("; ")
            )
        };

        Ok(Completion {
            content,
            model: "echo".to_string(),
            prompt_tokens: None,
            completion_tokens: None,
        })
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

/// Create a chat model based on configuration
pub fn create_chat_model(config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIChatModel::new(config)?)),
        "echo" => Ok(Arc::new(EchoChatModel::new())),
        other => Err(AppError::Configuration {
            message: format!("Unknown llm provider: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(base: String) -> LlmConfig {
        LlmConfig {
            provider: "openai".to_string(),
            api_key: Some("test-key".to_string()),
            api_base: Some(base),
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_echo_model_lists_excerpts() {
        let model = EchoChatModel::new();
        let messages = vec![
            ChatMessage::system("Prompt\n\nDocument excerpts:\n\n[1] ahu.pdf (chunk 0)\nFilters"),
            ChatMessage::user("When are filters changed?"),
        ];
        let completion = model.complete(&messages, CompletionOptions::default()).await.unwrap();
        assert!(completion.content.contains("When are filters changed?"));
        assert!(completion.content.contains("[1] ahu.pdf (chunk 0)"));
        assert_eq!(completion.model, "echo");
    }

    #[tokio::test]
    async fn test_openai_model_parses_response() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["role"], "user");
                Json(serde_json::json!({
                    "model": "gpt-4o-mini-2024",
                    "choices": [{"message": {"role": "assistant", "content": "Quarterly."}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 2}
                }))
            }),
        );
        let model = OpenAIChatModel::new(&config(serve(router).await)).unwrap();

        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("q")];
        let completion = model.complete(&messages, CompletionOptions::default()).await.unwrap();
        assert_eq!(completion.content, "Quarterly.");
        assert_eq!(completion.model, "gpt-4o-mini-2024");
        assert_eq!(completion.completion_tokens, Some(2));
    }

    #[tokio::test]
    async fn test_openai_model_error_is_not_retried() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc as StdArc;

        let calls = StdArc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
                }
            }),
        );
        let model = OpenAIChatModel::new(&config(serve(router).await)).unwrap();

        let err = model
            .complete(&[ChatMessage::user("q")], CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CompletionError { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_factory() {
        assert!(create_chat_model(&LlmConfig::default()).is_ok());

        let missing_key = LlmConfig {
            provider: "openai".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(create_chat_model(&missing_key), Err(AppError::Configuration { .. })));

        let unknown = LlmConfig {
            provider: "bard".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_chat_model(&unknown).is_err());
    }
}
