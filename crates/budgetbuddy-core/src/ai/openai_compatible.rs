//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - OpenAI itself (https://api.openai.com)
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4.1-nano)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::prompts;

use super::parsing::parse_plan_response;
use super::{ChatMessage, GeneratedPlan, PlanRequest, PlannerBackend};

/// Default model when `OPENAI_COMPATIBLE_MODEL` is not set
const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL`, `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model =
            std::env::var("OPENAI_COMPATIBLE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();

        let mut backend = Self::new(&host, &model);
        backend.api_key = api_key;
        Some(backend)
    }

    /// Make a chat completion request
    async fn chat_completion(
        &self,
        messages: Vec<WireMessage>,
        temperature: Option<f64>,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidInput(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::InvalidInput("No response from OpenAI API".into()))
    }
}

#[async_trait]
impl PlannerBackend for OpenAICompatibleBackend {
    async fn generate_plan(&self, request: &PlanRequest) -> Result<GeneratedPlan> {
        let prompt = prompts::plan_prompt(
            &request.goal,
            request.monthly_income,
            &request.currency,
            request.additional_context.as_deref(),
        );

        debug!(model = %self.model, "Requesting plan generation");

        // Low temperature: the response must be strict JSON
        let response = self
            .chat_completion(
                vec![WireMessage {
                    role: "user".to_string(),
                    content: prompt,
                }],
                Some(0.1),
            )
            .await?;

        parse_plan_response(&response)
    }

    async fn chat(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
        for turn in history {
            messages.push(WireMessage {
                role: turn.role.clone(),
                content: turn.content.clone(),
            });
        }
        messages.push(WireMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });

        self.chat_completion(messages, None).await
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .timeout(std::time::Duration::from_secs(5));

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
}
