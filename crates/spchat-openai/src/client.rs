//! OpenAI-compatible chat-completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use spchat_core::{
    Error, GenerationConfig, GenerationResult, LLMProvider, PromptMessage, Result,
};

use crate::config::OpenAiConfig;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

/// OpenAI-compatible LLM client
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
    verified: bool,
}

impl OpenAiClient {
    /// Create a new client from configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            verified: false,
        })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAiConfig::from_env()?;
        Self::new(config)
    }

    /// Override the model id from configuration
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Whether `connect` has verified the API key
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    async fn perform_chat(
        &self,
        messages: &[PromptMessage],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request_body = ChatRequest {
            model: &config.model_id,
            messages,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.api_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Provider unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!(
                "Provider request failed with status {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Malformed provider response: {}", e)))?;

        let text = chat_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::Generation("Provider returned no completion".to_string()))?;

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used: chat_response.usage.and_then(|u| u.total_tokens),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAiClient {
    async fn connect(&mut self) -> Result<()> {
        let url = format!("{}/models", self.config.api_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::Authentication(format!(
                "Provider rejected the API key: {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(Error::Network(format!(
                "Provider health check failed: {}",
                status
            )));
        }

        self.verified = true;
        Ok(())
    }

    async fn chat(
        &self,
        messages: &[PromptMessage],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let chat_future = self.perform_chat(messages, config);

        match timeout(config.timeout, chat_future).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "Generation timed out after {:?}",
                config.timeout
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}
