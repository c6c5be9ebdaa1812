use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ModelError;
use crate::types::{ChatMessage, Role};
use crate::ChatModel;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role,
            content: &message.content,
            images: message
                .images
                .iter()
                .map(|image| general_purpose::STANDARD.encode(image))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, ModelError> {
        if let Some(error) = self.error {
            return Err(ModelError::MalformedResponse(error));
        }
        self.message
            .and_then(|message| message.content)
            .ok_or_else(|| ModelError::MalformedResponse("missing message.content".to_string()))
    }
}

/// Non-streaming client for an Ollama `/api/chat` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    health_timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ModelError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client: builder.build()?,
            base_url,
            model: model.into(),
            health_timeout: Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS),
        })
    }

    /// Bounds the health probe independently of the chat request timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ModelError> {
        let url = format!("{}/api/chat", self.base_url);
        let image_count: usize = messages.iter().map(|m| m.images.len()).sum();
        info!(
            "Sending {} message(s) with {} image(s) to {}",
            messages.len(),
            image_count,
            self.model
        );

        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;
        let text = reply.into_text()?;

        debug!("Model replied with {} characters", text.len());
        Ok(text)
    }

    async fn check_health(&self) -> Result<bool, ModelError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
