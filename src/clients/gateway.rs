use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::clients::traits::ChatClient;
use crate::config::UpstreamConfig;
use crate::error::{PredictionError, Result};
use crate::models::ChatMessage;

/// Preview length for upstream error bodies in logs
const ERROR_BODY_PREVIEW: usize = 500;

/// OpenAI-compatible chat-completion gateway client
#[derive(Clone, Debug)]
pub struct GatewayClient {
    endpoint: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl GatewayClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                PredictionError::configuration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            endpoint: completions_endpoint(&cfg.base_url),
            model: cfg.model.clone(),
            timeout,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Ensure the base URL ends with the chat-completions path
fn completions_endpoint(base_url: &str) -> String {
    if base_url.ends_with("/chat/completions") {
        base_url.to_string()
    } else {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatClient for GatewayClient {
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };
        debug!(
            "Calling chat completion (model={}, messages={}, timeout_ms={})",
            self.model,
            messages.len(),
            self.timeout.as_millis()
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                "AI API error: {}",
                text.chars().take(ERROR_BODY_PREVIEW).collect::<String>()
            );
            return Err(PredictionError::from_upstream_status(status.as_u16()));
        }

        let text = resp.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| PredictionError::malformed(format!("completion envelope: {e}"), &text))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PredictionError::malformed("completion has no message content", text))
    }
}
