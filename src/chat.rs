//! Free-form career chat relayed to the same upstream as predictions.

use tracing::info;

use crate::error::{PredictionError, Result};
use crate::models::{ChatMessage, ChatRole};
use crate::predictor::{RecommendationProxy, log_malformed};
use crate::prompts::CHAT_SYSTEM_PROMPT;

/// Longest conversation forwarded upstream; older turns are dropped
const MAX_HISTORY: usize = 40;

impl RecommendationProxy {
    /// Relay a conversation and return the assistant's next message.
    /// Client-supplied system messages are refused; the history must end
    /// with a user turn.
    pub async fn chat(&self, history: &[ChatMessage]) -> Result<String> {
        validate_history(history)?;
        let api_key = self.credentials.resolve()?;

        let start = history.len().saturating_sub(MAX_HISTORY);
        let mut messages = Vec::with_capacity(history.len() - start + 1);
        messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        messages.extend_from_slice(&history[start..]);

        info!("Relaying chat ({} turns)", messages.len() - 1);
        let reply = self
            .client
            .complete(&api_key, &messages, self.temperature)
            .await
            .inspect_err(log_malformed)?;
        Ok(reply.trim().to_string())
    }
}

fn validate_history(history: &[ChatMessage]) -> Result<()> {
    let Some(last) = history.last() else {
        return Err(PredictionError::invalid_request("messages must not be empty"));
    };
    if history.iter().any(|m| m.role == ChatRole::System) {
        return Err(PredictionError::invalid_request(
            "system messages are not accepted",
        ));
    }
    if last.role != ChatRole::User {
        return Err(PredictionError::invalid_request(
            "last message must come from the user",
        ));
    }
    if last.content.trim().is_empty() {
        return Err(PredictionError::invalid_request("last message is empty"));
    }
    Ok(())
}
