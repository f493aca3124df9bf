use async_trait::async_trait;

use crate::error::Result;
use crate::models::ChatMessage;

/// One chat-completion exchange with the upstream model provider.
///
/// Implementations perform exactly one request and never retry; status
/// classification into `PredictionError` happens here so callers only see
/// domain errors.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String>;
}
