//! The recommendation proxy: profile in, three career matches out.
//!
//! One linear pass per request: credential check, prompt synthesis, a single
//! upstream call, fence-tolerant extraction, typed decoding. No retries and no
//! state shared between requests.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::{ChatClient, GatewayClient};
use crate::config::UpstreamConfig;
use crate::error::{PredictionError, Result};
use crate::extract::decode_prediction;
use crate::models::{ChatMessage, PredictionResult, Profile};
use crate::prompts::{SYSTEM_PROMPT, build_user_prompt};

/// Where the upstream bearer credential comes from
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Read the named environment variable on every call
    Env(String),
    Fixed(Option<String>),
}

impl Credentials {
    pub fn resolve(&self) -> Result<String> {
        match self {
            Credentials::Env(var) => std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PredictionError::configuration(format!("{var} is not configured"))),
            Credentials::Fixed(Some(key)) if !key.trim().is_empty() => Ok(key.clone()),
            Credentials::Fixed(_) => Err(PredictionError::configuration(
                "API credential is not configured",
            )),
        }
    }
}

#[derive(Clone)]
pub struct RecommendationProxy {
    pub(crate) client: Arc<dyn ChatClient>,
    pub(crate) credentials: Credentials,
    pub(crate) temperature: f32,
    strict_validation: bool,
}

impl RecommendationProxy {
    pub fn new(client: Arc<dyn ChatClient>, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            temperature: 0.7,
            strict_validation: false,
        }
    }

    /// Proxy backed by the HTTP gateway client described by `cfg`
    pub fn from_config(cfg: &UpstreamConfig) -> Result<Self> {
        let client = GatewayClient::new(cfg)?;
        info!(
            "Recommendation proxy using {} (model={})",
            client.endpoint(),
            cfg.model
        );
        Ok(Self::new(Arc::new(client), Credentials::Env(cfg.api_key_env.clone()))
            .with_temperature(cfg.temperature)
            .with_strict_validation(cfg.strict_validation))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub async fn predict(&self, profile: &Profile) -> Result<PredictionResult> {
        info!(
            full_name = %profile.name,
            age = profile.age,
            education = %profile.education_level,
            personality = %profile.personality_type,
            interests = profile.interests.len(),
            skills = profile.skills.len(),
            "Received assessment data"
        );
        debug!("Profile: {:?}", profile);

        let api_key = self.credentials.resolve()?;

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(profile)),
        ];
        info!("Calling AI with prompt");
        let content = self
            .client
            .complete(&api_key, &messages, self.temperature)
            .await
            .inspect_err(log_malformed)?;
        info!("AI response received ({} chars)", content.len());

        let result = decode_prediction(&content).inspect_err(log_malformed)?;

        if self.strict_validation {
            check_contract(&result, &content).inspect_err(|e| {
                warn!(raw = %content, "AI response violates contract: {}", e);
            })?;
        }
        Ok(result)
    }
}

/// Log the raw upstream reply behind a MalformedResponse
pub(crate) fn log_malformed(err: &PredictionError) {
    if let PredictionError::MalformedResponse { reason, raw } = err {
        warn!(raw = %raw, "Failed to parse AI response: {}", reason);
    }
}

const EXPECTED_CAREERS: usize = 3;

/// Optional post-decode check: exactly 3 careers, scores within 0-100
fn check_contract(result: &PredictionResult, raw: &str) -> Result<()> {
    if result.careers.len() != EXPECTED_CAREERS {
        return Err(PredictionError::malformed(
            format!(
                "expected {EXPECTED_CAREERS} careers, got {}",
                result.careers.len()
            ),
            raw,
        ));
    }
    if let Some(c) = result
        .careers
        .iter()
        .find(|c| !(0..=100).contains(&c.match_score))
    {
        return Err(PredictionError::malformed(
            format!(
                "matchScore {} for '{}' is outside 0-100",
                c.match_score, c.career_name
            ),
            raw,
        ));
    }
    Ok(())
}
