use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub const DEFAULT_API_KEY_ENV: &str = "LOVABLE_API_KEY";

/// Main configuration structure loaded from career_predictor.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    /// Runtime configuration loaded from environment variables only
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_bind: SocketAddr,
    /// Upper bound for request bodies, in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Chat-completion provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_ms: u64,
    /// Name of the environment variable holding the bearer credential.
    /// The value itself is never stored in config.
    pub api_key_env: String,
    /// Reject replies that are not exactly 3 careers with scores in 0-100
    pub strict_validation: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ai.gateway.lovable.dev/v1".to_string(),
            model: "google/gemini-2.5-flash".to_string(),
            temperature: 0.7,
            timeout_ms: 60_000,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            strict_validation: false,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
    /// When set, every route except /health requires `Authorization: Bearer <token>`
    pub bearer_token: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "career_predictor=info,tower_http=info".to_string(),
            bearer_token: None,
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("CAREER_LOG_LEVEL")
            && !level.trim().is_empty()
        {
            config.log_level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG")
            && !level.trim().is_empty()
        {
            config.log_level = level;
        }
        config.bearer_token = std::env::var("CAREER_BEARER_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        config
    }
}

fn parse_timeout_ms(value: &str) -> anyhow::Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        anyhow::anyhow!(
            "CAREER_UPSTREAM_TIMEOUT_MS '{}' is not a whole number of milliseconds",
            value
        )
    })
}

fn env_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    /// Uses CAREER_PREDICTOR_CONFIG or defaults to "career_predictor.toml".
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("CAREER_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = std::env::var("CAREER_PREDICTOR_CONFIG")
            .unwrap_or_else(|_| "career_predictor.toml".to_string());

        let mut config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides()?;
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(bind) = std::env::var("CAREER_HTTP_BIND") {
            self.server.http_bind = bind
                .parse()
                .map_err(|e| anyhow::anyhow!("CAREER_HTTP_BIND '{}' is invalid: {}", bind, e))?;
        }
        if let Ok(url) = std::env::var("CAREER_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Ok(model) = std::env::var("CAREER_MODEL") {
            self.upstream.model = model;
        }
        if let Ok(t) = std::env::var("CAREER_TEMPERATURE") {
            self.upstream.temperature = t
                .parse()
                .map_err(|_| anyhow::anyhow!("CAREER_TEMPERATURE '{}' is not a number", t))?;
        }
        if let Ok(ms) = std::env::var("CAREER_UPSTREAM_TIMEOUT_MS") {
            self.upstream.timeout_ms = parse_timeout_ms(&ms)?;
        }
        if let Ok(var) = std::env::var("CAREER_API_KEY_ENV") {
            self.upstream.api_key_env = var;
        }
        if let Ok(strict) = std::env::var("CAREER_STRICT_VALIDATION") {
            self.upstream.strict_validation = env_flag(&strict);
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let up = &self.upstream;
        if !up.base_url.starts_with("http://") && !up.base_url.starts_with("https://") {
            anyhow::bail!(
                "upstream.base_url '{}' must start with http:// or https://",
                up.base_url
            );
        }
        if up.model.trim().is_empty() {
            anyhow::bail!("upstream.model must not be empty");
        }
        if !(0.0..=2.0).contains(&up.temperature) {
            anyhow::bail!("upstream.temperature must be between 0.0 and 2.0");
        }
        if up.timeout_ms == 0 {
            anyhow::bail!("upstream.timeout_ms must be > 0");
        }
        if up.api_key_env.trim().is_empty() {
            anyhow::bail!("upstream.api_key_env must name an environment variable");
        }
        if self.server.max_body_bytes == 0 {
            anyhow::bail!("server.max_body_bytes must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.upstream.api_key_env, "LOVABLE_API_KEY");
        assert_eq!(config.upstream.model, "google/gemini-2.5-flash");
        assert!((config.upstream.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!config.upstream.strict_validation);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [upstream]
            model = "openai/gpt-4o-mini"
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.model, "openai/gpt-4o-mini");
        assert_eq!(config.upstream.timeout_ms, 5000);
        assert_eq!(config.upstream.base_url, "https://ai.gateway.lovable.dev/v1");
        assert_eq!(config.server.http_bind.port(), 8787);
    }

    #[test]
    fn test_server_section() {
        let config = Config::from_toml_str(
            r#"
            [server]
            http_bind = "0.0.0.0:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.http_bind.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.upstream.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.api_key_env = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_override_must_parse() {
        assert_eq!(parse_timeout_ms("5000").unwrap(), 5000);
        assert_eq!(parse_timeout_ms(" 250 ").unwrap(), 250);
        let err = parse_timeout_ms("5s").unwrap_err();
        assert!(err.to_string().contains("CAREER_UPSTREAM_TIMEOUT_MS"));
        assert!(parse_timeout_ms("-1").is_err());
        assert!(parse_timeout_ms("").is_err());
    }

    #[test]
    fn test_env_flag() {
        assert!(env_flag("1"));
        assert!(env_flag("TRUE"));
        assert!(!env_flag("0"));
        assert!(!env_flag("yes"));
    }
}
