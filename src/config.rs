//! Service configuration
//!
//! All secrets and flags are assembled once at startup into an immutable
//! `Config` and injected into components. Components never read the
//! environment at the point of use.

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub precedent: PrecedentConfig,

    #[serde(default)]
    pub reasoning: ReasoningConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

/// Bearer credential verification configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Shared secret for HMAC token verification.
    /// Unset means every request is rejected with 401.
    #[serde(default)]
    pub shared_secret: Option<SecretString>,
}

/// Precedent index client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PrecedentConfig {
    #[serde(default = "default_precedent_url")]
    pub api_url: String,

    /// Access credential. Unset puts the scoring endpoint into
    /// degraded mode (success:false / fallback:true responses).
    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Generative reasoning backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default = "default_reasoning_url")]
    pub api_url: String,

    /// Unset means the scoring engine always uses the deterministic
    /// strategy and the multi-agent endpoint fails.
    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Analysis pipeline knobs
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Staleness window for cached analyses, in hours
    #[serde(default = "default_staleness_hours")]
    pub staleness_hours: i64,

    /// Per-stage retry count for the agent orchestrator.
    /// 0 = fail fast, aborting the whole run on the first stage failure.
    #[serde(default)]
    pub stage_retries: usize,

    /// Maximum precedents persisted alongside an analysis
    #[serde(default = "default_max_persisted")]
    pub max_persisted_precedents: usize,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    256 * 1024
}
fn default_precedent_url() -> String {
    "https://api.canlii.org/v1".to_string()
}
fn default_reasoning_url() -> String {
    "https://ai.gateway.lovable.dev/v1".to_string()
}
fn default_model() -> String {
    "google/gemini-2.5-flash".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_results() -> usize {
    10
}
fn default_timeout_ms() -> u64 {
    30_000
}
fn default_retry_attempts() -> usize {
    2
}
fn default_retry_backoff_ms() -> u64 {
    200
}
fn default_staleness_hours() -> i64 {
    24
}
fn default_max_persisted() -> usize {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for PrecedentConfig {
    fn default() -> Self {
        Self {
            api_url: default_precedent_url(),
            api_key: None,
            max_results: default_max_results(),
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            api_url: default_reasoning_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_ms: default_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            staleness_hours: default_staleness_hours(),
            stage_retries: 0,
            max_persisted_precedents: default_max_persisted(),
        }
    }
}

impl Config {
    /// Load configuration from an optional `config/default.toml` plus
    /// `APP__`-prefixed environment overrides, e.g.
    /// `APP__PRECEDENT__API_KEY`, `APP__SERVER__PORT`.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl PrecedentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl ReasoningConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl AnalysisConfig {
    pub fn staleness_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.staleness_hours)
    }
}
