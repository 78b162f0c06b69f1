//! Configuration types for sur-sangam

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Music provider connection settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API (default: "https://apibox.erweima.ai")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key (default: "SUNO_API_KEY")
    ///
    /// The variable is read on every composition, never cached.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Provider model version (default: "v3")
    #[serde(default = "default_model")]
    pub model: String,

    /// Callback URL sent with every job (default: "https://example.com/suno-webhook")
    ///
    /// The provider requires one even though results are collected by polling.
    #[serde(default = "default_callback_url")]
    pub callback_url: String,

    /// Submit lyrics in custom mode (default: true)
    #[serde(default = "default_true")]
    pub custom_mode: bool,

    /// Request an instrumental track (default: false)
    #[serde(default)]
    pub instrumental: bool,

    /// Timeout for each individual HTTP request (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_ms_serde")]
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            callback_url: default_callback_url(),
            custom_mode: true,
            instrumental: false,
            request_timeout: default_request_timeout(),
        }
    }
}

/// What to do when one of several clips reports a terminal error
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole session as soon as any clip reports an error
    AbortOnFirstError,
    /// Keep polling the remaining clips; fail only once every clip has errored
    #[default]
    WaitForAll,
}

/// How the status of the tracked clips is fetched within one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// One clip after another in declared order, stopping at the first terminal result
    #[default]
    Sequential,
    /// All clips at once; results are still resolved in declared order
    Concurrent,
}

/// Polling behavior of the job tracker
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay before each status check round (default: 5000 ms)
    #[serde(default = "default_poll_interval", with = "duration_ms_serde")]
    pub interval: Duration,

    /// Maximum number of polling rounds before timing out (default: 30)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Clip failure handling (default: wait for all clips)
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Status fetch strategy within a tick (default: sequential)
    #[serde(default)]
    pub fetch_mode: FetchMode,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_attempts: default_max_attempts(),
            failure_policy: FailurePolicy::default(),
            fetch_mode: FetchMode::default(),
        }
    }
}

impl PollingConfig {
    /// Upper bound on how long a session can poll (`interval × max_attempts`)
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Asset encoding settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetConfig {
    /// MIME type written into the data URI (default: "audio/mpeg")
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Description used when the provider supplies none
    #[serde(default = "default_fallback_description")]
    pub fallback_description: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            mime_type: default_mime_type(),
            fallback_description: default_fallback_description(),
        }
    }
}

/// Main configuration for [`Composer`](crate::Composer)
///
/// Every field has a documented default, so `Config::default()` talks to the
/// public provider endpoint and polls every 5 seconds for up to 30 rounds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider connection settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Polling behavior
    #[serde(default)]
    pub polling: PollingConfig,

    /// Asset encoding
    #[serde(default)]
    pub asset: AssetConfig,
}

impl Config {
    /// Check the configuration for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.polling.max_attempts == 0 {
            return Err(config_error(
                "max_attempts must be at least 1",
                "polling.max_attempts",
            ));
        }
        if self.polling.interval.is_zero() {
            return Err(config_error(
                "polling interval must be greater than zero",
                "polling.interval",
            ));
        }
        if self.provider.api_key_env.trim().is_empty() {
            return Err(config_error(
                "api_key_env must name an environment variable",
                "provider.api_key_env",
            ));
        }
        match url::Url::parse(&self.provider.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(config_error(
                    format!("unsupported base_url scheme '{}'", url.scheme()),
                    "provider.base_url",
                ));
            }
            Err(e) => {
                return Err(config_error(
                    format!("invalid base_url: {}", e),
                    "provider.base_url",
                ));
            }
        }
        if self.asset.mime_type.trim().is_empty() {
            return Err(config_error("mime_type must not be empty", "asset.mime_type"));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>, key: &str) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://apibox.erweima.ai".into()
}

fn default_api_key_env() -> String {
    "SUNO_API_KEY".into()
}

fn default_model() -> String {
    "v3".into()
}

fn default_callback_url() -> String {
    "https://example.com/suno-webhook".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(5000)
}

fn default_max_attempts() -> u32 {
    30
}

fn default_mime_type() -> String {
    "audio/mpeg".into()
}

fn default_fallback_description() -> String {
    "Music composed with the Suno API.".into()
}

// Duration serialization helper (integer milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
