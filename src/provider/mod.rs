//! Music provider abstraction
//!
//! The [`MusicProvider`] trait is the only way the tracker, materializer and
//! composer talk to the outside world. [`SunoClient`] implements it over HTTP;
//! tests plug in scripted implementations.

mod client;
pub(crate) mod wire;

pub use client::SunoClient;

use crate::error::{Error, Result};
use crate::types::{ClipId, ClipStatus, Submission, SubmissionResult};
use async_trait::async_trait;

/// Provider API key, resolved from the environment at call time
///
/// The key is never printed: `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values
    pub fn new(key: impl Into<String>, variable: &str) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::MissingCredential {
                variable: variable.to_string(),
            });
        }
        Ok(Self(key.trim().to_string()))
    }

    /// Read the key from the named environment variable
    ///
    /// An unset, non-unicode or blank variable is [`Error::MissingCredential`].
    pub fn from_env(variable: &str) -> Result<Self> {
        match std::env::var(variable) {
            Ok(value) => Self::new(value, variable),
            Err(_) => Err(Error::MissingCredential {
                variable: variable.to_string(),
            }),
        }
    }

    /// The raw key, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Operations the composition workflow needs from a music-generation service
///
/// Implementations hold no per-job state: every call stands alone. `submit`
/// creates a new job each time and must only be called once per composition.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Create a generation job and return the clip ids to track
    ///
    /// # Errors
    ///
    /// * [`Error::ProviderRejected`] - the response envelope carried a non-success code
    /// * [`Error::MalformedResponse`] - a success envelope had no usable clip id
    async fn submit(&self, key: &ApiKey, submission: &Submission) -> Result<SubmissionResult>;

    /// Check one clip once
    ///
    /// Never fails: a failed check is reported as [`ClipStatus::Unavailable`]
    /// and the caller retries on its next tick.
    async fn fetch_status(&self, key: &ApiKey, clip_id: &ClipId) -> ClipStatus;

    /// Download finished audio
    ///
    /// # Errors
    ///
    /// * [`Error::DownloadFailed`] - non-2xx response or transport failure
    async fn download(&self, audio_url: &str) -> Result<Vec<u8>>;
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_missing_credential() {
        for value in ["", "   ", "\n"] {
            match ApiKey::new(value, "SUNO_API_KEY") {
                Err(Error::MissingCredential { variable }) => {
                    assert_eq!(variable, "SUNO_API_KEY")
                }
                other => panic!("expected MissingCredential, got {:?}", other),
            }
        }
    }

    #[test]
    fn key_is_trimmed() {
        let key = ApiKey::new("  abc123 \n", "K").unwrap();
        assert_eq!(key.expose(), "abc123");
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = ApiKey::new("super-secret", "K").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn unset_variable_is_missing_credential() {
        let result = ApiKey::from_env("SUR_SANGAM_TEST_SURELY_UNSET_VARIABLE");
        assert!(matches!(result, Err(Error::MissingCredential { .. })));
    }
}
