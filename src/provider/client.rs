//! HTTP implementation of [`MusicProvider`] for the Suno API

use super::wire::{self, GenerateBody};
use super::{ApiKey, MusicProvider};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::types::{ClipId, ClipStatus, Submission, SubmissionResult};
use async_trait::async_trait;
use url::Url;

const USER_AGENT: &str = concat!("sur-sangam/", env!("CARGO_PKG_VERSION"));

/// Suno API client
///
/// Stateless apart from the connection pool: every call builds its own
/// request and nothing learned from one response is reused by the next.
#[derive(Clone, Debug)]
pub struct SunoClient {
    http: reqwest::Client,
    base_url: Url,
    config: ProviderConfig,
}

impl SunoClient {
    /// Build a client for the configured provider
    ///
    /// # Errors
    ///
    /// * [`Error::Config`] - `base_url` is not a valid URL
    /// * [`Error::Network`] - the HTTP client could not be constructed
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("invalid base_url '{}': {}", config.base_url, e),
            key: Some("provider.base_url".to_string()),
        })?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Base URL plus path segments, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config {
                message: format!("base_url '{}' cannot carry a path", self.base_url),
                key: Some("provider.base_url".to_string()),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl MusicProvider for SunoClient {
    async fn submit(&self, key: &ApiKey, submission: &Submission) -> Result<SubmissionResult> {
        let url = self.endpoint(&["api", "v1", "generate"])?;
        let body = GenerateBody {
            prompt: &submission.prompt,
            custom_mode: self.config.custom_mode,
            instrumental: self.config.instrumental,
            model: &self.config.model,
            title: &submission.title,
            tags: &submission.style_tags,
            call_back_url: &self.config.callback_url,
        };

        tracing::debug!(url = %url, title = %submission.title, "submitting generation job");

        let response = self
            .http
            .post(url)
            .bearer_auth(key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let result = wire::parse_submission(status, &text)?;

        tracing::info!(
            clips = result.clip_ids.len(),
            "generation job accepted by provider"
        );
        Ok(result)
    }

    async fn fetch_status(&self, key: &ApiKey, clip_id: &ClipId) -> ClipStatus {
        let url = match self.endpoint(&["api", "v1", "feed", clip_id.as_str()]) {
            Ok(url) => url,
            Err(e) => {
                return ClipStatus::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let response = match self.http.get(url).bearer_auth(key.expose()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(clip_id = %clip_id, error = %e, "status request failed");
                return ClipStatus::Unavailable {
                    reason: format!("request failed: {}", e),
                };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(clip_id = %clip_id, error = %e, "status body unreadable");
                return ClipStatus::Unavailable {
                    reason: format!("unreadable body: {}", e),
                };
            }
        };

        let clip_status = wire::parse_status(clip_id, status, &body);
        if let ClipStatus::Unavailable { reason } = &clip_status {
            tracing::warn!(clip_id = %clip_id, reason = %reason, "status check unavailable");
        }
        clip_status
    }

    async fn download(&self, audio_url: &str) -> Result<Vec<u8>> {
        let download_failed = |reason: String| Error::DownloadFailed {
            url: audio_url.to_string(),
            reason,
        };

        let response = self
            .http
            .get(audio_url)
            .send()
            .await
            .map_err(|e| download_failed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_failed(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_failed(format!("body read failed: {}", e)))?;

        tracing::debug!(url = %audio_url, size_bytes = bytes.len(), "audio downloaded");
        Ok(bytes.to_vec())
    }
}
