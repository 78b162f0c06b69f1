//! Composition orchestration
//!
//! [`Composer`] is the public entry point. One call to [`Composer::compose`]
//! checks preconditions, submits the job exactly once, polls it to a terminal
//! state and materializes the winning clip. The call is all-or-nothing: the
//! caller gets a [`ComposedAsset`] or an [`Error`], never a partial result.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::materializer::{AssetMaterializer, Materialized};
use crate::provider::{ApiKey, MusicProvider, SunoClient};
use crate::sanitizer::sanitize;
use crate::tracker::JobTracker;
use crate::types::{ComposedAsset, CompositionId, Event, GenerationRequest, Submission};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Capacity of the progress event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Composes music from lyrics (cloneable - all fields are Arc-wrapped)
///
/// Concurrent compositions through one `Composer` share nothing but the event
/// channel; each call owns its own polling session.
#[derive(Clone)]
pub struct Composer {
    config: Arc<Config>,
    provider: Arc<dyn MusicProvider>,
    event_tx: broadcast::Sender<Event>,
}

impl Composer {
    /// Create a composer talking to the configured Suno endpoint
    ///
    /// # Errors
    ///
    /// * [`Error::Config`] - the configuration failed validation
    /// * [`Error::Network`] - the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let provider = SunoClient::new(config.provider.clone())?;
        Self::with_provider(config, Arc::new(provider))
    }

    /// Create a composer over any [`MusicProvider`]
    pub fn with_provider(config: Config, provider: Arc<dyn MusicProvider>) -> Result<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config: Arc::new(config),
            provider,
            event_tx,
        })
    }

    /// Subscribe to progress events of every composition run by this composer
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compose music for `request`
    ///
    /// # Errors
    ///
    /// * [`Error::MissingCredential`] - checked before any network call
    /// * [`Error::EmptyLyrics`] - checked before any network call
    /// * [`Error::ProviderRejected`], [`Error::MalformedResponse`],
    ///   [`Error::NoClipsReturned`] - submission failed, never retried
    /// * [`Error::ClipFailed`], [`Error::TimedOut`] - polling failed
    /// * [`Error::DownloadFailed`] - the finished audio could not be fetched
    pub async fn compose(&self, request: &GenerationRequest) -> Result<ComposedAsset> {
        self.compose_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like [`compose`](Self::compose), stopping with [`Error::Cancelled`]
    /// when `cancel` fires between polling ticks
    pub async fn compose_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<ComposedAsset> {
        let id = CompositionId::new();

        match self.run(id, request, &cancel).await {
            Ok(asset) => Ok(asset),
            Err(e) => {
                error!(composition_id = %id, code = e.error_code(), error = %e, "composition failed");
                self.event_tx
                    .send(Event::Failed {
                        id,
                        code: e.error_code().to_string(),
                        error: e.to_string(),
                    })
                    .ok();
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        id: CompositionId,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ComposedAsset> {
        // preconditions: no network traffic before both pass
        let key = ApiKey::from_env(&self.config.provider.api_key_env)?;
        let prompt = sanitize(&request.lyrics)?;

        info!(composition_id = %id, title = %request.title, "starting composition");

        let submission = Submission {
            prompt,
            style_tags: request.style_tags.clone(),
            title: request.title.clone(),
        };
        let submitted = self.provider.submit(&key, &submission).await?;
        if submitted.is_empty() {
            return Err(Error::NoClipsReturned);
        }
        self.event_tx
            .send(Event::Submitted {
                id,
                clip_ids: submitted.clip_ids.clone(),
            })
            .ok();

        let tracker = JobTracker::new(
            self.provider.clone(),
            self.config.polling.clone(),
            self.event_tx.clone(),
            id,
        );
        let resolved = tracker.run(&key, submitted, cancel).await?;

        let materializer = AssetMaterializer::new(self.provider.clone(), self.config.asset.clone());
        let materialized = materializer
            .materialize(
                &resolved.audio_url,
                &self.config.asset.fallback_description,
                resolved.metadata.as_ref(),
            )
            .await?;

        let Materialized { asset, size_bytes } = materialized;
        info!(composition_id = %id, clip_id = %resolved.clip_id, size_bytes, "composition finished");
        self.event_tx
            .send(Event::Composed { id, size_bytes })
            .ok();

        Ok(asset)
    }
}
