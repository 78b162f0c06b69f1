//! Asset materialization
//!
//! Turns the winning clip into a [`ComposedAsset`]: the audio is downloaded,
//! base64-encoded into a `data:` URI and paired with a description.

use crate::config::AssetConfig;
use crate::error::Result;
use crate::provider::MusicProvider;
use crate::types::ComposedAsset;
use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;
use std::sync::Arc;

/// Metadata keys that may carry a description of the music, in priority order
const DESCRIPTION_KEYS: [&str; 2] = ["prompt", "description"];

/// A composed asset together with the size of the audio it encodes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Materialized {
    /// The portable asset handed back to the caller
    pub asset: ComposedAsset,
    /// Size of the downloaded audio in bytes
    pub size_bytes: u64,
}

/// Downloads finished audio and encodes it as a portable data URI
pub struct AssetMaterializer {
    provider: Arc<dyn MusicProvider>,
    config: AssetConfig,
}

impl AssetMaterializer {
    /// Create a materializer
    pub fn new(provider: Arc<dyn MusicProvider>, config: AssetConfig) -> Self {
        Self { provider, config }
    }

    /// Download `audio_url` and build the asset
    ///
    /// The audio content is not inspected. The description comes from
    /// `metadata` when it has one, else `fallback_description`.
    ///
    /// # Errors
    ///
    /// * [`Error::DownloadFailed`](crate::Error::DownloadFailed) - propagated from the provider
    pub async fn materialize(
        &self,
        audio_url: &str,
        fallback_description: &str,
        metadata: Option<&Value>,
    ) -> Result<Materialized> {
        let bytes = self.provider.download(audio_url).await?;

        tracing::debug!(
            url = %audio_url,
            size_bytes = bytes.len(),
            mime_type = %self.config.mime_type,
            "encoding audio as data URI"
        );

        Ok(Materialized {
            asset: ComposedAsset {
                data_uri: encode_data_uri(&self.config.mime_type, &bytes),
                description: describe(metadata, fallback_description),
            },
            size_bytes: bytes.len() as u64,
        })
    }
}

/// `data:<mime>;base64,<payload>`
///
/// # Examples
///
/// ```
/// use sur_sangam::materializer::encode_data_uri;
///
/// assert_eq!(encode_data_uri("audio/mpeg", b"ID3"), "data:audio/mpeg;base64,SUQz");
/// ```
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Description from provider metadata, falling back when absent or blank
pub fn describe(metadata: Option<&Value>, fallback: &str) -> String {
    metadata
        .and_then(|m| {
            DESCRIPTION_KEYS
                .iter()
                .find_map(|key| m.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|d| !d.is_empty())
        })
        .unwrap_or(fallback)
        .to_string()
}
