//! Song records handed to the persistence layer
//!
//! The composer only returns a [`ComposedAsset`]. Whoever stores the result
//! wraps it into a [`Song`] together with the prompt, lyrics and style that
//! produced it. Field names serialize in camelCase to match the stored format.

use crate::types::{ComposedAsset, GenerationRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stored song
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub Uuid);

impl SongId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SongId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finished song as kept in the user's library
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Song id
    pub id: SongId,
    /// Song title
    pub title: String,
    /// The idea the user started from
    pub prompt: String,
    /// Lyrics as shown to the user (before sanitizing)
    pub lyrics: String,
    /// Style tags the music was composed in
    pub style: String,
    /// Composed audio as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_data_uri: Option<String>,
    /// Description of the music
    pub music_description: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Song {
    /// Combine a request, the prompt it came from and its composed asset
    pub fn from_composition(
        request: &GenerationRequest,
        prompt: impl Into<String>,
        asset: ComposedAsset,
    ) -> Self {
        Self {
            id: SongId::new(),
            title: request.title.clone(),
            prompt: prompt.into(),
            lyrics: request.lyrics.clone(),
            style: request.style_tags.clone(),
            music_data_uri: Some(asset.data_uri),
            music_description: asset.description,
            created_at: Utc::now(),
        }
    }
}
