//! Core types for sur-sangam

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of one candidate clip (or task) at the music provider
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Create a new ClipId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the inner identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ClipId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ClipId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ClipId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned to one `compose` invocation, carried by every progress event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositionId(pub Uuid);

impl CompositionId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CompositionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CompositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lyrics, style and title handed over by the lyric/style collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Raw lyrics, possibly still carrying section headers and production notes
    pub lyrics: String,
    /// Comma-separated style tags, e.g. "Bollywood, pop, male singer"
    pub style_tags: String,
    /// Song title
    pub title: String,
}

impl GenerationRequest {
    /// Create a new request
    pub fn new(
        lyrics: impl Into<String>,
        style_tags: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            lyrics: lyrics.into(),
            style_tags: style_tags.into(),
            title: title.into(),
        }
    }
}

/// Job parameters sent to the provider, built from a request after sanitizing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// Sanitized lyrics
    pub prompt: String,
    /// Style tags
    pub style_tags: String,
    /// Song title
    pub title: String,
}

/// Clip identifiers returned by a job submission
///
/// May be empty; the tracker never treats an empty result as success.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionResult {
    /// Clip ids in the order the provider declared them
    pub clip_ids: Vec<ClipId>,
}

impl SubmissionResult {
    /// Whether the provider returned anything to track
    pub fn is_empty(&self) -> bool {
        self.clip_ids.is_empty()
    }
}

/// Snapshot of one clip at the time of a status check
#[derive(Clone, Debug, PartialEq)]
pub enum ClipStatus {
    /// Still rendering
    Pending,
    /// Finished, audio available
    Complete {
        /// Where the finished audio can be downloaded
        audio_url: String,
        /// Provider metadata attached to the clip, if any
        metadata: Option<serde_json::Value>,
    },
    /// The provider reports a terminal failure for this clip
    Error {
        /// Provider-supplied failure detail
        detail: String,
    },
    /// The status check itself failed; retry on the next tick
    Unavailable {
        /// Why the status could not be determined
        reason: String,
    },
}

/// The finished composition in its portable form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedAsset {
    /// `data:<mime>;base64,<payload>`
    pub data_uri: String,
    /// Description of the music, from provider metadata or the configured fallback
    pub description: String,
}

/// Progress events emitted while a composition runs
///
/// Subscribe with [`Composer::subscribe`](crate::Composer::subscribe).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The provider accepted the job
    Submitted {
        /// Composition id
        id: CompositionId,
        /// Clips being tracked
        clip_ids: Vec<ClipId>,
    },

    /// A polling tick started
    PollTick {
        /// Composition id
        id: CompositionId,
        /// Attempt number, starting at 1
        attempt: u32,
        /// Attempt budget
        max_attempts: u32,
    },

    /// A status check failed transiently and consumed the attempt
    ClipUnavailable {
        /// Composition id
        id: CompositionId,
        /// Clip that could not be checked
        clip_id: ClipId,
        /// Failure reason
        reason: String,
    },

    /// A clip reported a terminal failure
    ClipFailed {
        /// Composition id
        id: CompositionId,
        /// Failed clip
        clip_id: ClipId,
        /// Provider-supplied failure detail
        detail: String,
    },

    /// A clip finished rendering and won the session
    Resolved {
        /// Composition id
        id: CompositionId,
        /// Winning clip
        clip_id: ClipId,
        /// Attempts used
        attempts: u32,
    },

    /// The asset was downloaded and encoded
    Composed {
        /// Composition id
        id: CompositionId,
        /// Size of the downloaded audio in bytes
        size_bytes: u64,
    },

    /// The composition failed
    Failed {
        /// Composition id
        id: CompositionId,
        /// Machine-readable error code
        code: String,
        /// Error message
        error: String,
    },
}
