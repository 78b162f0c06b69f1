//! # sur-sangam
//!
//! Music composition core of a Hindi songwriting assistant.
//!
//! Given lyrics, style tags and a title, [`Composer`] submits a job to a
//! generative-music provider, polls the returned clips until one finishes and
//! hands back the audio as a self-contained `data:` URI.
//!
//! ## Design Philosophy
//!
//! - **All-or-nothing** - a composition returns a finished asset or a classified error
//! - **Configurable** - polling interval, attempt budget and clip failure policy are settings
//! - **Provider-agnostic core** - the polling state machine only sees the [`MusicProvider`] trait
//! - **Event-driven** - progress is published on a broadcast channel, nothing to poll
//!
//! ## Quick Start
//!
//! ```no_run
//! use sur_sangam::{Composer, Config, GenerationRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // SUNO_API_KEY must be set in the environment
//!     let composer = Composer::new(Config::default())?;
//!
//!     let mut events = composer.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let request = GenerationRequest::new(
//!         "Verse 1\nTu jab aayi\n(Soft Piano)\nDil mera gaaye",
//!         "Bollywood, pop, male singer",
//!         "Tu Jab Aayi",
//!     );
//!
//!     match composer.compose(&request).await {
//!         Ok(asset) => println!("{} ({} chars)", asset.description, asset.data_uri.len()),
//!         Err(e) => eprintln!("{}", e.user_message()),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Composition orchestration
pub mod composer;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Asset download and data URI encoding
pub mod materializer;
/// Music provider abstraction and HTTP client
pub mod provider;
/// Lyric sanitizing
pub mod sanitizer;
/// Song records for the persistence layer
pub mod song;
/// Job tracking and polling
pub mod tracker;
/// Core types and events
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use composer::Composer;
pub use config::{AssetConfig, Config, FailurePolicy, FetchMode, PollingConfig, ProviderConfig};
pub use error::{Error, ErrorCategory, Result};
pub use provider::{ApiKey, MusicProvider, SunoClient};
pub use song::{Song, SongId};
pub use tracker::{JobTracker, PollSession, ResolvedClip, SessionState};
pub use types::{
    ClipId, ClipStatus, ComposedAsset, CompositionId, Event, GenerationRequest, Submission,
    SubmissionResult,
};
