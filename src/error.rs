//! Error types for sur-sangam
//!
//! This module provides the error taxonomy of the composition workflow:
//! - Precondition failures (missing credential, empty lyrics)
//! - Submission failures (provider rejection, malformed or empty responses)
//! - Polling outcomes (clip failure, attempt budget exhausted, cancellation)
//! - Asset download failures
//!
//! Every error maps to a short user-facing [`ErrorCategory`] so callers never
//! need to show raw provider text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ClipId;

/// Result type alias for sur-sangam operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sur-sangam
#[derive(Debug, Error)]
pub enum Error {
    /// The provider credential is not configured
    #[error("missing credential: environment variable {variable} is not set")]
    MissingCredential {
        /// Name of the environment variable that was consulted
        variable: String,
    },

    /// Lyrics were empty after removing structural markers
    #[error("lyrics are empty after removing structural markers")]
    EmptyLyrics,

    /// The provider envelope reported a non-success code
    #[error("provider rejected the request (code {code}): {message}")]
    ProviderRejected {
        /// Status code embedded in the response body (or transport status when the body was unreadable)
        code: i64,
        /// Message reported by the provider
        message: String,
    },

    /// A success envelope carried no usable clip identifier
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The provider accepted the job but returned no clips to track
    #[error("provider returned no clips; the service might be busy")]
    NoClipsReturned,

    /// A tracked clip reported a terminal failure
    #[error("generation failed for clip {clip_id}: {detail}")]
    ClipFailed {
        /// Clip that reported the failure
        clip_id: ClipId,
        /// Provider-supplied failure detail
        detail: String,
    },

    /// Polling exhausted its attempt budget without a completed clip
    #[error("generation timed out after {attempts} polling attempts")]
    TimedOut {
        /// Number of polling attempts made
        attempts: u32,
    },

    /// The finished audio could not be fetched
    #[error("failed to download audio from {url}: {reason}")]
    DownloadFailed {
        /// Audio URL that was requested
        url: String,
        /// Why the download failed
        reason: String,
    },

    /// The caller cancelled the composition between polling ticks
    #[error("composition cancelled")]
    Cancelled,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "polling.max_attempts")
        key: Option<String>,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Short, user-facing classification of a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The provider refused the job because a usage limit was reached
    QuotaExceeded,
    /// The deployment is missing required configuration (credential, settings)
    MissingConfiguration,
    /// Anything else
    Generic,
}

impl ErrorCategory {
    /// Message suitable for display to end users
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::QuotaExceeded => {
                "You have exceeded the daily free API limit. Please try again tomorrow."
            }
            ErrorCategory::MissingConfiguration => {
                "The music service is not configured. Please ask the developer to configure it."
            }
            ErrorCategory::Generic => "An unexpected error occurred. Please try again later.",
        }
    }
}

impl Error {
    /// Classify this error for display to end users
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingCredential { .. } | Error::Config { .. } => {
                ErrorCategory::MissingConfiguration
            }
            Error::ProviderRejected { code, message } => {
                let message = message.to_ascii_lowercase();
                if *code == 429 || message.contains("quota") || message.contains("credits") {
                    ErrorCategory::QuotaExceeded
                } else {
                    ErrorCategory::Generic
                }
            }
            _ => ErrorCategory::Generic,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingCredential { .. } => "missing_credential",
            Error::EmptyLyrics => "empty_lyrics",
            Error::ProviderRejected { .. } => "provider_rejected",
            Error::MalformedResponse(_) => "malformed_response",
            Error::NoClipsReturned => "no_clips_returned",
            Error::ClipFailed { .. } => "clip_failed",
            Error::TimedOut { .. } => "timed_out",
            Error::DownloadFailed { .. } => "download_failed",
            Error::Cancelled => "cancelled",
            Error::Config { .. } => "config_error",
            Error::Network(_) => "network_error",
        }
    }

    /// Message suitable for display to end users
    pub fn user_message(&self) -> &'static str {
        self.category().user_message()
    }
}
