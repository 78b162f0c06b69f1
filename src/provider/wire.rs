//! Provider wire format normalization
//!
//! The provider wraps every answer in `{code, msg, data}`. `code` is the
//! real outcome and can disagree with the HTTP status. `data` comes in
//! several shapes: a single clip object, an array of clips, or a
//! `{taskId}` object. Everything here maps those shapes onto
//! [`SubmissionResult`] and [`ClipStatus`] so the tracker never sees raw JSON.

use crate::error::{Error, Result};
use crate::types::{ClipId, ClipStatus, SubmissionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope code that means success
pub(crate) const SUCCESS_CODE: i64 = 200;

/// Response envelope shared by all provider endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    msg: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
}

/// What the envelope says about its own outcome
#[derive(Debug, PartialEq)]
enum EnvelopeCode {
    /// No `code` field, or `null`
    Absent,
    /// A number or a numeric string
    Code(i64),
    /// Present but not a number, such as `"error"`
    Unreadable(String),
}

impl Envelope {
    /// Embedded status code, accepting numbers or numeric strings
    fn code(&self) -> EnvelopeCode {
        let Some(raw) = self.code.as_ref().filter(|c| !c.is_null()) else {
            return EnvelopeCode::Absent;
        };
        let parsed = match raw {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        match parsed {
            Some(code) => EnvelopeCode::Code(code),
            None => EnvelopeCode::Unreadable(raw.to_string()),
        }
    }

    /// Provider message; non-string messages are rendered as JSON
    fn message(&self) -> Option<String> {
        match self.msg.as_ref()? {
            Value::Null => None,
            Value::String(m) => Some(m.trim().to_string()).filter(|m| !m.is_empty()),
            other => Some(other.to_string()),
        }
    }

    fn data(&self) -> Option<&Value> {
        self.data.as_ref().filter(|d| !d.is_null())
    }
}

/// JSON body of the job creation request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateBody<'a> {
    pub(crate) prompt: &'a str,
    pub(crate) custom_mode: bool,
    pub(crate) instrumental: bool,
    pub(crate) model: &'a str,
    pub(crate) title: &'a str,
    pub(crate) tags: &'a str,
    pub(crate) call_back_url: &'a str,
}

/// Normalize a job creation response
///
/// `http_status` is only used when the body carries no code of its own.
pub(crate) fn parse_submission(http_status: u16, body: &str) -> Result<SubmissionResult> {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if is_success(http_status) => {
            return Err(Error::MalformedResponse(format!(
                "unparseable submission response: {}",
                e
            )));
        }
        Err(_) => {
            return Err(Error::ProviderRejected {
                code: i64::from(http_status),
                message: snippet(body),
            });
        }
    };

    let code = match envelope.code() {
        EnvelopeCode::Absent => i64::from(http_status),
        EnvelopeCode::Code(code) => code,
        EnvelopeCode::Unreadable(raw) => {
            return Err(Error::ProviderRejected {
                code: i64::from(http_status),
                message: envelope
                    .message()
                    .unwrap_or_else(|| format!("unrecognized provider code {}", raw)),
            });
        }
    };
    if code != SUCCESS_CODE {
        return Err(Error::ProviderRejected {
            code,
            message: envelope
                .message()
                .unwrap_or_else(|| format!("HTTP {}", http_status)),
        });
    }

    let Some(data) = envelope.data() else {
        return Ok(SubmissionResult::default());
    };

    let clip_ids: Vec<ClipId> = match data {
        Value::Array(items) => items.iter().filter_map(job_id).collect(),
        Value::Object(_) => job_id(data).into_iter().collect(),
        _ => Vec::new(),
    };

    if clip_ids.is_empty() {
        return Err(Error::MalformedResponse(format!(
            "success response carried no clip id: {}",
            snippet(&data.to_string())
        )));
    }

    Ok(SubmissionResult { clip_ids })
}

/// Normalize a clip status response
///
/// Anything that prevents reading a clip state (transport status, broken
/// body, failure envelope, missing data) is [`ClipStatus::Unavailable`].
pub(crate) fn parse_status(clip_id: &ClipId, http_status: u16, body: &str) -> ClipStatus {
    if !is_success(http_status) {
        return ClipStatus::Unavailable {
            reason: format!("HTTP {}", http_status),
        };
    }

    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return ClipStatus::Unavailable {
                reason: format!("unparseable status response: {}", e),
            };
        }
    };

    let failure_code = match envelope.code() {
        EnvelopeCode::Absent => None,
        EnvelopeCode::Code(code) if code == SUCCESS_CODE => None,
        EnvelopeCode::Code(code) => Some(code.to_string()),
        EnvelopeCode::Unreadable(raw) => Some(raw),
    };
    if let Some(code) = failure_code {
        return ClipStatus::Unavailable {
            reason: format!(
                "provider code {}: {}",
                code,
                envelope.message().as_deref().unwrap_or("no message")
            ),
        };
    }

    match envelope.data() {
        Some(Value::Array(clips)) => select_clip(clip_id, clips),
        Some(clip @ Value::Object(_)) => clip_status(clip),
        _ => ClipStatus::Unavailable {
            reason: "status response carried no clip data".to_string(),
        },
    }
}

/// Pick the status for `clip_id` out of a multi-clip response
///
/// The clip with a matching id wins. Without one, the clips are reduced
/// with the tracker's own precedence: first complete, else first error,
/// else pending.
fn select_clip(clip_id: &ClipId, clips: &[Value]) -> ClipStatus {
    if let Some(clip) = clips
        .iter()
        .find(|clip| job_id(clip).as_ref() == Some(clip_id))
    {
        return clip_status(clip);
    }

    if clips.is_empty() {
        return ClipStatus::Unavailable {
            reason: "status response carried an empty clip list".to_string(),
        };
    }

    let statuses: Vec<ClipStatus> = clips.iter().map(clip_status).collect();
    if let Some(complete) = statuses
        .iter()
        .find(|s| matches!(s, ClipStatus::Complete { .. }))
    {
        return complete.clone();
    }
    if let Some(error) = statuses
        .iter()
        .find(|s| matches!(s, ClipStatus::Error { .. }))
    {
        return error.clone();
    }
    ClipStatus::Pending
}

/// Map one clip object onto a status
fn clip_status(clip: &Value) -> ClipStatus {
    let state = clip
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();

    match state.as_str() {
        "complete" | "completed" => match non_empty_str(clip, "audio_url") {
            Some(audio_url) => ClipStatus::Complete {
                audio_url: audio_url.to_string(),
                metadata: clip.get("metadata").filter(|m| !m.is_null()).cloned(),
            },
            // finished but no playable url yet
            None => ClipStatus::Pending,
        },
        "error" | "failed" => ClipStatus::Error {
            detail: non_empty_str(clip, "error_message")
                .unwrap_or("Unknown error")
                .to_string(),
        },
        _ => ClipStatus::Pending,
    }
}

/// Clip id of a job object: `id`, falling back to `taskId`
fn job_id(job: &Value) -> Option<ClipId> {
    ["id", "taskId"].iter().find_map(|key| match job.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(ClipId::from(s.trim())),
        Value::Number(n) => Some(ClipId::from(n.to_string())),
        _ => None,
    })
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn is_success(http_status: u16) -> bool {
    (200..300).contains(&http_status)
}

/// First 200 characters of a body, for error messages
fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_CHARS).collect();
    format!("{}...", cut)
}
