//! Scripted in-memory provider shared by unit tests

use crate::error::{Error, Result};
use crate::provider::{ApiKey, MusicProvider};
use crate::types::{ClipId, ClipStatus, Submission, SubmissionResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider whose answers are scripted per clip
///
/// Each clip has a queue of statuses; every status check pops the front.
/// The last status in a queue repeats forever. Every call is recorded so
/// tests can assert on call counts and order.
pub(crate) struct ScriptedProvider {
    submit_result: Mutex<Option<Result<SubmissionResult>>>,
    scripts: Mutex<HashMap<ClipId, VecDeque<ClipStatus>>>,
    audio: Mutex<Option<Result<Vec<u8>>>>,
    pub(crate) submit_calls: AtomicUsize,
    pub(crate) download_calls: AtomicUsize,
    status_calls: Mutex<Vec<ClipId>>,
    downloaded_urls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self {
            submit_result: Mutex::new(None),
            scripts: Mutex::new(HashMap::new()),
            audio: Mutex::new(None),
            submit_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            status_calls: Mutex::new(Vec::new()),
            downloaded_urls: Mutex::new(Vec::new()),
        }
    }

    /// Submission returns these clip ids
    pub(crate) fn with_clips(self, ids: &[&str]) -> Self {
        *self.submit_result.lock().unwrap() = Some(Ok(SubmissionResult {
            clip_ids: ids.iter().map(|id| ClipId::from(*id)).collect(),
        }));
        self
    }

    /// Submission fails with this error
    pub(crate) fn with_submit_error(self, error: Error) -> Self {
        *self.submit_result.lock().unwrap() = Some(Err(error));
        self
    }

    /// Status checks for `id` return these statuses in order, the last one repeating
    pub(crate) fn with_script(self, id: &str, statuses: Vec<ClipStatus>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(ClipId::from(id), statuses.into());
        self
    }

    /// Downloads return these bytes
    pub(crate) fn with_audio(self, bytes: &[u8]) -> Self {
        *self.audio.lock().unwrap() = Some(Ok(bytes.to_vec()));
        self
    }

    /// Downloads fail with this error
    pub(crate) fn with_download_error(self, error: Error) -> Self {
        *self.audio.lock().unwrap() = Some(Err(error));
        self
    }

    /// Clip ids in the order their status was checked
    pub(crate) fn status_calls(&self) -> Vec<ClipId> {
        self.status_calls.lock().unwrap().clone()
    }

    /// Number of status checks made for one clip
    pub(crate) fn status_calls_for(&self, id: &str) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == id)
            .count()
    }

    pub(crate) fn downloaded_urls(&self) -> Vec<String> {
        self.downloaded_urls.lock().unwrap().clone()
    }

    /// Total number of calls of any kind
    pub(crate) fn total_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
            + self.download_calls.load(Ordering::SeqCst)
            + self.status_calls.lock().unwrap().len()
    }
}

fn clone_result<T: Clone>(result: &Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value.clone()),
        Err(Error::ProviderRejected { code, message }) => Err(Error::ProviderRejected {
            code: *code,
            message: message.clone(),
        }),
        Err(Error::MalformedResponse(m)) => Err(Error::MalformedResponse(m.clone())),
        Err(Error::DownloadFailed { url, reason }) => Err(Error::DownloadFailed {
            url: url.clone(),
            reason: reason.clone(),
        }),
        Err(other) => Err(Error::MalformedResponse(other.to_string())),
    }
}

#[async_trait]
impl MusicProvider for ScriptedProvider {
    async fn submit(&self, _key: &ApiKey, _submission: &Submission) -> Result<SubmissionResult> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        match self.submit_result.lock().unwrap().as_ref() {
            Some(result) => clone_result(result),
            None => Ok(SubmissionResult::default()),
        }
    }

    async fn fetch_status(&self, _key: &ApiKey, clip_id: &ClipId) -> ClipStatus {
        self.status_calls.lock().unwrap().push(clip_id.clone());
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(clip_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(ClipStatus::Pending),
            Some(queue) => queue.front().cloned().unwrap_or(ClipStatus::Pending),
            None => ClipStatus::Pending,
        }
    }

    async fn download(&self, audio_url: &str) -> Result<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.downloaded_urls
            .lock()
            .unwrap()
            .push(audio_url.to_string());
        match self.audio.lock().unwrap().as_ref() {
            Some(result) => clone_result(result),
            None => Ok(Vec::new()),
        }
    }
}

/// A completed clip status
pub(crate) fn complete(audio_url: &str, metadata: Option<serde_json::Value>) -> ClipStatus {
    ClipStatus::Complete {
        audio_url: audio_url.to_string(),
        metadata,
    }
}

/// A failed clip status
pub(crate) fn failed(detail: &str) -> ClipStatus {
    ClipStatus::Error {
        detail: detail.to_string(),
    }
}

/// A transiently unavailable clip status
pub(crate) fn unavailable(reason: &str) -> ClipStatus {
    ClipStatus::Unavailable {
        reason: reason.to_string(),
    }
}

pub(crate) fn test_key() -> ApiKey {
    ApiKey::new("test-key", "TEST_KEY").unwrap()
}
