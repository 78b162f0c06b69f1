//! Job tracking and polling
//!
//! A [`JobTracker`] drives one generation job from submission to a terminal
//! state:
//!
//! ```text
//! Submitted ──► Polling ──► Resolved
//!     │            ├──────► Errored
//!     │            ├──────► TimedOut
//!     │            └──────► Cancelled
//!     └──(no clips)──────► Errored
//! ```
//!
//! Every tick waits the configured interval, then checks the tracked clips in
//! declared order. The first clip found complete wins and polling stops at
//! once, even if siblings are still rendering. What an errored clip does to the
//! session depends on [`FailurePolicy`]. Ticks keep no memory of earlier
//! snapshots; only the attempt counter and the set of failed clips carry over.

use crate::config::{FailurePolicy, FetchMode, PollingConfig};
use crate::error::{Error, Result};
use crate::provider::{ApiKey, MusicProvider};
use crate::types::{ClipId, ClipStatus, CompositionId, Event, SubmissionResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle state of a polling session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Job accepted, polling not started
    Submitted,
    /// Waiting for a clip to finish
    Polling,
    /// A clip completed
    Resolved,
    /// A clip (or, under [`FailurePolicy::WaitForAll`], every clip) failed
    Errored,
    /// The attempt budget ran out
    TimedOut,
    /// The caller cancelled between ticks
    Cancelled,
}

/// The clip that won a session
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedClip {
    /// Winning clip
    pub clip_id: ClipId,
    /// Where its audio can be downloaded
    pub audio_url: String,
    /// Provider metadata attached to the clip, if any
    pub metadata: Option<serde_json::Value>,
    /// Polling attempts used
    pub attempts: u32,
}

/// Result of evaluating one tick
#[derive(Debug)]
enum TickOutcome {
    Resolved(ResolvedClip),
    Failed { clip_id: ClipId, detail: String },
    Continue,
}

/// State of one polling session
#[derive(Debug)]
pub struct PollSession {
    clip_ids: Vec<ClipId>,
    failed: Vec<(ClipId, String)>,
    attempts_made: u32,
    max_attempts: u32,
    interval: Duration,
    policy: FailurePolicy,
    state: SessionState,
}

impl PollSession {
    /// Start a session for the submitted clips
    ///
    /// Returns [`Error::NoClipsReturned`] for an empty submission.
    pub fn new(submission: SubmissionResult, config: &PollingConfig) -> Result<Self> {
        if submission.is_empty() {
            return Err(Error::NoClipsReturned);
        }
        Ok(Self {
            clip_ids: submission.clip_ids,
            failed: Vec::new(),
            attempts_made: 0,
            max_attempts: config.max_attempts,
            interval: config.interval,
            policy: config.failure_policy,
            state: SessionState::Submitted,
        })
    }

    /// Tracked clips in declared order
    pub fn clip_ids(&self) -> &[ClipId] {
        &self.clip_ids
    }

    /// Ticks run so far
    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the attempt budget is used up
    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }

    /// Clips that still need checking, in declared order
    fn active_clips(&self) -> Vec<ClipId> {
        self.clip_ids
            .iter()
            .filter(|id| !self.failed.iter().any(|(failed, _)| failed == *id))
            .cloned()
            .collect()
    }

    /// Begin a tick
    fn start_tick(&mut self) {
        self.attempts_made += 1;
        self.state = SessionState::Polling;
    }

    /// Feed one clip snapshot into the session
    ///
    /// Returns a terminal outcome if this snapshot ends the session.
    fn observe(&mut self, clip_id: &ClipId, status: ClipStatus) -> Option<TickOutcome> {
        match status {
            ClipStatus::Complete {
                audio_url,
                metadata,
            } => {
                self.state = SessionState::Resolved;
                Some(TickOutcome::Resolved(ResolvedClip {
                    clip_id: clip_id.clone(),
                    audio_url,
                    metadata,
                    attempts: self.attempts_made,
                }))
            }
            ClipStatus::Error { detail } => match self.policy {
                FailurePolicy::AbortOnFirstError => {
                    self.state = SessionState::Errored;
                    Some(TickOutcome::Failed {
                        clip_id: clip_id.clone(),
                        detail,
                    })
                }
                FailurePolicy::WaitForAll => {
                    self.failed.push((clip_id.clone(), detail));
                    None
                }
            },
            ClipStatus::Pending | ClipStatus::Unavailable { .. } => None,
        }
    }

    /// Close a tick in which nothing resolved
    fn finish_tick(&mut self) -> TickOutcome {
        if self.failed.len() == self.clip_ids.len()
            && let Some((clip_id, detail)) = self.failed.first()
        {
            self.state = SessionState::Errored;
            return TickOutcome::Failed {
                clip_id: clip_id.clone(),
                detail: detail.clone(),
            };
        }
        if self.is_exhausted() {
            self.state = SessionState::TimedOut;
        }
        TickOutcome::Continue
    }
}

/// Polls a submitted job until one of its clips completes
pub struct JobTracker {
    provider: Arc<dyn MusicProvider>,
    config: PollingConfig,
    event_tx: broadcast::Sender<Event>,
    composition_id: CompositionId,
}

impl JobTracker {
    /// Create a tracker for one composition
    pub fn new(
        provider: Arc<dyn MusicProvider>,
        config: PollingConfig,
        event_tx: broadcast::Sender<Event>,
        composition_id: CompositionId,
    ) -> Self {
        Self {
            provider,
            config,
            event_tx,
            composition_id,
        }
    }

    /// Poll until a clip completes, a clip fails, the budget runs out or `cancel` fires
    ///
    /// # Errors
    ///
    /// * [`Error::NoClipsReturned`] - the submission had nothing to track
    /// * [`Error::ClipFailed`] - a clip reported failure (see [`FailurePolicy`])
    /// * [`Error::TimedOut`] - `max_attempts` ticks without a completed clip
    /// * [`Error::Cancelled`] - `cancel` fired between ticks
    pub async fn run(
        &self,
        key: &ApiKey,
        submission: SubmissionResult,
        cancel: &CancellationToken,
    ) -> Result<ResolvedClip> {
        let mut session = PollSession::new(submission, &self.config)?;

        info!(
            composition_id = %self.composition_id,
            clips = session.clip_ids().len(),
            interval_ms = session.interval.as_millis() as u64,
            max_attempts = session.max_attempts,
            max_wait_ms = self.config.max_wait().as_millis() as u64,
            "polling for generated clips"
        );

        while !session.is_exhausted() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    session.state = SessionState::Cancelled;
                    info!(composition_id = %self.composition_id, attempts = session.attempts_made, "polling cancelled");
                    return Err(Error::Cancelled);
                }
                _ = tokio::time::sleep(session.interval) => {}
            }

            session.start_tick();
            self.emit(Event::PollTick {
                id: self.composition_id,
                attempt: session.attempts_made,
                max_attempts: session.max_attempts,
            });
            debug!(
                composition_id = %self.composition_id,
                attempt = session.attempts_made,
                "checking clip status"
            );

            match self.tick(key, &mut session).await {
                TickOutcome::Resolved(resolved) => {
                    info!(
                        composition_id = %self.composition_id,
                        clip_id = %resolved.clip_id,
                        attempts = resolved.attempts,
                        "clip completed"
                    );
                    self.emit(Event::Resolved {
                        id: self.composition_id,
                        clip_id: resolved.clip_id.clone(),
                        attempts: resolved.attempts,
                    });
                    return Ok(resolved);
                }
                TickOutcome::Failed { clip_id, detail } => {
                    warn!(
                        composition_id = %self.composition_id,
                        clip_id = %clip_id,
                        detail = %detail,
                        "generation failed"
                    );
                    return Err(Error::ClipFailed { clip_id, detail });
                }
                TickOutcome::Continue => {}
            }
        }

        warn!(
            composition_id = %self.composition_id,
            attempts = session.attempts_made,
            "polling budget exhausted"
        );
        Err(Error::TimedOut {
            attempts: session.attempts_made,
        })
    }

    /// Check every active clip once
    async fn tick(&self, key: &ApiKey, session: &mut PollSession) -> TickOutcome {
        let active = session.active_clips();

        match self.config.fetch_mode {
            FetchMode::Sequential => {
                for clip_id in &active {
                    let status = self.provider.fetch_status(key, clip_id).await;
                    if let Some(outcome) = self.observe(session, clip_id, status) {
                        return outcome;
                    }
                }
            }
            FetchMode::Concurrent => {
                let statuses = futures::future::join_all(
                    active
                        .iter()
                        .map(|clip_id| self.provider.fetch_status(key, clip_id)),
                )
                .await;
                for (clip_id, status) in active.iter().zip(statuses) {
                    if let Some(outcome) = self.observe(session, clip_id, status) {
                        return outcome;
                    }
                }
            }
        }

        session.finish_tick()
    }

    /// Record one snapshot, reporting transient and failed clips as events
    fn observe(
        &self,
        session: &mut PollSession,
        clip_id: &ClipId,
        status: ClipStatus,
    ) -> Option<TickOutcome> {
        match &status {
            ClipStatus::Unavailable { reason } => {
                debug!(clip_id = %clip_id, reason = %reason, "clip status unavailable this tick");
                self.emit(Event::ClipUnavailable {
                    id: self.composition_id,
                    clip_id: clip_id.clone(),
                    reason: reason.clone(),
                });
            }
            ClipStatus::Error { detail } => {
                self.emit(Event::ClipFailed {
                    id: self.composition_id,
                    clip_id: clip_id.clone(),
                    detail: detail.clone(),
                });
            }
            ClipStatus::Pending => {
                debug!(clip_id = %clip_id, "clip still pending");
            }
            ClipStatus::Complete { .. } => {}
        }
        session.observe(clip_id, status)
    }

    fn emit(&self, event: Event) {
        // no subscribers is fine
        self.event_tx.send(event).ok();
    }
}
