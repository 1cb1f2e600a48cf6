//! Contact form submission.
//!
//! Validated submissions are handed to a [`ContactSender`] while a
//! [`SubmissionPipeline`] tracks the banner state shown next to the form:
//!
//! ```text
//! idle ──submit──▶ submitting ──ok──▶ success ──reset_after──▶ idle
//!                             └─err─▶ error   ──reset_after──▶ idle
//! ```
//!
//! ## Single flight
//!
//! Only one submission should be outstanding. The pipeline does not queue or
//! reject overlapping calls; the form disables its button while
//! [`SubmissionPipeline::can_submit`] is false. An overlapping call is logged
//! and its late result does not overwrite the newer attempt's state.
//!
//! ## Reset timer
//!
//! Both `success` and `error` fall back to `idle` after `reset_after`
//! (5 seconds by default). Each submit bumps a generation counter; a timer
//! only resets the state if no newer submit started in the meantime.
//!
//! ## Failures
//!
//! A failed send is never retried and never returned as `Err`: it becomes the
//! `error` state and a [`SubmitOutcome::Failed`]. Retrying means the visitor
//! presses "send" again.

use crate::contact::{ContactSubmission, ContactValidator, FieldErrors, RawFormInput, submission_key};
use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// How long `success`/`error` stay visible before returning to `idle`.
pub const DEFAULT_RESET_AFTER: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Banner state of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Success => "success",
            SubmissionState::Error => "error",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one submit, for the caller to show or log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered,
    Failed { reason: String },
}

impl SubmitOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SubmitOutcome::Delivered)
    }
}

/// Delivers a validated submission somewhere (email API, ticketing, outbox).
#[async_trait]
pub trait ContactSender: Send + Sync {
    async fn send(&self, submission: &ContactSubmission) -> Result<(), SubmissionError>;
}

/// Drives submissions through a sender and tracks [`SubmissionState`].
pub struct SubmissionPipeline<S> {
    sender: S,
    reset_after: Duration,
    state: Arc<watch::Sender<SubmissionState>>,
    generation: Arc<AtomicU64>,
}

impl<S: ContactSender> SubmissionPipeline<S> {
    pub fn new(sender: S) -> Self {
        Self::with_reset_after(sender, DEFAULT_RESET_AFTER)
    }

    pub fn with_reset_after(sender: S, reset_after: Duration) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            sender,
            reset_after,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    /// Whether the send button should be enabled.
    pub fn can_submit(&self) -> bool {
        self.state() != SubmissionState::Submitting
    }

    /// Watch state changes (e.g. to redraw the banner).
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn reset_after(&self) -> Duration {
        self.reset_after
    }

    /// Validate, then submit. Invalid forms never reach the sender.
    pub async fn submit_form(
        &self,
        validator: &ContactValidator,
        input: &RawFormInput,
    ) -> Result<SubmitOutcome, FieldErrors> {
        let submission = validator.validate(input)?;
        Ok(self.submit(&submission).await)
    }

    /// Send a validated submission and move through the state machine.
    ///
    /// Must not be called while [`can_submit`](Self::can_submit) is false.
    pub async fn submit(&self, submission: &ContactSubmission) -> SubmitOutcome {
        if !self.can_submit() {
            tracing::warn!("submit called while another submission is in flight");
        }

        let generation = self.begin();
        tracing::info!(generation, "sending contact form");

        let (state, outcome) = match self.sender.send(submission).await {
            Ok(()) => {
                tracing::info!(generation, "contact form delivered");
                (SubmissionState::Success, SubmitOutcome::Delivered)
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "contact form delivery failed");
                (
                    SubmissionState::Error,
                    SubmitOutcome::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        };

        self.finish(generation, state);
        self.schedule_reset(generation);
        outcome
    }

    /// Enter `submitting` and return this attempt's generation.
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *s = SubmissionState::Submitting;
        });
        generation
    }

    fn finish(&self, generation: u64, next: SubmissionState) {
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *s = next;
            true
        });
    }

    fn schedule_reset(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let delay = self.reset_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|s| {
                let settled = matches!(*s, SubmissionState::Success | SubmissionState::Error);
                if current.load(Ordering::SeqCst) != generation || !settled {
                    return false;
                }
                *s = SubmissionState::Idle;
                true
            });
        });
    }
}

/// Demo sender: waits, then fails at random.
///
/// Placeholder for a real delivery integration; the delay and failure rate
/// say nothing about how real delivery behaves.
#[derive(Debug, Clone)]
pub struct SimulatedSender {
    pub delay: Duration,
    /// Probability in `0.0..=1.0` that a send fails. Values outside the
    /// range are clamped and NaN counts as `0.0`.
    pub failure_rate: f64,
}

impl SimulatedSender {
    fn failure_probability(&self) -> f64 {
        if self.failure_rate.is_nan() {
            0.0
        } else {
            self.failure_rate.clamp(0.0, 1.0)
        }
    }
}

impl Default for SimulatedSender {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            failure_rate: 0.1,
        }
    }
}

#[async_trait]
impl ContactSender for SimulatedSender {
    async fn send(&self, submission: &ContactSubmission) -> Result<(), SubmissionError> {
        tokio::time::sleep(self.delay).await;
        let failed = rand::rng().random_bool(self.failure_probability());
        if failed {
            return Err(SubmissionError::Delivery(
                "simulated email send failure".to_string(),
            ));
        }
        tracing::debug!(subject = submission.subject(), "simulated send succeeded");
        Ok(())
    }
}

/// Writes each submission as `<dir>/<submission key>.json`.
///
/// The file name is the submission's content hash, so sending the same
/// message twice leaves one file.
#[derive(Debug, Clone)]
pub struct OutboxSender {
    dir: PathBuf,
}

impl OutboxSender {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path_for(&self, submission: &ContactSubmission) -> PathBuf {
        self.dir.join(format!("{}.json", submission_key(submission)))
    }
}

#[async_trait]
impl ContactSender for OutboxSender {
    async fn send(&self, submission: &ContactSubmission) -> Result<(), SubmissionError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(submission);
        let json = serde_json::to_string_pretty(submission)?;
        tokio::fs::write(&path, json).await?;
        tracing::info!(path = %path.display(), "submission written to outbox");
        Ok(())
    }
}
