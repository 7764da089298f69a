// Single in-flight submission tracking
// The submit control asks `begin` for a ticket; while the ticket is live any
// further `begin` is refused, and the terminal state is kept for polling

use crate::error::{CoreError, ErrorCategory};
use crate::reporter::CreationOutcome;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    Idle,
    Pending { attempt: u64 },
    Succeeded { attempt: u64, outcome: CreationOutcome },
    Failed { attempt: u64, category: ErrorCategory, message: String, detail: String },
}

impl SubmissionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionStatus::Pending { .. })
    }
}

#[derive(Debug)]
struct TrackerState {
    status: SubmissionStatus,
    attempts: u64,
}

/// Cloneable handle to the one submission slot of a form.
#[derive(Debug, Clone)]
pub struct SubmissionTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                status: SubmissionStatus::Idle,
                attempts: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // A poisoned lock only means a panic mid-update; the status is still readable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim the slot. Fails with `SubmissionInFlight` while another attempt
    /// is pending.
    pub fn begin(&self) -> Result<SubmissionTicket, CoreError> {
        let mut state = self.lock();
        if state.status.is_pending() {
            return Err(CoreError::SubmissionInFlight);
        }
        state.attempts += 1;
        let attempt = state.attempts;
        state.status = SubmissionStatus::Pending { attempt };
        log::debug!("Submission attempt {} started", attempt);
        Ok(SubmissionTicket {
            tracker: self.clone(),
            attempt,
            finished: false,
        })
    }

    pub fn status(&self) -> SubmissionStatus {
        self.lock().status.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().status.is_pending()
    }

    fn finish(&self, status: SubmissionStatus) {
        self.lock().status = status;
    }
}

/// Proof of owning the in-flight slot. Dropping it without calling
/// `succeed`/`fail` records a failure so the control never stays disabled.
#[derive(Debug)]
pub struct SubmissionTicket {
    tracker: SubmissionTracker,
    attempt: u64,
    finished: bool,
}

impl SubmissionTicket {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn succeed(mut self, outcome: CreationOutcome) {
        self.finished = true;
        log::info!("Submission attempt {} succeeded: mint {}", self.attempt, outcome.mint);
        self.tracker.finish(SubmissionStatus::Succeeded {
            attempt: self.attempt,
            outcome,
        });
    }

    pub fn fail(mut self, error: &CoreError) {
        self.finished = true;
        log::warn!("Submission attempt {} failed: {}", self.attempt, error);
        self.tracker.finish(SubmissionStatus::Failed {
            attempt: self.attempt,
            category: error.category(),
            message: error.user_message(),
            detail: error.to_string(),
        });
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        if !self.finished {
            self.tracker.finish(SubmissionStatus::Failed {
                attempt: self.attempt,
                category: ErrorCategory::Internal,
                message: "The submission was abandoned before it finished.".to_string(),
                detail: "ticket dropped".to_string(),
            });
        }
    }
}
