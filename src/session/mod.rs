//! Session State Machine
//!
//! Tracks the one in-flight request per process with named phases instead
//! of an ambient "is processing" flag, so the single-flight invariant can
//! be checked independently of any presentation code.
//!
//! Lifecycle: Idle -> Previewing -> Recognizing -> Evaluating ->
//! Succeeded | Failed, with reset back to Idle permitted from any phase.

use serde::Serialize;
use tracing::{debug, warn};

use crate::pipeline::PipelineOutcome;

/// Phase of the single recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Previewing,
    Recognizing,
    Evaluating,
    Succeeded,
    Failed,
}

impl SessionPhase {
    /// Whether a pipeline run is currently outstanding.
    pub fn in_flight(self) -> bool {
        matches!(self, SessionPhase::Recognizing | SessionPhase::Evaluating)
    }
}

/// The single per-process session: current phase plus the most recent
/// settled outcome, if any.
#[derive(Debug, Default)]
pub struct Session {
    phase: SessionPhase,
    outcome: Option<PipelineOutcome>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<&PipelineOutcome> {
        self.outcome.as_ref()
    }

    /// Idle -> Previewing once an image has been acquired. Ignored from any
    /// other phase; a new attempt after a result requires a reset first.
    pub fn acquire(&mut self) {
        if self.phase == SessionPhase::Idle {
            self.phase = SessionPhase::Previewing;
        } else {
            warn!(phase = ?self.phase, "image acquired outside Idle; ignored");
        }
    }

    /// Previewing -> Recognizing. Returns false (and changes nothing) when
    /// a run is already in flight or no image has been acquired: the
    /// single-flight guard.
    pub fn begin(&mut self) -> bool {
        if self.phase.in_flight() {
            debug!(phase = ?self.phase, "start ignored: run already in flight");
            return false;
        }
        if self.phase != SessionPhase::Previewing {
            debug!(phase = ?self.phase, "start ignored: no image previewed");
            return false;
        }
        self.phase = SessionPhase::Recognizing;
        self.outcome = None;
        true
    }

    /// Recognizing -> Evaluating once the OCR call has settled.
    pub fn ocr_settled(&mut self) {
        if self.phase == SessionPhase::Recognizing {
            self.phase = SessionPhase::Evaluating;
        }
    }

    /// Record the settled outcome of the in-flight run. An outcome arriving
    /// after a mid-flight reset is discarded rather than resurrecting the
    /// session.
    pub fn settle(&mut self, outcome: PipelineOutcome) {
        if !self.phase.in_flight() {
            debug!(phase = ?self.phase, "outcome arrived after reset; discarded");
            return;
        }
        self.phase = if outcome.is_success() {
            SessionPhase::Succeeded
        } else {
            SessionPhase::Failed
        };
        self.outcome = Some(outcome);
    }

    /// Any phase -> Idle, clearing any held outcome.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.outcome = None;
    }
}
