//! Recognition Pipeline
//!
//! Orchestrates one request: OCR the image, normalize the text, evaluate
//! the candidate expression, and classify every collaborator failure into
//! a single reason. Pure orchestration over the two collaborators; the
//! session state machine supplies the single-flight guard.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::acquire::RawImage;
use crate::eval::{self, Evaluate};
use crate::normalize;
use crate::ocr::TextRecognizer;
use crate::session::Session;

/// Generic user-facing message for any pipeline failure.
pub const FAILURE_MESSAGE: &str =
    "Could not identify a clear equation. Please try a cleaner image.";

/// Message for a payload that is not an image, reported before the
/// pipeline starts.
pub const INVALID_INPUT_MESSAGE: &str = "Please upload a valid image file.";

/// Why a request failed. Raw collaborator errors never cross this boundary;
/// they are classified here and not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The acquired payload is not an image.
    #[error("payload is not an image")]
    InvalidInputType,
    /// OCR failed or returned empty/whitespace-only text.
    #[error("no text detected in image")]
    NoTextDetected,
    /// Normalization stripped the recognized text to nothing.
    #[error("no arithmetic expression detected")]
    NoExpressionDetected,
    /// The evaluator rejected the candidate expression.
    #[error("detected expression could not be solved")]
    UnsolvableExpression,
}

/// The sole artifact a pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Success {
        /// The recognized text, trimmed but otherwise untouched.
        detected_text: String,
        /// The evaluated result, already rounded for display.
        display_value: f64,
        /// OCR confidence, 0-100.
        confidence: f64,
    },
    Failure { reason: FailureReason },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    fn failure(reason: FailureReason) -> Self {
        PipelineOutcome::Failure { reason }
    }
}

/// Run one recognition request against the session.
///
/// Returns `None` when the session rejects the start (a run is already in
/// flight, or no image was acquired); the in-flight run and its eventual
/// outcome are unaffected. The two collaborator awaits are the only
/// suspension points, and OCR fully settles before evaluation begins.
pub async fn run(
    session: &mut Session,
    image: RawImage,
    recognizer: &dyn TextRecognizer,
    evaluator: &dyn Evaluate,
) -> Option<PipelineOutcome> {
    if !session.begin() {
        return None;
    }

    let outcome = execute(session, image, recognizer, evaluator).await;
    match &outcome {
        PipelineOutcome::Success {
            detected_text,
            display_value,
            confidence,
        } => {
            info!(text = %detected_text, value = display_value, confidence, "solved");
        }
        PipelineOutcome::Failure { reason } => {
            info!(%reason, "pipeline failed");
        }
    }
    session.settle(outcome.clone());
    Some(outcome)
}

async fn execute(
    session: &mut Session,
    image: RawImage,
    recognizer: &dyn TextRecognizer,
    evaluator: &dyn Evaluate,
) -> PipelineOutcome {
    let observation = match recognizer.recognize(&image).await {
        Ok(observation) => observation,
        Err(err) => {
            warn!(error = %err, "OCR failed");
            return PipelineOutcome::failure(FailureReason::NoTextDetected);
        }
    };
    // The payload is not retained past the OCR call.
    drop(image);
    session.ocr_settled();

    let text = observation.text.trim();
    if text.is_empty() {
        return PipelineOutcome::failure(FailureReason::NoTextDetected);
    }
    debug!(%text, "recognized text");

    let Some(candidate) = normalize::normalize(text) else {
        return PipelineOutcome::failure(FailureReason::NoExpressionDetected);
    };
    debug!(candidate = %candidate, "normalized expression");

    match evaluator.evaluate(candidate.as_str()).await {
        Ok(value) => PipelineOutcome::Success {
            detected_text: text.to_string(),
            display_value: eval::display_value(value),
            confidence: observation.confidence,
        },
        Err(err) => {
            warn!(error = %err, candidate = %candidate, "evaluation failed");
            PipelineOutcome::failure(FailureReason::UnsolvableExpression)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ArithmeticEvaluator;
    use crate::ocr::OcrObservation;
    use crate::session::SessionPhase;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FakeRecognizer {
        observation: Result<OcrObservation, String>,
    }

    impl FakeRecognizer {
        fn returning(text: &str, confidence: f64) -> Self {
            Self {
                observation: Ok(OcrObservation {
                    text: text.to_string(),
                    confidence,
                }),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                observation: Err(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl TextRecognizer for FakeRecognizer {
        async fn recognize(&self, _image: &RawImage) -> Result<OcrObservation> {
            self.observation
                .clone()
                .map_err(|message| anyhow!(message))
        }
    }

    fn image() -> RawImage {
        RawImage {
            data: vec![0u8; 16],
            mime: "image/png".to_string(),
        }
    }

    fn previewing_session() -> Session {
        let mut session = Session::new();
        session.acquire();
        session
    }

    #[tokio::test]
    async fn test_full_success_scenario() {
        let mut session = previewing_session();
        let recognizer = FakeRecognizer::returning("12+8=20", 91.4);

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::Success {
                detected_text: "12+8=20".to_string(),
                display_value: 20.0,
                confidence: 91.4,
            }
        );
        assert_eq!(session.phase(), SessionPhase::Succeeded);
        assert_eq!(session.outcome(), Some(&outcome));
    }

    #[tokio::test]
    async fn test_fractional_result_is_rounded_for_display() {
        let mut session = previewing_session();
        let recognizer = FakeRecognizer::returning("10/3", 88.0);

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator)
            .await
            .unwrap();

        let PipelineOutcome::Success { display_value, .. } = outcome else {
            panic!("expected success");
        };
        assert_eq!(display_value, 3.3333);
    }

    #[tokio::test]
    async fn test_ocr_failure_classified_as_no_text() {
        let mut session = previewing_session();
        let recognizer = FakeRecognizer::failing("engine exploded");

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::failure(FailureReason::NoTextDetected)
        );
        assert_eq!(session.phase(), SessionPhase::Failed);
    }

    #[tokio::test]
    async fn test_whitespace_text_classified_as_no_text() {
        let mut session = previewing_session();
        let recognizer = FakeRecognizer::returning("   \n  ", 70.0);

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::failure(FailureReason::NoTextDetected)
        );
    }

    #[tokio::test]
    async fn test_noise_classified_as_no_expression() {
        let mut session = previewing_session();
        let recognizer = FakeRecognizer::returning("???", 40.0);

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::failure(FailureReason::NoExpressionDetected)
        );
        assert_eq!(session.phase(), SessionPhase::Failed);
    }

    #[tokio::test]
    async fn test_unsolvable_expression() {
        let mut session = previewing_session();
        let recognizer = FakeRecognizer::returning("5++*2", 85.0);

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::failure(FailureReason::UnsolvableExpression)
        );
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let mut session = Session::new();
        session.acquire();
        // Force the in-flight phase as the guard sees it mid-run.
        assert!(session.begin());

        let recognizer = FakeRecognizer::returning("1+1", 99.0);
        let second = run(&mut session, image(), &recognizer, &ArithmeticEvaluator).await;

        assert!(second.is_none());
        assert_eq!(session.phase(), SessionPhase::Recognizing);
        assert!(session.outcome().is_none());
    }

    #[tokio::test]
    async fn test_start_without_acquired_image_is_rejected() {
        let mut session = Session::new();
        let recognizer = FakeRecognizer::returning("1+1", 99.0);

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator).await;

        assert!(outcome.is_none());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_ocr_substitutions_flow_through() {
        let mut session = previewing_session();
        let recognizer = FakeRecognizer::returning("12x5", 77.0);

        let outcome = run(&mut session, image(), &recognizer, &ArithmeticEvaluator)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::Success {
                detected_text: "12x5".to_string(),
                display_value: 60.0,
                confidence: 77.0,
            }
        );
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = PipelineOutcome::failure(FailureReason::NoTextDetected);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "no_text_detected");
    }
}
