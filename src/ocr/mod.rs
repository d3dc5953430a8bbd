//! OCR boundary
//!
//! Exposes text recognition as a narrow async capability: one image in,
//! one (text, confidence) observation out. The confidence is the engine's
//! self-reported certainty in the extraction, on a 0-100 scale; it says
//! nothing about whether the text evaluates.

pub mod tesseract;

use anyhow::Result;
use async_trait::async_trait;

use crate::acquire::RawImage;

pub use tesseract::TesseractRecognizer;

/// Text extracted from an image, with the engine's confidence (0-100).
///
/// The text may be empty; downstream code must treat that as a failure
/// signal, never as valid input.
#[derive(Debug, Clone)]
pub struct OcrObservation {
    pub text: String,
    pub confidence: f64,
}

/// The OCR capability: `recognize(image) -> {text, confidence}` or failure.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &RawImage) -> Result<OcrObservation>;
}
