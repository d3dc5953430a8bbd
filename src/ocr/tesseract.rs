//! Tesseract CLI backend
//!
//! Shells out to the `tesseract` binary in TSV mode and folds the word
//! tokens into a single observation. TSV is used rather than plain text
//! because it carries per-word confidences.

use std::io::Write;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::acquire::RawImage;
use crate::config::OcrSettings;

use super::{OcrObservation, TextRecognizer};

/// Text recognizer backed by the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
    psm: u32,
    dpi: u32,
}

impl TesseractRecognizer {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            language: settings.language.clone(),
            psm: settings.psm,
            dpi: settings.dpi,
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &RawImage) -> Result<OcrObservation> {
        // Tesseract reads from a path, so the payload goes through a temp
        // file with a suffix matching its sniffed format.
        let mut tmp = tempfile::Builder::new()
            .suffix(suffix_for_mime(&image.mime))
            .tempfile()
            .context("failed to create temp file for OCR")?;
        tmp.write_all(&image.data)
            .context("failed to write temp image for OCR")?;
        tmp.flush().ok();

        let output = Command::new("tesseract")
            .arg(tmp.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.psm.to_string())
            .arg("--dpi")
            .arg(self.dpi.to_string())
            .arg("tsv")
            .output()
            .await
            .context("failed to run tesseract (is it installed?)")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("tesseract failed: {}", stderr.trim()));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let observation = parse_tsv(&tsv);
        debug!(
            text = %observation.text,
            confidence = observation.confidence,
            "tesseract observation"
        );
        Ok(observation)
    }
}

fn suffix_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        _ => ".img",
    }
}

/// Fold tesseract's TSV word rows (level 5) into one observation. Words on
/// the same line are joined with spaces, lines with newlines; the overall
/// confidence is the length-weighted mean of the word confidences.
fn parse_tsv(tsv: &str) -> OcrObservation {
    let mut text = String::new();
    let mut conf_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut current_line: Option<(i32, i32, i32)> = None;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let level: i32 = cols[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }
        let block: i32 = cols[2].parse().unwrap_or(0);
        let par: i32 = cols[3].parse().unwrap_or(0);
        let line: i32 = cols[4].parse().unwrap_or(0);
        let conf: f64 = cols[10].parse().unwrap_or(-1.0);
        let word = cols[11].trim();
        if word.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (block, par, line);
        match current_line {
            Some(prev) if prev == key => text.push(' '),
            Some(_) => text.push('\n'),
            None => {}
        }
        current_line = Some(key);
        text.push_str(word);

        let weight = word.chars().count().max(1) as f64;
        conf_sum += conf * weight;
        weight_sum += weight;
    }

    let confidence = if weight_sum > 0.0 {
        conf_sum / weight_sum
    } else {
        0.0
    };

    OcrObservation { text, confidence }
}
