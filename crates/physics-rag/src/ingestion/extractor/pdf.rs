//! PDF text layer and OCR for scanned PDFs

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::{read_bytes, Extractor};
use crate::error::{Error, Result};

/// OCR tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// OCR executable
    pub command: String,
    /// Language hints passed with `-l`
    pub languages: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            languages: "eng+chi_sim".to_string(),
        }
    }
}

/// Text-layer extraction with `pdf-extract`
pub struct TextPdfExtractor {
    /// Upper bound for one document; some fonts make the parser spin
    timeout: Duration,
}

impl TextPdfExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TextPdfExtractor {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl Extractor for TextPdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let data = read_bytes(path)?;

        // The parser can panic or hang on hostile input, so it runs on its
        // own thread and a crash or stall becomes an extraction error.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(pdf_extract::extract_text_from_mem(&data));
        });

        let text = match rx.recv_timeout(self.timeout) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(Error::extraction(path, format!("invalid PDF: {}", e))),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "PDF parser still busy on {} after {}s, abandoning its thread",
                    path.display(),
                    self.timeout.as_secs()
                );
                return Err(Error::extraction(
                    path,
                    format!("PDF parsing exceeded {}s", self.timeout.as_secs()),
                ))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(Error::extraction(path, "PDF parser crashed"))
            }
        };

        let text = text.replace('\0', "");
        if text.trim().is_empty() {
            return Err(Error::extraction(
                path,
                "no extractable text layer (name scanned files *.scan.pdf to OCR them)",
            ));
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "pdf-text"
    }
}

/// OCR through an external tool, reading the recognised text from stdout
pub struct OcrPdfExtractor {
    config: OcrConfig,
}

impl OcrPdfExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Check if the OCR tool can be started
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.command)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Extractor for OcrPdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.config.command)
            .arg(path)
            .arg("stdout")
            .args(["-l", &self.config.languages])
            .output()
            .map_err(|e| {
                Error::extraction(path, format!("failed to run {}: {}", self.config.command, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stdout.trim().is_empty() {
                return Err(Error::extraction(
                    path,
                    format!("{} exited with {}: {}", self.config.command, output.status, stderr.trim()),
                ));
            }
            tracing::warn!(
                "{} exited with {} for {}, keeping partial output ({} bytes)",
                self.config.command,
                output.status,
                path.display(),
                stdout.len()
            );
        }

        Ok(stdout)
    }

    fn name(&self) -> &str {
        "pdf-ocr"
    }
}
