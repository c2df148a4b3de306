//! The process-boundary message contract.
//!
//! When navigation runs out-of-process, exactly one JSON document crosses
//! the boundary on stdout: either the serialized `AnalysisResult` or an
//! `ErrorDocument`. A non-zero exit code accompanies the error document.
//! Nothing else may be written to stdout by the sidecar; logs go to
//! stderr.

use serde::{Deserialize, Serialize};

use crate::domain::AnalysisResult;
use crate::error::AppError;

/// Structured failure document emitted by the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDocument {
    /// Always true; distinguishes the document from a result.
    pub error: bool,
    /// Stable code, one of `AppError::code()`.
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorDocument {
    pub fn from_error(err: &AppError) -> Self {
        Self {
            error: true,
            code: err.code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

/// The single document a sidecar run produces.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SidecarOutput {
    Success(Box<AnalysisResult>),
    Failure(ErrorDocument),
}

/// Parse the sidecar's stdout into a typed outcome.
pub fn parse_output(stdout: &str) -> Result<SidecarOutput, AppError> {
    serde_json::from_str(stdout.trim())
        .map_err(|e| AppError::parse(format!("{e}; output: {}", truncate(stdout, 512))))
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
