//! Error types for the ecoscan analysis pipeline.
//!
//! This module provides structured error handling with:
//! - `AppError`: Domain-specific errors for a single analysis run
//! - `Result<T>`: Type alias for Results using AppError
//!
//! Every error is terminal for its run. The pipeline never retries
//! internally; callers get the typed error and decide what to do.

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

/// Domain-specific errors for a single analysis run.
#[derive(Debug, Error)]
pub enum AppError {
    /// URL was not parseable or not http/https
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Chrome failed to start or produce a usable page
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// A bounded navigation step exceeded its timeout
    #[error("Navigation timeout during {phase} after {timeout_ms}ms")]
    NavigationTimeout {
        phase: &'static str,
        timeout_ms: u64,
    },

    /// Navigation or network-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// DOM/network extraction on the stabilized page failed
    #[error("Metrics collection error: {0}")]
    MetricsCollection(String),

    /// Sidecar process could not be spawned
    #[error("Failed to spawn sidecar: {0}")]
    ProcessSpawn(String),

    /// Sidecar process died without producing a parseable document
    #[error("Sidecar process failed with exit code {exit_code}: {stderr}")]
    ProcessCommunication { exit_code: i32, stderr: String },

    /// Sidecar output was not valid JSON
    #[error("Failed to parse sidecar output: {0}")]
    Parse(String),

    /// Sidecar reported a structured failure
    #[error("Analysis failed: [{code}] {message}")]
    AnalysisFailed { code: String, message: String },
}

impl AppError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a metrics collection error
    pub fn metrics(msg: impl Into<String>) -> Self {
        Self::MetricsCollection(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Stable error code carried across the process boundary.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidUrl(_) => "INVALID_URL",
            AppError::BrowserLaunch(_) => "BROWSER_LAUNCH",
            AppError::NavigationTimeout { .. } => "NAVIGATION_TIMEOUT",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::MetricsCollection(_) => "METRICS_COLLECTION",
            AppError::ProcessSpawn(_) => "PROCESS_SPAWN",
            AppError::ProcessCommunication { .. } => "PROCESS_COMMUNICATION",
            AppError::Parse(_) => "PARSE_ERROR",
            AppError::AnalysisFailed { .. } => "ANALYSIS_FAILED",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
