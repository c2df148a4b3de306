//! Host-side sidecar client.
//!
//! Spawns the navigator sidecar and exchanges exactly one JSON document
//! over its stdout. The sidecar owns the browser; this side only enforces
//! the overall deadline and maps the document to typed results.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::boundary::{self, SidecarOutput};
use crate::domain::AnalysisResult;
use crate::error::{AppError, Result};
use crate::service::analyzer::{validate_url, AnalyzeOptions, Analyzer};

const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(120);

/// Analyzer that crosses the process boundary.
pub struct SidecarAnalyzer {
    sidecar_path: PathBuf,
    chrome_path: PathBuf,
    run_timeout: Duration,
}

impl SidecarAnalyzer {
    pub fn new(sidecar_path: PathBuf, chrome_path: PathBuf) -> Self {
        Self { sidecar_path, chrome_path, run_timeout: DEFAULT_RUN_TIMEOUT }
    }

    /// Override the overall run deadline.
    pub fn with_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }
}

#[async_trait]
impl Analyzer for SidecarAnalyzer {
    async fn analyze(&self, url: &str, options: &AnalyzeOptions) -> Result<AnalysisResult> {
        let url = validate_url(url)?;

        let mut command = Command::new(&self.sidecar_path);
        command
            .arg(url.as_str())
            .arg(&self.chrome_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The sidecar must die with us - on timeout, drop, or host
            // interruption the child is killed, never leaked.
            .kill_on_drop(true);
        if options.generate_report {
            command.arg("--report");
            if let Some(dir) = &options.report_dir {
                command.arg("--report-dir").arg(dir);
            }
        }

        log::info!("[SIDECAR] Running {} for {url}", self.sidecar_path.display());

        let output = tokio::time::timeout(self.run_timeout, command.output())
            .await
            .map_err(|_| AppError::NavigationTimeout {
                phase: "sidecar",
                timeout_ms: self.run_timeout.as_millis() as u64,
            })?
            .map_err(|e| AppError::ProcessSpawn(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            // A failing sidecar still emits its one document when it can.
            if let Ok(SidecarOutput::Failure(doc)) = boundary::parse_output(&stdout) {
                return Err(AppError::AnalysisFailed { code: doc.code, message: doc.message });
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::ProcessCommunication {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: stderr.into_owned(),
            });
        }

        match boundary::parse_output(&stdout)? {
            SidecarOutput::Success(result) => Ok(*result),
            SidecarOutput::Failure(doc) => {
                Err(AppError::AnalysisFailed { code: doc.code, message: doc.message })
            }
        }
    }
}
