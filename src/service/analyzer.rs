//! The analyzer seam: one trait, two implementations.
//!
//! `InProcessAnalyzer` drives the browser inside the current process and
//! is what the sidecar binary embeds. `SidecarAnalyzer` (in
//! `service::runner`) crosses the process boundary instead. Callers pick
//! a side of the seam; the result type is identical.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use url::Url;

use crate::browser::{BrowserLauncher, NavigationController};
use crate::domain::AnalysisResult;
use crate::error::{AppError, Result};
use crate::extractor::{Extraction, MetricsExtractor};
use crate::service::assembler::ResultAssembler;

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Generate the HTML report artifact.
    pub generate_report: bool,
    /// Directory for the report; the system temp dir when unset.
    pub report_dir: Option<PathBuf>,
}

/// One deterministic analysis run per call.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, url: &str, options: &AnalyzeOptions) -> Result<AnalysisResult>;
}

/// Validate that a target URL is well-formed http/https.
pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| AppError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::InvalidUrl(format!(
            "{raw}: scheme must be http or https, got {other}"
        ))),
    }
}

/// Runs the navigation protocol with a browser owned by this process.
pub struct InProcessAnalyzer {
    chrome_path: PathBuf,
}

impl InProcessAnalyzer {
    pub const fn new(chrome_path: PathBuf) -> Self {
        Self { chrome_path }
    }

    async fn drive(browser: &Browser, url: &Url) -> Result<Extraction> {
        let stabilized = NavigationController::run(browser, url).await?;
        let extraction =
            MetricsExtractor::extract(&stabilized.page, &stabilized.requests, stabilized.ttfb_ms)
                .await;
        let _ = stabilized.page.close().await;
        extraction
    }
}

#[async_trait]
impl Analyzer for InProcessAnalyzer {
    async fn analyze(&self, url: &str, options: &AnalyzeOptions) -> Result<AnalysisResult> {
        let url = validate_url(url)?;

        let launcher = BrowserLauncher::new(self.chrome_path.clone());
        let (mut browser, handler) = launcher.launch().await?;

        // No `?` until the browser is down: the Chrome process must be
        // terminated on every exit path, including failed runs.
        let outcome = Self::drive(&browser, &url).await;
        let _ = browser.close().await;
        let _ = browser.wait().await;
        handler.abort();

        let extraction = outcome?;
        Ok(ResultAssembler::assemble(url.as_str(), extraction, options))
    }
}
