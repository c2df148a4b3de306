//! ResultAssembler - composes the pieces of a finished run into one
//! immutable `AnalysisResult`.

use chrono::Utc;

use crate::analytics::RequestAnalytics;
use crate::domain::{AnalysisResult, EcoIndexSummary};
use crate::extractor::Extraction;
use crate::score::ScoreEngine;
use crate::service::analyzer::AnalyzeOptions;
use crate::service::reporter;

pub struct ResultAssembler;

impl ResultAssembler {
    /// Build the final result from an extraction. Scoring and analytics
    /// are pure; the only fallible step is the optional report artifact,
    /// whose failure is logged and swallowed - the result stays valid
    /// without it.
    pub fn assemble(url: &str, extraction: Extraction, options: &AnalyzeOptions) -> AnalysisResult {
        let score = ScoreEngine::compute(&extraction.metrics);
        let analytics = RequestAnalytics::compute(&extraction.requests);
        let cache_analysis = analytics.cache_stats.problematic_resources.clone();

        let mut result = AnalysisResult {
            url: url.to_string(),
            timestamp: Utc::now(),
            ttfb_ms: extraction.ttfb_ms,
            ecoindex: EcoIndexSummary::new(extraction.metrics, score, extraction.breakdown),
            requests: extraction.requests,
            cache_analysis,
            analytics,
            html_report_path: None,
        };

        if options.generate_report {
            let dir = options
                .report_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir);
            match reporter::write_report(&result, &dir) {
                Ok(path) => result.html_report_path = Some(path.display().to_string()),
                Err(e) => log::warn!("[ASSEMBLE] Report generation failed for {url}: {e:#}"),
            }
        }

        result
    }
}
