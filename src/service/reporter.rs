//! Standalone HTML report writer.
//!
//! Renders one self-contained HTML file per run. This is an optional
//! artifact: callers treat a missing report as a degraded run, never as a
//! failed one, so errors here stay `anyhow` and are swallowed upstream.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::AnalysisResult;

/// Write the report into `dir` and return its path.
pub fn write_report(result: &AnalysisResult, dir: &Path) -> Result<PathBuf> {
    let filename = format!("ecoscan-report-{}.html", uuid::Uuid::new_v4());
    let path = dir.join(filename);
    let html = render(result);
    std::fs::write(&path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    log::info!("[REPORT] Wrote {}", path.display());
    Ok(path)
}

fn render(result: &AnalysisResult) -> String {
    let eco = &result.ecoindex;
    let grade = eco.grade;

    let domain_rows: String = result
        .analytics
        .domain_stats
        .domains
        .iter()
        .take(10)
        .map(|d| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td><td>{:.1} KB</td></tr>",
                escape(&d.domain),
                d.request_count,
                d.percentage,
                d.total_transfer_size as f64 / 1000.0,
            )
        })
        .collect();

    let protocol_rows: String = result
        .analytics
        .protocol_stats
        .protocols
        .iter()
        .map(|p| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>",
                escape(&p.protocol),
                p.count,
                p.percentage,
            )
        })
        .collect();

    let cache_rows: String = result
        .analytics
        .cache_stats
        .groups
        .iter()
        .map(|g| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>",
                escape(&g.label),
                g.count,
                g.percentage,
            )
        })
        .collect();

    let duplicate_rows: String = result
        .analytics
        .duplicate_stats
        .duplicates
        .iter()
        .take(10)
        .map(|d| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1} KB</td></tr>",
                escape(&d.filename),
                d.urls.len(),
                d.wasted_bytes as f64 / 1000.0,
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ecoscan report - {url}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 960px; color: #1f2937; }}
.badge {{ display: inline-block; font-size: 3rem; font-weight: 700; color: #fff; background: {grade_color}; border-radius: 0.5rem; padding: 0.5rem 1.5rem; }}
.tiles {{ display: flex; gap: 1rem; margin: 1.5rem 0; }}
.tile {{ border: 1px solid #e5e7eb; border-radius: 0.5rem; padding: 1rem; flex: 1; }}
.tile strong {{ display: block; font-size: 1.4rem; }}
table {{ border-collapse: collapse; width: 100%; margin-bottom: 2rem; }}
th, td {{ text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e5e7eb; }}
</style>
</head>
<body>
<h1>ecoscan report</h1>
<p>{url} &mdash; {timestamp}</p>
<p><span class="badge">{grade}</span> {grade_label}, score {score:.1}/100</p>
<div class="tiles">
<div class="tile"><strong>{dom}</strong>DOM elements</div>
<div class="tile"><strong>{requests}</strong>HTTP requests</div>
<div class="tile"><strong>{size:.1} KB</strong>transferred</div>
<div class="tile"><strong>{ghg:.2} gCO2e</strong>per view</div>
<div class="tile"><strong>{water:.2} cl</strong>water per view</div>
</div>
<h2>Domains</h2>
<table><tr><th>Domain</th><th>Requests</th><th>Share</th><th>Transfer</th></tr>{domain_rows}</table>
<h2>Protocols</h2>
<table><tr><th>Protocol</th><th>Requests</th><th>Share</th></tr>{protocol_rows}</table>
<h2>Cache lifetimes</h2>
<table><tr><th>Bucket</th><th>Resources</th><th>Share</th></tr>{cache_rows}</table>
<h2>Duplicate resources</h2>
<table><tr><th>File</th><th>Copies</th><th>Wasted</th></tr>{duplicate_rows}</table>
</body>
</html>
"#,
        url = escape(&result.url),
        timestamp = result.timestamp.to_rfc3339(),
        grade = grade,
        grade_color = grade.color(),
        grade_label = grade.label(),
        score = eco.score,
        dom = eco.dom_elements,
        requests = eco.requests,
        size = eco.size_kb,
        ghg = eco.ghg,
        water = eco.water,
        domain_rows = domain_rows,
        protocol_rows = protocol_rows,
        cache_rows = cache_rows,
        duplicate_rows = duplicate_rows,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageMetrics, ResourceBreakdown};
    use crate::extractor::Extraction;
    use crate::service::analyzer::AnalyzeOptions;
    use crate::service::assembler::ResultAssembler;

    fn sample_result() -> AnalysisResult {
        let extraction = Extraction {
            metrics: PageMetrics::new(150, 0, 0.0),
            requests: vec![],
            breakdown: ResourceBreakdown::default(),
            ttfb_ms: 50.0,
        };
        ResultAssembler::assemble("https://example.com", extraction, &AnalyzeOptions::default())
    }

    #[test]
    fn test_report_is_written_and_mentions_grade() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample_result();
        let path = write_report(&result, dir.path()).unwrap();

        assert!(path.exists());
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("ecoscan report"));
        assert!(html.contains(&result.ecoindex.grade.to_string()));
        assert!(html.contains("https://example.com"));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let result = sample_result();
        assert!(write_report(&result, Path::new("/nonexistent/ecoscan")).is_err());
    }

    #[test]
    fn test_escape_neutralizes_markup() {
        assert_eq!(escape("<script>\"&\""), "&lt;script&gt;&quot;&amp;&quot;");
    }
}
