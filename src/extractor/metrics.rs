//! MetricsExtractor - turns a stabilized page and its network log into
//! canonical counts and the per-request detail list.

use chromiumoxide::Page;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::browser::capture::RawCapture;
use crate::domain::{PageMetrics, RequestRecord, ResourceBreakdown, ResourceKind};
use crate::error::{AppError, Result};

/// One year. Applied to requests whose caching policy was never observed
/// (e.g. served from a cache layer): treated as well-cached, never zero.
pub const WELL_CACHED_LIFETIME_MS: u64 = 31_536_000_000;

/// DOM element census. Counts every element under the document root,
/// skips elements strictly inside an `<svg>` subtree (each `<svg>` counts
/// as one node), and recurses into shadow roots and same-origin iframe
/// documents. Cross-origin iframes are skipped, not an error.
const DOM_COUNT_JS: &str = r"
    (() => {
        const tally = (root) => {
            let count = 0;
            for (const el of root.querySelectorAll('*')) {
                if (el.parentElement && el.parentElement.closest('svg')) continue;
                count += 1;
                if (el.shadowRoot) count += tally(el.shadowRoot);
                if (el.tagName === 'IFRAME') {
                    try {
                        if (el.contentDocument) count += tally(el.contentDocument);
                    } catch (_) {}
                }
            }
            return count;
        };
        return tally(document);
    })()
";

static MAX_AGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:s-maxage|max-age)\s*=\s*(\d+)").expect("valid max-age regex"));

/// Everything the extractor produces for one run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub metrics: PageMetrics,
    pub requests: Vec<RequestRecord>,
    pub breakdown: ResourceBreakdown,
    pub ttfb_ms: f64,
}

pub struct MetricsExtractor;

impl MetricsExtractor {
    /// Extract canonical counts and request details from the stabilized
    /// page. The network capture was already filtered of `data:`/`blob:`
    /// schemes, so every entry here is a real transfer.
    pub async fn extract(
        page: &Page,
        captures: &[RawCapture],
        ttfb_ms: f64,
    ) -> Result<Extraction> {
        let dom_elements = Self::count_dom_elements(page).await?;
        let requests = Self::build_records(captures);

        let total_bytes: u64 = requests.iter().map(RequestRecord::accounted_bytes).sum();
        let metrics = PageMetrics::new(
            dom_elements,
            requests.len() as u32,
            total_bytes as f64 / 1000.0,
        );
        let breakdown = ResourceBreakdown::from_records(&requests);

        log::debug!(
            "[EXTRACT] {} DOM elements, {} requests, {:.1} KB",
            metrics.dom_elements,
            metrics.requests,
            metrics.size_kb
        );

        Ok(Extraction { metrics, requests, breakdown, ttfb_ms })
    }

    async fn count_dom_elements(page: &Page) -> Result<u32> {
        page.evaluate(DOM_COUNT_JS)
            .await
            .map_err(|e| AppError::metrics(e.to_string()))?
            .into_value()
            .map_err(|e| AppError::metrics(e.to_string()))
    }

    /// Convert raw captures into immutable records with run-relative
    /// millisecond timestamps.
    pub fn build_records(captures: &[RawCapture]) -> Vec<RequestRecord> {
        let origin = captures
            .iter()
            .map(|c| c.start_time)
            .fold(f64::INFINITY, f64::min);

        captures
            .iter()
            .map(|capture| {
                let start_time = ((capture.start_time - origin) * 1000.0).max(0.0);
                let end_time = if capture.end_time > 0.0 {
                    ((capture.end_time - origin) * 1000.0).max(start_time)
                } else {
                    start_time
                };
                RequestRecord {
                    url: capture.url.clone(),
                    domain: host_of(&capture.url),
                    protocol: capture.protocol.clone(),
                    status_code: capture.status_code,
                    mime_type: capture.mime_type.clone(),
                    resource_type: classify_resource(&capture.mime_type, &capture.url),
                    transfer_size: capture.transfer_size,
                    resource_size: capture.resource_size,
                    priority: capture.priority.clone(),
                    start_time,
                    end_time,
                    duration: end_time - start_time,
                    from_cache: capture.from_cache,
                    cache_lifetime_ms: cache_lifetime_ms(
                        capture.cache_control.as_deref(),
                        capture.response_seen,
                    ),
                }
            })
            .collect()
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// MIME-first classification with an extension fallback for servers that
/// report generic content types.
pub fn classify_resource(mime_type: &str, url: &str) -> ResourceKind {
    let mime = mime_type.to_ascii_lowercase();
    if mime.contains("javascript") || mime.contains("ecmascript") {
        return ResourceKind::Script;
    }
    if mime == "text/css" {
        return ResourceKind::Stylesheet;
    }
    if mime.starts_with("image/") {
        return ResourceKind::Image;
    }
    if mime.starts_with("font/") || mime.contains("opentype") || mime.contains("woff") {
        return ResourceKind::Font;
    }
    if mime == "application/json" || mime == "application/xml" || mime == "text/xml" {
        return ResourceKind::Xhr;
    }

    let path = url::Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_default();
    let extension = path.rsplit('.').next().unwrap_or_default().to_string();
    match extension.as_str() {
        "js" | "mjs" => ResourceKind::Script,
        "css" => ResourceKind::Stylesheet,
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "avif" | "ico" => ResourceKind::Image,
        "woff" | "woff2" | "ttf" | "otf" | "eot" => ResourceKind::Font,
        "json" => ResourceKind::Xhr,
        _ => ResourceKind::Other,
    }
}

/// Cache lifetime in milliseconds from the observed caching policy.
///
/// `no-store`/`no-cache` and `max-age=0` mean no caching; a missing
/// directive on an observed response means no policy (0); a request whose
/// response was never observed is assumed well-cached.
pub fn cache_lifetime_ms(cache_control: Option<&str>, response_seen: bool) -> u64 {
    match cache_control {
        None => {
            if response_seen {
                0
            } else {
                WELL_CACHED_LIFETIME_MS
            }
        }
        Some(value) => {
            let lowered = value.to_ascii_lowercase();
            if lowered.contains("no-store") || lowered.contains("no-cache") {
                return 0;
            }
            MAX_AGE_RE
                .captures(&lowered)
                .and_then(|captures| captures[1].parse::<u64>().ok())
                .map(|seconds| seconds * 1000)
                .unwrap_or(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_mime() {
        assert_eq!(
            classify_resource("application/javascript", "https://e.com/x"),
            ResourceKind::Script
        );
        assert_eq!(classify_resource("text/css", "https://e.com/x"), ResourceKind::Stylesheet);
        assert_eq!(classify_resource("image/webp", "https://e.com/x"), ResourceKind::Image);
        assert_eq!(classify_resource("font/woff2", "https://e.com/x"), ResourceKind::Font);
        assert_eq!(classify_resource("application/json", "https://e.com/x"), ResourceKind::Xhr);
        assert_eq!(classify_resource("text/html", "https://e.com/x"), ResourceKind::Other);
    }

    #[test]
    fn test_classify_falls_back_to_extension() {
        assert_eq!(
            classify_resource("application/octet-stream", "https://e.com/bundle.js?v=2"),
            ResourceKind::Script
        );
        assert_eq!(
            classify_resource("", "https://e.com/theme.css"),
            ResourceKind::Stylesheet
        );
        assert_eq!(
            classify_resource("application/octet-stream", "https://e.com/font.woff2"),
            ResourceKind::Font
        );
        assert_eq!(
            classify_resource("application/octet-stream", "https://e.com/blob"),
            ResourceKind::Other
        );
    }

    #[test]
    fn test_cache_lifetime_parsing() {
        assert_eq!(cache_lifetime_ms(Some("max-age=600"), true), 600_000);
        assert_eq!(cache_lifetime_ms(Some("public, max-age=31536000"), true), 31_536_000_000);
        assert_eq!(cache_lifetime_ms(Some("s-maxage=120"), true), 120_000);
        assert_eq!(cache_lifetime_ms(Some("no-cache"), true), 0);
        assert_eq!(cache_lifetime_ms(Some("no-store, max-age=600"), true), 0);
        assert_eq!(cache_lifetime_ms(Some("max-age=0"), true), 0);
        assert_eq!(cache_lifetime_ms(Some("public"), true), 0);
    }

    #[test]
    fn test_unobserved_response_is_well_cached() {
        assert_eq!(cache_lifetime_ms(None, false), WELL_CACHED_LIFETIME_MS);
        assert_eq!(cache_lifetime_ms(None, true), 0);
    }

    #[test]
    fn test_records_get_relative_times_and_fallback_sizes() {
        let captures = vec![
            RawCapture {
                url: "https://example.com/".to_string(),
                priority: "VeryHigh".to_string(),
                start_time: 1000.0,
                end_time: 1000.25,
                status_code: 200,
                mime_type: "text/html".to_string(),
                protocol: "h2".to_string(),
                cache_control: None,
                from_cache: false,
                transfer_size: 5000,
                resource_size: 14_000,
                response_seen: true,
            },
            RawCapture {
                url: "https://example.com/app.js".to_string(),
                priority: "High".to_string(),
                start_time: 1000.1,
                end_time: 0.0, // never finished
                status_code: 200,
                mime_type: "application/javascript".to_string(),
                protocol: "h2".to_string(),
                cache_control: Some("max-age=60".to_string()),
                from_cache: true,
                transfer_size: 0,
                resource_size: 9000,
                response_seen: true,
            },
        ];

        let records = MetricsExtractor::build_records(&captures);
        assert_eq!(records.len(), 2);

        assert!((records[0].start_time - 0.0).abs() < 1e-9);
        assert!((records[0].end_time - 250.0).abs() < 1e-6);
        assert!((records[0].duration - 250.0).abs() < 1e-6);
        assert_eq!(records[0].accounted_bytes(), 5000);
        assert_eq!(records[0].domain, "example.com");

        // Unfinished request: end pins to start, zero duration.
        assert!((records[1].start_time - 100.0).abs() < 1e-6);
        assert_eq!(records[1].end_time, records[1].start_time);
        assert_eq!(records[1].duration, 0.0);
        // Zero transfer falls back to the decompressed size.
        assert_eq!(records[1].accounted_bytes(), 9000);
        assert_eq!(records[1].cache_lifetime_ms, 60_000);
        assert!(records[1].from_cache);
    }

    #[test]
    fn test_empty_capture_yields_empty_records() {
        assert!(MetricsExtractor::build_records(&[]).is_empty());
    }
}
