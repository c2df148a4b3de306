//! Core domain entities: raw metrics, scores, request records and the
//! final assembled result.
//!
//! Everything here is immutable once constructed. Derived analytics views
//! live in `crate::analytics` and are recomputed on demand, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{ProblematicResource, RequestAnalytics};
use crate::score::quantiles::GRADE_THRESHOLDS;

// ====== Raw metrics ======

/// Raw counts collected from a stabilized page. Produced once per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    /// Number of DOM elements (one per `<svg>` subtree, shadow roots and
    /// same-origin iframes included).
    pub dom_elements: u32,
    /// Number of captured HTTP requests (`data:`/`blob:` excluded).
    pub requests: u32,
    /// Total transfer size in kilobytes (1 KB = 1000 bytes).
    pub size_kb: f64,
}

impl PageMetrics {
    pub const fn new(dom_elements: u32, requests: u32, size_kb: f64) -> Self {
        Self { dom_elements, requests, size_kb }
    }
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self { dom_elements: 0, requests: 0, size_kb: 0.0 }
    }
}

// ====== Grade ======

/// Letter grade from A (best) to G (worst), a total function of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Grade {
    /// Determine the grade for a score. Thresholds are checked highest
    /// first; any score below the F floor lands on G, so the mapping is
    /// total for every float the engine can produce.
    pub fn from_score(score: f64) -> Self {
        for (threshold, grade) in GRADE_THRESHOLDS {
            if score >= threshold {
                return grade;
            }
        }
        Grade::G
    }

    pub const fn as_char(&self) -> char {
        match self {
            Grade::A => 'A',
            Grade::B => 'B',
            Grade::C => 'C',
            Grade::D => 'D',
            Grade::E => 'E',
            Grade::F => 'F',
            Grade::G => 'G',
        }
    }

    /// Display color used by the HTML report.
    pub const fn color(&self) -> &'static str {
        match self {
            Grade::A => "#349a47",
            Grade::B => "#51b84b",
            Grade::C => "#cadb2a",
            Grade::D => "#f6eb15",
            Grade::E => "#fecd06",
            Grade::F => "#f99839",
            Grade::G => "#ed2124",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Grade::A => "Excellent",
            Grade::B => "Very Good",
            Grade::C => "Good",
            Grade::D => "Average",
            Grade::E => "Below Average",
            Grade::F => "Poor",
            Grade::G => "Very Poor",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ====== Score ======

/// Composite score with its environmental impact figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcoIndexScore {
    /// Score clamped to [0, 100].
    pub score: f64,
    /// Grade derived from the score.
    pub grade: Grade,
    /// Greenhouse gas emissions per page view, gCO2e.
    pub ghg: f64,
    /// Water consumption per page view, centiliters.
    pub water: f64,
}

// ====== Requests ======

/// Resource classification derived from MIME type and URL extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Script,
    Stylesheet,
    Image,
    Font,
    Xhr,
    Other,
}

impl ResourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Script => "script",
            ResourceKind::Stylesheet => "stylesheet",
            ResourceKind::Image => "image",
            ResourceKind::Font => "font",
            ResourceKind::Xhr => "xhr",
            ResourceKind::Other => "other",
        }
    }
}

/// One captured network request. Immutable once captured; the list of
/// these is the sole input to the analytics aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub url: String,
    /// Hostname of the request URL, empty when unparseable.
    pub domain: String,
    /// Raw protocol string as reported by the browser (e.g. "h2").
    pub protocol: String,
    pub status_code: u16,
    pub mime_type: String,
    pub resource_type: ResourceKind,
    /// Compressed bytes on the wire.
    pub transfer_size: u64,
    /// Decompressed body bytes.
    pub resource_size: u64,
    pub priority: String,
    /// Milliseconds relative to the first captured request.
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub from_cache: bool,
    pub cache_lifetime_ms: u64,
}

impl RequestRecord {
    /// Bytes this request contributes to size accounting: the wire size,
    /// falling back to the decompressed size when the browser reports a
    /// zero transfer (cache hit). Never silently zero for a real body.
    pub fn accounted_bytes(&self) -> u64 {
        if self.transfer_size > 0 {
            self.transfer_size
        } else {
            self.resource_size
        }
    }
}

// ====== Resource breakdown ======

/// Count and size share of one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSlice {
    pub count: u32,
    pub size_kb: f64,
}

/// Per-kind breakdown of the captured requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBreakdown {
    pub script: ResourceSlice,
    pub stylesheet: ResourceSlice,
    pub image: ResourceSlice,
    pub font: ResourceSlice,
    pub xhr: ResourceSlice,
    pub other: ResourceSlice,
}

impl ResourceBreakdown {
    /// Tally all records into their kind slices.
    pub fn from_records(records: &[RequestRecord]) -> Self {
        let mut breakdown = Self::default();
        for record in records {
            let slice = breakdown.slice_mut(record.resource_type);
            slice.count += 1;
            slice.size_kb += record.accounted_bytes() as f64 / 1000.0;
        }
        breakdown
    }

    fn slice_mut(&mut self, kind: ResourceKind) -> &mut ResourceSlice {
        match kind {
            ResourceKind::Script => &mut self.script,
            ResourceKind::Stylesheet => &mut self.stylesheet,
            ResourceKind::Image => &mut self.image,
            ResourceKind::Font => &mut self.font,
            ResourceKind::Xhr => &mut self.xhr,
            ResourceKind::Other => &mut self.other,
        }
    }
}

// ====== Assembled result ======

/// Score and raw metrics merged into the wire shape consumed by the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcoIndexSummary {
    pub score: f64,
    pub grade: Grade,
    pub ghg: f64,
    pub water: f64,
    pub dom_elements: u32,
    pub requests: u32,
    pub size_kb: f64,
    pub resource_breakdown: ResourceBreakdown,
}

impl EcoIndexSummary {
    pub fn new(metrics: PageMetrics, score: EcoIndexScore, breakdown: ResourceBreakdown) -> Self {
        Self {
            score: score.score,
            grade: score.grade,
            ghg: score.ghg,
            water: score.water,
            dom_elements: metrics.dom_elements,
            requests: metrics.requests,
            size_kb: metrics.size_kb,
            resource_breakdown: breakdown,
        }
    }
}

/// Final immutable result of one analysis run. Created once at the end of
/// a run; ownership passes to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    /// Time to first byte from the browser's navigation-timing entry, ms.
    pub ttfb_ms: f64,
    pub ecoindex: EcoIndexSummary,
    pub requests: Vec<RequestRecord>,
    /// Resources with a cache lifetime under one week, worst first.
    pub cache_analysis: Vec<ProblematicResource>,
    pub analytics: RequestAnalytics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_report_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100.0), Grade::A);
        assert_eq!(Grade::from_score(81.0), Grade::A);
        assert_eq!(Grade::from_score(80.0), Grade::B);
        assert_eq!(Grade::from_score(71.0), Grade::B);
        assert_eq!(Grade::from_score(70.0), Grade::C);
        assert_eq!(Grade::from_score(0.0), Grade::G);
    }

    #[test]
    fn test_grade_is_total_and_monotone() {
        let mut previous = Grade::A;
        for step in (0..=1000).rev() {
            let grade = Grade::from_score(f64::from(step) / 10.0);
            assert!(grade >= previous, "grade must not improve as score drops");
            previous = grade;
        }
    }

    #[test]
    fn test_accounted_bytes_falls_back_to_resource_size() {
        let mut record = sample_record();
        record.transfer_size = 0;
        record.resource_size = 4200;
        assert_eq!(record.accounted_bytes(), 4200);

        record.transfer_size = 1300;
        assert_eq!(record.accounted_bytes(), 1300);
    }

    #[test]
    fn test_breakdown_tallies_by_kind() {
        let mut script = sample_record();
        script.resource_type = ResourceKind::Script;
        script.transfer_size = 2000;
        let mut image = sample_record();
        image.resource_type = ResourceKind::Image;
        image.transfer_size = 5000;

        let breakdown =
            ResourceBreakdown::from_records(&[script.clone(), script, image]);
        assert_eq!(breakdown.script.count, 2);
        assert!((breakdown.script.size_kb - 4.0).abs() < f64::EPSILON);
        assert_eq!(breakdown.image.count, 1);
        assert_eq!(breakdown.font.count, 0);
    }

    fn sample_record() -> RequestRecord {
        RequestRecord {
            url: "https://example.com/app.js".to_string(),
            domain: "example.com".to_string(),
            protocol: "h2".to_string(),
            status_code: 200,
            mime_type: "application/javascript".to_string(),
            resource_type: ResourceKind::Script,
            transfer_size: 1000,
            resource_size: 2000,
            priority: "High".to_string(),
            start_time: 0.0,
            end_time: 80.0,
            duration: 80.0,
            from_cache: false,
            cache_lifetime_ms: 0,
        }
    }
}
