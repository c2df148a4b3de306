//! Per-hostname request statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::RequestRecord;

/// Stable visualization palette, assigned by rank and cycled. Versioned:
/// reordering it changes every rendered chart.
pub const DOMAIN_PALETTE: [&str; 8] = [
    "#3b82f6", // blue
    "#10b981", // green
    "#f59e0b", // amber
    "#ef4444", // red
    "#8b5cf6", // purple
    "#ec4899", // pink
    "#06b6d4", // cyan
    "#84cc16", // lime
];

const FALLBACK_COLOR: &str = "#6b7280";

/// Statistics for a single domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStat {
    pub domain: String,
    pub request_count: u32,
    /// Total transfer size in bytes.
    pub total_transfer_size: u64,
    /// Share of the total request count, 0-100.
    pub percentage: f64,
    pub color: String,
}

/// Aggregated domain analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainAnalytics {
    /// One entry per domain, descending request count; ties break on the
    /// domain name so the ordering is fully deterministic.
    pub domains: Vec<DomainStat>,
    pub total_requests: u32,
    pub total_size: u64,
}

impl DomainAnalytics {
    pub fn compute(requests: &[RequestRecord]) -> Self {
        if requests.is_empty() {
            return Self { domains: vec![], total_requests: 0, total_size: 0 };
        }

        let mut tally: HashMap<&str, (u32, u64)> = HashMap::new();
        for request in requests {
            let entry = tally.entry(request.domain.as_str()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += request.transfer_size;
        }

        let total = requests.len() as u32;
        let total_size: u64 = tally.values().map(|(_, bytes)| bytes).sum();

        let mut ranked: Vec<(&str, (u32, u64))> = tally.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then_with(|| a.0.cmp(b.0)));

        let domains = ranked
            .into_iter()
            .enumerate()
            .map(|(rank, (domain, (count, bytes)))| DomainStat {
                domain: if domain.is_empty() {
                    "(unknown)".to_string()
                } else {
                    domain.to_string()
                },
                request_count: count,
                total_transfer_size: bytes,
                percentage: f64::from(count) / f64::from(total) * 100.0,
                color: (*DOMAIN_PALETTE
                    .get(rank % DOMAIN_PALETTE.len())
                    .unwrap_or(&FALLBACK_COLOR))
                .to_string(),
            })
            .collect();

        Self { domains, total_requests: total, total_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::make_request;

    fn request_with_size(domain: &str, transfer_size: u64) -> RequestRecord {
        let mut request = make_request(&format!("https://{domain}/asset.js"));
        request.transfer_size = transfer_size;
        request
    }

    #[test]
    fn test_empty_requests() {
        let result = DomainAnalytics::compute(&[]);
        assert_eq!(result.total_requests, 0);
        assert_eq!(result.total_size, 0);
        assert!(result.domains.is_empty());
    }

    #[test]
    fn test_single_domain_sums_and_percentage() {
        let requests = vec![
            request_with_size("example.com", 1000),
            request_with_size("example.com", 500),
        ];
        let result = DomainAnalytics::compute(&requests);

        assert_eq!(result.total_requests, 2);
        assert_eq!(result.total_size, 1500);
        assert_eq!(result.domains.len(), 1);
        assert_eq!(result.domains[0].domain, "example.com");
        assert_eq!(result.domains[0].request_count, 2);
        assert!((result.domains[0].percentage - 100.0).abs() < 0.01);
        assert_eq!(result.domains[0].color, DOMAIN_PALETTE[0]);
    }

    #[test]
    fn test_sorted_by_descending_request_count() {
        let requests = vec![
            request_with_size("few.com", 5000),
            request_with_size("many.com", 100),
            request_with_size("many.com", 100),
            request_with_size("many.com", 100),
            request_with_size("medium.com", 1000),
            request_with_size("medium.com", 1000),
        ];
        let result = DomainAnalytics::compute(&requests);

        assert_eq!(result.domains.len(), 3);
        assert_eq!(result.domains[0].domain, "many.com");
        assert_eq!(result.domains[0].request_count, 3);
        assert_eq!(result.domains[1].domain, "medium.com");
        assert_eq!(result.domains[2].domain, "few.com");
    }

    #[test]
    fn test_ties_break_on_domain_name() {
        let requests = vec![
            request_with_size("zeta.com", 10),
            request_with_size("alpha.com", 10),
        ];
        let result = DomainAnalytics::compute(&requests);
        assert_eq!(result.domains[0].domain, "alpha.com");
        assert_eq!(result.domains[1].domain, "zeta.com");
    }

    #[test]
    fn test_palette_cycles_past_eight_domains() {
        let requests: Vec<RequestRecord> = (0..10)
            .map(|i| request_with_size(&format!("d{i:02}.example"), 10))
            .collect();
        let result = DomainAnalytics::compute(&requests);
        assert_eq!(result.domains.len(), 10);
        assert_eq!(result.domains[8].color, DOMAIN_PALETTE[0]);
        assert_eq!(result.domains[9].color, DOMAIN_PALETTE[1]);
    }
}
