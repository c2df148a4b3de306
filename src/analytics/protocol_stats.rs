//! Protocol distribution over the captured requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::RequestRecord;

/// Canonical protocol labels in their fixed display order. The order is
/// part of the output contract and never depends on counts.
pub const PROTOCOL_ORDER: [&str; 4] = ["HTTP/3", "HTTP/2", "HTTP/1.1", "Other"];

/// Statistics for a single protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolStat {
    pub protocol: String,
    pub count: u32,
    pub percentage: f64,
    pub color: String,
}

/// Aggregated protocol analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolAnalytics {
    /// Protocols seen at least once, in `PROTOCOL_ORDER`.
    pub protocols: Vec<ProtocolStat>,
    pub total_requests: u32,
}

impl ProtocolAnalytics {
    pub fn compute(requests: &[RequestRecord]) -> Self {
        let total = requests.len() as u32;
        if total == 0 {
            return Self { protocols: vec![], total_requests: 0 };
        }

        let mut counts: HashMap<&'static str, u32> = HashMap::new();
        for request in requests {
            *counts.entry(normalize_protocol(&request.protocol)).or_insert(0) += 1;
        }

        let protocols = PROTOCOL_ORDER
            .iter()
            .filter_map(|&label| {
                counts.get(label).map(|&count| ProtocolStat {
                    protocol: label.to_string(),
                    count,
                    percentage: f64::from(count) / f64::from(total) * 100.0,
                    color: protocol_color(label).to_string(),
                })
            })
            .collect();

        Self { protocols, total_requests: total }
    }
}

/// Normalize a raw browser protocol string into a canonical label.
pub fn normalize_protocol(raw: &str) -> &'static str {
    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("h3") || lowered.contains("quic") {
        "HTTP/3"
    } else if lowered.starts_with("h2") || lowered.starts_with("http/2") {
        "HTTP/2"
    } else if lowered.starts_with("http/1") {
        "HTTP/1.1"
    } else {
        "Other"
    }
}

fn protocol_color(label: &str) -> &'static str {
    match label {
        "HTTP/3" => "#10b981",
        "HTTP/2" => "#3b82f6",
        "HTTP/1.1" => "#f59e0b",
        _ => "#6b7280",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::make_request;

    fn request_with_protocol(protocol: &str) -> RequestRecord {
        let mut request = make_request("https://example.com/asset.js");
        request.protocol = protocol.to_string();
        request
    }

    #[test]
    fn test_empty_requests() {
        let result = ProtocolAnalytics::compute(&[]);
        assert_eq!(result.total_requests, 0);
        assert!(result.protocols.is_empty());
    }

    #[test]
    fn test_normalization_table() {
        assert_eq!(normalize_protocol("h2"), "HTTP/2");
        assert_eq!(normalize_protocol("H2"), "HTTP/2");
        assert_eq!(normalize_protocol("http/2"), "HTTP/2");
        assert_eq!(normalize_protocol("http/2.0"), "HTTP/2");
        assert_eq!(normalize_protocol("h3"), "HTTP/3");
        assert_eq!(normalize_protocol("h3-29"), "HTTP/3");
        assert_eq!(normalize_protocol("quic"), "HTTP/3");
        assert_eq!(normalize_protocol("http/1.1"), "HTTP/1.1");
        assert_eq!(normalize_protocol("http/1.0"), "HTTP/1.1");
        assert_eq!(normalize_protocol("spdy"), "Other");
        assert_eq!(normalize_protocol(""), "Other");
    }

    #[test]
    fn test_fixed_display_order() {
        let requests = vec![
            request_with_protocol("http/1.1"),
            request_with_protocol("h2"),
            request_with_protocol("h2"),
            request_with_protocol("h3"),
        ];
        let result = ProtocolAnalytics::compute(&requests);

        assert_eq!(result.total_requests, 4);
        let labels: Vec<&str> = result.protocols.iter().map(|p| p.protocol.as_str()).collect();
        assert_eq!(labels, vec!["HTTP/3", "HTTP/2", "HTTP/1.1"]);
        assert_eq!(result.protocols[1].count, 2);
        assert!((result.protocols[1].percentage - 50.0).abs() < 0.01);
    }
}
