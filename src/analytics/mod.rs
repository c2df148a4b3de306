//! Request analytics: four independent pure transforms over the captured
//! request list.
//!
//! Each view is recomputed on demand from `&[RequestRecord]` and owns no
//! state. Empty input always yields empty, zero-total structures - the
//! aggregator has no failure path.

pub mod cache_stats;
pub mod domain_stats;
pub mod duplicate_stats;
pub mod protocol_stats;

pub use cache_stats::{CacheAnalytics, CacheBadge, CacheGroup, ProblematicResource};
pub use domain_stats::{DomainAnalytics, DomainStat};
pub use duplicate_stats::{DuplicateAnalytics, DuplicateGroup};
pub use protocol_stats::{ProtocolAnalytics, ProtocolStat};

use serde::{Deserialize, Serialize};

use crate::domain::RequestRecord;

/// All four analytics views computed over one request list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAnalytics {
    /// Requests grouped by hostname.
    pub domain_stats: DomainAnalytics,
    /// Protocol distribution in fixed display order.
    pub protocol_stats: ProtocolAnalytics,
    /// Cache TTL buckets and problematic resources.
    pub cache_stats: CacheAnalytics,
    /// Duplicate resource detection.
    pub duplicate_stats: DuplicateAnalytics,
}

impl RequestAnalytics {
    /// Compute every view from the request list.
    pub fn compute(requests: &[RequestRecord]) -> Self {
        Self {
            domain_stats: DomainAnalytics::compute(requests),
            protocol_stats: ProtocolAnalytics::compute(requests),
            cache_stats: CacheAnalytics::compute(requests),
            duplicate_stats: DuplicateAnalytics::compute(requests),
        }
    }
}

/// Last path segment of a URL, with the query string already stripped by
/// the URL parser. Empty for bare hosts or unparseable input.
pub(crate) fn filename_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments()?.next_back().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{RequestRecord, ResourceKind};

    /// Baseline request fixture; tests override the fields they care about.
    pub fn make_request(url: &str) -> RequestRecord {
        let domain = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        RequestRecord {
            url: url.to_string(),
            domain,
            protocol: "h2".to_string(),
            status_code: 200,
            mime_type: "application/javascript".to_string(),
            resource_type: ResourceKind::Script,
            transfer_size: 1000,
            resource_size: 2000,
            priority: "High".to_string(),
            start_time: 0.0,
            end_time: 100.0,
            duration: 100.0,
            from_cache: false,
            cache_lifetime_ms: 0,
        }
    }
}
