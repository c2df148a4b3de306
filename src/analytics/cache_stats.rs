//! Cache lifetime analysis: TTL buckets and problematic resources.

use serde::{Deserialize, Serialize};

use crate::analytics::filename_of;
use crate::domain::RequestRecord;

const MS_HOUR: u64 = 3_600_000;
const MS_DAY: u64 = 86_400_000;
const MS_WEEK: u64 = 604_800_000;

/// Badge classification for a problematic resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheBadge {
    /// No caching at all.
    Missing,
    UnderHour,
    UnderDay,
    UnderWeek,
}

impl CacheBadge {
    pub fn for_lifetime(ms: u64) -> Self {
        if ms == 0 {
            CacheBadge::Missing
        } else if ms < MS_HOUR {
            CacheBadge::UnderHour
        } else if ms < MS_DAY {
            CacheBadge::UnderDay
        } else {
            CacheBadge::UnderWeek
        }
    }

    /// Short badge text rendered next to the resource.
    pub const fn text(&self) -> &'static str {
        match self {
            CacheBadge::Missing => "!",
            CacheBadge::UnderHour => "<1h",
            CacheBadge::UnderDay => "<1d",
            CacheBadge::UnderWeek => "<7d",
        }
    }
}

/// One TTL bucket of the cache distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    pub label: String,
    pub count: u32,
    pub percentage: f64,
    pub color: String,
}

/// A resource cached for less than one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblematicResource {
    pub url: String,
    pub domain: String,
    pub filename: String,
    pub cache_lifetime_ms: u64,
    /// Rounded human-readable TTL, e.g. "30s", "5min", "2h", "3d".
    pub cache_ttl_label: String,
    pub badge: CacheBadge,
    pub resource_size: u64,
}

/// Aggregated cache analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheAnalytics {
    /// Non-empty TTL buckets in ascending lifetime order.
    pub groups: Vec<CacheGroup>,
    /// Resources cached under one week, shortest lifetime first.
    pub problematic_resources: Vec<ProblematicResource>,
    pub total_resources: u32,
    pub problematic_count: u32,
}

impl CacheAnalytics {
    pub fn compute(requests: &[RequestRecord]) -> Self {
        let total = requests.len() as u32;
        if total == 0 {
            return Self {
                groups: vec![],
                problematic_resources: vec![],
                total_resources: 0,
                problematic_count: 0,
            };
        }

        let mut buckets = [0u32; 5];
        for request in requests {
            buckets[bucket_index(request.cache_lifetime_ms)] += 1;
        }

        const BUCKETS: [(&str, &str); 5] = [
            ("none", "#ef4444"),
            ("< 1 hour", "#f59e0b"),
            ("< 1 day", "#eab308"),
            ("< 7 days", "#84cc16"),
            (">= 7 days", "#10b981"),
        ];

        let groups = BUCKETS
            .iter()
            .zip(buckets)
            .filter(|(_, count)| *count > 0)
            .map(|((label, color), count)| CacheGroup {
                label: (*label).to_string(),
                count,
                percentage: f64::from(count) / f64::from(total) * 100.0,
                color: (*color).to_string(),
            })
            .collect();

        let mut short_lived: Vec<&RequestRecord> = requests
            .iter()
            .filter(|r| r.cache_lifetime_ms < MS_WEEK)
            .collect();
        short_lived.sort_by_key(|r| r.cache_lifetime_ms);

        let problematic_resources: Vec<ProblematicResource> = short_lived
            .into_iter()
            .map(|r| ProblematicResource {
                url: r.url.clone(),
                domain: r.domain.clone(),
                filename: match filename_of(&r.url) {
                    name if name.is_empty() => r.url.clone(),
                    name => name,
                },
                cache_lifetime_ms: r.cache_lifetime_ms,
                cache_ttl_label: format_ttl(r.cache_lifetime_ms),
                badge: CacheBadge::for_lifetime(r.cache_lifetime_ms),
                resource_size: r.resource_size,
            })
            .collect();

        let problematic_count = problematic_resources.len() as u32;

        Self {
            groups,
            problematic_resources,
            total_resources: total,
            problematic_count,
        }
    }
}

fn bucket_index(ms: u64) -> usize {
    if ms == 0 {
        0
    } else if ms < MS_HOUR {
        1
    } else if ms < MS_DAY {
        2
    } else if ms < MS_WEEK {
        3
    } else {
        4
    }
}

/// Human-readable TTL, rounded down to the largest whole unit.
fn format_ttl(ms: u64) -> String {
    if ms == 0 {
        return "none".to_string();
    }
    let seconds = ms / 1000;
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}min", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h", seconds / 3600)
    } else {
        format!("{}d", seconds / 86_400)
    }
}
