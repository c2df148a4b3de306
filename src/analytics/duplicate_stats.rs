//! Duplicate resource detection.
//!
//! Two requests are considered the same resource when they share a
//! filename and a decompressed size. The same bundle served from two CDNs
//! matches; same-named files with different content do not.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analytics::filename_of;
use crate::domain::RequestRecord;

/// A set of requests loading the same resource more than once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub filename: String,
    /// Decompressed size of each copy, bytes.
    pub resource_size: u64,
    pub resource_type: String,
    /// Every URL that loaded this resource.
    pub urls: Vec<String>,
    /// Unique domains, sorted.
    pub domains: Vec<String>,
    /// Bytes spent on copies beyond the first: `(n - 1) * size`.
    pub wasted_bytes: u64,
}

/// Aggregated duplicate analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateAnalytics {
    /// Groups with two or more occurrences, most wasteful first.
    pub duplicates: Vec<DuplicateGroup>,
    pub total_wasted_bytes: u64,
    pub duplicate_count: u32,
}

impl DuplicateAnalytics {
    pub fn compute(requests: &[RequestRecord]) -> Self {
        if requests.is_empty() {
            return Self { duplicates: vec![], total_wasted_bytes: 0, duplicate_count: 0 };
        }

        let mut groups: HashMap<(String, u64), (Vec<String>, String)> = HashMap::new();
        for request in requests {
            let filename = filename_of(&request.url);
            // The default document name carries no identity worth matching.
            if filename.is_empty() || filename == "index.html" {
                continue;
            }
            let entry = groups
                .entry((filename, request.resource_size))
                .or_insert_with(|| (vec![], request.resource_type.as_str().to_string()));
            entry.0.push(request.url.clone());
        }

        let mut duplicates: Vec<DuplicateGroup> = groups
            .into_iter()
            .filter(|(_, (urls, _))| urls.len() > 1)
            .map(|((filename, resource_size), (urls, resource_type))| {
                let mut domains: Vec<String> = urls
                    .iter()
                    .filter_map(|u| {
                        url::Url::parse(u).ok().and_then(|p| p.host_str().map(str::to_string))
                    })
                    .collect();
                domains.sort();
                domains.dedup();

                let wasted_bytes = (urls.len() as u64 - 1) * resource_size;

                DuplicateGroup {
                    filename,
                    resource_size,
                    resource_type,
                    urls,
                    domains,
                    wasted_bytes,
                }
            })
            .collect();

        duplicates.sort_by(|a, b| {
            b.wasted_bytes
                .cmp(&a.wasted_bytes)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        let total_wasted_bytes = duplicates.iter().map(|d| d.wasted_bytes).sum();
        let duplicate_count = duplicates.len() as u32;

        Self { duplicates, total_wasted_bytes, duplicate_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::make_request;

    fn request_with_size(url: &str, resource_size: u64) -> RequestRecord {
        let mut request = make_request(url);
        request.resource_size = resource_size;
        request
    }

    #[test]
    fn test_empty_requests() {
        let result = DuplicateAnalytics::compute(&[]);
        assert_eq!(result.duplicate_count, 0);
        assert_eq!(result.total_wasted_bytes, 0);
    }

    #[test]
    fn test_distinct_files_are_not_duplicates() {
        let requests = vec![
            request_with_size("https://example.com/a.js", 1000),
            request_with_size("https://example.com/b.js", 2000),
        ];
        assert_eq!(DuplicateAnalytics::compute(&requests).duplicate_count, 0);
    }

    #[test]
    fn test_same_name_different_size_is_not_a_duplicate() {
        let requests = vec![
            request_with_size("https://cdn1.com/app.js", 1000),
            request_with_size("https://cdn2.com/app.js", 2000),
        ];
        assert_eq!(DuplicateAnalytics::compute(&requests).duplicate_count, 0);
    }

    #[test]
    fn test_index_html_and_bare_paths_are_skipped() {
        let requests = vec![
            request_with_size("https://a.com/index.html", 500),
            request_with_size("https://b.com/index.html", 500),
            request_with_size("https://a.com/", 500),
            request_with_size("https://b.com/", 500),
        ];
        assert_eq!(DuplicateAnalytics::compute(&requests).duplicate_count, 0);
    }

    #[test]
    fn test_three_copies_across_domains() {
        let requests = vec![
            request_with_size("https://cdn1.com/app.js", 2000),
            request_with_size("https://cdn2.com/app.js", 2000),
            request_with_size("https://cdn3.com/app.js", 2000),
        ];
        let result = DuplicateAnalytics::compute(&requests);

        assert_eq!(result.duplicate_count, 1);
        let group = &result.duplicates[0];
        assert_eq!(group.filename, "app.js");
        assert_eq!(group.urls.len(), 3);
        assert_eq!(group.domains.len(), 3);
        assert_eq!(group.wasted_bytes, 4000);
        assert_eq!(result.total_wasted_bytes, 4000);
    }

    #[test]
    fn test_sorted_by_descending_waste() {
        let requests = vec![
            request_with_size("https://cdn1.com/small.js", 1000),
            request_with_size("https://cdn2.com/small.js", 1000),
            request_with_size("https://cdn1.com/large.js", 10_000),
            request_with_size("https://cdn2.com/large.js", 10_000),
            request_with_size("https://cdn3.com/large.js", 10_000),
        ];
        let result = DuplicateAnalytics::compute(&requests);

        assert_eq!(result.duplicate_count, 2);
        assert_eq!(result.duplicates[0].filename, "large.js");
        assert_eq!(result.duplicates[0].wasted_bytes, 20_000);
        assert_eq!(result.duplicates[1].filename, "small.js");
        assert_eq!(result.duplicates[1].wasted_bytes, 1000);
        assert_eq!(result.total_wasted_bytes, 21_000);
    }
}
