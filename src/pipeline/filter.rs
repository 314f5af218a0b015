// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use tracing::{debug, info};

/// Dedup and exclusion filtering.
///
/// Owns the set of links already accepted this run. Acceptance and
/// seen-set insertion happen in the same pass, so replaying a page yields
/// nothing new.
pub struct LinkFilter {
    seen: HashSet<String>,
    exclusions: Vec<String>,
}

impl LinkFilter {
    pub fn new(exclusions: Vec<String>) -> Self {
        if !exclusions.is_empty() {
            info!("download links will not include: {}", exclusions.join(", "));
        }
        Self {
            seen: HashSet::new(),
            exclusions,
        }
    }

    /// Return the links that are new and non-excluded, capped at `quota`,
    /// marking them seen.
    pub fn accept_batch(&mut self, links: &[String], quota: usize) -> Vec<String> {
        let mut accepted = Vec::new();
        for link in links {
            if accepted.len() >= quota {
                break;
            }
            if self.seen.contains(link) {
                continue;
            }
            if let Some(excluded) = self
                .exclusions
                .iter()
                .find(|pattern| link.contains(pattern.as_str()))
            {
                debug!("link excluded by '{}': {}", excluded, link);
                continue;
            }
            self.seen.insert(link.clone());
            accepted.push(link.clone());
        }
        accepted
    }

    /// Number of links accepted so far this run.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_accepts_new_links_in_order() {
        let mut filter = LinkFilter::new(vec![]);
        let batch = links(&["https://a/1.jpg", "https://a/2.jpg"]);

        assert_eq!(filter.accept_batch(&batch, 10), batch);
        assert_eq!(filter.seen_count(), 2);
    }

    #[test]
    fn test_replayed_page_yields_nothing() {
        let mut filter = LinkFilter::new(vec![]);
        let batch = links(&["https://a/1.jpg", "https://a/2.jpg"]);

        assert_eq!(filter.accept_batch(&batch, 10).len(), 2);
        assert!(filter.accept_batch(&batch, 10).is_empty());
        assert_eq!(filter.seen_count(), 2);
    }

    #[test]
    fn test_exclusion_substrings() {
        let mut filter = LinkFilter::new(vec!["spam.example".to_string(), "ads.".to_string()]);
        let batch = links(&[
            "https://good.example/cat.jpg",
            "https://spam.example/cat.jpg",
            "https://cdn.ads.example/cat.jpg",
            "https://another-good.example/cat.png",
        ]);

        let accepted = filter.accept_batch(&batch, 10);
        assert_eq!(
            accepted,
            links(&[
                "https://good.example/cat.jpg",
                "https://another-good.example/cat.png"
            ])
        );
    }

    #[test]
    fn test_quota_truncation() {
        let mut filter = LinkFilter::new(vec![]);
        let batch = links(&["https://a/1.jpg", "https://a/2.jpg", "https://a/3.jpg"]);

        let accepted = filter.accept_batch(&batch, 2);
        assert_eq!(accepted.len(), 2);
        // Links beyond the quota were not marked seen and stay eligible.
        assert_eq!(filter.accept_batch(&batch, 2), links(&["https://a/3.jpg"]));
    }

    #[test]
    fn test_zero_quota_accepts_nothing() {
        let mut filter = LinkFilter::new(vec![]);
        let batch = links(&["https://a/1.jpg"]);

        assert!(filter.accept_batch(&batch, 0).is_empty());
        assert_eq!(filter.seen_count(), 0);
    }

    #[test]
    fn test_duplicates_within_one_page() {
        let mut filter = LinkFilter::new(vec![]);
        let batch = links(&["https://a/1.jpg", "https://a/1.jpg", "https://a/2.jpg"]);

        assert_eq!(filter.accept_batch(&batch, 10).len(), 2);
    }
}
