// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DiscoverySettings;
use crate::domain::models::search_query::SearchQuery;
use crate::domain::search::source::{DiscoveryError, LinkSource};
use crate::infrastructure::search::{apply_desktop_headers, desktop_client, query};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info};

/// Media URLs are embedded in the async results page as HTML-entity-escaped
/// JSON; `murl` carries the full-resolution image URL.
static MURL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("murl&quot;:&quot;(.*?)&quot;").expect("murl pattern compiles"));

/// Extract candidate media URLs from one page of raw response text,
/// in backend ranking order. An empty result is the exhaustion signal,
/// not a fault.
pub fn extract_links(html: &str) -> Vec<String> {
    MURL_PATTERN
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// API-strategy link source against Bing's paged async endpoint.
///
/// Each `next_batch` call fetches one results page and advances the
/// `first` offset by the page size. Overlap between pages is expected;
/// dedup is the filter stage's job. Exhaustion is reported when a page
/// is empty, unparseable, or exactly duplicates the previous page.
pub struct BingApiSource {
    client: reqwest::Client,
    query: SearchQuery,
    base_url: String,
    timeout: Duration,
    page_size: usize,
    first: usize,
    previous_page: Vec<String>,
    exhausted: bool,
}

impl BingApiSource {
    pub fn new(query: SearchQuery, timeout: Duration, settings: &DiscoverySettings) -> Self {
        Self::with_base_url(query, timeout, settings, "https://www.bing.com".to_string())
    }

    /// Point the source at a different host. Used by tests.
    pub fn with_base_url(
        query: SearchQuery,
        timeout: Duration,
        settings: &DiscoverySettings,
        base_url: String,
    ) -> Self {
        Self {
            client: desktop_client(timeout),
            query,
            base_url,
            timeout,
            page_size: settings.page_size,
            first: 0,
            previous_page: Vec::new(),
            exhausted: false,
        }
    }

    fn page_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url,
            query::bing_async_path(&self.query, self.first, self.page_size)
        )
    }
}

#[async_trait]
impl LinkSource for BingApiSource {
    async fn next_batch(&mut self) -> Result<Vec<String>, DiscoveryError> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let url = self.page_url();
        debug!("fetching results page at offset {}", self.first);

        let response = tokio::time::timeout(
            self.timeout,
            apply_desktop_headers(self.client.get(&url)).send(),
        )
        .await
        .map_err(|_| DiscoveryError::Transport(format!("page fetch timed out: {}", url)))?
        .map_err(|e| DiscoveryError::Transport(format!("page fetch failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Transport(format!(
                "HTTP {} from {}",
                status, url
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| DiscoveryError::Transport(format!("failed to read page body: {}", e)))?;

        let links = extract_links(&html);
        if links.is_empty() {
            info!("no result markers on page, discovery exhausted");
            self.exhausted = true;
            return Ok(Vec::new());
        }

        // A page identical to the last one means the backend has stopped
        // making forward progress.
        if links == self.previous_page {
            info!("results page duplicates the previous page, discovery exhausted");
            self.exhausted = true;
            return Ok(Vec::new());
        }

        debug!("extracted {} candidate links at offset {}", links.len(), self.first);
        self.previous_page = links.clone();
        self.first += self.page_size;
        Ok(links)
    }

    fn name(&self) -> &'static str {
        "bing-api"
    }
}
