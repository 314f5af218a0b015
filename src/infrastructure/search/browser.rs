// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Rendered-page link discovery.
//!
//! Drives a headless browser to the search URL, simulates the lazy-load
//! interactions (scroll to bottom, "show more" activation) until the result
//! count stagnates or the requested maximum is realized, then extracts the
//! authoritative URL from each result element. More resilient to markup
//! changes than the async-endpoint regex, at the cost of browser startup
//! and wall-clock time.

use crate::domain::models::search_query::{SearchBackend, SearchQuery};
use crate::domain::search::source::{DiscoveryError, LinkSource};
use crate::infrastructure::search::query;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Google realizes the full-resolution URL inside the result element only
/// after the thumbnail has been activated.
static GOOGLE_IMGURL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"imgurl=(\S*?)&amp;imgrefurl").expect("imgurl pattern compiles"));

/// Extract full-resolution URLs from rendered Google results markup.
pub fn extract_google_links(html: &str, max: usize) -> Vec<String> {
    GOOGLE_IMGURL_PATTERN
        .captures_iter(html)
        .take(max)
        .filter_map(|cap| cap.get(1))
        .map(|m| {
            urlencoding::decode(m.as_str())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| m.as_str().to_string())
        })
        .collect()
}

/// Pull `murl` out of a Bing result element's `m` attribute (a JSON blob).
pub fn murl_from_meta(meta: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(meta).ok()?;
    value
        .get("murl")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Browser session options supplied by the caller.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Upstream proxy address, e.g. "127.0.0.1:1080"
    pub proxy: Option<String>,
    /// Proxy scheme, e.g. "http" or "socks5"
    pub proxy_scheme: String,
    /// Wait after each lazy-load action before re-counting
    pub settle: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            proxy: None,
            proxy_scheme: "http".to_string(),
            settle: Duration::from_secs(2),
        }
    }
}

/// Rendered-page link source.
///
/// Produces its whole harvest on the first `next_batch` call and reports
/// exhaustion afterwards, so it is substitutable anywhere the API strategy
/// is used.
pub struct BrowserSource {
    backend: SearchBackend,
    query_url: String,
    max_links: usize,
    options: BrowserOptions,
    drained: bool,
}

impl BrowserSource {
    pub fn new(
        backend: SearchBackend,
        search: &SearchQuery,
        max_links: usize,
        options: BrowserOptions,
    ) -> Self {
        let query_url = match backend {
            SearchBackend::Bing => query::bing_search_url(search),
            SearchBackend::Google => query::google_search_url(search),
        };
        Self {
            backend,
            query_url,
            max_links,
            options,
            drained: false,
        }
    }

    async fn harvest(&self) -> Result<Vec<String>, DiscoveryError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .request_timeout(Duration::from_secs(30))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !self.options.headless {
            builder = builder.with_head();
        }
        if let Some(proxy) = &self.options.proxy {
            builder = builder.arg(format!(
                "--proxy-server={}://{}",
                self.options.proxy_scheme, proxy
            ));
        }

        let config = builder.build().map_err(DiscoveryError::Session)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DiscoveryError::Session(format!("failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = self.harvest_links(&browser).await;

        browser.close().await.ok();
        handler_task.abort();
        result
    }

    async fn harvest_links(&self, browser: &Browser) -> Result<Vec<String>, DiscoveryError> {
        info!("navigating to {}", self.query_url);
        let page = browser
            .new_page(self.query_url.as_str())
            .await
            .map_err(|e| DiscoveryError::Session(format!("failed to open page: {}", e)))?;

        // Let the initial result grid render before counting anything.
        tokio::time::sleep(self.options.settle).await;

        let result_class = match self.backend {
            SearchBackend::Bing => "iusc",
            SearchBackend::Google => "rg_i",
        };
        let show_more_selector = match self.backend {
            SearchBackend::Bing => ".btn_seemore",
            SearchBackend::Google => ".mye4qd",
        };

        let mut realized = 0usize;
        let mut show_more_clicked = false;
        loop {
            let count = self.count_elements(&page, result_class).await?;
            debug!("{} result elements realized", count);

            if count >= self.max_links {
                break;
            }
            if count > realized {
                realized = count;
                show_more_clicked = false;
                self.scroll_to_bottom(&page).await?;
            } else if !show_more_clicked {
                // Stagnant: the "show more" control gates the next chunk
                // when infinite scroll stops feeding results.
                match page.find_element(show_more_selector).await {
                    Ok(element) => {
                        debug!("activating show-more control");
                        show_more_clicked = true;
                        if element.click().await.is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            } else {
                break;
            }

            tokio::time::sleep(self.options.settle).await;
        }

        match self.backend {
            SearchBackend::Bing => self.extract_bing(&page).await,
            SearchBackend::Google => self.extract_google(&page).await,
        }
    }

    async fn count_elements(&self, page: &Page, class_name: &str) -> Result<usize, DiscoveryError> {
        page.evaluate(format!(
            "document.getElementsByClassName('{}').length",
            class_name
        ))
        .await
        .map_err(|e| DiscoveryError::Session(format!("element count failed: {}", e)))?
        .into_value::<usize>()
        .map_err(|e| DiscoveryError::Session(format!("element count not a number: {}", e)))
    }

    async fn scroll_to_bottom(&self, page: &Page) -> Result<(), DiscoveryError> {
        page.evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| DiscoveryError::Session(format!("scroll failed: {}", e)))?;
        Ok(())
    }

    /// Bing embeds the authoritative URL in each result element's
    /// structured `m` attribute; no per-element interaction needed.
    async fn extract_bing(&self, page: &Page) -> Result<Vec<String>, DiscoveryError> {
        let metas: Vec<String> = page
            .evaluate(
                "Array.from(document.getElementsByClassName('iusc'))\
                 .map(e => e.getAttribute('m') || '')",
            )
            .await
            .map_err(|e| DiscoveryError::Session(format!("attribute harvest failed: {}", e)))?
            .into_value()
            .map_err(|e| DiscoveryError::Session(format!("attribute harvest malformed: {}", e)))?;

        let mut links = Vec::new();
        for meta in metas {
            if links.len() >= self.max_links {
                break;
            }
            match murl_from_meta(&meta) {
                Some(murl) => links.push(murl),
                None => warn!("result element carried no parsable media URL"),
            }
        }
        info!("extracted {} links from rendered page", links.len());
        Ok(links)
    }

    /// Google only materializes the full-resolution URL after the thumbnail
    /// is activated; clicks that fail (element not yet interactable) get one
    /// retry pass after the first full pass.
    async fn extract_google(&self, page: &Page) -> Result<Vec<String>, DiscoveryError> {
        let thumbnails = page
            .find_elements(".rg_i")
            .await
            .map_err(|e| DiscoveryError::Session(format!("thumbnail lookup failed: {}", e)))?;

        let mut retry_click = Vec::new();
        for (i, thumbnail) in thumbnails.iter().take(self.max_links).enumerate() {
            if i != 0 && i % 50 == 0 {
                debug!("{} thumbnails activated", i);
            }
            if thumbnail.click().await.is_err() {
                retry_click.push(thumbnail);
            }
        }

        if !retry_click.is_empty() {
            debug!("retrying {} failed thumbnail activations", retry_click.len());
            for thumbnail in retry_click {
                if let Err(e) = thumbnail.click().await {
                    warn!("thumbnail activation failed twice, skipping: {}", e);
                }
            }
        }

        tokio::time::sleep(self.options.settle).await;

        let html = page
            .content()
            .await
            .map_err(|e| DiscoveryError::Session(format!("page content failed: {}", e)))?;
        let links = extract_google_links(&html, self.max_links);
        info!("extracted {} links from rendered page", links.len());
        Ok(links)
    }
}

#[async_trait]
impl LinkSource for BrowserSource {
    async fn next_batch(&mut self) -> Result<Vec<String>, DiscoveryError> {
        if self.drained {
            return Ok(Vec::new());
        }
        self.drained = true;
        self.harvest().await
    }

    fn name(&self) -> &'static str {
        match self.backend {
            SearchBackend::Bing => "bing-browser",
            SearchBackend::Google => "google-browser",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_murl_from_meta() {
        let meta = r#"{"murl":"https://example.com/full.jpg","turl":"https://t.example/x"}"#;
        assert_eq!(
            murl_from_meta(meta).as_deref(),
            Some("https://example.com/full.jpg")
        );
    }

    #[test]
    fn test_murl_from_meta_rejects_malformed() {
        assert_eq!(murl_from_meta(""), None);
        assert_eq!(murl_from_meta("not json"), None);
        assert_eq!(murl_from_meta(r#"{"turl":"https://t.example/x"}"#), None);
    }

    #[test]
    fn test_extract_google_links_decodes() {
        let html = concat!(
            r#"<a href="/imgres?imgurl=https%3A%2F%2Fexample.com%2Fa.jpg&amp;imgrefurl=x">"#,
            r#"<a href="/imgres?imgurl=https%3A%2F%2Fexample.com%2Fb.png&amp;imgrefurl=y">"#,
        );
        let links = extract_google_links(html, 10);

        assert_eq!(
            links,
            vec!["https://example.com/a.jpg", "https://example.com/b.png"]
        );
    }

    #[test]
    fn test_extract_google_links_respects_max() {
        let html = r#"imgurl=https%3A%2F%2Fa%2F1.jpg&amp;imgrefurl imgurl=https%3A%2F%2Fa%2F2.jpg&amp;imgrefurl"#;
        assert_eq!(extract_google_links(html, 1).len(), 1);
    }

    #[test]
    fn test_query_url_follows_backend() {
        let search = SearchQuery::new("cat");
        let bing = BrowserSource::new(
            SearchBackend::Bing,
            &search,
            10,
            BrowserOptions::default(),
        );
        let google = BrowserSource::new(
            SearchBackend::Google,
            &search,
            10,
            BrowserOptions::default(),
        );

        assert!(bing.query_url.starts_with("https://www.bing.com/images/search"));
        assert!(google.query_url.starts_with("https://www.google.com/search?tbm=isch"));
        assert_eq!(bing.name(), "bing-browser");
        assert_eq!(google.name(), "google-browser");
    }
}
