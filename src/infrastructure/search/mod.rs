// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod bing_api;
pub mod browser;
pub mod query;

use std::time::Duration;

/// User agent sent with every discovery and acquisition request.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// Build the shared HTTP client with connection pooling.
pub fn desktop_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(DESKTOP_USER_AGENT)
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Attach the standard desktop-browser header set to a request.
///
/// Both page fetches and per-link image fetches send these to avoid
/// trivial bot-blocking.
pub fn apply_desktop_headers(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.8")
        .header("Connection", "keep-alive")
        .header("Upgrade-Insecure-Requests", "1")
}
