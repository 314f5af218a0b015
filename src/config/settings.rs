// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Pipeline tunables.
///
/// The retry, backoff and settle constants were historically hard-coded;
/// they are configuration here so operators can adjust them per deployment
/// without a rebuild.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Link-discovery tunables
    pub discovery: DiscoverySettings,
    /// Acquisition-executor tunables
    pub download: DownloadSettings,
}

/// Link-discovery tunables
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    /// Results per page on the paged API endpoint
    pub page_size: usize,
    /// Retry budget for a failed page fetch
    pub max_retries: u32,
    /// Base backoff between page-fetch retries (milliseconds)
    pub retry_backoff_ms: u64,
    /// Settle interval after each lazy-load action in the browser (milliseconds)
    pub settle_ms: u64,
}

/// Acquisition-executor tunables
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSettings {
    /// Upper clamp for the worker pool; requests are clamped to 1..=max_workers
    pub max_workers: usize,
}

impl DiscoverySettings {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Settings {
    /// Load settings from defaults, an optional config file and the
    /// environment (prefix `IMGDL`, `__` separator).
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            .set_default("discovery.page_size", 35)?
            .set_default("discovery.max_retries", 3)?
            .set_default("discovery.retry_backoff_ms", 500)?
            .set_default("discovery.settle_ms", 2000)?
            .set_default("download.max_workers", 16)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("IMGDL").separator("__"));

        builder.build()?.try_deserialize()
    }
}
