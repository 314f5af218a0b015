// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::search_query::SearchQuery;
use std::path::PathBuf;
use std::time::Duration;

/// One download run, built once from caller input.
///
/// Carries everything the pipeline needs so no component reaches for
/// ambient process-wide state.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    /// The search to run
    pub query: SearchQuery,
    /// Hard cap on accepted downloads
    pub limit: usize,
    /// Directory files are written into (must already exist)
    pub output_dir: PathBuf,
    /// Filename stem: files land at `{output_dir}/{base_name}_{index}.{ext}`
    pub base_name: String,
    /// Per-request network timeout (page fetches and per-link fetches)
    pub timeout: Duration,
    /// Links containing any of these substrings are rejected
    pub exclusions: Vec<String>,
    /// Requested worker-pool size, clamped by the executor
    pub workers: usize,
}

impl DownloadJob {
    pub fn new(query: SearchQuery, limit: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            query,
            limit,
            output_dir: output_dir.into(),
            base_name: "Image".to_string(),
            timeout: Duration::from_secs(60),
            exclusions: Vec::new(),
            workers: 4,
        }
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}
