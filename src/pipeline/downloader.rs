// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Acquisition executor.
//!
//! Workers fetch and validate concurrently under a semaphore; completed
//! results flow through a channel to a single aggregation loop that
//! assigns destination indices, writes files and fires progress
//! notifications, so no counter or seen-state is shared between tasks.

use crate::infrastructure::search::{apply_desktop_headers, desktop_client};
use crate::pipeline::ProgressSink;
use crate::utils::{image_signature, url_utils};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Outcome of one batch handed back to the pagination controller.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful downloads in this batch
    pub downloaded: usize,
    /// Links attempted, including failures
    pub attempted: usize,
    /// Source URL of each persisted file, in persistence order
    pub sources: Vec<String>,
}

struct Fetched {
    link: String,
    bytes: Vec<u8>,
}

/// Bounded-concurrency download-validate-persist executor.
pub struct Downloader {
    client: reqwest::Client,
    timeout: Duration,
    workers: usize,
}

impl Downloader {
    /// `requested_workers` is clamped to `1..=max_workers`; pool size 1
    /// degrades to sequential execution.
    pub fn new(timeout: Duration, requested_workers: usize, max_workers: usize) -> Self {
        let workers = requested_workers.clamp(1, max_workers.max(1));
        Self {
            client: desktop_client(timeout),
            timeout,
            workers,
        }
    }

    /// Effective worker-pool size after clamping.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Download an accepted batch.
    ///
    /// Every failure (transport, HTTP status, signature, write) drops the
    /// link and moves on; nothing in a batch is retried. Destination
    /// indices continue from `already_accepted`, and the batch stops
    /// consuming results once `quota` files are written, abandoning any
    /// fetch still in flight.
    pub async fn acquire_batch(
        &self,
        links: Vec<String>,
        output_dir: &Path,
        base_name: &str,
        already_accepted: usize,
        quota: usize,
        progress: &dyn ProgressSink,
    ) -> BatchOutcome {
        let attempted = links.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let (tx, mut rx) = mpsc::channel::<Fetched>(self.workers);

        let mut tasks = JoinSet::new();
        for link in links {
            let semaphore = semaphore.clone();
            let tx = tx.clone();
            let client = self.client.clone();
            let timeout = self.timeout;
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                match fetch_and_validate(&client, &link, timeout).await {
                    Ok(fetched) => {
                        // Receiver gone means the quota was already filled.
                        let _ = tx.send(fetched).await;
                    }
                    Err(reason) => warn!("dropping {}: {}", link, reason),
                }
            });
        }
        drop(tx);

        // Single-writer aggregation point.
        let mut downloaded = 0usize;
        let mut sources = Vec::new();
        while downloaded < quota {
            let Some(fetched) = rx.recv().await else {
                break;
            };
            let index = already_accepted + downloaded + 1;
            let file_name = url_utils::destination_name(base_name, index, &fetched.link);
            let path = output_dir.join(&file_name);
            match tokio::fs::write(&path, &fetched.bytes).await {
                Ok(()) => {
                    downloaded += 1;
                    info!("downloaded image #{} from {}", index, fetched.link);
                    sources.push(fetched.link);
                    progress.on_downloaded(already_accepted + downloaded);
                }
                Err(e) => error!("failed to write {}: {}", path.display(), e),
            }
        }

        // Quota reached or channel drained: abandon in-flight fetches.
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}

        debug!("batch complete: {} of {} links downloaded", downloaded, attempted);
        BatchOutcome {
            downloaded,
            attempted,
            sources,
        }
    }
}

async fn fetch_and_validate(
    client: &reqwest::Client,
    link: &str,
    timeout: Duration,
) -> Result<Fetched, String> {
    let response = tokio::time::timeout(timeout, apply_desktop_headers(client.get(link)).send())
        .await
        .map_err(|_| "fetch timed out".to_string())?
        .map_err(|e| format!("fetch failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status));
    }

    let bytes = tokio::time::timeout(timeout, response.bytes())
        .await
        .map_err(|_| "body read timed out".to_string())?
        .map_err(|e| format!("body read failed: {}", e))?
        .to_vec();

    // The extension is only a naming hint; bytes decide what gets saved.
    if !image_signature::is_image(&bytes) {
        return Err("no recognized media signature".to_string());
    }

    Ok(Fetched {
        link: link.to_string(),
        bytes,
    })
}
