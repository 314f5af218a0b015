// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod controller;
pub mod downloader;
pub mod filter;

/// Observer notified after each successful download.
///
/// The pipeline has no opinion on rendering; callers plug in a progress
/// bar, a log line, or nothing.
pub trait ProgressSink: Send + Sync {
    /// Called with the cumulative accepted count after each success.
    fn on_downloaded(&self, accepted: usize);
}

/// Sink that discards every notification.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_downloaded(&self, _accepted: usize) {}
}

/// Outcome of a whole run.
///
/// A run that found fewer images than requested is still a success;
/// `accepted` reports what was achievable.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// Files persisted, never exceeds the job limit
    pub accepted: usize,
    /// Links handed to the executor, including failures
    pub attempted: usize,
    /// Source URL of every persisted file
    pub sources: Vec<String>,
}
