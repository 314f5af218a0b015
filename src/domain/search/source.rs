// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Page fetch failed or timed out; the controller may retry
    #[error("Discovery transport error: {0}")]
    Transport(String),
    /// Browser session could not be created or was lost; fatal to the run
    #[error("Browser session error: {0}")]
    Session(String),
}

impl DiscoveryError {
    /// Transport failures are transient; session failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DiscoveryError::Transport(_))
    }
}

/// A source of candidate media links.
///
/// The pagination controller depends only on this capability. Both
/// strategies honor the same contract: each call returns the next ordered
/// batch of candidate links, and an empty batch signals exhaustion. The
/// paged API strategy yields one results page per call; the rendered-page
/// strategy yields its entire harvest on the first call and is exhausted
/// afterwards.
#[async_trait]
pub trait LinkSource: Send {
    /// Fetch the next batch of candidate links, in backend ranking order.
    async fn next_batch(&mut self) -> Result<Vec<String>, DiscoveryError>;

    /// Strategy name for logging.
    fn name(&self) -> &'static str;
}
