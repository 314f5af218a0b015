// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DiscoverySettings;
use crate::domain::models::job::DownloadJob;
use crate::domain::search::source::{DiscoveryError, LinkSource};
use crate::pipeline::downloader::Downloader;
use crate::pipeline::filter::LinkFilter;
use crate::pipeline::{ProgressSink, RunReport};
use crate::utils::retry_policy::RetryPolicy;
use tracing::{debug, info, warn};

enum ControllerState {
    /// Awaiting a page of results from the link source
    Requesting,
    /// Filtering the received links and running acquisition
    Processing(Vec<String>),
    /// Terminal
    Done,
}

/// Drives discovery page by page until the quota is filled or the source
/// is exhausted.
///
/// Strictly sequential: the next page is not requested until the current
/// batch's acquisition has fully completed, so the remaining quota is
/// always exact when links are accepted.
pub struct PaginationController {
    retry: RetryPolicy,
}

impl PaginationController {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    pub fn from_settings(settings: &DiscoverySettings) -> Self {
        Self::new(RetryPolicy::fast(
            settings.max_retries,
            settings.retry_backoff(),
        ))
    }

    /// Run the full pipeline for one job.
    ///
    /// Only a non-retryable discovery failure (a lost browser session) is
    /// an error; running out of results returns whatever was accepted.
    pub async fn run(
        &self,
        job: &DownloadJob,
        source: &mut dyn LinkSource,
        downloader: &Downloader,
        progress: &dyn ProgressSink,
    ) -> Result<RunReport, DiscoveryError> {
        let mut filter = LinkFilter::new(job.exclusions.clone());
        let mut report = RunReport::default();
        let mut page = 0usize;
        let mut state = ControllerState::Requesting;

        loop {
            state = match state {
                ControllerState::Requesting => {
                    if report.accepted >= job.limit {
                        ControllerState::Done
                    } else {
                        page += 1;
                        debug!("requesting results page {} from {}", page, source.name());
                        match self.request_with_retry(source).await? {
                            Some(links) if !links.is_empty() => {
                                ControllerState::Processing(links)
                            }
                            _ => {
                                info!("discovery exhausted after {} page(s)", page);
                                ControllerState::Done
                            }
                        }
                    }
                }
                ControllerState::Processing(links) => {
                    let quota = job.limit - report.accepted;
                    let fresh = filter.accept_batch(&links, quota);
                    if fresh.is_empty() {
                        // Every link on this page was seen or excluded;
                        // requesting further pages cannot make progress.
                        info!("no new links on page {}, stopping", page);
                        ControllerState::Done
                    } else {
                        debug!(
                            "accepted {} of {} links on page {}",
                            fresh.len(),
                            links.len(),
                            page
                        );
                        let outcome = downloader
                            .acquire_batch(
                                fresh,
                                &job.output_dir,
                                &job.base_name,
                                report.accepted,
                                quota,
                                progress,
                            )
                            .await;
                        report.accepted += outcome.downloaded;
                        report.attempted += outcome.attempted;
                        report.sources.extend(outcome.sources);

                        if report.accepted >= job.limit {
                            info!("requested count of {} reached", job.limit);
                            ControllerState::Done
                        } else {
                            ControllerState::Requesting
                        }
                    }
                }
                ControllerState::Done => break,
            };
        }

        info!(
            "done, downloaded {} of {} requested image(s)",
            report.accepted, job.limit
        );
        Ok(report)
    }

    /// Fetch the next batch, retrying transient transport failures under
    /// the policy. Exhausting the budget ends discovery (`None`) instead
    /// of failing the run; non-retryable errors propagate.
    async fn request_with_retry(
        &self,
        source: &mut dyn LinkSource,
    ) -> Result<Option<Vec<String>>, DiscoveryError> {
        let mut attempt: u32 = 0;
        loop {
            match source.next_batch().await {
                Ok(links) => return Ok(Some(links)),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if self.retry.should_retry(attempt) {
                        let backoff = self.retry.calculate_backoff(attempt);
                        warn!(
                            "page fetch failed (attempt {}): {}; retrying in {:?}",
                            attempt, e, backoff
                        );
                        tokio::time::sleep(backoff).await;
                    } else {
                        warn!(
                            "page fetch failed after {} attempt(s): {}; ending discovery",
                            attempt, e
                        );
                        return Ok(None);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::search_query::SearchQuery;
    use crate::pipeline::NullProgress;
    use async_trait::async_trait;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// Scripted link source: one entry per page, `Err` entries are
    /// transport failures.
    struct ScriptedSource {
        pages: Vec<Result<Vec<String>, ()>>,
        calls: usize,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Vec<String>, ()>>) -> Self {
            Self { pages, calls: 0 }
        }
    }

    #[async_trait]
    impl LinkSource for ScriptedSource {
        async fn next_batch(&mut self) -> Result<Vec<String>, DiscoveryError> {
            let page = self.pages.get(self.calls).cloned();
            self.calls += 1;
            match page {
                Some(Ok(links)) => Ok(links),
                Some(Err(())) => Err(DiscoveryError::Transport("scripted failure".into())),
                None => Ok(Vec::new()),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    async fn image_server() -> MockServer {
        let server = MockServer::start().await;
        let mut body = PNG_MAGIC.to_vec();
        body.resize(64, 0);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;
        server
    }

    fn job(limit: usize, dir: &std::path::Path) -> DownloadJob {
        DownloadJob::new(SearchQuery::new("cat"), limit, dir)
            .with_timeout(Duration::from_secs(5))
            .with_workers(2)
    }

    fn controller() -> PaginationController {
        PaginationController::new(RetryPolicy::fast(2, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_stops_on_empty_page_without_further_calls() {
        let server = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let mut source = ScriptedSource::new(vec![
            Ok(vec![format!("{}/a.png", server.uri())]),
            Ok(Vec::new()),
            Ok(vec![format!("{}/never.png", server.uri())]),
        ]);

        let downloader = Downloader::new(Duration::from_secs(5), 2, 16);
        let report = controller()
            .run(&job(10, dir.path()), &mut source, &downloader, &NullProgress)
            .await
            .unwrap();

        assert_eq!(report.accepted, 1);
        // The empty page on call 2 terminates the run; call 3 never happens.
        assert_eq!(source.calls, 2);
    }

    #[tokio::test]
    async fn test_quota_reached_stops_requesting() {
        let server = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let links: Vec<String> = (0..5).map(|i| format!("{}/{}.png", server.uri(), i)).collect();
        let mut source = ScriptedSource::new(vec![Ok(links), Ok(vec!["unused".into()])]);

        let downloader = Downloader::new(Duration::from_secs(5), 4, 16);
        let report = controller()
            .run(&job(3, dir.path()), &mut source, &downloader, &NullProgress)
            .await
            .unwrap();

        assert_eq!(report.accepted, 3);
        assert_eq!(source.calls, 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_all_duplicates_page_is_exhaustion() {
        let server = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let link = format!("{}/same.png", server.uri());
        let mut source = ScriptedSource::new(vec![
            Ok(vec![link.clone()]),
            // Second page repeats the first entirely.
            Ok(vec![link.clone()]),
            Ok(vec![format!("{}/other.png", server.uri())]),
        ]);

        let downloader = Downloader::new(Duration::from_secs(5), 2, 16);
        let report = controller()
            .run(&job(10, dir.path()), &mut source, &downloader, &NullProgress)
            .await
            .unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(source.calls, 2);
    }

    #[tokio::test]
    async fn test_transport_retries_then_graceful_end() {
        let server = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let mut source = ScriptedSource::new(vec![
            Ok(vec![format!("{}/a.png", server.uri())]),
            Err(()),
            Err(()),
            Err(()),
        ]);

        let downloader = Downloader::new(Duration::from_secs(5), 2, 16);
        let report = controller()
            .run(&job(10, dir.path()), &mut source, &downloader, &NullProgress)
            .await
            .unwrap();

        // Keeps what was downloaded before retries ran out.
        assert_eq!(report.accepted, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_then_recovery() {
        let server = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let mut source = ScriptedSource::new(vec![
            Err(()),
            Ok(vec![format!("{}/a.png", server.uri())]),
            Ok(Vec::new()),
        ]);

        let downloader = Downloader::new(Duration::from_secs(5), 2, 16);
        let report = controller()
            .run(&job(10, dir.path()), &mut source, &downloader, &NullProgress)
            .await
            .unwrap();

        assert_eq!(report.accepted, 1);
    }

    #[tokio::test]
    async fn test_session_error_is_fatal() {
        struct BrokenSource;

        #[async_trait]
        impl LinkSource for BrokenSource {
            async fn next_batch(&mut self) -> Result<Vec<String>, DiscoveryError> {
                Err(DiscoveryError::Session("no browser".into()))
            }
            fn name(&self) -> &'static str {
                "broken"
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(Duration::from_secs(5), 2, 16);
        let result = controller()
            .run(
                &job(10, dir.path()),
                &mut BrokenSource,
                &downloader,
                &NullProgress,
            )
            .await;

        assert!(matches!(result, Err(DiscoveryError::Session(_))));
    }
}
