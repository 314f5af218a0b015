// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use imgdl::config::settings::Settings;
use imgdl::domain::models::job::DownloadJob;
use imgdl::domain::models::search_query::{AdultFilter, ImageType, SearchBackend, SearchQuery};
use imgdl::domain::search::source::LinkSource;
use imgdl::infrastructure::search::bing_api::BingApiSource;
use imgdl::infrastructure::search::browser::{BrowserOptions, BrowserSource};
use imgdl::pipeline::controller::PaginationController;
use imgdl::pipeline::downloader::Downloader;
use imgdl::pipeline::ProgressSink;
use imgdl::utils::telemetry;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    Bing,
    Google,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Paged requests against the backend's async results endpoint
    Api,
    /// Headless-browser discovery over the rendered results page
    Browser,
}

/// Download images from a web image-search engine.
#[derive(Debug, Parser)]
#[command(name = "imgdl", version, about)]
struct Cli {
    /// Search query
    query: String,

    /// Maximum number of images to download
    #[arg(short, long, default_value_t = 100)]
    limit: usize,

    /// Directory to save images in (a subdirectory per query is created)
    #[arg(short = 'd', long, default_value = "dataset")]
    output_dir: PathBuf,

    /// Turn the adult-content filter off
    #[arg(short = 'a', long)]
    adult_filter_off: bool,

    /// Replace the query's output directory if it already exists
    #[arg(short = 'F', long)]
    force_replace: bool,

    /// Per-request timeout in seconds
    #[arg(short = 't', long, default_value_t = 60)]
    timeout: u64,

    /// Content-type filter: photo, clipart, line, gif, transparent, face
    #[arg(short = 'f', long)]
    filter: Option<String>,

    /// Color filter: bw, color, or a named color
    #[arg(long)]
    color: Option<String>,

    /// Enable the backend's safe-search mode (browser discovery)
    #[arg(long)]
    safe_mode: bool,

    /// Substrings of sites to exclude from download links
    #[arg(short = 'b', long = "exclude")]
    exclude: Vec<String>,

    /// Base name for downloaded files
    #[arg(short = 'n', long, default_value = "Image")]
    name: String,

    /// Concurrent download workers (clamped to a sane range)
    #[arg(short = 'w', long, default_value_t = 4)]
    workers: usize,

    /// Search backend
    #[arg(long, value_enum, default_value_t = EngineArg::Bing)]
    engine: EngineArg,

    /// Link-discovery strategy
    #[arg(long, value_enum, default_value_t = ModeArg::Api)]
    mode: ModeArg,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Upstream proxy address for the browser, e.g. 127.0.0.1:1080
    #[arg(long)]
    proxy: Option<String>,

    /// Proxy scheme: http or socks5
    #[arg(long, default_value = "http")]
    proxy_type: String,

    /// List the source URL of every downloaded file after the run
    #[arg(long)]
    show_sources: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Logs each progress tick; stands in for a progress-bar widget.
struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_downloaded(&self, accepted: usize) {
        info!("{} image(s) downloaded", accepted);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_telemetry(cli.verbose);

    let settings = Settings::new().context("failed to load settings")?;

    let image_type = cli.filter.as_deref().and_then(|shorthand| {
        let parsed = ImageType::parse(shorthand);
        if parsed.is_none() {
            warn!("unknown content-type filter '{}', ignoring", shorthand);
        }
        parsed
    });

    let adult = if cli.adult_filter_off {
        AdultFilter::Off
    } else {
        AdultFilter::On
    };

    let query = SearchQuery::new(&cli.query)
        .with_adult(adult)
        .with_image_type(image_type)
        .with_color(cli.color.clone())
        .with_safe_mode(cli.safe_mode);

    let image_dir = cli.output_dir.join(&cli.query);
    if cli.force_replace && image_dir.is_dir() {
        tokio::fs::remove_dir_all(&image_dir)
            .await
            .with_context(|| format!("failed to remove {}", image_dir.display()))?;
    }
    tokio::fs::create_dir_all(&image_dir)
        .await
        .with_context(|| format!("failed to create {}", image_dir.display()))?;
    info!("downloading images to {}", image_dir.display());

    let job = DownloadJob::new(query, cli.limit, image_dir)
        .with_base_name(cli.name)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_exclusions(cli.exclude)
        .with_workers(cli.workers);

    let backend = match cli.engine {
        EngineArg::Bing => SearchBackend::Bing,
        EngineArg::Google => SearchBackend::Google,
    };

    let mut source: Box<dyn LinkSource> = match cli.mode {
        ModeArg::Api => {
            if backend != SearchBackend::Bing {
                anyhow::bail!("{} is not supported in api mode; use --mode browser", backend.name());
            }
            Box::new(BingApiSource::new(
                job.query.clone(),
                job.timeout,
                &settings.discovery,
            ))
        }
        ModeArg::Browser => Box::new(BrowserSource::new(
            backend,
            &job.query,
            job.limit,
            BrowserOptions {
                headless: !cli.headed,
                proxy: cli.proxy.clone(),
                proxy_scheme: cli.proxy_type.clone(),
                settle: settings.discovery.settle_interval(),
            },
        )),
    };

    let downloader = Downloader::new(job.timeout, job.workers, settings.download.max_workers);
    let controller = PaginationController::from_settings(&settings.discovery);

    let report = controller
        .run(&job, source.as_mut(), &downloader, &LogProgress)
        .await?;

    println!(
        "Downloaded {} of {} requested image(s) ({} attempted)",
        report.accepted, job.limit, report.attempted
    );
    if cli.show_sources {
        for source_url in &report.sources {
            println!("{}", source_url);
        }
    }

    Ok(())
}
