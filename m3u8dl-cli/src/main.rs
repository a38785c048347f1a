use std::{sync::Arc, time::Duration};

use clap::Parser;
use error::AppError;
use indicatif::MultiProgress;
use m3u8dl_engine::{
    DownloadOptions, DownloaderConfig, HlsProtocolBuilder, OnEvent, ProxyAuth, ProxyConfig,
    SegmentRange,
};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::writer::MakeWriterExt;

mod cli;
mod error;
mod utils;

use cli::CliArgs;
use utils::progress::ProgressManager;

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        // Log the full error for debugging
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    // Setup logging
    let log_level = if args.debug {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("m3u8dl.log")?;

    let multi_writer = MakeWriterExt::and(std::io::stdout, log_file);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(multi_writer)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    info!("m3u8dl {} - sequential m3u8 playlist downloader", env!("CARGO_PKG_VERSION"));
    info!("==================================================================");

    info!(
        "HTTP timeout configuration: overall={}s, connect={}s",
        args.timeout, args.connect_timeout
    );

    // Handle proxy configuration
    let proxy_config = match &args.proxy {
        Some(Some(proxy_url)) => {
            let mut proxy = ProxyConfig::from_url(proxy_url.as_str());
            if let Some(proxy_type) = args.proxy_type {
                proxy.proxy_type = proxy_type;
            }

            // Configure proxy authentication if both username and password are provided
            proxy.auth = match (&args.proxy_user, &args.proxy_pass) {
                (Some(username), Some(password)) => Some(ProxyAuth {
                    username: username.clone(),
                    password: password.clone(),
                }),
                (None, None) => None,
                _ => {
                    return Err(AppError::InvalidInput(
                        "--proxy-user and --proxy-pass must be given together".to_string(),
                    ));
                }
            };

            info!(
                proxy_url = %proxy.url,
                proxy_type = ?proxy.proxy_type,
                has_auth = proxy.auth.is_some(),
                "Using explicit proxy configuration for downloads"
            );
            Some(proxy)
        }
        Some(None) => {
            info!("Using http_proxy/https_proxy from the environment for downloads");
            None
        }
        None => {
            if args.proxy_type.is_some() {
                warn!("--proxy-type has no effect without --proxy");
            }
            None
        }
    };

    // Create download configuration
    let download_config = {
        let builder = DownloaderConfig::builder()
            .with_timeout(Duration::from_secs(args.timeout))
            .with_connect_timeout(Duration::from_secs(args.connect_timeout))
            .with_headers(utils::parse_headers(&args.headers));

        let builder = match proxy_config {
            Some(proxy) => builder.with_proxy(proxy),
            None => builder.with_system_proxy(args.proxy.is_some()),
        };
        builder.build()
    };

    let downloader = HlsProtocolBuilder::new()
        .with_base_config(download_config)
        .build()?;

    if args.list {
        let manifest = downloader.load_manifest(&args.url).await?;
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    let range = args
        .range
        .map_or_else(SegmentRange::all, |(from, to)| SegmentRange::new(from, to));
    let mut options = DownloadOptions::new()
        .range(range)
        .dest(args.dest.clone())
        .append(args.append);
    if let Some(output) = &args.output {
        options = options.filename(output.as_str());
    }

    // Create a progress manager based on show_progress flag
    let multi = MultiProgress::new();
    let progress_manager = if args.show_progress {
        ProgressManager::new(multi)
    } else {
        ProgressManager::new_disabled(multi)
    };
    let on_event: OnEvent = Arc::new(move |event| progress_manager.handle_event(event));

    let counters = downloader
        .download(&args.url, options, Some(on_event))
        .await?;

    if counters.failure > 0 {
        return Err(AppError::SegmentsFailed {
            failed: counters.failure,
            total: counters.total(),
        });
    }
    Ok(())
}
