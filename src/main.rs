//! Subreddit Downloader - CLI entry point.

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use subreddit_downloader::{
    api::{NetworkClient, PushshiftApi},
    cli::Args,
    config::{validate_subreddit, Config},
    download::{Pipeline, RetryPolicy, RunSettings},
    error::{exit_codes, Error, Result},
    gif::{GifMaker, GifSettings},
    output::{
        print_banner, print_config_summary, print_debug, print_error, print_exec_time,
        print_info, print_run_summary, print_success, print_warning,
    },
};

/// How a run that did not fail ended.
#[derive(Debug, PartialEq, Eq)]
enum RunEnd {
    Completed,
    Cancelled,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let started = Instant::now();

    let code = match run().await {
        Ok(RunEnd::Completed) => exit_codes::SUCCESS,
        Ok(RunEnd::Cancelled) => exit_codes::ABORT,
        Err(e) => {
            print_error(&format!("{}", e));
            e.exit_code()
        }
    };

    print_exec_time(started.elapsed());
    ExitCode::from(code as u8)
}

async fn run() -> Result<RunEnd> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            args.config.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    args.merge_into_config(&mut config);
    if args.debug {
        print_debug(&format!("{:?}", config));
    }

    let subreddit = validate_subreddit(&args.subreddit)?;
    print_config_summary(&subreddit, config.download_folder(), args.pool_limit);

    let end = if args.gif_only {
        RunEnd::Completed
    } else {
        let client = Arc::new(NetworkClient::new(args.pool_limit)?);
        download_until(&args, &config, subreddit.clone(), client, ctrl_c()).await?
    };

    if end == RunEnd::Completed && args.wants_gif() {
        make_gifs(&args, &config, subreddit).await?;
    }

    Ok(end)
}

/// Resolves on ctrl-c. Never resolves when the handler cannot be installed.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        futures::future::pending::<()>().await;
    }
}

/// Run the download until it finishes or `cancel` resolves. The client is
/// released on every path out.
async fn download_until<C>(
    args: &Args,
    config: &Config,
    subreddit: String,
    client: Arc<NetworkClient>,
    cancel: C,
) -> Result<RunEnd>
where
    C: Future<Output = ()>,
{
    let result = download(args, config, subreddit, Arc::clone(&client), cancel).await;
    client.close();
    result
}

async fn download<C>(
    args: &Args,
    config: &Config,
    subreddit: String,
    client: Arc<NetworkClient>,
    cancel: C,
) -> Result<RunEnd>
where
    C: Future<Output = ()>,
{
    let dates = config.date_range()?;
    let provider = PushshiftApi::new(&config.search)?;

    let settings = RunSettings {
        subreddit,
        dates,
        download_folder: config.download_folder().to_path_buf(),
        pool_limit: args.pool_limit,
        retry_policy: RetryPolicy::with_max_attempts(args.max_attempts),
        post_limit: args.limit,
        show_progress: !args.quiet,
    };
    let pipeline = Pipeline::new(settings, Box::new(provider), client);

    tokio::select! {
        result = pipeline.run() => {
            let summary = result?;
            print_run_summary(&summary);
            if summary.reached_download() {
                print_success("Downloads finished");
            }
            Ok(RunEnd::Completed)
        }
        _ = cancel => {
            print_warning("Downloads cancelled. Goodbye!");
            Ok(RunEnd::Cancelled)
        }
    }
}

async fn make_gifs(args: &Args, config: &Config, subreddit: String) -> Result<()> {
    let settings = GifSettings::new(config.download_folder(), subreddit)
        .with_delay(args.delay)
        .with_fits(args.gif_fits());

    print_info("Assembling gifs from downloaded images");
    let maker = GifMaker::new(settings);
    let written = tokio::task::spawn_blocking(move || maker.run())
        .await
        .map_err(|e| Error::Media(format!("Gif task failed: {}", e)))??;

    if written.is_empty() {
        print_warning("No images to assemble into gifs");
    } else {
        print_success(&format!("{} gif(s) written", written.len()));
    }
    Ok(())
}
