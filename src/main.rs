use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_transcripts::cli::{Cli, Commands, OutputFormat};
use yt_transcripts::config::Config;
use yt_transcripts::jobs::{check_batch_size, parse_links, JobDriver, JobStatus};
use yt_transcripts::output::{save_to_dir, TranscriptDocument};
use yt_transcripts::{server, TranscriptPipeline, VideoId};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { host, port } => {
            let config = Config::load(cli.config.as_deref())?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let pipeline = TranscriptPipeline::new(&config)?;
            tracing::info!("Caption strategies: {}", pipeline.strategy_names().join(", "));

            server::serve(Arc::new(pipeline), &host, port).await?;
        }
        Commands::Fetch { links, input, output, format } => {
            let config = Config::load(cli.config.as_deref())?;
            let dir = output
                .or_else(|| config.app.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));

            fetch(&config, links, input.as_deref(), &dir, &format, cli.quiet).await?;
        }
        Commands::Id { url } => {
            let video_id = VideoId::from_url(&url)?;
            println!("{}", video_id);
        }
        Commands::Config { show, init } => {
            if init {
                let path = Config::default().save(cli.config.as_deref())?;
                println!("Default configuration written to: {}", path.display());
            } else {
                let config = Config::load(cli.config.as_deref())?;
                if !show {
                    println!("Config file: {}", Config::config_path()?.display());
                }
                config.display();
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "yt_transcripts=debug,tower_http=debug"
    } else {
        "yt_transcripts=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so `id` and `config` output stays pipeable
    let json = std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn fetch(
    config: &Config,
    links: Vec<String>,
    input: Option<&Path>,
    dir: &Path,
    format: &OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mut raw = links.join("\n");
    if let Some(path) = input {
        let content = fs_err::read_to_string(path).context("Failed to read link file")?;
        raw.push('\n');
        raw.push_str(&content);
    }

    let mut jobs = parse_links(&raw);
    if jobs.is_empty() {
        anyhow::bail!("No YouTube links found in input");
    }
    check_batch_size(&jobs, config.app.max_links)?;

    let pipeline = TranscriptPipeline::new(config)?;
    let summary = JobDriver::new(&pipeline, quiet).run(&mut jobs).await?;

    for job in &jobs {
        match (job.status, &job.result) {
            (JobStatus::Done, Some(found)) => {
                let doc = TranscriptDocument::new(&job.video_id, found.clone());
                let path = save_to_dir(&doc, dir, format)?;
                println!("{} {}", style("Saved").green(), path.display());
            }
            _ if quiet => {
                eprintln!("{}: {}", job.link, job.error.as_deref().unwrap_or("Failed"));
            }
            _ => {}
        }
    }

    if summary.all_failed() {
        anyhow::bail!("All {} transcript jobs failed", summary.failed);
    }
    Ok(())
}
