use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ytdl_gateway::{Config, api, catalog, engine::select_engine};

#[derive(Parser)]
#[command(name = "ytdl-gateway")]
#[command(version)]
#[command(about = "HTTP front-end turning media URLs into metadata or downloaded files")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (missing file means defaults)
    #[arg(short, long, default_value = "ytdl-gateway.toml")]
    config: PathBuf,

    /// Listening address (overrides config file)
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Write the extractor eligibility list as a JSON array
    Catalog {
        /// Destination file
        #[arg(short, long, default_value = "filtered_extractors.json")]
        output_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("ytdl_gateway={0},engine={0},tower_http=trace", cli.log_level)
    } else {
        format!("ytdl_gateway={0},engine={0}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ytdl-gateway v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    info!(path = %cli.config.display(), "Configuration loaded");

    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve(config).await?,
        Command::Catalog { output_file } => {
            let engine = select_engine(&config.engine);
            let eligibility = catalog::compile_eligibility(engine.as_ref(), &config).await?;
            catalog::write_eligibility(&eligibility, &output_file).await?;
        }
    }

    Ok(())
}
