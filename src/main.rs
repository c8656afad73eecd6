mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use mediagrab::config::Config;
use mediagrab::downloader::{Downloader, YtDlp};
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mediagrab=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Serve(args) => {
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            mediagrab::api::run(config).await?;
        }
        Commands::Check => check(&config).await?,
    }

    Ok(())
}

async fn check(config: &Config) -> Result<(), AnyError> {
    let downloader = YtDlp::new(&config.downloader);
    let version = downloader
        .version()
        .await
        .map_err(|e| format!("{} is not usable: {e}", downloader.name()))?;
    println!("{} {version}", downloader.name());
    Ok(())
}
