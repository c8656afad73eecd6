use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mediagrab")]
#[command(about = "HTTP front end for a command-line media downloader", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $MEDIAGRAB_CONFIG or config/mediagrab.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Check that the configured downloader can be executed
    Check,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to bind, overriding server.bind_addr
    #[arg(long)]
    pub address: Option<SocketAddr>,
}
