pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "risks-wiki")]
#[command(about = "Serve The Risks Digest feed as a read-only federated wiki", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the feed URL from the config
    #[arg(long, global = true)]
    pub feed_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest the feed and serve the wiki over HTTP
    Serve {
        /// Listen address, e.g. 127.0.0.1:8000
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Ingest the feed once and print wiki JSON to stdout
    Dump {
        /// Print the rendered page with this slug instead of the sitemap
        #[arg(short, long)]
        page: Option<String>,

        /// Print the search index export instead of the sitemap
        #[arg(long, conflicts_with = "page")]
        index: bool,
    },
}
