use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use risks_wiki::app::AppContext;
use risks_wiki::cli::{commands, Cli, Commands};
use risks_wiki::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(feed_url) = cli.feed_url {
        config.feed_url = feed_url;
    }
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| ctx.config.bind.clone());
            commands::serve(&ctx, &bind).await?;
        }
        Commands::Dump { page, index } => {
            commands::dump(&ctx, page.as_deref(), index).await?;
        }
    }

    Ok(())
}
