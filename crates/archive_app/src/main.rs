mod chrome;
mod cli;
mod logging;

use anyhow::Context;
use archive_engine::{Archiver, ArchiverConfig, Browser};
use clap::Parser;
use engine_logging::{engine_error, engine_info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::chrome::ChromeBrowser;
use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(args.verbose);

    let mut config = ArchiverConfig::new(args.channel_url.clone());
    config.empty_page_limit = args.empty_page_limit;
    config.save_dir = args.save_dir;

    let browser = ChromeBrowser::launch()
        .await
        .context("failed to launch Chrome")?;
    browser
        .navigate(config.channel_url.as_str())
        .await
        .context("failed to open channel")?;
    wait_for_login().await?;

    let archiver = Archiver::with_http_fetcher(config, Box::new(browser))?;
    match archiver.run().await {
        Ok(summary) => {
            engine_info!(
                "Done: {} listing pages, {} articles ({:?})",
                summary.pages_visited,
                summary.articles_archived,
                summary.termination
            );
            Ok(())
        }
        Err(err) => {
            engine_error!("Crawl aborted: {}", err);
            Err(err.into())
        }
    }
}

/// Blocks until the operator has logged in in the opened window and pressed Enter.
async fn wait_for_login() -> anyhow::Result<()> {
    println!("Log in in the browser window if needed, then press Enter to start archiving.");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read from stdin")?;
    Ok(())
}
