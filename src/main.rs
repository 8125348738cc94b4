//! eurocar-scraper - Stock scraper for the Eurocar Multimarcas dealership

use anyhow::Result;
use clap::{Parser, Subcommand};
use eurocar_scraper::commands::{DetailCommand, LinksCommand, ScrapeCommand};
use eurocar_scraper::config::{Config, OutputFormat};
use eurocar_scraper::format::Formatter;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "eurocar-scraper",
    version,
    about = "Scrapes the Eurocar Multimarcas vehicle stock into a JSON file"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON file to write the scraped stock to
    #[arg(short, long, global = true, env = "EUROCAR_OUTPUT")]
    output: Option<PathBuf>,

    /// Delay after each detail page request in milliseconds
    #[arg(long, global = true, env = "EUROCAR_DELAY")]
    delay: Option<u64>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "EUROCAR_PROXY")]
    proxy: Option<String>,

    /// Console output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the whole stock and save it (default)
    #[command(alias = "s")]
    Scrape {
        /// Stop after this many vehicles
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// List vehicle detail URLs found on the stock page
    #[command(alias = "l")]
    Links,

    /// Extract vehicles from detail page URLs
    #[command(alias = "d")]
    Detail {
        /// Detail page URL(s)
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command.unwrap_or(Commands::Scrape { max: None }) {
        Commands::Scrape { max } => {
            if max.is_some() {
                config.max_vehicles = max;
            }

            let formatter = Formatter::new(config.format);
            let vehicles = ScrapeCommand::new(config).execute().await?;
            println!("{}", formatter.format_vehicles(&vehicles));
        }

        Commands::Links => {
            let output = LinksCommand::new(config).execute().await?;
            println!("{}", output);
        }

        Commands::Detail { urls } => {
            let output = DetailCommand::new(config).execute(&urls).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
