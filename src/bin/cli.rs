//! BDE Scraper CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use bde_scraper::{error::Result, models::Config, pipeline};

/// BDE Scraper - Student Association Directory Scraper
#[derive(Parser, Debug)]
#[command(
    name = "bde-scraper",
    version,
    about = "Scrapes student association contact details into CSV"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape listing pages and their organization pages
    Scrape {
        /// First listing page (default: scraper.start_page)
        #[arg(long)]
        start_page: Option<u32>,

        /// Last listing page, inclusive (default: scraper.end_page)
        #[arg(long)]
        end_page: Option<u32>,

        /// Raw CSV path (default: {output.dir}/{output.raw_prefix}_{timestamp}.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean a raw scrape file
    Clean {
        /// Raw CSV to clean (default: newest raw file in output.dir)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Cleaned CSV path (default: {output.dir}/{output.clean_prefix}_{timestamp}.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Explore listing pagination without visiting organization pages
    Probe {
        #[arg(long)]
        start_page: Option<u32>,

        #[arg(long)]
        end_page: Option<u32>,
    },

    /// Show field coverage of a CSV file
    Stats {
        path: PathBuf,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Resolve a page range from flags, falling back to the configuration.
fn page_range(config: &Config, start: Option<u32>, end: Option<u32>) -> Result<(u32, u32)> {
    let start = start.unwrap_or(config.scraper.start_page);
    let end = end.unwrap_or(config.scraper.end_page);
    if start > end {
        return Err(bde_scraper::error::AppError::validation(format!(
            "start page {start} is after end page {end}"
        )));
    }
    Ok((start, end))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Validate = cli.command {
        log::info!("Validating {}...", cli.config.display());
        let config = Config::load(&cli.config)?;
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {e}");
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(());
    }

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Scrape {
            start_page,
            end_page,
            output,
        } => {
            let (start, end) = page_range(&config, start_page, end_page)?;
            let path = pipeline::run_scrape(&config, start, end, output.as_deref()).await?;
            log::info!("Raw results: {}", path.display());
        }

        Command::Clean { input, output } => {
            let report = pipeline::run_cleaner(&config, input.as_deref(), output.as_deref())?;
            log::info!("Cleaned results: {}", report.output.display());
        }

        Command::Probe {
            start_page,
            end_page,
        } => {
            let (start, end) = page_range(&config, start_page, end_page)?;
            pipeline::run_probe_command(&config, start, end).await?;
        }

        Command::Stats { path } => {
            pipeline::run_stats(&path)?;
        }

        Command::Validate => {}
    }

    log::info!("Done!");

    Ok(())
}
