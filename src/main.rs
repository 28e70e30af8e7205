//! Script-Census main entry point
//!
//! This is the command-line interface for the Script-Census crawler.

use anyhow::Context;
use clap::Parser;
use script_census::config::load_config_or_default;
use script_census::crawler::build_pipeline;
use script_census::output::print_ranking;
use script_census::url::build_search_url;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Script-Census: which script libraries do the top search results load?
///
/// Searches for QUERY, downloads every result page and prints the most
/// frequently referenced script URLs with their occurrence counts.
#[derive(Parser, Debug)]
#[command(name = "script-census")]
#[command(version = "1.0.0")]
#[command(about = "Ranks the script libraries used by top search results", long_about = None)]
struct Cli {
    /// Search query (prompted for when omitted)
    #[arg(value_name = "QUERY")]
    query: Option<String>,

    /// Number of libraries to report (defaults to the configured limit)
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let query = match cli.query {
        Some(query) => query,
        None => prompt_query()?,
    };

    let url = build_search_url(&config.search, &query)?;
    tracing::info!("Requested: {}", url);

    let limit = cli.limit.unwrap_or(config.output.limit);
    let pipeline = build_pipeline(&config).context("Failed to start crawler")?;

    let mut printed = Ok(());
    pipeline.crawl(&url, limit, |ranking| {
        printed = print_ranking(&ranking);
    });

    pipeline.stop();

    printed.context("Failed to print results")
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("script_census=info,warn"),
            1 => EnvFilter::new("script_census=debug,info"),
            2 => EnvFilter::new("script_census=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Results go to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .with_file(false)
        .init();
}

/// Asks for a query on stdout and reads one line from stdin
fn prompt_query() -> anyhow::Result<String> {
    print!("Please enter a query: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read query")?;

    let query = line.trim().to_string();
    if query.is_empty() {
        anyhow::bail!("No query given");
    }

    Ok(query)
}
