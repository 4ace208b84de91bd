//! hn-harvest main entry point
//!
//! This is the command-line interface for archiving saved Hacker News items.

use clap::{ArgAction, Parser};
use hn_harvest::config::{load_settings_or_default, RunConfig, Selection};
use hn_harvest::harvest::run_harvest;
use hn_harvest::listing::PageSpec;
use hn_harvest::session::Credentials;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// hn-harvest: download your saved Hacker News stories and comments
///
/// Logs in, collects the saved stories and comments from your listing pages,
/// stores them as JSON (reusing items already present in that file), and
/// optionally renders every story and its discussion to PDF.
#[derive(Parser, Debug)]
#[command(name = "hn-harvest")]
#[command(version)]
#[command(about = "Download saved Hacker News stories and comments", long_about = None)]
struct Cli {
    /// The Hacker News username to grab the items from
    username: String,

    /// The password to log in with
    password: String,

    /// File path to store the JSON document at; also read as a cache
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Number of pages to grab; 0 grabs all pages
    #[arg(short, long, default_value_t = 1)]
    number: u32,

    /// Grab stories only
    #[arg(short, long)]
    stories: bool,

    /// Grab comments only
    #[arg(short, long)]
    comments: bool,

    /// Save stories to PDF
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pdf: bool,

    /// Output folder for PDFs
    #[arg(short, long, default_value = "output2/", value_name = "PATH")]
    output_folder: PathBuf,

    /// Optional TOML settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load settings file, or defaults
    let settings = match load_settings_or_default(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.stories && cli.comments {
        tracing::info!("Both --stories and --comments given, grabbing both");
    }

    // Build run configuration from CLI args
    let config = RunConfig {
        credentials: Credentials::new(cli.username, cli.password),
        output_file: cli.file,
        pages: PageSpec::from_count(cli.number),
        selection: Selection::from_flags(cli.stories, cli.comments),
        pdf: cli.pdf,
        output_folder: cli.output_folder,
        settings,
    };

    match run_harvest(config).await {
        Ok(summary) => {
            tracing::info!(
                "Harvest completed: {} page(s), {} stories, {} comments",
                summary.pages,
                summary.document.saved_stories.len(),
                summary.document.saved_comments.len()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hn_harvest=info,warn"),
            1 => EnvFilter::new("hn_harvest=debug,info"),
            2 => EnvFilter::new("hn_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
