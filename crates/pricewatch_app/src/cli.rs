use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use pricewatch_core::{ReportWindow, DEFAULT_RECENT_DAYS};

use crate::config::DEFAULT_CONFIG_FILENAME;

#[derive(Parser, Debug)]
#[command(author, version, about = "Operator console for the grocery price tracker", long_about = None)]
pub struct Cli {
    /// Path to the RON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILENAME)]
    pub config: PathBuf,

    /// Overrides the tracker service address from the config file
    #[arg(long)]
    pub base_url: Option<String>,

    /// More log output; repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a scrape and follow its progress until it finishes
    Scrape(TrackArgs),
    /// Follow a scrape that is already running
    Track(TrackArgs),
    /// Show the price history report
    Report(ReportArgs),
    /// Manage the product catalogue
    #[command(subcommand)]
    Products(ProductsCommand),
    /// Show or change which stores are scraped
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Scrape one product now without touching the job
    TestProduct {
        id: String,
        /// Store the result as a history reading
        #[arg(long)]
        save: bool,
    },
    /// Inspect or create the config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Clone)]
pub struct TrackArgs {
    /// Keep a report open; it is reloaded when the scrape completes
    #[arg(long)]
    pub report: bool,

    /// Use the full history range for the report instead of the recent window
    #[arg(long)]
    pub all: bool,
}

impl TrackArgs {
    pub fn window(&self) -> Option<ReportWindow> {
        self.report.then(|| window_for(self.all, DEFAULT_RECENT_DAYS))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Number of most recent dates to show
    #[arg(long, default_value_t = DEFAULT_RECENT_DAYS)]
    pub days: usize,

    /// Show every date the service has
    #[arg(long)]
    pub all: bool,

    /// Include products that are no longer tracked
    #[arg(long)]
    pub include_inactive: bool,

    /// Write the report as CSV into the export directory
    #[arg(long)]
    pub export: bool,
}

impl ReportArgs {
    pub fn window(&self) -> ReportWindow {
        window_for(self.all, self.days)
    }
}

pub fn window_for(all: bool, days: usize) -> ReportWindow {
    if all {
        ReportWindow::FullRange
    } else {
        ReportWindow::Recent(days)
    }
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    /// List products, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a product to the catalogue
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        store: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        pack_size: Option<f64>,
    },
    /// Change fields of an existing product
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        store: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        pack_size: Option<f64>,
    },
    /// Set whether a product is scraped
    Toggle {
        id: String,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Remove a product
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    /// Replace the list of enabled stores
    Set {
        #[arg(required = true)]
        stores: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to the config path
    Init {
        #[arg(long)]
        force: bool,
    },
}
