//! Feedlane CLI
//!
//! Entry point for the `feedlane` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use feedlane::{Driver, DriverConfig};

#[derive(Parser)]
#[command(name = "feedlane")]
#[command(about = "Feed selection driver", version)]
struct Cli {
    /// Path to config file (default: ~/.config/feedlane/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v: info, -vv: frame-level debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an interface URI to a set of selections
    Select {
        /// Interface URI to resolve
        interface: String,

        /// Refresh cached feeds before selecting
        #[arg(long)]
        refresh: bool,

        /// Worker command to launch (overrides config)
        #[arg(long)]
        worker: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Select {
            interface,
            refresh,
            worker,
        } => run_select(cli.config, interface, refresh, worker),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn run_select(
    config_path: Option<PathBuf>,
    interface: String,
    refresh: bool,
    worker: Option<String>,
) {
    let mut config = match DriverConfig::load_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };
    if let Some(worker) = worker {
        config.worker_command = worker;
    }

    let driver = Driver::new(config);
    match driver.select(&interface, refresh) {
        Ok(selection) => {
            println!("{}", selection.status);
            match serde_json::to_string_pretty(&selection.selections) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => {
                    eprintln!("Error serializing output: {}", e);
                    process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Selection failed: {}", e);
            process::exit(1);
        }
    }
}
