use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod dry_run;
#[cfg(feature = "gsheets")]
mod google_sheets;
mod pipeline;

use pipeline::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "ledger", version, about = "Household ledger CSV → monthly tabs and annual report")]
struct Cli {
    /// Config file (default: ./ledger.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print uploads instead of writing to the spreadsheet
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize the ledger, write local files, upload tabs (default)
    Run {
        /// Report year (default: year of the first record)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Normalize the ledger and write local files only
    Process {
        #[arg(long)]
        year: Option<i32>,
    },

    /// Print the annual report table
    Report {
        #[arg(long)]
        year: Option<i32>,

        /// Rebuild from a processed-data file instead of the raw ledger
        #[arg(long)]
        from_processed: Option<PathBuf>,
    },

    /// Write a ledger.toml with the default settings
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config_path = cli.config.as_deref();
    let load = || config::load_config(config_path);

    match cli.command.unwrap_or(Command::Run { year: None }) {
        Command::InitConfig => {
            config::init_config(config_path)?;
        }

        Command::Run { year } => {
            let cfg = load()?;
            let opts = RunOptions {
                upload: true,
                dry_run: cli.dry_run,
                year,
            };
            pipeline::run(&cfg, opts).await?;
        }

        Command::Process { year } => {
            let cfg = load()?;
            let opts = RunOptions {
                upload: false,
                dry_run: cli.dry_run,
                year,
            };
            pipeline::run(&cfg, opts).await?;
        }

        Command::Report {
            year,
            from_processed,
        } => {
            let cfg = load()?;
            pipeline::print_report(&cfg, year, from_processed.as_deref())?;
        }
    }

    Ok(())
}
