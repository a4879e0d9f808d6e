use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use fxfeed::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxfeed::AppCommand {
    fn from(cmd: Commands) -> fxfeed::AppCommand {
        match cmd {
            Commands::Backfill {
                start_date,
                end_date,
                app_id,
            } => fxfeed::AppCommand::Backfill {
                start_date,
                end_date,
                app_id,
            },
            Commands::Daily { date, app_id } => fxfeed::AppCommand::Daily { date, app_id },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Collect historical rates over an inclusive date range
    Backfill {
        /// First date to collect (YYYY-MM-DD)
        #[arg(short, long)]
        start_date: NaiveDate,

        /// Last date to collect (YYYY-MM-DD)
        #[arg(short, long)]
        end_date: NaiveDate,

        /// Open Exchange Rates app id; falls back to the config file
        #[arg(short, long)]
        app_id: Option<String>,
    },
    /// Collect rates for a single day (today unless --date is given)
    Daily {
        /// Collection date, e.g. the scheduler's execution date
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Open Exchange Rates app id; falls back to the config file
        #[arg(short, long)]
        app_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxfeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Collection run failed");
    }
    result
}

fn setup() -> Result<()> {
    use anyhow::Context;

    let path = fxfeed::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Include the example config as a string literal in the binary
    let default_config = include_str!("../docs/example_config.yaml");

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
