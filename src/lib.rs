pub mod collect;
pub mod config;
pub mod error;
pub mod log;
pub mod providers;
pub mod range;
pub mod rate_provider;
pub mod snapshot;
pub mod store;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::providers::open_exchange_rates::OpenExchangeRatesProvider;
use crate::range::DateRange;
use crate::store::BucketStore;

pub enum AppCommand {
    Backfill {
        start_date: NaiveDate,
        end_date: NaiveDate,
        app_id: Option<String>,
    },
    Daily {
        date: Option<NaiveDate>,
        app_id: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = BucketStore::from_config(&config.storage)?;

    match command {
        AppCommand::Backfill {
            start_date,
            end_date,
            app_id,
        } => {
            let provider = build_provider(&config, app_id)?;
            let range = DateRange::new(start_date, end_date)?;
            collect::backfill(&provider, &store, range).await?;
        }
        AppCommand::Daily { date, app_id } => {
            let provider = build_provider(&config, app_id)?;
            let date = date.unwrap_or_else(|| chrono::Utc::now().date_naive());
            let path = collect::collect_date(&provider, &store, date).await?;
            info!("Stored daily snapshot at {}", path);
        }
    }

    Ok(())
}

fn build_provider(
    config: &config::AppConfig,
    app_id: Option<String>,
) -> Result<OpenExchangeRatesProvider> {
    let app_id = app_id
        .or_else(|| config.provider.app_id.clone())
        .context("No app id: pass --app-id or set provider.app_id in the config")?;

    Ok(OpenExchangeRatesProvider::new(
        &config.provider.base_url,
        &app_id,
        &config.base_currency,
    ))
}
