//! Sequential fetch-and-upload driver.

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::error::FeedError;
use crate::range::DateRange;
use crate::rate_provider::RateProvider;
use crate::store::SnapshotStore;

/// Collects one date: fetch the rates, hand them to the store. Returns the
/// stored object path.
pub async fn collect_date(
    provider: &dyn RateProvider,
    store: &dyn SnapshotStore,
    date: NaiveDate,
) -> Result<String, FeedError> {
    info!("Collecting exchange rates for {}", date);
    let snapshot = provider.fetch_rates(date).await?;
    store.put_snapshot(&snapshot).await
}

/// Walks the range in ascending order, one fetch and one upload per date.
/// Stops at the first failure; snapshots uploaded before it stay in place.
pub async fn backfill(
    provider: &dyn RateProvider,
    store: &dyn SnapshotStore,
    range: DateRange,
) -> Result<(), FeedError> {
    info!(
        "Backfilling exchange rates from {} to {} ({} days)",
        range.start(),
        range.end(),
        range.days()
    );

    let pb = ProgressBar::new(range.days());
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    for date in range.iter() {
        let snapshot = provider.fetch_rates(date).await?;
        debug!(currencies = snapshot.rates.len(), "Fetched {}", date);
        store.put_snapshot(&snapshot).await?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Backfill complete: {} snapshots uploaded", range.days());
    Ok(())
}
