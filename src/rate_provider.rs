//! Provider seam for the exchange-rate source.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FeedError;
use crate::snapshot::RateSnapshot;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the full rate table for one calendar date.
    async fn fetch_rates(&self, date: NaiveDate) -> Result<RateSnapshot, FeedError>;
}
