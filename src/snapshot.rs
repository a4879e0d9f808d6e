//! The per-date exchange rate record and its file form.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// One day's rates against the base currency.
///
/// Built once by a provider and written once to storage. Rates are keyed by
/// currency code in a `BTreeMap` so repeated serialization of the same
/// snapshot is byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub date: NaiveDate,
    pub base: String,
    pub rates: BTreeMap<String, f64>,
    pub last_update: DateTime<Utc>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    date: NaiveDate,
    base: &'a str,
    currency: &'a str,
    rate: f64,
    last_update: String,
}

impl RateSnapshot {
    /// Object path under `prefix`, one folder per collection date.
    pub fn object_name(&self, prefix: &str) -> String {
        format!("{prefix}/{date}/exchange_rates_{date}.csv", date = self.date)
    }

    /// Renders `date,base,currency,rate,last_update` rows.
    pub fn to_csv(&self) -> Result<Vec<u8>, FeedError> {
        let serialize_err = |source: csv::Error| FeedError::Serialize {
            date: self.date,
            source,
        };

        let mut buf = Vec::new();
        let mut writer = csv::Writer::from_writer(&mut buf);
        for (currency, rate) in &self.rates {
            writer
                .serialize(CsvRow {
                    date: self.date,
                    base: &self.base,
                    currency,
                    rate: *rate,
                    last_update: self.last_update.to_rfc3339(),
                })
                .map_err(serialize_err)?;
        }
        writer
            .flush()
            .map_err(|e| serialize_err(csv::Error::from(e)))?;
        drop(writer);
        Ok(buf)
    }
}
