//! Inclusive calendar date ranges for backfill runs.

use chrono::NaiveDate;

use crate::error::FeedError;

/// A validated `[start, end]` range. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Rejects ranges where `end` precedes `start` instead of silently
    /// swapping the endpoints.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FeedError> {
        if end < start {
            return Err(FeedError::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both endpoints included.
    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Yields every date from start to end, ascending.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.days() as usize)
    }
}
