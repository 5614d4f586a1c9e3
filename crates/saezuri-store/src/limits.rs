//! Daily and monthly posting limit tracking.
//!
//! Counters roll over at UTC day and month boundaries. The tracker mutates
//! only the in-memory stats; persisting them afterwards is the caller's
//! usual read-modify-write against the document.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use tracing::{debug, warn};

use crate::types::{Config, Stats};

/// Remaining posting budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub daily: u32,
    pub monthly: u32,
}

/// Tracks posting counters against the configured limits.
pub struct LimitTracker<'a> {
    stats: &'a mut Stats,
    daily_limit: u32,
    monthly_limit: u32,
}

impl<'a> LimitTracker<'a> {
    pub fn new(stats: &'a mut Stats, config: &Config) -> Self {
        let mut tracker = Self {
            stats,
            daily_limit: config.daily_limit,
            monthly_limit: config.monthly_limit,
        };
        tracker.roll_over(Utc::now());
        tracker
    }

    /// Whether another post fits within both limits.
    pub fn can_post(&mut self) -> bool {
        self.roll_over(Utc::now());

        if self.stats.daily_count >= self.daily_limit {
            warn!(
                count = self.stats.daily_count,
                limit = self.daily_limit,
                "daily post limit reached"
            );
            return false;
        }
        if self.stats.monthly_count >= self.monthly_limit {
            warn!(
                count = self.stats.monthly_count,
                limit = self.monthly_limit,
                "monthly post limit reached"
            );
            return false;
        }
        true
    }

    /// Count one published post.
    pub fn record_post(&mut self) {
        self.stats.daily_count += 1;
        self.stats.monthly_count += 1;
        debug!(
            daily = self.stats.daily_count,
            monthly = self.stats.monthly_count,
            "post counted"
        );
    }

    /// How many posts remain in each window.
    pub fn remaining(&mut self) -> Remaining {
        self.roll_over(Utc::now());
        Remaining {
            daily: self.daily_limit.saturating_sub(self.stats.daily_count),
            monthly: self.monthly_limit.saturating_sub(self.stats.monthly_count),
        }
    }

    /// Reset counters whose deadline has passed and schedule the next one.
    /// An unparseable deadline counts as passed.
    fn roll_over(&mut self, now: DateTime<Utc>) {
        if parse_deadline(&self.stats.daily_reset_at).map_or(true, |at| now >= at) {
            self.stats.daily_count = 0;
            let tomorrow = (now.date_naive() + Duration::days(1)).and_time(NaiveTime::MIN);
            self.stats.daily_reset_at = format_deadline(Utc.from_utc_datetime(&tomorrow));
            debug!(next_reset = %self.stats.daily_reset_at, "daily post counter reset");
        }

        if parse_deadline(&self.stats.monthly_reset_at).map_or(true, |at| now >= at) {
            self.stats.monthly_count = 0;
            let (year, month) = if now.month() == 12 {
                (now.year() + 1, 1)
            } else {
                (now.year(), now.month() + 1)
            };
            let first = NaiveDate::from_ymd_opt(year, month, 1)
                .expect("first of month is always valid")
                .and_time(NaiveTime::MIN);
            self.stats.monthly_reset_at = format_deadline(Utc.from_utc_datetime(&first));
            debug!(next_reset = %self.stats.monthly_reset_at, "monthly post counter reset");
        }
    }
}

fn parse_deadline(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn format_deadline(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}
