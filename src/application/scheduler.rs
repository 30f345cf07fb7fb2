//! DailyAggregationScheduler - Runs the message aggregator once a day.
//!
//! Wakes at the configured UTC hour and aggregates the previous calendar
//! day. Stops when the shutdown watch channel flips to `true`.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use super::aggregator::DailyMessageAggregator;

/// Background service invoking [`DailyMessageAggregator::run_once`] daily.
pub struct DailyAggregationScheduler {
    aggregator: Arc<DailyMessageAggregator>,
    run_hour_utc: u32,
}

impl DailyAggregationScheduler {
    pub fn new(aggregator: Arc<DailyMessageAggregator>, run_hour_utc: u32) -> Self {
        Self {
            aggregator,
            run_hour_utc: run_hour_utc.min(23),
        }
    }

    /// Run until the shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(run_hour_utc = self.run_hour_utc, "aggregation scheduler started");
        loop {
            let now = Utc::now();
            let next = next_run_after(now, self.run_hour_utc);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            tracing::debug!(next_run = %next, "aggregation scheduled");

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("aggregation scheduler stopped");
                        return;
                    }
                }

                _ = time::sleep(wait) => {
                    self.tick(next).await;
                }
            }
        }
    }

    /// Aggregate the day before `fired_at`.
    pub async fn tick(&self, fired_at: DateTime<Utc>) {
        let day = previous_day(fired_at);
        match self.aggregator.run_once(day).await {
            Ok(report) if report.is_clean() => {}
            Ok(report) => tracing::warn!(
                %day,
                failures = report.failures.len(),
                "daily aggregation finished with failures"
            ),
            Err(e) => tracing::error!(%day, error = %e, "daily aggregation failed"),
        }
    }
}

/// The first instant strictly after `now` at `hour:00:00` UTC.
fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let today = now.date_naive();
    let candidate = today
        .and_hms_opt(hour, 0, 0)
        .map(|t| Utc.from_utc_datetime(&t))
        .unwrap_or(now);
    if candidate > now {
        candidate
    } else {
        candidate + ChronoDuration::days(1)
    }
}

fn previous_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive().pred_opt().unwrap_or(at.date_naive())
}
