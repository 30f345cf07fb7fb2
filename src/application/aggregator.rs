//! DailyMessageAggregator - Per-user, per-group chat message counts for a day.
//!
//! Each run scans every group's chat for one UTC day and overwrites the
//! matching count rows. Row ids are deterministic, so reruns and overlapping
//! runs converge on the same data.
//!
//! ## Failure isolation
//!
//! A group whose messages cannot be read, or whose rows cannot be written, is
//! recorded in the report and logged; the other groups still complete.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::application::records::{chat_message, daily_count_document, FIELD_TIMESTAMP};
use crate::domain::activity::{tally, AggregationReport, ChatMessage};
use crate::domain::foundation::{DayWindow, GroupId};
use crate::ports::{Collection, DocumentStore, Filter, StoreError};

/// Default number of groups scanned concurrently.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 4;

/// Result of scanning one group.
struct GroupScan {
    group_id: GroupId,
    rows_written: usize,
    errors: Vec<String>,
}

/// Counts each user's chat messages per group and day.
pub struct DailyMessageAggregator {
    store: Arc<dyn DocumentStore>,
    scan_concurrency: usize,
}

impl DailyMessageAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
        }
    }

    pub fn with_scan_concurrency(mut self, concurrency: usize) -> Self {
        self.scan_concurrency = concurrency.max(1);
        self
    }

    /// Counts messages sent during `day` (UTC) and upserts one row per
    /// sender and group.
    ///
    /// Fails only when the group list itself cannot be read.
    pub async fn run_once(&self, day: NaiveDate) -> Result<AggregationReport, StoreError> {
        let window = DayWindow::for_day(day);
        let groups = self.store.query(&Collection::Groups, &[]).await?;
        let group_ids: Vec<GroupId> = groups
            .into_iter()
            .filter_map(|doc| GroupId::new(doc.id).ok())
            .collect();

        tracing::info!(%day, groups = group_ids.len(), "daily message aggregation started");

        let scans: Vec<GroupScan> = stream::iter(group_ids)
            .map(|group_id| self.scan_group(group_id, window))
            .buffer_unordered(self.scan_concurrency)
            .collect()
            .await;

        let mut report = AggregationReport::new(day);
        for scan in scans {
            report.groups_scanned += 1;
            report.rows_written += scan.rows_written;
            for error in scan.errors {
                tracing::warn!(group_id = %scan.group_id, %day, error = %error, "group aggregation failed");
                report.record_failure(scan.group_id.clone(), error);
            }
        }
        report
            .failures
            .sort_by(|a, b| a.group_id.cmp(&b.group_id));

        tracing::info!(
            %day,
            groups_scanned = report.groups_scanned,
            rows_written = report.rows_written,
            failures = report.failures.len(),
            "daily message aggregation finished"
        );
        Ok(report)
    }

    async fn scan_group(&self, group_id: GroupId, window: DayWindow) -> GroupScan {
        let mut scan = GroupScan {
            group_id,
            rows_written: 0,
            errors: Vec::new(),
        };

        let messages = match self.read_messages(&scan.group_id, &window).await {
            Ok(messages) => messages,
            Err(e) => {
                scan.errors.push(e.to_string());
                return scan;
            }
        };

        for row in tally(&scan.group_id, &window, &messages) {
            let written = match daily_count_document(&row) {
                Ok(body) => {
                    self.store
                        .put(&Collection::DailyMessageCounts, &row.document_id(), body, false)
                        .await
                }
                Err(e) => Err(e),
            };
            match written {
                Ok(_) => scan.rows_written += 1,
                Err(e) => scan.errors.push(format!("row {}: {}", row.document_id(), e)),
            }
        }
        scan
    }

    async fn read_messages(
        &self,
        group_id: &GroupId,
        window: &DayWindow,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let docs = self
            .store
            .query(
                &Collection::ChatMessages(group_id.clone()),
                &[Filter::time_range(FIELD_TIMESTAMP, window.start(), window.end())],
            )
            .await?;

        Ok(docs
            .iter()
            .filter_map(|doc| match chat_message(group_id, doc) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::debug!(group_id = %group_id, message_id = %doc.id, error = %e, "skipping unreadable message");
                    None
                }
            })
            .collect())
    }
}
