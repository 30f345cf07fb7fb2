//! Outcome of one aggregation run.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::foundation::GroupId;

/// A group whose scan or row write failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    pub group_id: GroupId,
    pub error: String,
}

/// Summary of a `run_once` call. Failures never abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub day: NaiveDate,
    pub groups_scanned: usize,
    pub rows_written: usize,
    pub failures: Vec<GroupFailure>,
}

impl AggregationReport {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            groups_scanned: 0,
            rows_written: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, group_id: GroupId, error: impl Into<String>) {
        self.failures.push(GroupFailure {
            group_id,
            error: error.into(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
