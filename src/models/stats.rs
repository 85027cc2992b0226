use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completion summary for the tasks created on one calendar date (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    /// Percentage in 0..=100, unrounded.
    pub completion_rate: f64,
}

impl DailyStat {
    pub fn new(date: NaiveDate, total_tasks: i64, completed_tasks: i64) -> Self {
        let completion_rate = if total_tasks == 0 {
            0.0
        } else {
            completed_tasks as f64 / total_tasks as f64 * 100.0
        };
        Self {
            date,
            total_tasks,
            completed_tasks,
            completion_rate,
        }
    }

    /// The record reported for a date with no tasks.
    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, 0, 0)
    }
}
