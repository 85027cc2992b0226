//! Completion statistics computed on demand from the tasks table.
//!
//! Calendar dates are UTC and taken from the first ten characters of the
//! stored `created_at` text.

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{format_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::DailyStat;

/// Width of the trailing window reported by [`AnalyticsAggregator::weekly_stats`].
pub const WEEK_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AnalyticsAggregator {
    db: Database,
}

impl AnalyticsAggregator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Stats for tasks created on `date` (today when `None`).
    ///
    /// A date with no tasks yields a zero-valued record rather than nothing.
    pub fn daily_stats(&self, date: Option<NaiveDate>) -> Result<DailyStat> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let conn = self.db.lock();
        let stat = conn
            .query_row(
                "SELECT substr(created_at, 1, 10) AS day,
                        COUNT(*),
                        SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END)
                 FROM tasks
                 WHERE substr(created_at, 1, 10) = ?1
                 GROUP BY day",
                [date.to_string()],
                row_to_stat,
            )
            .optional()?;
        Ok(stat.unwrap_or_else(|| DailyStat::empty(date)))
    }

    /// One row per date in the trailing seven days that has at least one
    /// task, newest date first. Dates without tasks are absent.
    pub fn weekly_stats(&self) -> Result<Vec<DailyStat>> {
        let since = format_timestamp(Utc::now() - Duration::days(WEEK_DAYS));
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT substr(created_at, 1, 10) AS day,
                    COUNT(*),
                    SUM(CASE WHEN status = 'done' THEN 1 ELSE 0 END)
             FROM tasks
             WHERE created_at >= ?1
             GROUP BY day
             ORDER BY day DESC",
        )?;
        let stats = stmt
            .query_map([since], row_to_stat)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
    }

    /// Upsert a computed stat into the `daily_stats` cache table.
    pub fn cache_daily_stat(&self, stat: &DailyStat) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO daily_stats (date, total_tasks, completed_tasks, completion_rate, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(date) DO UPDATE SET
                total_tasks = excluded.total_tasks,
                completed_tasks = excluded.completed_tasks,
                completion_rate = excluded.completion_rate,
                updated_at = excluded.updated_at",
            params![
                stat.date.to_string(),
                stat.total_tasks,
                stat.completed_tasks,
                stat.completion_rate,
                format_timestamp(Utc::now()),
            ],
        )?;
        tracing::debug!(date = %stat.date, "Cached daily stat");
        Ok(())
    }

    pub fn cached_daily_stat(&self, date: NaiveDate) -> Result<Option<DailyStat>> {
        let conn = self.db.lock();
        let stat = conn
            .query_row(
                "SELECT date, total_tasks, completed_tasks, completion_rate
                 FROM daily_stats WHERE date = ?1",
                [date.to_string()],
                |row| {
                    Ok(DailyStat {
                        date: parse_date_column(row, 0)?,
                        total_tasks: row.get(1)?,
                        completed_tasks: row.get(2)?,
                        completion_rate: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(stat)
    }
}

/// Parse a `YYYY-MM-DD` query value.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid date '{s}', expected YYYY-MM-DD")))
}

fn row_to_stat(row: &Row<'_>) -> rusqlite::Result<DailyStat> {
    Ok(DailyStat::new(
        parse_date_column(row, 0)?,
        row.get(1)?,
        row.get(2)?,
    ))
}

fn parse_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date("2026-03-09").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        for bad in ["03/09/2026", "2026-13-01", "yesterday", ""] {
            assert!(matches!(parse_date(bad), Err(Error::Validation(_))), "{bad}");
        }
    }

    #[test]
    fn completion_rate_is_unrounded_percentage() {
        let stat = DailyStat::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 3, 1);
        assert!((stat.completion_rate - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_day_has_zero_rate() {
        let stat = DailyStat::empty(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(stat.total_tasks, 0);
        assert_eq!(stat.completed_tasks, 0);
        assert_eq!(stat.completion_rate, 0.0);
    }
}
