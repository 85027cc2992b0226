//! Productivity insights for a task list.
//!
//! [`InsightGenerator::analyze`] asks the text-generation API for an
//! [`AnalysisResult`] and falls back to [`basic_analysis`] whenever the API
//! is not configured, fails, or replies with something unparseable. The
//! generator also owns the append-only `insights` log.

mod client;
mod heuristic;

use std::fmt::Write as _;
use std::sync::Arc;

use rusqlite::{params, Row};

use crate::config::LlmConfig;
use crate::db::{parse_label, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::*;

pub use client::{parse_analysis, CompletionClient, OpenAiClient};
pub use heuristic::{basic_analysis, most_common_priority, TaskCounts};

/// Maximum rows returned by [`InsightGenerator::recent_insights`].
pub const RECENT_INSIGHTS_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct InsightGenerator {
    db: Database,
    client: Option<Arc<dyn CompletionClient>>,
}

impl InsightGenerator {
    pub fn new(db: Database, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { db, client }
    }

    /// Build with the HTTP client when an API key is configured.
    ///
    /// A client that cannot be constructed is logged and the generator runs
    /// on the heuristic alone.
    pub fn from_config(db: Database, config: &LlmConfig) -> Self {
        let client = match OpenAiClient::from_config(config) {
            Ok(Some(client)) => {
                tracing::info!(model = %config.model, "Text-generation insights enabled");
                Some(Arc::new(client) as Arc<dyn CompletionClient>)
            }
            Ok(None) => {
                tracing::info!("No API key configured, insights use the local heuristic");
                None
            }
            Err(e) => {
                tracing::warn!("Text-generation client unavailable: {}", e);
                None
            }
        };
        Self::new(db, client)
    }

    /// Analyze a task list. Never fails: every external failure degrades to
    /// the heuristic.
    pub async fn analyze(&self, tasks: &[Task]) -> AnalysisResult {
        if tasks.is_empty() {
            return empty_analysis();
        }

        let Some(client) = &self.client else {
            return basic_analysis(tasks);
        };

        let prompt = build_prompt(tasks);
        match client.complete(&prompt).await.and_then(|raw| parse_analysis(&raw)) {
            Ok(result) => {
                tracing::debug!(items = result.len(), "Analysis generated by text-generation API");
                result
            }
            Err(e) => {
                tracing::warn!("Falling back to heuristic analysis: {}", e);
                basic_analysis(tasks)
            }
        }
    }

    /// Append one insight row.
    pub fn save_insight(&self, insight: NewInsight) -> Result<Insight> {
        let confidence = insight.confidence_score.unwrap_or(DEFAULT_CONFIDENCE);
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::validation(format!(
                "confidence_score must be between 0 and 1, got {confidence}"
            )));
        }

        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO insights (insight_type, content, related_tasks, confidence_score)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                insight.insight_type.as_str(),
                insight.content,
                insight.related_tasks,
                confidence,
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
            "SELECT id, created_at, insight_type, content, related_tasks, confidence_score
             FROM insights WHERE id = ?1",
            [id],
            row_to_insight,
        )?)
    }

    /// Log every string of an analysis under its category.
    pub fn record_analysis(&self, result: &AnalysisResult) -> Result<Vec<Insight>> {
        let saved = result
            .categorized()
            .map(|(kind, content)| self.save_insight(NewInsight::new(kind, content)))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = saved.len(), "Recorded insights");
        Ok(saved)
    }

    /// Most recent insights first, at most [`RECENT_INSIGHTS_LIMIT`].
    pub fn recent_insights(&self) -> Result<Vec<Insight>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT id, created_at, insight_type, content, related_tasks, confidence_score
             FROM insights ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let insights = stmt
            .query_map([RECENT_INSIGHTS_LIMIT], row_to_insight)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(insights)
    }
}

/// The fixed reply for a user with no tasks.
pub fn empty_analysis() -> AnalysisResult {
    AnalysisResult {
        patterns: vec!["No tasks to analyze yet".to_string()],
        completion_insights: vec!["Start adding tasks to get insights".to_string()],
        failure_reasons: Vec::new(),
        recommendations: vec![
            "Create your first task to begin tracking your productivity".to_string(),
        ],
    }
}

/// Summarize the task list for the text-generation API.
pub fn build_prompt(tasks: &[Task]) -> String {
    let counts = TaskCounts::of(tasks);
    let mut prompt = String::from("Analyze this user's task history.\n\n");
    let _ = writeln!(prompt, "Total tasks: {}", counts.total);
    let _ = writeln!(prompt, "Completed: {}", counts.completed);
    let _ = writeln!(prompt, "Incomplete: {}", counts.incomplete);
    prompt.push_str("\nTasks:\n");
    for task in tasks {
        let _ = writeln!(
            prompt,
            "- {} (priority: {}, status: {})",
            task.title,
            task.priority.as_str(),
            task.status.as_str()
        );
    }
    prompt.push_str(
        "\nRespond with a JSON object with exactly these fields, each an array of 2-3 short strings:\n\
         {\"patterns\": [...], \"completionInsights\": [...], \"failureReasons\": [...], \"recommendations\": [...]}\n",
    );
    prompt
}

fn row_to_insight(row: &Row<'_>) -> rusqlite::Result<Insight> {
    Ok(Insight {
        id: row.get(0)?,
        created_at: parse_timestamp(1, &row.get::<_, String>(1)?)?,
        insight_type: parse_label(2, &row.get::<_, String>(2)?, InsightType::from_str)?,
        content: row.get(3)?,
        related_tasks: row.get(4)?,
        confidence_score: row.get(5)?,
    })
}
