use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence recorded when the generation path does not supply one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// An append-only log entry holding one generated observation.
///
/// Insights are never updated. Retention is unbounded; retrieval is capped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub insight_type: InsightType,
    pub content: String,
    /// Serialized reference to task ids, if any.
    pub related_tasks: Option<String>,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Pattern,
    Completion,
    Failure,
    Recommendation,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Completion => "completion",
            Self::Failure => "failure",
            Self::Recommendation => "recommendation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pattern" => Some(Self::Pattern),
            "completion" => Some(Self::Completion),
            "failure" => Some(Self::Failure),
            "recommendation" => Some(Self::Recommendation),
            _ => None,
        }
    }
}

/// Input for appending an insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInsight {
    pub insight_type: InsightType,
    pub content: String,
    pub related_tasks: Option<String>,
    /// Defaults to [`DEFAULT_CONFIDENCE`].
    pub confidence_score: Option<f64>,
}

impl NewInsight {
    pub fn new(insight_type: InsightType, content: impl Into<String>) -> Self {
        Self {
            insight_type,
            content: content.into(),
            related_tasks: None,
            confidence_score: None,
        }
    }
}

/// The four categories of observations produced for a task list.
///
/// Field names follow the JSON object the text-generation API is asked to
/// return, so the same type parses model replies and serves API responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub patterns: Vec<String>,
    pub completion_insights: Vec<String>,
    pub failure_reasons: Vec<String>,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Every string paired with the insight category it is logged under.
    pub fn categorized(&self) -> impl Iterator<Item = (InsightType, &str)> {
        fn tag(kind: InsightType, items: &[String]) -> impl Iterator<Item = (InsightType, &str)> {
            items.iter().map(move |s| (kind, s.as_str()))
        }
        tag(InsightType::Pattern, &self.patterns)
            .chain(tag(InsightType::Completion, &self.completion_insights))
            .chain(tag(InsightType::Failure, &self.failure_reasons))
            .chain(tag(InsightType::Recommendation, &self.recommendations))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
            + self.completion_insights.len()
            + self.failure_reasons.len()
            + self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
