use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::analytics::parse_date;
use crate::error::Error;
use crate::models::*;
use crate::repository::parse_reorder_request;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a library error to a status and body.
///
/// Validation and not-found messages are safe to show the client. Store
/// failures are logged in full and reported with a generic message.
fn error_response(e: Error) -> (StatusCode, String) {
    match e {
        Error::Validation(msg) => {
            tracing::warn!("Validation error: {}", msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        Error::NotFound(_) => {
            let msg = e.to_string();
            tracing::debug!("{}", msg);
            (StatusCode::NOT_FOUND, msg)
        }
        other => {
            tracing::error!("Internal error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================
// Tasks
// ============================================================

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    state.tasks.list_all().map(Json).map_err(error_response)
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    state.tasks.get(id).map(Json).map_err(error_response)
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    state
        .tasks
        .create(input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(error_response)
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTaskInput>,
) -> ApiResult<Json<Task>> {
    state.tasks.update(id, input).map(Json).map_err(error_response)
}

/// Body is taken as raw JSON so that a non-array `tasks` field is reported
/// as a validation error.
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let items = parse_reorder_request(&body).map_err(error_response)?;
    state.tasks.reorder(&items).map_err(error_response)?;
    Ok(success())
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.tasks.delete(id).map_err(error_response)?;
    Ok(success())
}

// ============================================================
// Analytics
// ============================================================

/// Query parameters for the daily stats endpoint.
#[derive(Debug, Deserialize)]
pub struct DailyStatsQuery {
    /// `YYYY-MM-DD`; today (UTC) when absent.
    pub date: Option<String>,
}

pub async fn daily_stats(
    State(state): State<AppState>,
    Query(query): Query<DailyStatsQuery>,
) -> ApiResult<Json<DailyStat>> {
    let date = query
        .date
        .as_deref()
        .map(parse_date)
        .transpose()
        .map_err(error_response)?;

    let stat = state.analytics.daily_stats(date).map_err(error_response)?;

    if state.cache_daily_stats {
        // The response does not depend on the cache write
        if let Err(e) = state.analytics.cache_daily_stat(&stat) {
            tracing::warn!("Failed to cache daily stat for {}: {}", stat.date, e);
        }
    }

    Ok(Json(stat))
}

pub async fn weekly_stats(State(state): State<AppState>) -> ApiResult<Json<Vec<DailyStat>>> {
    state
        .analytics
        .weekly_stats()
        .map(Json)
        .map_err(error_response)
}

// ============================================================
// Insights
// ============================================================

/// Analyze every task and log each resulting string as an insight.
pub async fn analyze(State(state): State<AppState>) -> ApiResult<Json<AnalysisResult>> {
    let tasks = state.tasks.list_all().map_err(error_response)?;
    let result = state.insights.analyze(&tasks).await;
    state
        .insights
        .record_analysis(&result)
        .map_err(error_response)?;
    Ok(Json(result))
}

pub async fn recent_insights(State(state): State<AppState>) -> ApiResult<Json<Vec<Insight>>> {
    state
        .insights
        .recent_insights()
        .map(Json)
        .map_err(error_response)
}
