mod handlers;

use axum::{
    routing::{get, patch},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::analytics::AnalyticsAggregator;
use crate::config::Config;
use crate::db::Database;
use crate::insights::InsightGenerator;
use crate::repository::TaskRepository;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskRepository,
    pub analytics: AnalyticsAggregator,
    pub insights: InsightGenerator,
    /// Write each computed daily stat through to the cache table.
    pub cache_daily_stats: bool,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            tasks: TaskRepository::new(db.clone()),
            analytics: AnalyticsAggregator::new(db.clone()),
            insights: InsightGenerator::from_config(db, &config.llm),
            cache_daily_stats: config.cache_daily_stats,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Tasks
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route("/tasks/reorder", patch(handlers::reorder_tasks))
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // Analytics
        .route("/analytics/daily", get(handlers::daily_stats))
        .route("/analytics/weekly", get(handlers::weekly_stats))
        // Insights
        .route("/ai/analyze", get(handlers::analyze))
        .route("/ai/insights", get(handlers::recent_insights))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
