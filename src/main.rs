use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskpulse::{analytics, api, config::Config, db::Database};

#[derive(Parser)]
#[command(name = "taskpulse")]
#[command(about = "Personal task tracker with completion analytics and insights")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// SQLite database file (overrides TASKPULSE_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print completion stats for one day as JSON
    Stats {
        /// Date as YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        date: Option<String>,

        /// SQLite database file (overrides TASKPULSE_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taskpulse=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &Config, override_path: Option<PathBuf>) -> anyhow::Result<Database> {
    let db = match override_path.or_else(|| config.database_path.clone()) {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate().context("Failed to run database migrations")?;
    Ok(db)
}

async fn serve(
    config: Config,
    host: String,
    port: u16,
    db_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    tracing::info!("Starting taskpulse server on port {}", port);

    let db = open_database(&config, db_path)?;
    let app = api::create_router(api::AppState::new(db.clone(), &config));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("taskpulse server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    db.close()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn print_stats(
    config: Config,
    date: Option<String>,
    db_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let date = date.as_deref().map(analytics::parse_date).transpose()?;
    let db = open_database(&config, db_path)?;
    let stat = analytics::AnalyticsAggregator::new(db.clone()).daily_stats(date)?;
    println!("{}", serde_json::to_string_pretty(&stat)?);
    db.close()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port, host, db }) => serve(config, host, port, db).await,
        Some(Commands::Stats { date, db }) => print_stats(config, date, db),
        None => serve(config, "127.0.0.1".to_string(), 3000, None).await,
    }
}
