use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use trashcam_server::application::classify::{ClassifyObjectsHandler, RecognizeObjectsHandler};
use trashcam_server::application::ports::{LanguageModelPort, ScoreRepository};
use trashcam_server::application::scoreboard::{IncrementScoreHandler, LeaderboardQuery};
use trashcam_server::config::AppConfig;
use trashcam_server::infrastructure::driven::{
    GeminiClient, InMemoryScoreRepository, PostgresScoreRepository,
};
use trashcam_server::infrastructure::driving::http::create_router;
use trashcam_server::infrastructure::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,trashcam_server=debug")),
        )
        .init();

    let config = AppConfig::load()?;
    tracing::info!("Trashcam server starting on {}", config.server.bind_addr);

    if config.llm.api_key.is_empty() {
        tracing::warn!("llm.api_key is not set, classification requests will fail upstream");
    }
    if config.auth.jwt_secret.is_empty() {
        tracing::warn!("auth.jwt_secret is not set, score updates are disabled");
    }

    let scores: Arc<dyn ScoreRepository> = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await
                .context("failed to connect to database")?;
            let repo = PostgresScoreRepository::new(pool);
            repo.ensure_schema().await.map_err(anyhow::Error::msg)?;
            tracing::info!("using Postgres score store");
            Arc::new(repo)
        }
        None => {
            tracing::info!("no database.url configured, scores are kept in memory");
            Arc::new(InMemoryScoreRepository::new())
        }
    };

    let model: Arc<dyn LanguageModelPort> = Arc::new(GeminiClient::new(&config.llm)?);

    let state = AppState {
        classify: Arc::new(ClassifyObjectsHandler::new(model.clone())),
        recognize: Arc::new(RecognizeObjectsHandler::new(model)),
        increment_score: Arc::new(IncrementScoreHandler::new(scores.clone())),
        leaderboard: Arc::new(LeaderboardQuery::new(scores, config.leaderboard.limit)),
        jwt_secret: config.auth.jwt_secret.clone(),
    };
    let app = create_router(state, config.server.cors_permissive);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Trashcam server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
