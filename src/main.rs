use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cineclub_recs::{
    config::Config,
    db::{create_pool, InMemoryMovieStore, PgMovieStore},
    routes::{create_router, AppState},
    services::{MovieStore, RecommendationService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cineclub_recs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn MovieStore> = match &config.catalog_path {
        Some(path) => {
            tracing::info!(path = %path, "Using in-memory catalog");
            Arc::new(InMemoryMovieStore::from_file(path)?)
        }
        None => {
            tracing::info!(max_connections = config.max_connections, "Connecting to PostgreSQL");
            let pool = create_pool(&config.database_url, config.max_connections).await?;
            Arc::new(PgMovieStore::new(pool))
        }
    };

    let recommender = RecommendationService::new(store).with_shuffle_seed(config.recommendation_seed);
    let app = create_router(AppState::new(recommender));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
