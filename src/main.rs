use std::{sync::Arc, time::Duration};

use nightreel_api::{
    config::Config,
    create_router,
    db::{self, InMemoryRepository, MovieRepository, PgMovieRepository},
    services::{MetadataProvider, TmdbProvider},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nightreel_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let scoring = config.scoring()?;

    let repository: Arc<dyn MovieRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = db::create_pool(database_url, config.database_max_connections).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgMovieRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; ratings are kept in memory only");
            Arc::new(InMemoryRepository::new())
        }
    };

    let metadata: Option<Arc<dyn MetadataProvider>> = match &config.tmdb_api_key {
        Some(api_key) => Some(Arc::new(TmdbProvider::new(
            api_key.clone(),
            config.tmdb_api_url.clone(),
            Duration::from_secs(config.tmdb_timeout_secs),
        )?)),
        None => {
            tracing::warn!("TMDB_API_KEY is not set; import, related, discover and roulette are disabled");
            None
        }
    };

    tracing::info!(
        repository = repository.name(),
        metadata = metadata.as_ref().map(|m| m.name()).unwrap_or("none"),
        liked_threshold = scoring.liked_threshold,
        "Configuration loaded"
    );

    let app = create_router(AppState::new(repository, metadata, scoring));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
