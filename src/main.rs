use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api_log;
mod cache;
mod config;
mod github;
mod routes;
mod service;

use api_log::ApiLogStore;
use config::Config;
use github::client::GitHubClient;
use routes::{create_router, mount, AppState};
use service::UserLookupService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "github_followings_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the API call log
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    let api_log = Arc::new(ApiLogStore::new(pool));
    api_log.init_tables().await?;
    tracing::info!("API call log ready ({} calls recorded so far)", api_log.count().await?);

    let github = Arc::new(GitHubClient::new(&config)?);

    let service = Arc::new(UserLookupService::new(
        github,
        api_log,
        Duration::from_secs(config.cache_ttl_secs),
        config.cache_max_capacity,
    ));

    let bind_addr = config.bind_addr.clone();
    let api_prefix = config.api_prefix.clone();

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        service,
    };

    let app = mount(&api_prefix, create_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}{}", bind_addr, api_prefix);

    axum::serve(listener, app).await?;

    Ok(())
}
