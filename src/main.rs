use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linares::{
    api,
    config::{Settings, DEFAULT_API_TOKEN},
    media::{CloudinaryClient, MediaStore},
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linares=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    if settings.auth.api_token == DEFAULT_API_TOKEN {
        tracing::warn!("Using the default API token; set API_TOKEN before deploying");
    }

    tracing::info!("Starting server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let service_context = Arc::new(ServiceContext::new(db_pool.clone()));

    // Example rows for empty tables
    let seeded = service_context.record_repo.seed_defaults().await?;
    if !seeded.is_empty() {
        tracing::info!("Seeded {} example records", seeded.len());
    }

    // Initialize media host if configured
    let media: Option<Arc<dyn MediaStore>> = match CloudinaryClient::new(&settings.media)? {
        Some(client) => {
            match client.health_check().await {
                Ok(_) => tracing::info!("Media store {} is healthy", client.name()),
                Err(e) => tracing::warn!("Media store {} health check failed: {:?}", client.name(), e),
            }
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("Media storage disabled: no Cloudinary credentials");
            None
        }
    };

    let settings = Arc::new(settings);
    let app_state = api::state::AppState::new(service_context, media, settings.clone());
    let app = api::create_app(app_state);

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
