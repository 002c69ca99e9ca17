use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyloom_api::config::{ProviderConfig, ServerConfig, StorageConfig};
use storyloom_api::router::build_app_router;
use storyloom_api::state::AppState;
use storyloom_pipeline::{ImageBackfill, PromptImprover, RetryPolicy, StoryPipeline};
use storyloom_providers::openai::OpenAiClient;
use storyloom_providers::replicate::ReplicateClient;
use storyloom_providers::storage::{LocalBlobStore, S3BlobStore};
use storyloom_providers::{BlobStore, ImageGenerator, TextGenerator};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyloom_api=debug,tower_http=debug".into()),
        )
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let providers = ProviderConfig::from_env(&config);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = storyloom_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    storyloom_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    storyloom_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- External services ---
    let http = reqwest::Client::new();

    let openai = OpenAiClient::with_client(
        http.clone(),
        providers.openai_base_url.clone(),
        providers.openai_api_key.clone(),
        providers.openai_model.clone(),
    );
    tracing::info!(
        text_model = openai.model(),
        image_model = %providers.replicate_model,
        "Providers configured",
    );
    let text: Arc<dyn TextGenerator> = Arc::new(openai);
    let images: Arc<dyn ImageGenerator> = Arc::new(ReplicateClient::with_client(
        http,
        providers.replicate_base_url.clone(),
        providers.replicate_api_token.clone(),
        providers.replicate_model.clone(),
    ));

    let blobs: Arc<dyn BlobStore> = match &providers.storage {
        StorageConfig::Local {
            dir,
            public_base_url,
        } => {
            tracing::info!(dir = %dir.display(), %public_base_url, "Using local blob storage");
            Arc::new(LocalBlobStore::new(dir.clone(), public_base_url.clone()))
        }
        StorageConfig::S3 {
            bucket,
            public_base_url,
        } => {
            tracing::info!(%bucket, %public_base_url, "Using S3 blob storage");
            let store = S3BlobStore::from_env(bucket.clone(), public_base_url.clone()).await;
            Arc::new(store)
        }
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline: Arc::new(StoryPipeline::new(Arc::clone(&text))),
        improver: Arc::new(
            PromptImprover::new(text).with_model(providers.openai_improve_model.clone()),
        ),
        backfill: Arc::new(ImageBackfill::new(
            images,
            blobs,
            RetryPolicy::with_delay(providers.image_retry_delay),
        )),
    };

    // --- Router ---
    let app = build_app_router(state, &config, providers.local_blob_dir());

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // In-flight requests (including streamed generations) get
    // `shutdown_timeout_secs` to finish once a signal arrives.
    let (signalled_tx, mut signalled_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(true);
        })
        .into_future();
    let drain_limit = Duration::from_secs(config.shutdown_timeout_secs);
    let drain_deadline = async move {
        let _ = signalled_rx.changed().await;
        tokio::time::sleep(drain_limit).await;
    };

    tokio::select! {
        result = server => result.expect("Server error"),
        () = drain_deadline => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Shutdown timeout elapsed, dropping remaining connections",
            );
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
