mod config;
mod error;
mod flash;
mod seed;
mod server;
mod upload;
mod views;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blog_common::redis::RedisCache;
use blog_common::store::BlogStore;

use config::Config;
use flash::FlashStore;
use server::AppState;
use upload::UploadStore;
use views::Views;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting cooking-blog server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        db_path = %config.db_path,
        public_dir = %config.public_dir,
        redis = config.redis_url.is_some(),
        "configuration loaded"
    );

    // 2. Open the store, seeding demo content when asked to
    let store = BlogStore::open(&config.db_path)?;
    if config.seed_demo {
        seed::seed_if_empty(&store).await?;
    }

    // 3. Flash notices (Redis optional, falls back to process memory)
    let redis = RedisCache::new(config.redis_url.as_deref());
    let flash = FlashStore::connect(redis, config.flash_ttl_secs).await;

    // 4. Uploads directory and templates
    let uploads = UploadStore::new(config.uploads_dir());
    uploads.ensure_dir().await?;
    let views = Views::new()?;

    let state = AppState {
        store,
        flash: Arc::new(flash),
        views: Arc::new(views),
        uploads: Arc::new(uploads),
    };
    let app = server::router(state, &config.public_dir(), config.upload_limit_bytes);

    // 5. Serve until Ctrl+C / SIGTERM
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(address = %config.bind_addr, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
