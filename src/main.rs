//! Churnwatch server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use churnwatch::{create_router, AppState, ChurnPredictor, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churnwatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Churnwatch starting...");
    tracing::info!("Dataset: {}", config.dataset_path.display());

    let predictor = Arc::new(ChurnPredictor::new(
        config.dataset_path.clone(),
        &config.model_dir,
    ));

    // Startup policy: reuse persisted artifacts, otherwise train before
    // accepting any request.
    if !predictor.load() {
        tracing::info!("No persisted model found, training a new one...");
        predictor
            .train()
            .context("initial training failed; cannot serve without a model")?;
    }

    let app = create_router(AppState {
        predictor: predictor.clone(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
