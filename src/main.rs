use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use kanban_api::auth::TokenVerifier;
use kanban_api::config::AppConfig;
use kanban_api::idp::CognitoIdp;
use kanban_api::{app, database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up RDS_*/COGNITO_* vars.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting kanban-api in {:?} mode", config.environment);

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    let idp = CognitoIdp::new(&config.cognito).await;
    let verifier = TokenVerifier::new(&config.cognito);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);

    let state = AppState {
        config: Arc::new(config),
        pool: pool.clone(),
        idp,
        verifier: Arc::new(verifier),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("listening on http://{bind_addr}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain in-flight connections before exiting.
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
