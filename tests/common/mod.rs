#![allow(dead_code)]

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use kanban_api::auth::TokenVerifier;
use kanban_api::config::{AppConfig, CognitoConfig, DatabaseConfig, Environment, ServerConfig};
use kanban_api::idp::CognitoIdp;
use kanban_api::{app, AppState};

pub fn test_config(frontend_origin: &str) -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig {
            port: 0,
            frontend_origin: frontend_origin.to_string(),
        },
        database: DatabaseConfig {
            host: "127.0.0.1".to_string(),
            user: "kanban".to_string(),
            password: "kanban".to_string(),
            port: 5432,
            name: "kanban_test".to_string(),
            max_connections: 2,
        },
        cognito: CognitoConfig {
            region: "eu-west-1".to_string(),
            user_pool_id: "eu-west-1_TestPool".to_string(),
            client_id: "test-client-id".to_string(),
        },
    }
}

/// AppState around an existing pool. The verifier and identity-provider
/// client are built offline; nothing talks to the network until used.
pub async fn test_state(pool: PgPool, config: AppConfig) -> AppState {
    let verifier = TokenVerifier::new(&config.cognito);
    let idp = CognitoIdp::new(&config.cognito).await;

    AppState {
        config: Arc::new(config),
        pool,
        idp,
        verifier: Arc::new(verifier),
    }
}

pub async fn test_app() -> axum::Router {
    test_app_with_origin("http://localhost:5173").await
}

/// Build the router in-process with a lazily connected pool. Guard tests
/// are rejected before any query runs, so no database is required.
pub async fn test_app_with_origin(frontend_origin: &str) -> axum::Router {
    let config = test_config(frontend_origin);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_lazy(&config.database.connection_url())
        .expect("failed to build lazy pool");

    app(test_state(pool, config).await)
}
