use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{auth, boards, cards, collaborators, lists};
use crate::middleware::{require_auth, require_membership};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health))
        .merge(auth_routes(state.clone()))
        .merge(board_routes(state.clone()))
        .merge(list_routes(state.clone()))
        .merge(card_routes(state.clone()))
        .merge(collaborator_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me).delete(auth::delete_account))
        .route("/auth/logout", post(auth::logout))
        .route_layer(from_fn_with_state(state, require_auth))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signup/resend", post(auth::resend_signup))
        .route("/auth/confirm-signup", post(auth::confirm_signup))
        .route("/auth/login", post(auth::login))
        .route(
            "/auth/reset-password",
            post(auth::request_password_reset).put(auth::reset_password),
        )
}

fn board_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/boards/:board_id",
            get(boards::get).patch(boards::update).delete(boards::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_membership))
        .route("/boards", get(boards::list).post(boards::create))
        // Applies to everything above; runs before the membership guard.
        .route_layer(from_fn_with_state(state, require_auth))
}

fn list_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/lists/:board_id", get(lists::list).post(lists::create))
        .route(
            "/lists/:board_id/:list_id",
            patch(lists::update).delete(lists::delete),
        )
        .route("/lists/:board_id/:list_id/position", patch(lists::update_position))
        .route_layer(from_fn_with_state(state.clone(), require_membership))
        .route_layer(from_fn_with_state(state, require_auth))
}

fn card_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/cards/:board_id", get(cards::list))
        .route("/cards/:board_id/:list_id", post(cards::create))
        .route(
            "/cards/:board_id/:list_id/:card_id",
            patch(cards::update).delete(cards::delete),
        )
        .route(
            "/cards/:board_id/:list_id/:card_id/position",
            patch(cards::update_position),
        )
        .route_layer(from_fn_with_state(state.clone(), require_membership))
        .route_layer(from_fn_with_state(state, require_auth))
}

fn collaborator_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/collaborators/:board_id",
            get(collaborators::list).post(collaborators::add),
        )
        .route(
            "/collaborators/:board_id/:collaborator_id",
            axum::routing::delete(collaborators::remove),
        )
        .route_layer(from_fn_with_state(state.clone(), require_membership))
        .route_layer(from_fn_with_state(state, require_auth))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(86400));

    // Origin validity is checked in AppConfig::from_env; a config built
    // some other way with an unusable value simply allows no origin.
    match config.server.allowed_origin() {
        Some(origin) => cors.allow_origin(origin),
        None => cors,
    }
}
