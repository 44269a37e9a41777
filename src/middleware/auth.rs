use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const MESSAGE: &str = "Failed to verify auth";

/// Authenticated caller context, inserted by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub subject_id: Uuid,
    pub access_token: String,
}

/// Bearer-token guard. Verifies the access token against the identity
/// provider's signing keys and exposes the resolved subject id to
/// downstream handlers. Rejects with 401 before any further processing.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .map_err(|detail| ApiError::unauthorized(MESSAGE, detail))?;

    let claims = state
        .verifier
        .verify(&token)
        .await
        .map_err(|e| ApiError::unauthorized(MESSAGE, e))?;

    request.extensions_mut().insert(AuthContext {
        subject_id: claims.sub,
        access_token: token,
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or("Authorization bearer not provided")?;

    let value = header
        .to_str()
        .map_err(|_| "Invalid authorization header format")?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization bearer not provided")?;

    if token.trim().is_empty() {
        return Err("Access token not provided in authorization bearer");
    }

    Ok(token.to_string())
}
