use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

const MESSAGE: &str = "Failed to verify role";

/// The caller's role on the board in scope, inserted by
/// [`require_membership`].
#[derive(Clone, Copy, Debug)]
pub struct BoardRole(pub Role);

#[derive(Debug, Deserialize)]
pub struct BoardScope {
    board_id: Uuid,
}

/// Membership guard for board-scoped routes. Must run after
/// [`super::auth::require_auth`]. Looks the membership row up on every
/// request, since membership can change between requests.
pub async fn require_membership(
    State(state): State<AppState>,
    Path(scope): Path<BoardScope>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| {
            ApiError::unauthorized(MESSAGE, "User is not authorized to make request")
        })?;

    let role: Option<String> = sqlx::query_scalar(
        "SELECT role
         FROM boards_collaborators
         WHERE user_id = $1 AND board_id = $2
         LIMIT 1",
    )
    .bind(auth.subject_id)
    .bind(scope.board_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    let role = role
        .ok_or_else(|| ApiError::forbidden(MESSAGE, "User is not a board collaborator"))?;

    let role = Role::parse(&role)
        .ok_or_else(|| ApiError::internal(MESSAGE, format!("unrecognized role '{role}'")))?;

    request.extensions_mut().insert(BoardRole(role));

    Ok(next.run(request).await)
}
