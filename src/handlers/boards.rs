use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Board, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthContext, BoardRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBoard {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoard {
    pub title: String,
}

/// POST /boards - the caller becomes the board's owner. The board row and
/// the owner membership row are inserted in one transaction; if either
/// insert fails the transaction rolls back and neither persists.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateBoard>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to create board";

    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| ApiError::internal(MESSAGE, e))?;

    sqlx::query(
        "INSERT INTO boards (id, owner_id, title, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(body.id)
    .bind(auth.subject_id)
    .bind(&body.title)
    .bind(body.created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    sqlx::query(
        "INSERT INTO boards_collaborators (user_id, board_id, role, joined_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(auth.subject_id)
    .bind(body.id)
    .bind(Role::Owner.as_str())
    .bind(body.created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    tx.commit()
        .await
        .map_err(|e| ApiError::internal(MESSAGE, e))?;

    Ok(ApiResponse::created_message("Successfully created board"))
}

/// GET /boards - every board the caller is a member of, newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<ApiResponse<Vec<Board>>, ApiError> {
    let boards = sqlx::query_as::<_, Board>(
        "SELECT b.*
         FROM boards b
         INNER JOIN boards_collaborators bc ON b.id = bc.board_id
         WHERE bc.user_id = $1
         ORDER BY b.created_at DESC",
    )
    .bind(auth.subject_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to retrieve boards", e))?;

    Ok(ApiResponse::ok("Successfully retrieved boards", boards))
}

/// GET /boards/:board_id - joined on membership so a non-member gets the
/// same 404 as a missing board (no existence leak).
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> Result<ApiResponse<Board>, ApiError> {
    const MESSAGE: &str = "Failed to retrieve board";

    let board = sqlx::query_as::<_, Board>(
        "SELECT b.*
         FROM boards b
         INNER JOIN boards_collaborators bc ON b.id = bc.board_id
         WHERE bc.user_id = $1 AND bc.board_id = $2
         LIMIT 1",
    )
    .bind(auth.subject_id)
    .bind(board_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?
    .ok_or_else(|| ApiError::not_found(MESSAGE, "Could not find board in database"))?;

    Ok(ApiResponse::ok("Successfully retrieved board", board))
}

/// PATCH /boards/:board_id - title only, any member.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(body): Json<UpdateBoard>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to update board";

    let result = sqlx::query(
        "UPDATE boards b
         SET title = $1
         FROM boards_collaborators bc
         WHERE b.id = bc.board_id AND bc.user_id = $2 AND bc.board_id = $3",
    )
    .bind(&body.title)
    .bind(auth.subject_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(
            MESSAGE,
            "Could not find board in database",
        ));
    }

    Ok(ApiResponse::message("Successfully updated board"))
}

/// DELETE /boards/:board_id - owner only. The delete is scoped by
/// `(id, owner_id)`, so an owner-id mismatch deletes nothing.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(BoardRole(role)): Extension<BoardRole>,
    Path(board_id): Path<Uuid>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to delete board";

    if role == Role::Collaborator {
        return Err(ApiError::forbidden(
            MESSAGE,
            "Cannot delete board as a collaborator",
        ));
    }

    sqlx::query(
        "DELETE FROM boards
         WHERE id = $1 AND owner_id = $2",
    )
    .bind(board_id)
    .bind(auth.subject_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    Ok(ApiResponse::message("Successfully deleted board"))
}
