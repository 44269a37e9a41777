use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{sort_by_position, List};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateList {
    pub id: Uuid,
    pub title: String,
    pub position: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateList {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListPosition {
    pub position: f64,
}

/// GET /lists/:board_id - sorted ascending by position.
pub async fn list(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<List>>, ApiError> {
    let mut lists = sqlx::query_as::<_, List>(
        "SELECT *
         FROM lists
         WHERE board_id = $1",
    )
    .bind(board_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to retrieve lists", e))?;

    sort_by_position(&mut lists);

    Ok(ApiResponse::ok("Successfully retrieved lists", lists))
}

/// POST /lists/:board_id - position is an opaque client-supplied value,
/// stored verbatim.
pub async fn create(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Json(body): Json<CreateList>,
) -> Result<ApiResponse, ApiError> {
    sqlx::query(
        "INSERT INTO lists (id, board_id, title, position)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(body.id)
    .bind(board_id)
    .bind(&body.title)
    .bind(body.position)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to create list", e))?;

    Ok(ApiResponse::created_message("Successfully created list"))
}

/// PATCH /lists/:board_id/:list_id
pub async fn update(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateList>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to update list";

    let result = sqlx::query(
        "UPDATE lists
         SET title = $1
         WHERE id = $2 AND board_id = $3",
    )
    .bind(&body.title)
    .bind(list_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(
            MESSAGE,
            "Could not find list in database",
        ));
    }

    Ok(ApiResponse::message("Successfully updated list"))
}

/// PATCH /lists/:board_id/:list_id/position
pub async fn update_position(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateListPosition>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to update list position";

    let result = sqlx::query(
        "UPDATE lists
         SET position = $1
         WHERE id = $2 AND board_id = $3",
    )
    .bind(body.position)
    .bind(list_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(
            MESSAGE,
            "Could not find list in database",
        ));
    }

    Ok(ApiResponse::message("Successfully updated list position"))
}

/// DELETE /lists/:board_id/:list_id
pub async fn delete(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse, ApiError> {
    sqlx::query(
        "DELETE FROM lists
         WHERE id = $1 AND board_id = $2",
    )
    .bind(list_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to delete list", e))?;

    Ok(ApiResponse::message("Successfully deleted list"))
}
