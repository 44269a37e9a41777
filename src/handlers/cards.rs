use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{sort_by_position, Card};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub position: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCard {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardPosition {
    /// Target list; same as the current list for a reorder within it.
    #[serde(rename = "newListId")]
    pub new_list_id: Uuid,
    pub position: f64,
}

/// GET /cards/:board_id - all cards on the board, sorted ascending by
/// position.
pub async fn list(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<Card>>, ApiError> {
    let mut cards = sqlx::query_as::<_, Card>(
        "SELECT *
         FROM cards
         WHERE board_id = $1",
    )
    .bind(board_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to retrieve cards", e))?;

    sort_by_position(&mut cards);

    Ok(ApiResponse::ok("Successfully retrieved cards", cards))
}

/// POST /cards/:board_id/:list_id
pub async fn create(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<CreateCard>,
) -> Result<ApiResponse, ApiError> {
    sqlx::query(
        "INSERT INTO cards (id, board_id, list_id, title, description, position)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(body.id)
    .bind(board_id)
    .bind(list_id)
    .bind(&body.title)
    .bind(&body.description)
    .bind(body.position)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to create card", e))?;

    Ok(ApiResponse::created_message("Successfully created card"))
}

/// PATCH /cards/:board_id/:list_id/:card_id
pub async fn update(
    State(state): State<AppState>,
    Path((board_id, list_id, card_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(body): Json<UpdateCard>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to update card";

    let result = sqlx::query(
        "UPDATE cards
         SET title = $1, description = $2
         WHERE id = $3 AND list_id = $4 AND board_id = $5",
    )
    .bind(&body.title)
    .bind(&body.description)
    .bind(card_id)
    .bind(list_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(
            MESSAGE,
            "Could not find card in database",
        ));
    }

    Ok(ApiResponse::message("Successfully updated card"))
}

/// PATCH /cards/:board_id/:list_id/:card_id/position - updates position
/// and target list in one statement, covering both reorders and moves
/// between lists.
pub async fn update_position(
    State(state): State<AppState>,
    Path((board_id, list_id, card_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(body): Json<UpdateCardPosition>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to update card position";

    let result = sqlx::query(
        "UPDATE cards
         SET position = $1, list_id = $2
         WHERE id = $3 AND list_id = $4 AND board_id = $5",
    )
    .bind(body.position)
    .bind(body.new_list_id)
    .bind(card_id)
    .bind(list_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(
            MESSAGE,
            "Could not find card in database",
        ));
    }

    Ok(ApiResponse::message("Successfully updated card position"))
}

/// DELETE /cards/:board_id/:list_id/:card_id
pub async fn delete(
    State(state): State<AppState>,
    Path((board_id, list_id, card_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<ApiResponse, ApiError> {
    sqlx::query(
        "DELETE FROM cards
         WHERE id = $1 AND list_id = $2 AND board_id = $3",
    )
    .bind(card_id)
    .bind(list_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to delete card", e))?;

    Ok(ApiResponse::message("Successfully deleted card"))
}
