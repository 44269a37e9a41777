use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Collaborator, Role, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthContext, BoardRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddCollaborator {
    pub email: String,
}

/// GET /collaborators/:board_id - members joined with profile fields,
/// ordered by join time.
pub async fn list(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<Collaborator>>, ApiError> {
    let collaborators = sqlx::query_as::<_, Collaborator>(
        "SELECT u.id, u.given_name, u.family_name, u.email, bc.role, bc.joined_at
         FROM users u
         INNER JOIN boards_collaborators bc ON u.id = bc.user_id
         WHERE bc.board_id = $1
         ORDER BY bc.joined_at",
    )
    .bind(board_id)
    .fetch_all(&state.pool)
    .await
    .map_err(|e| ApiError::internal("Failed to retrieve collaborators", e))?;

    Ok(ApiResponse::ok(
        "Successfully retrieved collaborators",
        collaborators,
    ))
}

/// POST /collaborators/:board_id - owner-only invite by email. Unknown
/// email is 404, an existing membership is 409.
pub async fn add(
    State(state): State<AppState>,
    Extension(BoardRole(role)): Extension<BoardRole>,
    Path(board_id): Path<Uuid>,
    Json(body): Json<AddCollaborator>,
) -> Result<ApiResponse<Collaborator>, ApiError> {
    const MESSAGE: &str = "Failed to add collaborator";

    if role == Role::Collaborator {
        return Err(ApiError::forbidden(
            MESSAGE,
            "Cannot add collaborators without board ownership",
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT *
         FROM users
         WHERE email = $1
         LIMIT 1",
    )
    .bind(&body.email)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?
    .ok_or_else(|| ApiError::not_found(MESSAGE, "Could not find user"))?;

    let existing: Option<i32> = sqlx::query_scalar(
        "SELECT 1
         FROM boards_collaborators
         WHERE user_id = $1 AND board_id = $2
         LIMIT 1",
    )
    .bind(user.id)
    .bind(board_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    if existing.is_some() {
        return Err(ApiError::conflict(
            MESSAGE,
            "Collaborator has already been added",
        ));
    }

    let joined_at = Utc::now();

    sqlx::query(
        "INSERT INTO boards_collaborators (user_id, board_id, role, joined_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user.id)
    .bind(board_id)
    .bind(Role::Collaborator.as_str())
    .bind(joined_at)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    let collaborator = Collaborator {
        id: user.id,
        given_name: user.given_name,
        family_name: user.family_name,
        email: user.email,
        role: Role::Collaborator.as_str().to_string(),
        joined_at,
    };

    Ok(ApiResponse::created(
        "Successfully added collaborator",
        collaborator,
    ))
}

/// DELETE /collaborators/:board_id/:collaborator_id - members may always
/// remove themselves and owners may remove anyone, but the owner's own
/// membership row is immovable (transfer or delete the board instead).
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(BoardRole(role)): Extension<BoardRole>,
    Path((board_id, collaborator_id)): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse, ApiError> {
    const MESSAGE: &str = "Failed to remove collaborator";

    let target_role: Option<String> = sqlx::query_scalar(
        "SELECT role
         FROM boards_collaborators
         WHERE user_id = $1 AND board_id = $2",
    )
    .bind(collaborator_id)
    .bind(board_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    let target_role = target_role.as_deref().and_then(Role::parse);

    if let Some(detail) =
        removal_denied(role, auth.subject_id, target_role, collaborator_id)
    {
        return Err(ApiError::forbidden(MESSAGE, detail));
    }

    sqlx::query(
        "DELETE FROM boards_collaborators
         WHERE user_id = $1 AND board_id = $2",
    )
    .bind(collaborator_id)
    .bind(board_id)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::internal(MESSAGE, e))?;

    Ok(ApiResponse::message("Successfully removed collaborator"))
}

/// Removal permission rules; `None` means the removal is allowed.
fn removal_denied(
    requester_role: Role,
    requester_id: Uuid,
    target_role: Option<Role>,
    target_id: Uuid,
) -> Option<&'static str> {
    if target_role == Some(Role::Owner) {
        return Some("Cannot leave board as the owner");
    }

    if requester_role == Role::Collaborator && requester_id != target_id {
        return Some("Cannot remove collaborators without board ownership");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> Uuid {
        Uuid::from_bytes([n; 16])
    }

    #[test]
    fn owner_row_is_immovable_for_everyone() {
        // Owner removing themselves.
        assert!(removal_denied(Role::Owner, id(1), Some(Role::Owner), id(1)).is_some());
        // Collaborator targeting the owner.
        assert!(removal_denied(Role::Collaborator, id(2), Some(Role::Owner), id(1)).is_some());
    }

    #[test]
    fn collaborator_may_only_remove_themselves() {
        assert!(
            removal_denied(Role::Collaborator, id(2), Some(Role::Collaborator), id(2)).is_none()
        );
        assert!(
            removal_denied(Role::Collaborator, id(2), Some(Role::Collaborator), id(3)).is_some()
        );
    }

    #[test]
    fn owner_may_remove_any_non_owner() {
        assert!(removal_denied(Role::Owner, id(1), Some(Role::Collaborator), id(2)).is_none());
    }

    #[test]
    fn missing_target_row_falls_through_to_delete() {
        // Delete of an absent membership is a no-op; only the requester
        // rules apply.
        assert!(removal_denied(Role::Owner, id(1), None, id(9)).is_none());
        assert!(removal_denied(Role::Collaborator, id(2), None, id(9)).is_some());
        assert!(removal_denied(Role::Collaborator, id(2), None, id(2)).is_none());
    }
}
