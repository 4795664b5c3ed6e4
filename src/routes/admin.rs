use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

pub async fn list_users(
    _admin: AdminUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = db::users::list_all(&state.pool).await?;
    Ok(Json(users))
}

pub async fn verify_user(
    AdminUser(admin): AdminUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = db::users::mark_verified(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(admin_id = %admin.user_id, user_id = %user.id, "User verified");
    Ok(Json(user))
}
