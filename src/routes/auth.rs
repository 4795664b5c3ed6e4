use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::auth::service::{self, Registration};
use crate::auth::AuthUser;
use crate::db;
use crate::db::users::ProfileChanges;
use crate::error::AppError;
use crate::models::{User, UserType};
use crate::routes::{check_len, ApiJson};
use crate::session;
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_type: UserType,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register(
    State(state): State<SharedState>,
    session: Session,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    check_len("firstName", req.first_name.as_deref(), 100)?;
    check_len("lastName", req.last_name.as_deref(), 100)?;

    let user = service::register(
        &state.pool,
        Registration {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            user_type: req.user_type,
        },
    )
    .await?;

    session::establish(&session, &user).await?;
    Ok(Json(user))
}

pub async fn login(
    State(state): State<SharedState>,
    session: Session,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = service::authenticate(&state.pool, &req.email, &req.password).await?;
    session::establish(&session, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(user))
}

pub async fn logout(session: Session) -> Result<Json<MessageResponse>, AppError> {
    session::destroy(&session).await?;
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

pub async fn current_user(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<User>, AppError> {
    match db::users::find_by_id(&state.pool, auth.user_id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            tracing::warn!("Session refers to missing user {}, dropping it", auth.user_id);
            session::destroy(&auth.session).await?;
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn update_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    check_len("firstName", req.first_name.as_deref(), 100)?;
    check_len("lastName", req.last_name.as_deref(), 100)?;
    check_len("profileImageUrl", req.profile_image_url.as_deref(), 500)?;

    let changes = ProfileChanges {
        first_name: trimmed(req.first_name),
        last_name: trimmed(req.last_name),
        profile_image_url: trimmed(req.profile_image_url),
    };

    db::users::update_profile(&state.pool, auth.user_id, &changes)
        .await?
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

/// Blank values are kept as `""` so the update clears the column.
fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
