pub mod admin;
pub mod auth;
pub mod profiles;

use axum::extract::FromRequest;
use axum::routing::{get, post};
use axum::Router;

use crate::error::AppError;
use crate::state::SharedState;

/// `axum::Json` whose rejections use the `{message}` error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/auth/user",
            get(auth::current_user).patch(auth::update_user),
        )
        // Profiles
        .route(
            "/api/barber/profile",
            get(profiles::own_barber_profile).put(profiles::save_barber_profile),
        )
        .route(
            "/api/shop/profile",
            get(profiles::own_shop_profile).put(profiles::save_shop_profile),
        )
        .route("/api/barbers/{user_id}", get(profiles::barber_profile))
        .route("/api/shops/{user_id}", get(profiles::shop_profile))
        // Admin
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}/verify", post(admin::verify_user))
}

/// Reject `value` when it is longer than the column allows.
pub(crate) fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::BadRequest(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}
