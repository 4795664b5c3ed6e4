use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::UserType;
use crate::session::{self, SessionUser};

/// The caller's authenticated session. Rejects with 401 "Unauthorized".
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub user_type: UserType,
    pub session: Session,
}

impl AuthUser {
    pub fn require_role(&self, role: UserType) -> Result<(), AppError> {
        if self.user_type == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("{} access required", capitalize(role.as_str()))))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.user_type == UserType::Admin {
            Ok(())
        } else {
            Err(AppError::AdminRequired)
        }
    }
}

async fn session_user<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<(Session, Option<SessionUser>), AppError> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Session(msg.to_string()))?;
    let user = session::current(&session).await?;
    Ok((session, user))
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await? {
            (session, Some(user)) => Ok(AuthUser {
                user_id: user.user_id,
                user_type: user.user_type,
                session,
            }),
            (_, None) => Err(AppError::Unauthorized),
        }
    }
}

/// An admin session. Rejects with 401 "Admin access required", whether the
/// session is missing or belongs to another role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state)
            .await
            .map_err(|e| match e {
                AppError::Unauthorized => AppError::AdminRequired,
                other => other,
            })?;
        user.require_admin()?;
        Ok(AdminUser(user))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    fn user(user_type: UserType) -> AuthUser {
        AuthUser {
            user_id: Uuid::now_v7(),
            user_type,
            session: Session::new(None, std::sync::Arc::new(MemoryStore::default()), None),
        }
    }

    #[test]
    fn role_checks() {
        assert!(user(UserType::Barber).require_role(UserType::Barber).is_ok());

        let err = user(UserType::Shop).require_role(UserType::Barber).unwrap_err();
        assert_eq!(err.message(), "Barber access required");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        assert!(user(UserType::Admin).require_admin().is_ok());
        assert!(matches!(
            user(UserType::Barber).require_admin(),
            Err(AppError::AdminRequired)
        ));
    }

    #[tokio::test]
    async fn missing_session_is_rejected() {
        let app = Router::new()
            .route("/me", get(|_: AuthUser| async { "me" }))
            .route("/admin", get(|_: AdminUser| async { "admin" }))
            .layer(SessionManagerLayer::new(MemoryStore::default()));

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Unauthorized");

        let resp = app
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Admin access required");
    }
}
