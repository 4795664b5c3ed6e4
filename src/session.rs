//! Server-side sessions persisted in PostgreSQL.
//!
//! The store and its expiry sweeper are created once during startup; the
//! sweeper is stopped during shutdown. Handlers never touch the store
//! directly, they go through the [`Session`] extension installed by the
//! session layer.

use std::time::Duration;

use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, ExpiredDeletion, Session, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;
use uuid::Uuid;

use crate::config::Environment;
use crate::error::AppError;
use crate::models::{User, UserType};

pub const COOKIE_NAME: &str = "barbershift.sid";
pub const TABLE_NAME: &str = "sessions";
pub const TTL: time::Duration = time::Duration::days(7);

const USER_KEY: &str = "user";
const HKDF_SALT: &[u8] = b"barbershift-v1";
const HKDF_INFO: &[u8] = b"session-cookie-signing";

/// What an authenticated session records about its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: Uuid,
    pub user_type: UserType,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            user_type: user.user_type,
        }
    }
}

/// Open the Postgres-backed store, creating its table if missing.
pub async fn open_store(pool: PgPool) -> Result<PostgresStore, sqlx::Error> {
    let store = PostgresStore::new(pool)
        .with_schema_name("public")
        .and_then(|store| store.with_table_name(TABLE_NAME))
        .map_err(|e| sqlx::Error::Configuration(e.into()))?;
    store.migrate().await?;
    Ok(store)
}

/// Cookie settings for `barbershift.sid`. Only production marks it secure.
pub fn layer<S: SessionStore>(
    store: S,
    environment: Environment,
    secret: &str,
) -> SessionManagerLayer<S, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(COOKIE_NAME)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(environment.is_production())
        .with_expiry(Expiry::OnInactivity(TTL))
        .with_signed(signing_key(secret))
}

/// Derive the 64-byte cookie signing key from `SESSION_SECRET`.
pub fn signing_key(secret: &str) -> Key {
    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret.as_bytes());
    let mut okm = [0u8; 64];
    hk.expand(HKDF_INFO, &mut okm)
        .expect("64 bytes is a valid HKDF-SHA256 output length");
    Key::from(&okm[..])
}

/// Periodically deletes expired session rows. Loads already ignore expired
/// rows, so this only reclaims space.
pub struct SessionSweeper {
    handle: JoinHandle<()>,
}

impl SessionSweeper {
    pub fn spawn(store: PostgresStore, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                tracing::debug!("Sweeping expired sessions");
                if let Err(e) = store.delete_expired().await {
                    tracing::error!("Expired session cleanup failed: {e}");
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

/// Bind `user` to the session under a fresh id.
pub async fn establish(session: &Session, user: &User) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_KEY, SessionUser::from(user)).await?;
    Ok(())
}

pub async fn current(session: &Session) -> Result<Option<SessionUser>, AppError> {
    Ok(session.get::<SessionUser>(USER_KEY).await?)
}

/// Drop the session record and expire the cookie.
pub async fn destroy(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
