//! Credential checks and account creation. Session handling stays in the
//! route layer; these functions only talk to the database.

use std::sync::OnceLock;

use regex::Regex;
use sqlx::PgPool;

use crate::auth::password;
use crate::config::AdminSeed;
use crate::db;
use crate::db::users::NewUser;
use crate::error::AppError;
use crate::models::{User, UserType};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_EMAIL_LEN: usize = 255;

pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_type: UserType,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Look up the account and check its password.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    let Some(user) = db::users::find_by_email(pool, &normalize_email(email)).await? else {
        password::verify_dummy(password);
        return Err(AppError::InvalidCredentials);
    };

    let valid = password::verify(password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

pub fn validate(reg: &Registration) -> Result<(), AppError> {
    let email = reg.email.trim();
    if !email_pattern().is_match(email) {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AppError::BadRequest(format!(
            "email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }

    if reg.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if !reg.user_type.is_self_selectable() {
        return Err(AppError::BadRequest(
            "userType must be one of: barber, shop".to_string(),
        ));
    }

    Ok(())
}

pub async fn register(pool: &PgPool, reg: Registration) -> Result<User, AppError> {
    validate(&reg)?;

    let pw_hash = password::hash(&reg.password).map_err(AppError::Internal)?;
    let email = normalize_email(&reg.email);

    let user = db::users::create(
        pool,
        &NewUser {
            email: &email,
            password_hash: &pw_hash,
            first_name: non_blank(reg.first_name.as_deref()),
            last_name: non_blank(reg.last_name.as_deref()),
            user_type: reg.user_type,
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            AppError::Conflict("Email already registered".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(user_id = %user.id, user_type = %user.user_type, "User registered");
    Ok(user)
}

/// Create the configured admin account unless it already exists. Fails when
/// the email belongs to a non-admin account.
pub async fn ensure_admin(pool: &PgPool, seed: &AdminSeed) -> Result<(), AppError> {
    let email = normalize_email(&seed.email);
    if let Some(existing) = db::users::find_by_email(pool, &email).await? {
        if existing.user_type != UserType::Admin {
            return Err(AppError::Conflict(format!(
                "ADMIN_EMAIL {email} is already registered as a {} account",
                existing.user_type
            )));
        }
        tracing::debug!("Admin account {email} already present");
        return Ok(());
    }

    if seed.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "ADMIN_PASSWORD must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let pw_hash = password::hash(&seed.password).map_err(AppError::Internal)?;
    let admin = db::users::create(
        pool,
        &NewUser {
            email: &email,
            password_hash: &pw_hash,
            first_name: None,
            last_name: None,
            user_type: UserType::Admin,
        },
    )
    .await?;

    tracing::info!(user_id = %admin.id, "Admin account created for {email}");
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
