use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db;
use crate::db::barber_profiles::BarberProfileInput;
use crate::db::shop_profiles::ShopProfileInput;
use crate::error::AppError;
use crate::models::{BarberProfile, ShopProfile, UserType};
use crate::routes::{check_len, ApiJson};
use crate::state::SharedState;

const MAX_SPECIALTIES: usize = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberProfileRequest {
    pub bio: Option<String>,
    pub experience: Option<i32>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub availability: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopProfileRequest {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl BarberProfileRequest {
    fn into_input(self) -> Result<BarberProfileInput, AppError> {
        if self.experience.is_some_and(|years| years < 0) {
            return Err(AppError::BadRequest("experience cannot be negative".to_string()));
        }

        if let Some(rate) = self.hourly_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(AppError::BadRequest(
                    "hourlyRate must be a non-negative number".to_string(),
                ));
            }
        }

        if self
            .availability
            .as_ref()
            .is_some_and(|doc| !doc.is_object())
        {
            return Err(AppError::BadRequest(
                "availability must be a JSON object".to_string(),
            ));
        }

        let specialties = dedup_specialties(self.specialties);
        if specialties.len() > MAX_SPECIALTIES {
            return Err(AppError::BadRequest(format!(
                "at most {MAX_SPECIALTIES} specialties are allowed"
            )));
        }

        Ok(BarberProfileInput {
            bio: self.bio,
            experience: self.experience,
            specialties,
            hourly_rate: self.hourly_rate,
            availability: self.availability,
        })
    }
}

impl ShopProfileRequest {
    fn into_input(self) -> Result<ShopProfileInput, AppError> {
        check_len("businessName", self.business_name.as_deref(), 255)?;
        check_len("city", self.city.as_deref(), 100)?;
        check_len("state", self.state.as_deref(), 50)?;
        check_len("zipCode", self.zip_code.as_deref(), 20)?;
        check_len("phone", self.phone.as_deref(), 20)?;
        check_len("website", self.website.as_deref(), 255)?;

        check_coordinate("latitude", self.latitude, 90.0)?;
        check_coordinate("longitude", self.longitude, 180.0)?;

        Ok(ShopProfileInput {
            business_name: self.business_name,
            description: self.description,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            phone: self.phone,
            website: self.website,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// Trim, drop blanks and repeats, keep first-seen order.
fn dedup_specialties(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for s in raw {
        let s = s.trim();
        if !s.is_empty() && !out.iter().any(|seen| seen.eq_ignore_ascii_case(s)) {
            out.push(s.to_string());
        }
    }
    out
}

fn check_coordinate(field: &str, value: Option<f64>, bound: f64) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_finite() || v.abs() > bound => Err(AppError::BadRequest(format!(
            "{field} must be between -{bound} and {bound}"
        ))),
        _ => Ok(()),
    }
}

pub async fn own_barber_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<BarberProfile>, AppError> {
    auth.require_role(UserType::Barber)?;
    find_barber(&state, auth.user_id).await
}

pub async fn save_barber_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<BarberProfileRequest>,
) -> Result<Json<BarberProfile>, AppError> {
    auth.require_role(UserType::Barber)?;
    let input = req.into_input()?;
    let profile = db::barber_profiles::upsert(&state.pool, auth.user_id, &input).await?;
    Ok(Json(profile))
}

pub async fn barber_profile(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<BarberProfile>, AppError> {
    find_barber(&state, user_id).await
}

pub async fn own_shop_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<ShopProfile>, AppError> {
    auth.require_role(UserType::Shop)?;
    find_shop(&state, auth.user_id).await
}

pub async fn save_shop_profile(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<ShopProfileRequest>,
) -> Result<Json<ShopProfile>, AppError> {
    auth.require_role(UserType::Shop)?;
    let input = req.into_input()?;
    let profile = db::shop_profiles::upsert(&state.pool, auth.user_id, &input).await?;
    Ok(Json(profile))
}

pub async fn shop_profile(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ShopProfile>, AppError> {
    find_shop(&state, user_id).await
}

async fn find_barber(state: &SharedState, user_id: Uuid) -> Result<Json<BarberProfile>, AppError> {
    db::barber_profiles::find_by_user(&state.pool, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Barber profile not found".to_string()))
}

async fn find_shop(state: &SharedState, user_id: Uuid) -> Result<Json<ShopProfile>, AppError> {
    db::shop_profiles::find_by_user(&state.pool, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Shop profile not found".to_string()))
}
