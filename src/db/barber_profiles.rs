use sqlx::PgPool;
use uuid::Uuid;

use crate::models::BarberProfile;

pub struct BarberProfileInput {
    pub bio: Option<String>,
    pub experience: Option<i32>,
    pub specialties: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub availability: Option<serde_json::Value>,
}

pub async fn find_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<BarberProfile>, sqlx::Error> {
    sqlx::query_as::<_, BarberProfile>("SELECT * FROM barber_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Insert or replace the barber-editable columns. Rating and shift count are
/// left as they are.
pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    input: &BarberProfileInput,
) -> Result<BarberProfile, sqlx::Error> {
    sqlx::query_as::<_, BarberProfile>(
        "INSERT INTO barber_profiles (id, user_id, bio, experience, specialties, hourly_rate, availability)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (user_id) DO UPDATE SET
            bio = EXCLUDED.bio,
            experience = EXCLUDED.experience,
            specialties = EXCLUDED.specialties,
            hourly_rate = EXCLUDED.hourly_rate,
            availability = EXCLUDED.availability,
            updated_at = now()
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(input.bio.as_deref())
    .bind(input.experience)
    .bind(&input.specialties)
    .bind(input.hourly_rate)
    .bind(input.availability.as_ref())
    .fetch_one(pool)
    .await
}
