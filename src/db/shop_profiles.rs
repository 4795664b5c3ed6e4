use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ShopProfile;

pub struct ShopProfileInput {
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

pub async fn find_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ShopProfile>, sqlx::Error> {
    sqlx::query_as::<_, ShopProfile>("SELECT * FROM shop_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    input: &ShopProfileInput,
) -> Result<ShopProfile, sqlx::Error> {
    sqlx::query_as::<_, ShopProfile>(
        "INSERT INTO shop_profiles
            (id, user_id, business_name, description, address, city, state, zip_code,
             phone, website, latitude, longitude)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         ON CONFLICT (user_id) DO UPDATE SET
            business_name = EXCLUDED.business_name,
            description = EXCLUDED.description,
            address = EXCLUDED.address,
            city = EXCLUDED.city,
            state = EXCLUDED.state,
            zip_code = EXCLUDED.zip_code,
            phone = EXCLUDED.phone,
            website = EXCLUDED.website,
            latitude = EXCLUDED.latitude,
            longitude = EXCLUDED.longitude,
            updated_at = now()
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(input.business_name.as_deref())
    .bind(input.description.as_deref())
    .bind(input.address.as_deref())
    .bind(input.city.as_deref())
    .bind(input.state.as_deref())
    .bind(input.zip_code.as_deref())
    .bind(input.phone.as_deref())
    .bind(input.website.as_deref())
    .bind(input.latitude)
    .bind(input.longitude)
    .fetch_one(pool)
    .await
}
