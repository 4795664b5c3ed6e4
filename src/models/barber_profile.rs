use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: Option<String>,
    /// Years of experience.
    pub experience: Option<i32>,
    pub specialties: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub availability: Option<serde_json::Value>,
    pub rating: Option<f64>,
    pub total_shifts: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
