use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::service::Service;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProviderProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city: String,
    pub bio: Option<String>,
    pub experience_years: i32,
    pub hourly_rate: Option<f64>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile enriched with the offered-service rows.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderProfileWithServices {
    #[serde(flatten)]
    pub profile: ProviderProfile,
    pub services: Vec<Service>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProviderProfileRequest {
    pub city: String,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub service_ids: Vec<Uuid>,
}

/// Merge-patch: absent fields are left untouched. A present `service_ids`
/// replaces the offering set wholesale.
#[derive(Debug, Deserialize)]
pub struct UpdateProviderProfileRequest {
    pub city: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub service_ids: Option<Vec<Uuid>>,
}
