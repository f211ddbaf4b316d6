use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::service::ServiceSummary;
use super::user::ContactInfo;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "in_progress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Unknown request status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequestRequest {
    pub service_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
}

/// Flat join row: request columns plus aliased service and owner columns.
#[derive(Debug, Clone, FromRow)]
pub struct RequestDetailRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub service_name: String,
    pub service_description: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_phone: Option<String>,
}

/// Read-model: a request enriched with its service and the owner's contact
/// projection, independent of transport serialization.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequestWithDetails {
    #[serde(flatten)]
    pub request: ServiceRequest,
    pub service: ServiceSummary,
    pub user: ContactInfo,
}

impl From<RequestDetailRow> for ServiceRequestWithDetails {
    fn from(row: RequestDetailRow) -> Self {
        Self {
            service: ServiceSummary {
                id: row.service_id,
                name: row.service_name,
                description: row.service_description,
            },
            user: ContactInfo {
                first_name: row.owner_first_name,
                last_name: row.owner_last_name,
                phone: row.owner_phone,
            },
            request: ServiceRequest {
                id: row.id,
                user_id: row.user_id,
                service_id: row.service_id,
                title: row.title,
                description: row.description,
                address: row.address,
                city: row.city,
                preferred_date: row.preferred_date,
                preferred_time: row.preferred_time,
                budget_min: row.budget_min,
                budget_max: row.budget_max,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "accepted", "in_progress", "completed", "cancelled"] {
            assert_eq!(s.parse::<RequestStatus>().unwrap().as_str(), s);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("open".parse::<RequestStatus>().is_err());
    }
}
