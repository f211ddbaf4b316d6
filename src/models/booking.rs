use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::request::{ServiceRequest, ServiceRequestWithDetails};
use super::service::ServiceSummary;
use super::user::ContactInfo;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// States a booking may currently be in for a transition into `target`.
    /// Terminal states never appear as a source, and nothing leads back to
    /// `confirmed`. In strict mode `completed` requires `in_progress` first.
    pub fn allowed_sources(target: BookingStatus, strict: bool) -> &'static [BookingStatus] {
        match target {
            BookingStatus::Confirmed => &[BookingStatus::Confirmed],
            BookingStatus::InProgress => &[BookingStatus::Confirmed, BookingStatus::InProgress],
            BookingStatus::Completed if strict => &[BookingStatus::InProgress],
            BookingStatus::Completed => &[BookingStatus::Confirmed, BookingStatus::InProgress],
            BookingStatus::Cancelled => &[BookingStatus::Confirmed, BookingStatus::InProgress],
        }
    }

    pub fn transition_allowed(from: BookingStatus, to: BookingStatus, strict: bool) -> bool {
        Self::allowed_sources(to, strict).contains(&from)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "in_progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Unknown booking status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub request_id: Uuid,
    pub provider_id: Uuid,
    /// Display-only, never used for lookup.
    pub reference_code: String,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<String>,
    pub estimated_duration: Option<i32>,
    pub final_price: Option<f64>,
    pub status: String,
    pub notes: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub accepted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub request_id: Uuid,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<String>,
    pub estimated_duration: Option<i32>,
    pub final_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

/// Merge-patch of the scheduling fields: absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<String>,
    pub estimated_duration: Option<i32>,
    pub final_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateBookingRequest {
    pub rating: i32,
    pub review: Option<String>,
}

/// Counterparty projection shown to the requesting user.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub user: ContactInfo,
    pub city: String,
    pub hourly_rate: Option<f64>,
}

/// Flat join row backing `BookingWithDetails`: booking columns plus aliased
/// request, service, owner and provider columns.
#[derive(Debug, Clone, FromRow)]
pub struct BookingDetailRow {
    pub id: Uuid,
    pub request_id: Uuid,
    pub provider_id: Uuid,
    pub reference_code: String,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<String>,
    pub estimated_duration: Option<i32>,
    pub final_price: Option<f64>,
    pub status: String,
    pub notes: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub accepted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request_user_id: Uuid,
    pub request_service_id: Uuid,
    pub request_title: String,
    pub request_description: Option<String>,
    pub request_address: String,
    pub request_city: String,
    pub request_preferred_date: Option<NaiveDate>,
    pub request_preferred_time: Option<String>,
    pub request_budget_min: Option<f64>,
    pub request_budget_max: Option<f64>,
    pub request_status: String,
    pub request_created_at: DateTime<Utc>,
    pub request_updated_at: DateTime<Utc>,
    pub service_name: String,
    pub service_description: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_phone: Option<String>,
    pub provider_first_name: String,
    pub provider_last_name: String,
    pub provider_phone: Option<String>,
    pub provider_city: String,
    pub provider_hourly_rate: Option<f64>,
}

/// Read-model: a booking with its request, service, and counterparty
/// contact projections. `provider` is omitted on provider-facing lists.
#[derive(Debug, Clone, Serialize)]
pub struct BookingWithDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub request: ServiceRequestWithDetails,
    pub provider: Option<ProviderSummary>,
}

impl BookingDetailRow {
    pub fn into_details(self, include_provider: bool) -> BookingWithDetails {
        let provider = include_provider.then(|| ProviderSummary {
            user: ContactInfo {
                first_name: self.provider_first_name.clone(),
                last_name: self.provider_last_name.clone(),
                phone: self.provider_phone.clone(),
            },
            city: self.provider_city.clone(),
            hourly_rate: self.provider_hourly_rate,
        });
        BookingWithDetails {
            request: ServiceRequestWithDetails {
                service: ServiceSummary {
                    id: self.request_service_id,
                    name: self.service_name,
                    description: self.service_description,
                },
                user: ContactInfo {
                    first_name: self.owner_first_name,
                    last_name: self.owner_last_name,
                    phone: self.owner_phone,
                },
                request: ServiceRequest {
                    id: self.request_id,
                    user_id: self.request_user_id,
                    service_id: self.request_service_id,
                    title: self.request_title,
                    description: self.request_description,
                    address: self.request_address,
                    city: self.request_city,
                    preferred_date: self.request_preferred_date,
                    preferred_time: self.request_preferred_time,
                    budget_min: self.request_budget_min,
                    budget_max: self.request_budget_max,
                    status: self.request_status,
                    created_at: self.request_created_at,
                    updated_at: self.request_updated_at,
                },
            },
            provider,
            booking: Booking {
                id: self.id,
                request_id: self.request_id,
                provider_id: self.provider_id,
                reference_code: self.reference_code,
                scheduled_date: self.scheduled_date,
                scheduled_time: self.scheduled_time,
                estimated_duration: self.estimated_duration,
                final_price: self.final_price,
                status: self.status,
                notes: self.notes,
                rating: self.rating,
                review: self.review,
                accepted_at: self.accepted_at,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in ["confirmed", "in_progress", "completed", "cancelled"] {
            assert_eq!(s.parse::<BookingStatus>().unwrap().as_str(), s);
        }
        assert!("accepted".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        for from in [Completed, Cancelled] {
            for to in [Confirmed, InProgress, Completed, Cancelled] {
                assert!(
                    !BookingStatus::transition_allowed(from, to, false),
                    "{from} -> {to} must be rejected"
                );
                assert!(!BookingStatus::transition_allowed(from, to, true));
            }
        }
    }

    #[test]
    fn test_no_regression_to_confirmed() {
        assert!(!BookingStatus::transition_allowed(InProgress, Confirmed, false));
        assert!(!BookingStatus::transition_allowed(Completed, Confirmed, false));
        assert!(!BookingStatus::transition_allowed(Cancelled, Confirmed, false));
    }

    #[test]
    fn test_forward_path() {
        assert!(BookingStatus::transition_allowed(Confirmed, InProgress, false));
        assert!(BookingStatus::transition_allowed(InProgress, Completed, false));
        assert!(BookingStatus::transition_allowed(Confirmed, Cancelled, false));
        assert!(BookingStatus::transition_allowed(InProgress, Cancelled, false));
    }

    #[test]
    fn test_skip_to_completed_depends_on_strictness() {
        assert!(BookingStatus::transition_allowed(Confirmed, Completed, false));
        assert!(!BookingStatus::transition_allowed(Confirmed, Completed, true));
        // in_progress -> completed stays legal in both modes
        assert!(BookingStatus::transition_allowed(InProgress, Completed, true));
    }

    #[test]
    fn test_terminal_flag() {
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Confirmed.is_terminal());
        assert!(!InProgress.is_terminal());
    }
}
