use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::request::{
        CreateServiceRequestRequest, RequestDetailRow, ServiceRequest, ServiceRequestWithDetails,
    },
};

/// Request columns plus the aliased service/owner columns backing
/// `RequestDetailRow`.
const REQUEST_DETAIL_COLS: &str = "sr.id, sr.user_id, sr.service_id, sr.title, sr.description,
     sr.address, sr.city, sr.preferred_date, sr.preferred_time,
     sr.budget_min, sr.budget_max, sr.status, sr.created_at, sr.updated_at,
     s.name AS service_name, s.description AS service_description,
     u.first_name AS owner_first_name, u.last_name AS owner_last_name, u.phone AS owner_phone";

pub struct RequestService;

impl RequestService {
    /// Create a request with status `pending`. Any authenticated identity
    /// may post one.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateServiceRequestRequest,
    ) -> ApiResult<ServiceRequest> {
        validate_new_request(req)?;

        let service_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM services WHERE id = $1)")
                .bind(req.service_id)
                .fetch_one(pool)
                .await?;
        if !service_exists {
            return Err(ApiError::Validation("Unknown service".into()));
        }

        let request = sqlx::query_as::<_, ServiceRequest>(
            "INSERT INTO service_requests (
                 user_id, service_id, title, description, address, city,
                 preferred_date, preferred_time, budget_min, budget_max
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(user_id)
        .bind(req.service_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.address)
        .bind(&req.city)
        .bind(req.preferred_date)
        .bind(&req.preferred_time)
        .bind(req.budget_min)
        .bind(req.budget_max)
        .fetch_one(pool)
        .await?;

        Ok(request)
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> ApiResult<Vec<ServiceRequestWithDetails>> {
        let rows = sqlx::query_as::<_, RequestDetailRow>(&format!(
            "SELECT {REQUEST_DETAIL_COLS}
             FROM service_requests sr
             JOIN services s ON s.id = sr.service_id
             JOIN users u ON u.id = sr.user_id
             WHERE sr.user_id = $1
             ORDER BY sr.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The matching query: pending requests in the provider's city
    /// (case-insensitive) for a service the provider offers, not yet
    /// claimed by any booking. Newest first, no further ranking.
    pub async fn list_available_for_provider(
        pool: &PgPool,
        provider_id: Uuid,
    ) -> ApiResult<Vec<ServiceRequestWithDetails>> {
        let rows = sqlx::query_as::<_, RequestDetailRow>(&format!(
            "SELECT {REQUEST_DETAIL_COLS}
             FROM service_requests sr
             JOIN services s ON s.id = sr.service_id
             JOIN users u ON u.id = sr.user_id
             JOIN provider_profiles pp ON pp.id = $1
             JOIN provider_services ps
               ON ps.provider_id = pp.id AND ps.service_id = sr.service_id
             WHERE sr.status = 'pending'
               AND LOWER(sr.city) = LOWER(pp.city)
               AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.request_id = sr.id)
             ORDER BY sr.created_at DESC"
        ))
        .bind(provider_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Ownership and the pending-only rule live in the WHERE clause; a
    /// request that is missing, someone else's, or past `pending` all
    /// report the same not-found.
    pub async fn delete(pool: &PgPool, request_id: Uuid, user_id: Uuid) -> ApiResult<()> {
        let result = sqlx::query(
            "DELETE FROM service_requests
             WHERE id = $1 AND user_id = $2 AND status = 'pending'",
        )
        .bind(request_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(
                "Request not found or cannot be deleted".into(),
            ));
        }
        Ok(())
    }
}

fn validate_new_request(req: &CreateServiceRequestRequest) -> Result<(), ApiError> {
    if req.title.trim().is_empty() || req.address.trim().is_empty() || req.city.trim().is_empty() {
        return Err(ApiError::Validation(
            "Service, title, address, and city are required".into(),
        ));
    }
    if let (Some(min), Some(max)) = (req.budget_min, req.budget_max) {
        if min > max {
            return Err(ApiError::Validation(
                "Minimum budget cannot exceed maximum budget".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateServiceRequestRequest {
        CreateServiceRequestRequest {
            service_id: Uuid::new_v4(),
            title: "Fix leaking kitchen sink".into(),
            description: None,
            address: "14 MG Road".into(),
            city: "Noida".into(),
            preferred_date: None,
            preferred_time: None,
            budget_min: Some(200.0),
            budget_max: Some(500.0),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_new_request(&request()).is_ok());
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let mut req = request();
        req.city = "   ".into();
        assert!(matches!(
            validate_new_request(&req),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_inverted_budget_rejected() {
        let mut req = request();
        req.budget_min = Some(900.0);
        assert!(matches!(
            validate_new_request(&req),
            Err(ApiError::Validation(_))
        ));
    }
}
