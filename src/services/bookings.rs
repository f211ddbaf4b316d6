use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        booking::{
            Booking, BookingDetailRow, BookingStatus, BookingWithDetails, CreateBookingRequest,
            UpdateBookingRequest,
        },
        request::RequestStatus,
    },
};

const BOOKING_COLS: &str = "id, request_id, provider_id, reference_code, scheduled_date,
     scheduled_time, estimated_duration, final_price, status, notes, rating, review,
     accepted_at, created_at, updated_at";

/// Booking columns plus the aliased request/service/owner/provider columns
/// backing `BookingDetailRow`.
const BOOKING_DETAIL_QUERY: &str = "SELECT b.id, b.request_id, b.provider_id, b.reference_code,
         b.scheduled_date, b.scheduled_time, b.estimated_duration, b.final_price,
         b.status, b.notes, b.rating, b.review, b.accepted_at, b.created_at, b.updated_at,
         sr.user_id AS request_user_id, sr.service_id AS request_service_id,
         sr.title AS request_title, sr.description AS request_description,
         sr.address AS request_address, sr.city AS request_city,
         sr.preferred_date AS request_preferred_date,
         sr.preferred_time AS request_preferred_time,
         sr.budget_min AS request_budget_min, sr.budget_max AS request_budget_max,
         sr.status AS request_status,
         sr.created_at AS request_created_at, sr.updated_at AS request_updated_at,
         s.name AS service_name, s.description AS service_description,
         u.first_name AS owner_first_name, u.last_name AS owner_last_name,
         u.phone AS owner_phone,
         pu.first_name AS provider_first_name, pu.last_name AS provider_last_name,
         pu.phone AS provider_phone,
         pp.city AS provider_city, pp.hourly_rate AS provider_hourly_rate
     FROM bookings b
     JOIN service_requests sr ON sr.id = b.request_id
     JOIN services s ON s.id = sr.service_id
     JOIN users u ON u.id = sr.user_id
     JOIN provider_profiles pp ON pp.id = b.provider_id
     JOIN users pu ON pu.id = pp.user_id";

pub struct BookingService;

impl BookingService {
    /// Exclusive acceptance of a pending request. The booking insert and
    /// the request status flip share one transaction: the request is never
    /// left `accepted` without a booking, nor the reverse. Two providers
    /// can race past the pending pre-check; the UNIQUE constraint on
    /// bookings.request_id is what arbitrates, and its violation surfaces
    /// as a conflict.
    pub async fn accept(
        pool: &PgPool,
        provider_id: Uuid,
        req: &CreateBookingRequest,
    ) -> ApiResult<Booking> {
        let mut tx = pool.begin().await?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM service_requests WHERE id = $1")
                .bind(req.request_id)
                .fetch_optional(&mut *tx)
                .await?;
        let status = status
            .ok_or_else(|| ApiError::NotFound("Service request not found".into()))?;
        if status != RequestStatus::Pending.as_str() {
            return Err(ApiError::Validation(
                "Service request is no longer available".into(),
            ));
        }

        let reference_code = generate_reference_code(Utc::now());

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (
                 request_id, provider_id, reference_code, scheduled_date,
                 scheduled_time, estimated_duration, final_price, notes
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {BOOKING_COLS}"
        ))
        .bind(req.request_id)
        .bind(provider_id)
        .bind(&reference_code)
        .bind(req.scheduled_date)
        .bind(&req.scheduled_time)
        .bind(req.estimated_duration)
        .bind(req.final_price)
        .bind(&req.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            ApiError::conflict_on_unique(e, "This request has already been accepted")
        })?;

        sqlx::query(
            "UPDATE service_requests SET status = 'accepted', updated_at = NOW() WHERE id = $1",
        )
        .bind(req.request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn list_by_provider(
        pool: &PgPool,
        provider_id: Uuid,
    ) -> ApiResult<Vec<BookingWithDetails>> {
        let rows = sqlx::query_as::<_, BookingDetailRow>(&format!(
            "{BOOKING_DETAIL_QUERY}
             WHERE b.provider_id = $1
             ORDER BY b.created_at DESC"
        ))
        .bind(provider_id)
        .fetch_all(pool)
        .await?;

        // The caller is the provider; only the requester side is projected.
        Ok(rows.into_iter().map(|r| r.into_details(false)).collect())
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> ApiResult<Vec<BookingWithDetails>> {
        let rows = sqlx::query_as::<_, BookingDetailRow>(&format!(
            "{BOOKING_DETAIL_QUERY}
             WHERE sr.user_id = $1
             ORDER BY b.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_details(true)).collect())
    }

    /// Advance the booking state machine. Ownership and transition legality
    /// both live in the UPDATE's WHERE clause, so there is no window in
    /// which another provider's booking could be touched or a terminal
    /// state escaped.
    pub async fn update_status(
        pool: &PgPool,
        booking_id: Uuid,
        provider_id: Uuid,
        target: BookingStatus,
        strict: bool,
    ) -> ApiResult<Booking> {
        let sources: Vec<String> = BookingStatus::allowed_sources(target, strict)
            .iter()
            .map(|s| s.to_string())
            .collect();

        let updated = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings
             SET status = $1, updated_at = NOW()
             WHERE id = $2 AND provider_id = $3 AND status = ANY($4)
             RETURNING {BOOKING_COLS}"
        ))
        .bind(target.to_string())
        .bind(booking_id)
        .bind(provider_id)
        .bind(&sources)
        .fetch_optional(pool)
        .await?;

        if let Some(booking) = updated {
            return Ok(booking);
        }

        // Zero rows matched: report an illegal transition when the booking
        // is the caller's, not-found otherwise (missing and not-yours are
        // deliberately indistinguishable).
        let current: Option<String> = sqlx::query_scalar(
            "SELECT status FROM bookings WHERE id = $1 AND provider_id = $2",
        )
        .bind(booking_id)
        .bind(provider_id)
        .fetch_optional(pool)
        .await?;

        match current {
            Some(from) => Err(ApiError::Validation(format!(
                "Cannot change booking status from {from} to {target}"
            ))),
            None => Err(ApiError::NotFound("Booking not found".into())),
        }
    }

    /// Merge-patch of the scheduling fields, ownership-scoped in the WHERE
    /// clause. Fields absent from the input are left untouched.
    pub async fn update_fields(
        pool: &PgPool,
        booking_id: Uuid,
        provider_id: Uuid,
        req: &UpdateBookingRequest,
    ) -> ApiResult<Booking> {
        let updated = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings
             SET scheduled_date = COALESCE($1, scheduled_date),
                 scheduled_time = COALESCE($2, scheduled_time),
                 estimated_duration = COALESCE($3, estimated_duration),
                 final_price = COALESCE($4, final_price),
                 notes = COALESCE($5, notes),
                 updated_at = NOW()
             WHERE id = $6 AND provider_id = $7
             RETURNING {BOOKING_COLS}"
        ))
        .bind(req.scheduled_date)
        .bind(&req.scheduled_time)
        .bind(req.estimated_duration)
        .bind(req.final_price)
        .bind(&req.notes)
        .bind(booking_id)
        .bind(provider_id)
        .fetch_optional(pool)
        .await?;

        updated.ok_or_else(|| ApiError::NotFound("Booking not found".into()))
    }

    /// One-time rating by the user who owns the linked request, only once
    /// the booking is completed. The `rating IS NULL` guard in the UPDATE
    /// makes the once-only rule hold under concurrent submissions.
    pub async fn rate(
        pool: &PgPool,
        booking_id: Uuid,
        user_id: Uuid,
        rating: i32,
        review: Option<&str>,
    ) -> ApiResult<Booking> {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::Validation("Rating must be between 1 and 5".into()));
        }

        let row: Option<(Uuid, String, Option<i32>)> = sqlx::query_as(
            "SELECT sr.user_id, b.status, b.rating
             FROM bookings b
             JOIN service_requests sr ON sr.id = b.request_id
             WHERE b.id = $1",
        )
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        let (owner_id, status, existing) =
            row.ok_or_else(|| ApiError::NotFound("Booking not found".into()))?;

        if owner_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the requesting user may rate this booking".into(),
            ));
        }
        if status != BookingStatus::Completed.as_str() {
            return Err(ApiError::Validation(
                "Only completed bookings can be rated".into(),
            ));
        }
        if existing.is_some() {
            return Err(ApiError::Conflict(
                "This booking has already been rated".into(),
            ));
        }

        let updated = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings
             SET rating = $1, review = $2, updated_at = NOW()
             WHERE id = $3 AND rating IS NULL
             RETURNING {BOOKING_COLS}"
        ))
        .bind(rating)
        .bind(review)
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        updated.ok_or_else(|| ApiError::Conflict("This booking has already been rated".into()))
    }
}

/// Display-only reference code: BKG-YYYYMMDD-<8 uppercase hex chars>.
fn generate_reference_code(now: DateTime<Utc>) -> String {
    format!("BKG-{}-{:08X}", now.format("%Y%m%d"), rand::random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reference_code_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 10, 30, 0).unwrap();
        let code = generate_reference_code(now);
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "BKG");
        assert_eq!(parts[1], "20250307");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_reference_codes_vary() {
        let now = Utc::now();
        let codes: Vec<String> = (0..8).map(|_| generate_reference_code(now)).collect();
        let distinct: std::collections::HashSet<&String> = codes.iter().collect();
        assert!(distinct.len() > 1);
    }
}
