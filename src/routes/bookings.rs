use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth::require_provider,
    models::{
        auth::AuthenticatedUser,
        booking::{
            BookingStatus, CreateBookingRequest, RateBookingRequest, UpdateBookingRequest,
            UpdateBookingStatusRequest,
        },
    },
    services::{bookings::BookingService, provider::ProviderService},
    AppState,
};

pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_provider(&user)?;
    let provider_id = ProviderService::profile_id(&state.db, user.user_id).await?;
    let booking = BookingService::accept(&state.db, provider_id, &body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "booking": booking }))))
}

pub async fn list_user_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let bookings = BookingService::list_by_user(&state.db, user.user_id).await?;
    Ok(Json(json!({ "bookings": bookings })))
}

pub async fn list_provider_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    require_provider(&user)?;
    let provider_id = ProviderService::profile_id(&state.db, user.user_id).await?;
    let bookings = BookingService::list_by_provider(&state.db, provider_id).await?;
    Ok(Json(json!({ "bookings": bookings })))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBookingStatusRequest>,
) -> ApiResult<Json<Value>> {
    require_provider(&user)?;
    let target: BookingStatus = body
        .status
        .parse()
        .map_err(|_| ApiError::Validation("Invalid status".into()))?;
    let provider_id = ProviderService::profile_id(&state.db, user.user_id).await?;
    let booking = BookingService::update_status(
        &state.db,
        id,
        provider_id,
        target,
        state.config.strict_booking_transitions,
    )
    .await?;
    Ok(Json(json!({ "booking": booking })))
}

pub async fn update_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBookingRequest>,
) -> ApiResult<Json<Value>> {
    require_provider(&user)?;
    let provider_id = ProviderService::profile_id(&state.db, user.user_id).await?;
    let booking = BookingService::update_fields(&state.db, id, provider_id, &body).await?;
    Ok(Json(json!({ "booking": booking })))
}

pub async fn rate_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RateBookingRequest>,
) -> ApiResult<Json<Value>> {
    let booking = BookingService::rate(
        &state.db,
        id,
        user.user_id,
        body.rating,
        body.review.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "booking": booking })))
}
