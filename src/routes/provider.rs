use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth::require_provider,
    models::{
        auth::AuthenticatedUser,
        provider::{CreateProviderProfileRequest, UpdateProviderProfileRequest},
    },
    services::provider::ProviderService,
    AppState,
};

pub async fn create_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateProviderProfileRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_provider(&user)?;
    let profile = ProviderService::create(&state.db, user.user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "profile": profile }))))
}

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    require_provider(&user)?;
    let profile = ProviderService::get_by_user_id(&state.db, user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Provider profile not found".into()))?;
    Ok(Json(json!({ "profile": profile })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateProviderProfileRequest>,
) -> ApiResult<Json<Value>> {
    require_provider(&user)?;
    let profile = ProviderService::update(&state.db, user.user_id, &body).await?;
    Ok(Json(json!({ "profile": profile })))
}

pub async fn toggle_availability(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    require_provider(&user)?;
    let profile = ProviderService::toggle_availability(&state.db, user.user_id).await?;
    Ok(Json(json!({ "profile": profile })))
}
