use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    middleware::auth::require_provider,
    models::{auth::AuthenticatedUser, request::CreateServiceRequestRequest},
    services::{provider::ProviderService, requests::RequestService},
    AppState,
};

pub async fn create_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateServiceRequestRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request = RequestService::create(&state.db, user.user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "request": request }))))
}

pub async fn list_my_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let requests = RequestService::list_for_user(&state.db, user.user_id).await?;
    Ok(Json(json!({ "requests": requests })))
}

/// Pending requests the calling provider is eligible for.
pub async fn list_available_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    require_provider(&user)?;
    let provider_id = ProviderService::profile_id(&state.db, user.user_id).await?;
    let requests =
        RequestService::list_available_for_provider(&state.db, provider_id).await?;
    Ok(Json(json!({ "requests": requests })))
}

pub async fn delete_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    RequestService::delete(&state.db, id, user.user_id).await?;
    Ok(Json(json!({ "message": "Request deleted successfully" })))
}
