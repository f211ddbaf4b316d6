use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::ApiResult, services::catalog::CatalogService, AppState};

pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let services = CatalogService::list(&state.db).await?;
    Ok(Json(json!({ "services": services })))
}
