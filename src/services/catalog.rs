use sqlx::PgPool;

use crate::{error::ApiResult, models::service::Service};

pub struct CatalogService;

impl CatalogService {
    pub async fn list(pool: &PgPool) -> ApiResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT id, name, description, created_at FROM services ORDER BY name",
        )
        .fetch_all(pool)
        .await?;
        Ok(services)
    }
}
