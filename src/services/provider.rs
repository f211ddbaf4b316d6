use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        provider::{
            CreateProviderProfileRequest, ProviderProfile, ProviderProfileWithServices,
            UpdateProviderProfileRequest,
        },
        service::Service,
    },
};

const PROFILE_COLS: &str =
    "id, user_id, city, bio, experience_years, hourly_rate, is_available, created_at, updated_at";

pub struct ProviderService;

impl ProviderService {
    /// Create the caller's profile together with its service links in one
    /// transaction, so a crash cannot leave a profile with no services.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: &CreateProviderProfileRequest,
    ) -> ApiResult<ProviderProfileWithServices> {
        if req.city.trim().is_empty() || req.service_ids.is_empty() {
            return Err(ApiError::Validation(
                "City and at least one service are required".into(),
            ));
        }
        let service_ids = dedup_ids(&req.service_ids);
        Self::ensure_services_exist(pool, &service_ids).await?;

        let mut tx = pool.begin().await?;

        let profile = sqlx::query_as::<_, ProviderProfile>(&format!(
            "INSERT INTO provider_profiles (user_id, city, bio, experience_years, hourly_rate)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROFILE_COLS}"
        ))
        .bind(user_id)
        .bind(&req.city)
        .bind(&req.bio)
        .bind(req.experience_years.unwrap_or(0))
        .bind(req.hourly_rate)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "Provider profile already exists"))?;

        Self::insert_service_links(&mut tx, profile.id, &service_ids).await?;

        tx.commit().await?;

        Self::get_by_user_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("profile vanished after insert")))
    }

    pub async fn get_by_user_id(
        pool: &PgPool,
        user_id: Uuid,
    ) -> ApiResult<Option<ProviderProfileWithServices>> {
        let profile = sqlx::query_as::<_, ProviderProfile>(&format!(
            "SELECT {PROFILE_COLS} FROM provider_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some(profile) = profile else {
            return Ok(None);
        };

        let services = sqlx::query_as::<_, Service>(
            "SELECT s.id, s.name, s.description, s.created_at
             FROM provider_services ps
             JOIN services s ON s.id = ps.service_id
             WHERE ps.provider_id = $1
             ORDER BY s.name",
        )
        .bind(profile.id)
        .fetch_all(pool)
        .await?;

        Ok(Some(ProviderProfileWithServices { profile, services }))
    }

    /// Resolve the caller's profile id, for booking-path operations.
    pub async fn profile_id(pool: &PgPool, user_id: Uuid) -> ApiResult<Uuid> {
        sqlx::query_scalar("SELECT id FROM provider_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Provider profile not found".into()))
    }

    /// Merge-patch the profile; a present `service_ids` replaces the
    /// offering set wholesale. Both steps share one transaction.
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpdateProviderProfileRequest,
    ) -> ApiResult<ProviderProfileWithServices> {
        if let Some(city) = &req.city {
            if city.trim().is_empty() {
                return Err(ApiError::Validation("City cannot be empty".into()));
            }
        }
        let service_ids = match &req.service_ids {
            Some(ids) if ids.is_empty() => {
                return Err(ApiError::Validation(
                    "At least one service is required".into(),
                ))
            }
            Some(ids) => {
                let ids = dedup_ids(ids);
                Self::ensure_services_exist(pool, &ids).await?;
                Some(ids)
            }
            None => None,
        };

        let mut tx = pool.begin().await?;

        let profile_id: Uuid =
            sqlx::query_scalar("SELECT id FROM provider_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ApiError::NotFound("Provider profile not found".into()))?;

        sqlx::query(
            "UPDATE provider_profiles
             SET city = COALESCE($1, city),
                 bio = COALESCE($2, bio),
                 experience_years = COALESCE($3, experience_years),
                 hourly_rate = COALESCE($4, hourly_rate),
                 updated_at = NOW()
             WHERE id = $5",
        )
        .bind(&req.city)
        .bind(&req.bio)
        .bind(req.experience_years)
        .bind(req.hourly_rate)
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;

        if let Some(ids) = &service_ids {
            sqlx::query("DELETE FROM provider_services WHERE provider_id = $1")
                .bind(profile_id)
                .execute(&mut *tx)
                .await?;
            Self::insert_service_links(&mut tx, profile_id, ids).await?;
        }

        tx.commit().await?;

        Self::get_by_user_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Provider profile not found".into()))
    }

    pub async fn toggle_availability(
        pool: &PgPool,
        user_id: Uuid,
    ) -> ApiResult<ProviderProfileWithServices> {
        let updated = sqlx::query(
            "UPDATE provider_profiles
             SET is_available = NOT is_available, updated_at = NOW()
             WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::NotFound("Provider profile not found".into()));
        }

        Self::get_by_user_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Provider profile not found".into()))
    }

    async fn insert_service_links(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        provider_id: Uuid,
        service_ids: &[Uuid],
    ) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO provider_services (provider_id, service_id)
             SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(provider_id)
        .bind(service_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn ensure_services_exist(pool: &PgPool, service_ids: &[Uuid]) -> ApiResult<()> {
        let known: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE id = ANY($1)")
                .bind(service_ids)
                .fetch_one(pool)
                .await?;
        if known != service_ids.len() as i64 {
            return Err(ApiError::Validation(
                "One or more services do not exist".into(),
            ));
        }
        Ok(())
    }
}

fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let deduped = dedup_ids(&[a, b, a, a]);
        assert_eq!(deduped.len(), 2);
        assert!(deduped.contains(&a) && deduped.contains(&b));
    }
}
