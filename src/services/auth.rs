use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        auth::Claims,
        user::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserProfile},
    },
};

const USER_COLS: &str =
    "id, email, password_hash, role, first_name, last_name, phone, created_at, updated_at";

pub struct AuthService;

impl AuthService {
    /// Register a new identity. The (email, role) pair is unique: the same
    /// email may hold one `user` and one `provider` account.
    pub async fn register(
        pool: &PgPool,
        req: &RegisterRequest,
        jwt_secret: &str,
        ttl_seconds: u64,
    ) -> ApiResult<AuthResponse> {
        let role = validate_registration(req)?;

        let password_hash = bcrypt::hash(&req.password, 12)
            .map_err(|e| ApiError::Internal(e.into()))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, role, first_name, last_name, phone)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLS}"
        ))
        .bind(&req.email)
        .bind(&password_hash)
        .bind(role.to_string())
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.phone)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            ApiError::conflict_on_unique(e, &format!("A {role} with this email already exists"))
        })?;

        let token = Self::generate_access_token(&user, jwt_secret, ttl_seconds)?;
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    /// Validate credentials for the given role. Unknown email and wrong
    /// password report the same message.
    pub async fn login(
        pool: &PgPool,
        req: &LoginRequest,
        jwt_secret: &str,
        ttl_seconds: u64,
    ) -> ApiResult<AuthResponse> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(ApiError::Validation(
                "Email, password, and role are required".into(),
            ));
        }
        let role: Role = req.role.parse().map_err(|_| {
            ApiError::Validation("Role must be either \"user\" or \"provider\"".into())
        })?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users WHERE email = $1 AND role = $2"
        ))
        .bind(&req.email)
        .bind(role.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?;

        let valid = bcrypt::verify(&req.password, &user.password_hash)
            .map_err(|_| ApiError::Unauthorized("Invalid credentials".into()))?;
        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }

        let token = Self::generate_access_token(&user, jwt_secret, ttl_seconds)?;
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    pub async fn get_user(pool: &PgPool, user_id: Uuid) -> ApiResult<UserProfile> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        Ok(user.into())
    }

    pub fn generate_access_token(
        user: &User,
        secret: &str,
        ttl_seconds: u64,
    ) -> ApiResult<String> {
        let role: Role = user.role.parse().unwrap_or(Role::User);
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role,
            iat: now,
            exp: now + ttl_seconds as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(e.into()))
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<Role, ApiError> {
    if req.email.trim().is_empty()
        || req.password.is_empty()
        || req.first_name.trim().is_empty()
        || req.last_name.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "Email, password, role, first name, and last name are required".into(),
        ));
    }
    let role: Role = req.role.parse().map_err(|_| {
        ApiError::Validation("Role must be either \"user\" or \"provider\"".into())
    })?;
    if req.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }
    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            email: "sam@example.com".into(),
            password: "hunter22".into(),
            role: "provider".into(),
            first_name: "Sam".into(),
            last_name: "Iyer".into(),
            phone: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert_eq!(validate_registration(&request()).unwrap(), Role::Provider);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut req = request();
        req.first_name = "  ".into();
        assert!(matches!(
            validate_registration(&req),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_role_rejected() {
        let mut req = request();
        req.role = "admin".into();
        assert!(matches!(
            validate_registration(&req),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut req = request();
        req.password = "abc".into();
        assert!(matches!(
            validate_registration(&req),
            Err(ApiError::Validation(_))
        ));
    }
}
